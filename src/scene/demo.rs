//! Built-in demo scene
//!
//! Five overlapping translucent triangles on a 500x500 canvas. Also shipped
//! as `assets/scenes/demo.ron`.

use crate::rasterizer::{Color, InvalidAttributeError, Triangle, Vertex};

use super::Scene;

/// (x, y, rgb, translucency, depth) per vertex, three vertices per triangle
type VertexRow = (f64, f64, [u8; 3], f64, f64);

const DEMO_TRIANGLES: [[VertexRow; 3]; 5] = [
    [
        (300.0, 450.0, [255, 0, 0], 0.1, 30.0),
        (110.0, 320.0, [0, 255, 0], 0.9, 50.0),
        (0.0, 45.0, [0, 0, 255], 0.8, 10.0),
    ],
    [
        (30.0, 80.0, [250, 25, 25], 0.4, 10.0),
        (240.0, 60.0, [24, 240, 240], 0.6, 50.0),
        (400.0, 499.0, [90, 60, 90], 0.8, 300.0),
    ],
    [
        (405.0, 340.0, [220, 0, 210], 0.3, 5.0),
        (440.0, 20.0, [30, 150, 20], 0.9, 40.0),
        (350.0, 460.0, [128, 128, 128], 0.5, 20.0),
    ],
    [
        (20.0, 450.0, [250, 250, 250], 0.7, 25.0),
        (145.0, 15.0, [25, 240, 255], 0.2, 60.0),
        (140.0, 230.0, [0, 0, 128], 0.4, 200.0),
    ],
    [
        (350.0, 130.0, [200, 0, 0], 0.6, 45.0),
        (34.0, 45.0, [0, 165, 50], 0.3, 15.0),
        (350.0, 20.0, [140, 70, 0], 0.8, 0.0),
    ],
];

/// The built-in demo scene
pub fn demo_scene() -> Result<Scene, InvalidAttributeError> {
    let vertex = |&(x, y, [r, g, b], a, z): &VertexRow| Vertex::new(x, y, Color::new(r, g, b), a, z);

    DEMO_TRIANGLES
        .iter()
        .map(|[v1, v2, v3]| -> Result<Triangle, InvalidAttributeError> {
            Ok(Triangle::new(vertex(v1)?, vertex(v2)?, vertex(v3)?))
        })
        .collect()
}
