//! Software rasterizer for translucent, depth-tagged triangles
//!
//! Features:
//! - Barycentric point-in-triangle test over the clipped bounding box
//! - Per-vertex color, translucency and depth interpolation
//! - Painter's ordering by centroid depth, farthest first
//! - Order-dependent blending: first touch wins, nearer fragments blend over

mod math;
mod order;
mod render;
mod types;

pub use math::*;
pub use order::*;
pub use render::*;
pub use types::*;

/// Default canvas dimensions
pub const WIDTH: usize = 500;
pub const HEIGHT: usize = 500;
