//! Core rendering functions
//! Triangle rasterization into a pixel buffer with order-dependent blending

use std::ops::AddAssign;

use super::math::{GeometryError, Vec2};
use super::order::{plan_draw_order, SkippedTriangle};
use super::types::{Color, Fragment, Triangle};
use crate::scene::Scene;

/// What a pixel currently resolves to
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum PixelRecord {
    /// No triangle has touched this pixel yet
    #[default]
    Empty,
    Occupied { color: Color, depth: i64 },
}

impl PixelRecord {
    pub fn color(&self) -> Option<Color> {
        match *self {
            PixelRecord::Empty => None,
            PixelRecord::Occupied { color, .. } => Some(color),
        }
    }

    pub fn depth(&self) -> Option<i64> {
        match *self {
            PixelRecord::Empty => None,
            PixelRecord::Occupied { depth, .. } => Some(depth),
        }
    }
}

/// Result of offering one fragment to the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendOutcome {
    /// Pixel was empty, fragment stored as is
    Written,
    /// Fragment was nearer and blended over the stored color
    Blended,
    /// Fragment was not nearer, buffer unchanged
    Discarded,
}

/// Pixel buffer for software rendering (row-major, `y * width + x`)
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    records: Vec<PixelRecord>,
    width: usize,
    height: usize,
}

impl PixelBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            records: vec![PixelRecord::Empty; width * height],
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.records.fill(PixelRecord::Empty);
    }

    pub fn get(&self, x: usize, y: usize) -> Option<PixelRecord> {
        if x < self.width && y < self.height {
            Some(self.records[y * self.width + x])
        } else {
            None
        }
    }

    /// All records in row-major order
    pub fn records(&self) -> &[PixelRecord] {
        &self.records
    }

    pub fn occupied_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r, PixelRecord::Occupied { .. }))
            .count()
    }

    /// Apply the occlusion/blend rule for one fragment at (x, y).
    ///
    /// - empty pixel: the fragment is stored unconditionally
    /// - nearer fragment (`z < z_old`): its color is mixed over the stored
    ///   one using the fragment's own translucency, and its depth replaces
    ///   the stored depth
    /// - otherwise the fragment is dropped
    ///
    /// The result depends on the order fragments arrive in. Drawing
    /// back-to-front is what makes translucency come out right.
    ///
    /// # Panics
    /// Panics if (x, y) is outside the buffer. Callers clip first.
    pub fn apply(&mut self, x: usize, y: usize, frag: &Fragment) -> BlendOutcome {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} buffer",
            self.width,
            self.height
        );
        let record = &mut self.records[y * self.width + x];

        match *record {
            PixelRecord::Empty => {
                *record = PixelRecord::Occupied {
                    color: frag.color,
                    depth: frag.depth,
                };
                BlendOutcome::Written
            }
            PixelRecord::Occupied { color, depth } if frag.depth < depth => {
                *record = PixelRecord::Occupied {
                    color: frag.color.blend_over(color, frag.translucency),
                    depth: frag.depth,
                };
                BlendOutcome::Blended
            }
            PixelRecord::Occupied { .. } => BlendOutcome::Discarded,
        }
    }
}

/// Pixel counters for one or more rasterized triangles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RasterStats {
    /// Pixels inside the clipped bounding box
    pub tested: usize,
    /// Pixels that passed the membership test
    pub covered: usize,
    pub written: usize,
    pub blended: usize,
    pub discarded: usize,
}

impl RasterStats {
    fn record(&mut self, outcome: BlendOutcome) {
        match outcome {
            BlendOutcome::Written => self.written += 1,
            BlendOutcome::Blended => self.blended += 1,
            BlendOutcome::Discarded => self.discarded += 1,
        }
    }
}

impl AddAssign for RasterStats {
    fn add_assign(&mut self, other: RasterStats) {
        self.tested += other.tested;
        self.covered += other.covered;
        self.written += other.written;
        self.blended += other.blended;
        self.discarded += other.discarded;
    }
}

/// Rasterize a single triangle into the buffer.
///
/// Walks every pixel of the bounding box clipped to the buffer, keeps the
/// ones whose barycentric weights all lie in [0, 1], and applies the
/// buffer's blend rule to the interpolated fragment. A degenerate triangle
/// fails before any pixel is touched.
pub fn rasterize_triangle(
    buffer: &mut PixelBuffer,
    triangle: &Triangle,
) -> Result<RasterStats, GeometryError> {
    let solver = triangle.solver()?;
    let mut stats = RasterStats::default();

    let Some(rect) = triangle.bounds().clip(buffer.width, buffer.height) else {
        return Ok(stats);
    };

    for y in rect.y0..rect.y1 {
        for x in rect.x0..rect.x1 {
            stats.tested += 1;
            let w = solver.solve(Vec2::new(x as f64, y as f64));
            if !w.contains() {
                continue;
            }
            stats.covered += 1;

            let frag = triangle.interpolate(&w);
            stats.record(buffer.apply(x, y, &frag));
        }
    }

    Ok(stats)
}

/// Output of one render pass
#[derive(Debug, Clone)]
pub struct Rendered {
    pub buffer: PixelBuffer,
    /// Triangles that could not be drawn, by input index
    pub skipped: Vec<SkippedTriangle>,
    pub stats: RasterStats,
}

/// Renders scenes into fresh buffers of a fixed size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Renderer {
    width: usize,
    height: usize,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Plan the draw order, then rasterize every plannable triangle in it.
    ///
    /// A triangle that fails is reported in [`Rendered::skipped`] and the
    /// rest of the scene still renders.
    pub fn render(&self, scene: &Scene) -> Rendered {
        let mut buffer = PixelBuffer::new(self.width, self.height);
        let plan = plan_draw_order(scene.triangles());
        let mut skipped = plan.rejected;
        let mut stats = RasterStats::default();

        for planned in &plan.order {
            let triangle = &scene.triangles()[planned.index];
            match rasterize_triangle(&mut buffer, triangle) {
                Ok(s) => {
                    log::debug!(
                        "triangle {} (depth {:.2}): {} covered, {} written, {} blended, {} discarded",
                        planned.index,
                        planned.depth,
                        s.covered,
                        s.written,
                        s.blended,
                        s.discarded
                    );
                    stats += s;
                }
                Err(error) => skipped.push(SkippedTriangle {
                    index: planned.index,
                    error,
                }),
            }
        }

        skipped.sort_by_key(|s| s.index);
        for s in &skipped {
            log::warn!("skipped triangle {}: {}", s.index, s.error);
        }
        log::info!(
            "rendered {} of {} triangles into {}x{} ({} pixels occupied)",
            scene.len() - skipped.len(),
            scene.len(),
            self.width,
            self.height,
            buffer.occupied_count()
        );

        Rendered {
            buffer,
            skipped,
            stats,
        }
    }
}

/// Render a scene into a new `width` x `height` buffer
pub fn render(scene: &Scene, width: usize, height: usize) -> Rendered {
    Renderer::new(width, height).render(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::Vertex;

    fn flat_triangle(size: f64, color: Color, a: f64, z: f64) -> Triangle {
        let v = |x, y| Vertex::new(x, y, color, a, z).unwrap();
        Triangle::new(v(0.0, 0.0), v(size, 0.0), v(0.0, size))
    }

    fn fragment(color: Color, translucency: f64, depth: i64) -> Fragment {
        Fragment {
            color,
            translucency,
            depth,
        }
    }

    #[test]
    fn test_apply_first_touch() {
        let mut fb = PixelBuffer::new(4, 4);
        let outcome = fb.apply(1, 2, &fragment(Color::GREEN, 0.1, 99));
        assert_eq!(outcome, BlendOutcome::Written);
        assert_eq!(
            fb.get(1, 2),
            Some(PixelRecord::Occupied { color: Color::GREEN, depth: 99 })
        );
        assert_eq!(fb.occupied_count(), 1);
    }

    #[test]
    fn test_apply_nearer_blends() {
        let mut fb = PixelBuffer::new(1, 1);
        fb.apply(0, 0, &fragment(Color::new(0, 0, 200), 1.0, 20));
        let outcome = fb.apply(0, 0, &fragment(Color::new(100, 0, 0), 0.25, 5));
        assert_eq!(outcome, BlendOutcome::Blended);
        assert_eq!(
            fb.get(0, 0),
            Some(PixelRecord::Occupied { color: Color::new(25, 0, 150), depth: 5 })
        );
    }

    #[test]
    fn test_apply_farther_or_equal_discarded() {
        let mut fb = PixelBuffer::new(1, 1);
        fb.apply(0, 0, &fragment(Color::RED, 1.0, 10));
        let before = fb.clone();
        assert_eq!(fb.apply(0, 0, &fragment(Color::BLUE, 1.0, 10)), BlendOutcome::Discarded);
        assert_eq!(fb.apply(0, 0, &fragment(Color::BLUE, 1.0, 11)), BlendOutcome::Discarded);
        assert_eq!(fb, before);
    }

    #[test]
    #[should_panic]
    fn test_apply_out_of_bounds_panics() {
        let mut fb = PixelBuffer::new(2, 2);
        fb.apply(2, 0, &fragment(Color::RED, 1.0, 0));
    }

    #[test]
    fn test_scenario_single_triangle() {
        let tri = Triangle::new(
            Vertex::new(0.0, 0.0, Color::RED, 1.0, 10.0).unwrap(),
            Vertex::new(10.0, 0.0, Color::GREEN, 1.0, 10.0).unwrap(),
            Vertex::new(0.0, 10.0, Color::BLUE, 1.0, 10.0).unwrap(),
        );
        let mut fb = PixelBuffer::new(20, 20);
        let stats = rasterize_triangle(&mut fb, &tri).unwrap();

        assert_eq!(fb.get(0, 0), Some(PixelRecord::Occupied { color: Color::RED, depth: 10 }));
        assert_eq!(fb.get(10, 0).and_then(|r| r.color()), Some(Color::GREEN));
        assert_eq!(fb.get(0, 10).and_then(|r| r.color()), Some(Color::BLUE));
        assert_eq!(fb.get(8, 8), Some(PixelRecord::Empty));
        assert_eq!(fb.get(11, 0), Some(PixelRecord::Empty));
        assert_eq!(stats.tested, 121);
        assert_eq!(stats.covered, stats.written);
        assert_eq!(stats.covered, fb.occupied_count());
    }

    #[test]
    fn test_scenario_opaque_near_over_far() {
        let far = flat_triangle(16.0, Color::BLUE, 1.0, 50.0);
        let near = flat_triangle(8.0, Color::RED, 1.0, 10.0);
        let mut fb = PixelBuffer::new(20, 20);
        rasterize_triangle(&mut fb, &far).unwrap();
        let stats = rasterize_triangle(&mut fb, &near).unwrap();

        assert_eq!(stats.blended, stats.covered);
        for (x, y) in [(0, 0), (2, 2), (4, 4), (8, 0), (0, 8)] {
            assert_eq!(fb.get(x, y), Some(PixelRecord::Occupied { color: Color::RED, depth: 10 }));
        }
        // Covered by the far triangle only
        assert_eq!(fb.get(12, 2), Some(PixelRecord::Occupied { color: Color::BLUE, depth: 50 }));
    }

    #[test]
    fn test_scenario_translucent_near_over_far() {
        let far = flat_triangle(16.0, Color::BLUE, 1.0, 50.0);
        let near = flat_triangle(8.0, Color::RED, 0.5, 10.0);
        let mut fb = PixelBuffer::new(20, 20);
        rasterize_triangle(&mut fb, &far).unwrap();
        rasterize_triangle(&mut fb, &near).unwrap();

        for (x, y) in [(0, 0), (2, 2), (4, 4)] {
            assert_eq!(
                fb.get(x, y),
                Some(PixelRecord::Occupied { color: Color::new(127, 0, 127), depth: 10 })
            );
        }
    }

    #[test]
    fn test_scenario_reversed_order_keeps_near() {
        let far = flat_triangle(16.0, Color::BLUE, 1.0, 50.0);
        let near = flat_triangle(8.0, Color::RED, 1.0, 10.0);
        let mut fb = PixelBuffer::new(20, 20);
        rasterize_triangle(&mut fb, &near).unwrap();
        let stats = rasterize_triangle(&mut fb, &far).unwrap();

        assert!(stats.discarded > 0);
        for (x, y) in [(0, 0), (2, 2), (4, 4)] {
            assert_eq!(fb.get(x, y), Some(PixelRecord::Occupied { color: Color::RED, depth: 10 }));
        }
        assert_eq!(fb.get(12, 2).and_then(|r| r.color()), Some(Color::BLUE));
    }

    #[test]
    fn test_rerasterize_is_idempotent() {
        let tri = Triangle::new(
            Vertex::new(1.0, 1.0, Color::new(250, 25, 25), 0.4, 10.0).unwrap(),
            Vertex::new(17.0, 3.0, Color::new(24, 240, 240), 0.6, 50.0).unwrap(),
            Vertex::new(6.0, 15.0, Color::new(90, 60, 90), 0.8, 30.0).unwrap(),
        );
        let mut fb = PixelBuffer::new(20, 20);
        rasterize_triangle(&mut fb, &tri).unwrap();
        let first = fb.clone();

        let stats = rasterize_triangle(&mut fb, &tri).unwrap();
        assert_eq!(fb, first);
        assert_eq!(stats.discarded, stats.covered);
    }

    #[test]
    fn test_clips_to_buffer() {
        let tri = Triangle::new(
            Vertex::new(-5.0, -5.0, Color::WHITE, 1.0, 0.0).unwrap(),
            Vertex::new(30.0, -5.0, Color::WHITE, 1.0, 0.0).unwrap(),
            Vertex::new(-5.0, 30.0, Color::WHITE, 1.0, 0.0).unwrap(),
        );
        let mut fb = PixelBuffer::new(10, 10);
        let stats = rasterize_triangle(&mut fb, &tri).unwrap();
        assert_eq!(stats.tested, 100);
        assert_eq!(fb.occupied_count(), 100);

        let off_screen = Triangle::new(
            Vertex::new(50.0, 50.0, Color::WHITE, 1.0, 0.0).unwrap(),
            Vertex::new(60.0, 50.0, Color::WHITE, 1.0, 0.0).unwrap(),
            Vertex::new(50.0, 60.0, Color::WHITE, 1.0, 0.0).unwrap(),
        );
        let stats = rasterize_triangle(&mut fb, &off_screen).unwrap();
        assert_eq!(stats, RasterStats::default());
    }

    #[test]
    fn test_degenerate_triangle_untouched() {
        let line = Triangle::new(
            Vertex::new(0.0, 0.0, Color::WHITE, 1.0, 0.0).unwrap(),
            Vertex::new(5.0, 5.0, Color::WHITE, 1.0, 0.0).unwrap(),
            Vertex::new(9.0, 9.0, Color::WHITE, 1.0, 0.0).unwrap(),
        );
        let mut fb = PixelBuffer::new(10, 10);
        assert!(rasterize_triangle(&mut fb, &line).is_err());
        assert_eq!(fb.occupied_count(), 0);
    }

    #[test]
    fn test_renderer_sorts_back_to_front() {
        // Near triangle listed first; the planner still draws it last
        let near = flat_triangle(8.0, Color::RED, 1.0, 10.0);
        let far = flat_triangle(16.0, Color::BLUE, 1.0, 50.0);
        let scene = Scene::new(vec![near, far]);

        let out = Renderer::new(20, 20).render(&scene);
        assert!(out.skipped.is_empty());
        assert_eq!(out.buffer.get(2, 2), Some(PixelRecord::Occupied { color: Color::RED, depth: 10 }));
        assert!(out.stats.blended > 0);
        assert_eq!(out.stats.discarded, 0);
    }

    #[test]
    fn test_renderer_skips_degenerate() {
        let line = Triangle::new(
            Vertex::new(0.0, 0.0, Color::WHITE, 1.0, 0.0).unwrap(),
            Vertex::new(5.0, 5.0, Color::WHITE, 1.0, 0.0).unwrap(),
            Vertex::new(9.0, 9.0, Color::WHITE, 1.0, 0.0).unwrap(),
        );
        let good = flat_triangle(8.0, Color::GREEN, 1.0, 10.0);
        let scene = Scene::new(vec![good, line, good]);

        let out = render(&scene, 10, 10);
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.skipped[0].index, 1);
        assert!(matches!(out.skipped[0].error, GeometryError::Degenerate { .. }));
        assert_eq!(out.buffer.get(0, 0).and_then(|r| r.color()), Some(Color::GREEN));
    }
}
