//! Draw order planning (painter's algorithm)
//!
//! Triangles are sorted by the depth interpolated at their centroid,
//! farthest first. This approximates back-to-front compositing; it cannot
//! resolve overlapping triangles whose depth ranges interleave.

use super::math::GeometryError;
use super::types::Triangle;

/// A triangle scheduled for drawing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedTriangle {
    /// Index into the input slice
    pub index: usize,
    /// Depth at the centroid
    pub depth: f64,
}

/// A triangle left out of a render, with the reason
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkippedTriangle {
    pub index: usize,
    pub error: GeometryError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawPlan {
    /// Farthest first
    pub order: Vec<PlannedTriangle>,
    /// Triangles whose centroid could not be solved
    pub rejected: Vec<SkippedTriangle>,
}

/// Depth interpolated at the triangle's centroid.
///
/// Centroid weights are 1/3 each, so this is the mean of the three vertex
/// depths. Not truncated.
pub fn representative_depth(triangle: &Triangle) -> Result<f64, GeometryError> {
    let w = triangle.barycentric(triangle.centroid())?;
    Ok(w.blend(triangle.v1.depth(), triangle.v2.depth(), triangle.v3.depth()))
}

/// Order triangles by representative depth, descending. Ties keep input order.
pub fn plan_draw_order(triangles: &[Triangle]) -> DrawPlan {
    let mut plan = DrawPlan::default();

    for (index, triangle) in triangles.iter().enumerate() {
        match representative_depth(triangle) {
            Ok(depth) => plan.order.push(PlannedTriangle { index, depth }),
            Err(error) => plan.rejected.push(SkippedTriangle { index, error }),
        }
    }

    plan.order.sort_by(|a, b| b.depth.total_cmp(&a.depth));

    log::trace!(
        "draw order: {:?}",
        plan.order.iter().map(|p| p.index).collect::<Vec<_>>()
    );

    plan
}
