//! 2D vector math and barycentric solving
//!
//! All positions are screen-space pixel coordinates, `f64` throughout so
//! integer vertex positions solve exactly.

use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Determinants with a smaller magnitude are treated as collinear
pub const DEGENERATE_EPSILON: f64 = 1e-9;

/// 2D Vector (screen-space position)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn scale(self, s: f64) -> Vec2 {
        Vec2 {
            x: self.x * s,
            y: self.y * s,
        }
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, s: f64) -> Vec2 {
        self.scale(s)
    }
}

/// Failure to solve against a triangle's geometry
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeometryError {
    #[error("degenerate triangle: vertices are collinear (determinant {determinant})")]
    Degenerate { determinant: f64 },
}

/// Barycentric weights of a point relative to (v1, v2, v3)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Barycentric {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl Barycentric {
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Self {
        Self { alpha, beta, gamma }
    }

    /// True if the point lies inside the triangle or on its boundary.
    ///
    /// The weights always sum to one, so bounding each of them to [0, 1]
    /// is exactly the convex-combination condition.
    pub fn contains(&self) -> bool {
        let unit = 0.0..=1.0;
        unit.contains(&self.alpha) && unit.contains(&self.beta) && unit.contains(&self.gamma)
    }

    /// Weighted sum of one per-vertex attribute
    pub fn blend(&self, a1: f64, a2: f64, a3: f64) -> f64 {
        self.alpha * a1 + self.beta * a2 + self.gamma * a3
    }

    pub fn sum(&self) -> f64 {
        self.alpha + self.beta + self.gamma
    }
}

/// Edge matrix of one triangle, built once and reused per pixel.
///
/// Solves `p = v1 + beta * (v2 - v1) + gamma * (v3 - v1)` by inverting the
/// 2x2 matrix whose columns are `(v3 - v1)` and `(v2 - v1)`. Stores the
/// adjugate and divides by the determinant on every solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarycentricSolver {
    origin: Vec2,
    adj: [[f64; 2]; 2],
    det: f64,
}

impl BarycentricSolver {
    pub fn new(v1: Vec2, v2: Vec2, v3: Vec2) -> Result<Self, GeometryError> {
        let e2 = v2 - v1;
        let e3 = v3 - v1;
        let det = e3.x * e2.y - e2.x * e3.y;

        if det.abs() < DEGENERATE_EPSILON {
            return Err(GeometryError::Degenerate { determinant: det });
        }

        Ok(Self {
            origin: v1,
            adj: [[e2.y, -e2.x], [-e3.y, e3.x]],
            det,
        })
    }

    pub fn solve(&self, p: Vec2) -> Barycentric {
        let d = p - self.origin;
        let gamma = (self.adj[0][0] * d.x + self.adj[0][1] * d.y) / self.det;
        let beta = (self.adj[1][0] * d.x + self.adj[1][1] * d.y) / self.det;
        Barycentric::new(1.0 - beta - gamma, beta, gamma)
    }
}

/// Calculate barycentric coordinates for point p in triangle (v1, v2, v3)
pub fn barycentric(p: Vec2, v1: Vec2, v2: Vec2, v3: Vec2) -> Result<Barycentric, GeometryError> {
    Ok(BarycentricSolver::new(v1, v2, v3)?.solve(p))
}

/// Integer-aligned bounding box, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min_x: i64,
    pub max_x: i64,
    pub min_y: i64,
    pub max_y: i64,
}

impl Bounds {
    /// Smallest integer box containing all points
    pub fn around(points: &[Vec2]) -> Self {
        let mut min = Vec2::new(f64::INFINITY, f64::INFINITY);
        let mut max = Vec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Self {
            min_x: min.x.floor() as i64,
            max_x: max.x.ceil() as i64,
            min_y: min.y.floor() as i64,
            max_y: max.y.ceil() as i64,
        }
    }

    /// Check if a point is inside the box
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min_x as f64
            && p.x <= self.max_x as f64
            && p.y >= self.min_y as f64
            && p.y <= self.max_y as f64
    }

    /// Clip to `[0, width) x [0, height)`; `None` if nothing is left
    pub fn clip(&self, width: usize, height: usize) -> Option<PixelRect> {
        let x0 = self.min_x.max(0);
        let y0 = self.min_y.max(0);
        let x1 = self.max_x.saturating_add(1).min(width as i64);
        let y1 = self.max_y.saturating_add(1).min(height as i64);

        if x0 >= x1 || y0 >= y1 {
            return None;
        }

        Some(PixelRect {
            x0: x0 as usize,
            y0: y0 as usize,
            x1: x1 as usize,
            y1: y1 as usize,
        })
    }
}

/// Half-open pixel rectangle that lies fully inside a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

impl PixelRect {
    pub fn area(&self) -> usize {
        (self.x1 - self.x0) * (self.y1 - self.y0)
    }
}
