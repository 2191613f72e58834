//! Core types for the rasterizer

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::math::{barycentric, Barycentric, BarycentricSolver, Bounds, GeometryError, Vec2};

/// RGB color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Mix this color over `under`, weighting this one by `a`.
    ///
    /// Each channel is `trunc(c * a + c_under * (1 - a))`.
    pub fn blend_over(self, under: Color, a: f64) -> Self {
        let mix = |top: u8, bottom: u8| (top as f64 * a + bottom as f64 * (1.0 - a)) as u8;
        Self {
            r: mix(self.r, under.r),
            g: mix(self.g, under.g),
            b: mix(self.b, under.b),
        }
    }

    /// Convert to opaque [u8; 4] RGBA bytes
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected a color as R,G,B with channels 0-255, got {0:?}")]
pub struct ParseColorError(String);

impl FromStr for Color {
    type Err = ParseColorError;

    /// Parse `"r,g,b"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let channels: Vec<u8> = s
            .split(',')
            .map(|c| c.trim().parse::<u8>())
            .collect::<Result<_, _>>()
            .map_err(|_| ParseColorError(s.to_string()))?;

        match channels[..] {
            [r, g, b] => Ok(Color::new(r, g, b)),
            _ => Err(ParseColorError(s.to_string())),
        }
    }
}

/// Rejected vertex attribute
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum InvalidAttributeError {
    #[error("translucency {0} is outside [0, 1]")]
    Translucency(f64),
    #[error("vertex position ({x}, {y}) is not finite")]
    Position { x: f64, y: f64 },
    #[error("vertex depth {0} is not finite")]
    Depth(f64),
}

/// A vertex with position, color, translucency and depth.
///
/// Immutable once built; [`Vertex::new`] is the only way in, so every vertex
/// holds a translucency in [0, 1] and finite coordinates. Smaller depth is
/// nearer to the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "VertexDef", into = "VertexDef")]
pub struct Vertex {
    pos: Vec2,
    color: Color,
    translucency: f64,
    depth: f64,
}

impl Vertex {
    pub fn new(
        x: f64,
        y: f64,
        color: Color,
        translucency: f64,
        depth: f64,
    ) -> Result<Self, InvalidAttributeError> {
        if !(0.0..=1.0).contains(&translucency) {
            return Err(InvalidAttributeError::Translucency(translucency));
        }
        let pos = Vec2::new(x, y);
        if !pos.is_finite() {
            return Err(InvalidAttributeError::Position { x, y });
        }
        if !depth.is_finite() {
            return Err(InvalidAttributeError::Depth(depth));
        }
        Ok(Self {
            pos,
            color,
            translucency,
            depth,
        })
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn translucency(&self) -> f64 {
        self.translucency
    }

    pub fn depth(&self) -> f64 {
        self.depth
    }
}

/// On-disk shape of a vertex; validated on the way in
#[derive(Serialize, Deserialize)]
struct VertexDef {
    x: f64,
    y: f64,
    color: Color,
    translucency: f64,
    depth: f64,
}

impl TryFrom<VertexDef> for Vertex {
    type Error = InvalidAttributeError;

    fn try_from(def: VertexDef) -> Result<Self, Self::Error> {
        Vertex::new(def.x, def.y, def.color, def.translucency, def.depth)
    }
}

impl From<Vertex> for VertexDef {
    fn from(v: Vertex) -> Self {
        Self {
            x: v.pos.x,
            y: v.pos.y,
            color: v.color,
            translucency: v.translucency,
            depth: v.depth,
        }
    }
}

/// Interpolated attributes for one pixel of one triangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    pub color: Color,
    pub translucency: f64,
    pub depth: i64,
}

/// A triangle of three vertices. Order matters: `v1` is the barycentric origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub v1: Vertex,
    pub v2: Vertex,
    pub v3: Vertex,
}

impl Triangle {
    pub fn new(v1: Vertex, v2: Vertex, v3: Vertex) -> Self {
        Self { v1, v2, v3 }
    }

    pub fn positions(&self) -> [Vec2; 3] {
        [self.v1.pos, self.v2.pos, self.v3.pos]
    }

    /// Arithmetic mean of the three positions
    pub fn centroid(&self) -> Vec2 {
        (self.v1.pos + self.v2.pos + self.v3.pos).scale(1.0 / 3.0)
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::around(&self.positions())
    }

    /// Per-triangle solver, fails once for degenerate geometry
    pub fn solver(&self) -> Result<BarycentricSolver, GeometryError> {
        BarycentricSolver::new(self.v1.pos, self.v2.pos, self.v3.pos)
    }

    pub fn barycentric(&self, p: Vec2) -> Result<Barycentric, GeometryError> {
        barycentric(p, self.v1.pos, self.v2.pos, self.v3.pos)
    }

    /// Interpolate vertex attributes at the given weights.
    ///
    /// Color channels and depth are truncated toward zero after the weighted
    /// sum; translucency stays real.
    pub fn interpolate(&self, w: &Barycentric) -> Fragment {
        let (v1, v2, v3) = (&self.v1, &self.v2, &self.v3);
        let channel = |c: fn(&Color) -> u8| {
            w.blend(c(&v1.color) as f64, c(&v2.color) as f64, c(&v3.color) as f64) as u8
        };

        Fragment {
            color: Color {
                r: channel(|c| c.r),
                g: channel(|c| c.g),
                b: channel(|c| c.b),
            },
            translucency: w.blend(v1.translucency, v2.translucency, v3.translucency),
            depth: w.blend(v1.depth, v2.depth, v3.depth) as i64,
        }
    }
}
