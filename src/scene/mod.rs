//! Scene module - triangle collections and their file format
//!
//! Scenes are plain data: an ordered list of triangles. Input order is kept
//! as authored; the renderer decides draw order on its own.

mod demo;
mod store;

pub use demo::*;
pub use store::*;

use serde::{Deserialize, Serialize};

use crate::rasterizer::Triangle;

/// An ordered collection of triangles
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    triangles: Vec<Triangle>,
}

impl Scene {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    pub fn push(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

impl FromIterator<Triangle> for Scene {
    fn from_iter<I: IntoIterator<Item = Triangle>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
