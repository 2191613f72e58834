//! trirast: software rasterizer for translucent, depth-tagged triangles
//!
//! - Barycentric coverage test and attribute interpolation
//! - Painter's ordering by centroid depth
//! - Order-dependent blend: first touch wins, nearer fragments blend over
//! - RON scene files and PNG output

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod output;
pub mod rasterizer;
pub mod scene;
