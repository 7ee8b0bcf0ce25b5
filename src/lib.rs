//! Morphfield - animated point cloud that morphs between shapes sampled from
//! raster images, driven by a GPU ping-pong feedback loop.
//!
//! Exposes sampling, timeline and simulation components for testing and reuse.

pub mod config;
pub mod error;
pub mod render;
pub mod resources;
pub mod sampling;
pub mod simulation;
pub mod timeline;
