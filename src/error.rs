//! Error type shared by initialisation paths.

use std::path::PathBuf;

use bevy::render::render_resource::TextureFormat;

#[derive(Debug, thiserror::Error)]
pub enum MorphError {
    #[error("failed to load shape image '{path}'")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("at least one shape is required to drive the morph timeline")]
    NoShapes,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("adapter cannot render to and sample from {0:?} textures")]
    UnsupportedFloatTarget(TextureFormat),
}
