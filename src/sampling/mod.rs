//! Image to point-cloud sampling.
//!
//! A source image is rasterised to a fixed square resolution and every
//! near-black pixel becomes an ink point. The encoder then deals those points
//! out to the particle grid, producing one immutable target field per shape.

mod encoder;
mod grid;
mod procedural;

use std::borrow::Cow;
use std::path::Path;

use bevy::math::Vec2;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::error::MorphError;

pub use encoder::{encode_shape, EncodeParams, PositionField};
pub use grid::{grid_coords, grid_field, particle_index, particle_uv};
pub use procedural::ProceduralShape;

/// Parameters for [`sample_ink`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampleParams {
    /// Width and height the image is rasterised to before scanning
    pub resolution: u32,
    /// Red values strictly below this are ink (0..=255 scale)
    pub darkness_threshold: u8,
    /// Blend each pixel over white by its alpha before thresholding. Off by
    /// default: the raw red channel decides, whatever the alpha.
    pub composite_over_white: bool,
}

impl Default for SampleParams {
    fn default() -> Self {
        Self {
            resolution: crate::config::DEFAULT_SAMPLE_RESOLUTION,
            darkness_threshold: crate::config::DEFAULT_DARKNESS_THRESHOLD,
            composite_over_white: false,
        }
    }
}

/// Ink points of one image in normalised coordinates.
///
/// x runs left to right over [-0.5, 0.5), y is flipped so that the top row of
/// the image maps to 0.5.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InkSample {
    pub points: Vec<Vec2>,
    pub resolution: u32,
}

impl InkSample {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Decode an image from disk into 8-bit RGBA.
pub fn load_image(path: &Path) -> Result<RgbaImage, MorphError> {
    image::open(path)
        .map(|decoded| decoded.to_rgba8())
        .map_err(|source| MorphError::ImageLoad {
            path: path.to_path_buf(),
            source,
        })
}

/// Scan `image` for ink pixels.
pub fn sample_ink(image: &RgbaImage, params: &SampleParams) -> InkSample {
    let size = params.resolution;
    let raster = if image.dimensions() == (size, size) {
        Cow::Borrowed(image)
    } else {
        Cow::Owned(imageops::resize(image, size, size, FilterType::Triangle))
    };

    let scale = size as f32;
    let points = raster
        .enumerate_pixels()
        .filter(|(_, _, pixel)| is_ink(pixel, params))
        .map(|(x, y, _)| Vec2::new(x as f32 / scale - 0.5, 0.5 - y as f32 / scale))
        .collect();

    InkSample {
        points,
        resolution: size,
    }
}

fn is_ink(pixel: &Rgba<u8>, params: &SampleParams) -> bool {
    let [red, _, _, alpha] = pixel.0;
    let red = if params.composite_over_white {
        let (red, alpha) = (red as u32, alpha as u32);
        (red * alpha + 255 * (255 - alpha)) / 255
    } else {
        red as u32
    };
    red < params.darkness_threshold as u32
}
