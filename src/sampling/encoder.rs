//! Position field encoding.

use bevy::log::warn;
use bevy::math::Vec2;
use rand::Rng;

use super::InkSample;

/// S×S grid of RGBA float texels, addressed by particle index.
///
/// x/y hold the position, z is unused and w marks whether the particle follows
/// the shape (1.0) or is a stray / fallback (0.0).
#[derive(Clone, Debug, PartialEq)]
pub struct PositionField {
    side: u32,
    texels: Vec<[f32; 4]>,
}

impl PositionField {
    pub fn zeroed(side: u32) -> Self {
        let count = (side as usize) * (side as usize);
        Self {
            side,
            texels: vec![[0.0; 4]; count],
        }
    }

    pub fn side(&self) -> u32 {
        self.side
    }

    pub fn len(&self) -> usize {
        self.texels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texels.is_empty()
    }

    pub fn texel(&self, index: usize) -> [f32; 4] {
        self.texels[index]
    }

    pub fn texels(&self) -> &[[f32; 4]] {
        &self.texels
    }

    pub(crate) fn texels_mut(&mut self) -> &mut [[f32; 4]] {
        &mut self.texels
    }

    /// Raw little-endian bytes for an `Rgba32Float` upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texels)
    }

    /// Particles flagged as following the shape.
    pub fn active_count(&self) -> usize {
        self.texels.iter().filter(|t| t[3] > 0.5).count()
    }
}

/// Parameters for [`encode_shape`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EncodeParams {
    /// Chance a particle scatters into the stray square instead of the shape
    pub stray_probability: f64,
    /// Side of the square strays are drawn from, centred on the origin
    pub stray_extent: f32,
    /// Upper bound of the offset added to each coordinate
    pub jitter: f32,
}

impl Default for EncodeParams {
    fn default() -> Self {
        Self {
            stray_probability: crate::config::DEFAULT_STRAY_PROBABILITY,
            stray_extent: crate::config::DEFAULT_STRAY_EXTENT,
            jitter: crate::config::DEFAULT_JITTER,
        }
    }
}

/// Uniform draw in `[lo, hi)`, collapsing to `lo` for an empty range.
fn uniform<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

/// Deal the ink points of `sample` out to an S×S field.
///
/// Every particle picks one ink point uniformly at random; with
/// `stray_probability` it picks a point in the stray square instead. Both get
/// jitter. An empty sample yields an all-zero field.
pub fn encode_shape<R: Rng + ?Sized>(
    sample: &InkSample,
    side: u32,
    params: &EncodeParams,
    rng: &mut R,
) -> PositionField {
    let mut field = PositionField::zeroed(side);

    if sample.is_empty() {
        warn!(
            "shape sample has no ink pixels; {} particles fall back to the origin",
            field.len()
        );
        return field;
    }

    let half = params.stray_extent * 0.5;
    let stray_probability = params.stray_probability.clamp(0.0, 1.0);

    for texel in field.texels_mut() {
        let (base, active) = if stray_probability > 0.0 && rng.gen_bool(stray_probability) {
            let stray = Vec2::new(uniform(rng, -half, half), uniform(rng, -half, half));
            (stray, 0.0)
        } else {
            (sample.points[rng.gen_range(0..sample.len())], 1.0)
        };

        let offset = Vec2::new(
            uniform(rng, 0.0, params.jitter),
            uniform(rng, 0.0, params.jitter),
        );
        let position = base + offset;
        *texel = [position.x, position.y, 0.0, active];
    }

    field
}
