//! Morph configuration.
//!
//! All tunables live in [`MorphConfig`]; defaults reproduce the reference
//! look (256² particles, 200 px sampling, one second waits, half second
//! morphs).

use std::path::PathBuf;

use bevy::prelude::*;

use crate::error::MorphError;
use crate::sampling::{EncodeParams, ProceduralShape, SampleParams};
use crate::timeline::{Easing, TimelineSettings};

// ==================== DEFAULTS ====================
/// Particle grid side length (S); S² particles in total
pub const DEFAULT_SIDE: u32 = 256;
/// Resolution every source image is rasterised to before sampling
pub const DEFAULT_SAMPLE_RESOLUTION: u32 = 200;
/// Red channel values strictly below this count as ink
pub const DEFAULT_DARKNESS_THRESHOLD: u8 = 5;
/// Chance that a particle ignores the shape and scatters
pub const DEFAULT_STRAY_PROBABILITY: f64 = 0.1;
/// Strays land uniformly in [-extent/2, extent/2)²
pub const DEFAULT_STRAY_EXTENT: f32 = 3.0;
/// Per-coordinate jitter added to every encoded position
pub const DEFAULT_JITTER: f32 = 0.025;
const DEFAULT_WAIT_SECS: f32 = 1.0;
const DEFAULT_MORPH_SECS: f32 = 0.5;
const DEFAULT_FORCE_RADIUS: f32 = 0.15;
const DEFAULT_RELAXATION: f32 = 0.08;
const DEFAULT_WOBBLE: f32 = 0.0015;
const DEFAULT_POINT_SIZE: f32 = 2.0;
// ==================================================

/// Where a shape target comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum ShapeSource {
    File(PathBuf),
    Procedural(ProceduralShape),
}

#[derive(Resource, Clone, Debug)]
pub struct MorphConfig {
    pub side: u32,
    pub sample_resolution: u32,
    pub darkness_threshold: u8,
    /// Treat transparent pixels as white paper instead of reading raw red
    pub composite_alpha: bool,
    pub stray_probability: f64,
    pub stray_extent: f32,
    pub jitter: f32,
    /// Fixed seed for the encoder. `None` draws one from entropy
    pub seed: Option<u64>,
    pub wait_secs: f32,
    pub morph_secs: f32,
    pub easing: Easing,
    /// Pointer repulsion strength; wired through but off by default
    pub force_power: f32,
    pub force_radius: f32,
    pub relaxation: f32,
    pub wobble: f32,
    pub point_size: f32,
    pub shapes: Vec<ShapeSource>,
}

impl Default for MorphConfig {
    fn default() -> Self {
        Self {
            side: DEFAULT_SIDE,
            sample_resolution: DEFAULT_SAMPLE_RESOLUTION,
            darkness_threshold: DEFAULT_DARKNESS_THRESHOLD,
            composite_alpha: false,
            stray_probability: DEFAULT_STRAY_PROBABILITY,
            stray_extent: DEFAULT_STRAY_EXTENT,
            jitter: DEFAULT_JITTER,
            seed: None,
            wait_secs: DEFAULT_WAIT_SECS,
            morph_secs: DEFAULT_MORPH_SECS,
            easing: Easing::QuadOut,
            force_power: 0.0,
            force_radius: DEFAULT_FORCE_RADIUS,
            relaxation: DEFAULT_RELAXATION,
            wobble: DEFAULT_WOBBLE,
            point_size: DEFAULT_POINT_SIZE,
            shapes: ProceduralShape::ALL
                .into_iter()
                .map(ShapeSource::Procedural)
                .collect(),
        }
    }
}

impl MorphConfig {
    /// Total number of simulated particles (S²).
    pub fn particle_count(&self) -> usize {
        (self.side as usize) * (self.side as usize)
    }

    pub fn sample_params(&self) -> SampleParams {
        SampleParams {
            resolution: self.sample_resolution,
            darkness_threshold: self.darkness_threshold,
            composite_over_white: self.composite_alpha,
        }
    }

    pub fn encode_params(&self) -> EncodeParams {
        EncodeParams {
            stray_probability: self.stray_probability,
            stray_extent: self.stray_extent,
            jitter: self.jitter,
        }
    }

    pub fn timeline_settings(&self) -> TimelineSettings {
        TimelineSettings {
            wait_secs: self.wait_secs,
            morph_secs: self.morph_secs,
            easing: self.easing,
        }
    }

    /// Reject values the encoder, timeline or simulation kernel cannot honour.
    pub fn validate(&self) -> Result<(), MorphError> {
        let invalid = |msg: String| Err(MorphError::InvalidConfig(msg));

        if self.side < 2 {
            return invalid(format!("grid side must be at least 2, got {}", self.side));
        }
        if self.sample_resolution == 0 {
            return invalid("sample resolution must be non-zero".into());
        }
        if !(0.0..=1.0).contains(&self.stray_probability) {
            return invalid(format!(
                "stray probability {} outside [0, 1]",
                self.stray_probability
            ));
        }
        if !non_negative(self.stray_extent) || !non_negative(self.jitter) {
            return invalid("stray extent and jitter must be non-negative".into());
        }
        if !non_negative(self.wait_secs) || !(self.morph_secs > 0.0) {
            return invalid(format!(
                "wait must be >= 0 and morph > 0 (got {} / {})",
                self.wait_secs, self.morph_secs
            ));
        }
        if !(self.relaxation > 0.0 && self.relaxation <= 1.0) {
            return invalid(format!("relaxation {} outside (0, 1]", self.relaxation));
        }
        if !non_negative(self.force_power) || !non_negative(self.force_radius) {
            return invalid("pointer force power and radius must be non-negative".into());
        }
        if self.shapes.is_empty() {
            return Err(MorphError::NoShapes);
        }
        Ok(())
    }
}

/// False for negatives and NaN.
fn non_negative(value: f32) -> bool {
    value >= 0.0
}
