//! GPU-compatible data structures for the morph simulation.
//!
//! All structs use `#[repr(C)]` and implement `Pod`/`Zeroable` for GPU buffer compatibility.

use bytemuck::{Pod, Zeroable};

/// Uniform block consumed by the simulation fragment shader.
///
/// Rebuilt every frame from `SimulationSettings` and written into the
/// simulation uniform buffer before the pass runs.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub struct SimParams {
    /// Pointer position in world space (xyz), w unused
    pub pointer: [f32; 4],
    /// Interpolation between target 1 (0.0) and target 2 (1.0)
    pub progress: f32,
    /// Elapsed time in seconds
    pub time: f32,
    /// Pointer repulsion strength. 0.0 disables the force entirely
    pub force_power: f32,
    /// Distance from the pointer beyond which the force vanishes
    pub force_radius: f32,
    /// Fraction of the remaining distance to the target covered per frame
    pub relaxation: f32,
    /// Amplitude of the time-driven drift around the target
    pub wobble: f32,
    /// Padding for 16-byte alignment (48 bytes total)
    pub _padding: [f32; 2],
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            pointer: [0.0; 4],
            progress: 0.0,
            time: 0.0,
            force_power: 0.0,
            force_radius: 0.15,
            relaxation: 0.08,
            wobble: 0.0015,
            _padding: [0.0; 2],
        }
    }
}

/// Uniform block consumed by the point display shaders.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub struct DisplayParams {
    /// Column-major view-projection matrix
    pub view_proj: [[f32; 4]; 4],
    /// Pointer marker centre (xyz) and radius (w), world units
    pub pointer: [f32; 4],
    /// Surface size in logical pixels
    pub viewport: [f32; 2],
    /// Point sprite diameter in pixels
    pub point_size: f32,
    /// Side length S of the particle grid
    pub side: u32,
}

impl Default for DisplayParams {
    fn default() -> Self {
        Self {
            view_proj: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
            pointer: [0.0; 4],
            viewport: [1280.0, 720.0],
            point_size: 2.0,
            side: 256,
        }
    }
}
