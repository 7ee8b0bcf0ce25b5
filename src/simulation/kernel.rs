//! CPU mirror of `morph_simulation.wgsl`.
//!
//! Keep in lockstep with the shader: same constants, same order of operations.

use bevy::math::Vec2;

use crate::resources::SimParams;

/// Scale from `force_power` units to world units per frame
pub const FORCE_SCALE: f32 = 0.001;
/// Lower bound on the relaxation rate so every step contracts toward the goal
pub const MIN_RELAXATION: f32 = 0.001;
/// Spatial frequency of the wobble phase offset
const WOBBLE_FREQUENCY: f32 = 10.0;

/// One simulation step for a single particle.
///
/// The particle moves a fixed fraction of the way toward
/// `mix(target1, target2, progress)` (plus a small time-driven wobble), after
/// an optional push away from the pointer. Because the step is a contraction
/// toward a bounded goal with a bounded push, repeated application never
/// diverges.
pub fn step_texel(
    previous: [f32; 4],
    target1: [f32; 4],
    target2: [f32; 4],
    params: &SimParams,
) -> [f32; 4] {
    let progress = params.progress.clamp(0.0, 1.0);
    let t1 = Vec2::new(target1[0], target1[1]);
    let t2 = Vec2::new(target2[0], target2[1]);

    let mut goal = t1.lerp(t2, progress);
    let phase = params.time + (goal.x + goal.y) * WOBBLE_FREQUENCY;
    goal += Vec2::new(phase.sin(), phase.cos()) * params.wobble;

    let mut position = Vec2::new(previous[0], previous[1]);
    if !position.is_finite() {
        position = goal;
    }

    if params.force_power > 0.0 && params.force_radius > 0.0 {
        let pointer = Vec2::new(params.pointer[0], params.pointer[1]);
        let away = position - pointer;
        let dist = away.length();
        if dist > 1e-5 && dist < params.force_radius {
            let falloff = 1.0 - dist / params.force_radius;
            position += away / dist * (params.force_power * falloff * falloff * FORCE_SCALE);
        }
    }

    let relaxation = params.relaxation.clamp(MIN_RELAXATION, 1.0);
    position = position.lerp(goal, relaxation);

    let flag = target1[3] + (target2[3] - target1[3]) * progress;
    [position.x, position.y, 0.0, flag]
}
