//! Pointer and keyboard input.
//!
//! The pointer is projected onto the z = 0 plane and stored as a world-space
//! point for the repulsion force. The keyboard drives the diagnostic
//! playback controls.

use bevy::{prelude::*, window::PrimaryWindow};

use crate::render::DisplaySettings;
use crate::timeline::MorphTimeline;

/// Last known pointer position in world space. Last write wins.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq)]
pub struct PointerState(pub Vec3);

/// System to project the cursor into the world.
pub fn track_pointer(
    windows: Query<&Window, With<PrimaryWindow>>,
    display: Res<DisplaySettings>,
    mut pointer: ResMut<PointerState>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    if let Some(world) = display.viewport.pointer_to_world(cursor) {
        pointer.0 = world;
    }
}

/// System for the playback keys.
///
/// Space pauses or resumes the timeline, arrows scrub progress while paused,
/// Escape exits.
pub fn playback_controls(
    keyboard: Res<ButtonInput<KeyCode>>,
    timeline: Option<ResMut<MorphTimeline>>,
    mut exit: EventWriter<AppExit>,
) {
    const SCRUB_SPEED: f32 = 0.01; // progress per frame

    if keyboard.just_pressed(KeyCode::Escape) {
        exit.send(AppExit::Success);
        return;
    }

    let Some(mut timeline) = timeline else {
        return;
    };

    if keyboard.just_pressed(KeyCode::Space) {
        if timeline.is_paused() {
            timeline.resume();
            info!("Morph timeline resumed");
        } else {
            timeline.pause();
            info!("Morph timeline paused at progress {:.2}", timeline.progress());
        }
    }

    if timeline.is_paused() {
        let mut progress = timeline.progress();
        if keyboard.pressed(KeyCode::ArrowLeft) {
            progress -= SCRUB_SPEED;
        }
        if keyboard.pressed(KeyCode::ArrowRight) {
            progress += SCRUB_SPEED;
        }
        timeline.override_progress(progress);
    }
}
