//! Simulation module - GPU feedback loop that moves particles toward the
//! current morph target.
//!
//! Particle positions live in two `Rgba32Float` render targets. Each frame
//! a full-screen fragment pass reads the previous positions from one and
//! writes the new ones into the other; the roles flip once per frame.

mod input;
mod kernel;
mod ping_pong;
mod setup;
mod systems;

use bevy::{
    prelude::*,
    render::{
        extract_resource::{ExtractResource, ExtractResourcePlugin},
        render_graph::{RenderGraph, RenderLabel},
        renderer::RenderAdapter,
        Render, RenderApp, RenderSet,
    },
};

use crate::config::MorphConfig;
use crate::render::DisplaySettings;
use crate::resources::SimParams;

pub use input::PointerState;
pub use kernel::{step_texel, FORCE_SCALE, MIN_RELAXATION};
pub use ping_pong::{FrameBindings, PingPong};
pub use setup::{
    build_shape_fields, ensure_float_target_support, field_image, PingPongTargets, ShapeTargets,
    POSITION_FORMAT,
};

/// Per-frame configuration of the simulation pass.
#[derive(Resource, Clone, Debug, ExtractResource)]
pub struct SimulationSettings {
    pub params: SimParams,
    /// Shape indices bound as target 1 and target 2
    pub targets: (usize, usize),
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            params: SimParams::default(),
            targets: (0, 1),
        }
    }
}

/// Plugin that owns the morph targets, the timeline and the simulation pass.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MorphConfig>()
            .init_resource::<DisplaySettings>()
            .init_resource::<PointerState>()
            .init_resource::<SimulationSettings>()
            .add_plugins((
                ExtractResourcePlugin::<ShapeTargets>::default(),
                ExtractResourcePlugin::<PingPongTargets>::default(),
                ExtractResourcePlugin::<SimulationSettings>::default(),
            ))
            .add_systems(Startup, setup::setup_targets)
            .add_systems(First, setup::swap_targets)
            .add_systems(
                Update,
                (
                    input::playback_controls,
                    input::track_pointer,
                    systems::advance_timeline,
                    systems::sync_simulation_settings,
                )
                    .chain(),
            );

        let render_app = app.sub_app_mut(RenderApp);
        render_app
            .add_systems(Render, systems::write_sim_params.in_set(RenderSet::Prepare))
            .add_systems(
                Render,
                systems::prepare_bind_group.in_set(RenderSet::PrepareBindGroups),
            );

        // Simulation runs before any camera draws the points
        let mut render_graph = render_app.world_mut().resource_mut::<RenderGraph>();
        render_graph.add_node(MorphSimulationLabel, systems::MorphSimulationNode);
        render_graph.add_node_edge(MorphSimulationLabel, bevy::render::graph::CameraDriverLabel);
    }

    fn finish(&self, app: &mut App) {
        let render_app = app.sub_app_mut(RenderApp);

        let adapter = render_app.world().resource::<RenderAdapter>();
        let features = adapter.get_texture_format_features(POSITION_FORMAT);
        if let Err(err) = ensure_float_target_support(features.allowed_usages) {
            error!("{err}");
            panic!("{err}");
        }

        render_app.init_resource::<systems::SimParamsBuffer>();
        render_app.init_resource::<systems::MorphSimPipeline>();
    }
}

/// Label for the simulation node in the render graph.
#[derive(Debug, Hash, PartialEq, Eq, Clone, RenderLabel)]
pub struct MorphSimulationLabel;
