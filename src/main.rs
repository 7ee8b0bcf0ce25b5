//! Morphfield - Main Entry
//!
//! Particles sampled from images morph from shape to shape, simulated in a
//! GPU ping-pong feedback loop.

use std::path::PathBuf;

use bevy::prelude::*;
use clap::Parser;
use morphfield::config::{MorphConfig, ShapeSource};
use morphfield::render::ParticleRenderPlugin;
use morphfield::simulation::SimulationPlugin;
use morphfield::timeline::Easing;

#[derive(Parser, Debug)]
#[command(name = "morphfield", version, about = "Image-sampled particle morphing")]
struct Cli {
    /// Images to morph between, in order. Built-in shapes are used when empty.
    #[arg(value_name = "IMAGE")]
    images: Vec<PathBuf>,

    /// Particle grid side length (S² particles).
    #[arg(long, default_value_t = morphfield::config::DEFAULT_SIDE)]
    side: u32,

    /// Seed for the particle encoder; random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Pointer repulsion strength (0 disables it).
    #[arg(long, default_value_t = 0.0)]
    force_power: f32,

    /// Pointer repulsion radius in world units.
    #[arg(long)]
    force_radius: Option<f32>,

    /// Seconds to hold before each morph.
    #[arg(long)]
    wait: Option<f32>,

    /// Seconds each morph takes.
    #[arg(long)]
    morph: Option<f32>,

    /// Blend translucent pixels over white before the ink threshold.
    #[arg(long)]
    composite_alpha: bool,

    /// Use linear progress instead of ease-out.
    #[arg(long)]
    linear: bool,

    /// Point sprite diameter in pixels.
    #[arg(long)]
    point_size: Option<f32>,

    /// Exit after this many frames.
    #[arg(long)]
    frames: Option<u32>,
}

impl Cli {
    fn to_config(&self) -> MorphConfig {
        let mut config = MorphConfig {
            side: self.side,
            seed: self.seed,
            force_power: self.force_power,
            composite_alpha: self.composite_alpha,
            ..default()
        };
        if !self.images.is_empty() {
            config.shapes = self.images.iter().cloned().map(ShapeSource::File).collect();
        }
        if let Some(radius) = self.force_radius {
            config.force_radius = radius;
        }
        if let Some(wait) = self.wait {
            config.wait_secs = wait;
        }
        if let Some(morph) = self.morph {
            config.morph_secs = morph;
        }
        if self.linear {
            config.easing = Easing::Linear;
        }
        if let Some(size) = self.point_size {
            config.point_size = size;
        }
        config
    }
}

fn main() -> AppExit {
    let cli = Cli::parse();

    App::new()
        .insert_resource(ClearColor(Color::srgb_u8(0x22, 0x22, 0x22)))
        .insert_resource(cli.to_config())
        .insert_resource(FrameCounter {
            frames: 0,
            limit: cli.frames,
        })
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Morphfield".into(),
                resolution: (1280.0, 720.0).into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(SimulationPlugin)
        .add_plugins(ParticleRenderPlugin)
        .add_systems(Startup, setup_camera)
        .add_systems(Update, count_frames)
        .run()
}

/// Set up the 2D main camera the point pass draws through
fn setup_camera(mut commands: Commands) {
    commands.spawn((Camera2d, Msaa::Sample4));
}

/// Frame counter for logging and the optional frame limit
#[derive(Resource)]
struct FrameCounter {
    frames: u32,
    limit: Option<u32>,
}

/// Log every N frames; request exit once the limit is reached
fn count_frames(mut counter: ResMut<FrameCounter>, mut exit: EventWriter<AppExit>) {
    counter.frames += 1;
    if counter.frames % 60 == 0 {
        info!("Frame {}: morph running...", counter.frames);
    }
    if counter.limit.is_some_and(|limit| counter.frames >= limit) {
        info!("Frame limit {} reached, exiting", counter.frames);
        exit.send(AppExit::Success);
    }
}
