//! Simulation pass systems.
//!
//! Main world:
//! 1. Advance the morph timeline
//! 2. Fold timeline, pointer and config into `SimulationSettings`
//!
//! Render world:
//! 1. Write the `SimParams` uniform
//! 2. Bind read buffer + both target shapes
//! 3. Full-screen fragment pass into the write buffer

use bevy::{
    core_pipeline::fullscreen_vertex_shader::fullscreen_shader_vertex_state,
    prelude::*,
    render::{
        render_asset::RenderAssets,
        render_graph::{self, RenderGraphContext},
        render_resource::*,
        renderer::{RenderContext, RenderDevice, RenderQueue},
        texture::GpuImage,
    },
};

use super::input::PointerState;
use super::setup::{PingPongTargets, ShapeTargets, POSITION_FORMAT};
use super::SimulationSettings;
use crate::config::MorphConfig;
use crate::resources::SimParams;
use crate::timeline::MorphTimeline;

// ==================== Main World ====================

/// Step the timeline by the frame delta and log transitions.
pub fn advance_timeline(time: Res<Time>, timeline: Option<ResMut<MorphTimeline>>) {
    let Some(mut timeline) = timeline else {
        return;
    };
    for event in timeline.tick(time.delta_secs()) {
        debug!("Morph timeline: {:?}", event);
    }
}

/// Rebuild the simulation pass configuration for this frame.
pub fn sync_simulation_settings(
    time: Res<Time>,
    config: Res<MorphConfig>,
    pointer: Res<PointerState>,
    timeline: Option<Res<MorphTimeline>>,
    mut settings: ResMut<SimulationSettings>,
) {
    let Some(timeline) = timeline else {
        return;
    };

    settings.params = SimParams {
        pointer: pointer.0.extend(0.0).to_array(),
        progress: timeline.progress(),
        time: time.elapsed_secs(),
        force_power: config.force_power,
        force_radius: config.force_radius,
        relaxation: config.relaxation,
        wobble: config.wobble,
        _padding: [0.0; 2],
    };
    settings.targets = timeline.targets();
}

// ==================== Pipeline Resources ====================

#[derive(Resource)]
pub struct MorphSimPipeline {
    pub pipeline: CachedRenderPipelineId,
    pub layout: BindGroupLayout,
}

impl FromWorld for MorphSimPipeline {
    fn from_world(world: &mut World) -> Self {
        let render_device = world.resource::<RenderDevice>();
        let asset_server = world.resource::<AssetServer>();
        let pipeline_cache = world.resource::<PipelineCache>();

        // Simulation layout: params, previous positions, target 1, target 2
        let layout = render_device.create_bind_group_layout(
            Some("Morph Simulation Layout"),
            &[
                uniform_buffer_entry(0),
                position_texture_entry(1), // previous frame (read buffer)
                position_texture_entry(2), // target 1
                position_texture_entry(3), // target 2
            ],
        );

        let shader = asset_server.load("shaders/morph_simulation.wgsl");

        let pipeline = pipeline_cache.queue_render_pipeline(RenderPipelineDescriptor {
            label: Some("Morph Simulation Pipeline".into()),
            layout: vec![layout.clone()],
            vertex: fullscreen_shader_vertex_state(),
            fragment: Some(FragmentState {
                shader,
                shader_defs: vec![],
                entry_point: "fragment".into(),
                targets: vec![Some(ColorTargetState {
                    format: POSITION_FORMAT,
                    blend: None,
                    write_mask: ColorWrites::ALL,
                })],
            }),
            primitive: PrimitiveState::default(),
            depth_stencil: None,
            multisample: MultisampleState::default(),
            push_constant_ranges: vec![],
            zero_initialize_workgroup_memory: false,
        });

        Self { pipeline, layout }
    }
}

fn uniform_buffer_entry(binding: u32) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility: ShaderStages::FRAGMENT,
        ty: BindingType::Buffer {
            ty: BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Unfilterable float texture, read with `textureLoad` (nearest texel).
fn position_texture_entry(binding: u32) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility: ShaderStages::FRAGMENT,
        ty: BindingType::Texture {
            sample_type: TextureSampleType::Float { filterable: false },
            view_dimension: TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

/// Resource holding the simulation uniform buffer
#[derive(Resource)]
pub struct SimParamsBuffer(pub Buffer);

impl FromWorld for SimParamsBuffer {
    fn from_world(world: &mut World) -> Self {
        let render_device = world.resource::<RenderDevice>();

        let buffer = render_device.create_buffer_with_data(&BufferInitDescriptor {
            label: Some("SimParams Buffer"),
            contents: bytemuck::bytes_of(&SimParams::default()),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });

        Self(buffer)
    }
}

// ==================== Bind Groups ====================

/// Bind group for this frame's simulation pass. Rebuilt every frame because
/// the read buffer alternates.
#[derive(Resource)]
pub struct SimBindGroup(pub BindGroup);

pub fn write_sim_params(
    render_queue: Res<RenderQueue>,
    buffer: Res<SimParamsBuffer>,
    settings: Option<Res<SimulationSettings>>,
) {
    let Some(settings) = settings else {
        return;
    };
    render_queue.write_buffer(&buffer.0, 0, bytemuck::bytes_of(&settings.params));
}

pub fn prepare_bind_group(
    mut commands: Commands,
    render_device: Res<RenderDevice>,
    pipeline: Res<MorphSimPipeline>,
    buffer: Res<SimParamsBuffer>,
    gpu_images: Res<RenderAssets<GpuImage>>,
    targets: Option<Res<PingPongTargets>>,
    shapes: Option<Res<ShapeTargets>>,
    settings: Option<Res<SimulationSettings>>,
) {
    commands.remove_resource::<SimBindGroup>();

    let (Some(targets), Some(shapes), Some(settings)) = (targets, shapes, settings) else {
        return;
    };

    // Sampling the buffer we are about to render into is undefined behaviour.
    let bindings = targets.0.frame_bindings();
    if bindings.sim_src == bindings.sim_dst {
        warn!("Ping-pong read and write targets alias; skipping simulation pass");
        return;
    }

    let (target1, target2) = settings.targets;
    let (Some(previous), Some(target1), Some(target2)) = (
        gpu_images.get(bindings.sim_src),
        shapes.get(target1).and_then(|handle| gpu_images.get(handle)),
        shapes.get(target2).and_then(|handle| gpu_images.get(handle)),
    ) else {
        // Textures still uploading
        return;
    };

    let bind_group = render_device.create_bind_group(
        Some("Morph Simulation BindGroup"),
        &pipeline.layout,
        &[
            BindGroupEntry {
                binding: 0,
                resource: buffer.0.as_entire_binding(),
            },
            BindGroupEntry {
                binding: 1,
                resource: BindingResource::TextureView(&previous.texture_view),
            },
            BindGroupEntry {
                binding: 2,
                resource: BindingResource::TextureView(&target1.texture_view),
            },
            BindGroupEntry {
                binding: 3,
                resource: BindingResource::TextureView(&target2.texture_view),
            },
        ],
    );

    commands.insert_resource(SimBindGroup(bind_group));
}

// ==================== Render Graph Node ====================

/// Renders the simulation step into the write buffer.
#[derive(Default)]
pub struct MorphSimulationNode;

impl render_graph::Node for MorphSimulationNode {
    fn run(
        &self,
        _graph: &mut RenderGraphContext,
        render_context: &mut RenderContext,
        world: &World,
    ) -> Result<(), render_graph::NodeRunError> {
        let pipeline_cache = world.resource::<PipelineCache>();
        let gpu_images = world.resource::<RenderAssets<GpuImage>>();

        let Some(pipeline) = world.get_resource::<MorphSimPipeline>() else {
            return Ok(());
        };
        let Some(bind_group) = world.get_resource::<SimBindGroup>() else {
            return Ok(());
        };
        let Some(targets) = world.get_resource::<PingPongTargets>() else {
            return Ok(());
        };
        let Some(write) = gpu_images.get(targets.0.frame_bindings().sim_dst) else {
            return Ok(());
        };
        // Pipeline may still be compiling; skip this frame
        let Some(render_pipeline) = pipeline_cache.get_render_pipeline(pipeline.pipeline) else {
            return Ok(());
        };

        let mut pass = render_context
            .command_encoder()
            .begin_render_pass(&RenderPassDescriptor {
                label: Some("Morph Simulation Pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &write.texture_view,
                    resolve_target: None,
                    // Every texel is overwritten by the full-screen triangle
                    ops: Operations {
                        load: LoadOp::Load,
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        pass.set_pipeline(render_pipeline);
        pass.set_bind_group(0, &bind_group.0, &[]);
        pass.draw(0..3, 0..1);

        Ok(())
    }
}
