//! Point rendering module - draws one sprite per particle at the position
//! stored in the latest simulation output.

mod viewport;

use bevy::{
    core_pipeline::core_2d::Transparent2d,
    ecs::{
        component::Component,
        query::ROQueryItem,
        system::{lifetimeless::SRes, SystemParamItem},
    },
    image::BevyDefault,
    prelude::*,
    render::{
        extract_resource::{ExtractResource, ExtractResourcePlugin},
        render_asset::RenderAssets,
        render_phase::{
            AddRenderCommand, DrawFunctions, PhaseItem, PhaseItemExtraIndex, RenderCommand,
            RenderCommandResult, SetItemPipeline, TrackedRenderPass, ViewSortedRenderPhases,
        },
        render_resource::*,
        renderer::{RenderDevice, RenderQueue},
        sync_world::MainEntity,
        texture::GpuImage,
        view::ExtractedView,
        Render, RenderApp, RenderSet,
    },
    window::{PrimaryWindow, WindowResized},
};

use crate::config::MorphConfig;
use crate::resources::DisplayParams;
use crate::simulation::{PingPongTargets, PointerState};

pub use viewport::{Viewport, EYE_DISTANCE, FAR, FOV_Y_DEGREES, NEAR, POINTER_PLANE_HALF_EXTENT};

/// Radius of the pointer marker, world units
pub const POINTER_MARKER_RADIUS: f32 = 0.01;

/// Per-frame configuration of the display pass.
#[derive(Resource, Clone, Debug, ExtractResource)]
pub struct DisplaySettings {
    pub viewport: Viewport,
    /// Grid side S; the pass draws S² points
    pub side: u32,
    pub point_size: f32,
    /// Where the pointer marker is drawn, on the z = 0 plane
    pub pointer: Vec3,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            side: crate::config::DEFAULT_SIDE,
            point_size: 2.0,
            pointer: Vec3::ZERO,
        }
    }
}

impl DisplaySettings {
    pub fn particle_count(&self) -> u32 {
        self.side * self.side
    }

    /// Instances in the point draw: every particle plus the pointer marker,
    /// which is always the last one.
    pub fn instance_count(&self) -> u32 {
        self.particle_count() + 1
    }

    /// Update projection aspect and surface size. GPU resources are untouched.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport.resize(width, height);
    }

    pub fn display_params(&self) -> DisplayParams {
        DisplayParams {
            view_proj: self.viewport.view_projection().to_cols_array_2d(),
            pointer: self.pointer.extend(POINTER_MARKER_RADIUS).to_array(),
            viewport: self.viewport.size().to_array(),
            point_size: self.point_size,
            side: self.side,
        }
    }
}

/// Plugin for rendering particles as instanced point sprites.
pub struct ParticleRenderPlugin;

impl Plugin for ParticleRenderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DisplaySettings>()
            .init_resource::<PointerState>()
            .add_plugins(ExtractResourcePlugin::<DisplaySettings>::default())
            .add_systems(Startup, configure_display)
            .add_systems(Update, handle_resize)
            .add_systems(PostUpdate, follow_pointer);

        let render_app = app.sub_app_mut(RenderApp);
        render_app
            .add_render_command::<Transparent2d, DrawParticles>()
            .add_systems(Render, write_display_params.in_set(RenderSet::Prepare))
            .add_systems(Render, prepare_pipeline.in_set(RenderSet::PrepareBindGroups))
            .add_systems(Render, queue_particles.in_set(RenderSet::Queue));
    }

    fn finish(&self, app: &mut App) {
        let render_app = app.sub_app_mut(RenderApp);
        render_app.init_resource::<ParticleRenderPipeline>();
        render_app.init_resource::<DisplayParamsBuffer>();
        // Spawn the particle entity in render world once
        render_app.world_mut().spawn(ExtractedParticles);
    }
}

// ==================== Main World ====================

/// Copy grid size and sprite size from the config, and the initial surface
/// size from the primary window.
fn configure_display(
    config: Res<MorphConfig>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut display: ResMut<DisplaySettings>,
) {
    display.side = config.side;
    display.point_size = config.point_size;
    if let Ok(window) = windows.get_single() {
        display.resize(window.width(), window.height());
    }
}

fn handle_resize(mut events: EventReader<WindowResized>, mut display: ResMut<DisplaySettings>) {
    for event in events.read() {
        display.resize(event.width, event.height);
        let aspect = display.viewport.aspect();
        debug!(
            "Viewport resized to {}x{} (aspect {:.3})",
            event.width,
            event.height,
            aspect
        );
    }
}

/// Move the pointer marker to the latest picked point.
fn follow_pointer(pointer: Res<PointerState>, mut display: ResMut<DisplaySettings>) {
    if pointer.is_changed() {
        display.pointer = pointer.0;
    }
}

// ==================== Render World ====================

/// Marker component for extracted particle rendering
#[derive(Component)]
pub struct ExtractedParticles;

/// Particle render pipeline resource
#[derive(Resource)]
pub struct ParticleRenderPipeline {
    pipeline: CachedRenderPipelineId,
    bind_group_layout: BindGroupLayout,
}

impl FromWorld for ParticleRenderPipeline {
    fn from_world(world: &mut World) -> Self {
        let render_device = world.resource::<RenderDevice>();

        let bind_group_layout = render_device.create_bind_group_layout(
            Some("Particle Display Bind Group Layout"),
            &[
                // Display uniform
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::VERTEX_FRAGMENT,
                    ty: BindingType::Buffer {
                        ty: BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Latest simulation output
                BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ShaderStages::VERTEX,
                    ty: BindingType::Texture {
                        sample_type: TextureSampleType::Float { filterable: false },
                        view_dimension: TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
            ],
        );

        let shader = world
            .resource::<AssetServer>()
            .load("shaders/morph_points.wgsl");

        let pipeline_cache = world.resource::<PipelineCache>();
        let pipeline = pipeline_cache.queue_render_pipeline(RenderPipelineDescriptor {
            label: Some("Particle Display Pipeline".into()),
            layout: vec![bind_group_layout.clone()],
            vertex: VertexState {
                shader: shader.clone(),
                shader_defs: vec![],
                entry_point: "vertex".into(),
                buffers: vec![],
            },
            fragment: Some(FragmentState {
                shader,
                shader_defs: vec![],
                entry_point: "fragment".into(),
                targets: vec![Some(ColorTargetState {
                    format: TextureFormat::bevy_default(),
                    blend: Some(BlendState::ALPHA_BLENDING),
                    write_mask: ColorWrites::ALL,
                })],
            }),
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleList,
                ..default()
            },
            // Overlay: never tested against or written into depth
            depth_stencil: Some(DepthStencilState {
                format: TextureFormat::Depth32Float,
                depth_write_enabled: false,
                depth_compare: CompareFunction::Always,
                stencil: StencilState::default(),
                bias: DepthBiasState::default(),
            }),
            multisample: MultisampleState {
                count: 4,
                ..default()
            },
            push_constant_ranges: vec![],
            zero_initialize_workgroup_memory: true,
        });

        Self {
            pipeline,
            bind_group_layout,
        }
    }
}

/// Resource holding the display uniform buffer
#[derive(Resource)]
pub struct DisplayParamsBuffer(pub Buffer);

impl FromWorld for DisplayParamsBuffer {
    fn from_world(world: &mut World) -> Self {
        let render_device = world.resource::<RenderDevice>();

        let buffer = render_device.create_buffer_with_data(&BufferInitDescriptor {
            label: Some("DisplayParams Buffer"),
            contents: bytemuck::bytes_of(&DisplayParams::default()),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });

        Self(buffer)
    }
}

/// Bind group for particle rendering, plus how many instances to draw
#[derive(Resource)]
pub struct ParticleBindGroup {
    bind_group: BindGroup,
    instance_count: u32,
}

/// Marker to track if we should render this frame
#[derive(Resource)]
pub struct ParticleRenderReady;

pub fn write_display_params(
    render_queue: Res<RenderQueue>,
    buffer: Res<DisplayParamsBuffer>,
    display: Option<Res<DisplaySettings>>,
) {
    let Some(display) = display else {
        return;
    };
    render_queue.write_buffer(&buffer.0, 0, bytemuck::bytes_of(&display.display_params()));
}

/// Bind the buffer the simulation writes this frame, so the display shows
/// this frame's positions rather than last frame's.
pub fn prepare_pipeline(
    mut commands: Commands,
    render_device: Res<RenderDevice>,
    particle_pipeline: Res<ParticleRenderPipeline>,
    buffer: Res<DisplayParamsBuffer>,
    gpu_images: Res<RenderAssets<GpuImage>>,
    targets: Option<Res<PingPongTargets>>,
    display: Option<Res<DisplaySettings>>,
) {
    // Remove old ready marker
    commands.remove_resource::<ParticleRenderReady>();

    let (Some(targets), Some(display)) = (targets, display) else {
        return;
    };
    let Some(positions) = gpu_images.get(targets.0.frame_bindings().display_src) else {
        return;
    };

    let bind_group = render_device.create_bind_group(
        Some("Particle Display Bind Group"),
        &particle_pipeline.bind_group_layout,
        &[
            BindGroupEntry {
                binding: 0,
                resource: buffer.0.as_entire_binding(),
            },
            BindGroupEntry {
                binding: 1,
                resource: BindingResource::TextureView(&positions.texture_view),
            },
        ],
    );
    commands.insert_resource(ParticleBindGroup {
        bind_group,
        instance_count: display.instance_count(),
    });

    commands.insert_resource(ParticleRenderReady);
}

/// Queue particles for rendering
pub fn queue_particles(
    mut transparent_phases: ResMut<ViewSortedRenderPhases<Transparent2d>>,
    particle_query: Query<Entity, With<ExtractedParticles>>,
    views: Query<Entity, With<ExtractedView>>,
    draw_functions: Res<DrawFunctions<Transparent2d>>,
    particle_pipeline: Res<ParticleRenderPipeline>,
    ready: Option<Res<ParticleRenderReady>>,
) {
    // Only queue if we are ready
    if ready.is_none() {
        return;
    }

    let Ok(particle_entity) = particle_query.get_single() else {
        return;
    };

    let draw_particles = draw_functions.read().id::<DrawParticles>();

    for view_entity in &views {
        let Some(transparent_phase) = transparent_phases.get_mut(&view_entity) else {
            continue;
        };

        transparent_phase.add(Transparent2d {
            sort_key: bevy::math::FloatOrd(0.0),
            entity: (particle_entity, MainEntity::from(particle_entity)),
            pipeline: particle_pipeline.pipeline,
            draw_function: draw_particles,
            batch_range: 0..1,
            extra_index: PhaseItemExtraIndex::NONE,
        });
    }
}

/// Render command for drawing particles
pub type DrawParticles = (SetItemPipeline, SetParticleBindGroup, DrawParticleInstances);

/// Set the particle bind group
pub struct SetParticleBindGroup;

impl<P: PhaseItem> RenderCommand<P> for SetParticleBindGroup {
    type Param = SRes<ParticleBindGroup>;
    type ViewQuery = ();
    type ItemQuery = ();

    fn render<'w>(
        _item: &P,
        _view: ROQueryItem<'w, Self::ViewQuery>,
        _entity: Option<ROQueryItem<'w, Self::ItemQuery>>,
        bind_group: SystemParamItem<'w, '_, Self::Param>,
        pass: &mut TrackedRenderPass<'w>,
    ) -> RenderCommandResult {
        pass.set_bind_group(0, &bind_group.into_inner().bind_group, &[]);
        RenderCommandResult::Success
    }
}

/// Draw particle instances
pub struct DrawParticleInstances;

impl<P: PhaseItem> RenderCommand<P> for DrawParticleInstances {
    type Param = SRes<ParticleBindGroup>;
    type ViewQuery = ();
    type ItemQuery = ();

    fn render<'w>(
        _item: &P,
        _view: ROQueryItem<'w, Self::ViewQuery>,
        _entity: Option<ROQueryItem<'w, Self::ItemQuery>>,
        bind_group: SystemParamItem<'w, '_, Self::Param>,
        pass: &mut TrackedRenderPass<'w>,
    ) -> RenderCommandResult {
        // 6 vertices (2 triangles) per instance: S² particles, then the marker
        pass.draw(0..6, 0..bind_group.into_inner().instance_count);
        RenderCommandResult::Success
    }
}
