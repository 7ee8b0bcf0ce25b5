//! Texture initialization for the morph simulation.

use bevy::{
    asset::RenderAssetUsages,
    prelude::*,
    render::{
        extract_resource::ExtractResource,
        render_resource::{Extent3d, TextureDimension, TextureFormat, TextureUsages},
    },
};
use rand::{rngs::StdRng, SeedableRng};

use super::PingPong;
use crate::config::{MorphConfig, ShapeSource};
use crate::error::MorphError;
use crate::sampling::{encode_shape, grid_field, load_image, sample_ink, PositionField};
use crate::timeline::MorphTimeline;

/// Format of every position texture: static targets and both ping-pong buffers
pub const POSITION_FORMAT: TextureFormat = TextureFormat::Rgba32Float;

/// Immutable target fields, one per source shape, in timeline order.
#[derive(Resource, Clone, ExtractResource)]
pub struct ShapeTargets {
    pub images: Vec<Handle<Image>>,
}

impl ShapeTargets {
    /// Handle for shape `index`, wrapping past the end of the set.
    pub fn get(&self, index: usize) -> Option<&Handle<Image>> {
        if self.images.is_empty() {
            return None;
        }
        self.images.get(index % self.images.len())
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// The two simulation render targets and their current roles.
#[derive(Resource, Clone, ExtractResource)]
pub struct PingPongTargets(pub PingPong<Handle<Image>>);

/// Wrap a position field as an `Rgba32Float` image that can be sampled and
/// rendered into.
pub fn field_image(field: &PositionField) -> Image {
    let mut image = Image::new(
        Extent3d {
            width: field.side(),
            height: field.side(),
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        field.as_bytes().to_vec(),
        POSITION_FORMAT,
        RenderAssetUsages::RENDER_WORLD,
    );
    image.texture_descriptor.usage =
        TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST | TextureUsages::RENDER_ATTACHMENT;
    image
}

/// Fails unless `allowed` covers everything the position textures need.
pub fn ensure_float_target_support(allowed: TextureUsages) -> Result<(), MorphError> {
    let required = TextureUsages::TEXTURE_BINDING | TextureUsages::RENDER_ATTACHMENT;
    if allowed.contains(required) {
        Ok(())
    } else {
        Err(MorphError::UnsupportedFloatTarget(POSITION_FORMAT))
    }
}

/// Sample and encode every configured shape, in order.
///
/// A single generator, seeded from `config.seed` when present, feeds all
/// shapes so the whole set is reproducible.
pub fn build_shape_fields(config: &MorphConfig) -> Result<Vec<PositionField>, MorphError> {
    config.validate()?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let sample_params = config.sample_params();
    let encode_params = config.encode_params();

    config
        .shapes
        .iter()
        .map(|source| -> Result<PositionField, MorphError> {
            let (label, image) = match source {
                ShapeSource::File(path) => (path.display().to_string(), load_image(path)?),
                ShapeSource::Procedural(shape) => {
                    (shape.name().to_string(), shape.render(config.sample_resolution))
                }
            };
            let sample = sample_ink(&image, &sample_params);
            let field = encode_shape(&sample, config.side, &encode_params, &mut rng);
            info!(
                "Shape '{}': {} ink pixels, {}/{} particles on the outline",
                label,
                sample.len(),
                field.active_count(),
                field.len()
            );
            Ok(field)
        })
        .collect()
}

/// Startup system: build every texture the simulation needs.
///
/// Failure here is fatal; the app is asked to exit with an error code.
pub fn setup_targets(
    mut commands: Commands,
    config: Res<MorphConfig>,
    mut images: ResMut<Assets<Image>>,
    mut exit: EventWriter<AppExit>,
) {
    let built = build_shape_fields(&config).and_then(|fields| {
        let timeline = MorphTimeline::new(fields.len(), config.timeline_settings())?;
        Ok((fields, timeline))
    });

    let (fields, timeline) = match built {
        Ok(built) => built,
        Err(err) => {
            error!("Failed to initialise morph targets: {err}");
            if let Some(source) = std::error::Error::source(&err) {
                error!("  caused by: {source}");
            }
            exit.send(AppExit::error());
            return;
        }
    };

    let shape_targets = ShapeTargets {
        images: fields.iter().map(|field| images.add(field_image(field))).collect(),
    };

    // Both buffers start as the flat grid, so the first frames fly from the
    // grid into the first shape.
    let grid = field_image(&grid_field(config.side));
    let ping_pong = PingPong::new(images.add(grid.clone()), images.add(grid));

    info!(
        "Morph field ready: {} particles ({}x{}), {} shapes",
        config.particle_count(),
        config.side,
        config.side,
        shape_targets.len()
    );

    commands.insert_resource(shape_targets);
    commands.insert_resource(PingPongTargets(ping_pong));
    commands.insert_resource(timeline);
}

/// Flip read/write roles once per frame, before extraction.
pub fn swap_targets(targets: Option<ResMut<PingPongTargets>>) {
    if let Some(mut targets) = targets {
        targets.0.swap();
    }
}
