//! Fixed particle index space.
//!
//! Particle `i` lives at `row = i / S`, `col = i % S` for the whole run; the
//! texel it owns in every position texture is `(col, row)`.

use super::PositionField;

pub fn particle_index(row: u32, col: u32, side: u32) -> u32 {
    row * side + col
}

/// `(row, col)` of particle `index`.
pub fn grid_coords(index: u32, side: u32) -> (u32, u32) {
    (index / side, index % side)
}

/// Texture coordinate `(col / (S-1), row / (S-1))` of particle `index`.
pub fn particle_uv(index: u32, side: u32) -> [f32; 2] {
    let (row, col) = grid_coords(index, side);
    let denom = side.saturating_sub(1).max(1) as f32;
    [col as f32 / denom, row as f32 / denom]
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    (1.0 - t) * a + t * b
}

/// Evenly spaced rest layout: particle `row*S + col` sits at
/// `(lerp(-0.5, 0.5, row/(S-1)), lerp(-0.5, 0.5, col/(S-1)))` with w = 1.
pub fn grid_field(side: u32) -> PositionField {
    let mut field = PositionField::zeroed(side);
    let denom = side.saturating_sub(1).max(1) as f32;
    for row in 0..side {
        for col in 0..side {
            let index = particle_index(row, col, side) as usize;
            field.texels_mut()[index] = [
                lerp(-0.5, 0.5, row as f32 / denom),
                lerp(-0.5, 0.5, col as f32 / denom),
                0.0,
                1.0,
            ];
        }
    }
    field
}
