//! Built-in shapes, used when no image files are supplied.

use image::{Rgba, RgbaImage};

const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const PAPER: Rgba<u8> = Rgba([255, 255, 255, 255]);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProceduralShape {
    /// Filled disc, radius 0.3
    Circle,
    /// Filled square, side 0.5
    Square,
    /// Annulus between radii 0.25 and 0.4
    Ring,
    /// Plus sign, arms 0.8 long and 0.16 wide
    Cross,
}

impl ProceduralShape {
    pub const ALL: [ProceduralShape; 4] = [
        ProceduralShape::Circle,
        ProceduralShape::Square,
        ProceduralShape::Ring,
        ProceduralShape::Cross,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ProceduralShape::Circle => "circle",
            ProceduralShape::Square => "square",
            ProceduralShape::Ring => "ring",
            ProceduralShape::Cross => "cross",
        }
    }

    /// Whether the centred coordinate `(u, v)` in [-0.5, 0.5]² is ink.
    pub fn contains(self, u: f32, v: f32) -> bool {
        let r = (u * u + v * v).sqrt();
        match self {
            ProceduralShape::Circle => r <= 0.3,
            ProceduralShape::Square => u.abs() <= 0.25 && v.abs() <= 0.25,
            ProceduralShape::Ring => (0.25..=0.4).contains(&r),
            ProceduralShape::Cross => {
                (u.abs() <= 0.08 && v.abs() <= 0.4) || (v.abs() <= 0.08 && u.abs() <= 0.4)
            }
        }
    }

    /// Render black ink on white paper at `size`×`size`.
    pub fn render(self, size: u32) -> RgbaImage {
        let scale = size.max(1) as f32;
        RgbaImage::from_fn(size, size, |x, y| {
            let u = (x as f32 + 0.5) / scale - 0.5;
            let v = (y as f32 + 0.5) / scale - 0.5;
            if self.contains(u, v) {
                INK
            } else {
                PAPER
            }
        })
    }
}
