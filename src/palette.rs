use serde::{Deserialize, Serialize};
use slint::Color;

/// Colour depth of the emulated terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorDepth {
    /// 1 bit: black and white.
    Monochrome,
    /// 4 bit: the sixteen standard colours.
    Colors16,
    /// 8 bit: the full 256 entry palette.
    #[default]
    Colors256,
}

impl ColorDepth {
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            1 => Some(ColorDepth::Monochrome),
            4 => Some(ColorDepth::Colors16),
            8 => Some(ColorDepth::Colors256),
            _ => None,
        }
    }
}

/// Maps palette indices to display colours for a given depth.
pub trait Palette {
    fn colour(&self, index: u8, depth: ColorDepth) -> Color;
}

const STANDARD: [(u8, u8, u8); 16] = [
    (0x00, 0x00, 0x00),
    (0xFF, 0xFF, 0xFF),
    (0x00, 0x99, 0x00),
    (0x00, 0x99, 0x99),
    (0x99, 0x00, 0x00),
    (0x99, 0x00, 0x99),
    (0x99, 0x99, 0x00),
    (0xCC, 0xCC, 0xCC),
    (0x99, 0x99, 0x99),
    (0x00, 0x00, 0xFF),
    (0x00, 0xFF, 0x00),
    (0x00, 0xFF, 0xFF),
    (0xFF, 0x00, 0x00),
    (0xFF, 0x00, 0xFF),
    (0xFF, 0xFF, 0x00),
    (0x00, 0x00, 0x99),
];

/// The standard terminal palette: 16 named colours, a 6x6x6 colour cube at
/// 16..=231 and black for the proprietary range.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardPalette;

impl StandardPalette {
    fn rgb(index: u8) -> (u8, u8, u8) {
        match index {
            0..=15 => STANDARD[index as usize],
            16..=231 => {
                let i = index - 16;
                (i / 36 * 0x33, (i / 6) % 6 * 0x33, i % 6 * 0x33)
            }
            _ => (0, 0, 0),
        }
    }

    fn nearest_standard(rgb: (u8, u8, u8)) -> (u8, u8, u8) {
        let distance = |c: &(u8, u8, u8)| {
            let dr = c.0 as i32 - rgb.0 as i32;
            let dg = c.1 as i32 - rgb.1 as i32;
            let db = c.2 as i32 - rgb.2 as i32;
            dr * dr + dg * dg + db * db
        };
        STANDARD
            .iter()
            .min_by_key(|c| distance(c))
            .copied()
            .unwrap_or((0, 0, 0))
    }
}

impl Palette for StandardPalette {
    fn colour(&self, index: u8, depth: ColorDepth) -> Color {
        let (r, g, b) = match depth {
            ColorDepth::Monochrome if index == 0 => (0, 0, 0),
            ColorDepth::Monochrome => (0xFF, 0xFF, 0xFF),
            ColorDepth::Colors16 => Self::nearest_standard(Self::rgb(index)),
            ColorDepth::Colors256 => Self::rgb(index),
        };
        Color::from_rgb_u8(r, g, b)
    }
}
