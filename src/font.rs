//! Text measurement and painting.
//!
//! Glyph rasterisation is not part of this crate. Field visitors only need a
//! cell size and something that puts text into a [`Raster`], so both are
//! behind [`TextService`].

use crate::attributes::FontSize;
use crate::geometry::Rect;
use crate::raster::Raster;
use slint::Color;

pub trait TextService {
    /// Size of one character cell at zoom 1.
    fn cell_size(&self, font: FontSize) -> (f32, f32) {
        (font.width as f32, font.height as f32)
    }

    /// Extent of `text` laid out on one line per `\n`.
    fn measure(&self, text: &str, font: FontSize) -> (f32, f32) {
        let (w, h) = self.cell_size(font);
        let columns = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        let rows = text.lines().count().max(1);
        (columns as f32 * w, rows as f32 * h)
    }

    /// Paint `text` with its top-left corner at the device point `origin`.
    #[allow(clippy::too_many_arguments)]
    fn draw_text(
        &self,
        raster: &mut Raster,
        clip: &Rect,
        origin: (f32, f32),
        scale: f32,
        text: &str,
        font: FontSize,
        colour: Color,
    );
}

/// Draws every visible glyph as a solid block inset by one pixel.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockGlyphs;

impl TextService for BlockGlyphs {
    fn draw_text(
        &self,
        raster: &mut Raster,
        clip: &Rect,
        origin: (f32, f32),
        scale: f32,
        text: &str,
        font: FontSize,
        colour: Color,
    ) {
        let (w, h) = self.cell_size(font);
        let (w, h) = (w * scale, h * scale);
        let inset = scale.max(1.0);
        for (row, line) in text.lines().enumerate() {
            for (column, ch) in line.chars().enumerate() {
                if ch.is_whitespace() {
                    continue;
                }
                let cell = Rect::new(
                    origin.0 + column as f32 * w + inset,
                    origin.1 + row as f32 * h + inset,
                    w - 2.0 * inset,
                    h - 2.0 * inset,
                );
                raster.fill_rect(&cell, clip, colour);
            }
        }
    }
}
