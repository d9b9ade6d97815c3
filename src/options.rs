//! Traversal configuration.
//!
//! [`RenderOptions`] is what the host controls per render; [`RootContext`] is
//! read from the document root once per traversal.

use crate::attributes::parse_number;
use crate::document::Document;
use crate::error::AttributeError;
use crate::palette::ColorDepth;
use serde::{Deserialize, Serialize};

/// Recursion ceiling used when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct RenderOptions {
    /// Uniform device-space scale.
    pub zoom: f32,
    pub color_depth: ColorDepth,
    /// Frame every container and field with a 1px border.
    pub draw_borders: bool,
    /// Capture the grid overlay for the parent of the active node.
    pub draw_grid: bool,
    /// Current flash phase. Flashing pictures are hidden while it is set.
    pub flash: bool,
    /// Nesting depth at which a subtree is abandoned.
    pub max_depth: usize,
    /// Grid spacing in object units.
    pub grid_spacing: f32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            color_depth: ColorDepth::default(),
            draw_borders: false,
            draw_grid: false,
            flash: false,
            max_depth: DEFAULT_MAX_DEPTH,
            grid_spacing: 8.0,
        }
    }
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_color_depth(mut self, depth: ColorDepth) -> Self {
        self.color_depth = depth;
        self
    }

    pub fn with_draw_borders(mut self, on: bool) -> Self {
        self.draw_borders = on;
        self
    }

    pub fn with_draw_grid(mut self, on: bool) -> Self {
        self.draw_grid = on;
        self
    }

    pub fn with_flash(mut self, on: bool) -> Self {
        self.flash = on;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_grid_spacing(mut self, spacing: f32) -> Self {
        self.grid_spacing = spacing;
        self
    }

    /// Zoom clamped to something a raster can be built with.
    pub fn effective_zoom(&self) -> f32 {
        if self.zoom.is_finite() && self.zoom > 0.0 {
            self.zoom
        } else {
            1.0
        }
    }
}

/// Terminal geometry and bitmap search paths stored on the root element.
#[derive(Debug, Clone, PartialEq)]
pub struct RootContext {
    /// Side of the square data/alarm mask area.
    pub dimension: f32,
    pub sk_width: f32,
    pub sk_height: f32,
    pub std_bitmap_path: String,
    pub fix_bitmap_path: String,
}

impl Default for RootContext {
    fn default() -> Self {
        Self {
            dimension: 200.0,
            sk_width: 60.0,
            sk_height: 32.0,
            std_bitmap_path: String::new(),
            fix_bitmap_path: String::new(),
        }
    }
}

impl RootContext {
    pub fn from_document(doc: &Document) -> Result<Self, AttributeError> {
        let mut ctx = Self::default();
        let Some(root) = doc.element(doc.root()) else {
            return Ok(ctx);
        };
        if let Some(raw) = root.attribute("dimension") {
            ctx.dimension = parse_number("dimension", raw)?;
        }
        if let Some(raw) = root.attribute("sk_width") {
            ctx.sk_width = parse_number("sk_width", raw)?;
        }
        if let Some(raw) = root.attribute("sk_height") {
            ctx.sk_height = parse_number("sk_height", raw)?;
        }
        if let Some(raw) = root.attribute("std_bitmap_path") {
            ctx.std_bitmap_path = raw.to_owned();
        }
        if let Some(raw) = root.attribute("fix_bitmap_path") {
            ctx.fix_bitmap_path = raw.to_owned();
        }
        Ok(ctx)
    }

    /// Directories searched for picture files, in order.
    pub fn bitmap_paths(&self) -> impl Iterator<Item = &str> {
        [self.std_bitmap_path.as_str(), self.fix_bitmap_path.as_str()]
            .into_iter()
            .filter(|p| !p.is_empty())
    }
}
