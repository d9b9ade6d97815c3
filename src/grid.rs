//! Grid overlay drawn inside the container that owns the selection.

use crate::geometry::Rect;
use crate::overlay::CapturedShape;

/// Effective spacing below which no grid is drawn.
const MIN_VISIBLE_SPACING: f32 = 4.0;

/// Generate SVG path commands for grid lines covering `area`.
///
/// Lines are anchored at `origin` (device coordinates of local 0,0) and
/// repeat every `spacing * zoom` pixels in both directions. Returns an empty
/// string when the effective spacing is too small to be visible.
///
/// # Returns
/// SVG path commands string (e.g., "M 24 0 L 24 600 M 48 0 L 48 600...")
pub fn generate_grid_commands(area: &Rect, origin: (f32, f32), zoom: f32, spacing: f32) -> String {
    let effective_spacing = spacing * zoom;

    if effective_spacing.is_nan() || effective_spacing < MIN_VISIBLE_SPACING || area.is_empty() {
        return String::new();
    }

    // First line at or after the area's edge, keeping the grid pinned to origin.
    let offset_x = (origin.0 - area.x).rem_euclid(effective_spacing);
    let offset_y = (origin.1 - area.y).rem_euclid(effective_spacing);

    let mut commands = String::new();

    let mut x = area.x + offset_x;
    while x < area.right() {
        if !commands.is_empty() {
            commands.push(' ');
        }
        commands.push_str(&format!("M {} {} L {} {}", x, area.y, x, area.bottom()));
        x += effective_spacing;
    }

    let mut y = area.y + offset_y;
    while y < area.bottom() {
        if !commands.is_empty() {
            commands.push(' ');
        }
        commands.push_str(&format!("M {} {} L {} {}", area.x, y, area.right(), y));
        y += effective_spacing;
    }

    commands
}

/// Grid for a captured grid-owner shape.
#[derive(Debug, Clone, PartialEq)]
pub struct GridOverlay {
    area: Rect,
    origin: (f32, f32),
    zoom: f32,
}

impl GridOverlay {
    pub fn new(captured: &CapturedShape) -> Self {
        Self {
            area: captured.bounds(),
            origin: captured.transform.map_point(0.0, 0.0),
            zoom: captured.transform.scale,
        }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    /// Path commands for a grid of `spacing` local units.
    pub fn commands(&self, spacing: f32) -> String {
        generate_grid_commands(&self.area, self.origin, self.zoom, spacing)
    }
}
