//! Shapes captured during a traversal for the overlay painter.

use crate::geometry::{Rect, Shape, Transform};

/// A device-space shape together with the transform that was in effect when
/// it was produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedShape {
    pub shape: Shape,
    pub transform: Transform,
}

impl CapturedShape {
    pub fn bounds(&self) -> Rect {
        self.shape.bounds()
    }

    /// SVG path commands tracing the outline of the shape.
    pub fn outline_commands(&self) -> String {
        match &self.shape {
            Shape::Rect(r) => format!(
                "M {} {} L {} {} L {} {} L {} {} Z",
                r.x,
                r.y,
                r.right(),
                r.y,
                r.right(),
                r.bottom(),
                r.x,
                r.bottom()
            ),
            Shape::Ellipse(r) => {
                let (rx, ry) = (r.width / 2.0, r.height / 2.0);
                let cy = r.y + ry;
                format!(
                    "M {} {cy} A {rx} {ry} 0 1 0 {} {cy} A {rx} {ry} 0 1 0 {} {cy} Z",
                    r.x,
                    r.right(),
                    r.x
                )
            }
            Shape::Polygon(points) => {
                let mut commands = String::new();
                for (i, (x, y)) in points.iter().enumerate() {
                    if i > 0 {
                        commands.push(' ');
                    }
                    let op = if i == 0 { 'M' } else { 'L' };
                    commands.push_str(&format!("{op} {x} {y}"));
                }
                if !commands.is_empty() {
                    commands.push_str(" Z");
                }
                commands
            }
        }
    }
}

/// Selection and grid shapes of one traversal. Each is set at most once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayState {
    pub selection: Option<CapturedShape>,
    pub grid: Option<CapturedShape>,
}

impl OverlayState {
    pub fn reset(&mut self) {
        self.selection = None;
        self.grid = None;
    }

    pub fn is_empty(&self) -> bool {
        self.selection.is_none() && self.grid.is_none()
    }
}
