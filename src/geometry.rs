//! Device-space geometry used for frames, clips and overlay shapes.

/// Axis-aligned rectangle, `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Half-open containment: the right and bottom edges are outside.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Intersection; an empty rectangle when the two do not overlap.
    pub fn intersect(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Rect::new(x, y, (right - x).max(0.0), (bottom - y).max(0.0))
    }

    /// Grow by `margin` on every side.
    pub fn inflate(&self, margin: f32) -> Rect {
        Rect::new(
            self.x - margin,
            self.y - margin,
            self.width + 2.0 * margin,
            self.height + 2.0 * margin,
        )
    }

    /// Part of the segment `from`..`to` inside the rectangle (Liang-Barsky),
    /// or `None` when the segment misses it.
    pub fn clip_segment(
        &self,
        from: (f32, f32),
        to: (f32, f32),
    ) -> Option<((f32, f32), (f32, f32))> {
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let (mut t0, mut t1) = (0.0f32, 1.0f32);
        let edges = [
            (-dx, from.0 - self.x),
            (dx, self.right() - from.0),
            (-dy, from.1 - self.y),
            (dy, self.bottom() - from.1),
        ];
        for (p, q) in edges {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return None;
                }
                t1 = t1.min(r);
            }
        }
        Some((
            (from.0 + t0 * dx, from.1 + t0 * dy),
            (from.0 + t1 * dx, from.1 + t1 * dy),
        ))
    }

    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }
}

/// Uniform scale followed by translation: `device = local * scale + offset`.
///
/// This is the only kind of transform a frame can accumulate: children are
/// translated by their position, zoom scales everything uniformly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f32,
    pub dx: f32,
    pub dy: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub const fn identity() -> Self {
        Self { scale: 1.0, dx: 0.0, dy: 0.0 }
    }

    pub const fn scale(scale: f32) -> Self {
        Self { scale, dx: 0.0, dy: 0.0 }
    }

    /// The transform for a child positioned at local `(x, y)`.
    pub fn translate(&self, x: f32, y: f32) -> Transform {
        Transform {
            scale: self.scale,
            dx: self.dx + x * self.scale,
            dy: self.dy + y * self.scale,
        }
    }

    pub fn map_point(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.scale + self.dx, y * self.scale + self.dy)
    }

    pub fn map_rect(&self, rect: &Rect) -> Rect {
        let (x, y) = self.map_point(rect.x, rect.y);
        Rect::new(x, y, rect.width * self.scale, rect.height * self.scale)
    }

    /// Device point back to local coordinates.
    pub fn invert_point(&self, x: f32, y: f32) -> (f32, f32) {
        let s = if self.scale != 0.0 { self.scale } else { 1.0 };
        ((x - self.dx) / s, (y - self.dy) / s)
    }
}

/// The device-space outline a visitor reports for a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect(Rect),
    Ellipse(Rect),
    Polygon(Vec<(f32, f32)>),
}

impl Shape {
    pub fn bounds(&self) -> Rect {
        match self {
            Shape::Rect(r) | Shape::Ellipse(r) => *r,
            Shape::Polygon(points) => {
                let Some(&(x0, y0)) = points.first() else {
                    return Rect::default();
                };
                let (mut min_x, mut min_y, mut max_x, mut max_y) = (x0, y0, x0, y0);
                for &(x, y) in points {
                    min_x = min_x.min(x);
                    min_y = min_y.min(y);
                    max_x = max_x.max(x);
                    max_y = max_y.max(y);
                }
                Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
            }
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        match self {
            Shape::Rect(r) => r.contains(x, y),
            Shape::Ellipse(r) => {
                if r.is_empty() {
                    return false;
                }
                let rx = r.width / 2.0;
                let ry = r.height / 2.0;
                let nx = (x - (r.x + rx)) / rx;
                let ny = (y - (r.y + ry)) / ry;
                nx * nx + ny * ny <= 1.0
            }
            Shape::Polygon(points) => point_in_polygon(points, x, y),
        }
    }
}

/// Even-odd point in polygon test.
pub fn point_in_polygon(points: &[(f32, f32)], x: f32, y: f32) -> bool {
    let mut inside = false;
    let n = points.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = points[i];
        let (xj, yj) = points[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}
