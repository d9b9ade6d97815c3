//! Software raster surface backed by a slint pixel buffer.
//!
//! All primitives take device-space geometry plus the clip rectangle in
//! effect; a pixel is touched when its centre lies inside both.

use crate::geometry::Rect;
use slint::{Color, Image, Rgba8Pixel, SharedPixelBuffer};

pub fn to_pixel(colour: Color) -> Rgba8Pixel {
    Rgba8Pixel {
        r: colour.red(),
        g: colour.green(),
        b: colour.blue(),
        a: colour.alpha(),
    }
}

pub struct Raster {
    buffer: SharedPixelBuffer<Rgba8Pixel>,
}

impl Raster {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buffer: SharedPixelBuffer::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width() as f32, self.height() as f32)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8Pixel> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        self.buffer
            .as_slice()
            .get((y * self.width() + x) as usize)
            .copied()
    }

    pub fn buffer(&self) -> &SharedPixelBuffer<Rgba8Pixel> {
        &self.buffer
    }

    pub fn into_buffer(self) -> SharedPixelBuffer<Rgba8Pixel> {
        self.buffer
    }

    pub fn to_image(&self) -> Image {
        Image::from_rgba8(self.buffer.clone())
    }

    pub fn fill(&mut self, colour: Color) {
        let px = to_pixel(colour);
        self.buffer.make_mut_slice().fill(px);
    }

    /// Pixel index range `[start, end)` whose centres fall inside `[lo, hi)`.
    fn span(lo: f32, hi: f32, limit: u32) -> (u32, u32) {
        let start = (lo - 0.5).ceil().max(0.0);
        let end = (hi - 0.5).ceil().clamp(0.0, limit as f32);
        (start as u32, (end as u32).max(start as u32))
    }

    fn effective_clip(&self, clip: &Rect) -> Rect {
        clip.intersect(&self.bounds())
    }

    fn put(&mut self, x: u32, y: u32, px: Rgba8Pixel) {
        let width = self.width();
        if let Some(slot) = self.buffer.make_mut_slice().get_mut((y * width + x) as usize) {
            *slot = px;
        }
    }

    pub fn fill_rect(&mut self, rect: &Rect, clip: &Rect, colour: Color) {
        let area = rect.intersect(&self.effective_clip(clip));
        if area.is_empty() {
            return;
        }
        let px = to_pixel(colour);
        let (x0, x1) = Self::span(area.x, area.right(), self.width());
        let (y0, y1) = Self::span(area.y, area.bottom(), self.height());
        let width = self.width();
        let slice = self.buffer.make_mut_slice();
        for y in y0..y1 {
            let row = (y * width) as usize;
            slice[row + x0 as usize..row + x1 as usize].fill(px);
        }
    }

    /// Frame of `line_width` pixels drawn inside `rect`.
    pub fn stroke_rect(&mut self, rect: &Rect, line_width: f32, clip: &Rect, colour: Color) {
        let w = line_width.max(1.0).min(rect.width / 2.0).min(rect.height / 2.0);
        if w <= 0.0 {
            return;
        }
        let r = rect;
        self.fill_rect(&Rect::new(r.x, r.y, r.width, w), clip, colour);
        self.fill_rect(&Rect::new(r.x, r.bottom() - w, r.width, w), clip, colour);
        self.fill_rect(&Rect::new(r.x, r.y + w, w, r.height - 2.0 * w), clip, colour);
        self.fill_rect(&Rect::new(r.right() - w, r.y + w, w, r.height - 2.0 * w), clip, colour);
    }

    /// Square-brush line. The brush is clamped to the clip extent and the
    /// segment is clipped before stepping, so cost follows the visible part.
    pub fn draw_line(
        &mut self,
        from: (f32, f32),
        to: (f32, f32),
        line_width: f32,
        clip: &Rect,
        colour: Color,
    ) {
        let clip = self.effective_clip(clip);
        if clip.is_empty() || !line_width.is_finite() {
            return;
        }
        let thickness = line_width.max(1.0).min(clip.width.max(clip.height)).round();
        let half = (thickness / 2.0).floor();
        let Some((from, to)) = clip.inflate(thickness).clip_segment(from, to) else {
            return;
        };
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        if !(dx.is_finite() && dy.is_finite()) {
            return;
        }
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as u32;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = (from.0 + dx * t).floor() - half;
            let y = (from.1 + dy * t).floor() - half;
            self.fill_rect(&Rect::new(x, y, thickness, thickness), &clip, colour);
        }
    }

    pub fn fill_ellipse(&mut self, rect: &Rect, clip: &Rect, colour: Color) {
        self.ellipse_band(rect, None, clip, colour);
    }

    pub fn stroke_ellipse(&mut self, rect: &Rect, line_width: f32, clip: &Rect, colour: Color) {
        self.ellipse_band(rect, Some(line_width.max(1.0)), clip, colour);
    }

    fn ellipse_band(&mut self, rect: &Rect, band: Option<f32>, clip: &Rect, colour: Color) {
        let area = rect.intersect(&self.effective_clip(clip));
        if area.is_empty() {
            return;
        }
        let px = to_pixel(colour);
        let (rx, ry) = (rect.width / 2.0, rect.height / 2.0);
        let (cx, cy) = (rect.x + rx, rect.y + ry);
        let inner = band.map(|w| ((rx - w).max(0.0), (ry - w).max(0.0)));
        let (x0, x1) = Self::span(area.x, area.right(), self.width());
        let (y0, y1) = Self::span(area.y, area.bottom(), self.height());
        for y in y0..y1 {
            for x in x0..x1 {
                let (fx, fy) = (x as f32 + 0.5 - cx, y as f32 + 0.5 - cy);
                if (fx / rx).powi(2) + (fy / ry).powi(2) > 1.0 {
                    continue;
                }
                if let Some((irx, iry)) = inner {
                    if irx > 0.0 && iry > 0.0 && (fx / irx).powi(2) + (fy / iry).powi(2) < 1.0 {
                        continue;
                    }
                }
                self.put(x, y, px);
            }
        }
    }

    /// Even-odd scanline fill. `crossings` is caller-owned scratch space.
    pub fn fill_polygon(
        &mut self,
        points: &[(f32, f32)],
        clip: &Rect,
        colour: Color,
        crossings: &mut Vec<f32>,
    ) {
        if points.len() < 3 {
            return;
        }
        let clip = self.effective_clip(clip);
        if clip.is_empty() {
            return;
        }
        let px = to_pixel(colour);
        let (y0, y1) = Self::span(clip.y, clip.bottom(), self.height());
        let n = points.len();
        for y in y0..y1 {
            let sy = y as f32 + 0.5;
            crossings.clear();
            let mut j = n - 1;
            for i in 0..n {
                let (xi, yi) = points[i];
                let (xj, yj) = points[j];
                if (yi > sy) != (yj > sy) {
                    crossings.push(xi + (sy - yi) * (xj - xi) / (yj - yi));
                }
                j = i;
            }
            crossings.sort_by(|a, b| a.total_cmp(b));
            for pair in crossings.chunks_exact(2) {
                let lo = pair[0].max(clip.x);
                let hi = pair[1].min(clip.right());
                let (x0, x1) = Self::span(lo, hi, self.width());
                for x in x0..x1 {
                    self.put(x, y, px);
                }
            }
        }
    }

    pub fn stroke_polyline(
        &mut self,
        points: &[(f32, f32)],
        closed: bool,
        line_width: f32,
        clip: &Rect,
        colour: Color,
    ) {
        for pair in points.windows(2) {
            self.draw_line(pair[0], pair[1], line_width, clip, colour);
        }
        if closed && points.len() > 2 {
            if let (Some(&last), Some(&first)) = (points.last(), points.first()) {
                self.draw_line(last, first, line_width, clip, colour);
            }
        }
    }

    /// Fill the ring sector between `inner` and `outer` radius, sweeping
    /// counter-clockwise from `start_deg` to `end_deg` (0° = three o'clock).
    #[allow(clippy::too_many_arguments)]
    pub fn fill_sector(
        &mut self,
        centre: (f32, f32),
        outer: f32,
        inner: f32,
        start_deg: f32,
        end_deg: f32,
        clip: &Rect,
        colour: Color,
    ) {
        let bounds = Rect::new(centre.0 - outer, centre.1 - outer, outer * 2.0, outer * 2.0);
        let area = bounds.intersect(&self.effective_clip(clip));
        if area.is_empty() {
            return;
        }
        let px = to_pixel(colour);
        let sweep = (end_deg - start_deg).rem_euclid(360.0);
        let full = (end_deg - start_deg).abs() >= 360.0;
        let (x0, x1) = Self::span(area.x, area.right(), self.width());
        let (y0, y1) = Self::span(area.y, area.bottom(), self.height());
        for y in y0..y1 {
            for x in x0..x1 {
                let fx = x as f32 + 0.5 - centre.0;
                let fy = centre.1 - (y as f32 + 0.5);
                let r = (fx * fx + fy * fy).sqrt();
                if r > outer || r < inner {
                    continue;
                }
                let angle = fy.atan2(fx).to_degrees();
                if full || (angle - start_deg).rem_euclid(360.0) <= sweep {
                    self.put(x, y, px);
                }
            }
        }
    }

    /// Nearest-neighbour blit of `source` scaled into `dest`. Pixels equal to
    /// `transparent` or with zero alpha are skipped.
    pub fn blit(
        &mut self,
        source: &SharedPixelBuffer<Rgba8Pixel>,
        dest: &Rect,
        clip: &Rect,
        transparent: Option<Rgba8Pixel>,
    ) {
        let (sw, sh) = (source.width(), source.height());
        if sw == 0 || sh == 0 || dest.is_empty() {
            return;
        }
        let area = dest.intersect(&self.effective_clip(clip));
        if area.is_empty() {
            return;
        }
        let src = source.as_slice();
        let (x0, x1) = Self::span(area.x, area.right(), self.width());
        let (y0, y1) = Self::span(area.y, area.bottom(), self.height());
        for y in y0..y1 {
            let v = ((y as f32 + 0.5 - dest.y) / dest.height * sh as f32) as u32;
            for x in x0..x1 {
                let u = ((x as f32 + 0.5 - dest.x) / dest.width * sw as f32) as u32;
                let Some(&px) = src.get((v.min(sh - 1) * sw + u.min(sw - 1)) as usize) else {
                    continue;
                };
                if px.a == 0 || Some(px) == transparent {
                    continue;
                }
                self.put(x, y, px);
            }
        }
    }
}
