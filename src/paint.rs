//! Painting visitor.
//!
//! Draws every visited node into a [`Raster`]. Colours go through the
//! [`Palette`] for the configured depth, line widths scale with the frame
//! transform and text goes through the [`TextService`].

use crate::attributes::{format_number, FillType, Justification, LineDirection};
use crate::error::RenderError;
use crate::font::TextService;
use crate::geometry::{Rect, Shape};
use crate::node::Node;
use crate::options::{RenderOptions, RootContext};
use crate::palette::Palette;
use crate::picture::PictureCache;
use crate::raster::{to_pixel, Raster};
use crate::visitor::{Frame, RenderVisitor, VisitResult};
use slint::Color;

/// Palette index used for the draw-borders frame.
const BORDER_INDEX: u8 = 8;

pub struct PaintVisitor<'a> {
    raster: Raster,
    palette: &'a dyn Palette,
    text: &'a dyn TextService,
    pictures: &'a PictureCache,
    options: &'a RenderOptions,
    root: &'a RootContext,
    // Scratch buffers, reused across nodes.
    points: Vec<(f32, f32)>,
    crossings: Vec<f32>,
    faults: Vec<RenderError>,
}

impl<'a> PaintVisitor<'a> {
    pub fn new(
        raster: Raster,
        options: &'a RenderOptions,
        root: &'a RootContext,
        palette: &'a dyn Palette,
        text: &'a dyn TextService,
        pictures: &'a PictureCache,
    ) -> Self {
        Self {
            raster,
            palette,
            text,
            pictures,
            options,
            root,
            points: Vec::new(),
            crossings: Vec::new(),
            faults: Vec::new(),
        }
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub fn into_raster(self) -> Raster {
        self.raster
    }

    fn colour(&self, index: u8) -> Color {
        self.palette.colour(index, self.options.color_depth)
    }

    /// Device width of a line `width` units wide. Zero stays zero.
    fn stroke_width(ctx: &Frame, width: u32) -> f32 {
        if width == 0 {
            0.0
        } else {
            (width as f32 * ctx.transform.scale).max(1.0)
        }
    }

    fn fill_background(&mut self, ctx: &Frame, node: &Node<'_>) -> Result<(), RenderError> {
        let colour = self.colour(node.background_colour()?);
        self.raster.fill_rect(&ctx.bounds, &ctx.clip, colour);
        Ok(())
    }

    fn debug_border(&mut self, ctx: &Frame) {
        if self.options.draw_borders {
            let colour = self.colour(BORDER_INDEX);
            self.raster.stroke_rect(&ctx.bounds, 1.0, &ctx.clip, colour);
        }
    }

    fn root_container(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult {
        self.fill_background(ctx, node)?;
        self.debug_border(ctx);
        Ok(Some(Shape::Rect(ctx.clip)))
    }

    fn frame_only(&mut self, ctx: &Frame) -> VisitResult {
        self.debug_border(ctx);
        Ok(Some(Shape::Rect(ctx.clip)))
    }

    /// Background plus one line of text, justified horizontally.
    fn text_field(&mut self, ctx: &Frame, node: &Node<'_>, text: &str) -> VisitResult {
        if !node.has_option("transparent") {
            self.fill_background(ctx, node)?;
        }
        let font = node.font_style()?;
        let (width, _) = ctx.local_size();
        let (text_width, _) = self.text.measure(text, font.size);
        let x = match node.justification()? {
            Justification::Left => 0.0,
            Justification::Middle => (width - text_width) / 2.0,
            Justification::Right => width - text_width,
        };
        let origin = ctx.transform.map_point(x, 0.0);
        let colour = self.colour(font.colour);
        self.text.draw_text(
            &mut self.raster,
            &ctx.clip,
            origin,
            ctx.transform.scale,
            text,
            font.size,
            colour,
        );
        self.debug_border(ctx);
        Ok(Some(Shape::Rect(ctx.clip)))
    }

    fn number_text(node: &Node<'_>) -> Result<String, RenderError> {
        let value = (node.value()? + node.offset()?) * node.scale()?;
        let length = node.length()?;
        Ok(format_number(
            value,
            node.number_of_decimals()?,
            node.number_format()?,
            node.has_option("leadingzeros"),
            node.has_option("blankzero"),
            length,
        ))
    }

    fn fill_colour(&self, node: &Node<'_>) -> Result<Option<Color>, RenderError> {
        let fill = node.fill_style()?;
        Ok(match fill.fill_type {
            FillType::NoFill => None,
            FillType::LineColour => Some(self.colour(node.line_style()?.colour)),
            FillType::FillColour | FillType::Pattern => Some(self.colour(fill.colour)),
        })
    }

    fn placeholder(&mut self, ctx: &Frame) {
        let grey = self.colour(7);
        let dark = self.colour(8);
        let b = ctx.bounds;
        self.raster.fill_rect(&b, &ctx.clip, grey);
        self.raster.draw_line((b.x, b.y), (b.right(), b.bottom()), 1.0, &ctx.clip, dark);
        self.raster.draw_line((b.x, b.bottom()), (b.right(), b.y), 1.0, &ctx.clip, dark);
    }
}

/// Position on a circle, angle in degrees counter-clockwise from three o'clock.
fn polar(centre: (f32, f32), radius: f32, degrees: f32) -> (f32, f32) {
    let rad = degrees.to_radians();
    (centre.0 + radius * rad.cos(), centre.1 - radius * rad.sin())
}

/// Angular span of a gauge: start, signed sweep from start to end.
/// Angles are stored in 2° units.
fn sweep(node: &Node<'_>, clockwise: bool) -> Result<(f32, f32), RenderError> {
    let start = node.start_angle()? as f32 * 2.0;
    let end = node.end_angle()? as f32 * 2.0;
    Ok(if clockwise {
        (start, -(start - end).rem_euclid(360.0))
    } else {
        (start, (end - start).rem_euclid(360.0))
    })
}

/// Fraction of the `min..=max` range covered by `value`, clamped.
fn fraction(value: f64, min: f64, max: f64) -> f32 {
    if max <= min {
        return 0.0;
    }
    ((value - min) / (max - min)).clamp(0.0, 1.0) as f32
}

impl RenderVisitor for PaintVisitor<'_> {
    fn working_set(&mut self, ctx: &Frame, node: &Node<'_>, _size: (f32, f32)) -> VisitResult {
        self.root_container(ctx, node)
    }

    fn data_mask(&mut self, ctx: &Frame, node: &Node<'_>, _size: (f32, f32)) -> VisitResult {
        self.root_container(ctx, node)
    }

    fn alarm_mask(&mut self, ctx: &Frame, node: &Node<'_>, _size: (f32, f32)) -> VisitResult {
        self.root_container(ctx, node)
    }

    fn soft_key_mask(&mut self, ctx: &Frame, node: &Node<'_>, _size: (f32, f32)) -> VisitResult {
        self.root_container(ctx, node)
    }

    fn key(&mut self, ctx: &Frame, node: &Node<'_>, _size: (f32, f32)) -> VisitResult {
        self.root_container(ctx, node)
    }

    fn auxiliary_function(&mut self, ctx: &Frame, node: &Node<'_>, _size: (f32, f32)) -> VisitResult {
        self.root_container(ctx, node)
    }

    fn auxiliary_input(&mut self, ctx: &Frame, node: &Node<'_>, _size: (f32, f32)) -> VisitResult {
        self.root_container(ctx, node)
    }

    fn button(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult {
        self.fill_background(ctx, node)?;
        if !node.has_option("noborder") {
            let colour = self.colour(node.border_colour()?);
            let width = Self::stroke_width(ctx, 1);
            self.raster.stroke_rect(&ctx.bounds, width, &ctx.clip, colour);
        }
        self.debug_border(ctx);
        Ok(Some(Shape::Rect(ctx.clip)))
    }

    fn container(&mut self, ctx: &Frame, _node: &Node<'_>) -> VisitResult {
        self.frame_only(ctx)
    }

    fn object_pointer(&mut self, ctx: &Frame, _node: &Node<'_>) -> VisitResult {
        self.frame_only(ctx)
    }

    fn input_boolean(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult {
        self.fill_background(ctx, node)?;
        if node.value()? != 0.0 {
            let colour = self.colour(node.foreground_colour()?);
            let (w, h) = ctx.local_size();
            let t = &ctx.transform;
            let tick = [
                t.map_point(0.2 * w, 0.5 * h),
                t.map_point(0.4 * w, 0.75 * h),
                t.map_point(0.8 * w, 0.25 * h),
            ];
            let width = Self::stroke_width(ctx, 2);
            self.raster.stroke_polyline(&tick, false, width, &ctx.clip, colour);
        }
        self.debug_border(ctx);
        Ok(Some(Shape::Rect(ctx.clip)))
    }

    fn input_string(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult {
        self.text_field(ctx, node, node.text())
    }

    fn input_number(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult {
        let text = Self::number_text(node)?;
        self.text_field(ctx, node, &text)
    }

    fn input_list(&mut self, ctx: &Frame, _node: &Node<'_>) -> VisitResult {
        self.frame_only(ctx)
    }

    fn output_string(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult {
        self.text_field(ctx, node, node.text())
    }

    fn output_number(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult {
        let text = Self::number_text(node)?;
        self.text_field(ctx, node, &text)
    }

    fn line(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult {
        let style = node.line_style()?;
        let b = ctx.bounds;
        let (from, to) = match node.line_direction()? {
            LineDirection::TopLeftToBottomRight => ((b.x, b.y), (b.right(), b.bottom())),
            LineDirection::BottomLeftToTopRight => ((b.x, b.bottom()), (b.right(), b.y)),
        };
        let colour = self.colour(style.colour);
        let width = Self::stroke_width(ctx, style.width);
        if width > 0.0 {
            self.raster.draw_line(from, to, width, &ctx.clip, colour);
        }
        Ok(Some(Shape::Rect(ctx.clip)))
    }

    fn rectangle(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult {
        if let Some(fill) = self.fill_colour(node)? {
            self.raster.fill_rect(&ctx.bounds, &ctx.clip, fill);
        }
        let style = node.line_style()?;
        let width = Self::stroke_width(ctx, style.width);
        if width > 0.0 {
            let colour = self.colour(style.colour);
            self.raster.stroke_rect(&ctx.bounds, width, &ctx.clip, colour);
        }
        Ok(Some(Shape::Rect(ctx.clip)))
    }

    fn ellipse(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult {
        if let Some(fill) = self.fill_colour(node)? {
            self.raster.fill_ellipse(&ctx.bounds, &ctx.clip, fill);
        }
        let style = node.line_style()?;
        let width = Self::stroke_width(ctx, style.width);
        if width > 0.0 {
            let colour = self.colour(style.colour);
            self.raster.stroke_ellipse(&ctx.bounds, width, &ctx.clip, colour);
        }
        Ok(Some(Shape::Ellipse(ctx.bounds)))
    }

    fn polygon(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult {
        let local = node.points()?;
        self.points.clear();
        self.points
            .extend(local.iter().map(|&(x, y)| ctx.transform.map_point(x, y)));
        if let Some(fill) = self.fill_colour(node)? {
            self.raster
                .fill_polygon(&self.points, &ctx.clip, fill, &mut self.crossings);
        }
        let style = node.line_style()?;
        let width = Self::stroke_width(ctx, style.width);
        if width > 0.0 {
            let colour = self.colour(style.colour);
            self.raster
                .stroke_polyline(&self.points, true, width, &ctx.clip, colour);
        }
        Ok(Some(Shape::Polygon(self.points.clone())))
    }

    fn meter(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult {
        let b = ctx.bounds;
        let radius = b.width.min(b.height) / 2.0;
        let centre = (b.x + radius, b.y + radius);
        let (start, span) = sweep(node, node.has_option("deflectionclockwise"))?;
        let tick_colour = self.colour(node.colour("arc_and_tick_colour", 0)?);
        let line = Self::stroke_width(ctx, 1);

        if node.has_option("drawborder") {
            let colour = self.colour(node.border_colour()?);
            self.raster.stroke_ellipse(&b, line, &ctx.clip, colour);
        }
        if node.has_option("drawarc") {
            let (lo, hi) = if span >= 0.0 { (start, start + span) } else { (start + span, start) };
            let outer = radius - line;
            self.raster
                .fill_sector(centre, outer, outer - line, lo, hi, &ctx.clip, tick_colour);
        }
        let ticks = node.number_of_ticks()?;
        if node.has_option("drawticks") && ticks > 0 {
            let steps = (ticks.max(2) - 1) as f32;
            for i in 0..ticks {
                let angle = start + span * i as f32 / steps;
                let from = polar(centre, radius * 0.75, angle);
                let to = polar(centre, radius - line, angle);
                self.raster.draw_line(from, to, line, &ctx.clip, tick_colour);
            }
        }
        let t = fraction(node.value()?, node.min_value()?, node.max_value()?);
        let needle = self.colour(node.colour("needle_colour", 0)?);
        let tip = polar(centre, radius * 0.9, start + span * t);
        self.raster.draw_line(centre, tip, line, &ctx.clip, needle);
        Ok(Some(Shape::Ellipse(b)))
    }

    fn linear_bar_graph(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult {
        let b = ctx.bounds;
        let horizontal = node.has_option("horizontal");
        let grow_positive = node.has_option("growpositive");
        let (min, max) = (node.min_value()?, node.max_value()?);
        let t = fraction(node.value()?, min, max);
        let bar = match (horizontal, grow_positive) {
            (true, true) => Rect::new(b.x, b.y, b.width * t, b.height),
            (true, false) => Rect::new(b.right() - b.width * t, b.y, b.width * t, b.height),
            (false, true) => Rect::new(b.x, b.bottom() - b.height * t, b.width, b.height * t),
            (false, false) => Rect::new(b.x, b.y, b.width, b.height * t),
        };
        let colour = self.colour(node.colour("colour", 0)?);
        self.raster.fill_rect(&bar, &ctx.clip, colour);
        let line = Self::stroke_width(ctx, 1);
        if node.has_option("drawborder") {
            self.raster.stroke_rect(&b, line, &ctx.clip, colour);
        }
        if node.has_option("drawtarget") {
            let target = fraction(node.number("target_value", 0.0)?, min, max);
            let target_colour = self.colour(node.colour("target_line_colour", 0)?);
            let (from, to) = match (horizontal, grow_positive) {
                (true, true) => {
                    let x = b.x + b.width * target;
                    ((x, b.y), (x, b.bottom()))
                }
                (true, false) => {
                    let x = b.right() - b.width * target;
                    ((x, b.y), (x, b.bottom()))
                }
                (false, true) => {
                    let y = b.bottom() - b.height * target;
                    ((b.x, y), (b.right(), y))
                }
                (false, false) => {
                    let y = b.y + b.height * target;
                    ((b.x, y), (b.right(), y))
                }
            };
            self.raster.draw_line(from, to, line, &ctx.clip, target_colour);
        }
        Ok(Some(Shape::Rect(ctx.clip)))
    }

    fn arched_bar_graph(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult {
        let b = ctx.bounds;
        let radius = b.width.min(b.height) / 2.0;
        let centre = (b.x + b.width / 2.0, b.y + b.height / 2.0);
        let (start, span) = sweep(node, node.has_option("deflectionclockwise"))?;
        let scale = ctx.transform.scale;
        let bar_width = (node.number("bar_graph_width", (radius / scale / 4.0) as f64)? as f32
            * scale)
            .min(radius);
        let colour = self.colour(node.colour("colour", 0)?);
        let line = Self::stroke_width(ctx, 1);

        if node.has_option("drawborder") {
            let (lo, hi) = if span >= 0.0 { (start, start + span) } else { (start + span, start) };
            self.raster
                .fill_sector(centre, radius, radius - line, lo, hi, &ctx.clip, colour);
            let inner = radius - bar_width;
            self.raster
                .fill_sector(centre, inner + line, inner, lo, hi, &ctx.clip, colour);
        }
        let t = fraction(node.value()?, node.min_value()?, node.max_value()?);
        if t > 0.0 {
            let end = start + span * t;
            let (lo, hi) = if span >= 0.0 { (start, end) } else { (end, start) };
            self.raster
                .fill_sector(centre, radius, radius - bar_width, lo, hi, &ctx.clip, colour);
        }
        Ok(Some(Shape::Rect(ctx.clip)))
    }

    fn picture_graphic(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult {
        if node.has_option("flashing") && self.options.flash {
            return Ok(Some(Shape::Rect(ctx.clip)));
        }
        let transparent = if node.has_option("transparent") {
            Some(to_pixel(self.colour(node.transparency_colour()?)))
        } else {
            None
        };
        let loaded = match node.file() {
            Some(file) => self.pictures.load(file, self.root.bitmap_paths()),
            None => Err(RenderError::Resource {
                path: String::new(),
                reason: "no file given".to_owned(),
            }),
        };
        match loaded {
            Ok(buffer) => {
                self.raster.blit(&buffer, &ctx.bounds, &ctx.clip, transparent);
            }
            Err(err) => {
                self.placeholder(ctx);
                self.faults.push(err);
            }
        }
        Ok(Some(Shape::Rect(ctx.clip)))
    }

    fn take_faults(&mut self) -> Vec<RenderError> {
        std::mem::take(&mut self.faults)
    }
}
