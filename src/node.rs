//! Resolved view of one tree position.
//!
//! A position in the document holds either an *actual* object or a *link*
//! (`include_object`) naming an actual object declared elsewhere. A link may
//! override geometry and role; every other attribute is read from the actual
//! object. [`NodeView`] records which case applies, [`Node`] is the borrowed
//! view handed to visitors.

use crate::attributes::{
    parse_bool, parse_bounded, parse_colour, parse_number, FillType, FontSize, Justification,
    LineDirection, NumberFormat, Options,
};
use crate::document::{Document, Element, ElementId};
use crate::error::AttributeError;
use crate::kind::ObjectKind;

/// Upper bounds of the one-byte count attributes.
pub const MAX_LINE_WIDTH: u32 = 255;
pub const MAX_FIELD_LENGTH: u32 = 255;
pub const MAX_TICKS: u32 = 255;
/// Most decimals a number field shows.
pub const MAX_DECIMALS: u32 = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// The position holds the actual object.
    Actual { kind: ObjectKind },
    /// The position holds a link resolving to `target`.
    Linked { target: ElementId, kind: ObjectKind },
    /// The position holds a link whose name resolves to nothing.
    Broken { name: Option<String> },
}

/// Classification of one child position, built once and cached by the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeView {
    position: ElementId,
    binding: Binding,
}

impl NodeView {
    pub fn new(doc: &Document, position: ElementId) -> Self {
        let binding = match doc.element(position) {
            None => Binding::Broken { name: None },
            Some(element) if element.is_link() => {
                let name = element.name().map(str::to_owned);
                match name.as_deref().and_then(|n| doc.resolve(n)) {
                    Some(target) => Binding::Linked {
                        target,
                        kind: doc.element(target).map_or(ObjectKind::Unknown, Element::kind),
                    },
                    None => Binding::Broken { name },
                }
            }
            Some(element) => Binding::Actual {
                kind: element.kind(),
            },
        };
        Self { position, binding }
    }

    pub fn position(&self) -> ElementId {
        self.position
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    /// The element whose attributes (and children) this position shows.
    pub fn actual(&self) -> Option<ElementId> {
        match self.binding {
            Binding::Actual { .. } => Some(self.position),
            Binding::Linked { target, .. } => Some(target),
            Binding::Broken { .. } => None,
        }
    }

    pub fn kind(&self) -> ObjectKind {
        match self.binding {
            Binding::Actual { kind } | Binding::Linked { kind, .. } => kind,
            Binding::Broken { .. } => ObjectKind::Unknown,
        }
    }

    pub fn is_link(&self) -> bool {
        !matches!(self.binding, Binding::Actual { .. })
    }

    pub fn is_broken(&self) -> bool {
        matches!(self.binding, Binding::Broken { .. })
    }

    /// Borrow the effective node, or `None` for a broken link.
    pub fn resolve<'d>(&self, doc: &'d Document) -> Option<Node<'d>> {
        let actual_id = self.actual()?;
        let actual = doc.element(actual_id)?;
        let link = match self.binding {
            Binding::Linked { .. } => Some(doc.element(self.position)?),
            _ => None,
        };
        Some(Node {
            doc,
            id: actual_id,
            actual,
            link,
        })
    }

    /// Short human readable label, e.g. `datamask "main"`.
    pub fn label(&self, doc: &Document) -> String {
        match &self.binding {
            Binding::Broken { name } => {
                format!("broken link \"{}\"", name.as_deref().unwrap_or(""))
            }
            _ => {
                let name = self
                    .actual()
                    .and_then(|id| doc.element(id))
                    .and_then(Element::name)
                    .unwrap_or("");
                let prefix = if self.is_link() { "-> " } else { "" };
                format!("{prefix}{} \"{name}\"", self.kind().tag())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineStyle {
    pub width: u32,
    pub colour: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillStyle {
    pub fill_type: FillType,
    pub colour: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontStyle {
    pub size: FontSize,
    pub colour: u8,
}

/// Effective attributes of a resolved position.
#[derive(Debug, Clone, Copy)]
pub struct Node<'d> {
    doc: &'d Document,
    id: ElementId,
    actual: &'d Element,
    link: Option<&'d Element>,
}

impl<'d> Node<'d> {
    /// View of an actual element, without link overrides.
    pub fn actual(doc: &'d Document, id: ElementId) -> Option<Self> {
        Some(Node {
            doc,
            id,
            actual: doc.element(id)?,
            link: None,
        })
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn kind(&self) -> ObjectKind {
        self.actual.kind()
    }

    pub fn name(&self) -> Option<&'d str> {
        self.actual.name()
    }

    pub fn is_linked(&self) -> bool {
        self.link.is_some()
    }

    /// Raw attribute of the actual element.
    pub fn raw(&self, key: &str) -> Option<&'d str> {
        self.actual.attribute(key)
    }

    /// Raw geometry/role attribute, preferring the link. Only `pos_x`,
    /// `pos_y`, `block_font`, `block_row`, `block_col` and `role` go here.
    fn placement(&self, key: &str) -> Option<&'d str> {
        self.link
            .and_then(|l| l.attribute(key))
            .or_else(|| self.actual.attribute(key))
    }

    pub fn number(&self, key: &str, default: f64) -> Result<f64, AttributeError> {
        self.raw(key).map_or(Ok(default), |raw| parse_number(key, raw))
    }

    pub fn colour(&self, key: &str, default: u8) -> Result<u8, AttributeError> {
        self.raw(key).map_or(Ok(default), |raw| parse_colour(key, raw))
    }

    pub fn flag(&self, key: &str, default: bool) -> Result<bool, AttributeError> {
        self.raw(key).map_or(Ok(default), |raw| parse_bool(key, raw))
    }

    /// Actual element named by the reference attribute `key`.
    pub fn reference(&self, key: &str) -> Option<Node<'d>> {
        let name = self.raw(key)?;
        let target = self.doc.resolve(name)?;
        Node::actual(self.doc, target)
    }

    fn placement_number(&self, key: &str) -> Result<f32, AttributeError> {
        self.placement(key)
            .map_or(Ok(0.0), |raw| parse_number(key, raw))
    }

    /// Cell size of the font named by `block_font`, if any.
    fn block_cell(&self) -> Result<Option<FontSize>, AttributeError> {
        let Some(name) = self.placement("block_font") else {
            return Ok(None);
        };
        let font = self
            .doc
            .resolve(name)
            .and_then(|id| Node::actual(self.doc, id))
            .filter(|n| n.kind() == ObjectKind::FontAttributes);
        match font {
            Some(font) => Ok(Some(font.font_size()?)),
            None => Ok(None),
        }
    }

    /// Horizontal offset: `pos_x` plus `block_col` font cells.
    pub fn x(&self) -> Result<f32, AttributeError> {
        let base = self.placement_number("pos_x")?;
        Ok(match self.block_cell()? {
            Some(cell) => base + self.placement_number("block_col")? * cell.width as f32,
            None => base,
        })
    }

    /// Vertical offset: `pos_y` plus `block_row` font cells.
    pub fn y(&self) -> Result<f32, AttributeError> {
        let base = self.placement_number("pos_y")?;
        Ok(match self.block_cell()? {
            Some(cell) => base + self.placement_number("block_row")? * cell.height as f32,
            None => base,
        })
    }

    pub fn width(&self) -> Result<Option<f32>, AttributeError> {
        self.raw("width").map(|raw| parse_number("width", raw)).transpose()
    }

    pub fn height(&self) -> Result<Option<f32>, AttributeError> {
        self.raw("height").map(|raw| parse_number("height", raw)).transpose()
    }

    pub fn role(&self) -> Option<&'d str> {
        self.placement("role")
    }

    pub fn options(&self) -> Options {
        self.raw("options").map(Options::parse).unwrap_or_default()
    }

    pub fn has_option(&self, token: &str) -> bool {
        self.options().contains(token)
    }

    pub fn background_colour(&self) -> Result<u8, AttributeError> {
        self.colour("background_colour", 1)
    }

    pub fn border_colour(&self) -> Result<u8, AttributeError> {
        self.colour("border_colour", 0)
    }

    pub fn foreground_colour(&self) -> Result<u8, AttributeError> {
        self.colour("foreground_colour", 0)
    }

    pub fn hidden(&self) -> Result<bool, AttributeError> {
        self.flag("hidden", false)
    }

    /// Numeric value, taken from the referenced number variable if any.
    pub fn value(&self) -> Result<f64, AttributeError> {
        match self.reference("variable_reference") {
            Some(var) if var.kind() == ObjectKind::NumberVariable => var.number("value", 0.0),
            _ => self.number("value", 0.0),
        }
    }

    /// String value, taken from the referenced string variable if any.
    pub fn text(&self) -> &'d str {
        match self.reference("variable_reference") {
            Some(var) if var.kind() == ObjectKind::StringVariable => var.raw("value").unwrap_or(""),
            _ => self.raw("value").unwrap_or(""),
        }
    }

    pub fn min_value(&self) -> Result<f64, AttributeError> {
        self.number("min_value", 0.0)
    }

    pub fn max_value(&self) -> Result<f64, AttributeError> {
        self.number("max_value", 100.0)
    }

    pub fn start_angle(&self) -> Result<f64, AttributeError> {
        self.number("start_angle", 0.0)
    }

    pub fn end_angle(&self) -> Result<f64, AttributeError> {
        self.number("end_angle", 180.0)
    }

    pub fn number_of_ticks(&self) -> Result<u32, AttributeError> {
        self.raw("number_of_ticks")
            .map_or(Ok(0), |raw| parse_bounded("number_of_ticks", raw, MAX_TICKS))
    }

    pub fn offset(&self) -> Result<f64, AttributeError> {
        self.number("offset", 0.0)
    }

    pub fn scale(&self) -> Result<f64, AttributeError> {
        self.number("scale", 1.0)
    }

    pub fn number_of_decimals(&self) -> Result<usize, AttributeError> {
        self.raw("number_of_decimals").map_or(Ok(0), |raw| {
            parse_bounded("number_of_decimals", raw, MAX_DECIMALS).map(|n| n as usize)
        })
    }

    /// Field width in characters that `leadingzeros` pads to.
    pub fn length(&self) -> Result<usize, AttributeError> {
        self.raw("length").map_or(Ok(0), |raw| {
            parse_bounded("length", raw, MAX_FIELD_LENGTH).map(|n| n as usize)
        })
    }

    pub fn number_format(&self) -> Result<NumberFormat, AttributeError> {
        self.raw("format")
            .map_or(Ok(NumberFormat::Fixed), |raw| NumberFormat::parse("format", raw))
    }

    pub fn justification(&self) -> Result<Justification, AttributeError> {
        self.raw("horizontal_justification").map_or(Ok(Justification::Left), |raw| {
            Justification::parse("horizontal_justification", raw)
        })
    }

    pub fn line_direction(&self) -> Result<LineDirection, AttributeError> {
        self.raw("line_direction").map_or(Ok(LineDirection::default()), |raw| {
            LineDirection::parse("line_direction", raw)
        })
    }

    pub fn transparency_colour(&self) -> Result<u8, AttributeError> {
        self.colour("transparency_colour", 0)
    }

    pub fn file(&self) -> Option<&'d str> {
        self.raw("file").filter(|f| !f.is_empty())
    }

    /// Local vertices from the `point` children of the actual element.
    pub fn points(&self) -> Result<Vec<(f32, f32)>, AttributeError> {
        self.actual
            .children()
            .iter()
            .filter_map(|&id| Node::actual(self.doc, id))
            .filter(|p| p.kind() == ObjectKind::Point)
            .map(|p| Ok((p.number("pos_x", 0.0)? as f32, p.number("pos_y", 0.0)? as f32)))
            .collect()
    }

    /// Own `font_size` attribute, default 8x8.
    pub fn font_size(&self) -> Result<FontSize, AttributeError> {
        self.raw("font_size")
            .map_or(Ok(FontSize::default()), |raw| FontSize::parse("font_size", raw))
    }

    /// Line style from the referenced line attributes, falling back to the
    /// node's own `line_width`/`line_colour`.
    pub fn line_style(&self) -> Result<LineStyle, AttributeError> {
        let source = self.reference("line_attributes").unwrap_or(*self);
        Ok(LineStyle {
            width: source
                .raw("line_width")
                .map_or(Ok(1), |raw| parse_bounded("line_width", raw, MAX_LINE_WIDTH))?,
            colour: source.colour("line_colour", 0)?,
        })
    }

    pub fn fill_style(&self) -> Result<FillStyle, AttributeError> {
        let source = self.reference("fill_attributes").unwrap_or(*self);
        Ok(FillStyle {
            fill_type: source
                .raw("fill_type")
                .map_or(Ok(FillType::NoFill), |raw| FillType::parse("fill_type", raw))?,
            colour: source.colour("fill_colour", 0)?,
        })
    }

    pub fn font_style(&self) -> Result<FontStyle, AttributeError> {
        let source = self.reference("font_attributes").unwrap_or(*self);
        Ok(FontStyle {
            size: source.font_size()?,
            colour: source.colour("font_colour", 0)?,
        })
    }
}
