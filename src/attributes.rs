//! Parsing of raw attribute strings into typed values.
//!
//! Every parser reports the attribute name in its error so the traversal
//! engine can log which field of which node was malformed.

use crate::error::AttributeError;
use std::collections::BTreeSet;
use std::str::FromStr;

/// The sixteen standard colour names, in palette order.
pub const STANDARD_COLOUR_NAMES: [&str; 16] = [
    "black", "white", "green", "teal", "maroon", "purple", "olive", "silver", "grey", "blue",
    "lime", "cyan", "red", "magenta", "yellow", "navy",
];

/// Parse a decimal number, ignoring surrounding whitespace.
pub fn parse_number<T: FromStr>(attribute: &str, raw: &str) -> Result<T, AttributeError> {
    raw.trim().parse().map_err(|_| AttributeError::InvalidNumber {
        attribute: attribute.to_owned(),
        value: raw.to_owned(),
    })
}

/// Parse a whole count in `0..=max`. Fractions are truncated.
pub fn parse_bounded(attribute: &str, raw: &str, max: u32) -> Result<u32, AttributeError> {
    let value: f64 = parse_number(attribute, raw)?;
    if !(0.0..=f64::from(max)).contains(&value) {
        return Err(AttributeError::OutOfRange {
            attribute: attribute.to_owned(),
            value: raw.to_owned(),
            max,
        });
    }
    Ok(value as u32)
}

/// Parse a palette colour given either as index (`0`..=`255`) or standard name.
pub fn parse_colour(attribute: &str, raw: &str) -> Result<u8, AttributeError> {
    let trimmed = raw.trim();
    if let Ok(index) = trimmed.parse::<u8>() {
        return Ok(index);
    }
    let lower = trimmed.to_ascii_lowercase();
    let lower = if lower == "gray" { "grey".to_owned() } else { lower };
    STANDARD_COLOUR_NAMES
        .iter()
        .position(|name| *name == lower)
        .map(|i| i as u8)
        .ok_or_else(|| AttributeError::InvalidColour {
            attribute: attribute.to_owned(),
            value: raw.to_owned(),
        })
}

pub fn parse_bool(attribute: &str, raw: &str) -> Result<bool, AttributeError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(AttributeError::InvalidBool {
            attribute: attribute.to_owned(),
            value: raw.to_owned(),
        }),
    }
}

/// Set of `+`-joined option tokens, e.g. `transparent+autowrap`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options(BTreeSet<String>);

impl Options {
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split('+')
                .map(|token| token.trim().to_ascii_lowercase())
                .filter(|token| !token.is_empty())
                .collect(),
        )
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Character cell size of a bitmap font, e.g. `8x12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontSize {
    pub width: u32,
    pub height: u32,
}

/// The standard font cell sizes.
pub const FONT_SIZES: [FontSize; 15] = [
    FontSize { width: 6, height: 8 },
    FontSize { width: 8, height: 8 },
    FontSize { width: 8, height: 12 },
    FontSize { width: 12, height: 16 },
    FontSize { width: 16, height: 16 },
    FontSize { width: 16, height: 24 },
    FontSize { width: 24, height: 32 },
    FontSize { width: 32, height: 32 },
    FontSize { width: 32, height: 48 },
    FontSize { width: 48, height: 64 },
    FontSize { width: 64, height: 64 },
    FontSize { width: 64, height: 96 },
    FontSize { width: 96, height: 128 },
    FontSize { width: 128, height: 128 },
    FontSize { width: 128, height: 192 },
];

impl Default for FontSize {
    fn default() -> Self {
        FontSize { width: 8, height: 8 }
    }
}

impl FontSize {
    pub fn parse(attribute: &str, raw: &str) -> Result<Self, AttributeError> {
        let err = || AttributeError::InvalidFontSize {
            attribute: attribute.to_owned(),
            value: raw.to_owned(),
        };
        let (w, h) = raw.trim().split_once(|c: char| c == 'x' || c == 'X').ok_or_else(err)?;
        let width = w.trim().parse().map_err(|_| err())?;
        let height = h.trim().parse().map_err(|_| err())?;
        if width == 0 || height == 0 {
            return Err(err());
        }
        Ok(FontSize { width, height })
    }
}

fn parse_keyword<T: Copy>(
    attribute: &str,
    raw: &str,
    table: &[(&str, T)],
    expected: &'static str,
) -> Result<T, AttributeError> {
    let lower = raw.trim().to_ascii_lowercase();
    table
        .iter()
        .find(|(k, _)| *k == lower)
        .map(|(_, v)| *v)
        .ok_or_else(|| AttributeError::InvalidKeyword {
            attribute: attribute.to_owned(),
            value: raw.to_owned(),
            expected,
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillType {
    #[default]
    NoFill,
    LineColour,
    FillColour,
    Pattern,
}

impl FillType {
    pub fn parse(attribute: &str, raw: &str) -> Result<Self, AttributeError> {
        parse_keyword(
            attribute,
            raw,
            &[
                ("nofill", FillType::NoFill),
                ("linecolour", FillType::LineColour),
                ("fillcolour", FillType::FillColour),
                ("pattern", FillType::Pattern),
            ],
            "nofill, linecolour, fillcolour, pattern",
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineDirection {
    #[default]
    TopLeftToBottomRight,
    BottomLeftToTopRight,
}

impl LineDirection {
    pub fn parse(attribute: &str, raw: &str) -> Result<Self, AttributeError> {
        parse_keyword(
            attribute,
            raw,
            &[
                ("toplefttobottomright", LineDirection::TopLeftToBottomRight),
                ("bottomlefttotopright", LineDirection::BottomLeftToTopRight),
            ],
            "toplefttobottomright, bottomlefttotopright",
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Justification {
    #[default]
    Left,
    Middle,
    Right,
}

impl Justification {
    pub fn parse(attribute: &str, raw: &str) -> Result<Self, AttributeError> {
        parse_keyword(
            attribute,
            raw,
            &[
                ("left", Justification::Left),
                ("middle", Justification::Middle),
                ("right", Justification::Right),
            ],
            "left, middle, right",
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumberFormat {
    #[default]
    Fixed,
    Exponential,
}

impl NumberFormat {
    pub fn parse(attribute: &str, raw: &str) -> Result<Self, AttributeError> {
        parse_keyword(
            attribute,
            raw,
            &[
                ("fixed", NumberFormat::Fixed),
                ("exponential", NumberFormat::Exponential),
            ],
            "fixed, exponential",
        )
    }
}

/// Format a scaled number field value the way output/input numbers show it.
pub fn format_number(
    value: f64,
    decimals: usize,
    format: NumberFormat,
    leading_zeros: bool,
    blank_zero: bool,
    length: usize,
) -> String {
    if blank_zero && value == 0.0 {
        return String::new();
    }
    let text = match format {
        NumberFormat::Fixed => format!("{value:.decimals$}"),
        NumberFormat::Exponential => format!("{value:.decimals$e}"),
    };
    if !leading_zeros || text.len() >= length {
        return text;
    }
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let pad = length - sign.len() - digits.len();
    format!("{sign}{}{digits}", "0".repeat(pad))
}
