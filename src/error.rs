//! Error types for document mutation, attribute access and rendering.
//!
//! Only [`DocumentError`] is ever returned to callers of the mutation API. The
//! traversal engine catches [`RenderError`] per node and turns it into a
//! [`Diagnostic`](crate::engine::Diagnostic).

use crate::document::ElementId;
use thiserror::Error;

/// A raw attribute could not be interpreted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AttributeError {
    /// A numeric field holds something that is not a number.
    #[error("attribute `{attribute}` = {value:?} is not a valid number")]
    InvalidNumber { attribute: String, value: String },
    /// A colour is neither a palette index nor a known colour name.
    #[error("attribute `{attribute}` = {value:?} is not a palette colour")]
    InvalidColour { attribute: String, value: String },
    /// A boolean is not one of `true`/`false`/`yes`/`no`/`1`/`0`.
    #[error("attribute `{attribute}` = {value:?} is not a boolean")]
    InvalidBool { attribute: String, value: String },
    /// A keyword attribute holds an unknown keyword.
    #[error("attribute `{attribute}` = {value:?} is not one of {expected}")]
    InvalidKeyword {
        attribute: String,
        value: String,
        expected: &'static str,
    },
    /// A number lies outside `0..=max`.
    #[error("attribute `{attribute}` = {value:?} is outside 0..={max}")]
    OutOfRange {
        attribute: String,
        value: String,
        max: u32,
    },
    /// A font size is not of the `WxH` form.
    #[error("attribute `{attribute}` = {value:?} is not a font size")]
    InvalidFontSize { attribute: String, value: String },
}

/// A structural operation on the document was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("element {0:?} does not exist")]
    UnknownElement(ElementId),
    #[error("element {0:?} is already attached to a parent")]
    AlreadyAttached(ElementId),
    #[error("inserting {child:?} under {parent:?} would create a cycle")]
    Cycle { parent: ElementId, child: ElementId },
    #[error("element {child:?} is not a child of {parent:?}")]
    NotAChild { parent: ElementId, child: ElementId },
    #[error("the root element cannot be removed")]
    RootRemoval,
}

/// Failure while processing a single node during a traversal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error(transparent)]
    Attribute(#[from] AttributeError),
    #[error("resource `{path}` could not be loaded: {reason}")]
    Resource { path: String, reason: String },
}
