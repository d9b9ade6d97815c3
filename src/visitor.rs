//! The per-type operations a traversal drives.
//!
//! [`TraversalEngine`](crate::engine::TraversalEngine) owns the walk and the
//! frame arithmetic; a [`RenderVisitor`] only sees one node at a time together
//! with the [`Frame`] in effect for it. Painting and hit-testing are the two
//! implementations.

use crate::error::RenderError;
use crate::geometry::{Rect, Shape, Transform};
use crate::node::Node;
use crate::path::TreePath;

/// Traversal context for one node, passed by value down the recursion.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Nesting depth of this node below the traversal start.
    pub depth: usize,
    /// Local-to-device transform of this node.
    pub transform: Transform,
    /// Device-space frame of the node before clipping.
    pub bounds: Rect,
    /// Device-space clip in effect for the node.
    pub clip: Rect,
    /// Position of the node in the tree.
    pub path: TreePath,
}

impl Frame {
    /// Local `(width, height)` of [`bounds`](Self::bounds).
    pub fn local_size(&self) -> (f32, f32) {
        let s = if self.transform.scale != 0.0 { self.transform.scale } else { 1.0 };
        (self.bounds.width / s, self.bounds.height / s)
    }
}

/// What a visitor returns for a node: the device-space shape it occupies, if
/// any.
pub type VisitResult = Result<Option<Shape>, RenderError>;

/// One operation per drawable object kind.
///
/// Kinds whose size comes from the terminal rather than from the node itself
/// also receive that `size` in local units.
pub trait RenderVisitor {
    fn working_set(&mut self, ctx: &Frame, node: &Node<'_>, size: (f32, f32)) -> VisitResult;
    fn data_mask(&mut self, ctx: &Frame, node: &Node<'_>, size: (f32, f32)) -> VisitResult;
    fn alarm_mask(&mut self, ctx: &Frame, node: &Node<'_>, size: (f32, f32)) -> VisitResult;
    fn soft_key_mask(&mut self, ctx: &Frame, node: &Node<'_>, size: (f32, f32)) -> VisitResult;
    fn key(&mut self, ctx: &Frame, node: &Node<'_>, size: (f32, f32)) -> VisitResult;
    fn auxiliary_function(&mut self, ctx: &Frame, node: &Node<'_>, size: (f32, f32)) -> VisitResult;
    fn auxiliary_input(&mut self, ctx: &Frame, node: &Node<'_>, size: (f32, f32)) -> VisitResult;
    fn button(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult;
    fn container(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult;
    fn object_pointer(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult;
    fn input_boolean(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult;
    fn input_string(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult;
    fn input_number(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult;
    fn input_list(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult;
    fn output_string(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult;
    fn output_number(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult;
    fn line(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult;
    fn rectangle(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult;
    fn ellipse(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult;
    fn polygon(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult;
    fn meter(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult;
    fn linear_bar_graph(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult;
    fn arched_bar_graph(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult;
    fn picture_graphic(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult;

    /// Recoverable faults raised since the last call, e.g. a picture that
    /// could not be loaded and was replaced by a placeholder.
    fn take_faults(&mut self) -> Vec<RenderError> {
        Vec::new()
    }
}
