//! Common test utilities for integration tests.

#![allow(dead_code)]

pub mod harness;

use vt_pool_view::{
    Frame, Node, ObjectKind, Rect, RenderError, RenderVisitor, Shape, TreePath, VisitResult,
};

/// One recorded visitor call.
#[derive(Debug, Clone)]
pub struct Call {
    pub kind: ObjectKind,
    pub name: Option<String>,
    pub depth: usize,
    pub bounds: Rect,
    pub clip: Rect,
    pub path: TreePath,
    /// Context size for kinds that receive one.
    pub size: Option<(f32, f32)>,
}

/// Visitor that records every call and reports the clip as shape.
///
/// Calls for nodes named in `fail_names` return a resource error instead.
#[derive(Default)]
pub struct RecordingVisitor {
    pub calls: Vec<Call>,
    pub fail_names: Vec<String>,
}

impl RecordingVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(names: &[&str]) -> Self {
        Self {
            calls: Vec::new(),
            fail_names: names.iter().map(|n| n.to_string()).collect(),
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.calls
            .iter()
            .map(|c| c.name.clone().unwrap_or_default())
            .collect()
    }

    pub fn call(&self, name: &str) -> Option<&Call> {
        self.calls.iter().find(|c| c.name.as_deref() == Some(name))
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls
            .iter()
            .filter(|c| c.name.as_deref() == Some(name))
            .count()
    }

    fn record(&mut self, ctx: &Frame, node: &Node<'_>, size: Option<(f32, f32)>) -> VisitResult {
        let name = node.name().map(str::to_owned);
        self.calls.push(Call {
            kind: node.kind(),
            name: name.clone(),
            depth: ctx.depth,
            bounds: ctx.bounds,
            clip: ctx.clip,
            path: ctx.path.clone(),
            size,
        });
        if let Some(name) = name {
            if self.fail_names.contains(&name) {
                return Err(RenderError::Resource {
                    path: name,
                    reason: "test failure".to_owned(),
                });
            }
        }
        Ok(Some(Shape::Rect(ctx.clip)))
    }
}

impl RenderVisitor for RecordingVisitor {
    fn working_set(&mut self, ctx: &Frame, node: &Node<'_>, size: (f32, f32)) -> VisitResult {
        self.record(ctx, node, Some(size))
    }
    fn data_mask(&mut self, ctx: &Frame, node: &Node<'_>, size: (f32, f32)) -> VisitResult {
        self.record(ctx, node, Some(size))
    }
    fn alarm_mask(&mut self, ctx: &Frame, node: &Node<'_>, size: (f32, f32)) -> VisitResult {
        self.record(ctx, node, Some(size))
    }
    fn soft_key_mask(&mut self, ctx: &Frame, node: &Node<'_>, size: (f32, f32)) -> VisitResult {
        self.record(ctx, node, Some(size))
    }
    fn key(&mut self, ctx: &Frame, node: &Node<'_>, size: (f32, f32)) -> VisitResult {
        self.record(ctx, node, Some(size))
    }
    fn auxiliary_function(&mut self, ctx: &Frame, node: &Node<'_>, size: (f32, f32)) -> VisitResult {
        self.record(ctx, node, Some(size))
    }
    fn auxiliary_input(&mut self, ctx: &Frame, node: &Node<'_>, size: (f32, f32)) -> VisitResult {
        self.record(ctx, node, Some(size))
    }
    fn button(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult {
        self.record(ctx, node, None)
    }
    fn container(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult {
        self.record(ctx, node, None)
    }
    fn object_pointer(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult {
        self.record(ctx, node, None)
    }
    fn input_boolean(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult {
        self.record(ctx, node, None)
    }
    fn input_string(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult {
        self.record(ctx, node, None)
    }
    fn input_number(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult {
        self.record(ctx, node, None)
    }
    fn input_list(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult {
        self.record(ctx, node, None)
    }
    fn output_string(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult {
        self.record(ctx, node, None)
    }
    fn output_number(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult {
        self.record(ctx, node, None)
    }
    fn line(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult {
        self.record(ctx, node, None)
    }
    fn rectangle(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult {
        self.record(ctx, node, None)
    }
    fn ellipse(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult {
        self.record(ctx, node, None)
    }
    fn polygon(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult {
        self.record(ctx, node, None)
    }
    fn meter(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult {
        self.record(ctx, node, None)
    }
    fn linear_bar_graph(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult {
        self.record(ctx, node, None)
    }
    fn arched_bar_graph(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult {
        self.record(ctx, node, None)
    }
    fn picture_graphic(&mut self, ctx: &Frame, node: &Node<'_>) -> VisitResult {
        self.record(ctx, node, None)
    }
}
