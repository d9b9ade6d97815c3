//! The traversal engine.
//!
//! Walks the tree from a start position, computes a [`Frame`] for every node,
//! dispatches to a [`RenderVisitor`] and captures the selection and grid
//! overlay shapes on the way.
//!
//! Frames are passed by value, so a node can never leave a modified transform
//! or clip behind for its siblings, whatever happens while processing it. The
//! only guard against link cycles is the depth ceiling in
//! [`RenderOptions::max_depth`].

use crate::document::Document;
use crate::error::RenderError;
use crate::geometry::{Rect, Shape, Transform};
use crate::kind::ObjectKind;
use crate::node::{Node, NodeView};
use crate::options::{RenderOptions, RootContext};
use crate::overlay::{CapturedShape, OverlayState};
use crate::path::TreePath;
use crate::picture::PictureCache;
use crate::tree::{TreeItem, TreeView};
use crate::visitor::{Frame, RenderVisitor, VisitResult};
use std::rc::Rc;
use tracing::{debug, warn};

/// A clip large enough to never matter.
pub const UNBOUNDED: Rect = Rect::new(-1.0e7, -1.0e7, 2.0e7, 2.0e7);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// A subtree was abandoned at the depth ceiling.
    DepthLimitExceeded,
    /// A link names no (or no unique) object.
    BrokenLink,
    /// An attribute could not be parsed; the node was skipped.
    AttributeParse,
    /// A resource could not be loaded; a placeholder was used.
    Resource,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Label of the object concerned, see [`NodeView::label`].
    pub object: String,
    pub message: String,
}

/// What happened during one traversal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraversalReport {
    pub diagnostics: Vec<Diagnostic>,
    /// Deepest nesting level entered, the start node being level 1.
    pub max_depth: usize,
    /// Positions entered, broken links included.
    pub entered: usize,
    /// Visitor calls made.
    pub visits: usize,
    /// Depth counter after the walk. Always 0 for a balanced traversal.
    pub final_depth: usize,
}

impl TraversalReport {
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.diagnostics.iter().filter(|d| d.kind == kind).count()
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Result of [`TraversalEngine::run`].
#[derive(Debug, Clone, Default)]
pub struct TraversalOutcome {
    pub overlay: OverlayState,
    pub report: TraversalReport,
}

/// How a kind is traversed.
enum Role {
    /// Own visitor call, then every child.
    Container,
    /// Own visitor call, then the one selected child.
    List,
    /// Child first, then the own call clipped to the child's shape.
    Pointer,
    /// A single visitor call.
    Leaf,
    /// Not visited at all.
    Skip,
}

fn role(kind: ObjectKind) -> Role {
    match kind {
        ObjectKind::WorkingSet
        | ObjectKind::DataMask
        | ObjectKind::AlarmMask
        | ObjectKind::SoftKeyMask
        | ObjectKind::Key
        | ObjectKind::Button
        | ObjectKind::Container
        | ObjectKind::AuxiliaryFunction
        | ObjectKind::AuxiliaryInput => Role::Container,
        ObjectKind::InputList => Role::List,
        ObjectKind::ObjectPointer => Role::Pointer,
        ObjectKind::InputBoolean
        | ObjectKind::InputString
        | ObjectKind::InputNumber
        | ObjectKind::OutputString
        | ObjectKind::OutputNumber
        | ObjectKind::Line
        | ObjectKind::Rectangle
        | ObjectKind::Ellipse
        | ObjectKind::Polygon
        | ObjectKind::Meter
        | ObjectKind::LinearBarGraph
        | ObjectKind::ArchedBarGraph
        | ObjectKind::PictureGraphic => Role::Leaf,
        ObjectKind::ObjectPool
        | ObjectKind::NumberVariable
        | ObjectKind::StringVariable
        | ObjectKind::FontAttributes
        | ObjectKind::LineAttributes
        | ObjectKind::FillAttributes
        | ObjectKind::InputAttributes
        | ObjectKind::Macro
        | ObjectKind::Point
        | ObjectKind::Language
        | ObjectKind::Unknown => Role::Skip,
    }
}

/// Where a node is placed by its parent.
struct Slot {
    path: TreePath,
    depth: usize,
    /// Parent transform, already moved by any fixed offset.
    transform: Transform,
    /// Whether the node's own `x`/`y` still apply.
    own_position: bool,
    /// Clip the node's frame is intersected with.
    clip: Rect,
}

pub struct TraversalEngine<'a> {
    doc: &'a Document,
    tree: &'a TreeView,
    options: &'a RenderOptions,
    pictures: Option<&'a PictureCache>,
    root: RootContext,
    active: Option<TreePath>,
    depth: usize,
    overlay: OverlayState,
    report: TraversalReport,
}

impl<'a> TraversalEngine<'a> {
    pub fn new(doc: &'a Document, tree: &'a TreeView, options: &'a RenderOptions) -> Self {
        let mut report = TraversalReport::default();
        let root = RootContext::from_document(doc).unwrap_or_else(|err| {
            warn!(error = %err, "root context unreadable, using defaults");
            report.diagnostics.push(Diagnostic {
                kind: DiagnosticKind::AttributeParse,
                object: "objectpool".to_owned(),
                message: err.to_string(),
            });
            RootContext::default()
        });
        Self {
            doc,
            tree,
            options,
            pictures: None,
            root,
            active: None,
            depth: 0,
            overlay: OverlayState::default(),
            report,
        }
    }

    /// Set the active (selected) path used for overlay capture and input
    /// list child selection.
    pub fn with_active(mut self, active: Option<TreePath>) -> Self {
        self.active = active;
        self
    }

    /// Bitmaps used to size picture graphics. Without a cache, pictures are
    /// square.
    pub fn with_pictures(mut self, pictures: &'a PictureCache) -> Self {
        self.pictures = Some(pictures);
        self
    }

    pub fn root_context(&self) -> &RootContext {
        &self.root
    }

    /// Traverse from the object at the end of `start`, clipped to `viewport`.
    pub fn run<V: RenderVisitor>(
        mut self,
        start: &TreePath,
        viewport: Rect,
        visitor: &mut V,
    ) -> TraversalOutcome {
        self.overlay.reset();
        if let Some(view) = start.last_node().cloned() {
            let slot = Slot {
                path: start.clone(),
                depth: 0,
                transform: Transform::scale(self.options.effective_zoom()),
                own_position: false,
                clip: viewport,
            };
            self.visit(visitor, &view, slot);
        }
        self.report.final_depth = self.depth;
        TraversalOutcome {
            overlay: self.overlay,
            report: self.report,
        }
    }

    fn visit<V: RenderVisitor>(
        &mut self,
        v: &mut V,
        view: &Rc<NodeView>,
        slot: Slot,
    ) -> Option<Shape> {
        if slot.depth >= self.options.max_depth {
            let object = view.label(self.doc);
            warn!(%object, depth = slot.depth, "depth limit exceeded, subtree skipped");
            self.diagnose(
                DiagnosticKind::DepthLimitExceeded,
                object,
                format!("nesting exceeds {} levels", self.options.max_depth),
            );
            return None;
        }
        self.depth += 1;
        self.report.entered += 1;
        self.report.max_depth = self.report.max_depth.max(self.depth);
        let shape = self.visit_resolved(v, view, slot);
        self.depth -= 1;
        shape
    }

    fn visit_resolved<V: RenderVisitor>(
        &mut self,
        v: &mut V,
        view: &Rc<NodeView>,
        slot: Slot,
    ) -> Option<Shape> {
        let doc = self.doc;
        let Some(node) = view.resolve(doc) else {
            let object = view.label(doc);
            debug!(%object, "broken link");
            self.diagnose(DiagnosticKind::BrokenLink, object, "link target not found".to_owned());
            return None;
        };
        let kind = node.kind();
        if kind == ObjectKind::Container {
            match node.hidden() {
                Ok(false) => {}
                Ok(true) => {
                    debug!(object = %view.label(doc), "hidden container skipped");
                    return None;
                }
                Err(err) => {
                    self.fault(&node, err.into());
                    return None;
                }
            }
        }
        match role(kind) {
            Role::Skip => {
                debug!(kind = kind.tag(), "not drawable, skipped");
                None
            }
            Role::Pointer => self.visit_pointer(v, view, &node, slot),
            role => {
                let (frame, size) = match self.frame(view, &node, slot) {
                    Ok(f) => f,
                    Err(err) => {
                        self.fault(&node, err);
                        return None;
                    }
                };
                let outer = frame.1;
                let frame = frame.0;
                let shape = self.call(v, kind, &frame, &node, size);
                match role {
                    Role::Container => self.visit_children(v, view, kind, &frame, outer),
                    Role::List => self.visit_list_choice(v, view, &node, &frame),
                    _ => {}
                }
                shape
            }
        }
    }

    /// Own size of a node in local units.
    fn size(&self, view: &Rc<NodeView>, node: &Node<'_>) -> Result<(f32, f32), RenderError> {
        let ctx = &self.root;
        Ok(match node.kind() {
            ObjectKind::WorkingSet
            | ObjectKind::Key
            | ObjectKind::AuxiliaryFunction
            | ObjectKind::AuxiliaryInput => (ctx.sk_width, ctx.sk_height),
            ObjectKind::DataMask | ObjectKind::AlarmMask => (ctx.dimension, ctx.dimension),
            ObjectKind::SoftKeyMask => {
                let keys = self.drawable_children(view);
                (ctx.sk_width, (keys + 1) as f32 * ctx.sk_height)
            }
            ObjectKind::PictureGraphic => {
                let width = node.width()?.unwrap_or(ctx.dimension);
                match self.picture_size(node) {
                    Some((sw, sh)) => (width, width * sh as f32 / sw as f32),
                    None => (width, width),
                }
            }
            ObjectKind::Meter => {
                let width = node.width()?.unwrap_or(ctx.dimension);
                (width, node.height()?.unwrap_or(width))
            }
            _ => (
                node.width()?.unwrap_or(ctx.dimension),
                node.height()?.unwrap_or(ctx.dimension),
            ),
        })
    }

    fn picture_size(&self, node: &Node<'_>) -> Option<(u32, u32)> {
        self.pictures?.dimensions(node.file()?, self.root.bitmap_paths())
    }

    fn drawable_children(&self, view: &Rc<NodeView>) -> usize {
        self.tree
            .children(self.doc, &TreeItem::Object(view.clone()))
            .iter()
            .filter_map(TreeItem::node)
            .filter(|c| c.kind().is_drawable())
            .count()
    }

    fn placed(&self, node: &Node<'_>, slot: &Slot) -> Result<Transform, RenderError> {
        Ok(if slot.own_position {
            slot.transform.translate(node.x()?, node.y()?)
        } else {
            slot.transform
        })
    }

    /// Frame and context size of a node, plus the clip that was in effect
    /// before the node applied its own.
    #[allow(clippy::type_complexity)]
    fn frame(
        &self,
        view: &Rc<NodeView>,
        node: &Node<'_>,
        slot: Slot,
    ) -> Result<((Frame, Rect), (f32, f32)), RenderError> {
        let size = self.size(view, node)?;
        let transform = self.placed(node, &slot)?;
        let bounds = transform.map_rect(&Rect::new(0.0, 0.0, size.0, size.1));
        let frame = Frame {
            depth: slot.depth,
            transform,
            bounds,
            clip: bounds.intersect(&slot.clip),
            path: slot.path,
        };
        Ok(((frame, slot.clip), size))
    }

    fn visit_children<V: RenderVisitor>(
        &mut self,
        v: &mut V,
        view: &Rc<NodeView>,
        kind: ObjectKind,
        frame: &Frame,
        outer: Rect,
    ) {
        let children = self.tree.children(self.doc, &TreeItem::Object(view.clone()));
        let (dim, sk_height) = (self.root.dimension, self.root.sk_height);
        let mut key_index = 0usize;
        for item in children.iter() {
            let Some(child) = item.node() else {
                continue;
            };
            let child_kind = child.kind();
            if child_kind.is_skipped_child() {
                continue;
            }
            let path = frame.path.child(item.clone());
            let depth = frame.depth + 1;
            let fixed = |dx: f32, dy: f32, clip: Rect| Slot {
                path: path.clone(),
                depth,
                transform: frame.transform.translate(dx, dy),
                own_position: false,
                clip,
            };
            let slot = match (kind, child_kind) {
                (ObjectKind::WorkingSet, k) if k.is_mask() => fixed(0.0, sk_height, outer),
                (ObjectKind::DataMask | ObjectKind::AlarmMask, ObjectKind::SoftKeyMask) => {
                    fixed(dim, 0.0, outer)
                }
                (ObjectKind::SoftKeyMask, k) if k.is_drawable() => {
                    let slot = fixed(0.0, key_index as f32 * sk_height, frame.clip);
                    key_index += 1;
                    slot
                }
                _ => Slot {
                    path: path.clone(),
                    depth,
                    transform: frame.transform,
                    own_position: true,
                    clip: frame.clip,
                },
            };
            self.visit(v, child, slot);
        }
    }

    /// An input list shows the child on the active path, else the child at
    /// index `value`.
    fn visit_list_choice<V: RenderVisitor>(
        &mut self,
        v: &mut V,
        view: &Rc<NodeView>,
        node: &Node<'_>,
        frame: &Frame,
    ) {
        let children = self.tree.children(self.doc, &TreeItem::Object(view.clone()));
        let on_active = self
            .active
            .as_ref()
            .and_then(|active| active.component(frame.path.len()))
            .filter(|candidate| children.contains(candidate))
            .cloned();
        let chosen = match on_active {
            Some(item) => Some(item),
            None => match node.value() {
                Ok(value) if value >= 0.0 && value.is_finite() => {
                    children.get(value as usize).cloned()
                }
                Ok(_) => None,
                Err(err) => {
                    self.fault(node, err.into());
                    None
                }
            },
        };
        let Some(item) = chosen else {
            return;
        };
        let Some(child) = item.node().cloned() else {
            return;
        };
        if child.kind().is_skipped_child() {
            return;
        }
        let slot = Slot {
            path: frame.path.child(item),
            depth: frame.depth + 1,
            transform: frame.transform,
            own_position: true,
            clip: frame.clip,
        };
        self.visit(v, &child, slot);
    }

    /// The child is visited first; the pointer's own call only happens when
    /// the child produced a shape, and is clipped to it.
    fn visit_pointer<V: RenderVisitor>(
        &mut self,
        v: &mut V,
        view: &Rc<NodeView>,
        node: &Node<'_>,
        slot: Slot,
    ) -> Option<Shape> {
        let transform = match self.placed(node, &slot) {
            Ok(t) => t,
            Err(err) => {
                self.fault(node, err);
                return None;
            }
        };
        let children = self.tree.children(self.doc, &TreeItem::Object(view.clone()));
        let item = children
            .iter()
            .find(|i| i.node().is_some_and(|c| !c.kind().is_skipped_child()))?
            .clone();
        let child = item.node()?.clone();
        let child_slot = Slot {
            path: slot.path.child(item),
            depth: slot.depth + 1,
            transform,
            own_position: true,
            clip: slot.clip,
        };
        let child_shape = self.visit(v, &child, child_slot)?;
        let bounds = child_shape.bounds();
        let frame = Frame {
            depth: slot.depth,
            transform,
            bounds,
            clip: slot.clip.intersect(&bounds),
            path: slot.path,
        };
        let size = frame.local_size();
        self.call(v, ObjectKind::ObjectPointer, &frame, node, size)
    }

    fn call<V: RenderVisitor>(
        &mut self,
        v: &mut V,
        kind: ObjectKind,
        ctx: &Frame,
        node: &Node<'_>,
        size: (f32, f32),
    ) -> Option<Shape> {
        self.report.visits += 1;
        let result: VisitResult = match kind {
            ObjectKind::WorkingSet => v.working_set(ctx, node, size),
            ObjectKind::DataMask => v.data_mask(ctx, node, size),
            ObjectKind::AlarmMask => v.alarm_mask(ctx, node, size),
            ObjectKind::SoftKeyMask => v.soft_key_mask(ctx, node, size),
            ObjectKind::Key => v.key(ctx, node, size),
            ObjectKind::AuxiliaryFunction => v.auxiliary_function(ctx, node, size),
            ObjectKind::AuxiliaryInput => v.auxiliary_input(ctx, node, size),
            ObjectKind::Button => v.button(ctx, node),
            ObjectKind::Container => v.container(ctx, node),
            ObjectKind::ObjectPointer => v.object_pointer(ctx, node),
            ObjectKind::InputBoolean => v.input_boolean(ctx, node),
            ObjectKind::InputString => v.input_string(ctx, node),
            ObjectKind::InputNumber => v.input_number(ctx, node),
            ObjectKind::InputList => v.input_list(ctx, node),
            ObjectKind::OutputString => v.output_string(ctx, node),
            ObjectKind::OutputNumber => v.output_number(ctx, node),
            ObjectKind::Line => v.line(ctx, node),
            ObjectKind::Rectangle => v.rectangle(ctx, node),
            ObjectKind::Ellipse => v.ellipse(ctx, node),
            ObjectKind::Polygon => v.polygon(ctx, node),
            ObjectKind::Meter => v.meter(ctx, node),
            ObjectKind::LinearBarGraph => v.linear_bar_graph(ctx, node),
            ObjectKind::ArchedBarGraph => v.arched_bar_graph(ctx, node),
            ObjectKind::PictureGraphic => v.picture_graphic(ctx, node),
            ObjectKind::ObjectPool
            | ObjectKind::NumberVariable
            | ObjectKind::StringVariable
            | ObjectKind::FontAttributes
            | ObjectKind::LineAttributes
            | ObjectKind::FillAttributes
            | ObjectKind::InputAttributes
            | ObjectKind::Macro
            | ObjectKind::Point
            | ObjectKind::Language
            | ObjectKind::Unknown => Ok(None),
        };
        for fault in v.take_faults() {
            self.fault(node, fault);
        }
        match result {
            Ok(Some(shape)) => {
                self.capture(ctx, &shape);
                Some(shape)
            }
            Ok(None) => None,
            Err(err) => {
                self.fault(node, err);
                None
            }
        }
    }

    fn capture(&mut self, ctx: &Frame, shape: &Shape) {
        let Some(active) = &self.active else {
            return;
        };
        let captured = || CapturedShape {
            shape: shape.clone(),
            transform: ctx.transform,
        };
        if ctx.path == *active {
            if self.overlay.selection.is_none() {
                self.overlay.selection = Some(captured());
            }
        } else if self.options.draw_grid
            && self.overlay.grid.is_none()
            && ctx.path == active.parent()
            && !active.last_node().is_some_and(|leaf| leaf.kind().is_mask_like())
        {
            self.overlay.grid = Some(captured());
        }
    }

    fn fault(&mut self, node: &Node<'_>, err: RenderError) {
        let name = node.name().unwrap_or("");
        let kind = match err {
            RenderError::Attribute(_) => DiagnosticKind::AttributeParse,
            RenderError::Resource { .. } => DiagnosticKind::Resource,
        };
        warn!(kind = node.kind().tag(), name, error = %err, "node fault");
        self.diagnose(kind, format!("{} \"{name}\"", node.kind().tag()), err.to_string());
    }

    fn diagnose(&mut self, kind: DiagnosticKind, object: String, message: String) {
        self.report.diagnostics.push(Diagnostic {
            kind,
            object,
            message,
        });
    }
}
