//! Fixture pools for the integration tests.
//!
//! [`Pool`] bundles a document with its tree view and keeps the two in step:
//! every mutation goes through a helper that invalidates the tree view.

#![allow(dead_code)]

use std::sync::Once;
use vt_pool_view::{
    Document, ElementId, LocateVisitor, PaintVisitor, PictureCache, Raster, RenderOptions,
    RenderVisitor, StandardPalette, TraversalEngine, TraversalOutcome, TreePath, TreeView,
    BlockGlyphs, LINK_TAG, UNBOUNDED,
};

/// Install a test-friendly tracing subscriber once per test binary.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

pub struct Pool {
    pub doc: Document,
    pub tree: TreeView,
    pub pictures: PictureCache,
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

impl Pool {
    pub fn new() -> Self {
        init_tracing();
        Self {
            doc: Document::new(),
            tree: TreeView::new(),
            pictures: PictureCache::new(),
        }
    }

    pub fn root(&self) -> ElementId {
        self.doc.root()
    }

    /// Append an element under `parent`.
    pub fn add(&mut self, parent: ElementId, tag: &str, attributes: &[(&str, &str)]) -> ElementId {
        let (id, change) = self
            .doc
            .append_element(parent, tag, attributes)
            .expect("append element");
        self.tree.invalidate(&change);
        id
    }

    /// Append a top-level named object.
    pub fn object(&mut self, tag: &str, name: &str, attributes: &[(&str, &str)]) -> ElementId {
        let mut attrs = vec![("name", name)];
        attrs.extend_from_slice(attributes);
        let root = self.root();
        self.add(root, tag, &attrs)
    }

    /// Append a link to `target` under `parent`, optionally positioned.
    pub fn link(&mut self, parent: ElementId, target: &str, attributes: &[(&str, &str)]) -> ElementId {
        let mut attrs = vec![("name", target)];
        attrs.extend_from_slice(attributes);
        self.add(parent, LINK_TAG, &attrs)
    }

    pub fn set(&mut self, id: ElementId, key: &str, value: &str) {
        let change = self.doc.set_attribute(id, key, value).expect("set attribute");
        self.tree.invalidate(&change);
    }

    pub fn remove(&mut self, parent: ElementId, child: ElementId) {
        let change = self.doc.remove_child(parent, child).expect("remove child");
        self.tree.invalidate(&change);
    }

    /// Tree path of a top-level object by name.
    pub fn path(&self, name: &str) -> TreePath {
        let id = self.doc.resolve(name).expect("named object");
        self.tree.path_to(&self.doc, id).expect("path to object")
    }

    /// Path of the `index`th child below `path`.
    pub fn descend(&self, path: &TreePath, index: usize) -> TreePath {
        self.tree.descend(&self.doc, path, index).expect("child exists")
    }

    pub fn run<V: RenderVisitor>(
        &self,
        start: &TreePath,
        options: &RenderOptions,
        active: Option<TreePath>,
        visitor: &mut V,
    ) -> TraversalOutcome {
        TraversalEngine::new(&self.doc, &self.tree, options)
            .with_pictures(&self.pictures)
            .with_active(active)
            .run(start, UNBOUNDED, visitor)
    }

    pub fn locate(&self, start: &TreePath, x: f32, y: f32) -> Option<TreePath> {
        let mut visitor = LocateVisitor::new(x, y);
        self.run(start, &RenderOptions::default(), None, &mut visitor);
        visitor.into_best()
    }

    pub fn paint(
        &self,
        start: &TreePath,
        width: u32,
        height: u32,
        options: &RenderOptions,
    ) -> (Raster, TraversalOutcome) {
        let engine =
            TraversalEngine::new(&self.doc, &self.tree, options).with_pictures(&self.pictures);
        let root = engine.root_context().clone();
        let raster = Raster::new(width, height);
        let viewport = raster.bounds();
        let mut visitor = PaintVisitor::new(
            raster,
            options,
            &root,
            &StandardPalette,
            &BlockGlyphs,
            &self.pictures,
        );
        let outcome = engine.run(start, viewport, &mut visitor);
        (visitor.into_raster(), outcome)
    }
}
