//! High-level controller for object pool views.
//!
//! The [`PoolViewController`] ties the document, the tree view cache, the
//! selection and the render options together and exposes what a host UI
//! needs: painting, hit-testing and callback factories.
//!
//! # Example
//!
//! ```ignore
//! use vt_pool_view::{Document, PoolViewController};
//!
//! slint::include_modules!();
//!
//! fn main() {
//!     let window = MainWindow::new().unwrap();
//!     let ctrl = PoolViewController::new(load_pool());
//!     let start = ctrl.path_to_named("main").unwrap();
//!     let w = window.as_weak();
//!
//!     window.on_clicked({
//!         let select = ctrl.locate_callback(start.clone());
//!         let ctrl = ctrl.clone();
//!         let w = w.clone();
//!         let start = start.clone();
//!         move |x, y| {
//!             if select(x, y) {
//!                 if let Some(w) = w.upgrade() {
//!                     let result = ctrl.paint(&start, 480, 480);
//!                     w.set_screen(result.image());
//!                     w.set_grid_commands(ctrl.grid_commands());
//!                 }
//!             }
//!         }
//!     });
//!
//!     let flash = ctrl.flash_tick_callback();
//!     let timer = slint::Timer::default();
//!     timer.start(slint::TimerMode::Repeated, std::time::Duration::from_millis(500), move || {
//!         if flash() {
//!             // repaint
//!         }
//!     });
//!
//!     window.run().unwrap();
//! }
//! ```

use crate::attributes::Options;
use crate::document::{Document, DocumentChange, ElementId};
use crate::engine::{TraversalEngine, TraversalReport};
use crate::error::DocumentError;
use crate::font::{BlockGlyphs, TextService};
use crate::grid::GridOverlay;
use crate::hit_test;
use crate::options::RenderOptions;
use crate::overlay::OverlayState;
use crate::paint::PaintVisitor;
use crate::palette::{Palette, StandardPalette};
use crate::path::TreePath;
use crate::picture::PictureCache;
use crate::raster::Raster;
use crate::selection::SelectionManager;
use crate::tree::{TreeItem, TreeView};
use slint::{Image, Rgba8Pixel, SharedPixelBuffer, SharedString, VecModel};
use std::cell::{Ref, RefCell};
use std::rc::Rc;
use tracing::debug;

/// Output of [`PoolViewController::paint`].
#[derive(Clone)]
pub struct PaintResult {
    pub buffer: SharedPixelBuffer<Rgba8Pixel>,
    pub overlay: OverlayState,
    pub report: TraversalReport,
}

impl PaintResult {
    pub fn image(&self) -> Image {
        Image::from_rgba8(self.buffer.clone())
    }
}

/// Controller that owns the pool view state and provides callback
/// implementations.
///
/// Every document mutation goes through the controller so the tree view is
/// invalidated before the next read.
///
/// Clone this controller to share it across callbacks.
#[derive(Clone)]
pub struct PoolViewController {
    doc: Rc<RefCell<Document>>,
    tree: Rc<TreeView>,
    selection: Rc<RefCell<SelectionManager>>,
    options: Rc<RefCell<RenderOptions>>,
    overlay: Rc<RefCell<OverlayState>>,
    pictures: Rc<PictureCache>,
    palette: Rc<dyn Palette>,
    text: Rc<dyn TextService>,
}

impl Default for PoolViewController {
    fn default() -> Self {
        Self::new(Document::new())
    }
}

impl PoolViewController {
    pub fn new(doc: Document) -> Self {
        Self {
            doc: Rc::new(RefCell::new(doc)),
            tree: Rc::new(TreeView::new()),
            selection: Rc::new(RefCell::new(SelectionManager::new())),
            options: Rc::new(RefCell::new(RenderOptions::default())),
            overlay: Rc::new(RefCell::new(OverlayState::default())),
            pictures: Rc::new(PictureCache::new()),
            palette: Rc::new(StandardPalette),
            text: Rc::new(BlockGlyphs),
        }
    }

    pub fn with_palette(mut self, palette: impl Palette + 'static) -> Self {
        self.palette = Rc::new(palette);
        self
    }

    pub fn with_text_service(mut self, text: impl TextService + 'static) -> Self {
        self.text = Rc::new(text);
        self
    }

    pub fn document(&self) -> Ref<'_, Document> {
        self.doc.borrow()
    }

    pub fn tree(&self) -> Rc<TreeView> {
        self.tree.clone()
    }

    pub fn options(&self) -> RenderOptions {
        self.options.borrow().clone()
    }

    pub fn set_options(&self, options: RenderOptions) {
        *self.options.borrow_mut() = options;
    }

    /// Set the zoom level.
    pub fn set_zoom(&self, zoom: f32) {
        self.options.borrow_mut().zoom = zoom;
    }

    /// Get the current zoom level.
    pub fn zoom(&self) -> f32 {
        self.options.borrow().zoom
    }

    pub fn set_draw_grid(&self, on: bool) {
        self.options.borrow_mut().draw_grid = on;
    }

    pub fn set_draw_borders(&self, on: bool) {
        self.options.borrow_mut().draw_borders = on;
    }

    // === Tree navigation ===

    pub fn path_to(&self, id: ElementId) -> Option<TreePath> {
        self.tree.path_to(&self.doc.borrow(), id)
    }

    pub fn path_to_named(&self, name: &str) -> Option<TreePath> {
        let id = self.doc.borrow().resolve(name)?;
        self.path_to(id)
    }

    /// Mirror the child labels of `item` into a host tree widget model.
    pub fn sync_children_model(&self, item: &TreeItem, model: &VecModel<SharedString>) {
        self.tree.sync_to_model(&self.doc.borrow(), item, model);
    }

    // === Selection ===

    pub fn selection(&self) -> Option<TreePath> {
        self.selection.borrow().active().cloned()
    }

    pub fn select(&self, path: TreePath) {
        self.selection.borrow_mut().select(path);
    }

    pub fn clear_selection(&self) {
        self.selection.borrow_mut().clear();
    }

    /// Sync the breadcrumb of the selection to a Slint VecModel.
    pub fn sync_selection_model(&self, model: &VecModel<SharedString>) {
        self.selection.borrow().sync_to_model(&self.doc.borrow(), model);
    }

    // === Rendering ===

    /// Paint the subtree at the end of `start` into a `width` x `height`
    /// surface.
    pub fn paint(&self, start: &TreePath, width: u32, height: u32) -> PaintResult {
        let doc = self.doc.borrow();
        let options = self.options.borrow().clone();
        let active = self.selection();
        let engine = TraversalEngine::new(&doc, &self.tree, &options)
            .with_pictures(&self.pictures)
            .with_active(active);
        let root = engine.root_context().clone();
        let raster = Raster::new(width, height);
        let viewport = raster.bounds();
        let mut visitor = PaintVisitor::new(
            raster,
            &options,
            &root,
            &*self.palette,
            &*self.text,
            &self.pictures,
        );
        let outcome = engine.run(start, viewport, &mut visitor);
        debug!(
            visits = outcome.report.visits,
            diagnostics = outcome.report.diagnostics.len(),
            "paint finished"
        );
        *self.overlay.borrow_mut() = outcome.overlay.clone();
        PaintResult {
            buffer: visitor.into_raster().into_buffer(),
            overlay: outcome.overlay,
            report: outcome.report,
        }
    }

    /// Deepest node under the device point, drawing from `start`.
    pub fn locate(&self, start: &TreePath, x: f32, y: f32) -> Option<TreePath> {
        let options = self.options.borrow().clone();
        hit_test::locate(
            &self.doc.borrow(),
            &self.tree,
            &options,
            &self.pictures,
            start,
            self.selection(),
            x,
            y,
        )
    }

    /// Select whatever lies under the point. Returns whether the selection
    /// changed.
    pub fn select_at(&self, start: &TreePath, x: f32, y: f32) -> bool {
        let hit = self.locate(start, x, y);
        self.selection.borrow_mut().handle_locate(hit)
    }

    /// Overlay captured by the last [`paint`](Self::paint).
    pub fn overlay(&self) -> OverlayState {
        self.overlay.borrow().clone()
    }

    /// Grid commands for the grid owner captured by the last paint.
    pub fn grid_commands(&self) -> SharedString {
        let spacing = self.options.borrow().grid_spacing;
        self.overlay
            .borrow()
            .grid
            .as_ref()
            .map(|captured| GridOverlay::new(captured).commands(spacing))
            .unwrap_or_default()
            .into()
    }

    /// Outline of the selected node captured by the last paint.
    pub fn selection_outline(&self) -> SharedString {
        self.overlay
            .borrow()
            .selection
            .as_ref()
            .map(|captured| captured.outline_commands())
            .unwrap_or_default()
            .into()
    }

    // === Document mutation ===

    fn apply(&self, change: &DocumentChange) {
        debug!(?change, "invalidating tree view");
        self.tree.invalidate(change);
        if let DocumentChange::AttributeChanged { attribute, .. } = change {
            if attribute.ends_with("bitmap_path") || attribute == "file" {
                self.pictures.clear();
            }
        }
    }

    pub fn append_element(
        &self,
        parent: ElementId,
        tag: &str,
        attributes: &[(&str, &str)],
    ) -> Result<ElementId, DocumentError> {
        let (id, change) = self.doc.borrow_mut().append_element(parent, tag, attributes)?;
        self.apply(&change);
        Ok(id)
    }

    pub fn insert_child(
        &self,
        parent: ElementId,
        index: usize,
        child: ElementId,
    ) -> Result<(), DocumentError> {
        let change = self.doc.borrow_mut().insert_child(parent, index, child)?;
        self.apply(&change);
        Ok(())
    }

    /// Create a detached element, to be placed with
    /// [`insert_child`](Self::insert_child).
    pub fn create_element(&self, tag: &str, attributes: &[(&str, &str)]) -> ElementId {
        self.doc.borrow_mut().create_element(tag, attributes)
    }

    pub fn remove_child(&self, parent: ElementId, child: ElementId) -> Result<(), DocumentError> {
        let change = self.doc.borrow_mut().remove_child(parent, child)?;
        self.apply(&change);
        Ok(())
    }

    pub fn set_attribute(&self, id: ElementId, key: &str, value: &str) -> Result<(), DocumentError> {
        let change = self.doc.borrow_mut().set_attribute(id, key, value)?;
        self.apply(&change);
        Ok(())
    }

    pub fn remove_attribute(&self, id: ElementId, key: &str) -> Result<(), DocumentError> {
        let change = self.doc.borrow_mut().remove_attribute(id, key)?;
        self.apply(&change);
        Ok(())
    }

    /// Whether any object in the pool flashes.
    fn has_flashing(&self) -> bool {
        let doc = self.doc.borrow();
        doc.subtree(doc.root()).into_iter().any(|id| {
            doc.element(id)
                .and_then(|e| e.attribute("options"))
                .is_some_and(|raw| Options::parse(raw).contains("flashing"))
        })
    }

    // === Callback factories ===

    /// Returns a callback for a periodic flash timer.
    ///
    /// Each call flips the flash phase and returns whether a repaint is
    /// needed, i.e. whether anything in the pool flashes.
    pub fn flash_tick_callback(&self) -> impl Fn() -> bool {
        let ctrl = self.clone();
        move || {
            {
                let mut options = ctrl.options.borrow_mut();
                options.flash = !options.flash;
            }
            ctrl.has_flashing()
        }
    }

    /// Returns a callback selecting the node under a clicked point.
    pub fn locate_callback(&self, start: TreePath) -> impl Fn(f32, f32) -> bool {
        let ctrl = self.clone();
        move |x, y| ctrl.select_at(&start, x, y)
    }

    /// Returns a callback for zoom changes.
    pub fn zoom_callback(&self) -> impl Fn(f32) {
        let options = self.options.clone();
        move |zoom| {
            options.borrow_mut().zoom = zoom;
        }
    }
}
