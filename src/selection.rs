use crate::document::Document;
use crate::path::TreePath;
use slint::{Model, SharedString, VecModel};

/// The active (selected) tree position.
///
/// The traversal captures the selection outline for the active path and the
/// grid for its parent, see [`grid_owner`](Self::grid_owner).
#[derive(Debug, Default, Clone)]
pub struct SelectionManager {
    active: Option<TreePath>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, path: TreePath) {
        if path.is_empty() {
            self.active = None;
        } else {
            self.active = Some(path);
        }
    }

    /// Apply a locate result: a hit replaces the selection, a miss clears it.
    /// Returns whether the selection changed.
    pub fn handle_locate(&mut self, hit: Option<TreePath>) -> bool {
        let changed = self.active != hit;
        match hit {
            Some(path) => self.select(path),
            None => self.clear(),
        }
        changed
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<&TreePath> {
        self.active.as_ref()
    }

    /// The position whose grid is shown while something inside it is
    /// selected.
    pub fn grid_owner(&self) -> Option<TreePath> {
        self.active
            .as_ref()
            .map(TreePath::parent)
            .filter(|p| !p.is_empty())
    }

    pub fn is_selected(&self, path: &TreePath) -> bool {
        self.active.as_ref() == Some(path)
    }

    /// Whether `path` is the active path or one of its ancestors.
    pub fn is_on_active_path(&self, path: &TreePath) -> bool {
        self.active.as_ref().is_some_and(|active| path.is_prefix_of(active))
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_none()
    }

    /// Sync the breadcrumb of the active path to a Slint VecModel
    pub fn sync_to_model(&self, doc: &Document, model: &VecModel<SharedString>) {
        // Clear and repopulate to ensure exact match
        while model.row_count() > 0 {
            model.remove(0);
        }
        if let Some(active) = &self.active {
            for item in active.items() {
                model.push(item.label(doc).into());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::ObjectKind;
    use crate::tree::{Category, TreeItem};

    fn masks() -> TreePath {
        TreePath::root().child(TreeItem::Category(Category::Masks))
    }

    fn data_masks() -> TreePath {
        masks().child(TreeItem::SubCategory(ObjectKind::DataMask))
    }

    // ========================================================================
    // SelectionManager::new() and Default
    // ========================================================================

    #[test]
    fn test_new_selection_is_empty() {
        let selection = SelectionManager::new();
        assert!(selection.is_empty());
        assert!(selection.active().is_none());
        assert!(selection.grid_owner().is_none());
    }

    // ========================================================================
    // select() / clear()
    // ========================================================================

    #[test]
    fn test_select_replaces() {
        let mut selection = SelectionManager::new();
        selection.select(masks());
        selection.select(data_masks());
        assert!(selection.is_selected(&data_masks()));
        assert!(!selection.is_selected(&masks()));
    }

    #[test]
    fn test_select_empty_path_clears() {
        let mut selection = SelectionManager::new();
        selection.select(masks());
        selection.select(TreePath::new());
        assert!(selection.is_empty());
    }

    #[test]
    fn test_clear_empties_selection() {
        let mut selection = SelectionManager::new();
        selection.select(masks());
        selection.clear();
        assert!(selection.is_empty());
    }

    // ========================================================================
    // handle_locate()
    // ========================================================================

    #[test]
    fn test_handle_locate_hit_selects() {
        let mut selection = SelectionManager::new();
        assert!(selection.handle_locate(Some(masks())));
        assert!(selection.is_selected(&masks()));
        assert!(!selection.handle_locate(Some(masks())));
    }

    #[test]
    fn test_handle_locate_miss_clears() {
        let mut selection = SelectionManager::new();
        selection.select(masks());
        assert!(selection.handle_locate(None));
        assert!(selection.is_empty());
        assert!(!selection.handle_locate(None));
    }

    // ========================================================================
    // Grid owner and ancestry
    // ========================================================================

    #[test]
    fn test_grid_owner_is_parent() {
        let mut selection = SelectionManager::new();
        selection.select(data_masks());
        assert_eq!(selection.grid_owner(), Some(masks()));
    }

    #[test]
    fn test_root_selection_has_no_grid_owner() {
        let mut selection = SelectionManager::new();
        selection.select(TreePath::root());
        assert!(selection.grid_owner().is_none());
    }

    #[test]
    fn test_on_active_path() {
        let mut selection = SelectionManager::new();
        selection.select(data_masks());
        assert!(selection.is_on_active_path(&TreePath::root()));
        assert!(selection.is_on_active_path(&data_masks()));
        assert!(!selection.is_on_active_path(
            &TreePath::root().child(TreeItem::Category(Category::Fields))
        ));
    }

    // ========================================================================
    // sync_to_model()
    // ========================================================================

    #[test]
    fn test_sync_to_model_breadcrumb() {
        let doc = Document::new();
        let mut selection = SelectionManager::new();
        selection.select(data_masks());
        let model = VecModel::from(vec![SharedString::from("stale")]);
        selection.sync_to_model(&doc, &model);
        assert_eq!(model.row_count(), 3);
        assert_eq!(model.row_data(1), Some(SharedString::from(Category::Masks.label())));
    }

    #[test]
    fn test_sync_to_model_empty_selection() {
        let doc = Document::new();
        let selection = SelectionManager::new();
        let model = VecModel::from(vec![SharedString::from("stale")]);
        selection.sync_to_model(&doc, &model);
        assert_eq!(model.row_count(), 0);
    }
}
