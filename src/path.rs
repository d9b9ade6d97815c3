//! Paths from the synthetic tree root down to one position.
//!
//! A [`TreePath`] is a persistent linked list: extending a path shares the
//! parent chain, so every frame of a traversal can own its path cheaply.
//! Paths compare by the identity of their items, see [`TreeItem`]'s
//! `PartialEq`.

use crate::node::NodeView;
use crate::tree::TreeItem;
use std::fmt;
use std::rc::Rc;

struct PathNode {
    parent: TreePath,
    item: TreeItem,
    len: usize,
}

#[derive(Clone, Default)]
pub struct TreePath(Option<Rc<PathNode>>);

impl TreePath {
    /// The empty path.
    pub fn new() -> Self {
        Self(None)
    }

    /// A path holding only the synthetic root.
    pub fn root() -> Self {
        Self::new().child(TreeItem::Root)
    }

    pub fn from_items<I: IntoIterator<Item = TreeItem>>(items: I) -> Self {
        items.into_iter().fold(Self::new(), |path, item| path.child(item))
    }

    /// This path extended by `item`.
    pub fn child(&self, item: TreeItem) -> TreePath {
        TreePath(Some(Rc::new(PathNode {
            parent: self.clone(),
            len: self.len() + 1,
            item,
        })))
    }

    pub fn len(&self) -> usize {
        self.0.as_ref().map_or(0, |n| n.len)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn last(&self) -> Option<&TreeItem> {
        self.0.as_ref().map(|n| &n.item)
    }

    /// The node at the end of the path, if it is a real node.
    pub fn last_node(&self) -> Option<&Rc<NodeView>> {
        self.last().and_then(TreeItem::node)
    }

    /// The path without its last item; the empty path stays empty.
    pub fn parent(&self) -> TreePath {
        self.0.as_ref().map(|n| n.parent.clone()).unwrap_or_default()
    }

    /// Item at `index`, counted from the root.
    pub fn component(&self, index: usize) -> Option<&TreeItem> {
        let len = self.len();
        if index >= len {
            return None;
        }
        let mut current = self.0.as_ref()?;
        for _ in 0..(len - 1 - index) {
            current = current.parent.0.as_ref()?;
        }
        Some(&current.item)
    }

    /// Items from the root down.
    pub fn items(&self) -> Vec<TreeItem> {
        let mut out = Vec::with_capacity(self.len());
        let mut current = self.0.as_ref();
        while let Some(node) = current {
            out.push(node.item.clone());
            current = node.parent.0.as_ref();
        }
        out.reverse();
        out
    }

    /// Whether `self` is `other` or one of its ancestors.
    pub fn is_prefix_of(&self, other: &TreePath) -> bool {
        let (len, other_len) = (self.len(), other.len());
        if len > other_len {
            return false;
        }
        let mut ancestor = other.clone();
        for _ in 0..(other_len - len) {
            ancestor = ancestor.parent();
        }
        ancestor == *self
    }
}

impl PartialEq for TreePath {
    fn eq(&self, other: &Self) -> bool {
        let (mut a, mut b) = (self.0.as_ref(), other.0.as_ref());
        loop {
            match (a, b) {
                (None, None) => return true,
                (Some(x), Some(y)) => {
                    if Rc::ptr_eq(x, y) {
                        return true;
                    }
                    if x.len != y.len || x.item != y.item {
                        return false;
                    }
                    a = x.parent.0.as_ref();
                    b = y.parent.0.as_ref();
                }
                _ => return false,
            }
        }
    }
}

impl Eq for TreePath {}

impl fmt::Debug for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::kind::ObjectKind;
    use crate::tree::Category;

    fn object(doc: &Document, tag: &str) -> (Document, TreeItem) {
        let mut doc = doc.clone();
        let root = doc.root();
        let (id, _) = doc.append_element(root, tag, &[]).unwrap();
        let item = TreeItem::Object(Rc::new(NodeView::new(&doc, id)));
        (doc, item)
    }

    // ========================================================================
    // Construction and navigation
    // ========================================================================

    #[test]
    fn test_empty_path() {
        let path = TreePath::new();
        assert!(path.is_empty());
        assert_eq!(path.len(), 0);
        assert!(path.last().is_none());
        assert!(path.parent().is_empty());
    }

    #[test]
    fn test_child_and_parent() {
        let root = TreePath::root();
        let masks = root.child(TreeItem::Category(Category::Masks));
        assert_eq!(masks.len(), 2);
        assert_eq!(masks.last(), Some(&TreeItem::Category(Category::Masks)));
        assert_eq!(masks.parent(), root);
    }

    #[test]
    fn test_component_counts_from_root() {
        let path = TreePath::from_items([
            TreeItem::Root,
            TreeItem::Category(Category::Masks),
            TreeItem::SubCategory(ObjectKind::DataMask),
        ]);
        assert_eq!(path.component(0), Some(&TreeItem::Root));
        assert_eq!(path.component(2), Some(&TreeItem::SubCategory(ObjectKind::DataMask)));
        assert_eq!(path.component(3), None);
    }

    #[test]
    fn test_items_roundtrip() {
        let items = vec![TreeItem::Root, TreeItem::Category(Category::Graphics)];
        assert_eq!(TreePath::from_items(items.clone()).items(), items);
    }

    // ========================================================================
    // Identity comparison
    // ========================================================================

    #[test]
    fn test_paths_with_same_objects_are_equal() {
        let (_doc, item) = object(&Document::new(), "datamask");
        let a = TreePath::root().child(item.clone());
        let b = TreePath::root().child(item);
        assert_eq!(a, b);
    }

    #[test]
    fn test_equal_but_distinct_wrappers_differ() {
        let (doc, item) = object(&Document::new(), "datamask");
        let copy = match &item {
            TreeItem::Object(view) => TreeItem::Object(Rc::new(NodeView::new(&doc, view.position()))),
            _ => unreachable!(),
        };
        assert_ne!(TreePath::root().child(item), TreePath::root().child(copy));
    }

    #[test]
    fn test_prefix() {
        let root = TreePath::root();
        let deeper = root
            .child(TreeItem::Category(Category::Masks))
            .child(TreeItem::SubCategory(ObjectKind::DataMask));
        assert!(root.is_prefix_of(&deeper));
        assert!(deeper.is_prefix_of(&deeper));
        assert!(!deeper.is_prefix_of(&root));
        assert!(!TreePath::root()
            .child(TreeItem::Category(Category::Fields))
            .is_prefix_of(&deeper));
    }
}
