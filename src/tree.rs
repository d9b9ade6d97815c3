//! Indexable tree over the document with cached child lists.
//!
//! The tree starts at a synthetic root holding fixed [`Category`] nodes, each
//! holding one sub-category per object kind. A sub-category lists the actual
//! root-level objects of its kind; below that the tree follows the document,
//! with link positions resolved to their targets.
//!
//! Child lists are built lazily and cached. The cached [`NodeView`] wrappers
//! keep their identity across reads, which is what lets [`TreePath`]s from
//! different traversals compare equal. When an invalidated list is rebuilt,
//! wrappers whose classification did not change are carried over.

use crate::document::{Document, DocumentChange, ElementId};
use crate::kind::ObjectKind;
use crate::node::NodeView;
use crate::path::TreePath;
use slint::{Model, SharedString, VecModel};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Masks,
    Controls,
    Fields,
    Graphics,
    Resources,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Masks,
        Category::Controls,
        Category::Fields,
        Category::Graphics,
        Category::Resources,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Masks => "Masks",
            Category::Controls => "Controls",
            Category::Fields => "Fields",
            Category::Graphics => "Graphics",
            Category::Resources => "Resources",
        }
    }

    /// Sub-category kinds, in display order.
    pub fn kinds(self) -> &'static [ObjectKind] {
        match self {
            Category::Masks => &[
                ObjectKind::WorkingSet,
                ObjectKind::DataMask,
                ObjectKind::AlarmMask,
                ObjectKind::SoftKeyMask,
            ],
            Category::Controls => &[
                ObjectKind::Key,
                ObjectKind::Button,
                ObjectKind::Container,
                ObjectKind::ObjectPointer,
                ObjectKind::AuxiliaryFunction,
                ObjectKind::AuxiliaryInput,
            ],
            Category::Fields => &[
                ObjectKind::InputBoolean,
                ObjectKind::InputString,
                ObjectKind::InputNumber,
                ObjectKind::InputList,
                ObjectKind::OutputString,
                ObjectKind::OutputNumber,
            ],
            Category::Graphics => &[
                ObjectKind::Line,
                ObjectKind::Rectangle,
                ObjectKind::Ellipse,
                ObjectKind::Polygon,
                ObjectKind::Meter,
                ObjectKind::LinearBarGraph,
                ObjectKind::ArchedBarGraph,
                ObjectKind::PictureGraphic,
            ],
            Category::Resources => &[
                ObjectKind::NumberVariable,
                ObjectKind::StringVariable,
                ObjectKind::FontAttributes,
                ObjectKind::LineAttributes,
                ObjectKind::FillAttributes,
                ObjectKind::InputAttributes,
                ObjectKind::Macro,
            ],
        }
    }

    pub fn of(kind: ObjectKind) -> Option<Category> {
        Self::ALL.into_iter().find(|c| c.kinds().contains(&kind))
    }
}

/// One entry of the tree.
#[derive(Debug, Clone)]
pub enum TreeItem {
    Root,
    Category(Category),
    SubCategory(ObjectKind),
    Object(Rc<NodeView>),
}

/// Synthetic items compare by value, real nodes by wrapper identity.
impl PartialEq for TreeItem {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TreeItem::Root, TreeItem::Root) => true,
            (TreeItem::Category(a), TreeItem::Category(b)) => a == b,
            (TreeItem::SubCategory(a), TreeItem::SubCategory(b)) => a == b,
            (TreeItem::Object(a), TreeItem::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for TreeItem {}

impl TreeItem {
    pub fn node(&self) -> Option<&Rc<NodeView>> {
        match self {
            TreeItem::Object(view) => Some(view),
            _ => None,
        }
    }

    pub fn label(&self, doc: &Document) -> String {
        match self {
            TreeItem::Root => "Object Pool".to_owned(),
            TreeItem::Category(c) => c.label().to_owned(),
            TreeItem::SubCategory(kind) => kind.group_label().to_owned(),
            TreeItem::Object(view) => view.label(doc),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ListKey {
    Root,
    Category(Category),
    SubCategory(ObjectKind),
    Element(ElementId),
}

struct CachedList {
    /// Element the list was built from.
    source: Option<ElementId>,
    /// Name map revision the links in the list were resolved at; `None` when
    /// the list holds no links.
    names_revision: Option<u64>,
    items: Rc<[TreeItem]>,
}

/// Lazily built child lists over a [`Document`].
///
/// The view never observes the document by itself: every mutation must be
/// followed by [`invalidate`](Self::invalidate) with the change it returned
/// before the tree is read again.
#[derive(Default)]
pub struct TreeView {
    lists: RefCell<HashMap<ListKey, CachedList>>,
    /// Invalidated lists, kept until rebuilt so wrappers can be reused.
    retired: RefCell<HashMap<ListKey, Rc<[TreeItem]>>>,
}

impl TreeView {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(item: &TreeItem) -> Option<ListKey> {
        Some(match item {
            TreeItem::Root => ListKey::Root,
            TreeItem::Category(c) => ListKey::Category(*c),
            TreeItem::SubCategory(kind) => ListKey::SubCategory(*kind),
            TreeItem::Object(view) => ListKey::Element(view.actual()?),
        })
    }

    /// The cached child list of `item`, built on first use. Broken links have
    /// no children.
    pub fn children(&self, doc: &Document, item: &TreeItem) -> Rc<[TreeItem]> {
        let Some(key) = Self::key(item) else {
            return Rc::from(Vec::new());
        };
        let stale = match self.lists.borrow().get(&key) {
            Some(cached) if cached.names_revision.is_some_and(|r| r != doc.names_revision()) => {
                true
            }
            Some(cached) => return cached.items.clone(),
            None => false,
        };
        if stale {
            // Names changed since the links in this list were resolved.
            if let Some(cached) = self.lists.borrow_mut().remove(&key) {
                self.retired.borrow_mut().insert(key, cached.items);
            }
        }
        let source = match key {
            ListKey::Root | ListKey::Category(_) => None,
            ListKey::SubCategory(_) => Some(doc.root()),
            ListKey::Element(id) => Some(id),
        };
        let previous = {
            let mut retired = self.retired.borrow_mut();
            // Lists of deleted elements can never be read again.
            retired.retain(|key, _| match key {
                ListKey::Element(id) => doc.contains(*id),
                _ => true,
            });
            retired.remove(&key)
        };
        let items: Rc<[TreeItem]> = Self::build(doc, key, previous.as_deref()).into();
        let has_links = items
            .iter()
            .filter_map(TreeItem::node)
            .any(|view| view.is_link());
        self.lists.borrow_mut().insert(
            key,
            CachedList {
                source,
                names_revision: has_links.then(|| doc.names_revision()),
                items: items.clone(),
            },
        );
        items
    }

    fn build(doc: &Document, key: ListKey, previous: Option<&[TreeItem]>) -> Vec<TreeItem> {
        let reusable: HashMap<ElementId, &Rc<NodeView>> = previous
            .into_iter()
            .flatten()
            .filter_map(TreeItem::node)
            .map(|view| (view.position(), view))
            .collect();
        let wrap = |id: ElementId| {
            let view = NodeView::new(doc, id);
            let reused = reusable.get(&id).filter(|old| ****old == view);
            TreeItem::Object(reused.map(|old| (*old).clone()).unwrap_or_else(|| Rc::new(view)))
        };
        match key {
            ListKey::Root => Category::ALL.into_iter().map(TreeItem::Category).collect(),
            ListKey::Category(c) => c.kinds().iter().copied().map(TreeItem::SubCategory).collect(),
            ListKey::SubCategory(kind) => doc
                .element(doc.root())
                .map(|root| {
                    root.children()
                        .iter()
                        .copied()
                        .filter(|&id| {
                            doc.element(id)
                                .is_some_and(|e| !e.is_link() && e.kind() == kind)
                        })
                        .map(wrap)
                        .collect()
                })
                .unwrap_or_default(),
            ListKey::Element(id) => doc
                .element(id)
                .map(|e| e.children().iter().copied().map(wrap).collect())
                .unwrap_or_default(),
        }
    }

    pub fn child_count(&self, doc: &Document, item: &TreeItem) -> usize {
        self.children(doc, item).len()
    }

    pub fn child(&self, doc: &Document, item: &TreeItem, index: usize) -> Option<TreeItem> {
        self.children(doc, item).get(index).cloned()
    }

    pub fn index_of_child(&self, doc: &Document, parent: &TreeItem, child: &TreeItem) -> Option<usize> {
        self.children(doc, parent).iter().position(|c| c == child)
    }

    /// Path from the synthetic root to the root-level object `id`.
    pub fn path_to(&self, doc: &Document, id: ElementId) -> Option<TreePath> {
        let kind = doc.element(id)?.kind();
        let category = Category::of(kind)?;
        let sub = TreeItem::SubCategory(kind);
        let object = self
            .children(doc, &sub)
            .iter()
            .find(|item| item.node().is_some_and(|v| v.position() == id))
            .cloned()?;
        Some(
            TreePath::root()
                .child(TreeItem::Category(category))
                .child(sub)
                .child(object),
        )
    }

    /// `path` extended by the `index`th child of its last item.
    pub fn descend(&self, doc: &Document, path: &TreePath, index: usize) -> Option<TreePath> {
        let child = self.child(doc, path.last()?, index)?;
        Some(path.child(child))
    }

    /// Drop the lists a document change may have made stale.
    pub fn invalidate(&self, change: &DocumentChange) {
        let mut lists = self.lists.borrow_mut();
        let mut retired = self.retired.borrow_mut();
        let dropped: Vec<ListKey> = match change {
            DocumentChange::ChildrenChanged { parent } => {
                let mut keys: Vec<ListKey> = lists
                    .iter()
                    .filter(|(k, cached)| {
                        matches!(k, ListKey::SubCategory(_)) && cached.source == Some(*parent)
                    })
                    .map(|(k, _)| *k)
                    .collect();
                keys.extend(Self::subtree_keys(&lists, *parent));
                keys
            }
            // Links re-resolve on their next read through the names revision.
            DocumentChange::Renamed { element, .. } => {
                tracing::debug!(?element, "rename, link lists refresh lazily");
                Vec::new()
            }
            DocumentChange::AttributeChanged { .. } => Vec::new(),
        };
        for key in dropped {
            if let Some(cached) = lists.remove(&key) {
                retired.insert(key, cached.items);
            }
        }
    }

    /// Keys of the cached list of `parent` and, through its non-link
    /// children, of everything below it.
    fn subtree_keys(lists: &HashMap<ListKey, CachedList>, parent: ElementId) -> Vec<ListKey> {
        let mut keys = Vec::new();
        let mut pending = vec![parent];
        let mut seen = HashSet::new();
        while let Some(id) = pending.pop() {
            if !seen.insert(id) {
                continue;
            }
            let key = ListKey::Element(id);
            let Some(cached) = lists.get(&key) else {
                continue;
            };
            keys.push(key);
            pending.extend(
                cached
                    .items
                    .iter()
                    .filter_map(TreeItem::node)
                    .filter(|v| !v.is_link())
                    .map(|v| v.position()),
            );
        }
        keys
    }

    /// Forget every cached list, including wrappers kept for reuse.
    pub fn clear(&self) {
        self.lists.borrow_mut().clear();
        self.retired.borrow_mut().clear();
    }

    /// Number of cached lists.
    pub fn cached_lists(&self) -> usize {
        self.lists.borrow().len()
    }

    /// Number of invalidated lists held for wrapper reuse.
    pub fn retired_lists(&self) -> usize {
        self.retired.borrow().len()
    }

    /// Mirror the child labels of `item` into `model`, touching only rows
    /// whose label changed.
    pub fn sync_to_model(&self, doc: &Document, item: &TreeItem, model: &VecModel<SharedString>) {
        let children = self.children(doc, item);
        for (i, child) in children.iter().enumerate() {
            let label = SharedString::from(child.label(doc));
            if i < model.row_count() {
                if model.row_data(i).as_ref() != Some(&label) {
                    model.set_row_data(i, label);
                }
            } else {
                model.push(label);
            }
        }
        while model.row_count() > children.len() {
            model.remove(model.row_count() - 1);
        }
    }
}
