//! In-memory attributed object pool.
//!
//! Elements live in an arena and are addressed by [`ElementId`]. Every mutation
//! returns a [`DocumentChange`] describing what happened; the owner forwards it
//! to [`TreeView::invalidate`](crate::tree::TreeView::invalidate) before the
//! tree is read again. The document keeps its [`NameMap`] corrected itself.

use crate::error::DocumentError;
use crate::kind::{ObjectKind, LINK_TAG, ROOT_TAG};
use crate::names::NameMap;
use std::collections::BTreeMap;

/// Attribute holding an object's name, or a link's target.
pub const NAME_ATTRIBUTE: &str = "name";

/// Stable handle to an element in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u32);

impl ElementId {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Element {
    tag: String,
    attributes: BTreeMap<String, String>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_owned(),
            attributes: BTreeMap::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Kind of the element. Links report [`ObjectKind::Unknown`]; use
    /// [`NodeView`](crate::node::NodeView) to see through them.
    pub fn kind(&self) -> ObjectKind {
        ObjectKind::from_tag(&self.tag)
    }

    pub fn is_link(&self) -> bool {
        self.tag == LINK_TAG
    }

    pub fn name(&self) -> Option<&str> {
        self.attribute(NAME_ATTRIBUTE)
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    /// Whether this element is registered in the name map when attached.
    fn declares_name(&self) -> bool {
        !self.is_link() && self.tag != ROOT_TAG
    }
}

/// Notification emitted by every document mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentChange {
    /// The child list of `parent` changed, or one of its link children was
    /// retargeted.
    ChildrenChanged { parent: ElementId },
    /// A plain attribute of `element` changed.
    AttributeChanged { element: ElementId, attribute: String },
    /// An actual element changed its name.
    Renamed {
        element: ElementId,
        old: Option<String>,
        new: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct Document {
    elements: Vec<Option<Element>>,
    root: ElementId,
    names: NameMap,
    names_revision: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document holding only an `objectpool` root.
    pub fn new() -> Self {
        Self {
            elements: vec![Some(Element::new(ROOT_TAG))],
            root: ElementId(0),
            names: NameMap::new(),
            names_revision: 0,
        }
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn names(&self) -> &NameMap {
        &self.names
    }

    /// Counter bumped whenever a name is declared or withdrawn. Link
    /// resolutions made at one revision stay valid until it changes.
    pub fn names_revision(&self) -> u64 {
        self.names_revision
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0 as usize).and_then(Option::as_ref)
    }

    pub fn get(&self, id: ElementId) -> Result<&Element, DocumentError> {
        self.element(id).ok_or(DocumentError::UnknownElement(id))
    }

    fn get_mut(&mut self, id: ElementId) -> Result<&mut Element, DocumentError> {
        self.elements
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(DocumentError::UnknownElement(id))
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.element(id).is_some()
    }

    /// Number of live elements, the root included.
    pub fn len(&self) -> usize {
        self.elements.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Resolve a name to its actual element.
    pub fn resolve(&self, name: &str) -> Option<ElementId> {
        self.names.resolve(name)
    }

    /// Create a detached element. It becomes visible (and its name resolvable)
    /// once attached below the root.
    pub fn create_element(&mut self, tag: &str, attributes: &[(&str, &str)]) -> ElementId {
        let mut element = Element::new(tag);
        for (key, value) in attributes {
            element.attributes.insert((*key).to_owned(), (*value).to_owned());
        }
        let id = ElementId(self.elements.len() as u32);
        self.elements.push(Some(element));
        id
    }

    /// Create an element and append it to `parent` in one step.
    pub fn append_element(
        &mut self,
        parent: ElementId,
        tag: &str,
        attributes: &[(&str, &str)],
    ) -> Result<(ElementId, DocumentChange), DocumentError> {
        self.get(parent)?;
        let id = self.create_element(tag, attributes);
        let change = self.append_child(parent, id)?;
        Ok((id, change))
    }

    pub fn append_child(
        &mut self,
        parent: ElementId,
        child: ElementId,
    ) -> Result<DocumentChange, DocumentError> {
        let index = self.get(parent)?.children.len();
        self.insert_child(parent, index, child)
    }

    /// Insert a detached element at `index` (clamped) in `parent`'s children.
    pub fn insert_child(
        &mut self,
        parent: ElementId,
        index: usize,
        child: ElementId,
    ) -> Result<DocumentChange, DocumentError> {
        self.get(parent)?;
        if self.get(child)?.parent.is_some() || child == self.root {
            return Err(DocumentError::AlreadyAttached(child));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(DocumentError::Cycle { parent, child });
        }

        let siblings = &mut self.get_mut(parent)?.children;
        let index = index.min(siblings.len());
        siblings.insert(index, child);
        self.get_mut(child)?.parent = Some(parent);

        if self.is_attached(parent) {
            self.register_subtree(child);
        }
        Ok(DocumentChange::ChildrenChanged { parent })
    }

    /// Detach `child` from `parent` and delete its whole subtree.
    pub fn remove_child(
        &mut self,
        parent: ElementId,
        child: ElementId,
    ) -> Result<DocumentChange, DocumentError> {
        if child == self.root {
            return Err(DocumentError::RootRemoval);
        }
        if self.get(child)?.parent != Some(parent) {
            return Err(DocumentError::NotAChild { parent, child });
        }

        let attached = self.is_attached(parent);
        self.get_mut(parent)?.children.retain(|&c| c != child);

        for id in self.subtree(child) {
            if let Some(element) = self.elements.get_mut(id.0 as usize).and_then(Option::take) {
                if attached && element.declares_name() {
                    if let Some(name) = element.name() {
                        self.names.remove(name, id);
                        self.names_revision += 1;
                    }
                }
            }
        }
        Ok(DocumentChange::ChildrenChanged { parent })
    }

    pub fn set_attribute(
        &mut self,
        id: ElementId,
        key: &str,
        value: &str,
    ) -> Result<DocumentChange, DocumentError> {
        self.update_attribute(id, key, Some(value))
    }

    pub fn remove_attribute(
        &mut self,
        id: ElementId,
        key: &str,
    ) -> Result<DocumentChange, DocumentError> {
        self.update_attribute(id, key, None)
    }

    fn update_attribute(
        &mut self,
        id: ElementId,
        key: &str,
        value: Option<&str>,
    ) -> Result<DocumentChange, DocumentError> {
        let attached = self.is_attached(id);
        let element = self.get_mut(id)?;
        let old = match value {
            Some(v) => element.attributes.insert(key.to_owned(), v.to_owned()),
            None => element.attributes.remove(key),
        };

        if key != NAME_ATTRIBUTE {
            return Ok(DocumentChange::AttributeChanged {
                element: id,
                attribute: key.to_owned(),
            });
        }

        if element.is_link() {
            // Retargeting a link changes what sits at its position.
            return Ok(match element.parent {
                Some(parent) => DocumentChange::ChildrenChanged { parent },
                None => DocumentChange::AttributeChanged {
                    element: id,
                    attribute: key.to_owned(),
                },
            });
        }

        let declares = element.declares_name();
        if attached && declares {
            self.names_revision += 1;
            if let Some(old) = &old {
                self.names.remove(old, id);
            }
            if let Some(new) = value {
                self.names.insert(new, id);
            }
        }
        Ok(DocumentChange::Renamed {
            element: id,
            old,
            new: value.map(str::to_owned),
        })
    }

    /// Recompute the name map from scratch, as after loading a document.
    pub fn rebuild_names(&mut self) {
        let pairs: Vec<(String, ElementId)> = self
            .subtree(self.root)
            .into_iter()
            .filter_map(|id| {
                let element = self.element(id)?;
                if !element.declares_name() {
                    return None;
                }
                element.name().map(|name| (name.to_owned(), id))
            })
            .collect();
        self.names = NameMap::from_pairs(pairs);
        self.names_revision += 1;
    }

    /// `id` and all its descendants in document (pre-)order.
    pub fn subtree(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(element) = self.element(current) else {
                continue;
            };
            out.push(current);
            stack.extend(element.children.iter().rev().copied());
        }
        out
    }

    /// Whether `id` hangs below the root.
    pub fn is_attached(&self, id: ElementId) -> bool {
        self.is_ancestor_or_self(self.root, id)
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: ElementId, id: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.element(c).and_then(Element::parent);
        }
        false
    }

    fn register_subtree(&mut self, id: ElementId) {
        for member in self.subtree(id) {
            let Some(element) = self.element(member) else {
                continue;
            };
            if !element.declares_name() {
                continue;
            }
            if let Some(name) = element.name().map(str::to_owned) {
                self.names.insert(name, member);
                self.names_revision += 1;
            }
        }
    }
}
