#![forbid(unsafe_code)]

//! In-memory document implementing [`DomLocator`] and [`DomHost`].
//!
//! [`MemoryDom`] is an arena of elements rooted at `html > body`. It is the
//! headless stand-in for a browser document: tests build pages with
//! [`MemoryDom::append_new`], drive instances through an
//! [`InstanceManager`](crate::InstanceManager), and inspect the result.
//!
//! Like a `MutationObserver`, the document remembers every node inserted
//! into the tree (by the page or by the engine) until
//! [`MemoryDom::take_inserted`] is called. Insertions made through
//! [`DomHost`] are additionally logged as [`MoveRecord`]s.

use core::fmt;

use crate::dom::{DomHost, DomLocator};
use crate::selector::{SelectorList, SelectorTree, parse_compound};

/// Element handle into a [`MemoryDom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }

    const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One insertion performed through [`DomHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRecord {
    pub node: NodeId,
    pub parent: NodeId,
    /// Child index of `node` under `parent` right after the move.
    pub index: usize,
}

/// Rejected tree mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryDomError {
    /// A handle does not belong to this document.
    UnknownNode(NodeId),
    /// The insertion would place a node inside itself.
    HierarchyRequest,
    /// The reference node is not a child of the parent.
    NotFound,
}

impl fmt::Display for MemoryDomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownNode(id) => write!(f, "unknown node {id}"),
            Self::HierarchyRequest => write!(f, "node cannot be inserted inside itself"),
            Self::NotFound => write!(f, "reference node is not a child of parent"),
        }
    }
}

impl std::error::Error for MemoryDomError {}

#[derive(Debug, Clone, PartialEq, Eq)]
struct NodeData {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl NodeData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            id: None,
            classes: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Arena-backed element tree with a body class list and a viewport width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryDom {
    nodes: Vec<NodeData>,
    root: NodeId,
    body: NodeId,
    viewport_width: u32,
    inserted: Vec<NodeId>,
    moves: Vec<MoveRecord>,
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl MemoryDom {
    /// Create `html > body` with the given viewport width.
    #[must_use]
    pub fn new(viewport_width: u32) -> Self {
        let mut html = NodeData::new("html");
        let mut body = NodeData::new("body");
        let root = NodeId(0);
        let body_id = NodeId(1);
        html.children.push(body_id);
        body.parent = Some(root);
        Self {
            nodes: vec![html, body],
            root,
            body: body_id,
            viewport_width,
            inserted: Vec::new(),
            moves: Vec::new(),
        }
    }

    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub const fn body(&self) -> NodeId {
        self.body
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData::new(tag));
        id
    }

    /// Create an element from a compound spec (`div`, `section#top`,
    /// `p.note.wide`) and append it to `parent`.
    ///
    /// A spec that does not parse becomes the tag name verbatim.
    pub fn append_new(&mut self, parent: NodeId, spec: &str) -> NodeId {
        let node = match parse_compound(spec) {
            Some(compound) => {
                let node = self.create_element(compound.tag.as_deref().unwrap_or("div"));
                if let Some(id) = compound.ids.first() {
                    self.set_id(node, id);
                }
                for class in &compound.classes {
                    self.add_class(node, class);
                }
                node
            }
            None => self.create_element(spec),
        };
        self.attach(parent, node);
        node
    }

    pub fn set_id(&mut self, node: NodeId, id: &str) {
        if let Some(data) = self.nodes.get_mut(node.index()) {
            data.id = Some(id.to_owned());
        }
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(data) = self.nodes.get_mut(node.index())
            && !data.classes.iter().any(|c| c == class)
        {
            data.classes.push(class.to_owned());
        }
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(data) = self.nodes.get_mut(node.index()) {
            data.classes.retain(|c| c != class);
        }
    }

    pub fn set_viewport_width(&mut self, width: u32) {
        self.viewport_width = width;
    }
}

// ---------------------------------------------------------------------------
// Page-side mutation
// ---------------------------------------------------------------------------

impl MemoryDom {
    /// Append `node` to `parent` as the page would. Reported by
    /// [`Self::take_inserted`] but not logged as a move.
    pub fn attach(&mut self, parent: NodeId, node: NodeId) -> bool {
        self.link(parent, node, None).is_ok()
    }

    /// Remove `node` (and its subtree) from the tree.
    pub fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.parent_of(node) else {
            return;
        };
        if let Some(data) = self.nodes.get_mut(parent.index()) {
            data.children.retain(|&child| child != node);
        }
        if let Some(data) = self.nodes.get_mut(node.index()) {
            data.parent = None;
        }
    }

    /// Nodes inserted since the last call, in insertion order.
    pub fn take_inserted(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.inserted)
    }

    /// Insertions performed through [`DomHost`], oldest first.
    #[must_use]
    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    pub fn clear_moves(&mut self) {
        self.moves.clear();
    }

    fn link(
        &mut self,
        parent: NodeId,
        node: NodeId,
        reference: Option<NodeId>,
    ) -> Result<usize, MemoryDomError> {
        for id in [parent, node].into_iter().chain(reference) {
            if self.nodes.get(id.index()).is_none() {
                return Err(MemoryDomError::UnknownNode(id));
            }
        }
        if self.contains(&node, &parent) {
            return Err(MemoryDomError::HierarchyRequest);
        }
        // Inserting a node before itself means before its next sibling.
        let reference = match reference {
            Some(r) if r == node => self.next_sibling(&node),
            other => other,
        };
        if let Some(r) = reference
            && self.parent_of(r) != Some(parent)
        {
            return Err(MemoryDomError::NotFound);
        }

        self.detach(node);
        let children = &mut self.nodes[parent.index()].children;
        let index = match reference {
            Some(r) => children.iter().position(|&c| c == r).unwrap_or(children.len()),
            None => children.len(),
        };
        children.insert(index, node);
        self.nodes[node.index()].parent = Some(parent);
        self.inserted.push(node);
        Ok(index)
    }
}

// ---------------------------------------------------------------------------
// Inspection
// ---------------------------------------------------------------------------

impl MemoryDom {
    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.index())
            .map_or(&[], |data| data.children.as_slice())
    }

    #[must_use]
    pub fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.index()).and_then(|data| data.parent)
    }

    #[must_use]
    pub fn classes(&self, node: NodeId) -> &[String] {
        self.nodes
            .get(node.index())
            .map_or(&[], |data| data.classes.as_slice())
    }

    #[must_use]
    pub fn body_classes(&self) -> &[String] {
        self.classes(self.body)
    }

    #[must_use]
    pub fn tag_of(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node.index()).map(|data| data.tag.as_str())
    }

    /// Elements in document order (pre-order from `html`).
    fn document_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            order.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        order
    }

    fn sibling(&self, node: NodeId, offset: isize) -> Option<NodeId> {
        let parent = self.parent_of(node)?;
        let siblings = self.children(parent);
        let idx = siblings.iter().position(|&c| c == node)?;
        let target = idx.checked_add_signed(offset)?;
        siblings.get(target).copied()
    }
}

impl SelectorTree for MemoryDom {
    type Id = NodeId;

    fn tag(&self, id: NodeId) -> &str {
        self.tag_of(id).unwrap_or("")
    }

    fn element_id(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id.index()).and_then(|data| data.id.as_deref())
    }

    fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.classes(id).iter().any(|c| c == class)
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent_of(id)
    }
}

impl DomLocator for MemoryDom {
    type Node = NodeId;

    fn find_one(&self, selector: &str) -> Option<NodeId> {
        let list = SelectorList::parse(selector)?;
        self.document_order()
            .into_iter()
            .find(|&node| list.matches(self, node))
    }

    fn find_all(&self, selector: &str) -> Vec<NodeId> {
        let Some(list) = SelectorList::parse(selector) else {
            return Vec::new();
        };
        self.document_order()
            .into_iter()
            .filter(|&node| list.matches(self, node))
            .collect()
    }

    fn matches(&self, node: &NodeId, selector: &str) -> bool {
        SelectorList::parse(selector).is_some_and(|list| list.matches(self, *node))
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        SelectorTree::has_class(self, *node, class)
    }

    fn is_attached(&self, node: &NodeId) -> bool {
        self.contains(&self.root, node)
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.parent_of(*node)
    }

    fn first_child(&self, node: &NodeId) -> Option<NodeId> {
        self.children(*node).first().copied()
    }

    fn last_child(&self, node: &NodeId) -> Option<NodeId> {
        self.children(*node).last().copied()
    }

    fn next_sibling(&self, node: &NodeId) -> Option<NodeId> {
        self.sibling(*node, 1)
    }

    fn previous_sibling(&self, node: &NodeId) -> Option<NodeId> {
        self.sibling(*node, -1)
    }

    fn viewport_width(&self) -> u32 {
        self.viewport_width
    }
}

impl DomHost for MemoryDom {
    type Error = MemoryDomError;

    fn insert_before(
        &mut self,
        parent: &NodeId,
        node: &NodeId,
        reference: Option<&NodeId>,
    ) -> Result<(), MemoryDomError> {
        let index = self.link(*parent, *node, reference.copied())?;
        self.moves.push(MoveRecord {
            node: *node,
            parent: *parent,
            index,
        });
        Ok(())
    }

    fn add_body_class(&mut self, class: &str) {
        let body = self.body;
        self.add_class(body, class);
    }

    fn remove_body_class(&mut self, class: &str) {
        let body = self.body;
        self.remove_class(body, class);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
