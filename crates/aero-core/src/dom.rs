#![forbid(unsafe_code)]

//! DOM capability traits.
//!
//! The engine never holds a document. It asks a [`DomLocator`] to find and
//! inspect nodes and a [`DomHost`] to move them or edit the body class
//! list. `aero-web` implements both over `web-sys`; [`MemoryDom`] implements
//! them in memory.
//!
//! Nodes are element handles: cheap to clone, compared by identity.
//!
//! [`MemoryDom`]: crate::MemoryDom

use core::fmt::Debug;

/// Read access to a document.
pub trait DomLocator {
    /// Element handle.
    type Node: Clone + PartialEq + Debug;

    /// First element in document order matching `selector`.
    ///
    /// Invalid or unsupported selectors match nothing.
    fn find_one(&self, selector: &str) -> Option<Self::Node>;

    /// All elements in document order matching `selector`.
    fn find_all(&self, selector: &str) -> Vec<Self::Node>;

    /// Whether `node` matches `selector`.
    fn matches(&self, node: &Self::Node, selector: &str) -> bool;

    /// Whether `node` carries `class` in its class list.
    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    /// Whether `node` is currently part of the document tree.
    fn is_attached(&self, node: &Self::Node) -> bool;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    fn first_child(&self, node: &Self::Node) -> Option<Self::Node>;

    fn last_child(&self, node: &Self::Node) -> Option<Self::Node>;

    fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;

    fn previous_sibling(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Inclusive ancestry: true when `node` is `ancestor` or lies inside it.
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool {
        let mut current = Some(node.clone());
        while let Some(candidate) = current {
            if candidate == *ancestor {
                return true;
            }
            current = self.parent(&candidate);
        }
        false
    }

    /// Current viewport width in CSS pixels.
    fn viewport_width(&self) -> u32;
}

/// Write access to a document.
pub trait DomHost: DomLocator {
    /// Host-side rejection of a tree mutation.
    type Error: Debug;

    /// Move `node` under `parent`, before `reference` (or last when `None`).
    ///
    /// `node` is detached from its current position first.
    ///
    /// # Errors
    ///
    /// Returns the host error when the document refuses the insertion.
    fn insert_before(
        &mut self,
        parent: &Self::Node,
        node: &Self::Node,
        reference: Option<&Self::Node>,
    ) -> Result<(), Self::Error>;

    /// Move `node` to be the last child of `parent`.
    ///
    /// # Errors
    ///
    /// See [`DomHost::insert_before`].
    fn append_child(&mut self, parent: &Self::Node, node: &Self::Node) -> Result<(), Self::Error> {
        self.insert_before(parent, node, None)
    }

    /// Move `node` to be the first child of `parent`.
    ///
    /// # Errors
    ///
    /// See [`DomHost::insert_before`].
    fn prepend_child(&mut self, parent: &Self::Node, node: &Self::Node) -> Result<(), Self::Error> {
        let first = self.first_child(parent);
        self.insert_before(parent, node, first.as_ref())
    }

    /// Add `class` to the document body. Adding a present class is a no-op.
    fn add_body_class(&mut self, class: &str);

    /// Remove `class` from the document body. Removing an absent class is a no-op.
    fn remove_body_class(&mut self, class: &str);
}

// ---------------------------------------------------------------------------
// Move recording
// ---------------------------------------------------------------------------

/// [`DomHost`] wrapper that remembers every node moved through it.
///
/// A host observing the document reports each of those moves back as an
/// insertion. [`InstanceManager::pump`](crate::InstanceManager::pump) hands
/// the recorded nodes to the port so that report is not handled as a fresh
/// insertion.
#[derive(Debug)]
pub struct MoveRecorder<'a, D: DomHost + ?Sized> {
    inner: &'a mut D,
    moved: Vec<D::Node>,
}

impl<'a, D: DomHost + ?Sized> MoveRecorder<'a, D> {
    pub fn new(inner: &'a mut D) -> Self {
        Self {
            inner,
            moved: Vec::new(),
        }
    }

    /// Nodes moved so far, each once, in first-move order.
    #[must_use]
    pub fn moved(&self) -> &[D::Node] {
        &self.moved
    }

    #[must_use]
    pub fn into_moved(self) -> Vec<D::Node> {
        self.moved
    }
}

impl<D: DomHost + ?Sized> DomLocator for MoveRecorder<'_, D> {
    type Node = D::Node;

    fn find_one(&self, selector: &str) -> Option<Self::Node> {
        self.inner.find_one(selector)
    }

    fn find_all(&self, selector: &str) -> Vec<Self::Node> {
        self.inner.find_all(selector)
    }

    fn matches(&self, node: &Self::Node, selector: &str) -> bool {
        self.inner.matches(node, selector)
    }

    fn has_class(&self, node: &Self::Node, class: &str) -> bool {
        self.inner.has_class(node, class)
    }

    fn is_attached(&self, node: &Self::Node) -> bool {
        self.inner.is_attached(node)
    }

    fn parent(&self, node: &Self::Node) -> Option<Self::Node> {
        self.inner.parent(node)
    }

    fn first_child(&self, node: &Self::Node) -> Option<Self::Node> {
        self.inner.first_child(node)
    }

    fn last_child(&self, node: &Self::Node) -> Option<Self::Node> {
        self.inner.last_child(node)
    }

    fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node> {
        self.inner.next_sibling(node)
    }

    fn previous_sibling(&self, node: &Self::Node) -> Option<Self::Node> {
        self.inner.previous_sibling(node)
    }

    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool {
        self.inner.contains(ancestor, node)
    }

    fn viewport_width(&self) -> u32 {
        self.inner.viewport_width()
    }
}

impl<D: DomHost + ?Sized> DomHost for MoveRecorder<'_, D> {
    type Error = D::Error;

    fn insert_before(
        &mut self,
        parent: &Self::Node,
        node: &Self::Node,
        reference: Option<&Self::Node>,
    ) -> Result<(), Self::Error> {
        self.inner.insert_before(parent, node, reference)?;
        if !self.moved.contains(node) {
            self.moved.push(node.clone());
        }
        Ok(())
    }

    fn add_body_class(&mut self, class: &str) {
        self.inner.add_body_class(class);
    }

    fn remove_body_class(&mut self, class: &str) {
        self.inner.remove_body_class(class);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDom;
    use pretty_assertions::assert_eq;

    #[test]
    fn recorder_keeps_each_moved_node_once() {
        let mut dom = MemoryDom::new(800);
        let body = dom.body();
        let dock = dom.append_new(body, "div.dock");
        let a = dom.append_new(body, "div.card");
        let b = dom.append_new(body, "div.card");

        let mut recorder = MoveRecorder::new(&mut dom);
        recorder.append_child(&dock, &a).unwrap();
        recorder.prepend_child(&dock, &b).unwrap();
        recorder.append_child(&dock, &a).unwrap();
        recorder.add_body_class("md");
        assert_eq!(recorder.find_all(".card"), vec![b, a]);
        assert_eq!(recorder.into_moved(), vec![a, b]);
        assert_eq!(dom.children(dock), &[b, a]);
        assert_eq!(dom.body_classes(), &["md".to_owned()]);
    }

    #[test]
    fn rejected_insertion_is_not_recorded() {
        let mut dom = MemoryDom::new(800);
        let body = dom.body();
        let outer = dom.append_new(body, "div.outer");
        let inner = dom.append_new(outer, "div.inner");

        let mut recorder = MoveRecorder::new(&mut dom);
        assert!(recorder.append_child(&inner, &outer).is_err());
        assert!(recorder.moved().is_empty());
    }
}
