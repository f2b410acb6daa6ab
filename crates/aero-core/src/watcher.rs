#![forbid(unsafe_code)]

//! Insertion watcher: reacts to nodes added to the document.
//!
//! Two reactions exist per instance:
//!
//! - **Relocate** (reorder-mode only): an added node carrying the class named
//!   by the element selector is moved straight away using the action of the
//!   breakpoint resolved at the current viewport width. The transition gate
//!   is bypassed and left untouched.
//! - **Reevaluate**: an added node matching the instance's root selector
//!   forces a full (gated) run of the transition function.
//!
//! # Invariants
//!
//! 1. Only the added node itself is inspected, never its descendants.
//! 2. A node listed twice in one batch is handled once.
//! 3. The whole batch is classified before anything moves; relocations run
//!    first, then at most one reevaluation.
//!
//! # Failure Modes
//!
//! The relocate reaction requires the element selector to be a single class
//! selector (`.name`). For any other selector it is disabled and the
//! instance only reacts through reevaluation.

use crate::dom::{DomHost, DomLocator};
use crate::instance::{Instance, InstanceConfig};
use crate::manager::Reaction;
use crate::placement::{RelocateOutcome, SkipReason, apply_action};
use crate::selector::parse_compound;

#[cfg(feature = "tracing")]
use crate::logging::{debug, trace};
#[cfg(not(feature = "tracing"))]
use crate::{debug, trace};

/// Class name of a selector of the exact form `.name`.
///
/// ```
/// use aero_core::watched_class;
///
/// assert_eq!(watched_class(".element-to-move"), Some("element-to-move"));
/// assert_eq!(watched_class("#top > .content"), None);
/// ```
#[must_use]
pub fn watched_class(selector: &str) -> Option<&str> {
    let selector = selector.trim();
    let compound = parse_compound(selector)?;
    if compound.tag.is_some() || !compound.ids.is_empty() || compound.classes.len() != 1 {
        return None;
    }
    selector.strip_prefix('.')
}

/// What an instance does with one inserted node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionReaction {
    Ignore,
    Relocate,
    Reevaluate,
    RelocateAndReevaluate,
}

impl InsertionReaction {
    const fn from_flags(relocate: bool, reevaluate: bool) -> Self {
        match (relocate, reevaluate) {
            (false, false) => Self::Ignore,
            (true, false) => Self::Relocate,
            (false, true) => Self::Reevaluate,
            (true, true) => Self::RelocateAndReevaluate,
        }
    }

    #[must_use]
    pub const fn relocates(self) -> bool {
        matches!(self, Self::Relocate | Self::RelocateAndReevaluate)
    }

    #[must_use]
    pub const fn reevaluates(self) -> bool {
        matches!(self, Self::Reevaluate | Self::RelocateAndReevaluate)
    }
}

/// Selectors an instance watches for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DynamicElementWatcher {
    watched_class: Option<String>,
    root_selector: Option<String>,
}

impl DynamicElementWatcher {
    #[must_use]
    pub fn for_config(config: &InstanceConfig) -> Self {
        let watched_class = match config {
            InstanceConfig::Reorder(reorder) => {
                let class = watched_class(reorder.element());
                if class.is_none() {
                    debug!(
                        element = reorder.element(),
                        "element selector is not a single class; dynamic relocation disabled"
                    );
                }
                class.map(str::to_owned)
            }
            InstanceConfig::Class(_) => None,
        };
        Self {
            watched_class,
            root_selector: config.root_selector().map(str::to_owned),
        }
    }

    /// Class whose insertion triggers an immediate relocation.
    #[must_use]
    pub fn watched_class(&self) -> Option<&str> {
        self.watched_class.as_deref()
    }

    /// Selector whose insertion triggers a reevaluation.
    #[must_use]
    pub fn root_selector(&self) -> Option<&str> {
        self.root_selector.as_deref()
    }

    /// Decide how to react to `node` having been inserted.
    pub fn classify_insertion<D: DomLocator + ?Sized>(
        &self,
        dom: &D,
        node: &D::Node,
    ) -> InsertionReaction {
        let relocate = self
            .watched_class
            .as_deref()
            .is_some_and(|class| dom.has_class(node, class));
        let reevaluate = self
            .root_selector
            .as_deref()
            .is_some_and(|selector| dom.matches(node, selector));
        InsertionReaction::from_flags(relocate, reevaluate)
    }
}

impl Instance {
    /// Relocate a freshly inserted node for the breakpoint resolved at the
    /// current viewport width. Bypasses the transition gate.
    pub fn place_inserted<D: DomHost + ?Sized>(
        &self,
        dom: &mut D,
        node: &D::Node,
    ) -> RelocateOutcome {
        let InstanceConfig::Reorder(reorder) = &self.config else {
            return RelocateOutcome::Skipped(SkipReason::NoAction);
        };
        let width = dom.viewport_width();
        let name = self.table.resolve(width);
        match reorder.action(name) {
            Some(action) => {
                trace!(breakpoint = name, width, "placing inserted element");
                apply_action(dom, Some(node), action)
            }
            None => RelocateOutcome::Skipped(SkipReason::NoAction),
        }
    }

    /// React to one batch of inserted nodes.
    pub fn on_inserted<D: DomHost + ?Sized>(
        &mut self,
        dom: &mut D,
        nodes: &[D::Node],
    ) -> Vec<Reaction> {
        let mut batch: Vec<(&D::Node, InsertionReaction)> = Vec::with_capacity(nodes.len());
        for node in nodes {
            if batch.iter().any(|(seen, _)| *seen == node) {
                continue;
            }
            let reaction = self.watcher.classify_insertion(&*dom, node);
            if reaction != InsertionReaction::Ignore {
                batch.push((node, reaction));
            }
        }

        let mut reactions: Vec<Reaction> = batch
            .iter()
            .filter(|(_, reaction)| reaction.relocates())
            .map(|(node, _)| Reaction::Placed(self.place_inserted(dom, node)))
            .collect();

        if batch.iter().any(|(_, reaction)| reaction.reevaluates()) {
            reactions.push(Reaction::Transition(self.reevaluate(dom)));
        }
        reactions
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
