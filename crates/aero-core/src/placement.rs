#![forbid(unsafe_code)]

//! Placement strategies and the relocation engine.
//!
//! [`relocate`] moves one element relative to the first node matching a
//! target selector. It checks every precondition before touching the tree,
//! so a relocation either performs exactly one insertion or none at all.
//!
//! # Invariants
//!
//! 1. `Prepend`: the element becomes the target's first child.
//! 2. `Append`: the element becomes the target's last child.
//! 3. `InsertBefore`: the element becomes the target's preceding sibling.
//! 4. `InsertAfter`: the element becomes the target's following sibling
//!    (the last child of the target's parent if the target was last).
//! 5. An element that already satisfies its placement is left untouched.
//!
//! # Failure Modes
//!
//! All failures are silent and reported as [`SkipReason`]s.

use core::fmt;
use core::str::FromStr;

use crate::dom::DomHost;

#[cfg(feature = "tracing")]
use crate::logging::{debug, trace};
#[cfg(not(feature = "tracing"))]
use crate::{debug, trace};

/// Where a moved element lands relative to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    Prepend,
    Append,
    InsertBefore,
    InsertAfter,
}

impl Placement {
    pub const ALL: [Self; 4] = [
        Self::Prepend,
        Self::Append,
        Self::InsertBefore,
        Self::InsertAfter,
    ];

    /// Method name used by the JS-facing config (`prependTo`, `appendTo`, ...).
    #[must_use]
    pub const fn method_name(self) -> &'static str {
        match self {
            Self::Prepend => "prependTo",
            Self::Append => "appendTo",
            Self::InsertBefore => "insertBefore",
            Self::InsertAfter => "insertAfter",
        }
    }

    /// Parse a config method name. Accepts the JS names and the short
    /// `prepend` / `append` forms.
    #[must_use]
    pub fn parse(method: &str) -> Option<Self> {
        match method {
            "prependTo" | "prepend" => Some(Self::Prepend),
            "appendTo" | "append" => Some(Self::Append),
            "insertBefore" => Some(Self::InsertBefore),
            "insertAfter" => Some(Self::InsertAfter),
            _ => None,
        }
    }

    /// Whether the element lands inside the target rather than beside it.
    #[must_use]
    pub const fn is_child(self) -> bool {
        matches!(self, Self::Prepend | Self::Append)
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}

impl FromStr for Placement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown placement method: {s}"))
    }
}

/// A `[target, method]` pair configured for one breakpoint.
///
/// The raw method name is kept so an unrecognized method stays a valid
/// configuration that relocates nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderAction {
    target: String,
    method: String,
    placement: Option<Placement>,
}

impl ReorderAction {
    #[must_use]
    pub fn new(target: impl Into<String>, placement: Placement) -> Self {
        Self {
            target: target.into(),
            method: placement.method_name().to_owned(),
            placement: Some(placement),
        }
    }

    /// Build from config strings; unknown methods are kept, not rejected.
    #[must_use]
    pub fn from_parts(target: impl Into<String>, method: impl Into<String>) -> Self {
        let method = method.into();
        Self {
            target: target.into(),
            placement: Placement::parse(&method),
            method,
        }
    }

    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// `None` when the configured method name was not recognized.
    #[must_use]
    pub const fn placement(&self) -> Option<Placement> {
        self.placement
    }
}

/// Result of one relocation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelocateOutcome {
    /// Exactly one insertion was performed.
    Moved,
    /// Nothing was mutated.
    Skipped(SkipReason),
}

impl RelocateOutcome {
    #[must_use]
    pub const fn is_moved(self) -> bool {
        matches!(self, Self::Moved)
    }
}

/// Why a relocation did not mutate the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The active breakpoint has no configured action.
    NoAction,
    /// The configured method name is not a known placement.
    UnknownMethod,
    /// No attached element matched the element selector.
    ElementMissing,
    /// No node matched the target selector.
    TargetMissing,
    /// Sibling placement against a target without a parent.
    TargetDetached,
    /// The element is the target or would end up inside itself.
    WouldCycle,
    /// The element already sits where the placement would put it.
    AlreadyPlaced,
    /// The host refused the insertion.
    HostRejected,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NoAction => "no_action",
            Self::UnknownMethod => "unknown_method",
            Self::ElementMissing => "element_missing",
            Self::TargetMissing => "target_missing",
            Self::TargetDetached => "target_detached",
            Self::WouldCycle => "would_cycle",
            Self::AlreadyPlaced => "already_placed",
            Self::HostRejected => "host_rejected",
        };
        f.write_str(label)
    }
}

/// Move `element` relative to the first match of `target_selector`.
#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
pub fn relocate<D: DomHost + ?Sized>(
    dom: &mut D,
    element: &D::Node,
    target_selector: &str,
    placement: Placement,
) -> RelocateOutcome {
    if !dom.is_attached(element) {
        return skip(SkipReason::ElementMissing);
    }
    let Some(target) = dom.find_one(target_selector) else {
        return skip(SkipReason::TargetMissing);
    };
    if target == *element {
        return skip(SkipReason::WouldCycle);
    }

    let (parent, reference, placed) = match placement {
        Placement::Prepend => {
            let first = dom.first_child(&target);
            let placed = first.as_ref() == Some(element);
            (target, first, placed)
        }
        Placement::Append => {
            let placed = dom.last_child(&target).as_ref() == Some(element);
            (target, None, placed)
        }
        Placement::InsertBefore => {
            let Some(parent) = dom.parent(&target) else {
                return skip(SkipReason::TargetDetached);
            };
            let placed = dom.next_sibling(element).as_ref() == Some(&target);
            (parent, Some(target), placed)
        }
        Placement::InsertAfter => {
            let Some(parent) = dom.parent(&target) else {
                return skip(SkipReason::TargetDetached);
            };
            let placed = dom.previous_sibling(element).as_ref() == Some(&target);
            (parent, dom.next_sibling(&target), placed)
        }
    };

    if dom.contains(element, &parent) {
        return skip(SkipReason::WouldCycle);
    }
    if placed {
        trace!(%placement, target = target_selector, "element already placed");
        return RelocateOutcome::Skipped(SkipReason::AlreadyPlaced);
    }

    match dom.insert_before(&parent, element, reference.as_ref()) {
        Ok(()) => {
            debug!(%placement, target = target_selector, "element relocated");
            RelocateOutcome::Moved
        }
        Err(err) => {
            debug!(?err, target = target_selector, "host rejected relocation");
            RelocateOutcome::Skipped(SkipReason::HostRejected)
        }
    }
}

/// Run a configured action against `element` (if any).
pub fn apply_action<D: DomHost + ?Sized>(
    dom: &mut D,
    element: Option<&D::Node>,
    action: &ReorderAction,
) -> RelocateOutcome {
    let Some(placement) = action.placement() else {
        return skip(SkipReason::UnknownMethod);
    };
    let Some(element) = element else {
        return skip(SkipReason::ElementMissing);
    };
    relocate(dom, element, action.target(), placement)
}

fn skip(reason: SkipReason) -> RelocateOutcome {
    debug!(%reason, "relocation skipped");
    RelocateOutcome::Skipped(reason)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryDom, NodeId};

    /// body > [#top > [.content], main > [.region > [a, b]], .mover]
    struct Page {
        dom: MemoryDom,
        content: NodeId,
        region: NodeId,
        a: NodeId,
        b: NodeId,
        mover: NodeId,
    }

    fn page() -> Page {
        let mut dom = MemoryDom::new(1024);
        let body = dom.body();
        let top = dom.append_new(body, "section#top");
        let content = dom.append_new(top, "div.content");
        let main = dom.append_new(body, "main");
        let region = dom.append_new(main, "div.region");
        let a = dom.append_new(region, "p.a");
        let b = dom.append_new(region, "p.b");
        let mover = dom.append_new(body, "div.mover");
        dom.take_inserted();
        Page {
            dom,
            content,
            region,
            a,
            b,
            mover,
        }
    }

    #[test]
    fn prepend_makes_first_child() {
        let mut p = page();
        let out = relocate(&mut p.dom, &p.mover, ".region", Placement::Prepend);
        assert_eq!(out, RelocateOutcome::Moved);
        assert_eq!(p.dom.children(p.region), &[p.mover, p.a, p.b]);
    }

    #[test]
    fn append_makes_last_child() {
        let mut p = page();
        let out = relocate(&mut p.dom, &p.mover, ".region", Placement::Append);
        assert_eq!(out, RelocateOutcome::Moved);
        assert_eq!(p.dom.children(p.region), &[p.a, p.b, p.mover]);
    }

    #[test]
    fn insert_before_makes_preceding_sibling() {
        let mut p = page();
        let out = relocate(&mut p.dom, &p.mover, ".b", Placement::InsertBefore);
        assert_eq!(out, RelocateOutcome::Moved);
        assert_eq!(p.dom.children(p.region), &[p.a, p.mover, p.b]);
    }

    #[test]
    fn insert_after_makes_following_sibling() {
        let mut p = page();
        let out = relocate(&mut p.dom, &p.mover, ".a", Placement::InsertAfter);
        assert_eq!(out, RelocateOutcome::Moved);
        assert_eq!(p.dom.children(p.region), &[p.a, p.mover, p.b]);
    }

    #[test]
    fn insert_after_last_child_appends_to_parent() {
        let mut p = page();
        let top = p.dom.parent_of(p.content).unwrap();
        let out = relocate(&mut p.dom, &p.mover, "#top > .content", Placement::InsertAfter);
        assert_eq!(out, RelocateOutcome::Moved);
        assert_eq!(p.dom.children(top), &[p.content, p.mover]);
    }

    #[test]
    fn move_detaches_from_previous_parent() {
        let mut p = page();
        let body = p.dom.body();
        relocate(&mut p.dom, &p.mover, ".region", Placement::Append);
        assert!(!p.dom.children(body).contains(&p.mover));
        assert_eq!(p.dom.parent_of(p.mover), Some(p.region));
    }

    #[test]
    fn missing_target_is_a_noop() {
        let mut p = page();
        let before = p.dom.clone();
        let out = relocate(&mut p.dom, &p.mover, "#nowhere", Placement::Append);
        assert_eq!(out, RelocateOutcome::Skipped(SkipReason::TargetMissing));
        assert_eq!(p.dom, before);
    }

    #[test]
    fn detached_element_is_a_noop() {
        let mut p = page();
        let loose = p.dom.create_element("div");
        let out = relocate(&mut p.dom, &loose, ".region", Placement::Append);
        assert_eq!(out, RelocateOutcome::Skipped(SkipReason::ElementMissing));
        assert!(p.dom.moves().is_empty());
    }

    #[test]
    fn sibling_placement_needs_a_parent() {
        let mut p = page();
        let out = relocate(&mut p.dom, &p.mover, "html", Placement::InsertBefore);
        assert_eq!(out, RelocateOutcome::Skipped(SkipReason::TargetDetached));
    }

    #[test]
    fn refuses_to_nest_element_inside_itself() {
        let mut p = page();
        let main = p.dom.parent_of(p.region).unwrap();
        let out = relocate(&mut p.dom, &main, ".region", Placement::Append);
        assert_eq!(out, RelocateOutcome::Skipped(SkipReason::WouldCycle));
        let out = relocate(&mut p.dom, &p.region, ".region", Placement::Append);
        assert_eq!(out, RelocateOutcome::Skipped(SkipReason::WouldCycle));
    }

    #[test]
    fn second_identical_move_is_already_placed() {
        let mut p = page();
        for placement in Placement::ALL {
            let target = if placement.is_child() { ".region" } else { ".a" };
            assert_eq!(
                relocate(&mut p.dom, &p.mover, target, placement),
                RelocateOutcome::Moved,
                "{placement}"
            );
            assert_eq!(
                relocate(&mut p.dom, &p.mover, target, placement),
                RelocateOutcome::Skipped(SkipReason::AlreadyPlaced),
                "{placement}"
            );
        }
        assert_eq!(p.dom.moves().len(), Placement::ALL.len());
    }

    #[test]
    fn unknown_method_is_kept_and_skipped() {
        let mut p = page();
        let action = ReorderAction::from_parts(".region", "teleport");
        assert_eq!(action.placement(), None);
        assert_eq!(action.method(), "teleport");
        let out = apply_action(&mut p.dom, Some(&p.mover), &action);
        assert_eq!(out, RelocateOutcome::Skipped(SkipReason::UnknownMethod));
        assert!(p.dom.moves().is_empty());
    }

    #[test]
    fn parses_js_and_short_method_names() {
        for placement in Placement::ALL {
            assert_eq!(Placement::parse(placement.method_name()), Some(placement));
        }
        assert_eq!(Placement::parse("prepend"), Some(Placement::Prepend));
        assert_eq!(Placement::parse("append"), Some(Placement::Append));
        assert_eq!(Placement::parse("appendto"), None);
        assert!("sideways".parse::<Placement>().is_err());
    }
}
