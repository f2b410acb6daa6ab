#![forbid(unsafe_code)]

//! Resize controller: the per-instance transition function.
//!
//! On every resize notification the instance resolves the width against its
//! table and passes the result through its [`TransitionTracker`]. Only an
//! accepted change produces a side effect:
//!
//! - reorder-mode: relocate the element using the action configured for the
//!   new breakpoint (if any);
//! - class-mode: swap the hyphen-cased body class of the old breakpoint for
//!   the new one.
//!
//! The new breakpoint is entered even when the relocation is skipped.
//!
//! [`TransitionTracker`]: crate::TransitionTracker

use crate::breakpoint::{BreakpointTable, hyphenate};
use crate::dom::DomHost;
use crate::instance::{Instance, InstanceConfig};
use crate::placement::{RelocateOutcome, SkipReason, apply_action};
use crate::tracker::BreakpointChange;

#[cfg(feature = "tracing")]
use crate::logging::{debug, trace};
#[cfg(not(feature = "tracing"))]
use crate::{debug, trace};

/// Side effect of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// The resolved breakpoint was already active.
    Gated,
    /// Reorder-mode change and the outcome of its relocation.
    Relocation(RelocateOutcome),
    /// Class-mode change.
    BodyClass {
        removed: Option<String>,
        added: String,
    },
}

/// Report of one evaluation of the transition function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Active breakpoint before the evaluation.
    pub previous: Option<String>,
    /// Breakpoint resolved for the evaluated width.
    pub next: String,
    pub effect: Effect,
}

impl Transition {
    /// Whether the gate let this evaluation through.
    #[must_use]
    pub fn is_change(&self) -> bool {
        self.effect != Effect::Gated
    }

    /// Whether this evaluation moved an element.
    #[must_use]
    pub fn moved(&self) -> bool {
        matches!(self.effect, Effect::Relocation(outcome) if outcome.is_moved())
    }
}

impl Instance {
    /// Evaluate the transition function at `width`.
    pub fn on_resize<D: DomHost + ?Sized>(&mut self, dom: &mut D, width: u32) -> Transition {
        let next = self.table.resolve(width).to_owned();
        let Some(change) = self.tracker.enter(&next) else {
            trace!(breakpoint = %next, width, "breakpoint unchanged");
            return Transition {
                previous: Some(next.clone()),
                next,
                effect: Effect::Gated,
            };
        };

        let effect = match &self.config {
            InstanceConfig::Reorder(reorder) => {
                let outcome = match reorder.action(&change.next) {
                    Some(action) => {
                        let element = dom.find_one(reorder.element());
                        apply_action(dom, element.as_ref(), action)
                    }
                    None => RelocateOutcome::Skipped(SkipReason::NoAction),
                };
                Effect::Relocation(outcome)
            }
            InstanceConfig::Class(_) => swap_body_class(dom, &change),
        };

        debug!(
            previous = ?change.previous,
            next = %change.next,
            width,
            ?effect,
            "breakpoint transition"
        );
        Transition {
            previous: change.previous,
            next: change.next,
            effect,
        }
    }

    /// Evaluate at the host's current viewport width.
    pub fn reevaluate<D: DomHost + ?Sized>(&mut self, dom: &mut D) -> Transition {
        let width = dom.viewport_width();
        self.on_resize(dom, width)
    }

    /// Replace the whole breakpoint table, then re-run the transition
    /// function at the current viewport width.
    pub fn update_breakpoints<D: DomHost + ?Sized>(
        &mut self,
        table: BreakpointTable,
        dom: &mut D,
    ) -> Transition {
        self.table = table;
        self.reevaluate(dom)
    }
}

fn swap_body_class<D: DomHost + ?Sized>(dom: &mut D, change: &BreakpointChange) -> Effect {
    let removed = change.previous.as_deref().map(hyphenate);
    if let Some(class) = &removed {
        dom.remove_body_class(class);
    }
    let added = hyphenate(&change.next);
    dom.add_body_class(&added);
    Effect::BodyClass { removed, added }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
