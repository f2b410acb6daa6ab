#![forbid(unsafe_code)]

//! Transition gate: remembers the last breakpoint an instance entered.

/// A breakpoint change accepted by the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointChange {
    /// Breakpoint active before the change (`None` on first resolution).
    pub previous: Option<String>,
    pub next: String,
}

/// Per-instance record of the active breakpoint.
///
/// Starts with no active breakpoint. [`Self::enter`] reports a change only
/// when the resolved name differs from the stored one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionTracker {
    active: Option<String>,
}

impl TransitionTracker {
    #[must_use]
    pub const fn new() -> Self {
        Self { active: None }
    }

    #[must_use]
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Whether `name` is already the active breakpoint.
    #[must_use]
    pub fn is_active(&self, name: &str) -> bool {
        self.active.as_deref() == Some(name)
    }

    /// Enter `next`. Returns `None` when it is already active.
    pub fn enter(&mut self, next: &str) -> Option<BreakpointChange> {
        if self.is_active(next) {
            return None;
        }
        let previous = self.active.replace(next.to_owned());
        Some(BreakpointChange {
            previous,
            next: next.to_owned(),
        })
    }
}
