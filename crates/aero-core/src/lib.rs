#![forbid(unsafe_code)]

//! Core: breakpoint resolution and element relocation for responsive reflow.
//!
//! # Role in Aero
//! `aero-core` is the platform-independent engine. It maps a viewport width
//! to a named breakpoint, detects breakpoint transitions per instance, and
//! moves elements between containers (or swaps a body class) when a
//! transition happens. It never talks to a browser directly: every read and
//! write goes through the [`DomLocator`] / [`DomHost`] capability traits.
//!
//! # Primary responsibilities
//! - **BreakpointTable**: ordered width thresholds, resolved widest first.
//! - **Placement**: the four positional relocation strategies.
//! - **Instance**: one configured reflow unit (class-mode or reorder-mode)
//!   with its own transition gate.
//! - **InstanceManager**: owns every instance, dispatches observation events
//!   and rebroadcasts breakpoint tables.
//! - **ObservationPort**: host-fed queue of resize and insertion events.
//! - **MemoryDom**: an in-memory document for tests and headless hosts.
//!
//! # How it fits in the system
//! `aero-web` implements the capability traits over `web-sys`, forwards
//! `resize` and `MutationObserver` notifications into an
//! [`ObservationPort`], and pumps them through an [`InstanceManager`].

pub mod breakpoint;
pub mod controller;
pub mod dom;
pub mod error;
pub mod instance;
pub mod logging;
pub mod manager;
pub mod memory;
pub mod placement;
pub mod port;
mod selector;
pub mod tracker;
pub mod watcher;

pub use breakpoint::{Breakpoint, BreakpointEntry, BreakpointTable, hyphenate, resolve};
pub use controller::{Effect, Transition};
pub use dom::{DomHost, DomLocator, MoveRecorder};
pub use error::{ConfigError, TableError};
pub use instance::{ClassConfig, Instance, InstanceConfig, ReorderConfig};
pub use manager::{InstanceId, InstanceManager, InstanceReport, Reaction};
pub use memory::{MemoryDom, MoveRecord, NodeId};
pub use placement::{Placement, RelocateOutcome, ReorderAction, SkipReason, relocate};
pub use port::{ObservationEvent, ObservationPort};
pub use tracker::{BreakpointChange, TransitionTracker};
pub use watcher::{DynamicElementWatcher, InsertionReaction, watched_class};
