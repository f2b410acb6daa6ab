#![forbid(unsafe_code)]

//! Instance manager: owns every instance and dispatches observations.
//!
//! Instances are kept in construction order and every dispatch walks them in
//! that order. There is no global registry; a host creates one manager per
//! document.
//!
//! # Invariants
//!
//! 1. [`InstanceId`]s are never reused within one manager. An id is the
//!    instance's position in construction order.
//! 2. Each instance keeps its own table and transition gate; broadcasting a
//!    table replaces every instance's table but no instance reads another's
//!    state.
//!
//! # Failure Modes
//!
//! None at runtime. Construction errors surface earlier, when the config or
//! table is parsed.

use crate::breakpoint::BreakpointTable;
use crate::controller::Transition;
use crate::dom::{DomHost, MoveRecorder};
use crate::instance::{Instance, InstanceConfig};
use crate::placement::RelocateOutcome;
use crate::port::{ObservationEvent, ObservationPort};

#[cfg(feature = "tracing")]
use crate::logging::{debug, debug_span};
#[cfg(not(feature = "tracing"))]
use crate::{debug, debug_span};

/// Handle returned by [`InstanceManager::create`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(usize);

impl InstanceId {
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

/// What one instance did in response to one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    /// The transition function ran.
    Transition(Transition),
    /// An inserted node went through the relocation engine.
    Placed(RelocateOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceReport {
    pub instance: InstanceId,
    pub reaction: Reaction,
}

/// Every instance of one document, in construction order.
#[derive(Debug, Clone, Default)]
pub struct InstanceManager {
    instances: Vec<Instance>,
}

impl InstanceManager {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            instances: Vec::new(),
        }
    }

    /// Create an instance with the default breakpoint table and run its
    /// initial evaluation at the current viewport width.
    pub fn create<D: DomHost + ?Sized>(
        &mut self,
        config: InstanceConfig,
        dom: &mut D,
    ) -> InstanceId {
        self.create_with_table(config, BreakpointTable::default(), dom)
    }

    /// Same as [`Self::create`] with an explicit table.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    pub fn create_with_table<D: DomHost + ?Sized>(
        &mut self,
        config: InstanceConfig,
        table: BreakpointTable,
        dom: &mut D,
    ) -> InstanceId {
        let id = InstanceId(self.instances.len());
        let mut instance = Instance::new(config, table);
        let initial = instance.reevaluate(dom);
        debug!(
            instance = id.get(),
            reorder = instance.config().is_reorder(),
            breakpoint = %initial.next,
            "instance created"
        );
        self.instances.push(instance);
        id
    }

    /// Replace one instance's table and re-run its transition function.
    /// Returns `None` for an unknown id.
    pub fn update_breakpoints<D: DomHost + ?Sized>(
        &mut self,
        id: InstanceId,
        table: BreakpointTable,
        dom: &mut D,
    ) -> Option<Transition> {
        let instance = self.instances.get_mut(id.0)?;
        Some(instance.update_breakpoints(table, dom))
    }

    /// Give every instance a copy of `table`, in construction order.
    pub fn broadcast_breakpoint_table<D: DomHost + ?Sized>(
        &mut self,
        table: &BreakpointTable,
        dom: &mut D,
    ) -> Vec<InstanceReport> {
        let _span = debug_span!("broadcast_breakpoint_table", instances = self.instances.len())
            .entered();
        self.instances
            .iter_mut()
            .enumerate()
            .map(|(index, instance)| InstanceReport {
                instance: InstanceId(index),
                reaction: Reaction::Transition(instance.update_breakpoints(table.clone(), dom)),
            })
            .collect()
    }

    /// Dispatch one observation to every instance.
    pub fn handle<D: DomHost + ?Sized>(
        &mut self,
        event: &ObservationEvent<D::Node>,
        dom: &mut D,
    ) -> Vec<InstanceReport> {
        let _span = debug_span!("handle", instances = self.instances.len()).entered();
        let mut reports = Vec::new();
        for (index, instance) in self.instances.iter_mut().enumerate() {
            let id = InstanceId(index);
            match event {
                ObservationEvent::Resized { width } => reports.push(InstanceReport {
                    instance: id,
                    reaction: Reaction::Transition(instance.on_resize(dom, *width)),
                }),
                ObservationEvent::NodesInserted(nodes) => reports.extend(
                    instance
                        .on_inserted(dom, nodes)
                        .into_iter()
                        .map(|reaction| InstanceReport {
                            instance: id,
                            reaction,
                        }),
                ),
            }
        }
        reports
    }

    /// Drain `port` and handle every event in order.
    ///
    /// Nodes moved while handling are left in `port` as expected echoes, so
    /// the insertions the host reports for them are dropped.
    pub fn pump<D: DomHost + ?Sized>(
        &mut self,
        port: &mut ObservationPort<D::Node>,
        dom: &mut D,
    ) -> Vec<InstanceReport> {
        let mut recorder = MoveRecorder::new(dom);
        let mut reports = Vec::new();
        for event in port.drain() {
            reports.extend(self.handle(&event, &mut recorder));
        }
        let moved = recorder.into_moved();
        debug!(reports = reports.len(), moved = moved.len(), "pump finished");
        port.expect_echoes(moved);
        reports
    }

    #[must_use]
    pub fn instance(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.get(id.0)
    }

    pub fn instances(&self) -> impl Iterator<Item = (InstanceId, &Instance)> {
        self.instances
            .iter()
            .enumerate()
            .map(|(index, instance)| (InstanceId(index), instance))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
