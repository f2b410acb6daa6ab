#![forbid(unsafe_code)]

//! Platform-independent context core shared by the wasm exports and native
//! tests.
//!
//! [`ContextCore`] owns the instance manager and the observation port for one
//! document. The wasm layer feeds it browser notifications and JS arguments;
//! tests feed it a [`MemoryDom`](aero_core::MemoryDom). No JS types here.
//!
//! Every call that can move nodes leaves them in the port as expected
//! echoes, so the observer's report of those moves is not handled again.

use aero_core::{
    DomHost, InstanceId, InstanceManager, InstanceReport, MoveRecorder, ObservationPort,
};

use crate::bridge::{BridgeError, config_from_json, table_from_json};

/// One document's reflow state.
#[derive(Debug)]
pub struct ContextCore<N> {
    manager: InstanceManager,
    port: ObservationPort<N>,
}

impl<N: Clone + PartialEq + core::fmt::Debug> Default for ContextCore<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Clone + PartialEq + core::fmt::Debug> ContextCore<N> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            manager: InstanceManager::new(),
            port: ObservationPort::new(),
        }
    }

    /// Parse `config` and create an instance. Returns the new instance id.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Config`] for an invalid config; nothing is created.
    pub fn create<D>(&mut self, config: Option<&str>, dom: &mut D) -> Result<u32, BridgeError>
    where
        D: DomHost<Node = N> + ?Sized,
    {
        let config = config_from_json(config)?;
        if u32::try_from(self.manager.len()).is_err() {
            return Err(BridgeError::InstanceLimit);
        }
        let id = self.recording(dom, |manager, dom| manager.create(config, dom));
        u32::try_from(id.get()).map_err(|_| BridgeError::InstanceLimit)
    }

    /// Replace one instance's table. Returns the breakpoint active afterwards.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Table`] for an invalid table,
    /// [`BridgeError::UnknownInstance`] for an unknown id.
    pub fn update_breakpoints<D>(
        &mut self,
        id: u32,
        table: &str,
        dom: &mut D,
    ) -> Result<String, BridgeError>
    where
        D: DomHost<Node = N> + ?Sized,
    {
        let table = table_from_json(table)?;
        let instance = lookup(id).ok_or(BridgeError::UnknownInstance(id))?;
        self.recording(dom, |manager, dom| {
            manager.update_breakpoints(instance, table, dom)
        })
        .map(|transition| transition.next)
        .ok_or(BridgeError::UnknownInstance(id))
    }

    /// Replace every instance's table.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Table`] for an invalid table; no instance is touched.
    pub fn update_all_breakpoints<D>(
        &mut self,
        table: &str,
        dom: &mut D,
    ) -> Result<Vec<InstanceReport>, BridgeError>
    where
        D: DomHost<Node = N> + ?Sized,
    {
        let table = table_from_json(table)?;
        Ok(self.recording(dom, |manager, dom| {
            manager.broadcast_breakpoint_table(&table, dom)
        }))
    }

    #[must_use]
    pub fn active_breakpoint(&self, id: u32) -> Option<String> {
        lookup(id)
            .and_then(|instance| self.manager.instance(instance))
            .and_then(|instance| instance.active_breakpoint())
            .map(str::to_owned)
    }

    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.manager.len()
    }

    /// Record a resize notification.
    pub fn push_resize(&mut self, width: u32) {
        self.port.push_resize(width);
    }

    /// Record one batch of inserted elements.
    pub fn push_inserted(&mut self, nodes: impl IntoIterator<Item = N>) {
        self.port.push_inserted(nodes);
    }

    /// Number of notifications waiting for [`Self::pump`].
    #[must_use]
    pub fn pending(&self) -> usize {
        self.port.len()
    }

    /// Nodes whose next reported insertion will be ignored.
    #[must_use]
    pub fn pending_echoes(&self) -> &[N] {
        self.port.pending_echoes()
    }

    /// Handle every pending notification.
    pub fn pump<D>(&mut self, dom: &mut D) -> Vec<InstanceReport>
    where
        D: DomHost<Node = N> + ?Sized,
    {
        self.manager.pump(&mut self.port, dom)
    }

    fn recording<'d, D, R>(
        &mut self,
        dom: &'d mut D,
        run: impl FnOnce(&mut InstanceManager, &mut MoveRecorder<'d, D>) -> R,
    ) -> R
    where
        D: DomHost<Node = N> + ?Sized,
    {
        let mut recorder = MoveRecorder::new(dom);
        let out = run(&mut self.manager, &mut recorder);
        self.port.expect_echoes(recorder.into_moved());
        out
    }
}

fn lookup(id: u32) -> Option<InstanceId> {
    usize::try_from(id).ok().map(InstanceId::new)
}
