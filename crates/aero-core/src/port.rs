#![forbid(unsafe_code)]

//! Host-fed observation queue.
//!
//! The engine never registers listeners itself. A host (the browser adapter,
//! a test, a headless driver) pushes what it observed and later hands the
//! port to [`InstanceManager::pump`](crate::InstanceManager::pump).
//!
//! Consecutive resize notifications coalesce: a resize pushed directly after
//! another pending resize replaces it.
//!
//! # Echoes
//!
//! Every node the engine moves is reported back by the host as an insertion.
//! The port remembers the nodes moved during the last pump as expected
//! echoes; the next insertion batch drops them and clears the record. An
//! echo therefore never reaches an instance, so nodes that share one target
//! cannot push each other around forever.

use std::collections::VecDeque;

/// One observation delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservationEvent<N> {
    /// The viewport width changed (or may have).
    Resized { width: u32 },
    /// Nodes were added to the document, in insertion order.
    NodesInserted(Vec<N>),
}

/// FIFO of pending observations.
#[derive(Debug, Clone)]
pub struct ObservationPort<N> {
    queue: VecDeque<ObservationEvent<N>>,
    echoes: Vec<N>,
}

impl<N: PartialEq> Default for ObservationPort<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: PartialEq> ObservationPort<N> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            echoes: Vec::new(),
        }
    }

    /// Queue an event, applying the same rules as the typed helpers.
    pub fn push(&mut self, event: ObservationEvent<N>) {
        match event {
            ObservationEvent::Resized { width } => self.push_resize(width),
            ObservationEvent::NodesInserted(nodes) => self.push_inserted(nodes),
        }
    }

    /// Queue a resize. Replaces a resize still pending at the back.
    pub fn push_resize(&mut self, width: u32) {
        if let Some(ObservationEvent::Resized { width: pending }) = self.queue.back_mut() {
            *pending = width;
            return;
        }
        self.queue.push_back(ObservationEvent::Resized { width });
    }

    /// Queue one insertion batch. Duplicates and expected echoes are
    /// dropped; an empty batch is not queued. Clears the expected echoes.
    pub fn push_inserted(&mut self, nodes: impl IntoIterator<Item = N>) {
        let echoes = std::mem::take(&mut self.echoes);
        let mut batch: Vec<N> = Vec::new();
        for node in nodes {
            if !echoes.contains(&node) && !batch.contains(&node) {
                batch.push(node);
            }
        }
        if !batch.is_empty() {
            self.queue.push_back(ObservationEvent::NodesInserted(batch));
        }
    }

    /// Expect the insertions the host will report for `moved`.
    pub fn expect_echoes(&mut self, moved: impl IntoIterator<Item = N>) {
        for node in moved {
            if !self.echoes.contains(&node) {
                self.echoes.push(node);
            }
        }
    }

    /// Nodes whose next reported insertion will be dropped.
    #[must_use]
    pub fn pending_echoes(&self) -> &[N] {
        &self.echoes
    }

    /// Drain all pending events, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = ObservationEvent<N>> + '_ {
        self.queue.drain(..)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn consecutive_resizes_coalesce() {
        let mut port = ObservationPort::<u32>::new();
        port.push_resize(800);
        port.push_resize(900);
        port.push_resize(1000);
        assert_eq!(port.len(), 1);
        assert_eq!(
            port.drain().collect::<Vec<_>>(),
            vec![ObservationEvent::Resized { width: 1000 }]
        );
        assert!(port.is_empty());
    }

    #[test]
    fn insertion_breaks_coalescing() {
        let mut port = ObservationPort::new();
        port.push_resize(800);
        port.push_inserted([7_u32]);
        port.push_resize(900);
        assert_eq!(
            port.drain().collect::<Vec<_>>(),
            vec![
                ObservationEvent::Resized { width: 800 },
                ObservationEvent::NodesInserted(vec![7]),
                ObservationEvent::Resized { width: 900 },
            ]
        );
    }

    #[test]
    fn insertion_batches_are_deduplicated() {
        let mut port = ObservationPort::new();
        port.push_inserted([1_u32, 2, 1, 3, 2]);
        port.push_inserted(Vec::<u32>::new());
        port.push(ObservationEvent::NodesInserted(vec![]));
        assert_eq!(
            port.drain().collect::<Vec<_>>(),
            vec![ObservationEvent::NodesInserted(vec![1, 2, 3])]
        );
    }

    #[test]
    fn echoes_are_dropped_from_the_next_batch_only() {
        let mut port = ObservationPort::new();
        port.expect_echoes([4_u32, 5, 4]);
        assert_eq!(port.pending_echoes(), &[4, 5]);

        port.push_inserted([4_u32, 6, 5]);
        assert!(port.pending_echoes().is_empty());
        port.push_inserted([4_u32]);
        assert_eq!(
            port.drain().collect::<Vec<_>>(),
            vec![
                ObservationEvent::NodesInserted(vec![6]),
                ObservationEvent::NodesInserted(vec![4]),
            ]
        );
    }

    #[test]
    fn batch_of_echoes_only_is_not_queued() {
        let mut port = ObservationPort::new();
        port.expect_echoes([1_u32, 2]);
        port.push_resize(700);
        port.push_inserted([2_u32, 1]);
        assert_eq!(
            port.drain().collect::<Vec<_>>(),
            vec![ObservationEvent::Resized { width: 700 }]
        );
    }
}
