//! Structured log capture for the `tracing` feature.
//!
//! Run with: `cargo test -p aero-core --features tracing --test tracing_events`

#![cfg(feature = "tracing")]

use std::sync::{Arc, Mutex};

use aero_core::{
    Breakpoint, BreakpointTable, InstanceConfig, InstanceManager, MemoryDom, ObservationEvent,
    Placement, ReorderConfig,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    message: String,
}

#[derive(Default, Clone)]
struct Capture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
    spans: Arc<Mutex<Vec<String>>>,
}

struct MessageVisitor(String);

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S> tracing_subscriber::Layer<S> for Capture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        self.spans
            .lock()
            .unwrap()
            .push(attrs.metadata().name().to_string());
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.0,
        });
    }
}

fn with_captured_tracing<F: FnOnce()>(f: F) -> Capture {
    let capture = Capture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    tracing::subscriber::with_default(subscriber, f);
    capture
}

fn messages(capture: &Capture, level: tracing::Level) -> Vec<String> {
    capture
        .events
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.level == level)
        .map(|e| e.message.clone())
        .collect()
}

#[test]
fn transition_and_relocation_are_logged() {
    let capture = with_captured_tracing(|| {
        let mut dom = MemoryDom::new(1100);
        let body = dom.body();
        dom.append_new(body, "aside.dock");
        dom.append_new(body, "div.card");
        let config = ReorderConfig::new(".card").at(Breakpoint::Lg, ".dock", Placement::Append);
        let mut manager = InstanceManager::new();
        manager.create(config.into(), &mut dom);
        manager.handle(&ObservationEvent::Resized { width: 1100 }, &mut dom);
    });

    let debug = messages(&capture, tracing::Level::DEBUG);
    assert!(debug.iter().any(|m| m == "breakpoint transition"), "{debug:?}");
    assert!(debug.iter().any(|m| m == "element relocated"), "{debug:?}");
    assert!(debug.iter().any(|m| m == "instance created"), "{debug:?}");
    assert!(capture.spans.lock().unwrap().iter().any(|s| s == "handle"));
}

#[test]
fn repeated_threshold_warns() {
    let capture = with_captured_tracing(|| {
        let _ = BreakpointTable::new([("a", 500), ("b", 500), ("z", 0)]);
    });
    assert_eq!(messages(&capture, tracing::Level::WARN).len(), 1);
}

#[test]
fn skipped_relocation_is_logged() {
    let capture = with_captured_tracing(|| {
        let mut dom = MemoryDom::new(1100);
        let mut manager = InstanceManager::new();
        let config = ReorderConfig::new(".ghost").at(Breakpoint::Lg, ".dock", Placement::Append);
        manager.create(InstanceConfig::from(config), &mut dom);
    });
    let debug = messages(&capture, tracing::Level::DEBUG);
    assert!(debug.iter().any(|m| m == "relocation skipped"), "{debug:?}");
}
