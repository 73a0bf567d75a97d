#![forbid(unsafe_code)]

//! Waymark Runtime
//!
//! The state machines behind guided tours and hints, written sans-IO: they
//! never touch a UI toolkit directly. A [`Host`] measures targets and
//! performs scrolls; hooks observe and gate transitions; the renderer reads
//! plain [`Snapshot`] values.
//!
//! # Key Components
//!
//! - [`Tour`] - Step sequencer: start, next, previous, go_to, exit, refresh
//! - [`ScrollCoordinator`] - Brings targets into view and bounds the wait
//! - [`HintSession`] - Shown/open state for persistent hint indicators
//! - [`Host`] - What the embedding UI must provide
//! - [`TourHooks`] - Lifecycle callbacks, including vetoable `before_*` hooks
//! - [`WaymarkConfig`] - Options and hint defaults loadable from TOML/JSON
//!
//! # Role in Waymark
//! `waymark-runtime` is the orchestrator. It reads steps from the shared
//! `waymark-core` registry, drives the host through measurement and
//! scrolling, and hands final rectangles to `waymark-layout` for placement.
//!
//! # Asynchrony
//! Host operations return [`std::task::Poll`]. `Ready` continues the
//! transition in the same call; `Pending` suspends it until the host calls
//! back with the [`Ticket`] it was given. Time only advances through `tick`,
//! so tests drive timeouts deterministically.

pub mod config;
pub mod hints;
pub mod hooks;
pub mod host;
pub mod input;
pub mod scroll;
pub mod snapshot;
pub mod ticket;
pub mod tour;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, WaymarkConfig};
pub use hints::HintSession;
pub use hooks::{Confirm, ExitReason, NoHooks, StepChange, TourHooks};
pub use host::{Host, ScrollContainerId};
pub use input::TourInput;
pub use scroll::{RevealRequest, ScrollCoordinator, Visibility};
pub use snapshot::{HintSnapshot, HintView, Snapshot, TourSnapshot};
pub use ticket::{Origin, Ticket};
pub use tour::{Outcome, StartOptions, Tour, TourState};

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::registry::LookupSpan;

    use super::*;
    use crate::testing::FakeHost;
    use waymark_core::{Rect, Registry, StepConfig, StepContent, TargetHandle};

    #[derive(Debug, Clone)]
    struct CapturedSpan {
        name: String,
        fields: HashMap<String, String>,
    }

    #[derive(Debug, Clone)]
    struct CapturedEvent {
        level: tracing::Level,
        target: String,
        fields: HashMap<String, String>,
    }

    #[derive(Default)]
    struct Captured {
        spans: Vec<CapturedSpan>,
        events: Vec<CapturedEvent>,
    }

    struct SpanCapture(Arc<Mutex<Captured>>);

    struct FieldVisitor(Vec<(String, String)>);

    impl tracing::field::Visit for FieldVisitor {
        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            self.0.push((field.name().to_string(), format!("{value:?}")));
        }
        fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
            self.0.push((field.name().to_string(), value.to_string()));
        }
        fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
            self.0.push((field.name().to_string(), value.to_string()));
        }
    }

    impl<S> tracing_subscriber::Layer<S> for SpanCapture
    where
        S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    {
        fn on_new_span(
            &self,
            attrs: &tracing::span::Attributes<'_>,
            _id: &tracing::span::Id,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            let mut visitor = FieldVisitor(Vec::new());
            attrs.record(&mut visitor);
            self.0.lock().unwrap().spans.push(CapturedSpan {
                name: attrs.metadata().name().to_string(),
                fields: visitor.0.into_iter().collect(),
            });
        }

        fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
            let mut visitor = FieldVisitor(Vec::new());
            event.record(&mut visitor);
            self.0.lock().unwrap().events.push(CapturedEvent {
                level: *event.metadata().level(),
                target: event.metadata().target().to_string(),
                fields: visitor.0.into_iter().collect(),
            });
        }
    }

    fn with_captured_tracing(f: impl FnOnce()) -> Captured {
        let captured = Arc::new(Mutex::new(Captured::default()));
        let subscriber = tracing_subscriber::registry().with(SpanCapture(Arc::clone(&captured)));
        tracing::subscriber::with_default(subscriber, f);
        std::mem::take(&mut *captured.lock().unwrap())
    }

    #[test]
    fn skipped_step_emits_warning_and_transition_spans() {
        let captured = with_captured_tracing(|| {
            let mut registry = Registry::new();
            registry.register("gone", TargetHandle(1), StepConfig::new(StepContent::default()));
            registry.register("here", TargetHandle(2), StepConfig::new(StepContent::default()));
            let mut host = FakeHost::new(Rect::from_size(375.0, 800.0))
                .with_rect(2, Rect::new(0.0, 100.0, 50.0, 20.0));
            let mut tour = Tour::new(registry.shared());
            assert_eq!(
                tour.start(&mut host, StartOptions::new()),
                Ok(Outcome::Committed { index: 0 })
            );
        });

        let warning = captured
            .events
            .iter()
            .find(|e| e.level == tracing::Level::WARN && e.target == "waymark.tour")
            .expect("expected skip warning");
        assert!(warning.fields["error"].contains("gone"), "{warning:?}");

        let steps: Vec<&str> = captured
            .spans
            .iter()
            .filter(|s| s.name == "tour.transition")
            .map(|s| s.fields["step"].as_str())
            .collect();
        assert!(steps.contains(&"gone") && steps.contains(&"here"), "{steps:?}");
    }

    #[test]
    fn scroll_timeout_is_logged_on_scroll_target() {
        let captured = with_captured_tracing(|| {
            let mut registry = Registry::new();
            registry.register("far", TargetHandle(1), StepConfig::new(StepContent::default()));
            let mut host = FakeHost::new(Rect::from_size(375.0, 800.0))
                .with_rect(1, Rect::new(0.0, 1500.0, 50.0, 20.0));
            host.container = Some(waymark_core::Size::new(375.0, 3000.0));
            host.pending_scroll = true;
            let mut tour = Tour::new(registry.shared());
            assert_eq!(tour.start(&mut host, StartOptions::new()), Ok(Outcome::Pending));
            tour.tick(&mut host, web_time::Duration::from_secs(1));
        });

        assert!(
            captured
                .events
                .iter()
                .any(|e| e.level == tracing::Level::WARN && e.target == "waymark.scroll"),
            "expected scroll timeout warning"
        );
    }
}
