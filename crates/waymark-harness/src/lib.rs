#![forbid(unsafe_code)]

//! Waymark test harness.
//!
//! Deterministic doubles for everything the runtime talks to:
//!
//! - [`ScriptedHost`] - geometry, scroll containers, deferred replies
//! - [`RecordingHooks`] / [`HookLog`] - hook call log and scripted confirmations
//! - [`Transcript`] - JSONL frame log with a blake3 checksum
//!
//! # Example
//!
//! ```ignore
//! let registry = fixtures::registry(&[("a", 1, None), ("b", 2, None)]);
//! let mut host = ScriptedHost::phone().with_target(1, rect).with_target(2, rect);
//! let (hooks, log) = RecordingHooks::new();
//! let mut tour = Tour::new(registry).with_hooks(hooks);
//! tour.start(&mut host, StartOptions::new())?;
//! assert_eq!(log.names(), ["on_start", "on_change"]);
//! ```

pub mod hooks;
pub mod host;
pub mod transcript;

pub use hooks::{HookCall, HookLog, RecordingHooks};
pub use host::{ScrollCall, ScriptedHost};
pub use transcript::{Transcript, compute_text_checksum};

/// Registry builders shared by scenario tests.
pub mod fixtures {
    use waymark_core::{
        Position, Registry, SharedRegistry, StepConfig, StepContent, TargetHandle,
    };

    /// Config with a title derived from the id.
    #[must_use]
    pub fn step(id: &str) -> StepConfig {
        StepConfig::new(StepContent::new(id, format!("about {id}")))
    }

    /// Register `(id, handle, order)` triples in the given order.
    #[must_use]
    pub fn registry(steps: &[(&str, u64, Option<i64>)]) -> SharedRegistry {
        let mut registry = Registry::new();
        for &(id, handle, order) in steps {
            let mut config = step(id);
            if let Some(order) = order {
                config = config.order(order);
            }
            registry.register(id, TargetHandle(handle), config);
        }
        registry.shared()
    }

    /// Like [`registry`] but every step requests `position`.
    #[must_use]
    pub fn registry_at(steps: &[(&str, u64)], position: Position) -> SharedRegistry {
        let mut registry = Registry::new();
        for &(id, handle) in steps {
            registry.register(id, TargetHandle(handle), step(id).position(position));
        }
        registry.shared()
    }
}
