#![forbid(unsafe_code)]

//! Target registry: stable ids to live handles and per-target configuration.
//!
//! Registration components call [`Registry::register`] on mount and
//! [`Registry::unregister`] on unmount. The tour sequencer and the hint
//! session read from the same registry through a [`SharedRegistry`].
//!
//! # Invariants
//!
//! 1. Each id maps to at most one step and at most one hint at any time.
//! 2. Registration is idempotent per id: the last write wins, but the
//!    original registration sequence number is kept so ordering stays stable.
//! 3. [`list`](Registry::list) is sorted by `(order, seq)` and is therefore
//!    deterministic for identical step registration histories. Steps and
//!    hints number their registrations independently.
//! 4. Every mutation bumps [`revision`](Registry::revision).
//!
//! # Example
//!
//! ```
//! use waymark_core::registry::Registry;
//! use waymark_core::step::{StepConfig, StepContent};
//! use waymark_core::TargetHandle;
//!
//! let mut reg = Registry::new();
//! reg.register("a", TargetHandle(1), StepConfig::new(StepContent::new("A", "")).order(0));
//! reg.register("b", TargetHandle(2), StepConfig::new(StepContent::new("B", "")).order(2));
//! reg.register("c", TargetHandle(3), StepConfig::new(StepContent::new("C", "")).order(1));
//!
//! let ids: Vec<_> = reg.list(None).into_iter().map(|s| s.id.to_string()).collect();
//! assert_eq!(ids, ["a", "c", "b"]);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::error::TourError;
use crate::hint::{HintConfig, HintSpot};
use crate::id::{TargetHandle, TargetId};
use crate::step::{Step, StepConfig};

/// Registry shared between registration components, the tour, and hints.
///
/// Single-threaded by design; borrows must not be held across host calls.
pub type SharedRegistry = Rc<RefCell<Registry>>;

#[derive(Debug, Clone)]
struct StepEntry {
    handle: TargetHandle,
    step: Step,
}

#[derive(Debug, Clone)]
struct HintEntry {
    handle: TargetHandle,
    spot: HintSpot,
}

/// Maps target ids to handles and step/hint configuration.
#[derive(Debug, Default)]
pub struct Registry {
    steps: FxHashMap<TargetId, StepEntry>,
    hints: FxHashMap<TargetId, HintEntry>,
    next_step_seq: u64,
    next_hint_seq: u64,
    revision: u64,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap the registry for sharing.
    #[must_use]
    pub fn shared(self) -> SharedRegistry {
        Rc::new(RefCell::new(self))
    }

    /// Register (or re-register) a tour step.
    pub fn register(&mut self, id: impl Into<TargetId>, handle: TargetHandle, config: StepConfig) {
        let id = id.into();
        let seq = match self.steps.get(&id) {
            Some(existing) => existing.step.seq,
            None => bump(&mut self.next_step_seq),
        };
        let step = Step {
            id: id.clone(),
            config,
            seq,
        };
        self.steps.insert(id, StepEntry { handle, step });
        self.revision += 1;
    }

    /// Remove a tour step. Returns `true` if it was registered.
    pub fn unregister(&mut self, id: &TargetId) -> bool {
        let removed = self.steps.remove(id).is_some();
        if removed {
            self.revision += 1;
        }
        removed
    }

    /// Register (or re-register) a hint spot.
    pub fn register_hint(
        &mut self,
        id: impl Into<TargetId>,
        handle: TargetHandle,
        config: HintConfig,
    ) {
        let id = id.into();
        let seq = match self.hints.get(&id) {
            Some(existing) => existing.spot.seq,
            None => bump(&mut self.next_hint_seq),
        };
        let spot = HintSpot {
            id: id.clone(),
            config,
            seq,
        };
        self.hints.insert(id, HintEntry { handle, spot });
        self.revision += 1;
    }

    /// Remove a hint spot. Returns `true` if it was registered.
    pub fn unregister_hint(&mut self, id: &TargetId) -> bool {
        let removed = self.hints.remove(id).is_some();
        if removed {
            self.revision += 1;
        }
        removed
    }

    /// Resolve a step id to its live handle. Hint spots are not consulted.
    pub fn resolve(&self, id: &TargetId) -> Result<TargetHandle, TourError> {
        self.steps
            .get(id)
            .map(|e| e.handle)
            .ok_or_else(|| TourError::TargetNotFound { id: id.clone() })
    }

    /// Resolve a hint id to its live handle.
    pub fn resolve_hint(&self, id: &TargetId) -> Result<TargetHandle, TourError> {
        self.hints
            .get(id)
            .map(|e| e.handle)
            .ok_or_else(|| TourError::TargetNotFound { id: id.clone() })
    }

    /// Look up a registered step.
    #[must_use]
    pub fn step(&self, id: &TargetId) -> Option<&Step> {
        self.steps.get(id).map(|e| &e.step)
    }

    /// Look up a registered hint spot.
    #[must_use]
    pub fn hint(&self, id: &TargetId) -> Option<&HintSpot> {
        self.hints.get(id).map(|e| &e.spot)
    }

    /// Ordered step sequence, optionally filtered by group.
    #[must_use]
    pub fn list(&self, group: Option<&str>) -> Vec<Step> {
        let mut steps: Vec<Step> = self
            .steps
            .values()
            .filter(|e| e.step.in_group(group))
            .map(|e| e.step.clone())
            .collect();
        steps.sort_by_key(Step::order_key);
        steps
    }

    /// All hint spots in registration order.
    #[must_use]
    pub fn hints(&self) -> Vec<HintSpot> {
        let mut spots: Vec<HintSpot> = self.hints.values().map(|e| e.spot.clone()).collect();
        spots.sort_by_key(|s| s.seq);
        spots
    }

    /// Number of registered steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether no steps are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Monotonic mutation counter.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

fn bump(counter: &mut u64) -> u64 {
    let seq = *counter;
    *counter += 1;
    seq
}
