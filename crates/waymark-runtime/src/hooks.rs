#![forbid(unsafe_code)]

//! Lifecycle hooks and confirmation decisions.
//!
//! Confirm hooks answer with [`Confirm`]. `Defer` suspends the request until
//! the host calls `Tour::confirm` with the same ticket; this is how an
//! asynchronous "are you sure?" dialog plugs into the state machine.

use waymark_core::{TargetId, TourError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ticket::Ticket;

/// Answer from a confirm hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirm {
    Proceed,
    Cancel,
    /// Decide later through `Tour::confirm`.
    Defer,
}

/// A step change, as seen by hooks.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepChange {
    /// Index being left. `None` when the tour is starting.
    pub from: Option<usize>,
    /// Destination index.
    pub to: usize,
    /// Destination step id.
    pub step: TargetId,
}

/// Why a tour ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExitReason {
    /// `exit()` after `before_exit` agreed.
    User,
    /// `exit(true)`, or cancellation of an in-flight transition.
    Forced,
    /// `next()` past the last step.
    Completed,
    /// No step in the sequence could be resolved.
    NoResolvableStep,
    /// Replaced by a forced restart.
    Restarted,
}

impl ExitReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Forced => "forced",
            Self::Completed => "completed",
            Self::NoResolvableStep => "no_resolvable_step",
            Self::Restarted => "restarted",
        }
    }
}

/// Callbacks invoked by the tour. Every method has a no-op default.
pub trait TourHooks {
    /// Asked once per requested step change, before anything moves.
    fn before_change(&mut self, _ticket: Ticket, _change: &StepChange) -> Confirm {
        Confirm::Proceed
    }

    /// Asked before a non-forced exit.
    fn before_exit(&mut self, _ticket: Ticket, _index: Option<usize>) -> Confirm {
        Confirm::Proceed
    }

    fn on_start(&mut self, _index: usize, _step: &TargetId) {}

    fn on_change(&mut self, _change: &StepChange) {}

    fn after_change(&mut self, _change: &StepChange) {}

    fn on_complete(&mut self) {}

    /// Fires once for every `start` that got past the empty-sequence check,
    /// including starts that never reach `on_start` (no step resolved, or an
    /// exit while the first step was still loading).
    fn on_exit(&mut self, _reason: ExitReason) {}

    /// Recoverable runtime conditions: missing targets, scroll timeouts.
    fn on_error(&mut self, _error: &TourError) {}
}

/// Hooks that accept everything and observe nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl TourHooks for NoHooks {}
