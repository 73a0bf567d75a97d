#![forbid(unsafe_code)]

//! Waymark error model.
//!
//! # Design Principles
//!
//! 1. **Recoverable by default**: every runtime condition maps to a
//!    [`Recovery`] action the sequencer applies instead of failing the host.
//! 2. **Usage bugs are loud**: calling an operation in a state where it is not
//!    defined returns an error flagged by [`TourError::is_usage_error`].
//! 3. **Observability**: variants carry the step id and timing needed for
//!    tracing fields without depending on tracing.

use core::fmt;

use crate::id::TargetId;

/// Which confirm hook vetoed a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VetoHook {
    BeforeChange,
    BeforeExit,
}

impl fmt::Display for VetoHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BeforeChange => f.write_str("before_change"),
            Self::BeforeExit => f.write_str("before_exit"),
        }
    }
}

/// Errors and reportable conditions of the tour and hint engines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TourError {
    /// `start` found no steps (after group filtering).
    EmptySequence { group: Option<String> },
    /// A step or hint handle could not be resolved.
    TargetNotFound { id: TargetId },
    /// Skipping unresolvable steps ran off the end of the sequence.
    NoResolvableStep,
    /// A confirm hook vetoed a change or exit.
    TransitionRejected { hook: VetoHook },
    /// The scroll settle ceiling elapsed before the host reported completion.
    ScrollTimeout { id: TargetId, waited_ms: u64 },
    /// A navigation request arrived while another transition was in flight.
    Busy,
    /// An operation that requires an active tour was called while idle.
    NotActive { operation: &'static str },
    /// `go_to` was given an index outside the step sequence.
    IndexOutOfRange { index: usize, len: usize },
    /// A hint operation named an id that is not registered.
    UnknownHint { id: TargetId },
}

/// What the engine does when an error occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Skip to the next resolvable step in the requested direction.
    SkipStep,
    /// Remain (or return to) idle.
    StayIdle,
    /// Leave session state unchanged.
    KeepState,
    /// Continue with the best information available.
    ProceedBestEffort,
    /// The caller violated the API contract.
    CallerBug,
}

impl TourError {
    /// Determine the recovery action for this error.
    #[must_use]
    pub fn recovery(&self) -> Recovery {
        match self {
            Self::EmptySequence { .. } | Self::NoResolvableStep => Recovery::StayIdle,
            Self::TargetNotFound { .. } => Recovery::SkipStep,
            Self::TransitionRejected { .. } | Self::Busy => Recovery::KeepState,
            Self::ScrollTimeout { .. } => Recovery::ProceedBestEffort,
            Self::NotActive { .. } | Self::IndexOutOfRange { .. } | Self::UnknownHint { .. } => {
                Recovery::CallerBug
            }
        }
    }

    /// Error type label for tracing fields.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::EmptySequence { .. } => "empty_sequence",
            Self::TargetNotFound { .. } => "target_not_found",
            Self::NoResolvableStep => "no_resolvable_step",
            Self::TransitionRejected { .. } => "transition_rejected",
            Self::ScrollTimeout { .. } => "scroll_timeout",
            Self::Busy => "busy",
            Self::NotActive { .. } => "not_active",
            Self::IndexOutOfRange { .. } => "index_out_of_range",
            Self::UnknownHint { .. } => "unknown_hint",
        }
    }

    /// Whether this error signals a programming-contract violation.
    #[must_use]
    pub fn is_usage_error(&self) -> bool {
        matches!(self.recovery(), Recovery::CallerBug)
    }
}

impl fmt::Display for TourError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySequence { group: Some(g) } => {
                write!(f, "no steps registered in group {g:?}")
            }
            Self::EmptySequence { group: None } => f.write_str("no steps registered"),
            Self::TargetNotFound { id } => write!(f, "target not found: {id}"),
            Self::NoResolvableStep => f.write_str("no step in the sequence could be resolved"),
            Self::TransitionRejected { hook } => write!(f, "transition rejected by {hook} hook"),
            Self::ScrollTimeout { id, waited_ms } => {
                write!(f, "scroll to {id} did not settle within {waited_ms}ms")
            }
            Self::Busy => f.write_str("a transition is already in flight"),
            Self::NotActive { operation } => write!(f, "{operation} requires an active tour"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "step index {index} out of range (len {len})")
            }
            Self::UnknownHint { id } => write!(f, "unknown hint: {id}"),
        }
    }
}

impl std::error::Error for TourError {}
