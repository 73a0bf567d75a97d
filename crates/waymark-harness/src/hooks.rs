#![forbid(unsafe_code)]

//! Hooks that record every call and answer confirmations from a script.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use waymark_core::{TargetId, TourError};
use waymark_runtime::{Confirm, ExitReason, StepChange, Ticket, TourHooks};

/// One hook invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookCall {
    BeforeChange { from: Option<usize>, to: usize, ticket: Ticket },
    BeforeExit { index: Option<usize>, ticket: Ticket },
    Start { index: usize, step: TargetId },
    Change { from: Option<usize>, to: usize },
    AfterChange { from: Option<usize>, to: usize },
    Complete,
    Exit(ExitReason),
    /// Carries `TourError::error_type`.
    Error(&'static str),
}

impl HookCall {
    /// Short name, handy for order assertions.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::BeforeChange { .. } => "before_change",
            Self::BeforeExit { .. } => "before_exit",
            Self::Start { .. } => "on_start",
            Self::Change { .. } => "on_change",
            Self::AfterChange { .. } => "after_change",
            Self::Complete => "on_complete",
            Self::Exit(_) => "on_exit",
            Self::Error(_) => "on_error",
        }
    }
}

#[derive(Debug, Default)]
struct Shared {
    calls: Vec<HookCall>,
    change_answers: VecDeque<Confirm>,
    exit_answers: VecDeque<Confirm>,
}

/// Read side of [`RecordingHooks`], kept by the test after the hooks move
/// into the tour.
#[derive(Debug, Clone, Default)]
pub struct HookLog(Rc<RefCell<Shared>>);

impl HookLog {
    #[must_use]
    pub fn calls(&self) -> Vec<HookCall> {
        self.0.borrow().calls.clone()
    }

    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.0.borrow().calls.iter().map(HookCall::name).collect()
    }

    #[must_use]
    pub fn count(&self, name: &str) -> usize {
        self.0.borrow().calls.iter().filter(|c| c.name() == name).count()
    }

    /// Errors reported through `on_error`, by type.
    #[must_use]
    pub fn errors(&self) -> Vec<&'static str> {
        self.0
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                HookCall::Error(kind) => Some(*kind),
                _ => None,
            })
            .collect()
    }

    /// Ticket of the latest confirm-hook call.
    #[must_use]
    pub fn last_confirm_ticket(&self) -> Option<Ticket> {
        self.0.borrow().calls.iter().rev().find_map(|c| match c {
            HookCall::BeforeChange { ticket, .. } | HookCall::BeforeExit { ticket, .. } => {
                Some(*ticket)
            }
            _ => None,
        })
    }

    pub fn clear(&self) {
        self.0.borrow_mut().calls.clear();
    }

    /// Queue an answer for the next `before_change` calls, in order.
    pub fn answer_change(&self, answer: Confirm) {
        self.0.borrow_mut().change_answers.push_back(answer);
    }

    /// Queue an answer for the next `before_exit` calls, in order.
    pub fn answer_exit(&self, answer: Confirm) {
        self.0.borrow_mut().exit_answers.push_back(answer);
    }
}

/// [`TourHooks`] that records calls. Unscripted confirmations proceed.
#[derive(Debug, Default)]
pub struct RecordingHooks {
    shared: HookLog,
}

impl RecordingHooks {
    #[must_use]
    pub fn new() -> (Self, HookLog) {
        let hooks = Self::default();
        let log = hooks.shared.clone();
        (hooks, log)
    }

    fn push(&self, call: HookCall) {
        tracing::trace!(target: "waymark.harness", hook = call.name(), "hook called");
        self.shared.0.borrow_mut().calls.push(call);
    }
}

impl TourHooks for RecordingHooks {
    fn before_change(&mut self, ticket: Ticket, change: &StepChange) -> Confirm {
        self.push(HookCall::BeforeChange {
            from: change.from,
            to: change.to,
            ticket,
        });
        self.shared
            .0
            .borrow_mut()
            .change_answers
            .pop_front()
            .unwrap_or(Confirm::Proceed)
    }

    fn before_exit(&mut self, ticket: Ticket, index: Option<usize>) -> Confirm {
        self.push(HookCall::BeforeExit { index, ticket });
        self.shared
            .0
            .borrow_mut()
            .exit_answers
            .pop_front()
            .unwrap_or(Confirm::Proceed)
    }

    fn on_start(&mut self, index: usize, step: &TargetId) {
        self.push(HookCall::Start {
            index,
            step: step.clone(),
        });
    }

    fn on_change(&mut self, change: &StepChange) {
        self.push(HookCall::Change {
            from: change.from,
            to: change.to,
        });
    }

    fn after_change(&mut self, change: &StepChange) {
        self.push(HookCall::AfterChange {
            from: change.from,
            to: change.to,
        });
    }

    fn on_complete(&mut self) {
        self.push(HookCall::Complete);
    }

    fn on_exit(&mut self, reason: ExitReason) {
        self.push(HookCall::Exit(reason));
    }

    fn on_error(&mut self, error: &TourError) {
        self.push(HookCall::Error(error.error_type()));
    }
}
