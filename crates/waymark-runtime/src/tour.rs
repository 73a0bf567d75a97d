#![forbid(unsafe_code)]

//! The tour state machine.
//!
//! ```text
//! Idle ─start─▶ Starting ─commit─▶ Active(i) ─next/previous/go_to─▶ Transitioning(i→j)
//!   ▲                                  │                                 │
//!   └──────────── Exiting ◀──exit──────┴────────────commit──▶ Active(j) ─┘
//! ```
//!
//! A transition walks four stages for its candidate step: resolve the handle,
//! locate the target, scroll it into view, re-measure it. Then the
//! positioning engine runs and the index is committed. Any stage may suspend
//! on the host; the host resumes it through [`Tour::measured`],
//! [`Tour::scroll_settled`], or [`Tour::tick`] with the ticket it was given.
//! A candidate whose target cannot be found is skipped in the direction of
//! travel and reported through [`TourHooks::on_error`].
//!
//! Only one transition is in flight at a time. Requests made meanwhile are
//! rejected with [`TourError::Busy`]. [`Tour::exit`] drops the in-flight
//! transition; replies for it are stale and ignored.
//!
//! # Example
//!
//! ```ignore
//! let mut tour = Tour::new(registry.clone()).with_hooks(MyHooks::default());
//! tour.start(&mut host, StartOptions::new())?;
//! // later, when the host finishes an animated scroll:
//! tour.scroll_settled(&mut host, ticket);
//! ```

use std::task::Poll;

use web_time::Duration;

use waymark_core::{
    MemoryPreferences, Placement, PreferenceStore, Rect, ScrollBehavior, SharedRegistry, Step,
    TargetHandle, TargetId, TourError, TourOption, TourOptions, VetoHook,
};
use waymark_layout::{AUTO_PREFERENCE, Geometry, PlacementRequest, place, tooltip_rect};

use crate::hooks::{Confirm, ExitReason, NoHooks, StepChange, TourHooks};
use crate::host::Host;
use crate::scroll::{RevealRequest, ScrollCoordinator, Visibility};
use crate::snapshot::TourSnapshot;
use crate::ticket::{Origin, Ticket, TicketSource};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Observable lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourState {
    Idle,
    /// Resolving the first step.
    Starting,
    Active { index: usize },
    Transitioning { from: usize, to: usize },
    Exiting,
}

impl TourState {
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Active { .. } => "active",
            Self::Transitioning { .. } => "transitioning",
            Self::Exiting => "exiting",
        }
    }
}

/// What a call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A step is now active at `index`.
    Committed { index: usize },
    /// The current step's geometry was recomputed.
    Refreshed { index: usize },
    /// Waiting on the host or a deferred confirmation.
    Pending,
    /// A confirm hook vetoed the request. State is unchanged.
    Rejected(VetoHook),
    /// `next()` ran past the last step; the tour is idle again.
    Completed,
    Exited(ExitReason),
    /// Nothing to do (no-op request or stale reply).
    Unchanged,
    /// The user opted out through the "don't show again" preference.
    Suppressed,
}

/// Arguments to [`Tour::start`].
#[derive(Debug, Clone, Default)]
pub struct StartOptions {
    /// Overrides `TourOptions::group` for this run.
    pub group: Option<String>,
    /// Replaces the tour's options for this run.
    pub options: Option<TourOptions>,
    /// End a running tour and start over instead of ignoring the call.
    pub force_restart: bool,
}

impl StartOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    #[must_use]
    pub fn options(mut self, options: TourOptions) -> Self {
        self.options = Some(options);
        self
    }

    #[must_use]
    pub fn force_restart(mut self, force: bool) -> Self {
        self.force_restart = force;
        self
    }
}

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Starting,
    Active,
    Transitioning,
    Exiting,
}

impl Phase {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Active => "active",
            Self::Transitioning => "transitioning",
            Self::Exiting => "exiting",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

impl Direction {
    fn between(from: usize, to: usize) -> Self {
        if to < from {
            Self::Backward
        } else {
            Self::Forward
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Start,
    Change,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Resolve,
    Locate { handle: TargetHandle },
    AwaitLocate { handle: TargetHandle },
    Scroll { handle: TargetHandle, target: Rect },
    AwaitScroll { handle: TargetHandle },
    Measure { handle: TargetHandle },
    AwaitMeasure,
}

impl Stage {
    const fn as_str(&self) -> &'static str {
        match self {
            Self::Resolve => "resolve",
            Self::Locate { .. } | Self::AwaitLocate { .. } => "locate",
            Self::Scroll { .. } | Self::AwaitScroll { .. } => "scroll",
            Self::Measure { .. } | Self::AwaitMeasure => "measure",
        }
    }
}

#[derive(Debug)]
struct Transition {
    kind: Kind,
    direction: Direction,
    candidate: Step,
    stage: Stage,
    ticket: Option<Ticket>,
    /// Options captured on entering the scroll stage.
    frozen: Option<TourOptions>,
}

impl Transition {
    fn new(kind: Kind, direction: Direction, candidate: Step) -> Self {
        Self {
            kind,
            direction,
            candidate,
            stage: Stage::Resolve,
            ticket: None,
            frozen: None,
        }
    }

    fn retarget(&mut self, candidate: Step) {
        self.candidate = candidate;
        self.stage = Stage::Resolve;
        self.ticket = None;
        self.frozen = None;
    }
}

#[derive(Debug)]
enum PendingConfirm {
    Change {
        ticket: Ticket,
        step: Step,
        direction: Direction,
    },
    Exit {
        ticket: Ticket,
    },
}

impl PendingConfirm {
    fn ticket(&self) -> Ticket {
        match self {
            Self::Change { ticket, .. } | Self::Exit { ticket } => *ticket,
        }
    }
}

#[derive(Debug)]
struct Session {
    group: Option<String>,
    steps: Vec<Step>,
    /// Registry revision `steps` was built from. `None` forces a rebuild.
    revision: Option<u64>,
    current: Option<Step>,
    geometry: Option<Geometry>,
    target_lost: bool,
}

enum Flow {
    Continue,
    Suspend,
    Done(Outcome),
}

// ---------------------------------------------------------------------------
// Tour
// ---------------------------------------------------------------------------

/// Step sequencer for one tour scope.
pub struct Tour {
    registry: SharedRegistry,
    /// Configured options; every session starts from these.
    defaults: TourOptions,
    /// Effective options of the running session (equal to `defaults` when idle).
    options: TourOptions,
    hooks: Box<dyn TourHooks>,
    preferences: Box<dyn PreferenceStore>,
    scroll: ScrollCoordinator,
    tickets: TicketSource,
    phase: Phase,
    session: Option<Session>,
    transition: Option<Transition>,
    confirm: Option<PendingConfirm>,
    refresh: Option<Ticket>,
    last_error: Option<TourError>,
}

impl std::fmt::Debug for Tour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tour")
            .field("state", &self.state())
            .field("options", &self.options)
            .field("preferences", &self.preferences.name())
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

impl Tour {
    /// Create an idle tour over `registry` with default options and no hooks.
    #[must_use]
    pub fn new(registry: SharedRegistry) -> Self {
        Self {
            registry,
            defaults: TourOptions::default(),
            options: TourOptions::default(),
            hooks: Box::new(NoHooks),
            preferences: Box::new(MemoryPreferences::new()),
            scroll: ScrollCoordinator::new(),
            tickets: TicketSource::new(Origin::Tour),
            phase: Phase::Idle,
            session: None,
            transition: None,
            confirm: None,
            refresh: None,
            last_error: None,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: TourOptions) -> Self {
        self.defaults = options.clone();
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_hooks(mut self, hooks: impl TourHooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    #[must_use]
    pub fn with_preferences(mut self, store: impl PreferenceStore + 'static) -> Self {
        self.preferences = Box::new(store);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────────

    #[must_use]
    pub fn state(&self) -> TourState {
        match self.phase {
            Phase::Idle => TourState::Idle,
            Phase::Starting => TourState::Starting,
            Phase::Exiting => TourState::Exiting,
            Phase::Active => TourState::Active {
                index: self.current_index().unwrap_or(0),
            },
            Phase::Transitioning => TourState::Transitioning {
                from: self.current_index().unwrap_or(0),
                to: self.candidate_index().unwrap_or(0),
            },
        }
    }

    /// Options in effect: the running session's, or the configured ones when idle.
    #[must_use]
    pub fn options(&self) -> &TourOptions {
        &self.options
    }

    /// Most recent recoverable error, cleared by `start`.
    #[must_use]
    pub fn last_error(&self) -> Option<&TourError> {
        self.last_error.as_ref()
    }

    /// The step currently on screen.
    #[must_use]
    pub fn current_step(&self) -> Option<&Step> {
        self.session.as_ref()?.current.as_ref()
    }

    /// Render view of the tour. Picks up registry changes first.
    pub fn snapshot(&mut self) -> TourSnapshot {
        self.sync();
        let opacity = self.options.effective_overlay_opacity();
        let Some(session) = &self.session else {
            return TourSnapshot::idle(opacity, self.last_error.clone());
        };
        let index = self.current_index();
        let total = session.steps.len();
        TourSnapshot {
            state: self.state(),
            step: session.current.clone(),
            index,
            total,
            is_first: index == Some(0),
            is_last: index.is_some_and(|i| i + 1 == total),
            geometry: session.geometry,
            disable_interaction: session
                .current
                .as_ref()
                .is_some_and(|s| s.config.disable_interaction),
            target_lost: session.target_lost,
            overlay_opacity: opacity,
            last_error: self.last_error.clone(),
        }
    }

    // ── Options and preferences ──────────────────────────────────────────

    /// Change one option, both for the running session and for later ones.
    /// In-flight transitions past the scroll stage keep the options they
    /// captured.
    pub fn set_option(&mut self, option: TourOption) {
        tracing::debug!(target: "waymark.tour", ?option, "option changed");
        self.defaults.apply(option.clone());
        self.options.apply(option);
    }

    /// Replace all options, both for the running session and for later ones.
    pub fn set_options(&mut self, options: TourOptions) {
        tracing::debug!(target: "waymark.tour", "options replaced");
        self.defaults = options.clone();
        self.options = options;
    }

    /// Record the "don't show again" choice. Returns `false` when no
    /// preference key is configured.
    pub fn set_dont_show_again(&mut self, value: bool) -> bool {
        let Some(key) = self.options.dont_show_again_key.as_deref() else {
            return false;
        };
        tracing::debug!(
            target: "waymark.tour",
            key,
            value,
            store = self.preferences.name(),
            "dont-show-again preference written"
        );
        self.preferences.set(key, value);
        true
    }

    // ── Lifecycle ────────────────────────────────────────────────────────

    /// Start the tour.
    ///
    /// Ignored while a tour is running unless `force_restart` is set. Fails
    /// with [`TourError::EmptySequence`] when the (filtered) sequence is empty.
    pub fn start(&mut self, host: &mut dyn Host, start: StartOptions) -> Result<Outcome, TourError> {
        if self.phase != Phase::Idle {
            if !start.force_restart {
                tracing::debug!(
                    target: "waymark.tour",
                    state = self.phase.as_str(),
                    "start ignored; tour already running"
                );
                return Ok(Outcome::Unchanged);
            }
            self.finish_exit(ExitReason::Restarted);
        }

        // Per-call overrides live only as long as this session.
        self.options = start.options.unwrap_or_else(|| self.defaults.clone());
        if start.group.is_some() {
            self.options.group = start.group;
        }
        if !self.options.is_active {
            self.options = self.defaults.clone();
            tracing::debug!(target: "waymark.tour", "start ignored; tour inactive");
            return Ok(Outcome::Unchanged);
        }
        if let Some(key) = self.options.dont_show_again_key.as_deref() {
            if self.preferences.get(key) == Some(true) {
                tracing::debug!(target: "waymark.tour", key, "start suppressed by preference");
                self.options = self.defaults.clone();
                return Ok(Outcome::Suppressed);
            }
        }

        let group = self.options.group.clone();
        let (steps, revision) = {
            let registry = self.registry.borrow();
            (registry.list(group.as_deref()), registry.revision())
        };
        let Some(first) = steps.first().cloned() else {
            tracing::debug!(target: "waymark.tour", ?group, "start failed: empty sequence");
            self.options = self.defaults.clone();
            return Err(TourError::EmptySequence { group });
        };

        tracing::debug!(
            target: "waymark.tour",
            steps = steps.len(),
            ?group,
            "tour starting"
        );
        self.last_error = None;
        self.session = Some(Session {
            group,
            steps,
            revision: Some(revision),
            current: None,
            geometry: None,
            target_lost: false,
        });
        self.phase = Phase::Starting;
        self.transition = Some(Transition::new(Kind::Start, Direction::Forward, first));
        Ok(self.drive(host))
    }

    /// Advance one step. At the last step this completes the tour.
    pub fn next(&mut self, host: &mut dyn Host) -> Result<Outcome, TourError> {
        let from = self.ready_index("next")?;
        if from + 1 >= self.total() {
            return Ok(self.complete());
        }
        self.request_change(host, from, from + 1)
    }

    /// Go back one step. A no-op at the first step.
    pub fn previous(&mut self, host: &mut dyn Host) -> Result<Outcome, TourError> {
        let from = self.ready_index("previous")?;
        match from.checked_sub(1) {
            Some(to) => self.request_change(host, from, to),
            None => Ok(Outcome::Unchanged),
        }
    }

    /// Jump to `index` in the filtered sequence.
    pub fn go_to(&mut self, host: &mut dyn Host, index: usize) -> Result<Outcome, TourError> {
        let from = self.ready_index("go_to")?;
        let len = self.total();
        if index >= len {
            return Err(TourError::IndexOutOfRange { index, len });
        }
        if index == from {
            return Ok(Outcome::Unchanged);
        }
        self.request_change(host, from, index)
    }

    /// End the tour.
    ///
    /// While a transition is in flight the exit is unconditional and the
    /// transition's result is discarded. Otherwise `before_exit` is consulted
    /// unless `force` is set.
    pub fn exit(&mut self, force: bool) -> Result<Outcome, TourError> {
        match self.phase {
            Phase::Idle | Phase::Exiting => Err(TourError::NotActive { operation: "exit" }),
            Phase::Starting | Phase::Transitioning => {
                tracing::debug!(
                    target: "waymark.tour",
                    stage = ?self.transition.as_ref().map(|t| t.stage.as_str()),
                    "cancelling in-flight transition"
                );
                Ok(Outcome::Exited(self.finish_exit(ExitReason::Forced)))
            }
            Phase::Active => {
                if force {
                    return Ok(Outcome::Exited(self.finish_exit(ExitReason::Forced)));
                }
                if matches!(self.confirm, Some(PendingConfirm::Exit { .. })) {
                    return Err(self.busy("exit"));
                }
                // A pending change confirmation is superseded by the exit request.
                self.confirm = None;
                let ticket = self.tickets.issue();
                let index = self.current_index();
                match self.hooks.before_exit(ticket, index) {
                    Confirm::Proceed => Ok(Outcome::Exited(self.finish_exit(ExitReason::User))),
                    Confirm::Cancel => Ok(self.rejected(VetoHook::BeforeExit)),
                    Confirm::Defer => {
                        self.confirm = Some(PendingConfirm::Exit { ticket });
                        Ok(Outcome::Pending)
                    }
                }
            }
        }
    }

    /// Re-measure the current target and recompute its geometry.
    ///
    /// Never scrolls and never skips. An unresolvable target sets
    /// `target_lost` and keeps the step active.
    pub fn refresh(&mut self, host: &mut dyn Host) -> Result<Outcome, TourError> {
        self.ready_index("refresh")?;
        let Some(step) = self.current_step().cloned() else {
            return Ok(Outcome::Unchanged);
        };
        let resolved = self.registry.borrow().resolve(&step.id);
        let handle = match resolved {
            Ok(handle) => handle,
            Err(err) => {
                self.mark_lost(err);
                return Ok(Outcome::Unchanged);
            }
        };
        let ticket = self.tickets.issue();
        match host.measure(ticket, handle) {
            Poll::Ready(rect) => Ok(self.apply_refresh(host, rect)),
            Poll::Pending => {
                self.refresh = Some(ticket);
                Ok(Outcome::Pending)
            }
        }
    }

    // ── Host replies ─────────────────────────────────────────────────────

    /// Deliver a measurement issued earlier with `ticket`.
    pub fn measured(&mut self, host: &mut dyn Host, ticket: Ticket, rect: Option<Rect>) -> Outcome {
        if self.refresh == Some(ticket) {
            self.refresh = None;
            return self.apply_refresh(host, rect);
        }
        let Some(tr) = self.transition.as_mut() else {
            return stale(ticket, "measure");
        };
        if tr.ticket != Some(ticket) {
            return stale(ticket, "measure");
        }
        match (tr.stage, rect) {
            (Stage::AwaitLocate { handle }, Some(target)) => {
                tr.stage = Stage::Scroll { handle, target };
                self.drive(host)
            }
            (Stage::AwaitMeasure, Some(target)) => self.commit(host, target),
            (Stage::AwaitLocate { .. } | Stage::AwaitMeasure, None) => {
                let id = tr.candidate.id.clone();
                let flow = self.skip(TourError::TargetNotFound { id });
                self.resume(host, flow)
            }
            _ => stale(ticket, "measure"),
        }
    }

    /// The scroll issued with `ticket` has settled.
    pub fn scroll_settled(&mut self, host: &mut dyn Host, ticket: Ticket) -> Outcome {
        let Some(tr) = self.transition.as_mut() else {
            return stale(ticket, "scroll");
        };
        let Stage::AwaitScroll { handle } = tr.stage else {
            return stale(ticket, "scroll");
        };
        if !self.scroll.settle(ticket) {
            return stale(ticket, "scroll");
        }
        tr.stage = Stage::Measure { handle };
        self.drive(host)
    }

    /// Answer a deferred `before_change` / `before_exit`.
    pub fn confirm(&mut self, host: &mut dyn Host, ticket: Ticket, decision: Confirm) -> Outcome {
        if self.confirm.as_ref().map(PendingConfirm::ticket) != Some(ticket) {
            return stale(ticket, "confirm");
        }
        if decision == Confirm::Defer {
            return Outcome::Pending;
        }
        let Some(pending) = self.confirm.take() else {
            return Outcome::Unchanged;
        };
        match (pending, decision) {
            (PendingConfirm::Change { step, direction, .. }, Confirm::Proceed) => {
                self.begin_change(host, direction, step)
            }
            (PendingConfirm::Change { .. }, _) => self.rejected(VetoHook::BeforeChange),
            (PendingConfirm::Exit { .. }, Confirm::Proceed) => {
                Outcome::Exited(self.finish_exit(ExitReason::User))
            }
            (PendingConfirm::Exit { .. }, _) => self.rejected(VetoHook::BeforeExit),
        }
    }

    /// Advance time. Drives the scroll settle ceiling.
    pub fn tick(&mut self, host: &mut dyn Host, delta: Duration) -> Outcome {
        let Some(timeout) = self.scroll.tick(delta) else {
            return Outcome::Unchanged;
        };
        self.report(timeout);
        let Some(tr) = self.transition.as_mut() else {
            return Outcome::Unchanged;
        };
        let Stage::AwaitScroll { handle } = tr.stage else {
            return Outcome::Unchanged;
        };
        tr.stage = Stage::Measure { handle };
        self.drive(host)
    }

    // ── Transition engine ────────────────────────────────────────────────

    fn request_change(&mut self, host: &mut dyn Host, from: usize, to: usize) -> Result<Outcome, TourError> {
        let len = self.total();
        let step = self
            .session
            .as_ref()
            .and_then(|s| s.steps.get(to))
            .cloned()
            .ok_or(TourError::IndexOutOfRange { index: to, len })?;
        let change = StepChange {
            from: Some(from),
            to,
            step: step.id.clone(),
        };
        let direction = Direction::between(from, to);
        let ticket = self.tickets.issue();
        match self.hooks.before_change(ticket, &change) {
            Confirm::Proceed => Ok(self.begin_change(host, direction, step)),
            Confirm::Cancel => Ok(self.rejected(VetoHook::BeforeChange)),
            Confirm::Defer => {
                tracing::debug!(target: "waymark.tour", %ticket, to, "change awaiting confirmation");
                self.confirm = Some(PendingConfirm::Change {
                    ticket,
                    step,
                    direction,
                });
                Ok(Outcome::Pending)
            }
        }
    }

    fn begin_change(&mut self, host: &mut dyn Host, direction: Direction, step: Step) -> Outcome {
        self.refresh = None;
        self.phase = Phase::Transitioning;
        self.transition = Some(Transition::new(Kind::Change, direction, step));
        self.drive(host)
    }

    fn drive(&mut self, host: &mut dyn Host) -> Outcome {
        self.sync();
        loop {
            let Some(tr) = self.transition.as_ref() else {
                return Outcome::Unchanged;
            };
            let _span = tracing::debug_span!(
                "tour.transition",
                step = %tr.candidate.id,
                stage = tr.stage.as_str(),
            )
            .entered();
            let stage = tr.stage;
            let flow = match stage {
                Stage::Resolve => self.resolve_stage(),
                Stage::Locate { handle } => self.locate_stage(host, handle),
                Stage::Scroll { handle, target } => self.scroll_stage(host, handle, target),
                Stage::Measure { handle } => self.measure_stage(host, handle),
                Stage::AwaitLocate { .. } | Stage::AwaitScroll { .. } | Stage::AwaitMeasure => {
                    Flow::Suspend
                }
            };
            match flow {
                Flow::Continue => {}
                Flow::Suspend => return Outcome::Pending,
                Flow::Done(outcome) => return outcome,
            }
        }
    }

    fn resume(&mut self, host: &mut dyn Host, flow: Flow) -> Outcome {
        match flow {
            Flow::Continue => self.drive(host),
            Flow::Suspend => Outcome::Pending,
            Flow::Done(outcome) => outcome,
        }
    }

    fn resolve_stage(&mut self) -> Flow {
        let Some(tr) = self.transition.as_mut() else {
            return Flow::Done(Outcome::Unchanged);
        };
        let resolved = self.registry.borrow().resolve(&tr.candidate.id);
        match resolved {
            Ok(handle) => {
                if tr.candidate.config.scroll == ScrollBehavior::Off {
                    tr.frozen = Some(self.options.clone());
                    tr.stage = Stage::Measure { handle };
                } else {
                    tr.stage = Stage::Locate { handle };
                }
                Flow::Continue
            }
            Err(err) => self.skip(err),
        }
    }

    fn locate_stage(&mut self, host: &mut dyn Host, handle: TargetHandle) -> Flow {
        let ticket = self.tickets.issue();
        let Some(tr) = self.transition.as_mut() else {
            return Flow::Done(Outcome::Unchanged);
        };
        tr.ticket = Some(ticket);
        match host.measure(ticket, handle) {
            Poll::Ready(Some(target)) => {
                tr.stage = Stage::Scroll { handle, target };
                Flow::Continue
            }
            Poll::Ready(None) => {
                let id = tr.candidate.id.clone();
                self.skip(TourError::TargetNotFound { id })
            }
            Poll::Pending => {
                tr.stage = Stage::AwaitLocate { handle };
                Flow::Suspend
            }
        }
    }

    fn scroll_stage(&mut self, host: &mut dyn Host, handle: TargetHandle, target: Rect) -> Flow {
        let ticket = self.tickets.issue();
        let Some(tr) = self.transition.as_mut() else {
            return Flow::Done(Outcome::Unchanged);
        };
        tr.ticket = Some(ticket);
        let options = tr.frozen.insert(self.options.clone());
        let tooltip = host
            .tooltip_size(&tr.candidate.id)
            .unwrap_or(options.tooltip_size);
        let region = scroll_region(&tr.candidate, target, tooltip, options);
        let request = RevealRequest {
            ticket,
            target: &tr.candidate.id,
            handle,
            region,
            padding: options.scroll_padding,
            animated: options.animate_scroll,
            ceiling: Duration::from_millis(options.scroll_settle_timeout_ms),
        };
        match self.scroll.ensure_visible(host, request) {
            Visibility::NotNeeded | Visibility::Settled => {
                tr.stage = Stage::Measure { handle };
                Flow::Continue
            }
            Visibility::Pending => {
                tr.stage = Stage::AwaitScroll { handle };
                Flow::Suspend
            }
        }
    }

    fn measure_stage(&mut self, host: &mut dyn Host, handle: TargetHandle) -> Flow {
        let ticket = self.tickets.issue();
        let Some(tr) = self.transition.as_mut() else {
            return Flow::Done(Outcome::Unchanged);
        };
        tr.ticket = Some(ticket);
        match host.measure(ticket, handle) {
            Poll::Ready(Some(target)) => Flow::Done(self.commit(host, target)),
            Poll::Ready(None) => {
                let id = tr.candidate.id.clone();
                self.skip(TourError::TargetNotFound { id })
            }
            Poll::Pending => {
                tr.stage = Stage::AwaitMeasure;
                Flow::Suspend
            }
        }
    }

    /// Skip-and-warn: report `err` and move to the next candidate.
    fn skip(&mut self, err: TourError) -> Flow {
        tracing::warn!(target: "waymark.tour", error = %err, "skipping step");
        self.report(err);
        let Some(tr) = self.transition.as_ref() else {
            return Flow::Done(Outcome::Unchanged);
        };
        let (kind, direction) = (tr.kind, tr.direction);
        let next = self
            .session
            .as_ref()
            .and_then(|s| neighbor(&s.steps, &tr.candidate, direction));

        match (next, kind, direction) {
            (Some(step), _, _) => {
                if let Some(tr) = self.transition.as_mut() {
                    tr.retarget(step);
                }
                Flow::Continue
            }
            (None, Kind::Start, _) => {
                self.report(TourError::NoResolvableStep);
                Flow::Done(Outcome::Exited(
                    self.finish_exit(ExitReason::NoResolvableStep),
                ))
            }
            (None, Kind::Change, Direction::Forward) => Flow::Done(self.complete()),
            (None, Kind::Change, Direction::Backward) => {
                tracing::debug!(target: "waymark.tour", "no earlier step resolves; staying put");
                self.transition = None;
                self.phase = Phase::Active;
                Flow::Done(Outcome::Unchanged)
            }
        }
    }

    fn commit(&mut self, host: &mut dyn Host, target: Rect) -> Outcome {
        let Some(tr) = self.transition.take() else {
            return Outcome::Unchanged;
        };
        let options = tr.frozen.as_ref().unwrap_or(&self.options);
        let geometry = compute_geometry(host, &tr.candidate, target, options);
        let Some(session) = self.session.as_mut() else {
            return Outcome::Unchanged;
        };

        let from = session
            .current
            .as_ref()
            .and_then(|c| index_of(&session.steps, &c.id));
        session.current = Some(tr.candidate.clone());
        session.geometry = Some(geometry);
        session.target_lost = false;
        // A previously lost step may still occupy a slot; rebuild around the new one.
        session.revision = None;
        self.phase = Phase::Active;
        self.sync();
        let index = self.current_index().unwrap_or(0);

        tracing::debug!(
            target: "waymark.tour",
            index,
            step = %tr.candidate.id,
            placement = geometry.placement.as_str(),
            "step committed"
        );

        let change = StepChange {
            from,
            to: index,
            step: tr.candidate.id,
        };
        match tr.kind {
            Kind::Start => {
                self.hooks.on_start(index, &change.step);
                self.hooks.on_change(&change);
            }
            Kind::Change => {
                self.hooks.after_change(&change);
                self.hooks.on_change(&change);
            }
        }
        Outcome::Committed { index }
    }

    fn apply_refresh(&mut self, host: &mut dyn Host, rect: Option<Rect>) -> Outcome {
        let Some(step) = self.current_step().cloned() else {
            return Outcome::Unchanged;
        };
        let Some(target) = rect else {
            self.mark_lost(TourError::TargetNotFound { id: step.id });
            return Outcome::Unchanged;
        };
        let geometry = compute_geometry(host, &step, target, &self.options);
        let index = self.current_index().unwrap_or(0);
        if let Some(session) = self.session.as_mut() {
            session.geometry = Some(geometry);
            session.target_lost = false;
        }
        tracing::debug!(target: "waymark.tour", index, step = %step.id, "geometry refreshed");
        Outcome::Refreshed { index }
    }

    fn complete(&mut self) -> Outcome {
        tracing::debug!(target: "waymark.tour", "tour completed");
        self.hooks.on_complete();
        self.finish_exit(ExitReason::Completed);
        Outcome::Completed
    }

    fn finish_exit(&mut self, reason: ExitReason) -> ExitReason {
        self.transition = None;
        self.confirm = None;
        self.refresh = None;
        if let Some(ticket) = self.scroll.cancel() {
            tracing::debug!(target: "waymark.scroll", %ticket, "discarding in-flight scroll");
        }
        self.phase = Phase::Exiting;
        tracing::debug!(target: "waymark.tour", reason = reason.as_str(), "tour exiting");
        self.hooks.on_exit(reason);
        self.session = None;
        self.options = self.defaults.clone();
        self.phase = Phase::Idle;
        reason
    }

    fn rejected(&mut self, hook: VetoHook) -> Outcome {
        tracing::debug!(target: "waymark.tour", %hook, "request vetoed");
        self.last_error = Some(TourError::TransitionRejected { hook });
        Outcome::Rejected(hook)
    }

    fn report(&mut self, err: TourError) {
        tracing::warn!(
            target: "waymark.tour",
            error = %err,
            kind = err.error_type(),
            "recoverable tour error"
        );
        self.hooks.on_error(&err);
        self.last_error = Some(err);
    }

    fn mark_lost(&mut self, err: TourError) {
        if let Some(session) = self.session.as_mut() {
            session.target_lost = true;
        }
        self.report(err);
    }

    fn busy(&self, operation: &'static str) -> TourError {
        tracing::debug!(
            target: "waymark.tour",
            operation,
            state = self.phase.as_str(),
            "request rejected while busy"
        );
        TourError::Busy
    }

    /// Index of the active step, failing unless a new request may start.
    fn ready_index(&mut self, operation: &'static str) -> Result<usize, TourError> {
        match self.phase {
            Phase::Idle | Phase::Exiting => return Err(TourError::NotActive { operation }),
            Phase::Starting | Phase::Transitioning => return Err(self.busy(operation)),
            Phase::Active => {}
        }
        if self.confirm.is_some() {
            return Err(self.busy(operation));
        }
        self.sync();
        self.current_index()
            .ok_or(TourError::NotActive { operation })
    }

    // ── Sequence bookkeeping ─────────────────────────────────────────────

    /// Rebuild the filtered sequence after registry changes.
    ///
    /// The current step keeps its identity: if it was unregistered it stays
    /// in the sequence at its order position and is flagged as lost.
    fn sync(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let (mut steps, revision) = {
            let registry = self.registry.borrow();
            if session.revision == Some(registry.revision()) {
                return;
            }
            (registry.list(session.group.as_deref()), registry.revision())
        };
        session.revision = Some(revision);

        let mut lost = None;
        if let Some(current) = session.current.as_mut() {
            match index_of(&steps, &current.id) {
                Some(i) => *current = steps[i].clone(),
                None => {
                    let slot = steps.partition_point(|s| s.order_key() < current.order_key());
                    steps.insert(slot, current.clone());
                    if !session.target_lost {
                        session.target_lost = true;
                        lost = Some(current.id.clone());
                    }
                }
            }
        }
        session.steps = steps;

        if let Some(id) = lost {
            self.report(TourError::TargetNotFound { id });
        }
    }

    fn total(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.steps.len())
    }

    fn current_index(&self) -> Option<usize> {
        let session = self.session.as_ref()?;
        index_of(&session.steps, &session.current.as_ref()?.id)
    }

    fn candidate_index(&self) -> Option<usize> {
        let session = self.session.as_ref()?;
        let candidate = &self.transition.as_ref()?.candidate;
        Some(index_of(&session.steps, &candidate.id).unwrap_or_else(|| {
            session
                .steps
                .partition_point(|s| s.order_key() < candidate.order_key())
        }))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn stale(ticket: Ticket, kind: &'static str) -> Outcome {
    tracing::debug!(target: "waymark.tour", %ticket, kind, "stale reply ignored");
    Outcome::Unchanged
}

fn index_of(steps: &[Step], id: &TargetId) -> Option<usize> {
    steps.iter().position(|s| &s.id == id)
}

/// The step after (or before) `step` in `steps`, even if `step` itself is gone.
fn neighbor(steps: &[Step], step: &Step, direction: Direction) -> Option<Step> {
    let index = match (index_of(steps, &step.id), direction) {
        (Some(i), Direction::Forward) => i.checked_add(1),
        (Some(i), Direction::Backward) => i.checked_sub(1),
        (None, Direction::Forward) => {
            Some(steps.partition_point(|s| s.order_key() < step.order_key()))
        }
        (None, Direction::Backward) => steps
            .partition_point(|s| s.order_key() < step.order_key())
            .checked_sub(1),
    }?;
    steps.get(index).cloned()
}

fn compute_geometry(host: &dyn Host, step: &Step, target: Rect, options: &TourOptions) -> Geometry {
    let viewport = host.viewport().inner(options.scroll_padding);
    let tooltip = host
        .tooltip_size(&step.id)
        .unwrap_or(options.tooltip_size);
    place(
        &PlacementRequest::new(target, tooltip, viewport)
            .position(step.config.position)
            .auto_position(options.auto_position)
            .rtl(options.rtl)
            .offset(options.tooltip_offset)
            .highlight_padding(options.highlight_padding),
    )
}

/// Region the scroll stage must reveal.
fn scroll_region(step: &Step, target: Rect, tooltip: waymark_core::Size, options: &TourOptions) -> Rect {
    if step.config.scroll != ScrollBehavior::Tooltip {
        return target;
    }
    let placement = match step.config.position.concrete() {
        Some(Placement::Floating) => return target,
        Some(p) if options.rtl => p.mirrored(),
        Some(p) => p,
        None => AUTO_PREFERENCE[0],
    };
    target.union(&tooltip_rect(target, tooltip, placement, options.tooltip_offset))
}
