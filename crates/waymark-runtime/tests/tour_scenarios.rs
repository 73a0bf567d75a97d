//! End-to-end tour scenarios against a scripted host.

use waymark_core::{Placement, Rect, Size, TargetHandle, TourError, TourOptions, VetoHook};
use waymark_harness::{HookCall, RecordingHooks, ScriptedHost, Transcript, fixtures};
use waymark_runtime::{Confirm, ExitReason, Outcome, StartOptions, Tour, TourState};
use web_time::Duration;

fn rect_at(y: f32) -> Rect {
    Rect::new(10.0, y, 100.0, 40.0)
}

fn three_step_host() -> ScriptedHost {
    ScriptedHost::phone()
        .with_target(1, rect_at(100.0))
        .with_target(2, rect_at(300.0))
        .with_target(3, rect_at(500.0))
}

fn ids(tour: &mut Tour) -> Option<String> {
    tour.current_step().map(|s| s.id.as_str().to_owned())
}

// ============================================================================
// Ordering and start
// ============================================================================

#[test]
fn explicit_orders_sort_the_sequence() {
    let registry = fixtures::registry(&[("a", 1, Some(0)), ("b", 2, Some(2)), ("c", 3, Some(1))]);
    let order: Vec<String> = registry
        .borrow()
        .list(None)
        .iter()
        .map(|s| s.id.as_str().to_owned())
        .collect();
    assert_eq!(order, ["a", "c", "b"]);

    let mut host = three_step_host();
    let mut tour = Tour::new(registry);
    tour.start(&mut host, StartOptions::new()).unwrap();
    assert_eq!(ids(&mut tour).as_deref(), Some("a"));
    tour.next(&mut host).unwrap();
    assert_eq!(ids(&mut tour).as_deref(), Some("c"));
    tour.next(&mut host).unwrap();
    assert_eq!(ids(&mut tour).as_deref(), Some("b"));
}

#[test]
fn start_with_no_steps_fails_and_stays_idle() {
    let registry = fixtures::registry(&[]);
    let mut host = ScriptedHost::phone();
    let (hooks, log) = RecordingHooks::new();
    let mut tour = Tour::new(registry).with_hooks(hooks);

    assert_eq!(
        tour.start(&mut host, StartOptions::new()),
        Err(TourError::EmptySequence { group: None })
    );
    assert_eq!(tour.state(), TourState::Idle);
    assert!(log.calls().is_empty());
}

#[test]
fn start_fires_start_then_change() {
    let registry = fixtures::registry(&[("a", 1, None), ("b", 2, None)]);
    let mut host = three_step_host();
    let (hooks, log) = RecordingHooks::new();
    let mut tour = Tour::new(registry).with_hooks(hooks);

    assert_eq!(
        tour.start(&mut host, StartOptions::new()),
        Ok(Outcome::Committed { index: 0 })
    );
    assert_eq!(log.names(), ["on_start", "on_change"]);
    assert_eq!(
        log.calls()[0],
        HookCall::Start {
            index: 0,
            step: "a".into()
        }
    );
}

// ============================================================================
// Positioning through the sequencer
// ============================================================================

#[test]
fn auto_flips_to_top_near_the_bottom_edge() {
    let registry = fixtures::registry(&[("low", 1, None)]);
    let mut host = ScriptedHost::phone().with_target(1, Rect::new(10.0, 700.0, 100.0, 40.0));
    let options = TourOptions::default().tooltip_size(Size::new(300.0, 120.0));
    let mut tour = Tour::new(registry).with_options(options);

    tour.start(&mut host, StartOptions::new()).unwrap();
    let snap = tour.snapshot();
    let geometry = snap.geometry.expect("geometry after commit");
    assert_eq!(geometry.placement, Placement::Top);
    assert!(host_viewport().contains_rect(&geometry.tooltip));
}

fn host_viewport() -> Rect {
    Rect::from_size(375.0, 800.0)
}

#[test]
fn host_tooltip_size_overrides_estimate() {
    let registry = fixtures::registry(&[("a", 1, None)]);
    let mut host = ScriptedHost::phone()
        .with_target(1, rect_at(100.0))
        .with_tooltip_size("a", Size::new(200.0, 80.0));
    let mut tour = Tour::new(registry);
    tour.start(&mut host, StartOptions::new()).unwrap();

    let tooltip = tour.snapshot().geometry.unwrap().tooltip;
    assert_eq!((tooltip.width, tooltip.height), (200.0, 80.0));
}

// ============================================================================
// Navigation
// ============================================================================

#[test]
fn vetoed_next_keeps_the_current_step() {
    let registry = fixtures::registry(&[("a", 1, None), ("b", 2, None)]);
    let mut host = three_step_host();
    let (hooks, log) = RecordingHooks::new();
    let mut tour = Tour::new(registry).with_hooks(hooks);
    tour.start(&mut host, StartOptions::new()).unwrap();
    let before = tour.snapshot().geometry;
    let measures = host.measures().len();
    log.clear();

    log.answer_change(Confirm::Cancel);
    assert_eq!(
        tour.next(&mut host),
        Ok(Outcome::Rejected(VetoHook::BeforeChange))
    );
    assert_eq!(tour.state(), TourState::Active { index: 0 });
    assert_eq!(tour.snapshot().geometry, before);
    assert_eq!(host.measures().len(), measures);
    assert_eq!(log.names(), ["before_change"]);
    assert_eq!(log.count("after_change"), 0);
    assert_eq!(
        tour.last_error(),
        Some(&TourError::TransitionRejected {
            hook: VetoHook::BeforeChange
        })
    );
}

#[test]
fn next_on_last_step_completes() {
    let registry = fixtures::registry(&[("a", 1, None), ("b", 2, None)]);
    let mut host = three_step_host();
    let (hooks, log) = RecordingHooks::new();
    let mut tour = Tour::new(registry).with_hooks(hooks);
    tour.start(&mut host, StartOptions::new()).unwrap();
    tour.next(&mut host).unwrap();
    log.clear();

    assert_eq!(tour.next(&mut host), Ok(Outcome::Completed));
    assert_eq!(tour.state(), TourState::Idle);
    assert_eq!(log.calls(), [HookCall::Complete, HookCall::Exit(ExitReason::Completed)]);
}

#[test]
fn previous_on_first_step_is_a_no_op() {
    let registry = fixtures::registry(&[("a", 1, None), ("b", 2, None)]);
    let mut host = three_step_host();
    let (hooks, log) = RecordingHooks::new();
    let mut tour = Tour::new(registry).with_hooks(hooks);
    tour.start(&mut host, StartOptions::new()).unwrap();
    log.clear();
    let before = tour.snapshot();

    assert_eq!(tour.previous(&mut host), Ok(Outcome::Unchanged));
    assert_eq!(tour.snapshot(), before);
    assert!(log.calls().is_empty());
}

#[test]
fn change_hooks_run_in_order() {
    let registry = fixtures::registry(&[("a", 1, None), ("b", 2, None), ("c", 3, None)]);
    let mut host = three_step_host();
    let (hooks, log) = RecordingHooks::new();
    let mut tour = Tour::new(registry).with_hooks(hooks);
    tour.start(&mut host, StartOptions::new()).unwrap();
    log.clear();

    assert_eq!(tour.go_to(&mut host, 2), Ok(Outcome::Committed { index: 2 }));
    assert_eq!(log.names(), ["before_change", "after_change", "on_change"]);
    assert_eq!(
        log.calls()[1],
        HookCall::AfterChange {
            from: Some(0),
            to: 2
        }
    );
}

#[test]
fn deferred_confirmation_resumes_with_ticket() {
    let registry = fixtures::registry(&[("a", 1, None), ("b", 2, None)]);
    let mut host = three_step_host();
    let (hooks, log) = RecordingHooks::new();
    let mut tour = Tour::new(registry).with_hooks(hooks);
    tour.start(&mut host, StartOptions::new()).unwrap();

    log.answer_change(Confirm::Defer);
    assert_eq!(tour.next(&mut host), Ok(Outcome::Pending));
    assert_eq!(tour.next(&mut host), Err(TourError::Busy));
    let ticket = log.last_confirm_ticket().unwrap();
    assert_eq!(
        tour.confirm(&mut host, ticket, Confirm::Proceed),
        Outcome::Committed { index: 1 }
    );
    // Second answer for the same ticket is stale.
    assert_eq!(tour.confirm(&mut host, ticket, Confirm::Proceed), Outcome::Unchanged);
}

#[test]
fn navigation_during_deferred_measure_is_busy() {
    let registry = fixtures::registry(&[("a", 1, None), ("b", 2, None), ("c", 3, None)]);
    let mut host = three_step_host();
    let (hooks, log) = RecordingHooks::new();
    let mut tour = Tour::new(registry).with_hooks(hooks);
    tour.start(&mut host, StartOptions::new()).unwrap();
    tour.next(&mut host).unwrap();
    log.clear();

    host.defer_measure = true;
    assert_eq!(tour.next(&mut host), Ok(Outcome::Pending));
    assert_eq!(tour.state(), TourState::Transitioning { from: 1, to: 2 });
    let pending = host.last_measure().unwrap();

    assert_eq!(tour.next(&mut host), Err(TourError::Busy));
    assert_eq!(tour.previous(&mut host), Err(TourError::Busy));
    assert_eq!(tour.go_to(&mut host, 0), Err(TourError::Busy));
    assert_eq!(tour.state(), TourState::Transitioning { from: 1, to: 2 });
    assert_eq!(log.count("before_change"), 1);

    host.defer_measure = false;
    assert_eq!(
        tour.measured(&mut host, pending, Some(rect_at(500.0))),
        Outcome::Committed { index: 2 }
    );
    assert_eq!(ids(&mut tour).as_deref(), Some("c"));
    assert_eq!(log.count("after_change"), 1);
}

#[test]
fn navigation_during_deferred_scroll_is_busy() {
    let registry = fixtures::registry(&[("a", 1, None), ("b", 2, None), ("c", 3, None)]);
    let mut host = ScriptedHost::phone()
        .with_target(1, rect_at(100.0))
        .with_target(2, rect_at(1500.0))
        .with_target(3, rect_at(2500.0))
        .with_container(9, Size::new(375.0, 3000.0))
        .in_container(1, 9)
        .in_container(2, 9)
        .in_container(3, 9);
    let mut tour = Tour::new(registry);
    tour.start(&mut host, StartOptions::new()).unwrap();

    host.defer_scroll = true;
    assert_eq!(tour.next(&mut host), Ok(Outcome::Pending));
    assert_eq!(tour.state(), TourState::Transitioning { from: 0, to: 1 });

    assert_eq!(tour.next(&mut host), Err(TourError::Busy));
    assert_eq!(tour.previous(&mut host), Err(TourError::Busy));
    assert_eq!(tour.go_to(&mut host, 2), Err(TourError::Busy));
    assert_eq!(host.scrolls().len(), 1, "rejected calls must not issue scrolls");

    let ticket = host.last_scroll().unwrap();
    assert_eq!(
        tour.scroll_settled(&mut host, ticket),
        Outcome::Committed { index: 1 }
    );
    assert_eq!(ids(&mut tour).as_deref(), Some("b"));
}

// ============================================================================
// Cancellation and timeouts
// ============================================================================

#[test]
fn exit_during_transition_goes_idle_and_ignores_late_replies() {
    let registry = fixtures::registry(&[("a", 1, None), ("b", 2, None)]);
    let mut host = three_step_host();
    let (hooks, log) = RecordingHooks::new();
    let mut tour = Tour::new(registry).with_hooks(hooks);
    tour.start(&mut host, StartOptions::new()).unwrap();

    host.defer_measure = true;
    assert_eq!(tour.next(&mut host), Ok(Outcome::Pending));
    assert_eq!(tour.state(), TourState::Transitioning { from: 0, to: 1 });
    let late = host.last_measure().unwrap();

    assert_eq!(tour.exit(false), Ok(Outcome::Exited(ExitReason::Forced)));
    assert_eq!(tour.state(), TourState::Idle);
    assert_eq!(log.count("before_exit"), 0);

    assert_eq!(
        tour.measured(&mut host, late, Some(rect_at(300.0))),
        Outcome::Unchanged
    );
    assert_eq!(tour.state(), TourState::Idle);
    assert_eq!(log.count("after_change"), 0);
}

#[test]
fn unsettled_scroll_times_out_and_commits() {
    let registry = fixtures::registry(&[("top", 1, None), ("deep", 2, None)]);
    let mut host = ScriptedHost::phone()
        .with_target(1, rect_at(100.0))
        .with_target(2, rect_at(1500.0))
        .with_container(9, Size::new(375.0, 3000.0))
        .in_container(1, 9)
        .in_container(2, 9);
    let (hooks, log) = RecordingHooks::new();
    let mut tour = Tour::new(registry)
        .with_hooks(hooks)
        .with_options(TourOptions::default().scroll_settle_timeout_ms(500));
    tour.start(&mut host, StartOptions::new()).unwrap();

    host.defer_scroll = true;
    assert_eq!(tour.next(&mut host), Ok(Outcome::Pending));
    assert_eq!(host.scrolls().len(), 1);
    assert!(host.scrolls()[0].animated);

    assert_eq!(tour.tick(&mut host, Duration::from_millis(300)), Outcome::Unchanged);
    assert_eq!(
        tour.tick(&mut host, Duration::from_millis(300)),
        Outcome::Committed { index: 1 }
    );
    assert_eq!(log.errors(), ["scroll_timeout"]);

    // The settle for the abandoned scroll arrives late.
    let late = host.last_scroll().unwrap();
    assert_eq!(tour.scroll_settled(&mut host, late), Outcome::Unchanged);
    assert_eq!(tour.state(), TourState::Active { index: 1 });
}

#[test]
fn settled_scroll_continues_to_commit() {
    let registry = fixtures::registry(&[("deep", 1, None)]);
    let mut host = ScriptedHost::phone()
        .with_target(1, rect_at(1500.0))
        .with_container(9, Size::new(375.0, 3000.0))
        .in_container(1, 9);
    host.defer_scroll = true;
    let mut tour = Tour::new(registry);

    assert_eq!(tour.start(&mut host, StartOptions::new()), Ok(Outcome::Pending));
    assert_eq!(tour.state(), TourState::Starting);
    let ticket = host.last_scroll().unwrap();
    assert_eq!(
        tour.scroll_settled(&mut host, ticket),
        Outcome::Committed { index: 0 }
    );
    let target = tour.snapshot().geometry.unwrap().target;
    assert!(host_viewport().contains_rect(&target));
}

// ============================================================================
// Unresolvable targets
// ============================================================================

#[test]
fn missing_target_is_skipped_with_a_warning() {
    let registry = fixtures::registry(&[("a", 1, None), ("ghost", 4, None), ("c", 3, None)]);
    let mut host = three_step_host();
    let (hooks, log) = RecordingHooks::new();
    let mut tour = Tour::new(registry).with_hooks(hooks);
    tour.start(&mut host, StartOptions::new()).unwrap();
    log.clear();

    assert_eq!(tour.next(&mut host), Ok(Outcome::Committed { index: 2 }));
    assert_eq!(ids(&mut tour).as_deref(), Some("c"));
    assert_eq!(log.errors(), ["target_not_found"]);
}

#[test]
fn nothing_resolvable_exits_with_reason() {
    let registry = fixtures::registry(&[("x", 7, None), ("y", 8, None)]);
    let mut host = ScriptedHost::phone();
    let (hooks, log) = RecordingHooks::new();
    let mut tour = Tour::new(registry).with_hooks(hooks);

    assert_eq!(
        tour.start(&mut host, StartOptions::new()),
        Ok(Outcome::Exited(ExitReason::NoResolvableStep))
    );
    assert_eq!(tour.state(), TourState::Idle);
    assert_eq!(
        log.errors(),
        ["target_not_found", "target_not_found", "no_resolvable_step"]
    );
    assert_eq!(tour.last_error(), Some(&TourError::NoResolvableStep));
    assert_eq!(log.count("on_start"), 0);
    assert_eq!(log.calls().last(), Some(&HookCall::Exit(ExitReason::NoResolvableStep)));
}

#[test]
fn unregistered_current_step_is_flagged_lost() {
    let registry = fixtures::registry(&[("a", 1, None), ("b", 2, None)]);
    let mut host = three_step_host();
    let (hooks, log) = RecordingHooks::new();
    let mut tour = Tour::new(registry.clone()).with_hooks(hooks);
    tour.start(&mut host, StartOptions::new()).unwrap();
    log.clear();

    registry.borrow_mut().unregister(&"a".into());
    let snap = tour.snapshot();
    assert!(snap.target_lost);
    assert_eq!(snap.index, Some(0));
    assert_eq!(snap.total, 2);
    assert_eq!(log.errors(), ["target_not_found"]);

    // Moving on drops the lost step from the sequence.
    assert_eq!(tour.next(&mut host), Ok(Outcome::Committed { index: 0 }));
    let snap = tour.snapshot();
    assert!(!snap.target_lost);
    assert_eq!(snap.total, 1);
}

#[test]
fn refresh_tracks_a_moved_target() {
    let registry = fixtures::registry(&[("a", 1, None)]);
    let mut host = three_step_host();
    let mut tour = Tour::new(registry);
    tour.start(&mut host, StartOptions::new()).unwrap();

    host.move_target(1, rect_at(400.0));
    assert_eq!(tour.refresh(&mut host), Ok(Outcome::Refreshed { index: 0 }));
    assert_eq!(tour.snapshot().geometry.unwrap().target, rect_at(400.0));
    assert!(host.scrolls().is_empty());

    host.remove_target(1);
    assert_eq!(tour.refresh(&mut host), Ok(Outcome::Unchanged));
    assert!(tour.snapshot().target_lost);
    assert_eq!(tour.state(), TourState::Active { index: 0 });
}

#[test]
fn late_registration_joins_the_running_sequence() {
    let registry = fixtures::registry(&[("a", 1, Some(0)), ("c", 3, Some(2))]);
    let mut host = three_step_host();
    let mut tour = Tour::new(registry.clone());
    tour.start(&mut host, StartOptions::new()).unwrap();

    registry
        .borrow_mut()
        .register("b", TargetHandle(2), fixtures::step("b").order(1));
    assert_eq!(tour.next(&mut host), Ok(Outcome::Committed { index: 1 }));
    assert_eq!(ids(&mut tour).as_deref(), Some("b"));
    assert_eq!(tour.snapshot().total, 3);
}

// ============================================================================
// Determinism
// ============================================================================

fn scripted_run() -> Transcript {
    let registry = fixtures::registry(&[("a", 1, Some(3)), ("b", 2, None), ("c", 3, Some(1))]);
    let mut host = three_step_host();
    let mut tour = Tour::new(registry);
    let mut transcript = Transcript::new();

    let outcome = tour.start(&mut host, StartOptions::new());
    transcript.note("start", outcome);
    transcript.tour("start", &tour.snapshot());
    while !tour.state().is_idle() {
        let outcome = tour.next(&mut host);
        transcript.note("next", outcome);
        transcript.tour("next", &tour.snapshot());
    }
    transcript
}

#[test]
fn identical_scripts_produce_identical_transcripts() {
    let first = scripted_run();
    let second = scripted_run();
    assert_eq!(first.lines(), second.lines());
    assert_eq!(first.checksum(), second.checksum());
    assert_eq!(first.len(), 8);
}
