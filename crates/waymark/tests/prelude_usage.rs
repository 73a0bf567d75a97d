//! The prelude is enough to run a tour end to end.

use waymark::prelude::*;
use waymark_harness::{RecordingHooks, ScriptedHost};

fn run() -> waymark::Result<Vec<&'static str>> {
    let mut registry = Registry::new();
    registry.register("save", TargetHandle(1), StepConfig::new(StepContent::new("Save", "")));
    registry.register("share", TargetHandle(2), StepConfig::new(StepContent::new("Share", "")));
    let registry = registry.shared();

    let mut host = ScriptedHost::phone()
        .with_target(1, Rect::new(20.0, 100.0, 60.0, 30.0))
        .with_target(2, Rect::new(20.0, 300.0, 60.0, 30.0));
    let (hooks, log) = RecordingHooks::new();
    let mut tour = Tour::new(registry.clone()).with_hooks(hooks);
    let hints = HintSession::new(registry);

    tour.start(&mut host, StartOptions::new())?;
    tour.handle_input(&mut host, TourInput::NextKey)?;
    let frame = Snapshot::capture(&mut tour, &hints, &host);
    assert_eq!(frame.tour.state, TourState::Active { index: 1 });
    assert!(frame.tour.is_last);
    tour.next(&mut host)?;
    Ok(log.names())
}

#[test]
fn tour_runs_through_the_prelude() {
    let names = run().expect("tour runs");
    assert_eq!(names.last(), Some(&"on_exit"));
    assert!(names.contains(&"on_complete"));
}

#[test]
fn usage_errors_convert_into_the_facade_error() {
    let mut host = ScriptedHost::phone();
    let mut tour = Tour::new(Registry::new().shared());
    let err: waymark::Error = tour.next(&mut host).unwrap_err().into();
    assert_eq!(err.action(), waymark::AppAction::Fix);
    assert_eq!(err.error_type(), "not_active");
}
