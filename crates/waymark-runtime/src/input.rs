#![forbid(unsafe_code)]

//! Routing of user input to tour actions.
//!
//! | Input          | Option                  | Action        |
//! |----------------|-------------------------|---------------|
//! | `OverlayClick` | `exit_on_overlay_click` | `exit(false)` |
//! | `Escape`       | `exit_on_esc`           | `exit(false)` |
//! | `NextKey`      | `keyboard_navigation`   | `next()`      |
//! | `PreviousKey`  | `keyboard_navigation`   | `previous()`  |
//!
//! Input while idle, or while a transition is in flight, is dropped.

use waymark_core::TourError;

use crate::host::Host;
use crate::tour::{Outcome, Tour};

/// A user gesture the tour may react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TourInput {
    OverlayClick,
    Escape,
    NextKey,
    PreviousKey,
}

impl Tour {
    /// Route one input event according to the current options.
    pub fn handle_input(&mut self, host: &mut dyn Host, input: TourInput) -> Result<Outcome, TourError> {
        if self.state().is_idle() {
            return Ok(Outcome::Unchanged);
        }
        let (on_click, on_esc, keys) = {
            let o = self.options();
            (o.exit_on_overlay_click, o.exit_on_esc, o.keyboard_navigation)
        };
        let result = match input {
            TourInput::OverlayClick if on_click => self.exit(false),
            TourInput::Escape if on_esc => self.exit(false),
            TourInput::NextKey if keys => self.next(host),
            TourInput::PreviousKey if keys => self.previous(host),
            _ => return Ok(Outcome::Unchanged),
        };
        match result {
            Err(TourError::Busy) => {
                tracing::debug!(target: "waymark.tour", ?input, "input dropped while busy");
                Ok(Outcome::Unchanged)
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::ExitReason;
    use crate::testing::FakeHost;
    use crate::tour::{StartOptions, TourState};
    use waymark_core::{Rect, Registry, StepConfig, StepContent, TargetHandle, TourOption};

    fn running() -> (Tour, FakeHost) {
        let mut registry = Registry::new();
        registry.register("a", TargetHandle(1), StepConfig::new(StepContent::default()));
        registry.register("b", TargetHandle(2), StepConfig::new(StepContent::default()));
        let mut host = FakeHost::new(Rect::from_size(375.0, 800.0))
            .with_rect(1, Rect::new(0.0, 100.0, 50.0, 20.0))
            .with_rect(2, Rect::new(0.0, 300.0, 50.0, 20.0));
        let mut tour = Tour::new(registry.shared());
        tour.start(&mut host, StartOptions::new()).unwrap();
        (tour, host)
    }

    #[test]
    fn keys_navigate() {
        let (mut tour, mut host) = running();
        assert_eq!(
            tour.handle_input(&mut host, TourInput::NextKey),
            Ok(Outcome::Committed { index: 1 })
        );
        assert_eq!(
            tour.handle_input(&mut host, TourInput::PreviousKey),
            Ok(Outcome::Committed { index: 0 })
        );
    }

    #[test]
    fn disabled_bindings_are_ignored() {
        let (mut tour, mut host) = running();
        tour.set_option(TourOption::ExitOnEsc(false));
        tour.set_option(TourOption::KeyboardNavigation(false));
        assert_eq!(tour.handle_input(&mut host, TourInput::Escape), Ok(Outcome::Unchanged));
        assert_eq!(tour.handle_input(&mut host, TourInput::NextKey), Ok(Outcome::Unchanged));
        assert_eq!(tour.state(), TourState::Active { index: 0 });
    }

    #[test]
    fn overlay_click_exits() {
        let (mut tour, mut host) = running();
        assert_eq!(
            tour.handle_input(&mut host, TourInput::OverlayClick),
            Ok(Outcome::Exited(ExitReason::User))
        );
        assert_eq!(
            tour.handle_input(&mut host, TourInput::Escape),
            Ok(Outcome::Unchanged)
        );
    }

    #[test]
    fn busy_input_is_dropped() {
        let (mut tour, mut host) = running();
        host.pending_measure = true;
        assert_eq!(tour.handle_input(&mut host, TourInput::NextKey), Ok(Outcome::Pending));
        assert_eq!(tour.handle_input(&mut host, TourInput::NextKey), Ok(Outcome::Unchanged));
    }
}
