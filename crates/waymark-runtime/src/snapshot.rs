#![forbid(unsafe_code)]

//! Read-only render snapshots.
//!
//! The renderer paints whatever these say. They are plain values: nothing in
//! a snapshot borrows from, or calls back into, the state machines.

use std::collections::BTreeSet;

use waymark_core::{HintKind, HintPosition, Point, Step, TargetId, TourError};
use waymark_layout::Geometry;

use crate::hints::HintSession;
use crate::host::Host;
use crate::tour::{Tour, TourState};

/// Tour view for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TourSnapshot {
    pub state: TourState,
    /// The step on screen (the source step while transitioning).
    pub step: Option<Step>,
    pub index: Option<usize>,
    /// Length of the filtered sequence.
    pub total: usize,
    pub is_first: bool,
    pub is_last: bool,
    pub geometry: Option<Geometry>,
    /// Block interaction with the highlighted element.
    pub disable_interaction: bool,
    /// The current step's target was unregistered or could not be re-measured.
    pub target_lost: bool,
    pub overlay_opacity: f32,
    pub last_error: Option<TourError>,
}

impl TourSnapshot {
    pub(crate) fn idle(overlay_opacity: f32, last_error: Option<TourError>) -> Self {
        Self {
            state: TourState::Idle,
            step: None,
            index: None,
            total: 0,
            is_first: false,
            is_last: false,
            geometry: None,
            disable_interaction: false,
            target_lost: false,
            overlay_opacity,
            last_error,
        }
    }
}

/// One hint as the renderer needs it.
#[derive(Debug, Clone, PartialEq)]
pub struct HintView {
    pub id: TargetId,
    pub kind: HintKind,
    pub position: HintPosition,
    pub animated: bool,
    /// Indicator center. `None` until the anchor has been measured.
    pub indicator: Option<Point>,
    /// Dialog placement, for open hints with a measured anchor.
    pub dialog: Option<Geometry>,
}

/// Hint view for one frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HintSnapshot {
    pub visible: BTreeSet<TargetId>,
    pub open: BTreeSet<TargetId>,
    /// Visible hints in registration order.
    pub hints: Vec<HintView>,
}

/// Everything a renderer consumes per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub tour: TourSnapshot,
    pub hints: HintSnapshot,
}

impl Snapshot {
    /// Capture both state machines at once.
    pub fn capture(tour: &mut Tour, hints: &HintSession, host: &dyn Host) -> Self {
        Self {
            tour: tour.snapshot(),
            hints: hints.snapshot(host),
        }
    }
}
