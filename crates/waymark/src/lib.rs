#![forbid(unsafe_code)]

//! Waymark public facade crate.
//!
//! Guided product tours and contextual hints for any UI toolkit. This crate
//! re-exports the stable surface of the internal crates and offers a
//! prelude for day-to-day use.
//!
//! ```ignore
//! use waymark::prelude::*;
//!
//! let registry = Registry::new().shared();
//! registry.borrow_mut().register("save", TargetHandle(1), StepConfig::new(StepContent::new("Save", "Keeps your draft")));
//!
//! let mut tour = Tour::new(registry.clone()).with_hooks(MyHooks);
//! tour.start(&mut host, StartOptions::new())?;
//! let frame = Snapshot::capture(&mut tour, &hints, &host);
//! ```

pub mod error;

pub use error::{AppAction, Error, Result};

// --- Core re-exports -------------------------------------------------------

pub use waymark_core::{
    HintConfig, HintDefaults, HintKind, HintOptions, HintPosition, MemoryPreferences, Placement,
    Point, Position, PreferenceStore, Recovery, Rect, Registry, ScrollBehavior, SharedRegistry,
    Sides, Size, Step, StepConfig, StepContent, TargetHandle, TargetId, TourError, TourOption,
    TourOptions, VetoHook,
};

// --- Layout re-exports -----------------------------------------------------

pub use waymark_layout::{Geometry, PlacementRequest, ScrollFrame, place};

// --- Runtime re-exports ----------------------------------------------------

pub use waymark_runtime::{
    ConfigError, Confirm, ExitReason, HintSession, HintSnapshot, HintView, Host, NoHooks, Outcome,
    ScrollContainerId, Snapshot, StartOptions, StepChange, Ticket, Tour, TourHooks, TourInput,
    TourSnapshot, TourState, WaymarkConfig,
};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Confirm, Error, ExitReason, HintOptions, HintSession, Host, Outcome, Rect, Registry,
        Result, Snapshot, StartOptions, StepConfig, StepContent, TargetHandle, TargetId, Tour,
        TourHooks, TourInput, TourOptions, TourState,
    };

    pub use crate::{core, layout, runtime};
}

pub use waymark_core as core;
pub use waymark_layout as layout;
pub use waymark_runtime as runtime;
