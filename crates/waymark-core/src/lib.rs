#![forbid(unsafe_code)]

//! Core: geometry, data model, target registry, options, and errors.
//!
//! # Role in Waymark
//! `waymark-core` is the leaf of the workspace. It owns the types every other
//! crate speaks: rectangles in the shared coordinate space, step and hint
//! configuration, the [`Registry`] that maps stable ids to live handles, the
//! option structs, and the [`TourError`] taxonomy.
//!
//! # How it fits in the system
//! `waymark-layout` turns core rectangles into tooltip and cutout geometry.
//! `waymark-runtime` drives the tour and hint state machines over a
//! [`SharedRegistry`] and reports failures as [`TourError`] values.

pub mod error;
pub mod geometry;
pub mod hint;
pub mod id;
pub mod options;
pub mod preferences;
pub mod registry;
pub mod step;

pub use error::{Recovery, TourError, VetoHook};
pub use geometry::{Point, Rect, Sides, Size};
pub use hint::{
    HintConfig, HintDefaults, HintKind, HintOptions, HintPosition, HintSpot, ResolvedHintOptions,
    merge_hint_options,
};
pub use id::{TargetHandle, TargetId};
pub use options::{TourOption, TourOptions};
pub use preferences::{MemoryPreferences, PreferenceStore};
pub use registry::{Registry, SharedRegistry};
pub use step::{Placement, Position, ScrollBehavior, Step, StepConfig, StepContent};
