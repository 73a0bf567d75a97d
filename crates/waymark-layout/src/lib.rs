#![forbid(unsafe_code)]

//! Pure geometry for tours and hints.
//!
//! # Role in Waymark
//! `waymark-layout` holds every computation that depends only on rectangles:
//! the positioning engine ([`place`]), hint indicator anchoring
//! ([`indicator_point`]), and scroll-into-view math ([`reveal_offset`]).
//! Nothing here performs I/O or keeps state, so results are reproducible and
//! testable in isolation from any renderer.

pub mod anchor;
pub mod placement;
pub mod scroll;

pub use anchor::indicator_point;
pub use placement::{AUTO_PREFERENCE, Geometry, PlacementRequest, place, tooltip_rect};
pub use scroll::{ScrollFrame, reveal_offset};
