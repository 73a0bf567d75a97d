#![forbid(unsafe_code)]

//! The host port: measurement adapter and scroll commands.
//!
//! The engine never touches a UI tree. Everything it needs from the outside
//! world goes through [`Host`]. Operations that may complete later return
//! [`Poll::Pending`]; the host then reports the result to the issuing state
//! machine together with the [`Ticket`] it was given.

use std::task::Poll;

use waymark_core::{Point, Rect, Size, TargetHandle, TargetId};
use waymark_layout::ScrollFrame;

use crate::ticket::Ticket;

/// Identifies a scrollable container known to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScrollContainerId(pub u64);

/// Measurement and scrolling capabilities supplied by the embedding UI.
pub trait Host {
    /// Visible screen bounds in the shared coordinate space.
    fn viewport(&self) -> Rect;

    /// Bounding rectangle of a live element.
    ///
    /// `Ready(None)` means the element is gone (unmounted). `Pending` means the
    /// host will deliver the answer later under `ticket`.
    fn measure(&mut self, ticket: Ticket, handle: TargetHandle) -> Poll<Option<Rect>>;

    /// The scroll container enclosing `handle`, if any, and its current state.
    fn scroll_frame(&self, handle: TargetHandle) -> Option<(ScrollContainerId, ScrollFrame)>;

    /// Scroll `container` to `offset`.
    ///
    /// `Ready` means the offset is already applied. `Pending` means the host
    /// will report settling under `ticket`.
    fn scroll_to(
        &mut self,
        ticket: Ticket,
        container: ScrollContainerId,
        offset: Point,
        animated: bool,
    ) -> Poll<()>;

    /// Measured tooltip size for a step, when the renderer knows it.
    fn tooltip_size(&self, _id: &TargetId) -> Option<Size> {
        None
    }
}
