#![forbid(unsafe_code)]

//! Scroll-into-view math.
//!
//! Given where a target sits relative to a scroll container's visible window,
//! compute the smallest offset change that brings the (padded) target fully
//! into view. Scrolling by `+d` along an axis moves content by `-d` on screen.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use waymark_core::{Point, Rect, Sides, Size};

/// Offsets below this distance are treated as "already there".
const EPSILON: f32 = 0.5;

/// A scroll container's current state, in the shared coordinate space.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScrollFrame {
    /// Visible window of the container.
    pub viewport: Rect,
    /// Current scroll offset.
    pub offset: Point,
    /// Total scrollable content size.
    pub content: Size,
}

impl ScrollFrame {
    #[must_use]
    pub fn new(viewport: Rect, offset: Point, content: Size) -> Self {
        Self {
            viewport,
            offset,
            content,
        }
    }

    /// Largest valid offset on each axis.
    #[must_use]
    pub fn max_offset(&self) -> Point {
        Point::new(
            (self.content.width - self.viewport.width).max(0.0),
            (self.content.height - self.viewport.height).max(0.0),
        )
    }

    /// Where `target` would appear after scrolling to `offset`.
    #[must_use]
    pub fn project(&self, target: Rect, offset: Point) -> Rect {
        target.translate(self.offset.x - offset.x, self.offset.y - offset.y)
    }
}

/// Offset that reveals `target` grown by `padding`, or `None` if no scroll is needed.
///
/// Targets larger than the window are aligned to its leading edge. The
/// result is clamped to the container's scroll range.
#[must_use]
pub fn reveal_offset(target: Rect, frame: &ScrollFrame, padding: Sides) -> Option<Point> {
    let want = Rect::new(
        target.x - padding.left,
        target.y - padding.top,
        target.width + padding.horizontal(),
        target.height + padding.vertical(),
    );
    let window = frame.viewport;
    let dx = axis_delta(want.x, want.width, window.x, window.width);
    let dy = axis_delta(want.y, want.height, window.y, window.height);

    let max = frame.max_offset();
    let next = Point::new(
        (frame.offset.x + dx).clamp(0.0, max.x),
        (frame.offset.y + dy).clamp(0.0, max.y),
    );

    let moved = (next.x - frame.offset.x).abs() >= EPSILON
        || (next.y - frame.offset.y).abs() >= EPSILON;
    moved.then_some(next)
}

fn axis_delta(start: f32, len: f32, win_start: f32, win_len: f32) -> f32 {
    let end = start + len;
    let win_end = win_start + win_len;
    if len > win_len || start < win_start {
        start - win_start
    } else if end > win_end {
        end - win_end
    } else {
        0.0
    }
}
