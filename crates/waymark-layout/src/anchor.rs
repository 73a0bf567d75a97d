#![forbid(unsafe_code)]

//! Hint indicator anchoring.

use waymark_core::{HintPosition, Point, Rect};

/// Where a hint's pulsing indicator is centered on its anchor rectangle.
///
/// In RTL layouts the horizontal side is mirrored.
#[must_use]
pub fn indicator_point(anchor: Rect, position: HintPosition, rtl: bool) -> Point {
    let position = if rtl { position.mirrored() } else { position };
    let (x, y) = match position {
        HintPosition::TopLeft => (anchor.left(), anchor.top()),
        HintPosition::Top => (anchor.center_x(), anchor.top()),
        HintPosition::TopRight => (anchor.right(), anchor.top()),
        HintPosition::Left => (anchor.left(), anchor.center_y()),
        HintPosition::Right => (anchor.right(), anchor.center_y()),
        HintPosition::BottomLeft => (anchor.left(), anchor.bottom()),
        HintPosition::Bottom => (anchor.center_x(), anchor.bottom()),
        HintPosition::BottomRight => (anchor.right(), anchor.bottom()),
    };
    Point::new(x, y)
}
