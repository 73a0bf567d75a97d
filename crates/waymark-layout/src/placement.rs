#![forbid(unsafe_code)]

//! Tooltip placement and spotlight cutout computation.
//!
//! [`place`] is a pure function: identical [`PlacementRequest`]s always yield
//! identical [`Geometry`]. It never touches the host.
//!
//! # Algorithm
//!
//! 1. `floating` ignores the target: the tooltip is centered in the viewport
//!    and there is no cutout.
//! 2. RTL mirrors left/right sides and sub-positions before anything else.
//! 3. A concrete request is laid out against its target edge and clamped.
//! 4. `auto` tries [`AUTO_PREFERENCE`] in order. A candidate fits when it does
//!    not overflow on its main axis and its cross size fits the viewport (the
//!    cross axis is shifted later). The first fitting candidate wins; if none
//!    fit, the one with the least overflow wins, ties going to the earlier
//!    candidate.
//! 5. The chosen rectangle is clamped into the viewport axis by axis, moving
//!    only as far as needed and never resizing.
//! 6. The cutout is the target grown by the highlight padding.
//!
//! # Example
//!
//! ```
//! use waymark_core::{Placement, Position, Rect, Size};
//! use waymark_layout::placement::{PlacementRequest, place};
//!
//! let req = PlacementRequest::new(
//!     Rect::new(10.0, 700.0, 100.0, 40.0),
//!     Size::new(200.0, 120.0),
//!     Rect::from_size(375.0, 800.0),
//! )
//! .position(Position::Auto);
//!
//! let geometry = place(&req);
//! assert_eq!(geometry.placement, Placement::Top);
//! assert!(Rect::from_size(375.0, 800.0).contains_rect(&geometry.tooltip));
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use waymark_core::{Placement, Point, Position, Rect, Size};

/// Candidate order for `auto` (before RTL mirroring).
pub const AUTO_PREFERENCE: [Placement; 4] = [
    Placement::Bottom,
    Placement::Top,
    Placement::Right,
    Placement::Left,
];

/// Inputs to the positioning engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementRequest {
    /// Target rectangle in the shared coordinate space.
    pub target: Rect,
    /// Measured or estimated tooltip size.
    pub tooltip: Size,
    /// Visible bounds, already reduced by any reserved chrome.
    pub viewport: Rect,
    pub position: Position,
    /// When `false`, `auto` resolves straight to `bottom`.
    pub auto_position: bool,
    pub rtl: bool,
    /// Gap between target edge and tooltip.
    pub offset: f32,
    /// Padding added around the target to form the cutout.
    pub highlight_padding: f32,
}

impl PlacementRequest {
    /// Create a request with `auto` position and default spacing.
    #[must_use]
    pub fn new(target: Rect, tooltip: Size, viewport: Rect) -> Self {
        Self {
            target,
            tooltip,
            viewport,
            position: Position::Auto,
            auto_position: true,
            rtl: false,
            offset: 12.0,
            highlight_padding: 8.0,
        }
    }

    #[must_use]
    pub fn position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub fn auto_position(mut self, auto: bool) -> Self {
        self.auto_position = auto;
        self
    }

    #[must_use]
    pub fn rtl(mut self, rtl: bool) -> Self {
        self.rtl = rtl;
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: f32) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn highlight_padding(mut self, padding: f32) -> Self {
        self.highlight_padding = padding;
        self
    }
}

/// Output of one positioning run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Geometry {
    /// The target rectangle the result was computed from.
    pub target: Rect,
    /// Resolved placement. Never `auto`.
    pub placement: Placement,
    /// Final tooltip rectangle.
    pub tooltip: Rect,
    /// Point on the target edge the tooltip arrow should aim at.
    pub anchor: Point,
    /// Spotlight hole. `None` for floating tooltips.
    pub cutout: Option<Rect>,
    /// Whether clamping moved the tooltip.
    pub clamped: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Start,
    Center,
    End,
}

fn split(placement: Placement) -> Option<(Side, Align)> {
    Some(match placement {
        Placement::Top | Placement::TopMiddle => (Side::Top, Align::Center),
        Placement::TopLeft => (Side::Top, Align::Start),
        Placement::TopRight => (Side::Top, Align::End),
        Placement::Bottom | Placement::BottomMiddle => (Side::Bottom, Align::Center),
        Placement::BottomLeft => (Side::Bottom, Align::Start),
        Placement::BottomRight => (Side::Bottom, Align::End),
        Placement::Left => (Side::Left, Align::Center),
        Placement::Right => (Side::Right, Align::Center),
        Placement::Floating => return None,
    })
}

/// Run the positioning engine.
#[must_use]
pub fn place(req: &PlacementRequest) -> Geometry {
    let requested = match req.position {
        Position::Auto if !req.auto_position => Position::Bottom,
        other => other,
    };

    let placement = match requested.concrete() {
        Some(Placement::Floating) => return floating(req),
        Some(p) if req.rtl => p.mirrored(),
        Some(p) => p,
        None => resolve_auto(req),
    };

    let raw = tooltip_rect(req.target, req.tooltip, placement, req.offset);
    finish(req, placement, raw)
}

/// Lay out the tooltip for one concrete placement, before clamping.
#[must_use]
pub fn tooltip_rect(target: Rect, size: Size, placement: Placement, offset: f32) -> Rect {
    let Some((side, align)) = split(placement) else {
        return Rect::from_origin_size(
            Point::new(target.center_x() - size.width / 2.0, target.center_y() - size.height / 2.0),
            size,
        );
    };

    let x = match side {
        Side::Left => target.left() - offset - size.width,
        Side::Right => target.right() + offset,
        Side::Top | Side::Bottom => match align {
            Align::Start => target.left(),
            Align::Center => target.center_x() - size.width / 2.0,
            Align::End => target.right() - size.width,
        },
    };
    let y = match side {
        Side::Top => target.top() - offset - size.height,
        Side::Bottom => target.bottom() + offset,
        Side::Left | Side::Right => target.center_y() - size.height / 2.0,
    };

    Rect::from_origin_size(Point::new(x, y), size)
}

fn resolve_auto(req: &PlacementRequest) -> Placement {
    let mut best: Option<(Placement, f32)> = None;

    for candidate in AUTO_PREFERENCE {
        let candidate = if req.rtl {
            candidate.mirrored()
        } else {
            candidate
        };
        let rect = tooltip_rect(req.target, req.tooltip, candidate, req.offset);
        let overflow = candidate_overflow(&rect, candidate, &req.viewport);
        if overflow <= 0.0 {
            return candidate;
        }
        // Strict comparison keeps the earlier candidate on ties.
        if best.is_none_or(|(_, least)| overflow < least) {
            best = Some((candidate, overflow));
        }
    }

    best.map_or(Placement::Bottom, |(p, _)| p)
}

/// Overflow that clamping cannot fix without covering the target.
fn candidate_overflow(rect: &Rect, placement: Placement, viewport: &Rect) -> f32 {
    let o = rect.overflow(viewport);
    match split(placement) {
        Some((Side::Top | Side::Bottom, _)) => {
            o.top + o.bottom + (rect.width - viewport.width).max(0.0)
        }
        Some((Side::Left | Side::Right, _)) => {
            o.left + o.right + (rect.height - viewport.height).max(0.0)
        }
        None => o.total(),
    }
}

fn finish(req: &PlacementRequest, placement: Placement, raw: Rect) -> Geometry {
    let tooltip = raw.clamp_within(&req.viewport);
    Geometry {
        target: req.target,
        placement,
        tooltip,
        anchor: anchor_point(&req.target, &tooltip, placement),
        cutout: Some(req.target.expand(req.highlight_padding)),
        clamped: tooltip != raw,
    }
}

fn floating(req: &PlacementRequest) -> Geometry {
    let vp = req.viewport;
    let raw = Rect::from_origin_size(
        Point::new(
            vp.x + (vp.width - req.tooltip.width) / 2.0,
            vp.y + (vp.height - req.tooltip.height) / 2.0,
        ),
        req.tooltip,
    );
    let tooltip = raw.clamp_within(&vp);
    Geometry {
        target: req.target,
        placement: Placement::Floating,
        tooltip,
        anchor: tooltip.center(),
        cutout: None,
        clamped: tooltip != raw,
    }
}

/// Point on the target edge facing the tooltip, kept within the tooltip's span.
fn anchor_point(target: &Rect, tooltip: &Rect, placement: Placement) -> Point {
    let along_x = target.center_x().clamp(tooltip.left(), tooltip.right().max(tooltip.left()));
    let along_y = target.center_y().clamp(tooltip.top(), tooltip.bottom().max(tooltip.top()));
    match split(placement) {
        Some((Side::Top, _)) => Point::new(along_x, target.top()),
        Some((Side::Bottom, _)) => Point::new(along_x, target.bottom()),
        Some((Side::Left, _)) => Point::new(target.left(), along_y),
        Some((Side::Right, _)) => Point::new(target.right(), along_y),
        None => tooltip.center(),
    }
}
