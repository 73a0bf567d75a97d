#![forbid(unsafe_code)]

//! Tour step data model.
//!
//! A [`Step`] is one stop of a tour. Its configuration is supplied by the
//! registration component that owns the target element; its handle lives in
//! the [`Registry`](crate::registry::Registry) and is resolved lazily.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::id::TargetId;

/// Requested tooltip position relative to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Position {
    Top,
    TopLeft,
    TopMiddle,
    TopRight,
    Bottom,
    BottomLeft,
    BottomMiddle,
    BottomRight,
    Left,
    Right,
    /// Let the positioning engine pick the best fitting side.
    #[default]
    Auto,
    /// Centered in the viewport, detached from the target.
    Floating,
}

/// A concrete, resolved tooltip placement. Never `auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Placement {
    Top,
    TopLeft,
    TopMiddle,
    TopRight,
    Bottom,
    BottomLeft,
    BottomMiddle,
    BottomRight,
    Left,
    Right,
    Floating,
}

impl Position {
    pub const ALL: [Position; 12] = [
        Self::Top,
        Self::TopLeft,
        Self::TopMiddle,
        Self::TopRight,
        Self::Bottom,
        Self::BottomLeft,
        Self::BottomMiddle,
        Self::BottomRight,
        Self::Left,
        Self::Right,
        Self::Auto,
        Self::Floating,
    ];

    /// The concrete placement this request names, or `None` for `Auto`.
    #[must_use]
    pub const fn concrete(self) -> Option<Placement> {
        Some(match self {
            Self::Top => Placement::Top,
            Self::TopLeft => Placement::TopLeft,
            Self::TopMiddle => Placement::TopMiddle,
            Self::TopRight => Placement::TopRight,
            Self::Bottom => Placement::Bottom,
            Self::BottomLeft => Placement::BottomLeft,
            Self::BottomMiddle => Placement::BottomMiddle,
            Self::BottomRight => Placement::BottomRight,
            Self::Left => Placement::Left,
            Self::Right => Placement::Right,
            Self::Floating => Placement::Floating,
            Self::Auto => return None,
        })
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self.concrete() {
            Some(p) => p.as_str(),
            None => "auto",
        }
    }
}

impl Placement {
    /// Swap left and right (sides and sub-positions) for right-to-left layouts.
    #[must_use]
    pub const fn mirrored(self) -> Self {
        match self {
            Self::TopLeft => Self::TopRight,
            Self::TopRight => Self::TopLeft,
            Self::BottomLeft => Self::BottomRight,
            Self::BottomRight => Self::BottomLeft,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            other => other,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::TopLeft => "top-left",
            Self::TopMiddle => "top-middle",
            Self::TopRight => "top-right",
            Self::Bottom => "bottom",
            Self::BottomLeft => "bottom-left",
            Self::BottomMiddle => "bottom-middle",
            Self::BottomRight => "bottom-right",
            Self::Left => "left",
            Self::Right => "right",
            Self::Floating => "floating",
        }
    }
}

impl From<Placement> for Position {
    fn from(p: Placement) -> Self {
        match p {
            Placement::Top => Self::Top,
            Placement::TopLeft => Self::TopLeft,
            Placement::TopMiddle => Self::TopMiddle,
            Placement::TopRight => Self::TopRight,
            Placement::Bottom => Self::Bottom,
            Placement::BottomLeft => Self::BottomLeft,
            Placement::BottomMiddle => Self::BottomMiddle,
            Placement::BottomRight => Self::BottomRight,
            Placement::Left => Self::Left,
            Placement::Right => Self::Right,
            Placement::Floating => Self::Floating,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown position name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePositionError(pub String);

impl fmt::Display for ParsePositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown position: {:?}", self.0)
    }
}

impl std::error::Error for ParsePositionError {}

impl FromStr for Position {
    type Err = ParsePositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ParsePositionError(s.to_owned()))
    }
}

/// How the sequencer brings a step's target into view before highlighting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ScrollBehavior {
    /// Scroll until the target element is visible.
    #[default]
    Element,
    /// Scroll until the target and its tooltip are visible.
    Tooltip,
    /// Never scroll.
    Off,
}

/// Title and body shown in a tooltip or hint dialog. Opaque to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepContent {
    pub title: String,
    pub body: String,
}

impl StepContent {
    #[must_use]
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Per-step configuration supplied at registration.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StepConfig {
    pub content: StepContent,
    /// Explicit order. Steps without one use their registration order.
    pub order: Option<i64>,
    pub position: Position,
    pub scroll: ScrollBehavior,
    /// Block taps on the highlighted target while this step is shown.
    pub disable_interaction: bool,
    /// Optional group tag; `start` may filter on it.
    pub group: Option<String>,
}

impl StepConfig {
    #[must_use]
    pub fn new(content: StepContent) -> Self {
        Self {
            content,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }

    #[must_use]
    pub fn position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub fn scroll(mut self, scroll: ScrollBehavior) -> Self {
        self.scroll = scroll;
        self
    }

    #[must_use]
    pub fn disable_interaction(mut self, disable: bool) -> Self {
        self.disable_interaction = disable;
        self
    }

    #[must_use]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// A registered step: identity, configuration, and registration sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub id: TargetId,
    pub config: StepConfig,
    /// Monotonic registration sequence number. Kept across re-registration.
    pub seq: u64,
}

impl Step {
    /// Sort key: explicit order (or registration sequence), then registration sequence.
    #[must_use]
    pub fn order_key(&self) -> (i64, u64) {
        let seq = i64::try_from(self.seq).unwrap_or(i64::MAX);
        (self.config.order.unwrap_or(seq), self.seq)
    }

    /// Whether the step belongs to `group` (`None` matches every step).
    #[must_use]
    pub fn in_group(&self, group: Option<&str>) -> bool {
        match group {
            None => true,
            Some(g) => self.config.group.as_deref() == Some(g),
        }
    }
}
