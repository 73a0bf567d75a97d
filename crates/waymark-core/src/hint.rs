#![forbid(unsafe_code)]

//! Hint spot data model and option merging.
//!
//! # Option precedence
//!
//! Every hint option is tri-state: unset, explicitly `true`, explicitly
//! `false`. Merging never conflates "unset" with "false":
//!
//! 1. a spot marked [`HintConfig::force_options`] keeps its explicit values;
//! 2. otherwise an explicit call-site value (from `show(options)`) applies;
//! 3. otherwise an explicit spot value applies;
//! 4. otherwise the global [`HintDefaults`] value applies.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::Size;
use crate::id::TargetId;
use crate::step::{Position, StepContent};

/// Where the pulsing indicator sits on the anchor element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum HintPosition {
    TopLeft,
    Top,
    #[default]
    TopRight,
    Left,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl HintPosition {
    #[must_use]
    pub const fn mirrored(self) -> Self {
        match self {
            Self::TopLeft => Self::TopRight,
            Self::TopRight => Self::TopLeft,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::BottomLeft => Self::BottomRight,
            Self::BottomRight => Self::BottomLeft,
            other => other,
        }
    }
}

/// Presentational tag forwarded to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum HintKind {
    #[default]
    Info,
    Warning,
    Success,
    Error,
}

/// Tri-state hint options. `None` means "not set here".
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HintOptions {
    /// Pulse the indicator.
    pub animated: Option<bool>,
    /// Opening this hint's dialog closes every other open dialog.
    pub close_others_on_open: Option<bool>,
    /// Requested dialog position relative to the anchor.
    pub dialog_position: Option<Position>,
}

impl HintOptions {
    #[must_use]
    pub fn animated(mut self, animated: bool) -> Self {
        self.animated = Some(animated);
        self
    }

    #[must_use]
    pub fn close_others_on_open(mut self, close: bool) -> Self {
        self.close_others_on_open = Some(close);
        self
    }

    #[must_use]
    pub fn dialog_position(mut self, position: Position) -> Self {
        self.dialog_position = Some(position);
        self
    }
}

/// Global hint defaults, applied when neither call site nor spot sets a value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HintDefaults {
    pub animated: bool,
    pub close_others_on_open: bool,
    pub dialog_position: Position,
    /// Estimated dialog size fed to the positioning engine.
    pub dialog_size: Size,
    /// Re-measure shown anchors this often (milliseconds). `None` disables it.
    pub auto_refresh_ms: Option<u64>,
    pub rtl: bool,
}

impl Default for HintDefaults {
    fn default() -> Self {
        Self {
            animated: true,
            close_others_on_open: false,
            dialog_position: Position::Auto,
            dialog_size: Size::new(260.0, 120.0),
            auto_refresh_ms: None,
            rtl: false,
        }
    }
}

impl HintDefaults {
    #[must_use]
    pub fn auto_refresh_ms(mut self, interval: u64) -> Self {
        self.auto_refresh_ms = Some(interval);
        self
    }

    #[must_use]
    pub fn dialog_size(mut self, size: Size) -> Self {
        self.dialog_size = size;
        self
    }

    #[must_use]
    pub fn rtl(mut self, rtl: bool) -> Self {
        self.rtl = rtl;
        self
    }

    /// Validate parameters; an empty list means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.dialog_size.width <= 0.0 || self.dialog_size.height <= 0.0 {
            errors.push(format!(
                "hints.dialog_size must be positive, got {}x{}",
                self.dialog_size.width, self.dialog_size.height
            ));
        }
        if self.auto_refresh_ms == Some(0) {
            errors.push("hints.auto_refresh_ms must be > 0 when set".into());
        }
        errors
    }
}

/// Per-spot configuration supplied at registration.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HintConfig {
    pub content: StepContent,
    pub position: HintPosition,
    pub kind: HintKind,
    /// Spot-level options. Options passed to `show` override these unless
    /// `force_options` is set; unset fields fall through to the defaults.
    pub options: HintOptions,
    /// Explicit spot options beat call-site options.
    pub force_options: bool,
}

impl HintConfig {
    #[must_use]
    pub fn new(content: StepContent) -> Self {
        Self {
            content,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn position(mut self, position: HintPosition) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: HintKind) -> Self {
        self.kind = kind;
        self
    }

    /// Spot-level options; call-site options win unless [`force_options`](Self::force_options) is set.
    #[must_use]
    pub fn options(mut self, options: HintOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn force_options(mut self, force: bool) -> Self {
        self.force_options = force;
        self
    }
}

/// A registered hint spot.
#[derive(Debug, Clone, PartialEq)]
pub struct HintSpot {
    pub id: TargetId,
    pub config: HintConfig,
    pub seq: u64,
}

/// Fully merged hint options for one spot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedHintOptions {
    pub animated: bool,
    pub close_others_on_open: bool,
    pub dialog_position: Position,
}

/// Merge global defaults, call-site options, and a spot's own options.
#[must_use]
pub fn merge_hint_options(
    defaults: &HintDefaults,
    call_site: &HintOptions,
    spot: &HintConfig,
) -> ResolvedHintOptions {
    let forced = spot.force_options;
    let own = &spot.options;
    ResolvedHintOptions {
        animated: pick(forced, own.animated, call_site.animated, defaults.animated),
        close_others_on_open: pick(
            forced,
            own.close_others_on_open,
            call_site.close_others_on_open,
            defaults.close_others_on_open,
        ),
        dialog_position: pick(
            forced,
            own.dialog_position,
            call_site.dialog_position,
            defaults.dialog_position,
        ),
    }
}

fn pick<T: Copy>(forced: bool, spot: Option<T>, call: Option<T>, default: T) -> T {
    match (spot, call) {
        (Some(s), _) if forced => s,
        (_, Some(c)) => c,
        (Some(s), None) => s,
        (None, None) => default,
    }
}
