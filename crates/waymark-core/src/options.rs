#![forbid(unsafe_code)]

//! Tour options.
//!
//! [`TourOptions`] is constructed explicitly and handed to the tour at
//! construction or at `start`; nothing reads ambient global state. Single
//! options can be changed at any time through [`TourOption`], and take effect
//! on the next geometry computation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::{Sides, Size};

/// Options that shape sequencing, scrolling, and positioning.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TourOptions {
    /// When `false`, `start` is a no-op.
    pub is_active: bool,
    /// Restrict the sequence to steps carrying this group tag.
    pub group: Option<String>,
    /// Reserved viewport margin (status bar, tab bar) excluded from both the
    /// scroll window and the positioning viewport.
    pub scroll_padding: Sides,
    pub exit_on_overlay_click: bool,
    pub exit_on_esc: bool,
    pub keyboard_navigation: bool,
    /// Dimming opacity forwarded to the renderer, in `0.0..=1.0`.
    pub overlay_opacity: f32,
    /// Padding between the target and the spotlight cutout edge.
    pub highlight_padding: f32,
    /// Allow `auto` positions to pick the best side. When off, `auto` means bottom.
    pub auto_position: bool,
    /// Gap between the target and the tooltip.
    pub tooltip_offset: f32,
    /// Tooltip size estimate used when the host cannot measure one.
    pub tooltip_size: Size,
    /// Ceiling for waiting on a scroll to settle, in milliseconds.
    pub scroll_settle_timeout_ms: u64,
    /// Animate scrolls issued by the scroll coordinator.
    pub animate_scroll: bool,
    /// Mirror left/right placements.
    pub rtl: bool,
    /// Preference key for "don't show again". `None` disables the check.
    pub dont_show_again_key: Option<String>,
}

impl Default for TourOptions {
    fn default() -> Self {
        Self {
            is_active: true,
            group: None,
            scroll_padding: Sides::ZERO,
            exit_on_overlay_click: true,
            exit_on_esc: true,
            keyboard_navigation: true,
            overlay_opacity: 0.6,
            highlight_padding: 8.0,
            auto_position: true,
            tooltip_offset: 12.0,
            tooltip_size: Size::new(300.0, 150.0),
            scroll_settle_timeout_ms: 600,
            animate_scroll: true,
            rtl: false,
            dont_show_again_key: None,
        }
    }
}

impl TourOptions {
    #[must_use]
    pub fn is_active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }

    #[must_use]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    #[must_use]
    pub fn scroll_padding(mut self, padding: Sides) -> Self {
        self.scroll_padding = padding;
        self
    }

    #[must_use]
    pub fn highlight_padding(mut self, padding: f32) -> Self {
        self.highlight_padding = padding;
        self
    }

    #[must_use]
    pub fn overlay_opacity(mut self, opacity: f32) -> Self {
        self.overlay_opacity = opacity;
        self
    }

    #[must_use]
    pub fn auto_position(mut self, auto: bool) -> Self {
        self.auto_position = auto;
        self
    }

    #[must_use]
    pub fn tooltip_size(mut self, size: Size) -> Self {
        self.tooltip_size = size;
        self
    }

    #[must_use]
    pub fn tooltip_offset(mut self, offset: f32) -> Self {
        self.tooltip_offset = offset;
        self
    }

    #[must_use]
    pub fn scroll_settle_timeout_ms(mut self, ms: u64) -> Self {
        self.scroll_settle_timeout_ms = ms;
        self
    }

    #[must_use]
    pub fn rtl(mut self, rtl: bool) -> Self {
        self.rtl = rtl;
        self
    }

    #[must_use]
    pub fn dont_show_again_key(mut self, key: impl Into<String>) -> Self {
        self.dont_show_again_key = Some(key.into());
        self
    }

    /// Apply a single option change.
    pub fn apply(&mut self, option: TourOption) {
        match option {
            TourOption::IsActive(v) => self.is_active = v,
            TourOption::Group(v) => self.group = v,
            TourOption::ScrollPadding(v) => self.scroll_padding = v,
            TourOption::ExitOnOverlayClick(v) => self.exit_on_overlay_click = v,
            TourOption::ExitOnEsc(v) => self.exit_on_esc = v,
            TourOption::KeyboardNavigation(v) => self.keyboard_navigation = v,
            TourOption::OverlayOpacity(v) => self.overlay_opacity = v,
            TourOption::HighlightPadding(v) => self.highlight_padding = v,
            TourOption::AutoPosition(v) => self.auto_position = v,
            TourOption::TooltipOffset(v) => self.tooltip_offset = v,
            TourOption::TooltipSize(v) => self.tooltip_size = v,
            TourOption::ScrollSettleTimeoutMs(v) => self.scroll_settle_timeout_ms = v,
            TourOption::AnimateScroll(v) => self.animate_scroll = v,
            TourOption::Rtl(v) => self.rtl = v,
            TourOption::DontShowAgainKey(v) => self.dont_show_again_key = v,
        }
    }

    /// Overlay opacity clamped to `0.0..=1.0` (NaN reads as `0.0`).
    #[must_use]
    pub fn effective_overlay_opacity(&self) -> f32 {
        if self.overlay_opacity.is_nan() {
            0.0
        } else {
            self.overlay_opacity.clamp(0.0, 1.0)
        }
    }

    /// Validate parameters; an empty list means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !(0.0..=1.0).contains(&self.overlay_opacity) {
            errors.push(format!(
                "tour.overlay_opacity must be in [0, 1], got {}",
                self.overlay_opacity
            ));
        }
        if self.tooltip_size.width <= 0.0 || self.tooltip_size.height <= 0.0 {
            errors.push(format!(
                "tour.tooltip_size must be positive, got {}x{}",
                self.tooltip_size.width, self.tooltip_size.height
            ));
        }
        if self.tooltip_offset < 0.0 {
            errors.push(format!(
                "tour.tooltip_offset must be >= 0, got {}",
                self.tooltip_offset
            ));
        }
        if self.scroll_settle_timeout_ms == 0 {
            errors.push("tour.scroll_settle_timeout_ms must be > 0".into());
        }
        let pad = self.scroll_padding;
        if pad.top < 0.0 || pad.right < 0.0 || pad.bottom < 0.0 || pad.left < 0.0 {
            errors.push("tour.scroll_padding sides must be >= 0".into());
        }

        errors
    }
}

/// A single option change for [`TourOptions::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum TourOption {
    IsActive(bool),
    Group(Option<String>),
    ScrollPadding(Sides),
    ExitOnOverlayClick(bool),
    ExitOnEsc(bool),
    KeyboardNavigation(bool),
    OverlayOpacity(f32),
    HighlightPadding(f32),
    AutoPosition(bool),
    TooltipOffset(f32),
    TooltipSize(Size),
    ScrollSettleTimeoutMs(u64),
    AnimateScroll(bool),
    Rtl(bool),
    DontShowAgainKey(Option<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(TourOptions::default().validate().is_empty());
    }

    #[test]
    fn builder_and_apply_agree() {
        let built = TourOptions::default().highlight_padding(4.0).rtl(true);
        let mut applied = TourOptions::default();
        applied.apply(TourOption::HighlightPadding(4.0));
        applied.apply(TourOption::Rtl(true));
        assert_eq!(built, applied);
    }

    #[test]
    fn validation_reports_each_problem() {
        let opts = TourOptions::default()
            .overlay_opacity(1.5)
            .tooltip_size(Size::new(0.0, 10.0))
            .scroll_settle_timeout_ms(0);
        let errors = opts.validate();
        assert_eq!(errors.len(), 3, "{errors:?}");
        assert!(errors[0].contains("overlay_opacity"));
    }

    #[test]
    fn opacity_is_clamped_for_renderer() {
        assert_eq!(TourOptions::default().overlay_opacity(3.0).effective_overlay_opacity(), 1.0);
        assert_eq!(TourOptions::default().overlay_opacity(f32::NAN).effective_overlay_opacity(), 0.0);
    }
}
