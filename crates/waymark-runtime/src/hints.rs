#![forbid(unsafe_code)]

//! Hint session: persistent anchor indicators and their dialogs.
//!
//! Hints are independent of tour sequencing. The session tracks two sets:
//! `shown` (indicator visible) and `open` (dialog visible, always a subset of
//! `shown`). Options are merged per spot with [`merge_hint_options`] each
//! time they are needed, so a later `show()` with new call-site options
//! applies immediately.
//!
//! Anchors are re-measured on `show`, on `refresh`, and, when
//! `HintDefaults::auto_refresh_ms` is set, every time that much tick time has
//! accumulated while any hint is shown.

use std::collections::{BTreeMap, BTreeSet};
use std::task::Poll;

use web_time::Duration;

use waymark_core::{
    HintDefaults, HintOptions, Rect, ResolvedHintOptions, SharedRegistry, TargetId, TourError,
    merge_hint_options,
};
use waymark_layout::{PlacementRequest, indicator_point, place};

use crate::host::Host;
use crate::snapshot::{HintSnapshot, HintView};
use crate::ticket::{Origin, Ticket, TicketSource};

/// Visibility and dialog state for all registered hint spots.
#[derive(Debug)]
pub struct HintSession {
    registry: SharedRegistry,
    defaults: HintDefaults,
    call_site: HintOptions,
    shown: BTreeSet<TargetId>,
    open: BTreeSet<TargetId>,
    anchors: BTreeMap<TargetId, Rect>,
    pending: BTreeMap<Ticket, TargetId>,
    tickets: TicketSource,
    since_refresh: Duration,
}

impl HintSession {
    #[must_use]
    pub fn new(registry: SharedRegistry) -> Self {
        Self {
            registry,
            defaults: HintDefaults::default(),
            call_site: HintOptions::default(),
            shown: BTreeSet::new(),
            open: BTreeSet::new(),
            anchors: BTreeMap::new(),
            pending: BTreeMap::new(),
            tickets: TicketSource::new(Origin::Hints),
            since_refresh: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn with_defaults(mut self, defaults: HintDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    #[must_use]
    pub fn defaults(&self) -> &HintDefaults {
        &self.defaults
    }

    pub fn set_defaults(&mut self, defaults: HintDefaults) {
        self.defaults = defaults;
    }

    // ── Visibility ───────────────────────────────────────────────────────

    /// Show every registered hint with `options` as the call-site options.
    pub fn show(&mut self, host: &mut dyn Host, options: HintOptions) {
        self.call_site = options;
        let spots = self.registry.borrow().hints();
        self.shown = spots.into_iter().map(|s| s.id).collect();
        tracing::debug!(target: "waymark.hints", count = self.shown.len(), "hints shown");
        self.refresh(host);
    }

    /// Hide everything. Shown and open sets are cleared together.
    pub fn hide(&mut self) {
        self.shown.clear();
        self.open.clear();
        self.anchors.clear();
        self.pending.clear();
        self.since_refresh = Duration::ZERO;
        tracing::debug!(target: "waymark.hints", "hints hidden");
    }

    /// Show a single hint.
    pub fn show_one(&mut self, host: &mut dyn Host, id: &TargetId) -> Result<(), TourError> {
        self.ensure_known(id)?;
        self.shown.insert(id.clone());
        self.measure_one(host, id);
        Ok(())
    }

    /// Hide a single hint (and its dialog). Returns whether it was shown.
    pub fn hide_one(&mut self, id: &TargetId) -> bool {
        self.open.remove(id);
        self.anchors.remove(id);
        self.pending.retain(|_, pending| pending != id);
        self.shown.remove(id)
    }

    /// Open a hint's dialog, showing its indicator if needed.
    ///
    /// Other dialogs stay open unless the merged `close_others_on_open`
    /// option for this spot is set.
    pub fn open_dialog(&mut self, host: &mut dyn Host, id: &TargetId) -> Result<(), TourError> {
        self.ensure_known(id)?;
        let close_others = self
            .resolved_options(id)
            .is_some_and(|o| o.close_others_on_open);
        if close_others {
            self.open.clear();
        }
        self.open.insert(id.clone());
        if self.shown.insert(id.clone()) || !self.anchors.contains_key(id) {
            self.measure_one(host, id);
        }
        tracing::debug!(target: "waymark.hints", hint = %id, close_others, "dialog opened");
        Ok(())
    }

    /// Close a hint's dialog. The indicator stays. Returns whether it was open.
    pub fn close_dialog(&mut self, id: &TargetId) -> bool {
        self.open.remove(id)
    }

    #[must_use]
    pub fn is_visible(&self, id: &TargetId) -> bool {
        self.shown.contains(id)
    }

    #[must_use]
    pub fn is_open(&self, id: &TargetId) -> bool {
        self.open.contains(id)
    }

    /// Merged options for one spot, or `None` if it is not registered.
    #[must_use]
    pub fn resolved_options(&self, id: &TargetId) -> Option<ResolvedHintOptions> {
        let registry = self.registry.borrow();
        let spot = registry.hint(id)?;
        Some(merge_hint_options(&self.defaults, &self.call_site, &spot.config))
    }

    // ── Measurement ──────────────────────────────────────────────────────

    /// Re-measure every shown anchor. Unregistered spots are dropped.
    pub fn refresh(&mut self, host: &mut dyn Host) {
        self.since_refresh = Duration::ZERO;
        let gone: Vec<TargetId> = {
            let registry = self.registry.borrow();
            self.shown
                .iter()
                .filter(|id| registry.hint(id).is_none())
                .cloned()
                .collect()
        };
        for id in &gone {
            tracing::debug!(target: "waymark.hints", hint = %id, "dropping unregistered hint");
            self.hide_one(id);
        }
        let shown: Vec<TargetId> = self.shown.iter().cloned().collect();
        for id in &shown {
            self.measure_one(host, id);
        }
    }

    /// Deliver a measurement issued earlier. Returns `false` for stale tickets.
    pub fn measured(&mut self, ticket: Ticket, rect: Option<Rect>) -> bool {
        let Some(id) = self.pending.remove(&ticket) else {
            tracing::debug!(target: "waymark.hints", %ticket, "stale measurement ignored");
            return false;
        };
        self.store(id, rect);
        true
    }

    /// Advance time; re-measures when the auto-refresh interval elapses.
    /// Returns whether a refresh ran.
    pub fn tick(&mut self, host: &mut dyn Host, delta: Duration) -> bool {
        let Some(interval) = self.defaults.auto_refresh_ms else {
            return false;
        };
        if self.shown.is_empty() {
            return false;
        }
        self.since_refresh = self.since_refresh.saturating_add(delta);
        if self.since_refresh < Duration::from_millis(interval) {
            return false;
        }
        tracing::debug!(target: "waymark.hints", interval_ms = interval, "auto refresh");
        self.refresh(host);
        true
    }

    fn measure_one(&mut self, host: &mut dyn Host, id: &TargetId) {
        let resolved = self.registry.borrow().resolve_hint(id);
        let handle = match resolved {
            Ok(handle) => handle,
            Err(err) => {
                tracing::warn!(target: "waymark.hints", error = %err, "hint anchor unresolved");
                self.anchors.remove(id);
                return;
            }
        };
        self.pending.retain(|_, pending| pending != id);
        let ticket = self.tickets.issue();
        match host.measure(ticket, handle) {
            Poll::Ready(rect) => self.store(id.clone(), rect),
            Poll::Pending => {
                self.pending.insert(ticket, id.clone());
            }
        }
    }

    fn store(&mut self, id: TargetId, rect: Option<Rect>) {
        match rect {
            Some(rect) => {
                self.anchors.insert(id, rect);
            }
            None => {
                tracing::warn!(target: "waymark.hints", hint = %id, "hint anchor lost");
                self.anchors.remove(&id);
            }
        }
    }

    fn ensure_known(&self, id: &TargetId) -> Result<(), TourError> {
        if self.registry.borrow().hint(id).is_some() {
            Ok(())
        } else {
            Err(TourError::UnknownHint { id: id.clone() })
        }
    }

    // ── Snapshot ─────────────────────────────────────────────────────────

    /// Render view: indicator points and, for open hints, dialog geometry.
    #[must_use]
    pub fn snapshot(&self, host: &dyn Host) -> HintSnapshot {
        let registry = self.registry.borrow();
        let viewport = host.viewport();
        let hints = registry
            .hints()
            .into_iter()
            .filter(|spot| self.shown.contains(&spot.id))
            .map(|spot| {
                let options = merge_hint_options(&self.defaults, &self.call_site, &spot.config);
                let anchor = self.anchors.get(&spot.id).copied();
                let dialog = anchor.filter(|_| self.open.contains(&spot.id)).map(|anchor| {
                    place(
                        &PlacementRequest::new(anchor, self.defaults.dialog_size, viewport)
                            .position(options.dialog_position)
                            .rtl(self.defaults.rtl),
                    )
                });
                HintView {
                    indicator: anchor
                        .map(|a| indicator_point(a, spot.config.position, self.defaults.rtl)),
                    dialog,
                    animated: options.animated,
                    kind: spot.config.kind,
                    position: spot.config.position,
                    id: spot.id,
                }
            })
            .collect();
        HintSnapshot {
            visible: self.shown.clone(),
            open: self.open.clone(),
            hints,
        }
    }
}
