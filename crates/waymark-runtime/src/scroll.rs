#![forbid(unsafe_code)]

//! Scroll coordinator.
//!
//! Brings a region into a scroll container's visible window and tracks the
//! scroll until it settles. Settling is either reported by the host
//! ([`ScrollCoordinator::settle`]) or assumed once the accumulated tick time
//! reaches the ceiling, whichever comes first. A ceiling hit is reported as
//! [`TourError::ScrollTimeout`]; the caller proceeds with a best-effort
//! measurement.

use std::task::Poll;

use web_time::Duration;

use waymark_core::{Rect, Sides, TargetHandle, TargetId, TourError};
use waymark_layout::reveal_offset;

use crate::host::Host;
use crate::ticket::Ticket;

/// Result of [`ScrollCoordinator::ensure_visible`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// No container, or the region is already inside the window.
    NotNeeded,
    /// The host applied the scroll synchronously.
    Settled,
    /// Waiting for the host to report settling (or for the ceiling).
    Pending,
}

/// One reveal request.
#[derive(Debug, Clone, Copy)]
pub struct RevealRequest<'a> {
    pub ticket: Ticket,
    pub target: &'a TargetId,
    pub handle: TargetHandle,
    /// Region to reveal, in the shared coordinate space.
    pub region: Rect,
    pub padding: Sides,
    pub animated: bool,
    /// Longest time to wait for the host before assuming the scroll settled.
    pub ceiling: Duration,
}

#[derive(Debug)]
struct InFlight {
    ticket: Ticket,
    target: TargetId,
    waited: Duration,
    ceiling: Duration,
}

/// Tracks at most one in-flight scroll.
#[derive(Debug, Default)]
pub struct ScrollCoordinator {
    in_flight: Option<InFlight>,
}

impl ScrollCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the scroll needed to reveal `req.region`, if any.
    ///
    /// Replaces any scroll still in flight; its eventual settle is stale.
    pub fn ensure_visible(&mut self, host: &mut dyn Host, req: RevealRequest<'_>) -> Visibility {
        self.in_flight = None;

        let Some((container, frame)) = host.scroll_frame(req.handle) else {
            tracing::debug!(
                target: "waymark.scroll",
                step = %req.target,
                "no scroll container; treating target as visible"
            );
            return Visibility::NotNeeded;
        };
        let Some(offset) = reveal_offset(req.region, &frame, req.padding) else {
            return Visibility::NotNeeded;
        };

        tracing::debug!(
            target: "waymark.scroll",
            ticket = %req.ticket,
            step = %req.target,
            x = offset.x,
            y = offset.y,
            animated = req.animated,
            "scrolling into view"
        );

        match host.scroll_to(req.ticket, container, offset, req.animated) {
            Poll::Ready(()) => Visibility::Settled,
            Poll::Pending => {
                self.in_flight = Some(InFlight {
                    ticket: req.ticket,
                    target: req.target.clone(),
                    waited: Duration::ZERO,
                    ceiling: req.ceiling,
                });
                Visibility::Pending
            }
        }
    }

    /// Host reported that the scroll under `ticket` settled.
    ///
    /// Returns `false` for stale or unknown tickets.
    pub fn settle(&mut self, ticket: Ticket) -> bool {
        match &self.in_flight {
            Some(f) if f.ticket == ticket => {
                self.in_flight = None;
                true
            }
            _ => false,
        }
    }

    /// Advance time. Returns the timeout once the ceiling is reached.
    pub fn tick(&mut self, delta: Duration) -> Option<TourError> {
        let flight = self.in_flight.as_mut()?;
        flight.waited = flight.waited.saturating_add(delta);
        if flight.waited < flight.ceiling {
            return None;
        }
        let flight = self.in_flight.take()?;
        let waited_ms = u64::try_from(flight.waited.as_millis()).unwrap_or(u64::MAX);
        tracing::warn!(
            target: "waymark.scroll",
            ticket = %flight.ticket,
            step = %flight.target,
            waited_ms,
            "scroll did not settle; proceeding with best-effort position"
        );
        Some(TourError::ScrollTimeout {
            id: flight.target,
            waited_ms,
        })
    }

    /// Drop the in-flight scroll. A late settle for it will be ignored.
    pub fn cancel(&mut self) -> Option<Ticket> {
        self.in_flight.take().map(|f| f.ticket)
    }

    /// Ticket of the scroll currently awaited.
    #[must_use]
    pub fn pending(&self) -> Option<Ticket> {
        self.in_flight.as_ref().map(|f| f.ticket)
    }
}
