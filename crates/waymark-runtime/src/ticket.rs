#![forbid(unsafe_code)]

//! Correlation tickets for suspended host operations.
//!
//! Every measurement, scroll, and deferred confirmation is issued with a
//! [`Ticket`]. The host hands the ticket back with its reply; a reply whose
//! ticket no longer matches the in-flight operation is stale and dropped.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which state machine issued a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Origin {
    Tour,
    Hints,
}

/// Opaque correlation id for one host operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ticket {
    origin: Origin,
    seq: u64,
}

impl Ticket {
    #[must_use]
    pub fn origin(&self) -> Origin {
        self.origin
    }

    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let origin = match self.origin {
            Origin::Tour => "tour",
            Origin::Hints => "hints",
        };
        write!(f, "{origin}#{}", self.seq)
    }
}

/// Monotonic ticket allocator.
#[derive(Debug)]
pub(crate) struct TicketSource {
    origin: Origin,
    next: u64,
}

impl TicketSource {
    pub(crate) fn new(origin: Origin) -> Self {
        Self { origin, next: 1 }
    }

    pub(crate) fn issue(&mut self) -> Ticket {
        let seq = self.next;
        self.next += 1;
        Ticket {
            origin: self.origin,
            seq,
        }
    }
}
