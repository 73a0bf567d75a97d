#![forbid(unsafe_code)]

//! In-crate fakes for unit tests.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::task::Poll;

use waymark_core::{Point, Rect, Size, TargetHandle, TargetId, TourError};
use waymark_layout::ScrollFrame;

use crate::hooks::{Confirm, ExitReason, StepChange, TourHooks};
use crate::host::{Host, ScrollContainerId};
use crate::ticket::Ticket;

/// A host with one optional scroll container that wraps every target.
pub(crate) struct FakeHost {
    pub viewport: Rect,
    pub rects: BTreeMap<u64, Rect>,
    /// Content size of the single container, when scrolling is enabled.
    pub container: Option<Size>,
    pub offset: Point,
    pub pending_measure: bool,
    pub pending_scroll: bool,
    pub scrolls: Vec<Point>,
    pub measures: Vec<Ticket>,
}

impl FakeHost {
    pub fn new(viewport: Rect) -> Self {
        Self {
            viewport,
            rects: BTreeMap::new(),
            container: None,
            offset: Point::ZERO,
            pending_measure: false,
            pending_scroll: false,
            scrolls: Vec::new(),
            measures: Vec::new(),
        }
    }

    pub fn with_rect(mut self, handle: u64, rect: Rect) -> Self {
        self.rects.insert(handle, rect);
        self
    }

    pub fn last_measure(&self) -> Ticket {
        *self.measures.last().expect("no measurement issued")
    }
}

impl Host for FakeHost {
    fn viewport(&self) -> Rect {
        self.viewport
    }

    fn measure(&mut self, ticket: Ticket, handle: TargetHandle) -> Poll<Option<Rect>> {
        self.measures.push(ticket);
        if self.pending_measure {
            Poll::Pending
        } else {
            Poll::Ready(self.rects.get(&handle.0).copied())
        }
    }

    fn scroll_frame(&self, _handle: TargetHandle) -> Option<(ScrollContainerId, ScrollFrame)> {
        let content = self.container?;
        Some((
            ScrollContainerId(0),
            ScrollFrame::new(self.viewport, self.offset, content),
        ))
    }

    fn scroll_to(
        &mut self,
        _ticket: Ticket,
        _container: ScrollContainerId,
        offset: Point,
        _animated: bool,
    ) -> Poll<()> {
        let (dx, dy) = (self.offset.x - offset.x, self.offset.y - offset.y);
        for rect in self.rects.values_mut() {
            *rect = rect.translate(dx, dy);
        }
        self.offset = offset;
        self.scrolls.push(offset);
        if self.pending_scroll {
            Poll::Pending
        } else {
            Poll::Ready(())
        }
    }
}

pub(crate) type Log = Rc<RefCell<Vec<String>>>;

/// Hooks that append one line per call to a shared log.
pub(crate) struct LogHooks {
    pub log: Log,
    pub before_change: Confirm,
    pub before_exit: Confirm,
}

impl LogHooks {
    pub fn new() -> (Self, Log) {
        let log = Log::default();
        (
            Self {
                log: Rc::clone(&log),
                before_change: Confirm::Proceed,
                before_exit: Confirm::Proceed,
            },
            log,
        )
    }

    fn push(&self, line: String) {
        self.log.borrow_mut().push(line);
    }
}

impl TourHooks for LogHooks {
    fn before_change(&mut self, _ticket: Ticket, change: &StepChange) -> Confirm {
        self.push(format!("before_change:{}", change.to));
        self.before_change
    }

    fn before_exit(&mut self, _ticket: Ticket, _index: Option<usize>) -> Confirm {
        self.push("before_exit".into());
        self.before_exit
    }

    fn on_start(&mut self, index: usize, step: &TargetId) {
        self.push(format!("on_start:{index}:{step}"));
    }

    fn on_change(&mut self, change: &StepChange) {
        self.push(format!("on_change:{}", change.to));
    }

    fn after_change(&mut self, change: &StepChange) {
        self.push(format!("after_change:{}", change.to));
    }

    fn on_complete(&mut self) {
        self.push("on_complete".into());
    }

    fn on_exit(&mut self, reason: ExitReason) {
        self.push(format!("on_exit:{}", reason.as_str()));
    }

    fn on_error(&mut self, error: &TourError) {
        self.push(format!("on_error:{}", error.error_type()));
    }
}
