#![forbid(unsafe_code)]

//! A scriptable [`Host`] for deterministic tests.
//!
//! Targets live in a map of handle to rectangle. Any target may be placed
//! inside a scroll container; scrolling a container translates every target
//! in it. Measurements and scrolls either complete immediately or, when
//! deferred, wait for the test to call back with the logged ticket.

use std::collections::BTreeMap;
use std::task::Poll;

use waymark_core::{Point, Rect, Size, TargetHandle, TargetId};
use waymark_layout::ScrollFrame;
use waymark_runtime::{Host, ScrollContainerId, Ticket};

#[derive(Debug, Clone)]
struct Container {
    viewport: Rect,
    offset: Point,
    content: Size,
}

/// One `scroll_to` request as the host received it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollCall {
    pub ticket: Ticket,
    pub container: ScrollContainerId,
    pub offset: Point,
    pub animated: bool,
}

/// Host double with scripted geometry and call logs.
#[derive(Debug, Clone)]
pub struct ScriptedHost {
    viewport: Rect,
    targets: BTreeMap<TargetHandle, Rect>,
    containers: BTreeMap<ScrollContainerId, Container>,
    membership: BTreeMap<TargetHandle, ScrollContainerId>,
    tooltip_sizes: BTreeMap<TargetId, Size>,
    /// Answer `measure` with `Pending`.
    pub defer_measure: bool,
    /// Answer `scroll_to` with `Pending`.
    pub defer_scroll: bool,
    measures: Vec<(Ticket, TargetHandle)>,
    scrolls: Vec<ScrollCall>,
}

impl ScriptedHost {
    #[must_use]
    pub fn new(viewport: Rect) -> Self {
        Self {
            viewport,
            targets: BTreeMap::new(),
            containers: BTreeMap::new(),
            membership: BTreeMap::new(),
            tooltip_sizes: BTreeMap::new(),
            defer_measure: false,
            defer_scroll: false,
            measures: Vec::new(),
            scrolls: Vec::new(),
        }
    }

    /// Phone-sized viewport used by most scenarios.
    #[must_use]
    pub fn phone() -> Self {
        Self::new(Rect::from_size(375.0, 800.0))
    }

    #[must_use]
    pub fn with_target(mut self, handle: u64, rect: Rect) -> Self {
        self.targets.insert(TargetHandle(handle), rect);
        self
    }

    /// Add a scroll container covering the viewport with the given content size.
    #[must_use]
    pub fn with_container(mut self, id: u64, content: Size) -> Self {
        self.containers.insert(
            ScrollContainerId(id),
            Container {
                viewport: self.viewport,
                offset: Point::ZERO,
                content,
            },
        );
        self
    }

    /// Put a target inside a container added with [`Self::with_container`].
    #[must_use]
    pub fn in_container(mut self, handle: u64, container: u64) -> Self {
        self.membership
            .insert(TargetHandle(handle), ScrollContainerId(container));
        self
    }

    #[must_use]
    pub fn with_tooltip_size(mut self, id: impl Into<TargetId>, size: Size) -> Self {
        self.tooltip_sizes.insert(id.into(), size);
        self
    }

    // ── Scripting ────────────────────────────────────────────────────────

    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
        for container in self.containers.values_mut() {
            container.viewport = viewport;
        }
    }

    pub fn move_target(&mut self, handle: u64, rect: Rect) {
        self.targets.insert(TargetHandle(handle), rect);
    }

    /// Make a target unmeasurable, as if its element left the tree.
    pub fn remove_target(&mut self, handle: u64) -> Option<Rect> {
        self.targets.remove(&TargetHandle(handle))
    }

    #[must_use]
    pub fn target(&self, handle: u64) -> Option<Rect> {
        self.targets.get(&TargetHandle(handle)).copied()
    }

    #[must_use]
    pub fn scroll_offset(&self, container: u64) -> Option<Point> {
        self.containers
            .get(&ScrollContainerId(container))
            .map(|c| c.offset)
    }

    // ── Call logs ────────────────────────────────────────────────────────

    #[must_use]
    pub fn measures(&self) -> &[(Ticket, TargetHandle)] {
        &self.measures
    }

    #[must_use]
    pub fn scrolls(&self) -> &[ScrollCall] {
        &self.scrolls
    }

    /// Ticket of the most recent measurement request.
    #[must_use]
    pub fn last_measure(&self) -> Option<Ticket> {
        self.measures.last().map(|(ticket, _)| *ticket)
    }

    /// Ticket of the most recent scroll request.
    #[must_use]
    pub fn last_scroll(&self) -> Option<Ticket> {
        self.scrolls.last().map(|call| call.ticket)
    }

    /// Current rectangle for a handle, as `measure` would report it.
    #[must_use]
    pub fn rect_of(&self, handle: TargetHandle) -> Option<Rect> {
        self.targets.get(&handle).copied()
    }
}

impl Host for ScriptedHost {
    fn viewport(&self) -> Rect {
        self.viewport
    }

    fn measure(&mut self, ticket: Ticket, handle: TargetHandle) -> Poll<Option<Rect>> {
        self.measures.push((ticket, handle));
        if self.defer_measure {
            return Poll::Pending;
        }
        Poll::Ready(self.rect_of(handle))
    }

    fn scroll_frame(&self, handle: TargetHandle) -> Option<(ScrollContainerId, ScrollFrame)> {
        let id = *self.membership.get(&handle)?;
        let c = self.containers.get(&id)?;
        Some((id, ScrollFrame::new(c.viewport, c.offset, c.content)))
    }

    fn scroll_to(
        &mut self,
        ticket: Ticket,
        container: ScrollContainerId,
        offset: Point,
        animated: bool,
    ) -> Poll<()> {
        self.scrolls.push(ScrollCall {
            ticket,
            container,
            offset,
            animated,
        });
        if let Some(c) = self.containers.get_mut(&container) {
            let (dx, dy) = (c.offset.x - offset.x, c.offset.y - offset.y);
            c.offset = offset;
            for (handle, rect) in &mut self.targets {
                if self.membership.get(handle) == Some(&container) {
                    *rect = rect.translate(dx, dy);
                }
            }
        }
        tracing::trace!(target: "waymark.harness", %ticket, ?offset, "scroll_to");
        if self.defer_scroll {
            Poll::Pending
        } else {
            Poll::Ready(())
        }
    }

    fn tooltip_size(&self, id: &TargetId) -> Option<Size> {
        self.tooltip_sizes.get(id).copied()
    }
}
