//! The seam every page widget plugs into.

use serde::Serialize;

use crate::dom::{Document, NodeId};
use crate::events::{DispatchOutcome, DomEvent};
use crate::notify::{NotificationCenter, NotificationKind};
use crate::timers::{FiredTimer, TimerRegistry};
use crate::window::Window;

pub const NO_SCROLL_CLASS: &str = "u-no-scroll";

/// What a timer was armed for. Controllers claim fired timers by id; the
/// task is carried for routing and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerTask {
    MenuResize,
    ScrollSpy,
    ScrollTopVisibility,
    CounterFrame,
    FieldRevalidate,
    SubmitStep,
    NotificationDismiss,
    NotificationRemove,
}

/// Mutable page state lent to a controller for the duration of one event or
/// timer callback.
pub struct PageContext<'a> {
    pub doc: &'a mut Document,
    pub window: &'a mut Window,
    pub timers: &'a mut TimerRegistry<TimerTask>,
    pub notifications: &'a mut NotificationCenter,
}

impl PageContext<'_> {
    pub fn now_ms(&self) -> u64 {
        self.timers.now_ms()
    }

    pub fn notify(&mut self, message: &str, kind: NotificationKind) -> NodeId {
        self.notifications
            .show(self.doc, self.timers, message, kind)
    }
}

pub trait Controller {
    fn name(&self) -> &'static str;

    /// Runs once after page assembly.
    fn init(&mut self, _ctx: &mut PageContext<'_>) {}

    fn handle_event(
        &mut self,
        ctx: &mut PageContext<'_>,
        event: &DomEvent,
        outcome: &mut DispatchOutcome,
    );

    /// Returns true when the timer belonged to this controller.
    fn handle_timer(&mut self, _ctx: &mut PageContext<'_>, _timer: &FiredTimer<TimerTask>) -> bool {
        false
    }
}

/// A panel that can be opened and closed. Opening an open panel and closing a
/// closed one change nothing.
pub trait Toggleable {
    fn is_open(&self) -> bool;
    fn open(&mut self, ctx: &mut PageContext<'_>);
    fn close(&mut self, ctx: &mut PageContext<'_>);

    fn toggle(&mut self, ctx: &mut PageContext<'_>) {
        if self.is_open() {
            self.close(ctx);
        } else {
            self.open(ctx);
        }
    }
}

/// Handle on the body's scroll-lock class, shared by overlays.
///
/// Locks are not counted: any overlay's `unlock` releases the page, even
/// while another overlay is still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollLock {
    body: NodeId,
}

impl ScrollLock {
    pub fn new(body: NodeId) -> Self {
        Self { body }
    }

    pub fn lock(&self, doc: &mut Document) {
        doc.add_class(self.body, NO_SCROLL_CLASS);
    }

    pub fn unlock(&self, doc: &mut Document) {
        doc.remove_class(self.body, NO_SCROLL_CLASS);
    }

    pub fn is_locked(&self, doc: &Document) -> bool {
        doc.has_class(self.body, NO_SCROLL_CLASS)
    }
}
