//! Collapsible navigation drawer.

use tracing::debug;

use super::{hit, select_all, select_first, NAV_LINK_SELECTOR};
use crate::config::MenuConfig;
use crate::controller::{Controller, PageContext, ScrollLock, TimerTask, Toggleable};
use crate::debounce::Debouncer;
use crate::dom::{Document, NodeId, SelectorError};
use crate::events::{DispatchOutcome, DomEvent};
use crate::timers::FiredTimer;

pub const TOGGLE_SELECTOR: &str = ".navbar-toggler, .c-nav__toggle";
pub const PANEL_SELECTOR: &str = ".navbar-collapse, .c-nav";

const PANEL_OPEN_CLASSES: [&str; 2] = ["show", "is-open"];

pub struct BurgerMenu {
    toggle: NodeId,
    panel: NodeId,
    links: Vec<NodeId>,
    scroll_lock: ScrollLock,
    open: bool,
    resize: Debouncer<()>,
    desktop_min_width: f64,
}

impl BurgerMenu {
    pub fn new(
        toggle: NodeId,
        panel: NodeId,
        links: Vec<NodeId>,
        scroll_lock: ScrollLock,
        config: &MenuConfig,
    ) -> Self {
        Self {
            toggle,
            panel,
            links,
            scroll_lock,
            open: false,
            resize: Debouncer::new(config.resize_debounce_ms),
            desktop_min_width: config.desktop_min_width,
        }
    }

    pub fn discover(
        doc: &Document,
        scroll_lock: ScrollLock,
        config: &MenuConfig,
    ) -> Result<Option<Self>, SelectorError> {
        let (Some(toggle), Some(panel)) = (
            select_first(doc, TOGGLE_SELECTOR)?,
            select_first(doc, PANEL_SELECTOR)?,
        ) else {
            return Ok(None);
        };
        let links = select_all(doc, NAV_LINK_SELECTOR)?;
        Ok(Some(Self::new(toggle, panel, links, scroll_lock, config)))
    }
}

impl Toggleable for BurgerMenu {
    fn is_open(&self) -> bool {
        self.open
    }

    fn open(&mut self, ctx: &mut PageContext<'_>) {
        for class in PANEL_OPEN_CLASSES {
            ctx.doc.add_class(self.panel, class);
        }
        ctx.doc.set_attribute(self.toggle, "aria-expanded", "true");
        self.scroll_lock.lock(ctx.doc);
        if !self.open {
            debug!(target = "menu", "menu opened");
        }
        self.open = true;
    }

    fn close(&mut self, ctx: &mut PageContext<'_>) {
        for class in PANEL_OPEN_CLASSES {
            ctx.doc.remove_class(self.panel, class);
        }
        ctx.doc.set_attribute(self.toggle, "aria-expanded", "false");
        self.scroll_lock.unlock(ctx.doc);
        if self.open {
            debug!(target = "menu", "menu closed");
        }
        self.open = false;
    }
}

impl Controller for BurgerMenu {
    fn name(&self) -> &'static str {
        "menu"
    }

    fn handle_event(
        &mut self,
        ctx: &mut PageContext<'_>,
        event: &DomEvent,
        outcome: &mut DispatchOutcome,
    ) {
        match event {
            DomEvent::Click { target } => {
                if ctx.doc.contains(self.toggle, *target) {
                    outcome.prevent_default();
                    self.toggle(ctx);
                    return;
                }
                if !self.open {
                    return;
                }
                let on_link = hit(ctx.doc, &self.links, *target).is_some();
                let outside = !ctx.doc.contains(self.panel, *target);
                if on_link || outside {
                    self.close(ctx);
                }
            }
            DomEvent::KeyDown { key } if key == "Escape" && self.open => self.close(ctx),
            DomEvent::Resize => {
                self.resize.call(ctx.timers, TimerTask::MenuResize, ());
            }
            _ => {}
        }
    }

    fn handle_timer(&mut self, ctx: &mut PageContext<'_>, timer: &FiredTimer<TimerTask>) -> bool {
        if self.resize.take_fired(timer.id).is_none() {
            return false;
        }
        if self.open && ctx.window.inner_width() >= self.desktop_min_width {
            self.close(ctx);
        }
        true
    }
}
