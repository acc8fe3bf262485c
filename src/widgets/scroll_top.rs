//! Back-to-top buttons that appear once the page is scrolled.

use super::{hit, select_all};
use crate::config::ScrollConfig;
use crate::controller::{Controller, PageContext, TimerTask};
use crate::debounce::Debouncer;
use crate::dom::{Document, NodeId, SelectorError};
use crate::events::{DispatchOutcome, DomEvent};
use crate::timers::FiredTimer;
use crate::window::ScrollBehavior;

pub const BUTTON_SELECTOR: &str = ".c-button--scroll-top, [data-scroll-top]";

const VISIBLE_CLASS: &str = "is-visible";

pub struct ScrollTop {
    buttons: Vec<NodeId>,
    threshold: f64,
    scroll: Debouncer<()>,
}

impl ScrollTop {
    pub fn new(buttons: Vec<NodeId>, config: &ScrollConfig) -> Self {
        Self {
            buttons,
            threshold: config.top_button_threshold,
            scroll: Debouncer::new(config.top_button_debounce_ms),
        }
    }

    pub fn discover(doc: &Document, config: &ScrollConfig) -> Result<Option<Self>, SelectorError> {
        let buttons = select_all(doc, BUTTON_SELECTOR)?;
        Ok((!buttons.is_empty()).then(|| Self::new(buttons, config)))
    }

    fn update_visibility(&self, ctx: &mut PageContext<'_>) {
        let visible = ctx.window.scroll_y() > self.threshold;
        for button in &self.buttons {
            if visible {
                ctx.doc.add_class(*button, VISIBLE_CLASS);
            } else {
                ctx.doc.remove_class(*button, VISIBLE_CLASS);
            }
        }
    }
}

impl Controller for ScrollTop {
    fn name(&self) -> &'static str {
        "scroll-top"
    }

    fn init(&mut self, ctx: &mut PageContext<'_>) {
        self.update_visibility(ctx);
    }

    fn handle_event(
        &mut self,
        ctx: &mut PageContext<'_>,
        event: &DomEvent,
        outcome: &mut DispatchOutcome,
    ) {
        match event {
            DomEvent::Click { target } if hit(ctx.doc, &self.buttons, *target).is_some() => {
                outcome.prevent_default();
                ctx.window.scroll_to(0.0, ScrollBehavior::Smooth);
            }
            DomEvent::Scroll => {
                self.scroll.call(ctx.timers, TimerTask::ScrollTopVisibility, ());
            }
            _ => {}
        }
    }

    fn handle_timer(&mut self, ctx: &mut PageContext<'_>, timer: &FiredTimer<TimerTask>) -> bool {
        if self.scroll.take_fired(timer.id).is_none() {
            return false;
        }
        self.update_visibility(ctx);
        true
    }
}
