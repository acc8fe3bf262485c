//! Highlights the navigation link of the section currently under the header.

use tracing::trace;

use super::{find_header, select_all, NAV_LINK_SELECTOR};
use crate::config::ScrollConfig;
use crate::controller::{Controller, PageContext, TimerTask};
use crate::debounce::Debouncer;
use crate::dom::{Document, NodeId, SelectorError};
use crate::events::{DispatchOutcome, DomEvent};
use crate::timers::FiredTimer;

pub const SECTION_SELECTOR: &str = "section[id], div[id]";

pub(crate) const ACTIVE_CLASS: &str = "active";

pub struct ScrollSpy {
    sections: Vec<NodeId>,
    links: Vec<NodeId>,
    header: Option<NodeId>,
    scroll: Debouncer<()>,
    extra_offset: f64,
    fallback_offset: f64,
}

impl ScrollSpy {
    pub fn new(
        sections: Vec<NodeId>,
        links: Vec<NodeId>,
        header: Option<NodeId>,
        config: &ScrollConfig,
    ) -> Self {
        Self {
            sections,
            links,
            header,
            scroll: Debouncer::new(config.spy_debounce_ms),
            extra_offset: config.spy_extra_offset,
            fallback_offset: config.spy_fallback_offset,
        }
    }

    pub fn discover(doc: &Document, config: &ScrollConfig) -> Result<Option<Self>, SelectorError> {
        let sections = select_all(doc, SECTION_SELECTOR)?;
        let links = select_all(doc, NAV_LINK_SELECTOR)?;
        if sections.is_empty() || links.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self::new(sections, links, find_header(doc)?, config)))
    }

    /// The last section whose band `[top - offset, top + height - offset)`
    /// contains the scroll position.
    pub fn current_section(&self, doc: &Document, scroll_y: f64) -> Option<String> {
        let offset = self
            .header
            .map(|header| doc.layout(header).height + self.extra_offset)
            .unwrap_or(self.fallback_offset);
        self.sections
            .iter()
            .filter(|section| {
                let layout = doc.layout(**section);
                scroll_y >= layout.top - offset && scroll_y < layout.top + layout.height - offset
            })
            .filter_map(|section| doc.id(*section))
            .last()
    }

    fn update(&self, ctx: &mut PageContext<'_>) {
        let current = self.current_section(ctx.doc, ctx.window.scroll_y());
        let wanted = current.as_ref().map(|id| format!("#{id}"));
        for link in &self.links {
            let matches = wanted.is_some() && ctx.doc.attribute(*link, "href") == wanted;
            if matches {
                ctx.doc.add_class(*link, ACTIVE_CLASS);
                ctx.doc.set_attribute(*link, "aria-current", "page");
            } else {
                ctx.doc.remove_class(*link, ACTIVE_CLASS);
                ctx.doc.remove_attribute(*link, "aria-current");
            }
        }
        trace!(target = "scroll-spy", section = ?current, "active link updated");
    }
}

impl Controller for ScrollSpy {
    fn name(&self) -> &'static str {
        "scroll-spy"
    }

    fn init(&mut self, ctx: &mut PageContext<'_>) {
        self.update(ctx);
    }

    fn handle_event(
        &mut self,
        ctx: &mut PageContext<'_>,
        event: &DomEvent,
        _outcome: &mut DispatchOutcome,
    ) {
        if matches!(event, DomEvent::Scroll) {
            self.scroll.call(ctx.timers, TimerTask::ScrollSpy, ());
        }
    }

    fn handle_timer(&mut self, ctx: &mut PageContext<'_>, timer: &FiredTimer<TimerTask>) -> bool {
        if self.scroll.take_fired(timer.id).is_none() {
            return false;
        }
        self.update(ctx);
        true
    }
}
