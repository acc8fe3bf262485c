//! In-page anchor links that scroll smoothly below the fixed header.

use tracing::{debug, warn};

use super::{find_header, hit, select_all};
use crate::config::ScrollConfig;
use crate::controller::{Controller, PageContext};
use crate::dom::{Document, NodeId, SelectorError};
use crate::events::{DispatchOutcome, DomEvent};
use crate::window::ScrollBehavior;

pub const ANCHOR_SELECTOR: &str = "a[href^=\"#\"]";

pub struct SmoothScroll {
    links: Vec<NodeId>,
    header: Option<NodeId>,
    fallback_offset: f64,
}

impl SmoothScroll {
    pub fn new(links: Vec<NodeId>, header: Option<NodeId>, config: &ScrollConfig) -> Self {
        Self {
            links,
            header,
            fallback_offset: config.anchor_fallback_offset,
        }
    }

    pub fn discover(doc: &Document, config: &ScrollConfig) -> Result<Option<Self>, SelectorError> {
        let links: Vec<NodeId> = select_all(doc, ANCHOR_SELECTOR)?
            .into_iter()
            .filter(|link| !matches!(doc.attribute(*link, "href").as_deref(), Some("#" | "#!")))
            .collect();
        if links.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self::new(links, find_header(doc)?, config)))
    }

    fn header_offset(&self, doc: &Document) -> f64 {
        self.header
            .map(|header| doc.layout(header).height)
            .unwrap_or(self.fallback_offset)
    }
}

impl Controller for SmoothScroll {
    fn name(&self) -> &'static str {
        "smooth-scroll"
    }

    /// Off the homepage, fragment links to sections this page lacks point
    /// back at the homepage section instead.
    fn init(&mut self, ctx: &mut PageContext<'_>) {
        if ctx.window.is_homepage() {
            return;
        }
        for link in &self.links {
            let Some(section) = ctx
                .doc
                .attribute(*link, "href")
                .and_then(|href| href.strip_prefix('#').map(str::to_string))
            else {
                continue;
            };
            if ctx.doc.get_element_by_id(&section).is_none() {
                ctx.doc.set_attribute(*link, "href", &format!("/#{section}"));
            }
        }
    }

    fn handle_event(
        &mut self,
        ctx: &mut PageContext<'_>,
        event: &DomEvent,
        outcome: &mut DispatchOutcome,
    ) {
        let DomEvent::Click { target } = event else {
            return;
        };
        let Some(link) = hit(ctx.doc, &self.links, *target) else {
            return;
        };
        let Some(href) = ctx.doc.attribute(link, "href") else {
            return;
        };
        let Some(section_id) = href.strip_prefix('#').filter(|id| !id.is_empty()) else {
            return;
        };
        let Some(section) = ctx.doc.get_element_by_id(section_id) else {
            return;
        };

        outcome.prevent_default();
        let top = ctx.doc.layout(section).top - self.header_offset(ctx.doc);
        ctx.window.scroll_to(top, ScrollBehavior::Smooth);
        if let Err(err) = ctx.window.push_state(&href) {
            warn!(target = "smooth-scroll", %href, error = %err, "failed to push history entry");
        }
        debug!(target = "smooth-scroll", section = section_id, top, "scrolled to section");
    }
}
