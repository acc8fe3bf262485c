//! Marks the navigation link for the current page path.

use super::scroll_spy::ACTIVE_CLASS;
use super::{select_all, NAV_LINK_SELECTOR};
use crate::controller::{Controller, PageContext};
use crate::dom::{Document, NodeId, SelectorError};
use crate::events::{DispatchOutcome, DomEvent};

pub struct ActiveMenu {
    links: Vec<NodeId>,
}

impl ActiveMenu {
    pub fn new(links: Vec<NodeId>) -> Self {
        Self { links }
    }

    pub fn discover(doc: &Document) -> Result<Option<Self>, SelectorError> {
        let links = select_all(doc, NAV_LINK_SELECTOR)?;
        Ok((!links.is_empty()).then(|| Self::new(links)))
    }
}

/// `/` and `/index.html` name the same page; an empty path is `/`.
pub fn is_current_path(link_path: &str, current_path: &str) -> bool {
    link_path == current_path
        || (current_path == "/" && link_path == "/index.html")
        || (current_path == "/index.html" && link_path == "/")
        || (current_path.is_empty() && link_path == "/")
}

impl Controller for ActiveMenu {
    fn name(&self) -> &'static str {
        "active-menu"
    }

    fn init(&mut self, ctx: &mut PageContext<'_>) {
        let current_path = ctx.window.pathname().to_string();
        for link in &self.links {
            let is_current = ctx
                .doc
                .attribute(*link, "href")
                .is_some_and(|href| is_current_path(&href, &current_path));
            if is_current {
                ctx.doc.add_class(*link, ACTIVE_CLASS);
                ctx.doc.set_attribute(*link, "aria-current", "page");
            } else {
                ctx.doc.remove_class(*link, ACTIVE_CLASS);
                ctx.doc.remove_attribute(*link, "aria-current");
            }
        }
    }

    fn handle_event(
        &mut self,
        _ctx: &mut PageContext<'_>,
        _event: &DomEvent,
        _outcome: &mut DispatchOutcome,
    ) {
    }
}
