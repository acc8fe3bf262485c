//! Burger for the shared site header (`.dr-header`). Unlike the main menu it
//! does not lock page scrolling.

use super::select_first;
use crate::controller::{Controller, PageContext, Toggleable};
use crate::dom::{Document, NodeId, SelectorError};
use crate::events::{DispatchOutcome, DomEvent};

pub const HEADER_SELECTOR: &str = ".dr-header";
pub const BURGER_SELECTOR: &str = ".dr-header-burger";
pub const NAV_LIST_SELECTOR: &str = ".dr-nav-list";

const OPEN_CLASS: &str = "dr-is-open";

pub struct HeaderMenu {
    burger: NodeId,
    nav_list: NodeId,
    open: bool,
}

impl HeaderMenu {
    pub fn new(doc: &Document, burger: NodeId, nav_list: NodeId) -> Self {
        Self {
            burger,
            nav_list,
            open: doc.has_class(burger, OPEN_CLASS),
        }
    }

    pub fn discover(doc: &Document) -> Result<Option<Self>, SelectorError> {
        let Some(header) = select_first(doc, HEADER_SELECTOR)? else {
            return Ok(None);
        };
        let burger = doc.query_selector(header, BURGER_SELECTOR)?;
        let nav_list = doc.query_selector(header, NAV_LIST_SELECTOR)?;
        Ok(match (burger, nav_list) {
            (Some(burger), Some(nav_list)) => Some(Self::new(doc, burger, nav_list)),
            _ => None,
        })
    }
}

impl Toggleable for HeaderMenu {
    fn is_open(&self) -> bool {
        self.open
    }

    fn open(&mut self, ctx: &mut PageContext<'_>) {
        ctx.doc.add_class(self.burger, OPEN_CLASS);
        ctx.doc.add_class(self.nav_list, OPEN_CLASS);
        ctx.doc.set_attribute(self.burger, "aria-expanded", "true");
        self.open = true;
    }

    fn close(&mut self, ctx: &mut PageContext<'_>) {
        ctx.doc.remove_class(self.burger, OPEN_CLASS);
        ctx.doc.remove_class(self.nav_list, OPEN_CLASS);
        ctx.doc.set_attribute(self.burger, "aria-expanded", "false");
        self.open = false;
    }
}

impl Controller for HeaderMenu {
    fn name(&self) -> &'static str {
        "header-menu"
    }

    fn handle_event(
        &mut self,
        ctx: &mut PageContext<'_>,
        event: &DomEvent,
        _outcome: &mut DispatchOutcome,
    ) {
        if let DomEvent::Click { target } = event {
            if ctx.doc.contains(self.burger, *target) {
                self.toggle(ctx);
            }
        }
    }
}
