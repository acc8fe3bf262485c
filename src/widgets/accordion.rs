//! Accordion panels where opening one item collapses its siblings.

use tracing::warn;

use super::{compile, hit, select_all};
use crate::controller::{Controller, PageContext};
use crate::dom::{Document, NodeId, SelectorError, SelectorList};
use crate::events::{DispatchOutcome, DomEvent};

pub const BUTTON_SELECTOR: &str = ".accordion-button";
const GROUP_SELECTOR: &str = ".accordion";
const COLLAPSE_SELECTOR: &str = ".accordion-collapse";

const SHOW_CLASS: &str = "show";
const COLLAPSED_CLASS: &str = "collapsed";

pub struct Accordion {
    buttons: Vec<NodeId>,
    group: SelectorList,
    collapse: SelectorList,
    button: SelectorList,
}

impl Accordion {
    pub fn discover(doc: &Document) -> Result<Option<Self>, SelectorError> {
        let buttons = select_all(doc, BUTTON_SELECTOR)?;
        if buttons.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self {
            buttons,
            group: compile(GROUP_SELECTOR)?,
            collapse: compile(COLLAPSE_SELECTOR)?,
            button: compile(BUTTON_SELECTOR)?,
        }))
    }

    fn activate(&self, ctx: &mut PageContext<'_>, button: NodeId) {
        let Some(target_selector) = ctx
            .doc
            .attribute(button, "data-bs-target")
        else {
            return;
        };
        let target = match ctx.doc.query_selector(Document::ROOT, &target_selector) {
            Ok(Some(target)) => target,
            Ok(None) => return,
            Err(err) => {
                warn!(target = "accordion", selector = %target_selector, error = %err, "invalid accordion target");
                return;
            }
        };
        let expanded = ctx.doc.attribute(button, "aria-expanded").as_deref() == Some("true");

        if let Some(group) = ctx.doc.closest(button, &self.group) {
            for collapse in ctx.doc.select_all(group, &self.collapse) {
                if collapse != target {
                    ctx.doc.remove_class(collapse, SHOW_CLASS);
                }
            }
            for other in ctx.doc.select_all(group, &self.button) {
                if other != button {
                    ctx.doc.add_class(other, COLLAPSED_CLASS);
                    ctx.doc.set_attribute(other, "aria-expanded", "false");
                }
            }
        }

        if expanded {
            ctx.doc.add_class(button, COLLAPSED_CLASS);
            ctx.doc.set_attribute(button, "aria-expanded", "false");
            ctx.doc.remove_class(target, SHOW_CLASS);
        } else {
            ctx.doc.remove_class(button, COLLAPSED_CLASS);
            ctx.doc.set_attribute(button, "aria-expanded", "true");
            ctx.doc.add_class(target, SHOW_CLASS);
        }
    }
}

impl Controller for Accordion {
    fn name(&self) -> &'static str {
        "accordion"
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
        if let Some(button) = hit(ctx.doc, &self.buttons, *target) {
            outcome.prevent_default();
            self.activate(ctx, button);
        }
    }
}
