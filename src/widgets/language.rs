//! Language switch buttons; exactly one is marked current after a click.

use super::{hit, select_all};
use crate::controller::{Controller, PageContext};
use crate::dom::{Document, NodeId, SelectorError};
use crate::events::{DispatchOutcome, DomEvent};

pub const BUTTON_SELECTOR: &str = ".c-button--language";
const ACTIVE_CLASS: &str = "is-active";

pub struct LanguageButtons {
    buttons: Vec<NodeId>,
}

impl LanguageButtons {
    pub fn discover(doc: &Document) -> Result<Option<Self>, SelectorError> {
        let buttons = select_all(doc, BUTTON_SELECTOR)?;
        Ok((!buttons.is_empty()).then_some(Self { buttons }))
    }
}

impl Controller for LanguageButtons {
    fn name(&self) -> &'static str {
        "language"
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
        let Some(clicked) = hit(ctx.doc, &self.buttons, *target) else {
            return;
        };
        outcome.prevent_default();
        for button in &self.buttons {
            if *button == clicked {
                ctx.doc.add_class(*button, ACTIVE_CLASS);
                ctx.doc.set_attribute(*button, "aria-current", "true");
            } else {
                ctx.doc.remove_class(*button, ACTIVE_CLASS);
                ctx.doc.remove_attribute(*button, "aria-current");
            }
        }
    }
}
