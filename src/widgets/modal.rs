//! Modal dialogs opened by `[data-modal-target]` triggers.

use tracing::{debug, warn};

use super::{hit, select_all};
use crate::controller::{Controller, PageContext, ScrollLock, Toggleable};
use crate::dom::{Document, NodeId, SelectorError};
use crate::events::{DispatchOutcome, DomEvent};

pub const TRIGGER_SELECTOR: &str = "[data-modal-target]";
pub const MODAL_SELECTOR: &str = ".c-modal";
const CLOSE_SELECTOR: &str = ".c-modal__close";
const BACKDROP_SELECTOR: &str = ".c-modal__backdrop";

const OPEN_CLASS: &str = "is-open";

pub struct Modal {
    root: NodeId,
    close_button: Option<NodeId>,
    backdrop: Option<NodeId>,
    scroll_lock: ScrollLock,
    open: bool,
}

impl Modal {
    pub fn new(doc: &Document, root: NodeId, scroll_lock: ScrollLock) -> Result<Self, SelectorError> {
        Ok(Self {
            root,
            close_button: doc.query_selector(root, CLOSE_SELECTOR)?,
            backdrop: doc.query_selector(root, BACKDROP_SELECTOR)?,
            scroll_lock,
            open: doc.has_class(root, OPEN_CLASS),
        })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn is_dismiss_target(&self, doc: &Document, target: NodeId) -> bool {
        [self.close_button, self.backdrop]
            .into_iter()
            .flatten()
            .any(|node| doc.contains(node, target))
    }
}

impl Toggleable for Modal {
    fn is_open(&self) -> bool {
        self.open
    }

    fn open(&mut self, ctx: &mut PageContext<'_>) {
        ctx.doc.add_class(self.root, OPEN_CLASS);
        self.scroll_lock.lock(ctx.doc);
        self.open = true;
    }

    fn close(&mut self, ctx: &mut PageContext<'_>) {
        if !self.open {
            return;
        }
        ctx.doc.remove_class(self.root, OPEN_CLASS);
        self.scroll_lock.unlock(ctx.doc);
        self.open = false;
    }
}

pub struct ModalController {
    triggers: Vec<NodeId>,
    modals: Vec<Modal>,
    scroll_lock: ScrollLock,
}

impl ModalController {
    pub fn new(triggers: Vec<NodeId>, modals: Vec<Modal>, scroll_lock: ScrollLock) -> Self {
        Self {
            triggers,
            modals,
            scroll_lock,
        }
    }

    pub fn discover(doc: &Document, scroll_lock: ScrollLock) -> Result<Option<Self>, SelectorError> {
        let triggers = select_all(doc, TRIGGER_SELECTOR)?;
        let modals = select_all(doc, MODAL_SELECTOR)?
            .into_iter()
            .map(|root| Modal::new(doc, root, scroll_lock))
            .collect::<Result<Vec<_>, _>>()?;
        if triggers.is_empty() && modals.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self::new(triggers, modals, scroll_lock)))
    }

    pub fn modals(&self) -> &[Modal] {
        &self.modals
    }

    /// The modal rooted at the element with `id`. Elements outside the
    /// `.c-modal` set are adopted on first use so they can be dismissed too.
    fn modal_for(&mut self, doc: &Document, id: &str) -> Result<Option<&mut Modal>, SelectorError> {
        let Some(root) = doc.get_element_by_id(id) else {
            return Ok(None);
        };
        let index = match self.modals.iter().position(|modal| modal.root == root) {
            Some(index) => index,
            None => {
                self.modals.push(Modal::new(doc, root, self.scroll_lock)?);
                self.modals.len() - 1
            }
        };
        Ok(self.modals.get_mut(index))
    }
}

impl Controller for ModalController {
    fn name(&self) -> &'static str {
        "modal"
    }

    fn handle_event(
        &mut self,
        ctx: &mut PageContext<'_>,
        event: &DomEvent,
        outcome: &mut DispatchOutcome,
    ) {
        match event {
            DomEvent::Click { target } => {
                if let Some(trigger) = hit(ctx.doc, &self.triggers, *target) {
                    outcome.prevent_default();
                    let Some(wanted) = ctx.doc.attribute(trigger, "data-modal-target") else {
                        return;
                    };
                    match self.modal_for(ctx.doc, &wanted) {
                        Ok(Some(modal)) => {
                            modal.open(ctx);
                            debug!(target = "modal", modal = %wanted, "modal opened");
                        }
                        Ok(None) => debug!(target = "modal", modal = %wanted, "trigger names no element"),
                        Err(err) => warn!(target = "modal", modal = %wanted, error = %err, "cannot adopt modal"),
                    }
                    return;
                }
                for modal in &mut self.modals {
                    if modal.is_open() && modal.is_dismiss_target(ctx.doc, *target) {
                        modal.close(ctx);
                    }
                }
            }
            DomEvent::KeyDown { key } if key == "Escape" => {
                for modal in self.modals.iter_mut().filter(|m| m.is_open()) {
                    modal.close(ctx);
                }
            }
            _ => {}
        }
    }
}
