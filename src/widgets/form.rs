//! Contact forms: inline validation and a simulated submission that ends on
//! the thank-you page.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::validation::{is_validated_control, validate_field, ValidationFailure};
use super::{compile, select_all};
use crate::config::FormConfig;
use crate::controller::{Controller, PageContext, TimerTask};
use crate::debounce::Debouncer;
use crate::dom::{Document, NodeId, SelectorError, SelectorList};
use crate::events::{DispatchOutcome, DomEvent};
use crate::notify::NotificationKind;
use crate::timers::{FiredTimer, TimerId};

pub const FORM_SELECTOR: &str = ".c-form, form[id*=\"contact\"], form[id*=\"Contact\"]";
const FIELD_SELECTOR: &str = "input, textarea, select";
const SUBMIT_SELECTOR: &str = "[type=\"submit\"]";
const FEEDBACK_SELECTOR: &str = ".invalid-feedback";

const VALID_CLASS: &str = "is-valid";
const INVALID_CLASS: &str = "is-invalid";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    #[default]
    Idle,
    /// Busy indicator shown, waiting for the simulated response.
    Submitting,
    /// Success reported, waiting to leave for the thank-you page.
    SuccessShown,
    Navigated,
}

#[derive(Debug)]
struct Field {
    node: NodeId,
    revalidate: Debouncer<()>,
}

#[derive(Debug, Default)]
struct Submission {
    state: SubmissionState,
    timer: Option<TimerId>,
    saved_label: Vec<NodeId>,
}

pub struct ContactForm {
    form: NodeId,
    fields: Vec<Field>,
    submit: Option<NodeId>,
    submission: Submission,
    feedback_selector: SelectorList,
    config: FormConfig,
}

impl ContactForm {
    pub fn new(
        doc: &Document,
        form: NodeId,
        config: &FormConfig,
    ) -> Result<Self, SelectorError> {
        let fields = doc
            .query_selector_all(form, FIELD_SELECTOR)?
            .into_iter()
            .filter(|node| is_validated_control(doc, *node))
            .map(|node| Field {
                node,
                revalidate: Debouncer::new(config.revalidate_debounce_ms),
            })
            .collect();
        Ok(Self {
            form,
            fields,
            submit: doc.query_selector(form, SUBMIT_SELECTOR)?,
            submission: Submission::default(),
            feedback_selector: compile(FEEDBACK_SELECTOR)?,
            config: config.clone(),
        })
    }

    /// One controller per matching form, in document order.
    pub fn discover_all(doc: &Document, config: &FormConfig) -> Result<Vec<Self>, SelectorError> {
        select_all(doc, FORM_SELECTOR)?
            .into_iter()
            .map(|form| Self::new(doc, form, config))
            .collect()
    }

    pub fn form(&self) -> NodeId {
        self.form
    }

    pub fn state(&self) -> SubmissionState {
        self.submission.state
    }

    fn field_index(&self, node: NodeId) -> Option<usize> {
        self.fields.iter().position(|f| f.node == node)
    }

    /// Validates `field` and renders the outcome: `is-valid`, or `is-invalid`
    /// plus a single feedback message in the field's parent.
    fn validate(&self, ctx: &mut PageContext<'_>, field: NodeId) -> Result<(), ValidationFailure> {
        ctx.doc.remove_class(field, INVALID_CLASS);
        ctx.doc.remove_class(field, VALID_CLASS);
        let parent = ctx.doc.parent(field);
        if let Some(stale) = parent.and_then(|p| ctx.doc.select_first(p, &self.feedback_selector)) {
            ctx.doc.remove(stale);
        }

        let result = validate_field(ctx.doc, field, &self.config.messages);
        match &result {
            Ok(()) => ctx.doc.add_class(field, VALID_CLASS),
            Err(failure) => {
                ctx.doc.add_class(field, INVALID_CLASS);
                if let Some(parent) = parent {
                    let feedback = ctx.doc.create_element("div");
                    ctx.doc.set_attribute(feedback, "class", "invalid-feedback");
                    ctx.doc.set_text_content(feedback, &failure.message);
                    ctx.doc.append_child(parent, feedback);
                }
            }
        }
        result
    }

    fn submit(&mut self, ctx: &mut PageContext<'_>) {
        if self.submission.state != SubmissionState::Idle {
            debug!(target = "form", form = %self.form, state = ?self.submission.state, "submission already in flight");
            return;
        }

        let nodes: Vec<NodeId> = self.fields.iter().map(|f| f.node).collect();
        let failures = nodes
            .into_iter()
            .filter(|node| self.validate(ctx, *node).is_err())
            .count();
        if failures > 0 {
            debug!(target = "form", form = %self.form, failures, "submission blocked");
            ctx.notify(&self.config.messages.blocked, NotificationKind::Danger);
            return;
        }

        let Some(button) = self.submit else {
            return;
        };
        ctx.doc.set_disabled(button, true);
        self.submission.saved_label = ctx.doc.take_children(button);
        let spinner = ctx.doc.create_element("span");
        ctx.doc
            .set_attribute(spinner, "class", "spinner-border spinner-border-sm me-2");
        ctx.doc.set_attribute(spinner, "role", "status");
        ctx.doc.set_attribute(spinner, "aria-hidden", "true");
        ctx.doc.append_child(button, spinner);
        let label = ctx.doc.create_text(&self.config.messages.busy_label);
        ctx.doc.append_child(button, label);

        self.submission.timer = Some(
            ctx.timers
                .set_timeout(self.config.submit_delay_ms, TimerTask::SubmitStep),
        );
        self.submission.state = SubmissionState::Submitting;
        debug!(target = "form", form = %self.form, "submitting");
    }

    fn finish_submission(&mut self, ctx: &mut PageContext<'_>) {
        ctx.notify(&self.config.messages.success, NotificationKind::Success);

        for field in &mut self.fields {
            field.revalidate.cancel(ctx.timers);
            ctx.doc.reset_control(field.node);
            ctx.doc.remove_class(field.node, VALID_CLASS);
            ctx.doc.remove_class(field.node, INVALID_CLASS);
        }
        if let Some(button) = self.submit {
            ctx.doc.set_disabled(button, false);
            ctx.doc.take_children(button);
            for child in std::mem::take(&mut self.submission.saved_label) {
                ctx.doc.append_child(button, child);
            }
        }

        self.submission.timer = Some(
            ctx.timers
                .set_timeout(self.config.redirect_delay_ms, TimerTask::SubmitStep),
        );
        self.submission.state = SubmissionState::SuccessShown;
    }

    fn leave_page(&mut self, ctx: &mut PageContext<'_>) {
        self.submission.timer = None;
        self.submission.state = SubmissionState::Navigated;
        match ctx.window.navigate(&self.config.thank_you_path) {
            Ok(url) => info!(target = "form", %url, "navigating to thank-you page"),
            Err(err) => warn!(
                target = "form",
                path = %self.config.thank_you_path,
                error = %err,
                "thank-you path does not resolve"
            ),
        }
    }
}

impl Controller for ContactForm {
    fn name(&self) -> &'static str {
        "form"
    }

    fn handle_event(
        &mut self,
        ctx: &mut PageContext<'_>,
        event: &DomEvent,
        outcome: &mut DispatchOutcome,
    ) {
        match event {
            DomEvent::Blur { target } => {
                if self.field_index(*target).is_some() {
                    let _ = self.validate(ctx, *target);
                }
            }
            DomEvent::Input { target } => {
                if let Some(index) = self.field_index(*target) {
                    self.fields[index]
                        .revalidate
                        .call(ctx.timers, TimerTask::FieldRevalidate, ());
                }
            }
            DomEvent::Submit { form } if *form == self.form => {
                outcome.prevent_default();
                outcome.stop_propagation();
                self.submit(ctx);
            }
            _ => {}
        }
    }

    fn handle_timer(&mut self, ctx: &mut PageContext<'_>, timer: &FiredTimer<TimerTask>) -> bool {
        if self.submission.timer == Some(timer.id) {
            match self.submission.state {
                SubmissionState::Submitting => self.finish_submission(ctx),
                SubmissionState::SuccessShown => self.leave_page(ctx),
                SubmissionState::Idle | SubmissionState::Navigated => {}
            }
            return true;
        }

        let Some(index) = self
            .fields
            .iter_mut()
            .position(|f| f.revalidate.take_fired(timer.id).is_some())
        else {
            return false;
        };
        let node = self.fields[index].node;
        if ctx.doc.has_class(node, INVALID_CLASS) {
            let _ = self.validate(ctx, node);
        }
        true
    }
}
