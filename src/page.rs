//! A loaded page: document, window, timers and the controllers wired to them.

use thiserror::Error;
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::config::SiteConfig;
use crate::controller::{Controller, PageContext, ScrollLock, TimerTask};
use crate::dom::{Document, DocumentError, DomPatch, NodeId, SelectorError};
use crate::events::{DispatchOutcome, DomEvent, PageInput};
use crate::notify::NotificationCenter;
use crate::timers::{FiredTimer, TimerRegistry};
use crate::widgets::accordion::Accordion;
use crate::widgets::active_menu::ActiveMenu;
use crate::widgets::counter::CountUp;
use crate::widgets::form::ContactForm;
use crate::widgets::header_menu::HeaderMenu;
use crate::widgets::language::LanguageButtons;
use crate::widgets::menu::BurgerMenu;
use crate::widgets::modal::ModalController;
use crate::widgets::scroll_spy::ScrollSpy;
use crate::widgets::scroll_top::ScrollTop;
use crate::widgets::smooth_scroll::SmoothScroll;
use crate::window::{ScrollBehavior, Window};

#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("invalid widget selector: {0}")]
    Selector(#[from] SelectorError),
    #[error("invalid page url: {0}")]
    Url(#[from] url::ParseError),
}

pub struct Page {
    doc: Document,
    window: Window,
    timers: TimerRegistry<TimerTask>,
    notifications: NotificationCenter,
    controllers: Vec<Box<dyn Controller>>,
    scroll_lock: ScrollLock,
}

fn register<C: Controller + 'static>(controllers: &mut Vec<Box<dyn Controller>>, found: Option<C>) {
    if let Some(controller) = found {
        controllers.push(Box::new(controller));
    }
}

impl Page {
    pub fn from_html(html: &str, url: &str, config: SiteConfig) -> Result<Self, PageError> {
        let doc = Document::from_html(html)?;
        let window = Window::new(Url::parse(url)?);
        Self::assemble(doc, window, config)
    }

    /// Discovers every widget present in `doc` and runs their initial pass.
    /// Widgets whose markup is missing are simply not registered.
    pub fn assemble(doc: Document, window: Window, config: SiteConfig) -> Result<Self, PageError> {
        let scroll_lock = ScrollLock::new(doc.body());
        let mut controllers: Vec<Box<dyn Controller>> = Vec::new();

        register(&mut controllers, BurgerMenu::discover(&doc, scroll_lock, &config.menu)?);
        register(&mut controllers, HeaderMenu::discover(&doc)?);
        register(&mut controllers, SmoothScroll::discover(&doc, &config.scroll)?);
        register(&mut controllers, ScrollSpy::discover(&doc, &config.scroll)?);
        register(&mut controllers, ActiveMenu::discover(&doc)?);
        register(&mut controllers, ScrollTop::discover(&doc, &config.scroll)?);
        register(&mut controllers, CountUp::discover(&doc, &config.counter)?);
        for form in ContactForm::discover_all(&doc, &config.form)? {
            controllers.push(Box::new(form));
        }
        register(&mut controllers, ModalController::discover(&doc, scroll_lock)?);
        register(&mut controllers, Accordion::discover(&doc)?);
        register(&mut controllers, LanguageButtons::discover(&doc)?);

        let mut page = Self {
            doc,
            window,
            timers: TimerRegistry::new(),
            notifications: NotificationCenter::new(config.notifications),
            controllers,
            scroll_lock,
        };
        page.init();
        info!(
            target = "page",
            url = %page.window.location(),
            controllers = ?page.controller_names(),
            "page assembled"
        );
        Ok(page)
    }

    fn init(&mut self) {
        let Self {
            doc,
            window,
            timers,
            notifications,
            controllers,
            ..
        } = self;
        let mut ctx = PageContext {
            doc,
            window,
            timers,
            notifications,
        };
        for controller in controllers.iter_mut() {
            controller.init(&mut ctx);
        }
    }

    /// Applies `input` the way a browser would and returns whether a handler
    /// prevented the default action.
    pub fn dispatch(&mut self, input: PageInput) -> DispatchOutcome {
        match input {
            PageInput::Click { target } => self.click(target),
            PageInput::KeyDown { key } => self.fire(DomEvent::KeyDown { key }),
            PageInput::ScrollTo { y } => {
                if self.window.set_scroll_y(y) {
                    self.fire(DomEvent::Scroll)
                } else {
                    DispatchOutcome::default()
                }
            }
            PageInput::Resize { width, height } => {
                self.window.resize(width, height);
                self.fire(DomEvent::Resize)
            }
            PageInput::Input { target, value } => {
                if !self.accepts(target, "input") {
                    return DispatchOutcome::default();
                }
                self.doc.set_value(target, &value);
                self.fire(DomEvent::Input { target })
            }
            PageInput::Blur { target } => {
                if !self.accepts(target, "blur") {
                    return DispatchOutcome::default();
                }
                self.fire(DomEvent::Blur { target })
            }
            PageInput::Submit { form } => self.submit(form),
        }
    }

    fn accepts(&self, target: NodeId, event: &'static str) -> bool {
        if self.doc.is_element(target) && self.doc.is_connected(target) {
            return true;
        }
        warn!(target = "page", %target, event, "ignoring event for a node outside the document");
        false
    }

    /// True when `target` sits in a disabled form control.
    fn in_disabled_control(&self, target: NodeId) -> bool {
        self.doc.ancestors_inclusive(target).into_iter().any(|node| {
            matches!(
                self.doc.tag_name(node),
                Some("button" | "input" | "select" | "textarea")
            ) && self.doc.is_disabled(node)
        })
    }

    fn click(&mut self, target: NodeId) -> DispatchOutcome {
        if !self.accepts(target, "click") {
            return DispatchOutcome::default();
        }
        if self.in_disabled_control(target) {
            debug!(target = "page", %target, "click on disabled control");
            return DispatchOutcome::default();
        }
        self.notifications
            .handle_click(&mut self.doc, &mut self.timers, target);

        let toggles = self.doc.tag_name(target) == Some("input")
            && matches!(self.doc.input_type(target).as_str(), "checkbox" | "radio");
        let was_checked = self.doc.checked(target);
        if toggles {
            let next = self.doc.input_type(target) == "radio" || !was_checked;
            self.doc.set_checked(target, next);
        }

        let outcome = self.fire(DomEvent::Click { target });

        if toggles {
            if outcome.default_prevented {
                self.doc.set_checked(target, was_checked);
            } else if self.doc.checked(target) != was_checked {
                self.fire(DomEvent::Input { target });
            }
        }
        if !outcome.default_prevented {
            self.default_click_action(target);
        }
        outcome
    }

    fn default_click_action(&mut self, target: NodeId) {
        let chain = self.doc.ancestors_inclusive(target);
        if let Some(button) = chain.iter().copied().find(|n| self.is_submit_control(*n)) {
            match chain
                .iter()
                .copied()
                .find(|n| self.doc.tag_name(*n) == Some("form"))
            {
                Some(form) => {
                    self.submit(form);
                }
                None => trace!(target = "page", %button, "submit control outside a form"),
            }
            return;
        }

        let Some(href) = chain
            .iter()
            .find(|n| self.doc.tag_name(**n) == Some("a"))
            .and_then(|a| self.doc.attribute(*a, "href"))
        else {
            return;
        };
        if let Some(fragment) = href.strip_prefix('#') {
            let before = self.window.scroll_y();
            if let Err(err) = self.window.push_state(&href) {
                warn!(target = "page", %href, error = %err, "failed to push history entry");
                return;
            }
            let destination = if fragment.is_empty() {
                Some(0.0)
            } else {
                self.doc
                    .get_element_by_id(fragment)
                    .map(|section| self.doc.layout(section).top)
            };
            if let Some(top) = destination {
                self.window.scroll_to(top, ScrollBehavior::Instant);
            }
            self.emit_scroll_if_moved(before);
            return;
        }
        match self.window.navigate(&href) {
            Ok(url) => info!(target = "page", %url, "link navigation"),
            Err(err) => warn!(target = "page", %href, error = %err, "link does not resolve"),
        }
    }

    fn is_submit_control(&self, node: NodeId) -> bool {
        match self.doc.tag_name(node) {
            Some("button") => self
                .doc
                .attribute(node, "type")
                .map_or(true, |t| t.eq_ignore_ascii_case("submit")),
            Some("input") => matches!(self.doc.input_type(node).as_str(), "submit" | "image"),
            _ => false,
        }
    }

    fn submit(&mut self, form: NodeId) -> DispatchOutcome {
        if !self.accepts(form, "submit") {
            return DispatchOutcome::default();
        }
        if self.doc.tag_name(form) != Some("form") {
            warn!(target = "page", node = %form, "submit target is not a form");
            return DispatchOutcome::default();
        }
        let outcome = self.fire(DomEvent::Submit { form });
        if !outcome.default_prevented {
            let action = self.doc.attribute(form, "action").unwrap_or_default();
            match self.window.navigate(&action) {
                Ok(url) => info!(target = "page", %url, "form navigation"),
                Err(err) => warn!(target = "page", %action, error = %err, "form action does not resolve"),
            }
        }
        outcome
    }

    fn fire(&mut self, event: DomEvent) -> DispatchOutcome {
        let before = self.window.scroll_y();
        let mut outcome = DispatchOutcome::default();
        {
            let Self {
                doc,
                window,
                timers,
                notifications,
                controllers,
                ..
            } = self;
            let mut ctx = PageContext {
                doc,
                window,
                timers,
                notifications,
            };
            for controller in controllers.iter_mut() {
                controller.handle_event(&mut ctx, &event, &mut outcome);
                if outcome.propagation_stopped {
                    trace!(target = "page", event = event.name(), controller = controller.name(), "propagation stopped");
                    break;
                }
            }
        }
        trace!(
            target = "page",
            event = event.name(),
            prevented = outcome.default_prevented,
            "event dispatched"
        );
        if !matches!(event, DomEvent::Scroll) {
            self.emit_scroll_if_moved(before);
        }
        outcome
    }

    fn emit_scroll_if_moved(&mut self, before: f64) {
        if self.window.scroll_y() != before {
            self.fire(DomEvent::Scroll);
        }
    }

    /// Moves virtual time forward by `ms`, firing every timer that falls due
    /// on the way (including ones armed by handlers during this call).
    /// Returns the number of timers fired.
    pub fn advance(&mut self, ms: u64) -> usize {
        let until = self.timers.now_ms().saturating_add(ms);
        let mut fired = 0;
        while let Some(timer) = self.timers.pop_due(until) {
            fired += 1;
            self.run_timer(&timer);
        }
        self.timers.advance_clock_to(until);
        fired
    }

    /// Fires timers until none are left or the next one lies beyond
    /// `limit_ms` from now. Returns true when the page went idle.
    pub fn run_until_idle(&mut self, limit_ms: u64) -> bool {
        let deadline = self.timers.now_ms().saturating_add(limit_ms);
        while let Some(due) = self.timers.next_due_ms() {
            if due > deadline {
                return false;
            }
            self.advance(due.saturating_sub(self.timers.now_ms()));
        }
        true
    }

    fn run_timer(&mut self, timer: &FiredTimer<TimerTask>) {
        let before = self.window.scroll_y();
        let claimed = match timer.task {
            TimerTask::NotificationDismiss | TimerTask::NotificationRemove => {
                self.notifications
                    .handle_timer(&mut self.doc, &mut self.timers, timer)
            }
            _ => {
                let Self {
                    doc,
                    window,
                    timers,
                    notifications,
                    controllers,
                    ..
                } = self;
                let mut ctx = PageContext {
                    doc,
                    window,
                    timers,
                    notifications,
                };
                controllers
                    .iter_mut()
                    .any(|controller| controller.handle_timer(&mut ctx, timer))
            }
        };
        if !claimed {
            trace!(target = "page", timer = ?timer.id, task = ?timer.task, "timer had no owner");
        }
        self.emit_scroll_if_moved(before);
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Mutable access for hosts that feed in geometry after load.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn now_ms(&self) -> u64 {
        self.timers.now_ms()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    pub fn next_due_ms(&self) -> Option<u64> {
        self.timers.next_due_ms()
    }

    pub fn controller_names(&self) -> Vec<&'static str> {
        self.controllers.iter().map(|c| c.name()).collect()
    }

    pub fn scroll_locked(&self) -> bool {
        self.scroll_lock.is_locked(&self.doc)
    }

    pub fn query(&self, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        self.doc.query_selector(Document::ROOT, selector)
    }

    pub fn patches(&self) -> &[DomPatch] {
        self.doc.patches()
    }

    pub fn drain_patches(&mut self) -> Vec<DomPatch> {
        self.doc.drain_patches()
    }

    pub fn to_html(&self) -> String {
        self.doc.to_html()
    }
}
