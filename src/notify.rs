//! Toast notifications stacked in a lazily created corner container.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::NotificationConfig;
use crate::controller::TimerTask;
use crate::dom::{Document, NodeId};
use crate::timers::{FiredTimer, TimerId, TimerRegistry};

pub const CONTAINER_ID: &str = "notify-container";

const CONTAINER_STYLE: &[(&str, &str)] = &[
    ("position", "fixed"),
    ("top", "20px"),
    ("right", "20px"),
    ("z-index", "9999"),
    ("max-width", "320px"),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Warning,
    Danger,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Info => "info",
            NotificationKind::Success => "success",
            NotificationKind::Warning => "warning",
            NotificationKind::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationState {
    Visible,
    Fading,
    Removed,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub alert: NodeId,
    pub close_button: NodeId,
    pub kind: NotificationKind,
    pub message: String,
    pub shown_at_ms: u64,
    pub state: NotificationState,
    #[serde(skip)]
    dismiss_timer: Option<TimerId>,
    #[serde(skip)]
    remove_timer: Option<TimerId>,
}

#[derive(Debug)]
pub struct NotificationCenter {
    config: NotificationConfig,
    container: Option<NodeId>,
    shown: Vec<Notification>,
}

impl NotificationCenter {
    pub fn new(config: NotificationConfig) -> Self {
        Self {
            config,
            container: None,
            shown: Vec::new(),
        }
    }

    /// Appends one alert to the container, creating the container on first
    /// use, and arms its auto-dismiss timer.
    pub fn show(
        &mut self,
        doc: &mut Document,
        timers: &mut TimerRegistry<TimerTask>,
        message: &str,
        kind: NotificationKind,
    ) -> NodeId {
        let container = self.ensure_container(doc);

        let alert = doc.create_element("div");
        doc.set_attribute(
            alert,
            "class",
            &format!("alert alert-{} alert-dismissible fade show", kind.as_str()),
        );
        doc.set_attribute(alert, "role", "alert");
        let text = doc.create_text(message);
        doc.append_child(alert, text);

        let close_button = doc.create_element("button");
        doc.set_attribute(close_button, "type", "button");
        doc.set_attribute(close_button, "class", "btn-close");
        doc.set_attribute(close_button, "aria-label", "Close");
        doc.append_child(alert, close_button);
        doc.append_child(container, alert);

        let dismiss_timer =
            timers.set_timeout(self.config.auto_dismiss_ms, TimerTask::NotificationDismiss);
        debug!(target = "notify", kind = kind.as_str(), %alert, "notification shown");

        self.shown.push(Notification {
            alert,
            close_button,
            kind,
            message: message.to_string(),
            shown_at_ms: timers.now_ms(),
            state: NotificationState::Visible,
            dismiss_timer: Some(dismiss_timer),
            remove_timer: None,
        });
        alert
    }

    fn ensure_container(&mut self, doc: &mut Document) -> NodeId {
        if let Some(existing) = self.container.filter(|c| doc.is_connected(*c)) {
            return existing;
        }
        if let Some(existing) = doc.get_element_by_id(CONTAINER_ID) {
            self.container = Some(existing);
            return existing;
        }
        let container = doc.create_element("div");
        doc.set_attribute(container, "id", CONTAINER_ID);
        let style = CONTAINER_STYLE
            .iter()
            .map(|(key, value)| format!("{key}: {value};"))
            .collect::<Vec<_>>()
            .join(" ");
        doc.set_attribute(container, "style", &style);
        doc.append_child(doc.body(), container);
        self.container = Some(container);
        container
    }

    /// Starts the fade-out of `alert`. Already fading or removed alerts are
    /// left alone.
    pub fn dismiss(
        &mut self,
        doc: &mut Document,
        timers: &mut TimerRegistry<TimerTask>,
        alert: NodeId,
    ) -> bool {
        let fade_ms = self.config.fade_ms;
        let Some(entry) = self
            .shown
            .iter_mut()
            .find(|n| n.alert == alert && n.state == NotificationState::Visible)
        else {
            return false;
        };
        if let Some(timer) = entry.dismiss_timer.take() {
            timers.clear_timer(timer);
        }
        doc.remove_class(alert, "show");
        entry.state = NotificationState::Fading;
        entry.remove_timer = Some(timers.set_timeout(fade_ms, TimerTask::NotificationRemove));
        true
    }

    /// Close-button activation. Returns true when `target` hit a close button.
    pub fn handle_click(
        &mut self,
        doc: &mut Document,
        timers: &mut TimerRegistry<TimerTask>,
        target: NodeId,
    ) -> bool {
        let hit = self
            .shown
            .iter()
            .find(|n| n.state == NotificationState::Visible && doc.contains(n.close_button, target))
            .map(|n| n.alert);
        match hit {
            Some(alert) => self.dismiss(doc, timers, alert),
            None => false,
        }
    }

    pub fn handle_timer(
        &mut self,
        doc: &mut Document,
        timers: &mut TimerRegistry<TimerTask>,
        fired: &FiredTimer<TimerTask>,
    ) -> bool {
        match fired.task {
            TimerTask::NotificationDismiss => {
                let alert = self
                    .shown
                    .iter()
                    .find(|n| n.dismiss_timer == Some(fired.id))
                    .map(|n| n.alert);
                match alert {
                    Some(alert) => self.dismiss(doc, timers, alert),
                    None => false,
                }
            }
            TimerTask::NotificationRemove => {
                let Some(entry) = self
                    .shown
                    .iter_mut()
                    .find(|n| n.remove_timer == Some(fired.id))
                else {
                    return false;
                };
                entry.remove_timer = None;
                entry.state = NotificationState::Removed;
                doc.remove(entry.alert);
                debug!(target = "notify", alert = %entry.alert, "notification removed");
                true
            }
            _ => false,
        }
    }

    pub fn container(&self) -> Option<NodeId> {
        self.container
    }

    /// Every notification shown during the page session, in call order.
    pub fn history(&self) -> &[Notification] {
        &self.shown
    }

    pub fn visible(&self) -> impl Iterator<Item = &Notification> {
        self.shown
            .iter()
            .filter(|n| n.state != NotificationState::Removed)
    }

    pub fn count_of(&self, kind: NotificationKind) -> usize {
        self.shown.iter().filter(|n| n.kind == kind).count()
    }
}
