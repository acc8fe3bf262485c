use serde::{Deserialize, Serialize};

use crate::dom::NodeId;

/// Host input. The page applies the implied state change (scroll position,
/// field value, viewport size) before dispatching the matching [`DomEvent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageInput {
    Click { target: NodeId },
    KeyDown { key: String },
    ScrollTo { y: f64 },
    Resize { width: f64, height: f64 },
    Input { target: NodeId, value: String },
    Blur { target: NodeId },
    Submit { form: NodeId },
}

/// An event as seen by controllers.
#[derive(Debug, Clone, PartialEq)]
pub enum DomEvent {
    Click { target: NodeId },
    KeyDown { key: String },
    Scroll,
    Resize,
    Input { target: NodeId },
    Blur { target: NodeId },
    Submit { form: NodeId },
}

impl DomEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DomEvent::Click { .. } => "click",
            DomEvent::KeyDown { .. } => "keydown",
            DomEvent::Scroll => "scroll",
            DomEvent::Resize => "resize",
            DomEvent::Input { .. } => "input",
            DomEvent::Blur { .. } => "blur",
            DomEvent::Submit { .. } => "submit",
        }
    }

    pub fn target(&self) -> Option<NodeId> {
        match self {
            DomEvent::Click { target } | DomEvent::Input { target } | DomEvent::Blur { target } => {
                Some(*target)
            }
            DomEvent::Submit { form } => Some(*form),
            DomEvent::KeyDown { .. } | DomEvent::Scroll | DomEvent::Resize => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
    pub default_prevented: bool,
    pub propagation_stopped: bool,
}

impl DispatchOutcome {
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }
}
