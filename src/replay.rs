//! Scripted interaction: a list of steps addressed by CSS selector, replayed
//! against a page in virtual time.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::dom::{NodeId, SelectorError};
use crate::events::PageInput;
use crate::notify::Notification;
use crate::page::Page;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read replay script: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML script: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to parse JSON step: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Selector(#[from] SelectorError),
    #[error("no element matches `{0}`")]
    NoMatch(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ReplayStep {
    Click { selector: String },
    /// Types `text` one character at a time, appending to the current value.
    TypeText { selector: String, text: String },
    KeyDown { key: String },
    ScrollTo { y: f64 },
    Resize { width: f64, height: f64 },
    Blur { selector: String },
    Submit { selector: String },
    /// Host geometry for an element, as a layout engine would report it.
    SetLayout { selector: String, top: f64, height: f64 },
    Pump { duration_ms: u64 },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub steps: Vec<ReplayStep>,
}

impl ReplayScript {
    /// `.json` files are read as JSON, everything else as YAML.
    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let contents = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Ok(serde_json::from_str(&contents)?)
        } else {
            Self::from_yaml(&contents)
        }
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ReplayError> {
        Ok(serde_yaml::from_str(contents)?)
    }
}

/// Final page state after a replay.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub url: String,
    pub elapsed_ms: u64,
    pub controllers: Vec<&'static str>,
    pub navigations: Vec<String>,
    pub history: Vec<String>,
    pub notifications: Vec<Notification>,
    pub patch_count: usize,
    pub scroll_y: f64,
    pub scroll_locked: bool,
    pub pending_timers: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

impl ReplayReport {
    pub fn capture(page: &Page, include_html: bool) -> Self {
        let window = page.window();
        Self {
            url: window.location().to_string(),
            elapsed_ms: page.now_ms(),
            controllers: page.controller_names(),
            navigations: window.navigations().iter().map(|u| u.to_string()).collect(),
            history: window.history().iter().map(|u| u.to_string()).collect(),
            notifications: page.notifications().history().to_vec(),
            patch_count: page.patches().len(),
            scroll_y: window.scroll_y(),
            scroll_locked: page.scroll_locked(),
            pending_timers: page.pending_timers(),
            html: include_html.then(|| page.to_html()),
        }
    }
}

fn resolve(page: &Page, selector: &str) -> Result<NodeId, ReplayError> {
    page.query(selector)?
        .ok_or_else(|| ReplayError::NoMatch(selector.to_string()))
}

/// Applies one step. `Pump` steps are returned as the number of
/// milliseconds the caller should let pass.
pub fn apply_step(page: &mut Page, step: &ReplayStep) -> Result<Option<u64>, ReplayError> {
    debug!(target = "replay", ?step, "applying step");
    match step {
        ReplayStep::Click { selector } => {
            let target = resolve(page, selector)?;
            page.dispatch(PageInput::Click { target });
        }
        ReplayStep::TypeText { selector, text } => {
            let target = resolve(page, selector)?;
            let mut value = page.document().value(target);
            for ch in text.chars() {
                value.push(ch);
                page.dispatch(PageInput::Input {
                    target,
                    value: value.clone(),
                });
            }
        }
        ReplayStep::KeyDown { key } => {
            page.dispatch(PageInput::KeyDown { key: key.clone() });
        }
        ReplayStep::ScrollTo { y } => {
            page.dispatch(PageInput::ScrollTo { y: *y });
        }
        ReplayStep::Resize { width, height } => {
            page.dispatch(PageInput::Resize {
                width: *width,
                height: *height,
            });
        }
        ReplayStep::Blur { selector } => {
            let target = resolve(page, selector)?;
            page.dispatch(PageInput::Blur { target });
        }
        ReplayStep::Submit { selector } => {
            let form = resolve(page, selector)?;
            page.dispatch(PageInput::Submit { form });
        }
        ReplayStep::SetLayout {
            selector,
            top,
            height,
        } => {
            let target = resolve(page, selector)?;
            page.document_mut().set_layout(target, *top, *height);
        }
        ReplayStep::Pump { duration_ms } => return Ok(Some(*duration_ms)),
    }
    Ok(None)
}

/// Replays `script` in virtual time; pumps advance the page clock directly.
pub fn run(page: &mut Page, script: &ReplayScript) -> Result<(), ReplayError> {
    for step in &script.steps {
        if let Some(duration_ms) = apply_step(page, step)? {
            page.advance(duration_ms);
        }
    }
    Ok(())
}
