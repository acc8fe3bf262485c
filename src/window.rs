//! Host window state: scroll position, viewport, location and history.

use serde::Serialize;
use url::Url;

pub const DEFAULT_VIEWPORT_WIDTH: f64 = 1280.0;
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 800.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollBehavior {
    Instant,
    Smooth,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScrollRequest {
    pub top: f64,
    pub behavior: ScrollBehavior,
}

#[derive(Debug, Clone)]
pub struct Window {
    location: Url,
    scroll_y: f64,
    inner_width: f64,
    inner_height: f64,
    history: Vec<Url>,
    scroll_requests: Vec<ScrollRequest>,
    navigations: Vec<Url>,
}

impl Window {
    pub fn new(location: Url) -> Self {
        Self {
            history: vec![location.clone()],
            location,
            scroll_y: 0.0,
            inner_width: DEFAULT_VIEWPORT_WIDTH,
            inner_height: DEFAULT_VIEWPORT_HEIGHT,
            scroll_requests: Vec::new(),
            navigations: Vec::new(),
        }
    }

    pub fn with_viewport(mut self, width: f64, height: f64) -> Self {
        self.inner_width = width;
        self.inner_height = height;
        self
    }

    pub fn location(&self) -> &Url {
        &self.location
    }

    pub fn pathname(&self) -> &str {
        self.location.path()
    }

    /// `/`, `/index.html` and an empty path all count as the homepage.
    pub fn is_homepage(&self) -> bool {
        matches!(self.pathname(), "" | "/" | "/index.html")
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    /// Returns whether the position changed.
    pub fn set_scroll_y(&mut self, y: f64) -> bool {
        let clamped = y.max(0.0);
        if clamped == self.scroll_y {
            return false;
        }
        self.scroll_y = clamped;
        true
    }

    /// Records the request and jumps straight to the destination; there is
    /// no animation in a headless window.
    pub fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior) -> bool {
        self.scroll_requests.push(ScrollRequest { top, behavior });
        self.set_scroll_y(top)
    }

    pub fn scroll_requests(&self) -> &[ScrollRequest] {
        &self.scroll_requests
    }

    pub fn inner_width(&self) -> f64 {
        self.inner_width
    }

    pub fn inner_height(&self) -> f64 {
        self.inner_height
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.inner_width = width;
        self.inner_height = height;
    }

    /// Same-document history entry, resolved against the current location.
    pub fn push_state(&mut self, href: &str) -> Result<&Url, url::ParseError> {
        let next = self.location.join(href)?;
        self.location = next.clone();
        self.history.push(next);
        Ok(&self.location)
    }

    pub fn history(&self) -> &[Url] {
        &self.history
    }

    /// A full-page navigation request. The page stays loaded; the request is
    /// recorded for the host to act on.
    pub fn navigate(&mut self, href: &str) -> Result<Url, url::ParseError> {
        let target = self.location.join(href)?;
        self.navigations.push(target.clone());
        Ok(target)
    }

    pub fn navigations(&self) -> &[Url] {
        &self.navigations
    }
}
