//! Count-up animation for statistics, started when the figure scrolls into
//! view.

use tracing::{debug, warn};

use super::select_all;
use crate::config::CounterConfig;
use crate::controller::{Controller, PageContext, TimerTask};
use crate::dom::{Document, NodeId, SelectorError};
use crate::events::{DispatchOutcome, DomEvent};
use crate::timers::{FiredTimer, TimerId};
use crate::window::Window;

pub const COUNTER_SELECTOR: &str = "[data-count]";

const COUNTED_CLASS: &str = "counted";

#[derive(Debug)]
struct Animation {
    timer: TimerId,
    current: f64,
    step: f64,
    target: i64,
}

#[derive(Debug)]
struct Counter {
    element: NodeId,
    animation: Option<Animation>,
}

pub struct CountUp {
    counters: Vec<Counter>,
    config: CounterConfig,
}

impl CountUp {
    pub fn new(elements: Vec<NodeId>, config: &CounterConfig) -> Self {
        Self {
            counters: elements
                .into_iter()
                .map(|element| Counter {
                    element,
                    animation: None,
                })
                .collect(),
            config: config.clone(),
        }
    }

    pub fn discover(doc: &Document, config: &CounterConfig) -> Result<Option<Self>, SelectorError> {
        let elements = select_all(doc, COUNTER_SELECTOR)?;
        Ok((!elements.is_empty()).then(|| Self::new(elements, config)))
    }

    pub fn is_animating(&self) -> bool {
        self.counters.iter().any(|c| c.animation.is_some())
    }

    fn check_visibility(&mut self, ctx: &mut PageContext<'_>) {
        for counter in &mut self.counters {
            if ctx.doc.has_class(counter.element, COUNTED_CLASS) {
                continue;
            }
            if !visible_enough(ctx.doc, ctx.window, counter.element, self.config.visibility_threshold) {
                continue;
            }
            ctx.doc.add_class(counter.element, COUNTED_CLASS);

            let raw = ctx
                .doc
                .attribute(counter.element, "data-count")
                .unwrap_or_default();
            let Some(target) = parse_leading_int(&raw) else {
                warn!(target = "counter", element = %counter.element, value = %raw, "data-count is not a number");
                continue;
            };
            let frames = self.config.duration_ms as f64 / self.config.frame_ms as f64;
            let timer = ctx
                .timers
                .set_interval(self.config.frame_ms, TimerTask::CounterFrame);
            counter.animation = Some(Animation {
                timer,
                current: 0.0,
                step: target as f64 / frames,
                target,
            });
            debug!(target = "counter", element = %counter.element, target, "count-up started");
        }
    }
}

/// Whether at least `threshold` of the element's height lies inside the
/// viewport. Zero-height elements count as visible when their top is.
pub fn visible_enough(doc: &Document, window: &Window, element: NodeId, threshold: f64) -> bool {
    let layout = doc.layout(element);
    let top = layout.top - window.scroll_y();
    let viewport = window.inner_height();
    if layout.height <= 0.0 {
        return top >= 0.0 && top <= viewport;
    }
    let overlap = (top + layout.height).min(viewport) - top.max(0.0);
    overlap.max(0.0) / layout.height >= threshold
}

/// Integer prefix of `raw` after leading whitespace, with an optional sign.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|value| sign * value)
}

impl Controller for CountUp {
    fn name(&self) -> &'static str {
        "counter"
    }

    fn init(&mut self, ctx: &mut PageContext<'_>) {
        self.check_visibility(ctx);
    }

    fn handle_event(
        &mut self,
        ctx: &mut PageContext<'_>,
        event: &DomEvent,
        _outcome: &mut DispatchOutcome,
    ) {
        if matches!(event, DomEvent::Scroll | DomEvent::Resize) {
            self.check_visibility(ctx);
        }
    }

    fn handle_timer(&mut self, ctx: &mut PageContext<'_>, timer: &FiredTimer<TimerTask>) -> bool {
        let Some(counter) = self
            .counters
            .iter_mut()
            .find(|c| c.animation.as_ref().is_some_and(|a| a.timer == timer.id))
        else {
            return false;
        };
        let Some(animation) = counter.animation.as_mut() else {
            return false;
        };

        animation.current += animation.step;
        if animation.current >= animation.target as f64 {
            ctx.doc
                .set_text_content(counter.element, &animation.target.to_string());
            ctx.timers.clear_timer(animation.timer);
            counter.animation = None;
        } else {
            let shown = animation.current.floor() as i64;
            ctx.doc.set_text_content(counter.element, &shown.to_string());
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_like_a_lenient_integer_reader() {
        assert_eq!(parse_leading_int("150"), Some(150));
        assert_eq!(parse_leading_int("  42+"), Some(42));
        assert_eq!(parse_leading_int("98%"), Some(98));
        assert_eq!(parse_leading_int("-7"), Some(-7));
        assert_eq!(parse_leading_int("veel"), None);
        assert_eq!(parse_leading_int(""), None);
    }

    #[test]
    fn half_visible_counts_as_visible() {
        let mut doc = Document::new();
        let el = doc.create_element("span");
        doc.append_child(doc.body(), el);
        let window = Window::new(url::Url::parse("https://example.test/").unwrap());

        doc.set_layout(el, 700.0, 200.0);
        assert!(visible_enough(&doc, &window, el, 0.5));
        doc.set_layout(el, 720.0, 200.0);
        assert!(!visible_enough(&doc, &window, el, 0.5));
        doc.set_layout(el, 800.0, 0.0);
        assert!(visible_enough(&doc, &window, el, 0.5));
        doc.set_layout(el, 801.0, 0.0);
        assert!(!visible_enough(&doc, &window, el, 0.5));
    }
}
