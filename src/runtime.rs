//! Drives a page in real time: steps arrive over a channel while a ticker
//! feeds elapsed wall-clock time into the page's timer registry.

use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::page::Page;
use crate::replay::{apply_step, ReplayStep};

pub const DEFAULT_TICK: Duration = Duration::from_millis(16);

struct Clock {
    last: Instant,
}

impl Clock {
    fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Advances the page by whole milliseconds elapsed since the last catch-up.
    fn catch_up(&mut self, page: &mut Page) {
        let elapsed = Instant::now().duration_since(self.last).as_millis() as u64;
        if elapsed == 0 {
            return;
        }
        page.advance(elapsed);
        self.last += Duration::from_millis(elapsed);
    }
}

/// Runs until the page navigates away, or the step channel is closed and no
/// timers remain. Steps that fail to resolve are logged and skipped.
pub async fn drive(
    page: &mut Page,
    mut steps: mpsc::UnboundedReceiver<ReplayStep>,
    tick: Duration,
) -> Result<()> {
    let mut ticker = time::interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut clock = Clock::new();
    let mut accepting = true;

    loop {
        if let Some(url) = page.window().navigations().last() {
            info!(target = "runtime", %url, "page navigated away");
            break;
        }
        if !accepting && page.pending_timers() == 0 {
            debug!(target = "runtime", "input closed and page idle");
            break;
        }

        tokio::select! {
            step = steps.recv(), if accepting => match step {
                Some(step) => {
                    clock.catch_up(page);
                    match apply_step(page, &step) {
                        Ok(Some(duration_ms)) => {
                            time::sleep(Duration::from_millis(duration_ms)).await;
                            clock.catch_up(page);
                        }
                        Ok(None) => {}
                        Err(err) => warn!(target = "runtime", ?step, error = %err, "skipping step"),
                    }
                }
                None => accepting = false,
            },
            _ = ticker.tick() => clock.catch_up(page),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    const PAGE: &str = r#"<html><body>
        <button class="navbar-toggler">menu</button>
        <nav class="navbar-collapse"><a class="nav-link" href="/over.html">Over</a></nav>
    </body></html>"#;

    #[tokio::test(start_paused = true)]
    async fn stops_once_input_closes_and_timers_drain() {
        let mut page = Page::from_html(PAGE, "https://example.test/", SiteConfig::default()).unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(ReplayStep::Click {
            selector: ".navbar-toggler".into(),
        })
        .unwrap();
        tx.send(ReplayStep::Resize {
            width: 1280.0,
            height: 800.0,
        })
        .unwrap();
        drop(tx);

        drive(&mut page, rx, DEFAULT_TICK).await.unwrap();

        assert!(!page.scroll_locked());
        assert_eq!(page.pending_timers(), 0);
        assert!(page.now_ms() >= 200);
    }

    #[tokio::test(start_paused = true)]
    async fn skips_steps_that_match_nothing() {
        let mut page = Page::from_html(PAGE, "https://example.test/", SiteConfig::default()).unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(ReplayStep::Click {
            selector: "#missing".into(),
        })
        .unwrap();
        tx.send(ReplayStep::Click {
            selector: ".navbar-toggler".into(),
        })
        .unwrap();
        drop(tx);

        drive(&mut page, rx, DEFAULT_TICK).await.unwrap();
        assert!(page.scroll_locked());
    }
}
