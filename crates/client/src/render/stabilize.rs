//! Page stabilization: coax a listing into rendering all of its cards.
//!
//! Each loading idiom is a bounded loop. Faults in a single element probe are
//! skipped; a fault in the loop itself ends that loop early, and whatever the
//! page rendered so far is still captured.

use std::fmt;
use std::time::Duration;

use super::{BrowserSession, RenderError, script};
use crate::site::Idiom;

pub const CAROUSEL_MAX_CLICKS: usize = 15;
pub const LOAD_MORE_MAX_CLICKS: usize = 30;
pub const SCROLL_MAX_STEPS: usize = 30;
/// Unchanged-height observations that count as "no more content".
pub const SCROLL_STALL_LIMIT: usize = 3;
pub const SCROLL_STEP_PX: i64 = 600;
/// Every this many scroll steps, wait an extra settle period.
pub const SCROLL_SETTLE_EVERY: usize = 3;

pub const NEXT_SLIDE_CONTROLS: &str =
    r#"button[aria-label="Next slide"], button.swiper-button-next, button[class*="next"]"#;
pub const SHOW_MORE_CONTROL: &str = r#"[data-testid="show-more-button"]"#;
pub const SHOW_MORE_FALLBACK: &str = "button";
const SHOW_MORE_LABELS: &[&str] = &["показать еще", "показать ещё", "show more"];

/// Pauses between stabilization actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// After each scroll or load-more click.
    pub step: Duration,
    /// Between bringing a control into view and clicking it, and after a click.
    pub click: Duration,
    /// Longer wait for lazy content to finish arriving.
    pub settle: Duration,
}

impl Pacing {
    /// Derive click and settle pauses from the base step delay.
    pub fn from_step(step: Duration) -> Self {
        Self { step, click: step / 2, settle: step * 2 }
    }

    /// No waiting at all.
    pub const fn immediate() -> Self {
        Self { step: Duration::ZERO, click: Duration::ZERO, settle: Duration::ZERO }
    }
}

/// How a stabilization loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The page stopped offering new content.
    Converged,
    /// The step bound was reached first.
    Exhausted,
    /// A browser call failed and the loop stopped early.
    Faulted,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Converged => write!(f, "converged"),
            Self::Exhausted => write!(f, "exhausted"),
            Self::Faulted => write!(f, "faulted"),
        }
    }
}

/// Counters from one stabilization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StabilizeReport {
    pub idiom: Idiom,
    pub clicks: usize,
    pub scroll_steps: usize,
    /// Outcome of the last loop that ran.
    pub outcome: Outcome,
}

/// Markup captured once the page has stabilized.
#[derive(Debug, Clone)]
pub struct Stabilized {
    pub html: String,
    pub report: StabilizeReport,
}

/// Run the loop for `idiom`, then capture the rendered markup.
///
/// Only the final markup capture can fail; loop faults are logged and recorded
/// in the report.
pub async fn stabilize<S: BrowserSession>(session: &S, idiom: Idiom, pacing: Pacing) -> Result<Stabilized, RenderError> {
    let stabilizer = Stabilizer { session, pacing };
    let report = match idiom {
        Idiom::Carousel => stabilizer.carousel().await,
        Idiom::LoadMore => stabilizer.load_more().await,
        Idiom::InfiniteScroll => {
            let (scroll_steps, outcome) = stabilizer.infinite_scroll().await;
            StabilizeReport { idiom, clicks: 0, scroll_steps, outcome }
        }
    };
    tracing::debug!(
        %idiom,
        clicks = report.clicks,
        scroll_steps = report.scroll_steps,
        outcome = %report.outcome,
        "page stabilized"
    );

    let html = session.markup().await?;
    Ok(Stabilized { html, report })
}

struct Stabilizer<'s, S> {
    session: &'s S,
    pacing: Pacing,
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

fn fault(stage: &str, error: &RenderError) -> Outcome {
    tracing::debug!(stage, error = %error, "stabilization step failed");
    Outcome::Faulted
}

impl<S: BrowserSession> Stabilizer<'_, S> {
    /// Advance every slider until no enabled "next" control remains, then
    /// scroll the page.
    async fn carousel(&self) -> StabilizeReport {
        let mut clicks = 0;
        let slider_outcome = loop {
            if clicks >= CAROUSEL_MAX_CLICKS {
                break Outcome::Exhausted;
            }
            let control = match self.first_matching(NEXT_SLIDE_CONTROLS, script::IS_CLICKABLE_FN).await {
                Ok(Some(control)) => control,
                Ok(None) => break Outcome::Converged,
                Err(e) => break fault("carousel", &e),
            };
            if let Err(e) = self.click(&control).await {
                break fault("carousel", &e);
            }
            clicks += 1;
        };
        tracing::debug!(clicks, outcome = %slider_outcome, "carousel advanced");

        pause(self.pacing.settle).await;
        let (scroll_steps, outcome) = self.infinite_scroll().await;
        StabilizeReport { idiom: Idiom::Carousel, clicks, scroll_steps, outcome }
    }

    /// Scroll to the bottom and press "show more" while it stays visible.
    async fn load_more(&self) -> StabilizeReport {
        let mut clicks = 0;
        let outcome = loop {
            if clicks >= LOAD_MORE_MAX_CLICKS {
                break Outcome::Exhausted;
            }
            if let Err(e) = self.scroll_to_bottom().await {
                break fault("load_more", &e);
            }
            pause(self.pacing.step).await;

            let button = match self.show_more_button().await {
                Ok(Some(button)) => button,
                Ok(None) => break Outcome::Converged,
                Err(e) => break fault("load_more", &e),
            };
            if let Err(e) = self.click(&button).await {
                break fault("load_more", &e);
            }
            clicks += 1;
            pause(self.pacing.step).await;
        };
        StabilizeReport { idiom: Idiom::LoadMore, clicks, scroll_steps: 0, outcome }
    }

    /// Scroll down in fixed steps until the page height stops growing.
    async fn infinite_scroll(&self) -> (usize, Outcome) {
        let mut last_height = match self.session.page_height().await {
            Ok(h) => h,
            Err(e) => return (0, fault("scroll", &e)),
        };
        let mut position = 0;
        let mut stalls = 0;
        let mut steps = 0;

        loop {
            if steps >= SCROLL_MAX_STEPS {
                return (steps, Outcome::Exhausted);
            }
            position += SCROLL_STEP_PX;
            if let Err(e) = self.session.scroll_to(position).await {
                return (steps, fault("scroll", &e));
            }
            steps += 1;
            pause(self.pacing.step).await;
            if steps % SCROLL_SETTLE_EVERY == 0 {
                pause(self.pacing.settle).await;
            }

            let height = match self.session.page_height().await {
                Ok(h) => h,
                Err(e) => return (steps, fault("scroll", &e)),
            };
            if height == last_height {
                stalls += 1;
                if stalls >= SCROLL_STALL_LIMIT {
                    return (steps, Outcome::Converged);
                }
            } else {
                stalls = 0;
                last_height = height;
            }
        }
    }

    async fn scroll_to_bottom(&self) -> Result<(), RenderError> {
        let height = self.session.page_height().await?;
        self.session.scroll_to(height).await
    }

    /// The primary "show more" control, else a button labelled like one;
    /// `None` when neither exists or the one found is not visible.
    async fn show_more_button(&self) -> Result<Option<S::Element>, RenderError> {
        let mut candidates = self.session.find_elements(SHOW_MORE_CONTROL).await?;
        let button = if candidates.is_empty() {
            self.labelled_button().await?
        } else {
            Some(candidates.swap_remove(0))
        };

        let Some(button) = button else { return Ok(None) };
        let visible = self.session.call_on(&button, script::IS_VISIBLE_FN).await?;
        Ok(visible.as_bool().unwrap_or(false).then_some(button))
    }

    async fn labelled_button(&self) -> Result<Option<S::Element>, RenderError> {
        for button in self.session.find_elements(SHOW_MORE_FALLBACK).await? {
            let Ok(text) = self.session.call_on(&button, script::TEXT_FN).await else {
                continue;
            };
            let label = text.as_str().unwrap_or_default().to_lowercase();
            if SHOW_MORE_LABELS.iter().any(|l| label.contains(l)) {
                return Ok(Some(button));
            }
        }
        Ok(None)
    }

    /// First element matching `selector` for which `probe` returns `true`.
    /// Elements whose probe fails are skipped.
    async fn first_matching(&self, selector: &str, probe: &str) -> Result<Option<S::Element>, RenderError> {
        for element in self.session.find_elements(selector).await? {
            match self.session.call_on(&element, probe).await {
                Ok(v) if v.as_bool() == Some(true) => return Ok(Some(element)),
                Ok(_) => {}
                Err(e) => tracing::debug!(error = %e, "skipping control"),
            }
        }
        Ok(None)
    }

    async fn click(&self, element: &S::Element) -> Result<(), RenderError> {
        self.session.call_on(element, script::SCROLL_INTO_VIEW_FN).await?;
        pause(self.pacing.click).await;
        self.session.call_on(element, script::CLICK_FN).await?;
        pause(self.pacing.click).await;
        Ok(())
    }
}
