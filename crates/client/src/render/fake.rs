//! Scripted in-memory browser session for tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use url::Url;

use super::{BrowserSession, RenderError, script};

/// A clickable element found by an exact selector string.
#[derive(Debug, Clone)]
pub(crate) struct FakeControl {
    selector: String,
    text: String,
    /// Stops being clickable/visible after this many clicks.
    disabled_after: Option<usize>,
    failing_probe: bool,
    clicks: usize,
}

impl FakeControl {
    pub(crate) fn new(selector: &str) -> Self {
        Self { selector: selector.into(), text: String::new(), disabled_after: None, failing_probe: false, clicks: 0 }
    }

    pub(crate) fn with_text(mut self, text: &str) -> Self {
        self.text = text.into();
        self
    }

    pub(crate) fn disabled_after(mut self, clicks: usize) -> Self {
        self.disabled_after = Some(clicks);
        self
    }

    pub(crate) fn failing_probe(mut self) -> Self {
        self.failing_probe = true;
        self
    }

    fn active(&self) -> bool {
        self.disabled_after.is_none_or(|n| self.clicks < n)
    }
}

/// Everything the session observed, for assertions.
#[derive(Debug, Default)]
pub(crate) struct FakeState {
    pub(crate) html: String,
    pub(crate) heights: VecDeque<i64>,
    pub(crate) current_height: i64,
    pub(crate) controls: Vec<FakeControl>,
    pub(crate) scrolls: Vec<i64>,
    pub(crate) scripts: Vec<String>,
    pub(crate) navigated: Vec<String>,
    pub(crate) closed: usize,
    fail_navigation: bool,
    fail_markup: bool,
    fail_scroll_after: Option<usize>,
}

impl FakeState {
    pub(crate) fn clicks_on(&self, index: usize) -> usize {
        self.controls[index].clicks
    }
}

/// Cloning shares state, so a test can keep a handle after moving the
/// session into the pipeline.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeSession {
    state: Arc<Mutex<FakeState>>,
}

impl FakeSession {
    pub(crate) fn new(html: &str) -> Self {
        let session = Self::default();
        session.probe().html = html.into();
        session
    }

    /// Successive `page_height` results; the last one repeats.
    pub(crate) fn with_heights(self, heights: impl IntoIterator<Item = i64>) -> Self {
        self.probe().heights = heights.into_iter().collect();
        self
    }

    pub(crate) fn with_control(self, control: FakeControl) -> Self {
        self.probe().controls.push(control);
        self
    }

    pub(crate) fn failing_navigation(self) -> Self {
        self.probe().fail_navigation = true;
        self
    }

    pub(crate) fn failing_markup(self) -> Self {
        self.probe().fail_markup = true;
        self
    }

    pub(crate) fn failing_scroll_after(self, scrolls: usize) -> Self {
        self.probe().fail_scroll_after = Some(scrolls);
        self
    }

    pub(crate) fn probe(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl BrowserSession for FakeSession {
    type Element = usize;

    async fn navigate(&self, url: &Url) -> Result<(), RenderError> {
        let mut state = self.probe();
        state.navigated.push(url.to_string());
        if state.fail_navigation {
            return Err(RenderError::Navigation("net::ERR_NAME_NOT_RESOLVED".into()));
        }
        Ok(())
    }

    async fn markup(&self) -> Result<String, RenderError> {
        let state = self.probe();
        if state.fail_markup {
            return Err(RenderError::ContentRetrieval("target closed".into()));
        }
        Ok(state.html.clone())
    }

    async fn find_elements(&self, selector: &str) -> Result<Vec<usize>, RenderError> {
        let state = self.probe();
        Ok(state
            .controls
            .iter()
            .enumerate()
            .filter(|(_, c)| c.selector == selector)
            .map(|(i, _)| i)
            .collect())
    }

    async fn call_on(&self, element: &usize, function: &str) -> Result<Value, RenderError> {
        let mut state = self.probe();
        let control = state
            .controls
            .get_mut(*element)
            .ok_or_else(|| RenderError::ElementLookup(format!("no element {element}")))?;

        match function {
            script::IS_CLICKABLE_FN | script::IS_VISIBLE_FN if control.failing_probe => {
                Err(RenderError::Script("detached node".into()))
            }
            script::IS_CLICKABLE_FN | script::IS_VISIBLE_FN => Ok(Value::Bool(control.active())),
            script::SCROLL_INTO_VIEW_FN => Ok(Value::Bool(true)),
            script::CLICK_FN => {
                control.clicks += 1;
                Ok(Value::Bool(true))
            }
            script::TEXT_FN => Ok(Value::String(control.text.clone())),
            _ => Ok(Value::Null),
        }
    }

    async fn execute_script(&self, source: &str) -> Result<Value, RenderError> {
        self.probe().scripts.push(source.into());
        Ok(Value::Bool(true))
    }

    async fn scroll_to(&self, y: i64) -> Result<(), RenderError> {
        let mut state = self.probe();
        if state.fail_scroll_after.is_some_and(|n| state.scrolls.len() >= n) {
            return Err(RenderError::Script("execution context destroyed".into()));
        }
        state.scrolls.push(y);
        Ok(())
    }

    async fn page_height(&self) -> Result<i64, RenderError> {
        let mut state = self.probe();
        if let Some(next) = state.heights.pop_front() {
            state.current_height = next;
        }
        Ok(state.current_height)
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        self.probe().closed += 1;
        Ok(())
    }
}
