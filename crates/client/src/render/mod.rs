//! Browser session control for JS-rendered listings.
//!
//! The pipeline talks to the browser only through the `BrowserSession` trait.
//! The chromiumoxide implementation is feature-gated behind `render`; tests
//! drive the same code with a scripted in-memory session.

#[cfg(feature = "render")]
pub mod chrome;
#[cfg(test)]
pub(crate) mod fake;
pub mod script;
pub mod stabilize;

use std::path::PathBuf;
use std::time::Duration;

use marketlens_core::AppConfig;
use serde_json::Value;
use thiserror::Error;
use url::Url;

#[cfg(feature = "render")]
pub use chrome::ChromeSession;
pub use stabilize::{Outcome, Pacing, StabilizeReport, Stabilized, stabilize};

/// Errors raised while driving a browser session.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Failed to launch or connect to browser.
    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),

    /// Failed to navigate to URL.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// Failed to get page content.
    #[error("content retrieval failed: {0}")]
    ContentRetrieval(String),

    /// Element lookup by selector failed.
    #[error("element lookup failed: {0}")]
    ElementLookup(String),

    /// Script evaluation threw or returned nothing usable.
    #[error("script failed: {0}")]
    Script(String),

    /// Timeout waiting for the browser.
    #[error("render timeout after {0}ms")]
    Timeout(u64),

    /// Browser closed unexpectedly.
    #[error("browser closed unexpectedly")]
    BrowserClosed,
}

/// Launch parameters for a browser session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub user_agent: String,
    /// Viewport dimensions (default: 1920x1080).
    pub viewport: (u32, u32),
    pub headless: bool,
    /// Explicit browser binary; autodetected when `None`.
    pub chrome_path: Option<PathBuf>,
    pub launch_timeout: Duration,
}

impl From<&AppConfig> for SessionOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            viewport: (config.viewport_width, config.viewport_height),
            headless: config.headless,
            chrome_path: config.chrome_path.clone(),
            launch_timeout: config.launch_timeout(),
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

/// One live browser page.
///
/// Element handles are opaque; anything done to an element goes through
/// [`BrowserSession::call_on`] with one of the functions in [`script`].
#[async_trait::async_trait]
pub trait BrowserSession: Send + Sync {
    type Element: Send + Sync;

    /// Load `url` and wait for navigation to finish.
    async fn navigate(&self, url: &Url) -> Result<(), RenderError>;

    /// Current rendered markup of the page.
    async fn markup(&self) -> Result<String, RenderError>;

    /// All elements matching a CSS selector, in document order.
    async fn find_elements(&self, selector: &str) -> Result<Vec<Self::Element>, RenderError>;

    /// Call a JS function declaration with `this` bound to `element`.
    async fn call_on(&self, element: &Self::Element, function: &str) -> Result<Value, RenderError>;

    /// Evaluate a script in the page and return its value.
    async fn execute_script(&self, script: &str) -> Result<Value, RenderError>;

    /// Scroll the window to vertical offset `y`.
    async fn scroll_to(&self, y: i64) -> Result<(), RenderError>;

    /// Full scrollable height of the document.
    async fn page_height(&self) -> Result<i64, RenderError>;

    /// Shut the browser down. Called exactly once, on every pipeline path.
    async fn close(&mut self) -> Result<(), RenderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_options_from_config() {
        let config = AppConfig { viewport_width: 1280, viewport_height: 720, headless: false, ..Default::default() };
        let opts = SessionOptions::from(&config);
        assert_eq!(opts.viewport, (1280, 720));
        assert!(!opts.headless);
        assert_eq!(opts.launch_timeout, Duration::from_secs(30));
        assert_eq!(opts.user_agent, config.user_agent);
    }

    #[test]
    fn test_session_options_default() {
        let opts = SessionOptions::default();
        assert_eq!(opts.viewport, (1920, 1080));
        assert!(opts.headless);
        assert!(opts.chrome_path.is_none());
    }

    #[test]
    fn test_render_error_display() {
        assert_eq!(RenderError::Timeout(1500).to_string(), "render timeout after 1500ms");
        assert_eq!(RenderError::Script("boom".into()).to_string(), "script failed: boom");
    }
}
