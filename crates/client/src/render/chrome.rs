//! Chrome/Chromium session using chromiumoxide.

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::Page;
use futures_util::StreamExt;
use serde_json::Value;
use tokio::task::JoinHandle;
use url::Url;

use super::{BrowserSession, RenderError, SessionOptions, script};

/// Flags applied to every launch: container-friendly sandboxing and no
/// automation banner for page scripts to key on.
const LAUNCH_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--disable-blink-features=AutomationControlled",
];

/// A browser process with one open page.
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromeSession {
    /// Launch a browser and open a blank page.
    ///
    /// The browser uses a background task to handle Chrome DevTools Protocol
    /// events; it is aborted on [`BrowserSession::close`].
    pub async fn launch(opts: &SessionOptions) -> Result<Self, RenderError> {
        let (width, height) = opts.viewport;
        let mut builder = BrowserConfig::builder()
            .window_size(width, height)
            .viewport(Viewport { width, height, ..Default::default() })
            .arg(format!("--user-agent={}", opts.user_agent));
        for arg in LAUNCH_ARGS {
            builder = builder.arg(*arg);
        }
        if !opts.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &opts.chrome_path {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(RenderError::BrowserLaunch)?;

        let timeout_ms = opts.launch_timeout.as_millis() as u64;
        let (browser, mut handler) = tokio::time::timeout(opts.launch_timeout, Browser::launch(config))
            .await
            .map_err(|_| RenderError::Timeout(timeout_ms))?
            .map_err(|e| RenderError::BrowserLaunch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("browser handler event error: {e}");
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                return Err(RenderError::BrowserLaunch(e.to_string()));
            }
        };

        tracing::debug!(width, height, headless = opts.headless, "browser launched");
        Ok(Self { browser, page, handler })
    }
}

#[async_trait::async_trait]
impl BrowserSession for ChromeSession {
    type Element = Element;

    async fn navigate(&self, url: &Url) -> Result<(), RenderError> {
        self.page
            .goto(url.as_str())
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?;
        Ok(())
    }

    async fn markup(&self) -> Result<String, RenderError> {
        self.page.content().await.map_err(|e| RenderError::ContentRetrieval(e.to_string()))
    }

    async fn find_elements(&self, selector: &str) -> Result<Vec<Element>, RenderError> {
        self.page
            .find_elements(selector)
            .await
            .map_err(|e| RenderError::ElementLookup(format!("{selector}: {e}")))
    }

    async fn call_on(&self, element: &Element, function: &str) -> Result<Value, RenderError> {
        let returns = element
            .call_js_fn(function, false)
            .await
            .map_err(|e| RenderError::Script(e.to_string()))?;
        if let Some(exception) = returns.exception_details {
            return Err(RenderError::Script(exception.text));
        }
        Ok(returns.result.value.unwrap_or(Value::Null))
    }

    async fn execute_script(&self, source: &str) -> Result<Value, RenderError> {
        let evaluation = self.page.evaluate(source).await.map_err(|e| RenderError::Script(e.to_string()))?;
        Ok(evaluation.value().cloned().unwrap_or(Value::Null))
    }

    async fn scroll_to(&self, y: i64) -> Result<(), RenderError> {
        self.execute_script(&script::scroll_to(y)).await.map(|_| ())
    }

    async fn page_height(&self) -> Result<i64, RenderError> {
        self.execute_script(script::PAGE_HEIGHT)
            .await?
            .as_f64()
            .map(|h| h as i64)
            .ok_or_else(|| RenderError::Script("page height unavailable".into()))
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        let closed = self.browser.close().await.map(|_| ()).map_err(|_| RenderError::BrowserClosed);
        if let Err(e) = self.browser.wait().await {
            tracing::debug!("browser process wait failed: {e}");
        }
        self.handler.abort();
        closed
    }
}
