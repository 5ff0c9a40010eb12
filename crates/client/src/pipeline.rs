//! One extraction run: launch, navigate, stabilize, extract, sort.
//!
//! The browser session is owned by the run and closed on every exit path.
//! Card-level problems never fail a run; only session, navigation and markup
//! failures do, plus the terminal "nothing extracted" case.

use std::fmt;
use std::time::Duration;

use marketlens_core::{AppConfig, CategoryFilter, Error, Product, SortBy};

use crate::extract::extract_products;
use crate::render::{BrowserSession, Pacing, SessionOptions, script, stabilize};
use crate::site::Target;

/// Coarse progress points reported during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    Started,
    Stabilizing,
    Parsing,
    Done,
}

impl Milestone {
    /// Completion percentage for progress displays.
    pub fn percent(self) -> u8 {
        match self {
            Milestone::Started => 10,
            Milestone::Stabilizing => 30,
            Milestone::Parsing => 80,
            Milestone::Done => 100,
        }
    }
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Milestone::Started => "started",
            Milestone::Stabilizing => "stabilizing",
            Milestone::Parsing => "parsing",
            Milestone::Done => "done",
        };
        write!(f, "{label} ({}%)", self.percent())
    }
}

/// What to extract and how to order it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    pub target: Target,
    pub sort_by: SortBy,
    pub category: CategoryFilter,
}

impl ExtractionRequest {
    /// Canonicalize `url` and detect its site variant.
    pub fn new(url: &str) -> Result<Self, Error> {
        let target = Target::parse(url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Ok(Self { target, sort_by: SortBy::default(), category: CategoryFilter::All })
    }

    pub fn sort_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn category(mut self, category: CategoryFilter) -> Self {
        self.category = category;
        self
    }
}

/// Runs extraction requests with one configuration.
#[derive(Debug, Clone)]
pub struct Pipeline {
    session: SessionOptions,
    settle: Duration,
    pacing: Pacing,
}

impl Pipeline {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            session: SessionOptions::from(config),
            settle: config.settle(),
            pacing: Pacing::from_step(config.step_delay()),
        }
    }

    /// Override the waits; tests run with [`Pacing::immediate`].
    pub fn with_timing(mut self, settle: Duration, pacing: Pacing) -> Self {
        self.settle = settle;
        self.pacing = pacing;
        self
    }

    /// Launch a Chrome session and run `request` in it.
    ///
    /// # Errors
    ///
    /// - `Error::Session` if the browser cannot be launched
    /// - anything [`Pipeline::run_with_session`] returns
    #[cfg(feature = "render")]
    pub async fn run<P>(&self, request: &ExtractionRequest, progress: &P) -> Result<Vec<Product>, Error>
    where
        P: Fn(Milestone) + Sync,
    {
        progress(Milestone::Started);
        let session = crate::render::ChromeSession::launch(&self.session)
            .await
            .map_err(|e| Error::Session(e.to_string()))?;
        self.run_with_session(session, request, progress).await
    }

    /// Run `request` in an already-open session, closing it afterwards.
    ///
    /// # Errors
    ///
    /// - `Error::ExtractFailed` if navigation fails
    /// - `Error::RenderFailed` if the rendered markup cannot be read
    /// - `Error::NoProducts` if no card yields a product
    pub async fn run_with_session<S, P>(
        &self, mut session: S, request: &ExtractionRequest, progress: &P,
    ) -> Result<Vec<Product>, Error>
    where
        S: BrowserSession,
        P: Fn(Milestone) + Sync,
    {
        let result = self.drive(&session, request, progress).await;
        if let Err(e) = session.close().await {
            tracing::warn!(error = %e, "failed to close browser session");
        }
        result
    }

    async fn drive<S, P>(&self, session: &S, request: &ExtractionRequest, progress: &P) -> Result<Vec<Product>, Error>
    where
        S: BrowserSession,
        P: Fn(Milestone) + Sync,
    {
        let target = &request.target;
        session
            .navigate(&target.url)
            .await
            .map_err(|e| Error::ExtractFailed(e.to_string()))?;
        if let Err(e) = session.execute_script(script::HIDE_WEBDRIVER).await {
            tracing::debug!(error = %e, "could not mask webdriver flag");
        }
        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }

        progress(Milestone::Stabilizing);
        let stabilized = stabilize(session, target.idiom, self.pacing)
            .await
            .map_err(|e| Error::RenderFailed(e.to_string()))?;

        progress(Milestone::Parsing);
        let mut products = extract_products(&stabilized.html, &target.url, target.variant, &request.category);
        if products.is_empty() {
            return Err(Error::NoProducts);
        }
        request.sort_by.sort(&mut products);

        tracing::info!(
            url = %target.url,
            variant = %target.variant,
            idiom = %target.idiom,
            outcome = %stabilized.report.outcome,
            products = products.len(),
            sort_by = %request.sort_by,
            "extraction finished"
        );
        progress(Milestone::Done);
        Ok(products)
    }
}

/// Run one extraction with a fresh browser session.
#[cfg(feature = "render")]
pub async fn run_extraction<P>(config: &AppConfig, request: &ExtractionRequest, progress: &P) -> Result<Vec<Product>, Error>
where
    P: Fn(Milestone) + Sync,
{
    Pipeline::new(config).run(request, progress).await
}
