//! market_scan tool implementation.
//!
//! Renders a marketplace listing in a browser session, extracts its product
//! cards and returns them with the market report for the same list.

use chrono::Utc;
use marketlens_client::{ExtractionRequest, Milestone};
use marketlens_core::{AnalyticsEngine, AppConfig, CategoryFilter, Error, MarketReport, Product, SortBy};
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::resolve_top_limit;

/// Input parameters for market_scan tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MarketScanParams {
    /// Listing URL (ggsel.net, plati.market or any shop page).
    pub url: String,

    /// Ordering of the returned products (default: sales_desc).
    #[serde(default)]
    pub sort_by: Option<SortBy>,

    /// Category label to keep, e.g. "Ключ" or "DLC". "All"/"Все" keeps everything.
    /// Only ggsel.net cards carry categories.
    #[serde(default)]
    pub category: Option<String>,

    /// Length of the top-by-revenue ranking (default: server config).
    #[serde(default)]
    pub top_limit: Option<usize>,
}

/// Output structure for market_scan tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MarketScanOutput {
    /// Canonicalized listing URL.
    pub url: String,
    /// Detected site variant.
    pub site: String,
    /// ISO8601 timestamp of when the scan finished.
    pub scanned_at: String,
    pub sort_by: SortBy,
    /// Extracted products in the requested order.
    pub products: Vec<Product>,
    pub report: MarketReport,
}

/// Implementation of the market_scan tool.
pub async fn scan_impl(config: &AppConfig, params: MarketScanParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }
    let top_limit = resolve_top_limit(params.top_limit, config)?;

    let request = ExtractionRequest::new(&params.url)?
        .sort_by(params.sort_by.unwrap_or_default())
        .category(CategoryFilter::parse(params.category.as_deref().unwrap_or_default()));

    let url = request.target.url.to_string();
    let progress = |milestone: Milestone| tracing::info!(url = %url, progress = milestone.percent(), "market_scan");
    let products = extract(config, &request, &progress).await?;

    let report = AnalyticsEngine::new(&products).report(top_limit);
    let output = MarketScanOutput {
        url: request.target.url.to_string(),
        site: request.target.variant.to_string(),
        scanned_at: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        sort_by: request.sort_by,
        products,
        report,
    };

    Ok(CallToolResult::success(vec![Content::text(
        serde_json::to_string_pretty(&output).unwrap_or_default(),
    )]))
}

#[cfg(feature = "render")]
async fn extract<P>(config: &AppConfig, request: &ExtractionRequest, progress: &P) -> Result<Vec<Product>, Error>
where
    P: Fn(Milestone) + Sync,
{
    marketlens_client::run_extraction(config, request, progress).await
}

#[cfg(not(feature = "render"))]
async fn extract<P>(_config: &AppConfig, _request: &ExtractionRequest, _progress: &P) -> Result<Vec<Product>, Error>
where
    P: Fn(Milestone) + Sync,
{
    Err(Error::RenderDisabled)
}
