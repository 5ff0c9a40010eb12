//! MCP tool implementations.
//!
//! This module contains all tools exposed by the marketlens server.

pub mod market_analyze;
pub mod market_scan;

use marketlens_core::{AppConfig, Error};

pub use market_analyze::{MarketAnalyzeParams, analyze_impl};
pub use market_scan::{MarketScanParams, scan_impl};

/// Per-call top-N override, falling back to the configured default.
fn resolve_top_limit(requested: Option<usize>, config: &AppConfig) -> Result<usize, Error> {
    match requested {
        Some(0) => Err(Error::InvalidInput("top_limit must be greater than 0".into())),
        Some(limit) => Ok(limit),
        None => Ok(config.top_limit),
    }
}
