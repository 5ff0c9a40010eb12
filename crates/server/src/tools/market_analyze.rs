//! market_analyze tool implementation.
//!
//! Pure analytics over a caller-supplied product list; no browser involved.

use marketlens_core::{AnalyticsEngine, AppConfig, Error, Product};
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::resolve_top_limit;

/// Input parameters for market_analyze tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MarketAnalyzeParams {
    /// Products to analyze, e.g. the `products` of a market_scan result.
    pub products: Vec<Product>,

    /// Length of the top-by-revenue ranking (default: server config).
    #[serde(default)]
    pub top_limit: Option<usize>,
}

fn validate(products: &[Product]) -> Result<(), Error> {
    if products.is_empty() {
        return Err(Error::InvalidInput("products cannot be empty".into()));
    }
    if let Some(bad) = products.iter().find(|p| !p.price.is_finite() || p.price < 0.0) {
        return Err(Error::InvalidInput(format!("invalid price for {:?}: {}", bad.name, bad.price)));
    }
    Ok(())
}

/// Implementation of the market_analyze tool.
pub async fn analyze_impl(config: &AppConfig, params: MarketAnalyzeParams) -> Result<CallToolResult, McpError> {
    validate(&params.products)?;
    let top_limit = resolve_top_limit(params.top_limit, config)?;

    let report = AnalyticsEngine::new(&params.products).report(top_limit);
    tracing::debug!(
        products = report.summary.products,
        categories = report.summary.categories,
        "market_analyze"
    );

    Ok(CallToolResult::success(vec![Content::text(
        serde_json::to_string_pretty(&report).unwrap_or_default(),
    )]))
}

#[cfg(test)]
mod tests {
    use marketlens_core::MarketReport;

    use super::*;

    fn products() -> Vec<Product> {
        vec![
            Product::new("Steam 500", 520.0, 800).with_category("Пополнение"),
            Product::new("Steam 1000", 1030.0, 300).with_category("Пополнение"),
            Product::new("Hades II", 450.0, 120).with_category("Ключ"),
            Product::new("Elden Ring DLC", 1200.0, 40).with_category("DLC"),
        ]
    }

    fn report_of(result: CallToolResult) -> MarketReport {
        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        let text = content_val
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content");
        serde_json::from_str(text).unwrap()
    }

    #[tokio::test]
    async fn test_analyze_report() {
        let params = MarketAnalyzeParams { products: products(), top_limit: Some(2) };
        let report = report_of(analyze_impl(&AppConfig::default(), params).await.unwrap());

        assert_eq!(report.summary.products, 4);
        assert_eq!(report.summary.categories, 3);
        assert_eq!(report.categories.len(), 3);
        assert_eq!(report.top_products.len(), 2);
        assert_eq!(report.top_products[0].product.name, "Steam 500");
    }

    #[tokio::test]
    async fn test_analyze_uses_config_top_limit() {
        let config = AppConfig { top_limit: 3, ..Default::default() };
        let params = MarketAnalyzeParams { products: products(), top_limit: None };
        let report = report_of(analyze_impl(&config, params).await.unwrap());
        assert_eq!(report.top_products.len(), 3);
    }

    #[tokio::test]
    async fn test_analyze_empty_products() {
        let params = MarketAnalyzeParams { products: Vec::new(), top_limit: None };
        let err = analyze_impl(&AppConfig::default(), params).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }

    #[tokio::test]
    async fn test_analyze_negative_price() {
        let params = MarketAnalyzeParams { products: vec![Product::new("Bad", -1.0, 5)], top_limit: None };
        let err = analyze_impl(&AppConfig::default(), params).await.unwrap_err();
        assert!(err.message.contains("Bad"));
    }

    #[test]
    fn test_params_accept_products_without_optional_fields() {
        let params: MarketAnalyzeParams =
            serde_json::from_str(r#"{"products": [{"name": "Key", "price": 99.5}]}"#).unwrap();
        assert_eq!(params.products[0].sales, 0);
        assert_eq!(params.products[0].category, "");
    }
}
