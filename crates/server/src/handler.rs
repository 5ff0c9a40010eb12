//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::{MarketAnalyzeParams, MarketScanParams, analyze_impl, scan_impl};
use marketlens_core::AppConfig;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for marketlens.
#[derive(Clone)]
pub struct MarketLensServer {
    tool_router: ToolRouter<Self>,
    config: Arc<AppConfig>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl MarketLensServer {
    /// Create a new server handler.
    pub fn new(config: AppConfig) -> Self {
        Self { tool_router: Self::tool_router(), config: Arc::new(config) }
    }

    /// Scan a marketplace listing.
    ///
    /// Opens the page in a browser session, loads every card the page offers
    /// (sliders, "show more", infinite scroll) and extracts the products.
    #[tool(
        description = "Scan a marketplace listing page (ggsel.net, plati.market or any shop) in a headless browser. Returns the extracted products (name, price, sales, category, link) sorted as requested, plus a market report: category stats with recommendations, price segments, anomalies and top products by revenue."
    )]
    async fn market_scan(&self, params: Parameters<MarketScanParams>) -> Result<CallToolResult, McpError> {
        scan_impl(&self.config, params.0).await
    }

    /// Analyze a product list.
    ///
    /// No browser or network access; the products come from the caller.
    #[tool(
        description = "Compute a market report for a list of products: summary, category competition/demand with entry recommendations, price segments, pricing anomalies and top products by revenue."
    )]
    async fn market_analyze(&self, params: Parameters<MarketAnalyzeParams>) -> Result<CallToolResult, McpError> {
        analyze_impl(&self.config, params.0).await
    }
}

impl ServerHandler for MarketLensServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "marketlens".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Use market_scan to extract products from a listing URL, market_analyze to re-run analytics on a product list."
                    .into(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
