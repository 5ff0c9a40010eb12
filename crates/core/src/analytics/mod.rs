//! Market-opportunity analytics over an extracted product list.
//!
//! Everything here is a pure function of the products passed in: the engine
//! holds no state besides the borrowed slice, and repeated calls over the same
//! list return identical values. Grouping is done with a `BTreeMap` so that
//! iteration order, and with it floating-point summation order, never changes.
//!
//! ### Queries
//! - [`AnalyticsEngine::category_stats`]: per-category scoring, best first.
//! - [`AnalyticsEngine::price_segments`]: Budget / Mid / Premium bands.
//! - [`AnalyticsEngine::anomalies`]: outliers against their category baseline.
//! - [`AnalyticsEngine::top_products`]: highest estimated revenue.

pub mod anomalies;
pub mod category;
pub mod segments;

pub use anomalies::{Anomalies, MIN_CATEGORY_SIZE, PriceRaise};
pub use category::{CategoryStat, CompetitionTier, DemandTier, Recommendation, composite_score};
pub use segments::{PriceSegment, Segment};

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::product::Product;

/// Default length of the top-by-revenue ranking.
pub const DEFAULT_TOP_LIMIT: usize = 10;

/// A product paired with its estimated revenue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TopProduct {
    #[serde(flatten)]
    pub product: Product,
    pub revenue: f64,
}

/// Headline numbers for a whole product list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MarketSummary {
    pub products: usize,
    pub categories: usize,
    pub total_revenue: f64,
    pub avg_price: f64,
    pub avg_sales: f64,
}

/// All analytics for one product list, bundled for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MarketReport {
    pub summary: MarketSummary,
    pub categories: Vec<CategoryStat>,
    pub segments: Vec<PriceSegment>,
    pub anomalies: Anomalies,
    pub top_products: Vec<TopProduct>,
}

/// Partition products by [`Product::category_label`].
pub fn group_by_category(products: &[Product]) -> BTreeMap<&str, Vec<&Product>> {
    let mut groups: BTreeMap<&str, Vec<&Product>> = BTreeMap::new();
    for product in products {
        groups.entry(product.category_label()).or_default().push(product);
    }
    groups
}

/// Stateless analytics view over a completed product list.
#[derive(Debug, Clone, Copy)]
pub struct AnalyticsEngine<'a> {
    products: &'a [Product],
}

impl<'a> AnalyticsEngine<'a> {
    pub fn new(products: &'a [Product]) -> Self {
        Self { products }
    }

    /// Per-category statistics ordered by attractiveness, highest first.
    /// Equal attractiveness falls back to category name order.
    pub fn category_stats(&self) -> Vec<CategoryStat> {
        let mut stats: Vec<CategoryStat> = group_by_category(self.products)
            .iter()
            .map(|(category, members)| CategoryStat::from_members(category, members))
            .collect();
        stats.sort_by(|a, b| b.attractiveness.total_cmp(&a.attractiveness));
        stats
    }

    pub fn price_segments(&self) -> Vec<PriceSegment> {
        segments::price_segments(self.products)
    }

    pub fn anomalies(&self) -> Anomalies {
        anomalies::detect(&group_by_category(self.products))
    }

    /// Products ranked by `price * sales`, truncated to `limit`.
    pub fn top_products(&self, limit: usize) -> Vec<TopProduct> {
        let mut ranked: Vec<TopProduct> = self
            .products
            .iter()
            .map(|p| TopProduct { product: p.clone(), revenue: p.revenue() })
            .collect();
        ranked.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
        ranked.truncate(limit);
        ranked
    }

    pub fn summary(&self) -> MarketSummary {
        let count = self.products.len();
        let total_revenue = self.products.iter().map(Product::revenue).sum();
        let (avg_price, avg_sales) = if count == 0 {
            (0.0, 0.0)
        } else {
            let n = count as f64;
            (
                self.products.iter().map(|p| p.price).sum::<f64>() / n,
                self.products.iter().map(|p| p.sales as f64).sum::<f64>() / n,
            )
        };

        MarketSummary {
            products: count,
            categories: group_by_category(self.products).len(),
            total_revenue,
            avg_price,
            avg_sales,
        }
    }

    pub fn report(&self, top_limit: usize) -> MarketReport {
        MarketReport {
            summary: self.summary(),
            categories: self.category_stats(),
            segments: self.price_segments(),
            anomalies: self.anomalies(),
            top_products: self.top_products(top_limit),
        }
    }
}
