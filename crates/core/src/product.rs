//! Product records and list ordering.

use std::cmp::Ordering;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Label used for products that carry no category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// A single marketplace listing.
///
/// Products are only constructed once both `name` and `price` are known, so a
/// value of this type is always a complete record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Product {
    /// Listing title.
    pub name: String,
    /// Price in the marketplace's native currency.
    pub price: f64,
    /// Estimated cumulative unit sales (0 when the page shows none).
    #[serde(default)]
    pub sales: u64,
    /// Category label, empty when the page does not expose one.
    #[serde(default)]
    pub category: String,
    /// Absolute link to the listing, empty when unknown.
    #[serde(default)]
    pub link: String,
}

impl Product {
    pub fn new(name: impl Into<String>, price: f64, sales: u64) -> Self {
        Self { name: name.into(), price, sales, category: String::new(), link: String::new() }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }

    /// Estimated revenue, `price * sales`.
    pub fn revenue(&self) -> f64 {
        self.price * self.sales as f64
    }

    /// Category used for grouping; empty categories collapse into [`UNCATEGORIZED`].
    pub fn category_label(&self) -> &str {
        let trimmed = self.category.trim();
        if trimmed.is_empty() { UNCATEGORIZED } else { trimmed }
    }
}

/// Ordering applied to an extracted product list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    SalesDesc,
    PriceAsc,
    PriceDesc,
    RevenueDesc,
}

impl SortBy {
    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            SortBy::SalesDesc => b.sales.cmp(&a.sales),
            SortBy::PriceAsc => a.price.total_cmp(&b.price),
            SortBy::PriceDesc => b.price.total_cmp(&a.price),
            SortBy::RevenueDesc => b.revenue().total_cmp(&a.revenue()),
        }
    }

    /// Sort `products` in place. The sort is stable, so equal keys keep page order.
    pub fn sort(self, products: &mut [Product]) {
        products.sort_by(|a, b| self.compare(a, b));
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SortBy::SalesDesc => "sales_desc",
            SortBy::PriceAsc => "price_asc",
            SortBy::PriceDesc => "price_desc",
            SortBy::RevenueDesc => "revenue_desc",
        };
        f.write_str(label)
    }
}

/// Category restriction applied while extracting listing cards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    /// Interpret a user-facing label. "All", "Все" and blank mean no filter;
    /// anything else is matched exactly against card categories.
    pub fn parse(label: &str) -> Self {
        let trimmed = label.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") || trimmed == "Все" {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(trimmed.to_string())
        }
    }

    pub fn accepts(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => wanted == category,
        }
    }
}
