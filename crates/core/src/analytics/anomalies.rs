//! Outlier detection against per-category baselines.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::category::means;
use crate::product::Product;

/// Categories smaller than this are too noisy to judge.
pub const MIN_CATEGORY_SIZE: usize = 3;

/// A product selling above its category average while priced well below it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PriceRaise {
    pub product: Product,
    pub category_avg_price: f64,
    /// `(category_avg_price - price) * sales`.
    pub potential_gain: f64,
}

impl PriceRaise {
    fn new(product: &Product, category_avg_price: f64) -> Self {
        let potential_gain = (category_avg_price - product.price) * product.sales as f64;
        Self { product: product.clone(), category_avg_price, potential_gain }
    }
}

/// Products that deviate from their category baseline.
///
/// The lists are independent: one product can appear in several of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Anomalies {
    /// Priced well above the category and still outselling it.
    pub premium_demand: Vec<Product>,
    /// Cheap for the category yet selling poorly.
    pub low_performance: Vec<Product>,
    /// Underpriced bestsellers.
    pub price_raise: Vec<PriceRaise>,
}

impl Anomalies {
    pub fn is_empty(&self) -> bool {
        self.premium_demand.is_empty() && self.low_performance.is_empty() && self.price_raise.is_empty()
    }
}

pub(crate) fn detect(groups: &BTreeMap<&str, Vec<&Product>>) -> Anomalies {
    let mut out = Anomalies::default();

    for members in groups.values().filter(|m| m.len() >= MIN_CATEGORY_SIZE) {
        let (avg_price, avg_sales) = means(members);

        for product in members {
            let sales = product.sales as f64;

            if product.price > avg_price * 1.5 && sales > avg_sales {
                out.premium_demand.push((*product).clone());
            }
            if product.price < avg_price * 0.7 && sales < avg_sales * 0.5 {
                out.low_performance.push((*product).clone());
            }
            if product.price < avg_price * 0.8 && sales > avg_sales {
                out.price_raise.push(PriceRaise::new(product, avg_price));
            }
        }
    }

    out
}
