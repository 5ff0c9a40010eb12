//! Per-category statistics and opportunity scoring.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::product::Product;

/// How crowded a category is, by number of competing listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum CompetitionTier {
    Low,
    Medium,
    High,
}

impl CompetitionTier {
    pub fn classify(competitors: usize) -> Self {
        if competitors < 20 {
            CompetitionTier::Low
        } else if competitors < 50 {
            CompetitionTier::Medium
        } else {
            CompetitionTier::High
        }
    }

    fn points(self) -> f64 {
        match self {
            CompetitionTier::Low => 3.0,
            CompetitionTier::Medium => 1.5,
            CompetitionTier::High => 0.0,
        }
    }
}

/// Demand level, by mean unit sales across a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum DemandTier {
    Low,
    Medium,
    High,
}

impl DemandTier {
    pub fn classify(avg_sales: f64) -> Self {
        if avg_sales > 500.0 {
            DemandTier::High
        } else if avg_sales > 100.0 {
            DemandTier::Medium
        } else {
            DemandTier::Low
        }
    }

    fn points(self) -> f64 {
        match self {
            DemandTier::High => 4.0,
            DemandTier::Medium => 2.0,
            DemandTier::Low => 0.0,
        }
    }
}

/// What to do about a category given its composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Recommendation {
    Enter,
    Investigate,
    Avoid,
}

impl Recommendation {
    pub fn from_score(score: f64) -> Self {
        if score >= 7.0 {
            Recommendation::Enter
        } else if score >= 4.0 {
            Recommendation::Investigate
        } else {
            Recommendation::Avoid
        }
    }
}

macro_rules! display_as_debug {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(self, f)
            }
        })*
    };
}

display_as_debug!(CompetitionTier, DemandTier, Recommendation);

fn price_points(avg_price: f64) -> f64 {
    if avg_price > 500.0 {
        3.0
    } else if avg_price > 200.0 {
        1.5
    } else {
        0.0
    }
}

/// Composite 0-10 opportunity score: demand (0-4) + low competition (0-3) + price level (0-3).
pub fn composite_score(demand: DemandTier, competition: CompetitionTier, avg_price: f64) -> f64 {
    demand.points() + competition.points() + price_points(avg_price)
}

/// Aggregate view of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CategoryStat {
    pub category: String,
    pub competitors: usize,
    pub avg_price: f64,
    pub avg_sales: f64,
    pub total_revenue: f64,
    /// `avg_sales * avg_price / competitors`.
    pub attractiveness: f64,
    pub competition: CompetitionTier,
    pub demand: DemandTier,
    pub score: f64,
    pub recommendation: Recommendation,
}

impl CategoryStat {
    pub fn from_members(category: &str, members: &[&Product]) -> Self {
        let competitors = members.len();
        let (avg_price, avg_sales) = means(members);
        let total_revenue = members.iter().map(|p| p.revenue()).sum();

        let attractiveness = if competitors == 0 { 0.0 } else { avg_sales * avg_price / competitors as f64 };

        let competition = CompetitionTier::classify(competitors);
        let demand = DemandTier::classify(avg_sales);
        let score = composite_score(demand, competition, avg_price);

        Self {
            category: category.to_string(),
            competitors,
            avg_price,
            avg_sales,
            total_revenue,
            attractiveness,
            competition,
            demand,
            score,
            recommendation: Recommendation::from_score(score),
        }
    }
}

/// Mean price and mean sales of a group, `(0, 0)` for an empty group.
pub(crate) fn means(members: &[&Product]) -> (f64, f64) {
    if members.is_empty() {
        return (0.0, 0.0);
    }
    let n = members.len() as f64;
    let price: f64 = members.iter().map(|p| p.price).sum();
    let sales: f64 = members.iter().map(|p| p.sales as f64).sum();
    (price / n, sales / n)
}
