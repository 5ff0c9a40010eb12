//! Fixed price bands.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::product::Product;

/// Price band a product falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub enum Segment {
    /// Below 200.
    Budget,
    /// 200 to 500, both ends inclusive.
    Mid,
    /// Above 500.
    Premium,
}

impl Segment {
    pub const ALL: [Segment; 3] = [Segment::Budget, Segment::Mid, Segment::Premium];

    pub fn of(price: f64) -> Self {
        if price < 200.0 {
            Segment::Budget
        } else if price <= 500.0 {
            Segment::Mid
        } else {
            Segment::Premium
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PriceSegment {
    pub segment: Segment,
    pub count: usize,
    pub avg_sales: f64,
    pub total_revenue: f64,
}

/// Bucket products into [`Segment`]s. Bands without members are left out.
pub fn price_segments(products: &[Product]) -> Vec<PriceSegment> {
    Segment::ALL
        .into_iter()
        .filter_map(|segment| {
            let members: Vec<&Product> = products.iter().filter(|p| Segment::of(p.price) == segment).collect();
            if members.is_empty() {
                return None;
            }
            let count = members.len();
            let sales: f64 = members.iter().map(|p| p.sales as f64).sum();
            let total_revenue = members.iter().map(|p| p.revenue()).sum();
            Some(PriceSegment { segment, count, avg_sales: sales / count as f64, total_revenue })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_boundaries() {
        assert_eq!(Segment::of(0.0), Segment::Budget);
        assert_eq!(Segment::of(199.99), Segment::Budget);
        assert_eq!(Segment::of(200.0), Segment::Mid);
        assert_eq!(Segment::of(500.0), Segment::Mid);
        assert_eq!(Segment::of(500.01), Segment::Premium);
    }

    #[test]
    fn test_empty_bands_are_omitted() {
        let products = vec![Product::new("a", 50.0, 10), Product::new("b", 900.0, 2)];
        let segments = price_segments(&products);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].segment, Segment::Budget);
        assert_eq!(segments[1].segment, Segment::Premium);
    }

    #[test]
    fn test_segment_aggregates() {
        let products = vec![Product::new("a", 200.0, 10), Product::new("b", 400.0, 30), Product::new("c", 10.0, 1)];
        let segments = price_segments(&products);
        let mid = segments.iter().find(|s| s.segment == Segment::Mid).unwrap();

        assert_eq!(mid.count, 2);
        assert_eq!(mid.avg_sales, 20.0);
        assert_eq!(mid.total_revenue, 200.0 * 10.0 + 400.0 * 30.0);
    }

    #[test]
    fn test_no_products_no_segments() {
        assert!(price_segments(&[]).is_empty());
    }
}
