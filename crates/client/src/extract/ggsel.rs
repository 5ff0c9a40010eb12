//! ggsel.net product cards.
//!
//! Cards use CSS-module class names (`ProductCard_card__hash`) with
//! `data-testid` hooks on newer builds. A "recommended for you" block repeats
//! cards from elsewhere on the site and is pruned before selection.

use std::sync::LazyLock;

use marketlens_core::CategoryFilter;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::{RawCandidate, SelectorChain, SiteExtractor, resolve_link};

/// Upper bound on cards read from one page.
pub const MAX_CARDS: usize = 500;

static CARDS: LazyLock<SelectorChain> = LazyLock::new(|| {
    SelectorChain::new(&[r#"[data-testid="product-card"]"#, r#"div[class*="ProductCard_card__"]"#])
});

static RECOMMENDATIONS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        r#"[data-testid="recommendations"], section[class*="Recommendations"], div[class*="RecommendedProducts"]"#,
    )
    .expect("invalid selector")
});

static CATEGORY: LazyLock<SelectorChain> = LazyLock::new(|| {
    SelectorChain::new(&[r#"[data-testid="card-category"]"#, r#"[class*="ProductCard_category"]"#])
});

static NAME: LazyLock<SelectorChain> = LazyLock::new(|| {
    SelectorChain::new(&[
        r#"[data-testid="card-description"]"#,
        r#"span[class*="ProductCard_description"]"#,
        r#"[class*="ProductCard_title"]"#,
    ])
});

static PRICE: LazyLock<SelectorChain> = LazyLock::new(|| {
    SelectorChain::new(&[r#"[data-testid="card-price"]"#, r#"span[class*="ProductCard_price"]"#])
});

static SALES: LazyLock<SelectorChain> = LazyLock::new(|| {
    SelectorChain::new(&[r#"[data-testid="card-counter"]"#, r#"[class*="ProductCard_counter"]"#])
});

static LINK: LazyLock<SelectorChain> =
    LazyLock::new(|| SelectorChain::new(&[r#"a[data-testid="card-link"]"#, "a[href]"]));

pub struct GgselExtractor {
    origin: Url,
}

impl GgselExtractor {
    /// Links resolve against the origin of `page_url`.
    pub fn new(page_url: &Url) -> Self {
        let origin = page_url.join("/").unwrap_or_else(|_| page_url.clone());
        Self { origin }
    }

    fn card(&self, card: ElementRef<'_>, filter: &CategoryFilter) -> Option<RawCandidate> {
        let category = CATEGORY.text(card).unwrap_or_default();
        if !filter.accepts(&category) {
            return None;
        }

        let link = LINK
            .attr(card, "href")
            .or_else(|| card.value().attr("href").map(str::to_string))
            .map(|href| resolve_link(&href, &self.origin))
            .unwrap_or_default();

        Some(RawCandidate { name: NAME.text(card), price: PRICE.text(card), sales: SALES.text(card), category, link })
    }
}

/// Detach every recommendation block so its cards are not selected.
fn prune_recommendations(page: &mut Html) {
    let ids: Vec<_> = page.root_element().select(&RECOMMENDATIONS).map(|el| el.id()).collect();
    for id in ids {
        if let Some(mut node) = page.tree.get_mut(id) {
            node.detach();
        }
    }
}

impl SiteExtractor for GgselExtractor {
    fn extract(&self, page: &mut Html, filter: &CategoryFilter) -> Vec<RawCandidate> {
        prune_recommendations(page);

        CARDS
            .all(page.root_element())
            .into_iter()
            .take(MAX_CARDS)
            .filter_map(|card| self.card(card, filter))
            .collect()
    }
}
