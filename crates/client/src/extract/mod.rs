//! Product card extraction from rendered listing markup.
//!
//! ### Site extractors
//! - Each marketplace family gets a `SiteExtractor` reading its own card layout.
//! - Field lookups go through `SelectorChain`s: ordered selector tables tried
//!   until one yields a value, so markup drift degrades to a fallback instead
//!   of an empty result.
//!
//! ### Candidates
//! - Extractors produce `RawCandidate`s holding display text only.
//! - Normalization into `Product` happens once, here; candidates without a
//!   name or with an unparseable price are dropped, never fatal.

pub mod generic;
pub mod ggsel;
pub mod links;
pub mod normalize;
pub mod plati;

pub use generic::GenericExtractor;
pub use ggsel::GgselExtractor;
pub use links::resolve_link;
pub use normalize::{PriceParseError, parse_price, parse_sales_count};
pub use plati::PlatiExtractor;

use marketlens_core::{CategoryFilter, Product};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::site::SiteVariant;

/// Display text lifted from one product card, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCandidate {
    pub name: Option<String>,
    pub price: Option<String>,
    pub sales: Option<String>,
    pub category: String,
    pub link: String,
}

/// Why a candidate did not become a product.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CandidateError {
    #[error("card has no name")]
    MissingName,

    #[error("card has no price")]
    MissingPrice,

    #[error(transparent)]
    Price(#[from] PriceParseError),
}

impl RawCandidate {
    /// Normalize into a `Product`. Missing or unreadable sales count as zero.
    pub fn into_product(self) -> Result<Product, CandidateError> {
        let name = self.name.filter(|n| !n.trim().is_empty()).ok_or(CandidateError::MissingName)?;
        let price_text = self.price.ok_or(CandidateError::MissingPrice)?;
        let price = parse_price(&price_text)?;
        let sales = self.sales.as_deref().map(parse_sales_count).unwrap_or(0);

        Ok(Product::new(name.trim(), price, sales).with_category(self.category).with_link(self.link))
    }

    /// Whether this candidate would survive normalization.
    pub fn is_viable(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.trim().is_empty())
            && self.price.as_deref().is_some_and(|p| parse_price(p).is_ok())
    }
}

/// Ordered selectors tried in turn, first hit wins.
#[derive(Debug, Clone)]
pub struct SelectorChain(Vec<Selector>);

impl SelectorChain {
    /// Build a chain from selector literals.
    ///
    /// # Panics
    ///
    /// Panics if a selector does not parse; chains are built from constants.
    pub fn new(selectors: &[&str]) -> Self {
        Self(selectors.iter().map(|s| Selector::parse(s).expect("invalid selector")).collect())
    }

    /// First element matched by the earliest selector that matches anything.
    pub fn first<'a>(&self, scope: ElementRef<'a>) -> Option<ElementRef<'a>> {
        self.0.iter().find_map(|sel| scope.select(sel).next())
    }

    /// Every element matched by the earliest selector that matches anything.
    pub fn all<'a>(&self, scope: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        self.0
            .iter()
            .map(|sel| scope.select(sel).collect::<Vec<_>>())
            .find(|found| !found.is_empty())
            .unwrap_or_default()
    }

    /// Text of the first matched element whose text is not blank.
    pub fn text(&self, scope: ElementRef<'_>) -> Option<String> {
        self.0
            .iter()
            .flat_map(|sel| scope.select(sel))
            .map(element_text)
            .find(|t| !t.is_empty())
    }

    /// Attribute value of the first matched element that carries it.
    pub fn attr(&self, scope: ElementRef<'_>, name: &str) -> Option<String> {
        self.0
            .iter()
            .flat_map(|sel| scope.select(sel))
            .find_map(|el| el.value().attr(name).map(str::to_string))
    }
}

/// Whitespace-collapsed text content of an element.
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

/// Reads product cards out of a parsed listing page.
///
/// Takes the document mutably so extractors can prune regions (such as
/// recommendation blocks) before selecting cards.
pub trait SiteExtractor {
    fn extract(&self, page: &mut Html, filter: &CategoryFilter) -> Vec<RawCandidate>;
}

/// Pick the extractor for a site variant; `page_url` anchors relative links.
pub fn extractor_for(variant: SiteVariant, page_url: &Url) -> Box<dyn SiteExtractor + Send + Sync> {
    match variant {
        SiteVariant::Ggsel => Box::new(GgselExtractor::new(page_url)),
        SiteVariant::Plati => Box::new(PlatiExtractor::new(page_url)),
        SiteVariant::Generic => Box::new(GenericExtractor::new(page_url)),
    }
}

/// Parse `html` and return the normalized products it lists, in page order.
pub fn extract_products(html: &str, page_url: &Url, variant: SiteVariant, filter: &CategoryFilter) -> Vec<Product> {
    let mut page = Html::parse_document(html);
    let candidates = extractor_for(variant, page_url).extract(&mut page, filter);
    let seen = candidates.len();

    let products: Vec<Product> = candidates
        .into_iter()
        .filter_map(|candidate| match candidate.into_product() {
            Ok(product) => Some(product),
            Err(e) => {
                tracing::debug!(error = %e, "skipping card");
                None
            }
        })
        .collect();

    tracing::debug!(%variant, cards = seen, products = products.len(), "extracted listing");
    products
}
