//! plati.market "top sellers" cards.
//!
//! The top-sellers region is read when present: by id on current markup,
//! otherwise the section whose heading names it. Pages without one are read
//! whole. Cards inside a collapsed parent (`d-none`, `hidden`) are skipped.

use std::sync::LazyLock;

use marketlens_core::CategoryFilter;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::{RawCandidate, SelectorChain, SiteExtractor, element_text, resolve_link};

/// Upper bound on cards read from one page.
pub const MAX_CARDS: usize = 300;

const TOP_SELLERS_MARKERS: &[&str] = &["лидеры продаж", "top sellers"];
const HIDDEN_CLASSES: &[&str] = &["d-none", "hidden"];

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("invalid selector")
}

static REGION_BY_ID: LazyLock<Selector> = LazyLock::new(|| selector("ul#top-sellers"));
static SECTIONS: LazyLock<Selector> = LazyLock::new(|| selector("section.content"));
static HEADINGS: LazyLock<Selector> = LazyLock::new(|| selector("h1, h2, h3, h4, .section-title"));
static SECTION_LIST: LazyLock<Selector> = LazyLock::new(|| selector("ul.section-list"));
static CARDS: LazyLock<Selector> = LazyLock::new(|| selector("a.card"));

static TITLE: LazyLock<SelectorChain> = LazyLock::new(|| {
    SelectorChain::new(&["p.custom-link span.footnote-medium", "span.footnote-medium", "p.custom-link"])
});
static PRICE: LazyLock<SelectorChain> =
    LazyLock::new(|| SelectorChain::new(&["span.title-bold", r#"[class*="price"]"#]));
static SOLD: LazyLock<SelectorChain> =
    LazyLock::new(|| SelectorChain::new(&["span.footnote-regular", r#"[class*="sold"]"#]));

pub struct PlatiExtractor {
    origin: Url,
}

impl PlatiExtractor {
    /// Links resolve against the site origin, not the listing path.
    pub fn new(page_url: &Url) -> Self {
        let origin = page_url.join("/").unwrap_or_else(|_| page_url.clone());
        Self { origin }
    }

    fn card(&self, card: ElementRef<'_>) -> RawCandidate {
        let link = card.value().attr("href").map(|href| resolve_link(href, &self.origin)).unwrap_or_default();
        RawCandidate {
            name: TITLE.text(card),
            price: PRICE.text(card),
            sales: SOLD.text(card),
            category: String::new(),
            link,
        }
    }
}

fn top_sellers_region(page: &Html) -> Option<ElementRef<'_>> {
    let root = page.root_element();
    if let Some(list) = root.select(&REGION_BY_ID).next() {
        return Some(list);
    }

    root.select(&SECTIONS)
        .find(|section| mentions_top_sellers(*section))
        .and_then(|section| section.select(&SECTION_LIST).next())
}

fn mentions_top_sellers(section: ElementRef<'_>) -> bool {
    let headings: Vec<String> = section.select(&HEADINGS).map(element_text).collect();
    let text = if headings.is_empty() { element_text(section) } else { headings.join(" ") };
    let text = text.to_lowercase();
    TOP_SELLERS_MARKERS.iter().any(|marker| text.contains(marker))
}

fn in_hidden_parent(card: ElementRef<'_>) -> bool {
    card.parent()
        .and_then(ElementRef::wrap)
        .is_some_and(|parent| parent.value().classes().any(|class| HIDDEN_CLASSES.contains(&class)))
}

impl SiteExtractor for PlatiExtractor {
    /// Cards carry no category, so the filter does not apply here.
    fn extract(&self, page: &mut Html, _filter: &CategoryFilter) -> Vec<RawCandidate> {
        let page: &Html = page;
        let region = top_sellers_region(page).unwrap_or_else(|| {
            tracing::debug!("top sellers region not found, reading whole page");
            page.root_element()
        });

        region
            .select(&CARDS)
            .filter(|card| !in_hidden_parent(*card))
            .take(MAX_CARDS)
            .map(|card| self.card(card))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(name: &str, price: &str, sold: &str, href: &str) -> String {
        format!(
            r#"<li><a class="card" href="{href}">
                <p class="custom-link"><span class="footnote-medium">{name}</span></p>
                <span class="title-bold">{price}</span>
                <span class="footnote-regular">{sold}</span>
            </a></li>"#
        )
    }

    fn extract(html: &str) -> Vec<RawCandidate> {
        let mut page = Html::parse_document(html);
        let url = Url::parse("https://plati.market/games/").unwrap();
        PlatiExtractor::new(&url).extract(&mut page, &CategoryFilter::All)
    }

    #[test]
    fn test_relative_links_resolve_against_origin() {
        let html = format!(r#"<ul id="top-sellers">{}</ul>"#, card("Hades II", "450 ₽", "", "itm/hades/5"));
        let found = extract(&html);
        assert_eq!(found[0].link, "https://plati.market/itm/hades/5");
    }

    #[test]
    fn test_extract_by_region_id() {
        let html = format!(
            r#"<ul id="top-sellers">{}{}</ul><ul class="other">{}</ul>"#,
            card("Cyberpunk 2077", "1 490 ₽", "Продаж: 12 тыс", "/itm/cyberpunk/101"),
            card("Steam wallet", "500 ₽", "менее 10", "https://plati.market/itm/202"),
            card("Elsewhere", "1 ₽", "", "/itm/3"),
        );
        let found = extract(&html);

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name.as_deref(), Some("Cyberpunk 2077"));
        assert_eq!(found[0].price.as_deref(), Some("1 490 ₽"));
        assert_eq!(found[0].link, "https://plati.market/itm/cyberpunk/101");
        assert_eq!(found[1].link, "https://plati.market/itm/202");

        let products: Vec<_> = found.into_iter().map(|c| c.into_product().unwrap()).collect();
        assert_eq!(products[0].sales, 12_000);
        assert_eq!(products[1].sales, 5);
        assert_eq!(products[0].category, "");
    }

    #[test]
    fn test_extract_by_section_heading() {
        let html = format!(
            r#"<section class="content"><h2>Новинки</h2><ul class="section-list">{}</ul></section>
               <section class="content"><h2 class="section-title">Лидеры продаж</h2>
                   <ul class="section-list">{}</ul></section>"#,
            card("New", "10 ₽", "", "/itm/1"),
            card("Top", "20 ₽", "7", "/itm/2"),
        );
        let found = extract(&html);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name.as_deref(), Some("Top"));
    }

    #[test]
    fn test_english_heading() {
        let html = format!(
            r#"<section class="content"><h3>Top Sellers</h3><ul class="section-list">{}</ul></section>"#,
            card("Top", "20 ₽", "", "/itm/2"),
        );
        assert_eq!(extract(&html).len(), 1);
    }

    #[test]
    fn test_hidden_cards_skipped() {
        let html = format!(
            r#"<ul id="top-sellers">{}<li class="d-none">{}</li><li class="hidden">{}</li></ul>"#,
            card("Visible", "10 ₽", "", "/itm/1"),
            r#"<a class="card" href="/itm/2"><span class="footnote-medium">Collapsed</span></a>"#,
            r#"<a class="card" href="/itm/3"><span class="footnote-medium">Hidden</span></a>"#,
        );
        let found = extract(&html);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name.as_deref(), Some("Visible"));
    }

    #[test]
    fn test_title_fallback() {
        let html = r#"<ul id="top-sellers"><li><a class="card" href="/itm/1">
                <span class="footnote-medium">Plain title</span><span class="title-bold">99</span>
            </a></li></ul>"#;
        let found = extract(html);
        assert_eq!(found[0].name.as_deref(), Some("Plain title"));
        assert_eq!(found[0].sales, None);
    }

    #[test]
    fn test_missing_region_reads_whole_page() {
        let html = format!("<ul class=\"catalog\">{}</ul>", card("A", "1 ₽", "", "/itm/1"));
        let found = extract(&html);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name.as_deref(), Some("A"));

        assert!(extract("<p>empty</p>").is_empty());
    }

    #[test]
    fn test_card_cap() {
        let cards: String = (0..MAX_CARDS + 5).map(|i| card(&format!("K{i}"), "1 ₽", "", "/itm")).collect();
        assert_eq!(extract(&format!(r#"<ul id="top-sellers">{cards}</ul>"#)).len(), MAX_CARDS);
    }
}
