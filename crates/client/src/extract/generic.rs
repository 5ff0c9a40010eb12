//! Heuristic extraction for shops without a dedicated extractor.
//!
//! Cards are guessed from class names. Each pattern set describes what a
//! container, title, price and sales counter tend to be called; sets are tried
//! in order and the first that yields a usable product wins.

use std::collections::HashSet;
use std::sync::LazyLock;

use marketlens_core::CategoryFilter;
use regex::Regex;
use scraper::{ElementRef, Html};
use url::Url;

use super::{RawCandidate, SiteExtractor, element_text, resolve_link};

/// Upper bound on cards accepted per pattern set.
pub const MAX_CARDS: usize = 50;

/// Names longer than this are cut; heuristic titles often swallow descriptions.
pub const MAX_NAME_CHARS: usize = 100;

const CONTAINER_TAGS: &[&str] = &["div", "article", "li", "section"];
const TITLE_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "a", "span", "div"];
const PRICE_TAGS: &[&str] = &["span", "div", "p", "strong"];
const SOLD_TAGS: &[&str] = &["span", "div", "p", "small"];
const SOLD_TEXT_TAGS: &[&str] = &["span", "div"];

/// Class-name patterns for one family of storefront markup.
struct PatternSet {
    container: &'static str,
    title: &'static str,
    price: &'static str,
    sold: &'static str,
}

const PATTERN_SETS: &[PatternSet] = &[
    PatternSet {
        container: r"product|item|card|goods|offer",
        title: r"title|name|product|heading",
        price: r"price|cost|sum|rub",
        sold: r"sold|sales|продаж|купили",
    },
    PatternSet {
        container: r"tile|listing|sku|snippet|catalog",
        title: r"title|name|caption|heading|link",
        price: r"price|cost|amount",
        sold: r"sold|sales|orders|bought|продаж|заказ",
    },
];

struct CompiledPatterns {
    container: Regex,
    title: Regex,
    price: Regex,
    sold: Regex,
}

fn class_regex(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){pattern}")).expect("valid regex")
}

static COMPILED: LazyLock<Vec<CompiledPatterns>> = LazyLock::new(|| {
    PATTERN_SETS
        .iter()
        .map(|set| CompiledPatterns {
            container: class_regex(set.container),
            title: class_regex(set.title),
            price: class_regex(set.price),
            sold: class_regex(set.sold),
        })
        .collect()
});

static SOLD_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\d+\s*(продаж|sold|sales|купили)").expect("valid regex"));
static PRICE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d[\d\s]*(?:[.,]\d+)?").expect("valid regex"));

fn has_tag(element: ElementRef<'_>, tags: &[&str]) -> bool {
    tags.contains(&element.value().name())
}

fn class_matches(element: ElementRef<'_>, pattern: &Regex) -> bool {
    element.value().attr("class").is_some_and(|class| pattern.is_match(class))
}

/// Descendants of `scope` (excluding itself) in document order.
fn descendants<'a>(scope: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    scope.descendants().skip(1).filter_map(ElementRef::wrap)
}

fn find_by_class<'a>(scope: ElementRef<'a>, tags: &[&str], pattern: &Regex) -> Option<ElementRef<'a>> {
    descendants(scope).find(|el| has_tag(*el, tags) && class_matches(*el, pattern))
}

/// A title candidate that wraps a price is a whole card (or a grid of them),
/// not a title.
fn find_title<'a>(scope: ElementRef<'a>, patterns: &CompiledPatterns) -> Option<ElementRef<'a>> {
    descendants(scope).find(|el| {
        has_tag(*el, TITLE_TAGS)
            && class_matches(*el, &patterns.title)
            && find_by_class(*el, PRICE_TAGS, &patterns.price).is_none()
    })
}

fn mentions_sales(element: ElementRef<'_>) -> bool {
    SOLD_TEXT.is_match(&element_text(element))
}

/// Keep only the first numeric run of a price text ("от 1 200 ₽ / шт" -> "1 200").
fn price_run(text: &str) -> Option<String> {
    PRICE_RUN.find(text).map(|m| m.as_str().trim().to_string()).filter(|run| !run.is_empty())
}

fn truncate_name(name: &str) -> String {
    name.chars().take(MAX_NAME_CHARS).collect()
}

pub struct GenericExtractor {
    base: Url,
}

impl GenericExtractor {
    pub fn new(page_url: &Url) -> Self {
        Self { base: page_url.clone() }
    }

    fn card(&self, container: ElementRef<'_>, patterns: &CompiledPatterns) -> Option<RawCandidate> {
        let title = find_title(container, patterns)?;
        let price = find_by_class(container, PRICE_TAGS, &patterns.price)?;

        let sales = find_by_class(container, SOLD_TAGS, &patterns.sold)
            .map(element_text)
            .or_else(|| {
                descendants(container)
                    .filter(|el| has_tag(*el, SOLD_TEXT_TAGS) && mentions_sales(*el))
                    .find(|el| !el.children().filter_map(ElementRef::wrap).any(mentions_sales))
                    .map(element_text)
            });

        // Whole-card anchors sit outside an inner "card-body" container.
        let link = descendants(container)
            .chain(container.ancestors().filter_map(ElementRef::wrap))
            .filter(|el| el.value().name() == "a")
            .find_map(|a| a.value().attr("href"))
            .map(|href| resolve_link(href, &self.base))
            .unwrap_or_default();

        let name = element_text(title);
        Some(RawCandidate {
            name: (!name.is_empty()).then(|| truncate_name(&name)),
            price: price_run(&element_text(price)),
            sales,
            category: String::new(),
            link,
        })
    }

    fn extract_with(&self, page: &Html, patterns: &CompiledPatterns) -> Vec<RawCandidate> {
        let containers: Vec<_> = descendants(page.root_element())
            .filter(|el| has_tag(*el, CONTAINER_TAGS) && class_matches(*el, &patterns.container))
            .collect();

        // Innermost first: a grid wrapper or an outer "card" around "card-body"
        // is blocked once anything inside it was accepted.
        let mut blocked = HashSet::new();
        let mut candidates = Vec::new();
        for container in containers.into_iter().rev() {
            if blocked.contains(&container.id()) {
                continue;
            }
            if let Some(candidate) = self.card(container, patterns) {
                blocked.extend(container.ancestors().map(|a| a.id()));
                candidates.push(candidate);
            }
        }

        // Accepted subtrees are disjoint, so reversing restores document order.
        candidates.reverse();
        candidates.truncate(MAX_CARDS);
        candidates
    }
}

impl SiteExtractor for GenericExtractor {
    /// Heuristic cards carry no category, so the filter does not apply here.
    fn extract(&self, page: &mut Html, _filter: &CategoryFilter) -> Vec<RawCandidate> {
        for (index, patterns) in COMPILED.iter().enumerate() {
            let candidates = self.extract_with(page, patterns);
            if candidates.iter().any(RawCandidate::is_viable) {
                tracing::debug!(pattern_set = index, cards = candidates.len(), "heuristic pattern matched");
                return candidates;
            }
        }
        Vec::new()
    }
}
