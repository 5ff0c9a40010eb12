//! Site variant and loading idiom detection.
//!
//! A listing URL decides two things before the browser is involved: which
//! extractor reads the cards, and how the page must be coaxed into rendering
//! all of them.

pub mod url;

use std::fmt;

pub use self::url::{UrlError, canonicalize};

/// Marketplace family a listing URL belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteVariant {
    /// ggsel.net: hashed-class product cards with a recommendations block.
    Ggsel,
    /// plati.market: a "top sellers" list of anchor cards.
    Plati,
    /// Any other shop, read through class-name heuristics.
    Generic,
}

impl SiteVariant {
    pub fn detect(url: &::url::Url) -> Self {
        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        if host.contains("ggsel") {
            Self::Ggsel
        } else if host.contains("plati") {
            Self::Plati
        } else {
            Self::Generic
        }
    }
}

impl fmt::Display for SiteVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ggsel => write!(f, "ggsel"),
            Self::Plati => write!(f, "plati"),
            Self::Generic => write!(f, "generic"),
        }
    }
}

/// How a listing reveals content beyond the first screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Idiom {
    /// Horizontal sliders advanced with "next" buttons, followed by scrolling.
    Carousel,
    /// A "show more" button appending a page of cards per click.
    LoadMore,
    /// Cards appended as the viewport nears the bottom.
    InfiniteScroll,
}

impl fmt::Display for Idiom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Carousel => write!(f, "carousel"),
            Self::LoadMore => write!(f, "load_more"),
            Self::InfiniteScroll => write!(f, "infinite_scroll"),
        }
    }
}

/// A canonicalized listing URL with its detected variant and idiom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub url: ::url::Url,
    pub variant: SiteVariant,
    pub idiom: Idiom,
}

impl Target {
    /// Canonicalize `input` and classify it.
    pub fn parse(input: &str) -> Result<Self, UrlError> {
        let url = canonicalize(input)?;
        Ok(Self::detect(url))
    }

    pub fn detect(url: ::url::Url) -> Self {
        let variant = SiteVariant::detect(&url);
        let idiom = match variant {
            // The storefront root is a stack of sliders; catalog pages paginate.
            SiteVariant::Ggsel if is_root(&url) => Idiom::Carousel,
            SiteVariant::Ggsel => Idiom::LoadMore,
            SiteVariant::Plati | SiteVariant::Generic => Idiom::InfiniteScroll,
        };
        Self { url, variant, idiom }
    }
}

fn is_root(url: &::url::Url) -> bool {
    url.path().trim_matches('/').is_empty() && url.query().is_none_or(str::is_empty)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(input: &str) -> Target {
        Target::parse(input).unwrap()
    }

    #[test]
    fn test_detect_ggsel_root_is_carousel() {
        let t = target("https://ggsel.net/");
        assert_eq!(t.variant, SiteVariant::Ggsel);
        assert_eq!(t.idiom, Idiom::Carousel);

        assert_eq!(target("ggsel.net").idiom, Idiom::Carousel);
    }

    #[test]
    fn test_detect_ggsel_subpage_is_load_more() {
        let t = target("https://ggsel.net/catalog/steam-keys");
        assert_eq!(t.variant, SiteVariant::Ggsel);
        assert_eq!(t.idiom, Idiom::LoadMore);

        assert_eq!(target("https://ggsel.net/?search=elden").idiom, Idiom::LoadMore);
    }

    #[test]
    fn test_detect_plati() {
        let t = target("https://plati.market/games/");
        assert_eq!(t.variant, SiteVariant::Plati);
        assert_eq!(t.idiom, Idiom::InfiniteScroll);

        assert_eq!(target("https://www.plati.market").variant, SiteVariant::Plati);
    }

    #[test]
    fn test_detect_generic() {
        let t = target("https://shop.example.com/catalog");
        assert_eq!(t.variant, SiteVariant::Generic);
        assert_eq!(t.idiom, Idiom::InfiniteScroll);
    }

    #[test]
    fn test_detect_uses_host_not_path() {
        let t = target("https://shop.example.com/ggsel-deals");
        assert_eq!(t.variant, SiteVariant::Generic);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Target::parse("").is_err());
        assert!(Target::parse("ftp://ggsel.net").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(SiteVariant::Plati.to_string(), "plati");
        assert_eq!(Idiom::LoadMore.to_string(), "load_more");
    }
}
