//! Listing link resolution.

use url::Url;

/// Resolve a card's `href` against `base`, returning an absolute URL.
///
/// Absolute hrefs are kept, `/path` resolves against the origin and `path`
/// against the base directory. Blank, unparseable and script hrefs become an
/// empty string: a product without a usable link is still a product.
pub fn resolve_link(href: &str, base: &Url) -> String {
    let href = href.trim();
    if href.is_empty() || href.starts_with("javascript:") {
        return String::new();
    }

    match base.join(href) {
        Ok(u) if matches!(u.scheme(), "http" | "https") => u.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/catalog/games").unwrap()
    }

    #[test]
    fn test_resolve_absolute() {
        assert_eq!(resolve_link("https://other.com/p/1", &base()), "https://other.com/p/1");
    }

    #[test]
    fn test_resolve_absolute_path() {
        assert_eq!(resolve_link("/product/elden-ring", &base()), "https://example.com/product/elden-ring");
    }

    #[test]
    fn test_resolve_relative_path() {
        assert_eq!(resolve_link("item-42", &base()), "https://example.com/catalog/item-42");
    }

    #[test]
    fn test_resolve_against_origin() {
        let origin = Url::parse("https://ggsel.net").unwrap();
        assert_eq!(resolve_link("/catalog/product/123", &origin), "https://ggsel.net/catalog/product/123");
    }

    #[test]
    fn test_resolve_query() {
        assert_eq!(resolve_link("/search?q=key", &base()), "https://example.com/search?q=key");
    }

    #[test]
    fn test_resolve_blank_and_script() {
        assert_eq!(resolve_link("", &base()), "");
        assert_eq!(resolve_link("   ", &base()), "");
        assert_eq!(resolve_link("javascript:void(0)", &base()), "");
    }

    #[test]
    fn test_resolve_non_http_scheme() {
        assert_eq!(resolve_link("mailto:shop@example.com", &base()), "");
    }
}
