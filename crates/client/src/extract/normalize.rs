//! Numeric normalization of on-page price and sales text.
//!
//! Marketplace cards render numbers for humans: currency glyphs, non-breaking
//! spaces as thousands separators, decimal commas, "was = now" price pairs,
//! and sales counters such as `1,2 млн`, `3 тыс`, `50+` or `менее 10`.

use std::sync::LazyLock;

use regex::Regex;

/// Currency markers removed before a price is parsed. Longer forms come first
/// so `руб.` is not left behind as a stray `.`.
const CURRENCY_MARKERS: &[&str] = &["руб.", "руб", "RUB", "р.", "₽", "$", "€", "£", "¥", "₸", "₴"];

/// Estimate used for counters that only say "fewer than N".
pub const CENSORED_SALES_ESTIMATE: u64 = 5;

static CENSORED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<|менее|меньше|lessthan|fewerthan").expect("valid regex"));
static MILLIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:[.,]\d+)?)(?:млн|m(?:[^\p{L}]|$))").expect("valid regex"));
static THOUSANDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:[.,]\d+)?)(?:тыс|[kк](?:[^\p{L}]|$))").expect("valid regex"));
static LOWER_BOUND: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\+").expect("valid regex"));
static INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

/// Price text that does not reduce to a non-negative number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unparseable price: {0:?}")]
pub struct PriceParseError(pub String);

/// Parse a displayed price into a number.
///
/// Steps:
/// 1. Keep only the part after the last `=` ("old = new" displays)
/// 2. Drop currency markers and every kind of whitespace
/// 3. Treat `,` as the decimal separator
/// 4. Accept only digits and dots forming a finite number
pub fn parse_price(text: &str) -> Result<f64, PriceParseError> {
    let segment = text.rsplit('=').next().unwrap_or(text);

    let mut cleaned = segment.to_string();
    for marker in CURRENCY_MARKERS {
        cleaned = cleaned.replace(marker, "");
    }
    let cleaned: String = cleaned
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    let has_digit = cleaned.chars().any(|c| c.is_ascii_digit());
    if !has_digit || !cleaned.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(PriceParseError(text.to_string()));
    }

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .ok_or_else(|| PriceParseError(text.to_string()))
}

fn scaled(capture: &str, factor: f64) -> Option<u64> {
    let value: f64 = capture.replace(',', ".").parse().ok()?;
    Some((value * factor).round() as u64)
}

/// Parse a sales counter into an estimated unit count.
///
/// Never fails: text without a recognizable number yields 0.
pub fn parse_sales_count(text: &str) -> u64 {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_lowercase();
    if compact.is_empty() {
        return 0;
    }

    if CENSORED.is_match(&compact) {
        return CENSORED_SALES_ESTIMATE;
    }

    if let Some(caps) = MILLIONS.captures(&compact) {
        return scaled(&caps[1], 1_000_000.0).unwrap_or(0);
    }
    if let Some(caps) = THOUSANDS.captures(&compact) {
        return scaled(&caps[1], 1_000.0).unwrap_or(0);
    }
    if let Some(caps) = LOWER_BOUND.captures(&compact) {
        return caps[1].parse().unwrap_or(0);
    }

    INTEGER
        .find(&compact)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price_locale_format() {
        assert_eq!(parse_price("1 234,50 ₽"), Ok(1234.50));
        assert_eq!(parse_price("1\u{a0}234,50\u{a0}₽"), Ok(1234.50));
    }

    #[test]
    fn test_parse_price_plain() {
        assert_eq!(parse_price("350"), Ok(350.0));
        assert_eq!(parse_price("  12.99 $ "), Ok(12.99));
        assert_eq!(parse_price("0"), Ok(0.0));
    }

    #[test]
    fn test_parse_price_takes_last_equality_segment() {
        assert_eq!(parse_price("2 000 ₽ = 1 499 ₽"), Ok(1499.0));
        assert_eq!(parse_price("10 $ = 950 ₽"), Ok(950.0));
    }

    #[test]
    fn test_parse_price_currency_words() {
        assert_eq!(parse_price("1 200 руб."), Ok(1200.0));
        assert_eq!(parse_price("75 RUB"), Ok(75.0));
    }

    #[test]
    fn test_parse_price_rejects_garbage() {
        assert!(parse_price("abc").is_err());
        assert!(parse_price("").is_err());
        assert!(parse_price("₽").is_err());
        assert!(parse_price("от 100").is_err());
        assert!(parse_price("1.2.3").is_err());
    }

    #[test]
    fn test_parse_price_rejects_negative_and_non_finite() {
        assert!(parse_price("-5").is_err());
        assert!(parse_price("inf").is_err());
        assert!(parse_price("NaN").is_err());
    }

    #[test]
    fn test_parse_price_error_keeps_input() {
        let err = parse_price("free").unwrap_err();
        assert_eq!(err, PriceParseError("free".into()));
        assert!(err.to_string().contains("free"));
    }

    #[test]
    fn test_parse_sales_millions() {
        assert_eq!(parse_sales_count("1.2 млн"), 1_200_000);
        assert_eq!(parse_sales_count("Продано 2,5 млн"), 2_500_000);
        assert_eq!(parse_sales_count("3M"), 3_000_000);
    }

    #[test]
    fn test_parse_sales_thousands() {
        assert_eq!(parse_sales_count("3 тыс"), 3_000);
        assert_eq!(parse_sales_count("1,5 тыс. продаж"), 1_500);
        assert_eq!(parse_sales_count("12k"), 12_000);
        assert_eq!(parse_sales_count("4К"), 4_000);
    }

    #[test]
    fn test_parse_sales_plus_lower_bound() {
        assert_eq!(parse_sales_count("50+"), 50);
        assert_eq!(parse_sales_count("Продаж: 100+"), 100);
    }

    #[test]
    fn test_parse_sales_censored() {
        assert_eq!(parse_sales_count("менее 10"), CENSORED_SALES_ESTIMATE);
        assert_eq!(parse_sales_count("less than 5"), CENSORED_SALES_ESTIMATE);
        assert_eq!(parse_sales_count("< 10"), CENSORED_SALES_ESTIMATE);
    }

    #[test]
    fn test_parse_sales_plain_integer() {
        assert_eq!(parse_sales_count("Продаж: 1\u{a0}234"), 1_234);
        assert_eq!(parse_sales_count("купили 37 раз"), 37);
        assert_eq!(parse_sales_count("5 купили"), 5);
    }

    #[test]
    fn test_parse_sales_unrecognized_is_zero() {
        assert_eq!(parse_sales_count(""), 0);
        assert_eq!(parse_sales_count("   "), 0);
        assert_eq!(parse_sales_count("нет продаж"), 0);
    }
}
