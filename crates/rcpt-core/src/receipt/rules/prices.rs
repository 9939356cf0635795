//! Monetary value extraction and canonical price formatting.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use super::patterns::{CANONICAL_PRICE, PRICE_PATTERN};
use super::{ExtractionMatch, FieldExtractor};

/// Canonical zero price used for every missing amount.
pub const ZERO_PRICE: &str = "$0.00";

/// Price field extractor.
///
/// Matches are returned left to right; the matched text is kept in
/// `source` and its parsed amount in `value`.
pub struct PriceExtractor;

impl PriceExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PriceExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for PriceExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        PRICE_PATTERN
            .find_iter(text)
            .map(|m| {
                let amount = parse_price(m.as_str()).unwrap_or(Decimal::ZERO);
                ExtractionMatch::new(amount, m.as_str(), m.start(), m.end())
            })
            .collect()
    }
}

/// All price-shaped substrings of a line, in order.
pub fn find_prices(line: &str) -> Vec<ExtractionMatch<Decimal>> {
    PriceExtractor::new().extract_all(line)
}

/// The authoritative price of a line: its last match.
///
/// Receipts print the extended figure after quantities and unit prices.
pub fn last_price(line: &str) -> Option<ExtractionMatch<Decimal>> {
    find_prices(line).pop()
}

/// Read an amount the way a lenient float parser would.
///
/// Everything except digits and dots is dropped, then the longest leading
/// `digits[.digits]` prefix is parsed.
pub fn parse_price(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let mut seen_dot = false;
    let prefix: String = cleaned
        .chars()
        .take_while(|c| {
            if *c == '.' {
                if seen_dot {
                    return false;
                }
                seen_dot = true;
            }
            true
        })
        .collect();

    let number = prefix.trim_end_matches('.');
    if !number.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    if number.starts_with('.') {
        Decimal::from_str(&format!("0{}", number)).ok()
    } else {
        Decimal::from_str(number).ok()
    }
}

/// Render an amount as `$D+.DD`, rounding half away from zero.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("${:.2}", rounded)
}

/// Canonicalize any price-like text; unreadable input becomes `"$0.00"`.
pub fn format_price(raw: &str) -> String {
    match parse_price(raw) {
        Some(amount) => format_amount(amount),
        None => ZERO_PRICE.to_string(),
    }
}

/// Whether a string is already in canonical `$D+.DD` form.
pub fn is_canonical_price(price: &str) -> bool {
    CANONICAL_PRICE.is_match(price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price("1.29"), "$1.29");
        assert_eq!(format_price("$ 5.16"), "$5.16");
        assert_eq!(format_price("$12"), "$12.00");
        assert_eq!(format_price("007.50"), "$7.50");
        assert_eq!(format_price(".5"), "$0.50");
        assert_eq!(format_price("3.456"), "$3.46");
        assert_eq!(format_price("1.2.3"), "$1.20");
    }

    #[test]
    fn test_format_price_defaults_to_zero() {
        assert_eq!(format_price(""), "$0.00");
        assert_eq!(format_price("N/A"), "$0.00");
        assert_eq!(format_price("."), "$0.00");
        assert_eq!(format_price("$"), "$0.00");
    }

    #[test]
    fn test_format_price_is_idempotent() {
        for raw in ["1.29", "$ 5.16", "abc", "", "12", "0.005", "9999999.999", "1.2.3", "-4.50"] {
            let once = format_price(raw);
            assert_eq!(format_price(&once), once, "input {:?}", raw);
            assert!(is_canonical_price(&once), "input {:?}", raw);
        }
    }

    #[test]
    fn test_find_prices_in_order() {
        let prices = find_prices("2 @ 1.50 $3.00");
        assert_eq!(prices.len(), 2);
        assert_eq!(prices[0].source, "1.50");
        assert_eq!(prices[1].source, "$3.00");
        assert_eq!(prices[1].value, Decimal::new(300, 2));
    }

    #[test]
    fn test_last_price_span() {
        let line = "MILK 3.49 TX";
        let price = last_price(line).unwrap();
        assert_eq!(&line[price.position.0..price.position.1], "3.49");
        assert!(last_price("THANK YOU").is_none());
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("$1,234.56"), Some(Decimal::new(123456, 2)));
        assert_eq!(parse_price("5."), Some(Decimal::new(5, 0)));
        assert_eq!(parse_price("none"), None);
    }
}
