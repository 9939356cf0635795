//! Rule-based field extractors for receipt lines.

pub mod dates;
pub mod keywords;
pub mod patterns;
pub mod prices;

pub use dates::{DateExtractor, find_date, parse_receipt_date};
pub use keywords::{MatchText, Role, RoleKeywordSet, default_role_keywords};
pub use prices::{
    PriceExtractor, ZERO_PRICE, find_prices, format_amount, format_price, is_canonical_price,
    last_price, parse_price,
};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the first occurrence of the field.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A value found in source text.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Source text that was matched.
    pub source: String,
    /// Byte span of the match in the searched text.
    pub position: (usize, usize),
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            value,
            source: source.into(),
            position: (start, end),
        }
    }
}
