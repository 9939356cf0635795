//! Common regex patterns for receipt text.
//!
//! Digit classes are spelled `[0-9]` because `\d` also matches non-ASCII
//! digits, which the amount parser cannot read.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Amount: optional dollar sign, optional spaces, digits, exactly two decimals
    pub static ref PRICE_PATTERN: Regex = Regex::new(
        r"(?:\$\s*)?[0-9]+\.[0-9]{2}"
    ).unwrap();

    pub static ref CANONICAL_PRICE: Regex = Regex::new(
        r"^\$[0-9]+\.[0-9]{2}$"
    ).unwrap();

    // Whole token that is a bare number or amount ("3", "$12", "4.99")
    pub static ref NUMERIC_TOKEN: Regex = Regex::new(
        r"^\$?[0-9]+(?:\.[0-9]{2})?$"
    ).unwrap();

    // Dates: M/D/Y (2-4 digit year) or Y-M-D, slash or dash separated
    pub static ref DATE_PATTERN: Regex = Regex::new(
        r"[0-9]{1,2}[-/][0-9]{1,2}[-/][0-9]{2,4}|[0-9]{4}[-/][0-9]{1,2}[-/][0-9]{1,2}"
    ).unwrap();

    pub static ref DATE_MDY: Regex = Regex::new(
        r"^([0-9]{1,2})[-/]([0-9]{1,2})[-/]([0-9]{2,4})$"
    ).unwrap();

    pub static ref DATE_YMD: Regex = Regex::new(
        r"^([0-9]{4})[-/]([0-9]{1,2})[-/]([0-9]{1,2})$"
    ).unwrap();

    // Grand total flagged with asterisks ("***TOTAL", "** BALANCE")
    pub static ref STARRED_TOTAL: Regex = Regex::new(
        r"(?:^|\s)\*+\s*(?:total|balance|amount)"
    ).unwrap();

    // Everything that is not a letter, digit, whitespace, '.' or '*'
    pub static ref MATCH_NOISE: Regex = Regex::new(
        r"[^\p{L}\p{N}\s.*]"
    ).unwrap();
}
