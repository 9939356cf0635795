//! Date extraction for receipts.

use chrono::NaiveDate;

use super::patterns::{DATE_MDY, DATE_PATTERN, DATE_YMD};
use super::{ExtractionMatch, FieldExtractor};

/// Date field extractor.
///
/// Yields the printed text unchanged; interpretation is left to
/// [`parse_receipt_date`].
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        DATE_PATTERN
            .find(text)
            .map(|m| ExtractionMatch::new(m.as_str().to_string(), m.as_str(), m.start(), m.end()))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        DATE_PATTERN
            .find_iter(text)
            .map(|m| ExtractionMatch::new(m.as_str().to_string(), m.as_str(), m.start(), m.end()))
            .collect()
    }
}

/// First date-shaped text found, scanning lines in order.
pub fn find_date<'a, I>(lines: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let extractor = DateExtractor::new();
    lines
        .into_iter()
        .find_map(|line| extractor.extract(line))
        .map(|m| m.value)
}

/// Interpret a printed receipt date.
///
/// Four-digit leading groups are read as year-month-day. Otherwise the
/// US month/day/year order is tried before day/month/year.
pub fn parse_receipt_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();

    if let Some(caps) = DATE_YMD.captures(text) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = DATE_MDY.captures(text) {
        let first: u32 = caps[1].parse().ok()?;
        let second: u32 = caps[2].parse().ok()?;
        let year = parse_year(&caps[3]);
        return NaiveDate::from_ymd_opt(year, first, second)
            .or_else(|| NaiveDate::from_ymd_opt(year, second, first));
    }

    ["%B %d, %Y", "%b %d, %Y", "%d %B %Y", "%d %b %Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

fn parse_year(s: &str) -> i32 {
    let year: i32 = s.parse().unwrap_or(0);
    if year < 100 {
        // Two-digit year: assume 2000s for 00-50, 1900s for 51-99
        if year <= 50 {
            2000 + year
        } else {
            1900 + year
        }
    } else {
        year
    }
}
