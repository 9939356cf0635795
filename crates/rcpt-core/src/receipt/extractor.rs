//! Receipt extraction: drives normalization and classification over a whole
//! OCR dump and assembles the record.

use std::sync::Arc;
use std::time::Instant;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::error::{RcptError, Result};
use crate::models::config::RcptConfig;
use crate::models::receipt::{LineItem, ReceiptData, TotalSource};

use super::classifier::{LineClass, LineClassifier};
use super::corrector::TokenCorrector;
use super::dictionary::Dictionary;
use super::normalizer::LineNormalizer;
use super::remote::parse_remote_payload;
use super::rules::keywords::RoleKeywordSet;
use super::rules::{ZERO_PRICE, find_date, find_prices, format_amount, format_price};
use super::ReceiptExtractor;

/// Default number of trailing lines searched for a fallback total.
pub const DEFAULT_FALLBACK_WINDOW: usize = 12;

/// Result of receipt extraction.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Extracted receipt.
    pub receipt: ReceiptData,
    /// Raw OCR text.
    pub raw_text: String,
    /// Normalized lines with their classification.
    pub lines: Vec<ClassifiedLine>,
    /// How the total was obtained.
    pub total_source: TotalSource,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// A normalized line and what it was classified as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedLine {
    pub line: String,
    pub class: LineClass,
}

/// Trait for receipt parsing.
pub trait ReceiptParser {
    /// Parse a receipt from OCR text.
    fn parse(&self, text: &str) -> ExtractionResult;
}

/// Where the scan is on the receipt. Never moves back to `ScanningItems`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    ScanningItems,
    InTotals,
}

/// Keyword-driven receipt parser.
#[derive(Debug, Clone)]
pub struct KeywordReceiptParser {
    normalizer: LineNormalizer,
    classifier: LineClassifier,
    max_edit_distance: usize,
    fallback_window: usize,
}

impl KeywordReceiptParser {
    /// Create a parser with the built-in dictionary and default settings.
    pub fn new() -> Self {
        Self::with_dictionary(Arc::new(Dictionary::builtin()))
    }

    /// Create a parser around a shared dictionary.
    pub fn with_dictionary(dictionary: Arc<Dictionary>) -> Self {
        Self {
            normalizer: LineNormalizer::new(TokenCorrector::new(dictionary)),
            classifier: LineClassifier::new(),
            max_edit_distance: 2,
            fallback_window: DEFAULT_FALLBACK_WINDOW,
        }
    }

    /// Build a parser from configuration, loading the dictionary it names.
    pub fn from_config(config: &RcptConfig) -> Result<Self> {
        if config.extraction.fallback_window == 0 {
            return Err(RcptError::Config(
                "extraction.fallback_window must be at least 1".to_string(),
            ));
        }

        let dictionary = match &config.dictionary.path {
            Some(path) => Dictionary::from_file(path)?,
            None => Dictionary::builtin(),
        }
        .with_words(&config.dictionary.extra_words);

        let extraction = &config.extraction;
        Ok(Self::with_dictionary(Arc::new(dictionary))
            .with_correction(extraction.correct_tokens)
            .with_max_edit_distance(extraction.max_edit_distance)
            .with_min_item_name_len(extraction.min_item_name_len)
            .with_fallback_window(extraction.fallback_window))
    }

    /// Enable or disable dictionary correction.
    pub fn with_correction(mut self, enabled: bool) -> Self {
        self.normalizer = self.normalizer.with_correction(enabled);
        self
    }

    /// Set the edit radius for corrections and keyword matches.
    pub fn with_max_edit_distance(mut self, max_edit_distance: usize) -> Self {
        self.max_edit_distance = max_edit_distance;
        let corrector = self
            .normalizer
            .corrector()
            .clone()
            .with_max_distance(max_edit_distance);
        let enabled = self.normalizer.correction_enabled();
        self.normalizer = LineNormalizer::new(corrector).with_correction(enabled);
        self.classifier = self.classifier.with_max_edit_distance(max_edit_distance);
        self
    }

    /// Set the shortest accepted item name.
    pub fn with_min_item_name_len(mut self, min_item_name_len: usize) -> Self {
        self.classifier = self.classifier.with_min_item_name_len(min_item_name_len);
        self
    }

    /// Set how many trailing lines the fallback total searches.
    pub fn with_fallback_window(mut self, fallback_window: usize) -> Self {
        self.fallback_window = fallback_window;
        self
    }

    /// Replace the role keyword tables.
    pub fn with_role_keywords(mut self, roles: Vec<RoleKeywordSet>) -> Self {
        self.classifier = self.classifier.with_roles(roles);
        self
    }

    pub fn dictionary(&self) -> &Arc<Dictionary> {
        self.normalizer.corrector().dictionary()
    }

    /// Largest amount among the trailing lines.
    fn fallback_total(&self, lines: &[String]) -> Option<Decimal> {
        let start = lines.len().saturating_sub(self.fallback_window);
        lines[start..]
            .iter()
            .flat_map(|line| find_prices(line))
            .map(|m| m.value)
            .max()
    }
}

impl Default for KeywordReceiptParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ReceiptParser for KeywordReceiptParser {
    fn parse(&self, text: &str) -> ExtractionResult {
        let start = Instant::now();
        let mut warnings = Vec::new();

        info!("Parsing receipt from {} characters of text", text.len());

        let lines = self.normalizer.normalize_text(text);

        let mut receipt = ReceiptData::new();
        receipt.merchant = lines.first().cloned().unwrap_or_default();
        receipt.date = find_date(lines.iter().map(String::as_str)).unwrap_or_default();

        let mut state = ScanState::ScanningItems;
        let mut subtotal: Option<String> = None;
        let mut tax: Option<String> = None;
        let mut total: Option<String> = None;
        let mut classified = Vec::with_capacity(lines.len());

        for line in &lines {
            let class = self.classifier.classify(line);

            match &class {
                LineClass::Total { price } => total = Some(price.clone()),
                LineClass::Tax { price } => tax = Some(price.clone()),
                LineClass::Subtotal { price } => subtotal = Some(price.clone()),
                LineClass::Item { name, price } if state == ScanState::ScanningItems => {
                    receipt.items.push(LineItem::new(name.clone(), format_price(price)));
                }
                LineClass::Item { .. } => {
                    trace!("Ignoring item-shaped line after totals: {}", line);
                }
                LineClass::Skip => {}
            }

            if state == ScanState::ScanningItems && class.role().is_some() {
                debug!("Entering totals section at: {}", line);
                state = ScanState::InTotals;
            }

            classified.push(ClassifiedLine {
                line: line.clone(),
                class,
            });
        }

        let total_source = if total.is_some() {
            TotalSource::Keyword
        } else if let Some(amount) = self.fallback_total(&lines) {
            debug!("No total line found, using largest trailing amount {}", amount);
            total = Some(format_amount(amount));
            warnings.push("Total taken from the largest amount near the end".to_string());
            TotalSource::Fallback
        } else {
            TotalSource::Missing
        };

        receipt.subtotal = format_price(subtotal.as_deref().unwrap_or(ZERO_PRICE));
        receipt.tax = format_price(tax.as_deref().unwrap_or(ZERO_PRICE));
        receipt.total = format_price(total.as_deref().unwrap_or(ZERO_PRICE));

        warnings.extend(receipt.validate());

        debug!(
            "Extracted {} items from {} lines, total {} ({})",
            receipt.items.len(),
            lines.len(),
            receipt.total,
            total_source
        );

        ExtractionResult {
            receipt,
            raw_text: text.to_string(),
            lines: classified,
            total_source,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

impl ReceiptExtractor for KeywordReceiptParser {
    fn extract(&self, text: &str) -> ReceiptData {
        self.parse(text).receipt
    }

    fn extract_from_response(&self, response: &str) -> ReceiptData {
        match parse_remote_payload(response) {
            Ok(receipt) => receipt,
            Err(e) => {
                debug!("Remote response not usable as JSON ({}), re-parsing as text", e);
                self.extract(response)
            }
        }
    }
}
