//! Receipt interpretation: from raw OCR text to a structured record.

pub mod classifier;
pub mod corrector;
pub mod dictionary;
pub mod extractor;
pub mod normalizer;
pub mod remote;
pub mod rules;

pub use classifier::{LineClass, LineClassifier};
pub use corrector::TokenCorrector;
pub use dictionary::{Dictionary, DictionaryEntry};
pub use extractor::{ClassifiedLine, ExtractionResult, KeywordReceiptParser, ReceiptParser};
pub use normalizer::LineNormalizer;
pub use remote::parse_remote_payload;

use crate::models::receipt::ReceiptData;

/// Extracts receipt records from text.
pub trait ReceiptExtractor {
    /// Extract a receipt from raw OCR text.
    fn extract(&self, text: &str) -> ReceiptData;

    /// Extract from a remote service reply, re-parsing it as OCR text when it
    /// carries no usable receipt object.
    fn extract_from_response(&self, response: &str) -> ReceiptData;
}
