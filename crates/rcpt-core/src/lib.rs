//! Core library for receipt OCR text interpretation.
//!
//! This crate provides:
//! - OCR line normalization with dictionary-based token correction
//! - Price scanning and canonical `$D.DD` formatting
//! - Line classification into items and summary roles (total, tax, subtotal)
//! - Receipt extraction with a fallback total and remote-reply handling

pub mod error;
pub mod models;
pub mod receipt;

pub use error::{DictionaryError, RcptError, RemoteError, Result};
pub use models::config::{DictionaryConfig, ExtractionConfig, RcptConfig};
pub use models::receipt::{LineItem, ReceiptData, TotalSource};
pub use receipt::rules::{format_amount, format_price, parse_price};
pub use receipt::{
    ClassifiedLine, Dictionary, ExtractionResult, KeywordReceiptParser, LineClass,
    ReceiptExtractor, ReceiptParser,
};
