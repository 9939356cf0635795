//! WASM bindings for receipt OCR text interpretation.
//!
//! The browser runs OCR itself and hands the recognized text to these
//! functions, which return plain JS objects shaped like `ReceiptData`.

use std::sync::Arc;

use wasm_bindgen::prelude::*;

use rcpt_core::receipt::dictionary::Dictionary;
use rcpt_core::{
    ClassifiedLine, KeywordReceiptParser, ReceiptData, ReceiptExtractor as _, ReceiptParser,
    TotalSource,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Extract receipt data from OCR text.
#[wasm_bindgen]
pub fn extract_receipt_from_text(text: &str) -> Result<JsValue, JsValue> {
    to_js(&KeywordReceiptParser::new().extract(text))
}

/// Extract receipt data from a remote correction service reply.
///
/// Replies without a usable JSON object are parsed as OCR text.
#[wasm_bindgen]
pub fn extract_receipt_from_response(text: &str) -> Result<JsValue, JsValue> {
    to_js(&KeywordReceiptParser::new().extract_from_response(text))
}

/// Canonical `$D.DD` form of any price-like text.
#[wasm_bindgen]
pub fn format_price(raw: &str) -> String {
    rcpt_core::format_price(raw)
}

/// Receipt extractor class for browser use.
#[wasm_bindgen]
pub struct ReceiptExtractor {
    parser: KeywordReceiptParser,
    extra_words: Vec<String>,
    min_item_name_len: Option<usize>,
}

#[wasm_bindgen]
impl ReceiptExtractor {
    /// Create a new receipt extractor.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            parser: KeywordReceiptParser::new(),
            extra_words: Vec::new(),
            min_item_name_len: None,
        }
    }

    /// Shortest item name kept after removing the price.
    #[wasm_bindgen]
    pub fn set_min_item_name_len(&mut self, len: usize) {
        self.min_item_name_len = Some(len);
        self.rebuild();
    }

    /// Add words (strings) to the correction vocabulary. Non-strings are skipped.
    #[wasm_bindgen]
    pub fn add_words(&mut self, words: js_sys::Array) {
        self.extra_words
            .extend(words.iter().filter_map(|w| w.as_string()));
        self.rebuild();
    }

    /// Extract receipt from text.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.parser.extract(text))
    }

    /// Get extraction result with line classifications and warnings.
    #[wasm_bindgen]
    pub fn extract_with_diagnostics(&self, text: &str) -> Result<JsValue, JsValue> {
        let result = self.parser.parse(text);

        #[derive(serde::Serialize)]
        struct Diagnostics {
            receipt: ReceiptData,
            lines: Vec<ClassifiedLine>,
            total_source: TotalSource,
            warnings: Vec<String>,
            processing_time_ms: u64,
        }

        to_js(&Diagnostics {
            receipt: result.receipt,
            lines: result.lines,
            total_source: result.total_source,
            warnings: result.warnings,
            processing_time_ms: result.processing_time_ms,
        })
    }
}

impl ReceiptExtractor {
    fn rebuild(&mut self) {
        let dictionary = Dictionary::builtin().with_words(&self.extra_words);
        let mut parser = KeywordReceiptParser::with_dictionary(Arc::new(dictionary));
        if let Some(len) = self.min_item_name_len {
            parser = parser.with_min_item_name_len(len);
        }
        self.parser = parser;
    }
}

impl Default for ReceiptExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn receipt(value: JsValue) -> ReceiptData {
        serde_wasm_bindgen::from_value(value).unwrap()
    }

    #[wasm_bindgen_test]
    fn test_format_price() {
        assert_eq!(format_price("4.5"), "$4.50");
        assert_eq!(format_price("n/a"), "$0.00");
    }

    #[wasm_bindgen_test]
    fn test_extract_from_text() {
        let data = receipt(extract_receipt_from_text("SAFEWAY\nMILK 3.49\nTOTAL 3.49").unwrap());
        assert_eq!(data.merchant, "SAFEWAY");
        assert_eq!(data.total, "$3.49");
    }

    #[wasm_bindgen_test]
    fn test_extract_from_response() {
        let data = receipt(extract_receipt_from_response(r#"{"merchant":"ALDI","tax":"0.5"}"#).unwrap());
        assert_eq!(data.merchant, "ALDI");
        assert_eq!(data.tax, "$0.50");
    }

    #[wasm_bindgen_test]
    fn test_extractor_settings() {
        let mut extractor = ReceiptExtractor::new();
        extractor.set_min_item_name_len(3);
        extractor.add_words(js_sys::Array::of1(&JsValue::from_str("kombucha")));

        let data = receipt(extractor.extract("SHOP\nOJ 2.49\nKOMBUCHE 3.99\nTOTAL 6.48").unwrap());
        assert_eq!(data.items.len(), 1);
        assert_eq!(data.items[0].name, "KOMBUCHA");
    }
}
