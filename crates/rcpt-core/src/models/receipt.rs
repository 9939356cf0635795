//! Receipt data model produced by the interpretation pipeline.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::receipt::rules::dates::parse_receipt_date;
use crate::receipt::rules::prices::{ZERO_PRICE, parse_price};

/// A structured receipt record.
///
/// Every price field holds a canonical `$D+.DD` string. Missing text fields
/// are empty strings and missing amounts are `"$0.00"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptData {
    /// Merchant name, taken from the first line of the receipt.
    pub merchant: String,

    /// Date exactly as printed on the receipt.
    pub date: String,

    /// Purchased items in the order they appear.
    pub items: Vec<LineItem>,

    /// Subtotal before tax.
    pub subtotal: String,

    /// Tax amount.
    pub tax: String,

    /// Grand total.
    pub total: String,
}

/// A single purchased item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Item description as printed.
    pub name: String,

    /// Canonical price.
    pub price: String,
}

impl LineItem {
    pub fn new(name: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price: price.into(),
        }
    }
}

impl ReceiptData {
    /// Create an empty receipt with default values.
    pub fn new() -> Self {
        Self {
            merchant: String::new(),
            date: String::new(),
            items: Vec::new(),
            subtotal: ZERO_PRICE.to_string(),
            tax: ZERO_PRICE.to_string(),
            total: ZERO_PRICE.to_string(),
        }
    }

    /// Interpret the printed date.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_receipt_date(&self.date)
    }

    /// Sum of all item prices.
    pub fn items_total(&self) -> Decimal {
        self.items
            .iter()
            .filter_map(|item| parse_price(&item.price))
            .sum()
    }

    /// Check the record for gaps and arithmetic mismatches.
    ///
    /// Mismatches are reported, never corrected: OCR totals are frequently
    /// right while individual items are misread, and vice versa.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.merchant.is_empty() {
            issues.push("Missing merchant".to_string());
        }

        if self.date.is_empty() {
            issues.push("Missing date".to_string());
        } else if self.parsed_date().is_none() {
            issues.push(format!("Unrecognized date: {}", self.date));
        }

        if self.items.is_empty() {
            issues.push("No line items".to_string());
        }

        let subtotal = amount(&self.subtotal);
        let tax = amount(&self.tax);
        let total = amount(&self.total);
        let tolerance = Decimal::new(1, 2);

        if total.is_zero() {
            issues.push("Total is zero".to_string());
        }

        if !subtotal.is_zero() && !self.items.is_empty() {
            let items_total = self.items_total();
            if (items_total - subtotal).abs() > tolerance {
                issues.push(format!(
                    "Item total ({}) differs from subtotal ({})",
                    items_total, subtotal
                ));
            }
        }

        if !subtotal.is_zero() && !total.is_zero() && (subtotal + tax - total).abs() > tolerance {
            issues.push(format!(
                "Subtotal plus tax ({}) differs from total ({})",
                subtotal + tax,
                total
            ));
        }

        issues
    }
}

impl Default for ReceiptData {
    fn default() -> Self {
        Self::new()
    }
}

fn amount(price: &str) -> Decimal {
    parse_price(price).unwrap_or(Decimal::ZERO)
}

/// How the total field was obtained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalSource {
    /// A line carrying a total keyword.
    Keyword,
    /// Largest amount near the end of the receipt.
    Fallback,
    /// No amount was found.
    #[default]
    Missing,
}

impl std::fmt::Display for TotalSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TotalSource::Keyword => "keyword",
            TotalSource::Fallback => "fallback",
            TotalSource::Missing => "missing",
        };
        f.write_str(name)
    }
}
