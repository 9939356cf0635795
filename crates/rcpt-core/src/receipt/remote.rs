//! Structured replies from a remote correction service.
//!
//! A reply is free-form text that may embed a receipt object. Whatever the
//! service sends, the result goes through the same price normalization as the
//! local pipeline.

use serde::Deserialize;
use tracing::debug;

use crate::error::RemoteError;
use crate::models::receipt::{LineItem, ReceiptData};

use super::rules::{ZERO_PRICE, format_price};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RemoteReceipt {
    merchant: Option<String>,
    date: Option<String>,
    items: Vec<RemoteItem>,
    subtotal: Option<PriceValue>,
    tax: Option<PriceValue>,
    total: Option<PriceValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RemoteItem {
    name: Option<String>,
    price: Option<PriceValue>,
}

/// Services send prices both as `"$4.99"` and as `4.99`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PriceValue {
    Text(String),
    Number(serde_json::Number),
}

impl PriceValue {
    fn canonical(&self) -> String {
        match self {
            PriceValue::Text(s) => format_price(s),
            PriceValue::Number(n) => format_price(&n.to_string()),
        }
    }
}

fn canonical(price: Option<&PriceValue>) -> String {
    price
        .map(PriceValue::canonical)
        .unwrap_or_else(|| ZERO_PRICE.to_string())
}

/// Slice from the first `{` to the last `}`.
pub fn find_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse the receipt object embedded in a remote reply.
pub fn parse_remote_payload(text: &str) -> Result<ReceiptData, RemoteError> {
    let json = find_json_object(text).ok_or(RemoteError::NoJsonObject)?;
    let remote: RemoteReceipt = serde_json::from_str(json)?;

    let items: Vec<LineItem> = remote
        .items
        .iter()
        .filter_map(|item| {
            let name = item.name.as_deref().map(str::trim).unwrap_or_default();
            if name.is_empty() {
                return None;
            }
            Some(LineItem::new(name, canonical(item.price.as_ref())))
        })
        .collect();

    debug!(
        "Remote payload: {} of {} items kept",
        items.len(),
        remote.items.len()
    );

    Ok(ReceiptData {
        merchant: remote.merchant.unwrap_or_default().trim().to_string(),
        date: remote.date.unwrap_or_default().trim().to_string(),
        items,
        subtotal: canonical(remote.subtotal.as_ref()),
        tax: canonical(remote.tax.as_ref()),
        total: canonical(remote.total.as_ref()),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_find_json_object() {
        assert_eq!(find_json_object("ok {\"a\":1} done"), Some("{\"a\":1}"));
        assert_eq!(
            find_json_object("{\"a\":{\"b\":2}}\n"),
            Some("{\"a\":{\"b\":2}}")
        );
        assert_eq!(find_json_object("no object here"), None);
        assert_eq!(find_json_object("} backwards {"), None);
    }

    #[test]
    fn test_parse_full_payload() {
        let text = r#"```json
{"merchant": " Whole Foods ", "date": "2024-03-07",
 "items": [{"name": "Avocado", "price": "$1.5"}, {"name": "Kale", "price": 2.99}],
 "subtotal": "4.49", "tax": 0, "total": "$4.49"}
```"#;
        let receipt = parse_remote_payload(text).unwrap();

        assert_eq!(
            receipt,
            ReceiptData {
                merchant: "Whole Foods".to_string(),
                date: "2024-03-07".to_string(),
                items: vec![
                    LineItem::new("Avocado", "$1.50"),
                    LineItem::new("Kale", "$2.99"),
                ],
                subtotal: "$4.49".to_string(),
                tax: "$0.00".to_string(),
                total: "$4.49".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_keys_default() {
        let receipt = parse_remote_payload("{}").unwrap();
        assert_eq!(receipt, ReceiptData::new());
    }

    #[test]
    fn test_blank_names_dropped() {
        let text = r#"{"items": [{"name": "  ", "price": 1}, {"price": 2}, {"name": "Tea", "price": null}]}"#;
        let receipt = parse_remote_payload(text).unwrap();

        assert_eq!(receipt.items, vec![LineItem::new("Tea", "$0.00")]);
    }

    #[test]
    fn test_unreadable_prices_become_zero() {
        let receipt = parse_remote_payload(r#"{"total": "about ten"}"#).unwrap();
        assert_eq!(receipt.total, "$0.00");
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            parse_remote_payload("plain text"),
            Err(RemoteError::NoJsonObject)
        ));
        assert!(matches!(
            parse_remote_payload("{not json}"),
            Err(RemoteError::Json(_))
        ));
        assert!(matches!(
            parse_remote_payload(r#"{"items": "nope"}"#),
            Err(RemoteError::Json(_))
        ));
    }
}
