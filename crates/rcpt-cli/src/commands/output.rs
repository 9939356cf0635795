//! Rendering extracted receipts for the terminal and for files.

use serde::Serialize;

use rcpt_core::{ClassifiedLine, LineClass, LineItem, ReceiptData};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
    /// XML output
    Xml,
}

impl OutputFormat {
    /// File extension used for batch outputs.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
            OutputFormat::Xml => "xml",
        }
    }
}

pub fn format_receipt(receipt: &ReceiptData, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(receipt)?),
        OutputFormat::Csv => format_csv(receipt),
        OutputFormat::Text => Ok(format_text(receipt)),
        OutputFormat::Xml => format_xml(receipt),
    }
}

/// One row per item followed by the subtotal, tax and total rows.
fn format_csv(receipt: &ReceiptData) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["merchant", "date", "kind", "name", "price"])?;

    for item in &receipt.items {
        wtr.write_record([
            receipt.merchant.as_str(),
            receipt.date.as_str(),
            "item",
            item.name.as_str(),
            item.price.as_str(),
        ])?;
    }

    for (kind, price) in [
        ("subtotal", &receipt.subtotal),
        ("tax", &receipt.tax),
        ("total", &receipt.total),
    ] {
        wtr.write_record([
            receipt.merchant.as_str(),
            receipt.date.as_str(),
            kind,
            "",
            price.as_str(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(receipt: &ReceiptData) -> String {
    let mut output = String::new();

    output.push_str(&format!("Merchant: {}\n", receipt.merchant));
    output.push_str(&format!("Date: {}\n", receipt.date));
    output.push('\n');

    let width = receipt
        .items
        .iter()
        .map(|item| item.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Subtotal:".len());

    output.push_str("Items:\n");
    for item in &receipt.items {
        output.push_str(&format!("  {:<width$}  {:>10}\n", item.name, item.price));
    }
    output.push('\n');

    for (label, price) in [
        ("Subtotal:", &receipt.subtotal),
        ("Tax:", &receipt.tax),
        ("Total:", &receipt.total),
    ] {
        output.push_str(&format!("  {:<width$}  {:>10}\n", label, price));
    }

    output
}

#[derive(Serialize)]
struct XmlReceipt<'a> {
    merchant: &'a str,
    date: &'a str,
    items: XmlItems<'a>,
    subtotal: &'a str,
    tax: &'a str,
    total: &'a str,
}

#[derive(Serialize)]
struct XmlItems<'a> {
    #[serde(rename = "item")]
    item: &'a [LineItem],
}

fn format_xml(receipt: &ReceiptData) -> anyhow::Result<String> {
    let xml = XmlReceipt {
        merchant: &receipt.merchant,
        date: &receipt.date,
        items: XmlItems {
            item: &receipt.items,
        },
        subtotal: &receipt.subtotal,
        tax: &receipt.tax,
        total: &receipt.total,
    };
    Ok(quick_xml::se::to_string_with_root("receipt", &xml)?)
}

/// Each normalized line with what it was classified as.
pub fn format_explain(lines: &[ClassifiedLine]) -> String {
    let mut output = String::new();
    for (i, classified) in lines.iter().enumerate() {
        let detail = match &classified.class {
            LineClass::Item { name, price } => format!("{} {:?} {}", classified.class.label(), name, price),
            LineClass::Total { price } | LineClass::Tax { price } | LineClass::Subtotal { price } => {
                format!("{} {}", classified.class.label(), price)
            }
            LineClass::Skip => classified.class.label().to_string(),
        };
        output.push_str(&format!("{:>3}  {:<40}  {}\n", i + 1, classified.line, detail));
    }
    output
}
