//! Batch processing command for multiple OCR text dumps.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use rcpt_core::{ExtractionResult, KeywordReceiptParser, ReceiptParser, TotalSource};

use super::config::load_config;
use super::output::{OutputFormat, format_receipt};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching OCR text files
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    extraction: Option<ExtractionResult>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let parser = Arc::new(KeywordReceiptParser::from_config(&config)?);

    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            ext.eq_ignore_ascii_case("txt")
        })
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let stems = output_stems(&files);

    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));
    let mut tasks = JoinSet::new();

    for (index, path) in files.iter().cloned().enumerate() {
        let parser = Arc::clone(&parser);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            let result = tokio::task::spawn_blocking(move || process_single_file(path, &parser)).await?;
            Ok::<_, anyhow::Error>((index, result))
        });
    }

    let mut results: Vec<Option<ProcessResult>> = files.iter().map(|_| None).collect();

    while let Some(joined) = tasks.join_next().await {
        let (index, result) = joined??;

        if let Some(error_msg) = &result.error {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", result.path.display(), error_msg);
            } else {
                error!("Failed to process {}: {}", result.path.display(), error_msg);
                overall_pb.abandon();
                anyhow::bail!("Processing failed: {}", error_msg);
            }
        }

        results[index] = Some(result);
        overall_pb.inc(1);
    }

    overall_pb.finish_with_message("Complete");

    if let Some(output_dir) = &args.output_dir {
        for (result, stem) in results.iter().zip(&stems) {
            if let Some(extraction) = result.as_ref().and_then(|r| r.extraction.as_ref()) {
                let output_path = output_dir.join(format!("{}.{}", stem, args.format.extension()));

                fs::write(&output_path, format_receipt(&extraction.receipt, args.format)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    let results: Vec<ProcessResult> = results.into_iter().flatten().collect();
    let successful: Vec<_> = results.iter().filter(|r| r.extraction.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn process_single_file(path: PathBuf, parser: &KeywordReceiptParser) -> ProcessResult {
    let file_start = Instant::now();

    let outcome = fs::read_to_string(&path).map(|text| parser.parse(&text));
    let processing_time_ms = file_start.elapsed().as_millis() as u64;

    match outcome {
        Ok(extraction) => ProcessResult {
            path,
            extraction: Some(extraction),
            error: None,
            processing_time_ms,
        },
        Err(e) => ProcessResult {
            path,
            extraction: None,
            error: Some(e.to_string()),
            processing_time_ms,
        },
    }
}

/// Output file stem for each input.
///
/// Inputs sharing a file stem are named after their path below the common
/// directory of the batch (`a/receipt.txt` becomes `a_receipt`).
fn output_stems(files: &[PathBuf]) -> Vec<String> {
    let stem = |path: &Path| {
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("receipt")
            .to_string()
    };

    let mut counts: HashMap<String, usize> = HashMap::new();
    for path in files {
        *counts.entry(stem(path)).or_default() += 1;
    }

    let base = common_parent(files);
    let mut used = HashSet::new();

    files
        .iter()
        .enumerate()
        .map(|(index, path)| {
            let mut name = stem(path);
            if counts[&name] > 1 {
                let relative = path.strip_prefix(&base).unwrap_or(path).with_extension("");
                name = relative
                    .components()
                    .filter_map(|c| match c {
                        Component::Normal(part) => part.to_str(),
                        _ => None,
                    })
                    .collect::<Vec<_>>()
                    .join("_");
            }
            if !used.insert(name.clone()) {
                name = format!("{}_{}", name, index + 1);
                used.insert(name.clone());
            }
            name
        })
        .collect()
}

/// Deepest directory containing every input.
fn common_parent(files: &[PathBuf]) -> PathBuf {
    let mut parents = files.iter().filter_map(|p| p.parent());
    let Some(first) = parents.next() else {
        return PathBuf::new();
    };

    let mut common = first.to_path_buf();
    for parent in parents {
        while !parent.starts_with(&common) {
            if !common.pop() {
                return PathBuf::new();
            }
        }
    }
    common
}

fn iso_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "merchant",
        "date",
        "date_iso",
        "items",
        "subtotal",
        "tax",
        "total",
        "total_source",
        "warnings",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        if let Some(extraction) = &result.extraction {
            let receipt = &extraction.receipt;
            let status = match extraction.total_source {
                TotalSource::Missing => "partial",
                _ => "success",
            };
            wtr.write_record([
                filename,
                status,
                receipt.merchant.as_str(),
                receipt.date.as_str(),
                iso_date(receipt.parsed_date()).as_str(),
                receipt.items.len().to_string().as_str(),
                receipt.subtotal.as_str(),
                receipt.tax.as_str(),
                receipt.total.as_str(),
                extraction.total_source.to_string().as_str(),
                extraction.warnings.len().to_string().as_str(),
                result.processing_time_ms.to_string().as_str(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                result.processing_time_ms.to_string().as_str(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
