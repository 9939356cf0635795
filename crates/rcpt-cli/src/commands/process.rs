//! Process command - extract a receipt from a single OCR text dump.

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info, warn};

use rcpt_core::{KeywordReceiptParser, ReceiptExtractor, ReceiptParser};

use super::config::load_config;
use super::output::{OutputFormat, format_explain, format_receipt};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input text file, or "-" for stdin
    #[arg(required_unless_present = "remote_response")]
    input: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Saved reply from a remote correction service, used instead of INPUT
    #[arg(long, conflicts_with = "input")]
    remote_response: Option<PathBuf>,

    /// Show how every normalized line was classified
    #[arg(long)]
    explain: bool,

    /// Validate extracted data
    #[arg(long)]
    validate: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let parser = KeywordReceiptParser::from_config(&config)?;

    let (receipt, warnings) = if let Some(reply_path) = &args.remote_response {
        info!("Processing remote reply: {}", reply_path.display());
        let reply = fs::read_to_string(reply_path).map_err(|e| {
            anyhow::anyhow!("Failed to read {}: {}", reply_path.display(), e)
        })?;

        if args.explain {
            warn!("--explain has no effect on remote replies");
        }

        let receipt = parser.extract_from_response(&reply);
        let warnings = receipt.validate();
        (receipt, warnings)
    } else {
        let input = args.input.as_deref().unwrap_or("-");
        let text = read_input(input)?;

        let result = parser.parse(&text);
        if args.explain {
            eprintln!("{}", style("Line classification:").bold());
            eprint!("{}", format_explain(&result.lines));
            eprintln!();
        }
        (result.receipt, result.warnings)
    };

    if args.validate && !warnings.is_empty() {
        eprintln!("{}", style("Validation issues:").yellow());
        for issue in &warnings {
            eprintln!("  - {}", issue);
        }
    }

    let output = format_receipt(&receipt, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        info!("Reading OCR text from stdin");
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    let path = PathBuf::from(input);
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    info!("Processing file: {}", path.display());
    Ok(fs::read_to_string(&path)?)
}
