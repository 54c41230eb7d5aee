//! Batch command - decode payload files with one QR payload per line.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use twinv_core::{is_taiwan_einvoice, TaiwanInvoice, TaiwanInvoiceDecoder, TwinvConfig};

use super::load_config;
use super::output::{format_invoices, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern (one payload per line)
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

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of decoding one payload line.
struct DecodeResult {
    path: PathBuf,
    line: usize,
    invoice: Option<TaiwanInvoice>,
    error: Option<String>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();

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

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let decoder = TaiwanInvoiceDecoder::new();
    let mut results = Vec::new();

    for path in &files {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if args.continue_on_error => {
                warn!("Failed to read {}: {}", path.display(), e);
                results.push(DecodeResult {
                    path: path.clone(),
                    line: 0,
                    invoice: None,
                    error: Some(e.to_string()),
                });
                progress.inc(1);
                continue;
            }
            Err(e) => {
                error!("Failed to read {}: {}", path.display(), e);
                anyhow::bail!("Processing failed: {}", e);
            }
        };

        let mut file_invoices = Vec::new();

        for (index, payload) in content.lines().enumerate() {
            if payload.trim().is_empty() {
                continue;
            }

            let result = decode_payload(&decoder, &config, payload);
            match result {
                Ok(invoice) => {
                    file_invoices.push(invoice.clone());
                    results.push(DecodeResult {
                        path: path.clone(),
                        line: index + 1,
                        invoice: Some(invoice),
                        error: None,
                    });
                }
                Err(e) if args.continue_on_error => {
                    warn!("{}:{}: {}", path.display(), index + 1, e);
                    results.push(DecodeResult {
                        path: path.clone(),
                        line: index + 1,
                        invoice: None,
                        error: Some(e.to_string()),
                    });
                }
                Err(e) => {
                    error!("{}:{}: {}", path.display(), index + 1, e);
                    anyhow::bail!("Processing failed at {}:{}: {}", path.display(), index + 1, e);
                }
            }
        }

        if let Some(output_dir) = &args.output_dir {
            if !file_invoices.is_empty() {
                write_file_output(output_dir, path, &file_invoices, args.format)?;
            }
        }

        progress.inc(1);
    }

    progress.finish_with_message("Complete");

    let successful = results.iter().filter(|r| r.invoice.is_some()).count();
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
        "{} Decoded {} payloads from {} files in {:?}",
        style("✓").green(),
        results.len(),
        files.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed payloads:").red());
        for result in &failed {
            println!(
                "  - {}:{}: {}",
                result.path.display(),
                result.line,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn decode_payload(
    decoder: &TaiwanInvoiceDecoder,
    config: &TwinvConfig,
    payload: &str,
) -> anyhow::Result<TaiwanInvoice> {
    if config.decoder.require_classification
        && !is_taiwan_einvoice(payload, Some(&config.decoder.user_language))
    {
        anyhow::bail!("Payload does not look like a Taiwan e-invoice");
    }

    Ok(decoder.try_decode(payload)?)
}

fn write_file_output(
    output_dir: &Path,
    input: &Path,
    invoices: &[TaiwanInvoice],
    format: OutputFormat,
) -> anyhow::Result<()> {
    let output_name = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("invoices");
    let output_path = output_dir.join(format!("{}.{}", output_name, format.extension()));

    let content = match format {
        // Always an array, even for a single payload
        OutputFormat::Json => serde_json::to_string_pretty(invoices)?,
        _ => format_invoices(invoices, format)?,
    };

    fs::write(&output_path, content)?;
    debug!("Wrote output to {}", output_path.display());
    Ok(())
}

fn write_summary(path: &Path, results: &[DecodeResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "line",
        "status",
        "invoice_number",
        "invoice_date",
        "seller_name",
        "seller_tax_id",
        "total_amount",
        "tax_amount",
        "items",
        "completeness",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string();

        let record = match &result.invoice {
            Some(invoice) => [
                filename,
                result.line.to_string(),
                "success".to_string(),
                invoice.invoice_number.clone(),
                invoice.invoice_date_string(),
                invoice.seller_name.clone(),
                invoice.seller_tax_id.clone(),
                invoice.total_amount.to_string(),
                invoice.tax_amount.to_string(),
                invoice.items.len().to_string(),
                format!("{:.2}", invoice.completeness()),
                String::new(),
            ],
            None => [
                filename,
                result.line.to_string(),
                "error".to_string(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                result.error.clone().unwrap_or_default(),
            ],
        };
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}
