//! Decode command - decode a single e-invoice QR payload.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use twinv_core::{
    extract_items_from_taiwan_invoice, is_taiwan_einvoice, parse_taiwan_invoice_to_row,
    TaiwanInvoiceDecoder,
};

use super::load_config;
use super::output::{format_invoices, OutputFormat};

/// Arguments for the decode command.
#[derive(Args)]
pub struct DecodeArgs {
    /// Scanned QR payload
    #[arg(required_unless_present = "input", conflicts_with = "input")]
    data: Option<String>,

    /// Read the payload from a file instead
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// What to emit for the decoded invoice
    #[arg(long, value_enum, default_value = "invoice")]
    view: View,

    /// Show how many fields were extracted rather than defaulted
    #[arg(long)]
    show_completeness: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum View {
    /// The decoded invoice record
    Invoice,
    /// Inventory items derived from the invoice (JSON)
    Items,
    /// Storage row derived from the invoice (JSON)
    Row,
}

pub async fn run(args: DecodeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let data = match (&args.data, &args.input) {
        (Some(data), _) => data.clone(),
        (None, Some(path)) => {
            if !path.exists() {
                anyhow::bail!("Input file not found: {}", path.display());
            }
            fs::read_to_string(path)?
        }
        (None, None) => anyhow::bail!("No payload given"),
    };

    if config.decoder.require_classification
        && !is_taiwan_einvoice(&data, Some(&config.decoder.user_language))
    {
        anyhow::bail!("Payload does not look like a Taiwan e-invoice");
    }

    info!("Decoding payload of {} characters", data.len());
    let invoice = TaiwanInvoiceDecoder::new().decode(&data);

    let output = match args.view {
        View::Invoice => format_invoices(std::slice::from_ref(&invoice), args.format)?,
        View::Items => serde_json::to_string_pretty(&extract_items_from_taiwan_invoice(&invoice))?,
        View::Row => serde_json::to_string_pretty(&parse_taiwan_invoice_to_row(&invoice))?,
    };

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

    if args.show_completeness {
        eprintln!();
        eprintln!(
            "{} Extraction completeness: {:.1}%",
            style("ℹ").blue(),
            invoice.completeness() * 100.0
        );
        if !invoice.defaulted_fields.is_empty() {
            let labels: Vec<&str> = invoice.defaulted_fields.iter().map(|f| f.label()).collect();
            eprintln!("{} Defaulted: {}", style("ℹ").blue(), labels.join(", "));
        }
    }

    if !invoice.is_valid {
        anyhow::bail!(
            "Decoding failed: {}",
            invoice.error.as_deref().unwrap_or("unknown error")
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
