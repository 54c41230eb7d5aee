//! Receipt command - decode both QR codes of a paper e-invoice.

use clap::Args;
use console::style;

use twinv_core::{ReceiptCodes, TaiwanInvoiceDecoder};

use super::output::{format_invoices, OutputFormat};

/// Arguments for the receipt command.
#[derive(Args)]
pub struct ReceiptArgs {
    /// Left QR code payload (invoice header)
    #[arg(short, long)]
    left: Option<String>,

    /// Right QR code payload (item details)
    #[arg(short, long)]
    right: Option<String>,

    /// 1D barcode content
    #[arg(short, long)]
    barcode: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

pub async fn run(args: ReceiptArgs, _config_path: Option<&str>) -> anyhow::Result<()> {
    if args.left.is_none() && args.right.is_none() {
        anyhow::bail!("Provide at least one of --left or --right");
    }

    let codes = ReceiptCodes {
        left_qr_code: args.left,
        right_qr_code: args.right,
        barcode: args.barcode,
    };

    let receipt = TaiwanInvoiceDecoder::new().decode_receipt(&codes);

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&receipt)?,
        format => format_invoices(std::slice::from_ref(&receipt.invoice), format)?,
    };
    println!("{}", output);

    if !receipt.invoice.is_valid {
        eprintln!(
            "{} {}",
            style("✗").red(),
            receipt.invoice.error.as_deref().unwrap_or("Receipt could not be decoded")
        );
        anyhow::bail!("Receipt could not be decoded");
    }

    Ok(())
}
