//! Output formatting shared by the decode, receipt, and batch commands.

use rust_decimal::Decimal;

use twinv_core::TaiwanInvoice;

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub fn format_invoices(invoices: &[TaiwanInvoice], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => match invoices {
            [single] => Ok(serde_json::to_string_pretty(single)?),
            _ => Ok(serde_json::to_string_pretty(invoices)?),
        },
        OutputFormat::Csv => format_csv(invoices),
        OutputFormat::Text => Ok(invoices
            .iter()
            .map(format_text)
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

const CSV_HEADER: [&str; 11] = [
    "invoice_number",
    "invoice_date",
    "seller_name",
    "seller_tax_id",
    "buyer_tax_id",
    "total_amount",
    "tax_amount",
    "items",
    "is_valid",
    "completeness",
    "error",
];

fn format_csv(invoices: &[TaiwanInvoice]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(CSV_HEADER)?;

    for invoice in invoices {
        wtr.write_record([
            invoice.invoice_number.clone(),
            invoice.invoice_date_string(),
            invoice.seller_name.clone(),
            invoice.seller_tax_id.clone(),
            invoice.buyer_tax_id.clone().unwrap_or_default(),
            invoice.total_amount.to_string(),
            invoice.tax_amount.to_string(),
            invoice.items.len().to_string(),
            invoice.is_valid.to_string(),
            format!("{:.2}", invoice.completeness()),
            invoice.error.clone().unwrap_or_default(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

pub fn format_text(invoice: &TaiwanInvoice) -> String {
    let mut output = String::new();

    if let Some(error) = &invoice.error {
        output.push_str(&format!("Error: {}\n", error));
        return output;
    }

    output.push_str(&format!("Invoice: {}\n", invoice.invoice_number));
    output.push_str(&format!("Date: {}\n", invoice.invoice_date_string()));
    output.push('\n');

    output.push_str("Seller:\n");
    output.push_str(&format!("  {}\n", invoice.seller_name));
    if !invoice.seller_tax_id.is_empty() {
        output.push_str(&format!("  Tax ID: {}\n", invoice.seller_tax_id));
    }

    if invoice.buyer_name.is_some() || invoice.buyer_tax_id.is_some() {
        output.push_str("\nBuyer:\n");
        if let Some(name) = &invoice.buyer_name {
            output.push_str(&format!("  {}\n", name));
        }
        if let Some(tax_id) = &invoice.buyer_tax_id {
            output.push_str(&format!("  Tax ID: {}\n", tax_id));
        }
    }
    output.push('\n');

    output.push_str("Items:\n");
    for item in &invoice.items {
        output.push_str(&format!(
            "  - {} x{} @ {} = {}\n",
            item.name, item.quantity, item.price, item.amount
        ));
    }
    let items_total: Decimal = invoice.items.iter().map(|i| i.amount).sum();
    output.push('\n');

    output.push_str("Summary:\n");
    output.push_str(&format!("  Items: {} NTD\n", items_total));
    output.push_str(&format!("  Tax:   {} NTD\n", invoice.tax_amount));
    output.push_str(&format!("  Total: {} NTD\n", invoice.total_amount));

    if !invoice.defaulted_fields.is_empty() {
        let labels: Vec<&str> = invoice.defaulted_fields.iter().map(|f| f.label()).collect();
        output.push_str(&format!("\nDefaulted: {}\n", labels.join(", ")));
    }

    output
}
