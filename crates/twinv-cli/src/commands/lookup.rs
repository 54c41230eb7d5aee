//! Lookup command - identify a product barcode through the recognition chain.

use clap::Args;
use console::style;
use tracing::debug;

use twinv_core::barcode::detect_barcode_format;
use twinv_core::{ItemRecognition, RecognitionChain};

use super::load_config;

/// Arguments for the lookup command.
#[derive(Args)]
pub struct LookupArgs {
    /// Barcode (or QR payload) to identify
    #[arg(required = true)]
    barcode: String,

    /// Response language (default: from config)
    #[arg(short, long)]
    language: Option<String>,

    /// Skip network stages (warehouse, OpenFoodFacts, model)
    #[arg(long)]
    offline: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: LookupFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum LookupFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

pub async fn run(args: LookupArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(language) = args.language {
        config.decoder.user_language = language;
    }

    let chain = if args.offline {
        RecognitionChain::offline(&config)
    } else {
        RecognitionChain::from_config(&config)?
    };
    debug!("Recognition chain: {:?}", chain);

    let found = chain.resolve(args.barcode.trim()).await;

    match args.format {
        LookupFormat::Json => println!("{}", serde_json::to_string_pretty(&found)?),
        LookupFormat::Text => print!("{}", format_recognition(Some(&args.barcode), &found)),
    }

    Ok(())
}

/// Text summary of a recognition, headed by the barcode when there is one.
pub fn format_recognition(barcode: Option<&str>, found: &ItemRecognition) -> String {
    let mut output = String::new();

    if let Some(barcode) = barcode {
        output.push_str(&format!(
            "Barcode: {} ({})\n",
            barcode,
            detect_barcode_format(barcode.trim())
        ));
    }
    output.push_str(&format!("Name: {}\n", found.name));
    output.push_str(&format!("Description: {}\n", found.description));
    match &found.subcategory {
        Some(sub) => output.push_str(&format!("Category: {} / {}\n", found.category, sub)),
        None => output.push_str(&format!("Category: {}\n", found.category)),
    }
    output.push_str(&format!(
        "{} Confidence: {}% (source: {})\n",
        style("ℹ").blue(),
        found.confidence,
        found.source
    ));

    output
}
