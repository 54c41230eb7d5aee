//! Image command - identify an item or a barcode from a photo.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::{info, warn};

use twinv_core::barcode::image::{mime_type_for_extension, recognition_unavailable};
use twinv_core::barcode::{ImageRecognizer, ProductImage};
use twinv_core::error::RecognitionError;
use twinv_core::TwinvError;

use super::load_config;
use super::lookup::{format_recognition, LookupFormat};

/// Arguments for the image command.
#[derive(Args)]
pub struct ImageArgs {
    /// Photo of the item (JPEG, PNG, GIF, WebP or BMP)
    #[arg(required = true)]
    input: PathBuf,

    /// The photo shows a barcode; read it together with the packaging
    #[arg(long)]
    barcode: bool,

    /// Response language (default: from config)
    #[arg(short, long)]
    language: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: LookupFormat,
}

pub async fn run(args: ImageArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(language) = args.language {
        config.decoder.user_language = language;
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let bytes = fs::read(&args.input)?;
    let mime_type = args
        .input
        .extension()
        .and_then(|e| e.to_str())
        .map(mime_type_for_extension)
        .unwrap_or("image/jpeg");
    let image = ProductImage::from_bytes(&bytes, mime_type);
    info!("Read {} bytes of {} from {}", bytes.len(), mime_type, args.input.display());

    let found = match ImageRecognizer::from_config(&config) {
        Ok(recognizer) if args.barcode => recognizer.recognize_barcode_image(&image).await,
        Ok(recognizer) => recognizer.recognize_item(&image).await,
        Err(TwinvError::Recognition(RecognitionError::NotConfigured(reason))) => {
            warn!("Image recognition unavailable: {}", reason);
            recognition_unavailable()
        }
        Err(e) => return Err(e.into()),
    };

    match args.format {
        LookupFormat::Json => println!("{}", serde_json::to_string_pretty(&found)?),
        LookupFormat::Text => {
            println!("{} {}", style("Image:").bold(), args.input.display());
            print!("{}", format_recognition(None, &found));
        }
    }

    Ok(())
}
