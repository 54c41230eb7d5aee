//! CLI application for Taiwan e-invoice decoding and barcode lookup.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{batch, classify, config, decode, image, lookup, receipt};

/// Taiwan e-invoice toolkit - Decode e-invoice QR codes and identify barcodes
#[derive(Parser)]
#[command(name = "twinv")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a single e-invoice QR payload
    Decode(decode::DecodeArgs),

    /// Decode a paper receipt (left QR, right QR, barcode)
    Receipt(receipt::ReceiptArgs),

    /// Check whether a payload looks like a Taiwan e-invoice
    Classify(classify::ClassifyArgs),

    /// Identify a product barcode
    Lookup(lookup::LookupArgs),

    /// Identify an item or a barcode from a photo
    Image(image::ImageArgs),

    /// Decode payload files in bulk
    Batch(batch::BatchArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Decode(args) => decode::run(args, config_path).await,
        Commands::Receipt(args) => receipt::run(args, config_path).await,
        Commands::Classify(args) => classify::run(args, config_path).await,
        Commands::Lookup(args) => lookup::run(args, config_path).await,
        Commands::Image(args) => image::run(args, config_path).await,
        Commands::Batch(args) => batch::run(args, config_path).await,
        Commands::Config(args) => config::run(args, config_path).await,
    }
}
