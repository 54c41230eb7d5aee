//! Classify command - check whether a payload looks like a Taiwan e-invoice.

use clap::Args;
use console::style;

use twinv_core::is_taiwan_einvoice;

use super::load_config;

/// Arguments for the classify command.
#[derive(Args)]
pub struct ClassifyArgs {
    /// Scanned payload
    #[arg(required = true)]
    data: String,

    /// User language (default: from config); `zh-TW` is lenient
    #[arg(short, long)]
    language: Option<String>,

    /// Print only `true` or `false`
    #[arg(short, long)]
    quiet: bool,
}

pub async fn run(args: ClassifyArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let language = args.language.unwrap_or(config.decoder.user_language);

    let accepted = is_taiwan_einvoice(&args.data, Some(&language));

    if args.quiet {
        println!("{}", accepted);
    } else if accepted {
        println!("{} Looks like a Taiwan e-invoice ({})", style("✓").green(), language);
    } else {
        println!("{} Not a Taiwan e-invoice ({})", style("✗").red(), language);
    }

    Ok(())
}
