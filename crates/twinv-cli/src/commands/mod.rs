//! CLI subcommands.

pub mod batch;
pub mod classify;
pub mod config;
pub mod decode;
pub mod image;
pub mod lookup;
pub mod output;
pub mod receipt;

use std::path::Path;

use tracing::debug;

use twinv_core::TwinvConfig;

/// Load configuration from `--config`, else the default file, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<TwinvConfig> {
    if let Some(path) = config_path {
        return Ok(TwinvConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Loading configuration from {}", default_path.display());
        Ok(TwinvConfig::from_file(&default_path)?)
    } else {
        Ok(TwinvConfig::default())
    }
}
