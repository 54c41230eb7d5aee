//! Configuration structures for decoding and barcode recognition.

use serde::{Deserialize, Serialize};

use crate::barcode::table::BarcodeEntry;
use crate::error::{Result, TwinvError};

/// Placeholder key value shipped in sample environments; treated as unset.
const PLACEHOLDER_API_KEY: &str = "your-openai-api-key";

/// Main configuration for twinv.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TwinvConfig {
    /// Decoder configuration.
    pub decoder: DecoderConfig,

    /// Barcode recognition chain configuration.
    pub recognition: RecognitionConfig,

    /// Product model (chat completions) configuration.
    pub model: ModelConfig,
}

/// E-invoice decoder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// User language; `zh-TW` switches the classifier into lenient mode.
    pub user_language: String,

    /// Only decode payloads the classifier accepts (CLI `decode`, `batch`).
    pub require_classification: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            user_language: "en".to_string(),
            require_classification: false,
        }
    }
}

/// Barcode recognition chain configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Base URL of the warehouse API serving `/api/warehouse/barcodes`.
    pub warehouse_url: Option<String>,

    /// Base URL of the OpenFoodFacts API.
    pub openfoodfacts_url: String,

    /// Enable the OpenFoodFacts stage.
    pub use_openfoodfacts: bool,

    /// HTTP timeout per request, in seconds.
    pub timeout_secs: u64,

    /// Model results above this confidence are saved to the warehouse.
    pub save_threshold: u8,

    /// Static barcode lookup table.
    pub lookup_table: Vec<BarcodeEntry>,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            warehouse_url: None,
            openfoodfacts_url: "https://world.openfoodfacts.org".to_string(),
            use_openfoodfacts: true,
            timeout_secs: 10,
            save_threshold: 70,
            lookup_table: crate::barcode::table::default_entries(),
        }
    }
}

/// Chat-completions model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Base URL of an OpenAI-compatible API.
    pub api_base: String,

    /// API key. Falls back to `OPENAI_API_KEY` when unset.
    pub api_key: Option<String>,

    /// Model used for barcode text analysis.
    pub text_model: String,

    /// Model used for product and barcode photos.
    pub vision_model: String,

    /// Maximum tokens per response.
    pub max_tokens: u32,

    /// Sampling temperature (0.0 - 1.0).
    pub temperature: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: None,
            text_model: "gpt-4o-mini".to_string(),
            vision_model: "gpt-4o".to_string(),
            max_tokens: 500,
            temperature: 0.3,
        }
    }
}

impl ModelConfig {
    /// Effective API key: the configured one, else `OPENAI_API_KEY`.
    ///
    /// Empty values and the sample placeholder count as unset.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|k| !k.trim().is_empty() && k != PLACEHOLDER_API_KEY)
    }
}

impl TwinvConfig {
    /// Load configuration from a JSON file and validate it.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check values serde cannot constrain.
    pub fn validate(&self) -> Result<()> {
        if self.decoder.user_language.trim().is_empty() {
            return Err(TwinvError::Config("decoder.user_language must not be empty".to_string()));
        }
        if self.recognition.timeout_secs == 0 {
            return Err(TwinvError::Config("recognition.timeout_secs must be positive".to_string()));
        }
        if self.recognition.save_threshold > 100 {
            return Err(TwinvError::Config(format!(
                "recognition.save_threshold must be 0-100, got {}",
                self.recognition.save_threshold
            )));
        }
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(TwinvError::Config(format!(
                "model.temperature must be 0.0-2.0, got {}",
                self.model.temperature
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: TwinvConfig =
            serde_json::from_str(r#"{"decoder": {"user_language": "zh-TW"}}"#).unwrap();

        assert_eq!(config.decoder.user_language, "zh-TW");
        assert!(!config.decoder.require_classification);
        assert_eq!(config.recognition.timeout_secs, 10);
        assert_eq!(config.recognition.lookup_table.len(), 3);
        assert_eq!(config.model.text_model, "gpt-4o-mini");
    }

    #[test]
    fn test_placeholder_api_key_is_unset() {
        let config = ModelConfig {
            api_key: Some(PLACEHOLDER_API_KEY.to_string()),
            ..ModelConfig::default()
        };
        assert_eq!(config.resolved_api_key(), None);

        let config = ModelConfig {
            api_key: Some("sk-test".to_string()),
            ..ModelConfig::default()
        };
        assert_eq!(config.resolved_api_key().as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        assert!(TwinvConfig::default().validate().is_ok());

        let mut config = TwinvConfig::default();
        config.recognition.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(TwinvError::Config(_))));

        let mut config = TwinvConfig::default();
        config.recognition.save_threshold = 101;
        assert!(matches!(config.validate(), Err(TwinvError::Config(_))));

        let mut config = TwinvConfig::default();
        config.decoder.user_language = " ".to_string();
        assert!(matches!(config.validate(), Err(TwinvError::Config(_))));
    }

    #[test]
    fn test_file_round_trip_and_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = TwinvConfig::default();
        config.model.vision_model = "llava".to_string();
        config.save(&path).unwrap();
        assert_eq!(TwinvConfig::from_file(&path).unwrap().model.vision_model, "llava");

        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(TwinvConfig::from_file(&path), Err(TwinvError::Json(_))));

        std::fs::write(&path, r#"{"recognition": {"timeout_secs": 0}}"#).unwrap();
        assert!(matches!(TwinvConfig::from_file(&path), Err(TwinvError::Config(_))));

        assert!(matches!(
            TwinvConfig::from_file(&dir.path().join("missing.json")),
            Err(TwinvError::Io(_))
        ));
    }
}
