//! Model-backed barcode recognition.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::RecognitionError;

use super::image::ProductImage;
use super::prompt::{barcode_prompt, BARCODE_ANALYST_SYSTEM};
use super::{BarcodeResolver, BarcodeStore, ItemRecognition, RecognitionSource};

/// Default confidence above which model results are saved.
pub const DEFAULT_SAVE_THRESHOLD: u8 = 70;

/// Confidence used when the model omits one.
const DEFAULT_MODEL_CONFIDENCE: u8 = 50;

/// A text model answering product questions.
#[async_trait]
pub trait ProductModel: Send + Sync {
    /// Send a system and a user message, returning the reply text.
    async fn complete(&self, system: &str, user: &str) -> Result<String, RecognitionError>;

    /// Send `prompt` together with a photo, returning the reply text.
    ///
    /// Text-only models keep the default, which reports the stage as not configured.
    async fn describe_image(&self, _prompt: &str, _image: &ProductImage) -> Result<String, RecognitionError> {
        Err(RecognitionError::NotConfigured("model has no image input".to_string()))
    }
}

/// Resolver that asks a [`ProductModel`] to identify the barcode.
pub struct ModelResolver {
    model: Box<dyn ProductModel>,
    user_language: String,
    store: Option<Arc<dyn BarcodeStore>>,
    save_threshold: u8,
}

impl ModelResolver {
    pub fn new(model: impl ProductModel + 'static, user_language: &str) -> Self {
        Self {
            model: Box::new(model),
            user_language: user_language.to_string(),
            store: None,
            save_threshold: DEFAULT_SAVE_THRESHOLD,
        }
    }

    /// Save confident results to `store`.
    pub fn with_store(mut self, store: Arc<dyn BarcodeStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_save_threshold(mut self, threshold: u8) -> Self {
        self.save_threshold = threshold;
        self
    }

    async fn save(&self, barcode: &str, found: &ItemRecognition) {
        let Some(store) = &self.store else {
            return;
        };

        match store.save(barcode, found).await {
            Ok(()) => debug!("Barcode saved: {} -> {}", barcode, found.name),
            Err(e) => warn!("Failed to save barcode {}: {}", barcode, e),
        }
    }
}

#[async_trait]
impl BarcodeResolver for ModelResolver {
    fn name(&self) -> &'static str {
        "model"
    }

    async fn try_resolve(&self, barcode: &str) -> Option<ItemRecognition> {
        let prompt = barcode_prompt(barcode, &self.user_language);

        let content = match self.model.complete(BARCODE_ANALYST_SYSTEM, &prompt).await {
            Ok(content) if !content.trim().is_empty() => content,
            Ok(_) => {
                warn!("Model recognition of {} failed: {}", barcode, RecognitionError::EmptyResponse);
                return None;
            }
            Err(e) => {
                warn!("Model recognition of {} failed: {}", barcode, e);
                return None;
            }
        };

        debug!("Model response for {}: {}", barcode, content);

        match parse_model_reply(&content) {
            Ok(found) => {
                if found.confidence > self.save_threshold {
                    self.save(barcode, &found).await;
                }
                Some(found)
            }
            Err(e) => {
                debug!("{}, deriving result from raw content", e);
                Some(recognition_from_content(&content, barcode))
            }
        }
    }
}

/// First `{`..last `}` span of `content`.
fn json_span(content: &str) -> &str {
    let trimmed = content.trim();
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}

/// Interpret a model reply as a JSON product description.
pub fn parse_model_reply(content: &str) -> Result<ItemRecognition, RecognitionError> {
    let value: Value = serde_json::from_str(json_span(content)).map_err(|e| RecognitionError::Parse {
        what: "model reply".to_string(),
        reason: e.to_string(),
    })?;

    let text = |key: &str| {
        value
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let confidence = match value.get("confidence") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .map(|c| c.round().clamp(0.0, 100.0) as u8)
    .filter(|c| *c > 0)
    .unwrap_or(DEFAULT_MODEL_CONFIDENCE);

    Ok(ItemRecognition {
        name: text("name").unwrap_or_else(|| "Unknown Item".to_string()),
        description: text("description").unwrap_or_else(|| "No description available".to_string()),
        category: text("category").unwrap_or_else(|| "Miscellaneous".to_string()),
        subcategory: text("subcategory"),
        confidence,
        language: None,
        source: RecognitionSource::Model,
    })
}

/// Best-effort result from a reply that is not JSON.
pub fn recognition_from_content(content: &str, barcode: &str) -> ItemRecognition {
    let lower = content.to_lowercase();
    let looks_taiwanese = ["taiwan", "wet wipe", "tissue"]
        .iter()
        .any(|k| lower.contains(k));

    if looks_taiwanese {
        ItemRecognition {
            name: "Taiwan Product".to_string(),
            description: content.to_string(),
            category: "Personal Care".to_string(),
            subcategory: Some("Wet Wipes".to_string()),
            confidence: 60,
            language: None,
            source: RecognitionSource::Model,
        }
    } else {
        ItemRecognition {
            name: format!("Product {}", barcode),
            description: content.to_string(),
            category: "Miscellaneous".to_string(),
            subcategory: None,
            confidence: 40,
            language: None,
            source: RecognitionSource::Model,
        }
    }
}
