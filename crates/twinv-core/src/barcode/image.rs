//! Model-backed recognition of product photos.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::{debug, warn};

use crate::error::RecognitionError;

use super::model::{parse_model_reply, ProductModel};
use super::prompt::{item_image_prompt, BARCODE_IMAGE_PROMPT};
use super::{ItemRecognition, RecognitionSource};

/// Confidence of a reply that is not a JSON product description.
const UNPARSED_CONFIDENCE: u8 = 30;

const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// Base64-encoded photo with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductImage {
    mime_type: String,
    base64: String,
}

impl ProductImage {
    /// Encode raw image bytes.
    pub fn from_bytes(bytes: &[u8], mime_type: &str) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            base64: STANDARD.encode(bytes),
        }
    }

    /// Wrap base64 data, either bare (taken as JPEG) or as a `data:` URL.
    pub fn from_base64(data: &str) -> Self {
        let data = data.trim();
        let parsed = data
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(";base64,"));

        match parsed {
            Some((mime_type, base64)) => Self {
                mime_type: mime_type.to_string(),
                base64: base64.to_string(),
            },
            None => Self {
                mime_type: DEFAULT_MIME_TYPE.to_string(),
                base64: data.to_string(),
            },
        }
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// `data:<mime>;base64,<data>` URL for chat image parts.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64)
    }
}

/// MIME type for an image file extension, JPEG when unknown.
pub fn mime_type_for_extension(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => DEFAULT_MIME_TYPE,
    }
}

fn unrecognized(description: &str, confidence: u8) -> ItemRecognition {
    ItemRecognition {
        name: "Unknown Item".to_string(),
        description: description.to_string(),
        category: "Miscellaneous".to_string(),
        subcategory: None,
        confidence,
        language: None,
        source: RecognitionSource::Image,
    }
}

/// Result reported when no vision model is configured.
pub fn recognition_unavailable() -> ItemRecognition {
    unrecognized(
        "AI recognition not available. Please configure your OpenAI API key.",
        0,
    )
}

/// Identifies items and barcodes from photos through a [`ProductModel`].
pub struct ImageRecognizer {
    model: Box<dyn ProductModel>,
    user_language: String,
}

impl ImageRecognizer {
    pub fn new(model: impl ProductModel + 'static, user_language: &str) -> Self {
        Self {
            model: Box::new(model),
            user_language: user_language.to_string(),
        }
    }

    /// Build a recognizer over the configured chat-completions vision model.
    #[cfg(feature = "native")]
    pub fn from_config(config: &crate::TwinvConfig) -> crate::Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.recognition.timeout_secs))
            .build()
            .map_err(RecognitionError::from)?;
        let model = super::chat::ChatCompletionsModel::from_config(client, &config.model)?;

        Ok(Self::new(model, &config.decoder.user_language))
    }

    /// Identify the item in a photo, answering in the user language.
    pub async fn recognize_item(&self, image: &ProductImage) -> ItemRecognition {
        let prompt = item_image_prompt(&self.user_language);
        let mut found = self.recognize(&prompt, image, "Unable to recognize item").await;
        if found.confidence > 0 {
            found.language = Some(self.user_language.clone());
        }
        found
    }

    /// Identify a product from a photo of its barcode and packaging.
    pub async fn recognize_barcode_image(&self, image: &ProductImage) -> ItemRecognition {
        self.recognize(BARCODE_IMAGE_PROMPT, image, "Unable to recognize item from image")
            .await
    }

    async fn recognize(&self, prompt: &str, image: &ProductImage, failure: &str) -> ItemRecognition {
        let content = match self.model.describe_image(prompt, image).await {
            Ok(content) if !content.trim().is_empty() => content,
            Ok(_) => {
                warn!("Image recognition failed: {}", RecognitionError::EmptyResponse);
                return unrecognized(failure, 0);
            }
            Err(e) => {
                warn!("Image recognition failed: {}", e);
                return unrecognized(failure, 0);
            }
        };

        debug!("Vision model response: {}", content);

        match parse_model_reply(&content) {
            Ok(found) => ItemRecognition {
                source: RecognitionSource::Image,
                ..found
            },
            Err(e) => {
                debug!("{}, keeping raw content", e);
                unrecognized(&content, UNPARSED_CONFIDENCE)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    type Seen = Arc<Mutex<Vec<(String, String)>>>;

    /// Replies with canned text and records the prompt and image it saw.
    struct CannedVision {
        reply: Result<String, ()>,
        seen: Seen,
    }

    fn canned(reply: Result<&str, ()>) -> (CannedVision, Seen) {
        let seen = Seen::default();
        let model = CannedVision {
            reply: reply.map(str::to_string),
            seen: seen.clone(),
        };
        (model, seen)
    }

    #[async_trait]
    impl ProductModel for CannedVision {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, RecognitionError> {
            Err(RecognitionError::EmptyResponse)
        }

        async fn describe_image(&self, prompt: &str, image: &ProductImage) -> Result<String, RecognitionError> {
            self.seen.lock().unwrap().push((prompt.to_string(), image.data_url()));
            self.reply
                .clone()
                .map_err(|_| RecognitionError::Status { service: "vision".to_string(), status: 503 })
        }
    }

    struct TextOnly;

    #[async_trait]
    impl ProductModel for TextOnly {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, RecognitionError> {
            Ok("{}".to_string())
        }
    }

    fn photo() -> ProductImage {
        ProductImage::from_bytes(b"\x89PNG", "image/png")
    }

    #[test]
    fn test_image_encoding() {
        assert_eq!(photo().data_url(), "data:image/png;base64,iVBORw==");

        let image = ProductImage::from_base64("data:image/webp;base64,AAAA");
        assert_eq!(image.mime_type(), "image/webp");
        assert_eq!(image.data_url(), "data:image/webp;base64,AAAA");

        let image = ProductImage::from_base64(" /9j/4AAQ \n");
        assert_eq!(image.data_url(), "data:image/jpeg;base64,/9j/4AAQ");

        assert_eq!(mime_type_for_extension("PNG"), "image/png");
        assert_eq!(mime_type_for_extension("jpg"), "image/jpeg");
        assert_eq!(mime_type_for_extension("heic"), "image/jpeg");
    }

    #[tokio::test]
    async fn test_item_photo_uses_language_prompt() {
        let (model, seen) = canned(Ok(r#"{"name": "紅色保溫杯", "category": "餐具", "confidence": 82}"#));
        let recognizer = ImageRecognizer::new(model, "zh-TW");

        let found = recognizer.recognize_item(&photo()).await;

        assert_eq!(found.name, "紅色保溫杯");
        assert_eq!(found.category, "餐具");
        assert_eq!(found.confidence, 82);
        assert_eq!(found.language.as_deref(), Some("zh-TW"));
        assert_eq!(found.source, RecognitionSource::Image);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].0.contains("請用繁體中文回答。"));
        assert_eq!(seen[0].1, "data:image/png;base64,iVBORw==");
    }

    #[tokio::test]
    async fn test_barcode_photo_prompt_and_defaults() {
        let (model, seen) = canned(Ok("Here you go: {}"));
        let recognizer = ImageRecognizer::new(model, "ja");

        let found = recognizer.recognize_barcode_image(&photo()).await;

        assert_eq!(seen.lock().unwrap()[0].0, BARCODE_IMAGE_PROMPT);
        assert_eq!(found.name, "Unknown Item");
        assert_eq!(found.description, "No description available");
        assert_eq!(found.confidence, 50);
        assert_eq!(found.language, None);
    }

    #[tokio::test]
    async fn test_unparsed_reply_keeps_content() {
        let (model, _) = canned(Ok("A blue ceramic mug, probably."));
        let recognizer = ImageRecognizer::new(model, "en");

        let found = recognizer.recognize_item(&photo()).await;

        assert_eq!(found, ItemRecognition {
            name: "Unknown Item".to_string(),
            description: "A blue ceramic mug, probably.".to_string(),
            category: "Miscellaneous".to_string(),
            subcategory: None,
            confidence: 30,
            language: Some("en".to_string()),
            source: RecognitionSource::Image,
        });
    }

    #[tokio::test]
    async fn test_model_failures_report_zero_confidence() {
        let (model, _) = canned(Err(()));
        let found = ImageRecognizer::new(model, "en").recognize_barcode_image(&photo()).await;
        assert_eq!(found.description, "Unable to recognize item from image");
        assert_eq!(found.confidence, 0);

        let found = ImageRecognizer::new(TextOnly, "en").recognize_item(&photo()).await;
        assert_eq!(found.description, "Unable to recognize item");
        assert_eq!(found.confidence, 0);
        assert_eq!(found.language, None);

        assert_eq!(recognition_unavailable().confidence, 0);
    }
}
