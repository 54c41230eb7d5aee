//! OpenAI-compatible chat-completions client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RecognitionError;
use crate::models::config::ModelConfig;

use super::image::ProductImage;
use super::model::ProductModel;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: MessageContent<'a>,
}

/// Plain text, or a list of text and image parts for vision models.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// [`ProductModel`] over `POST {api_base}/chat/completions`.
#[derive(Debug, Clone)]
pub struct ChatCompletionsModel {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    text_model: String,
    vision_model: String,
    max_tokens: u32,
    temperature: f32,
}

impl ChatCompletionsModel {
    /// Build a client from configuration.
    ///
    /// Fails with [`RecognitionError::NotConfigured`] without an API key.
    pub fn from_config(client: reqwest::Client, config: &ModelConfig) -> Result<Self, RecognitionError> {
        let api_key = config.resolved_api_key().ok_or_else(|| {
            RecognitionError::NotConfigured("no API key (set model.api_key or OPENAI_API_KEY)".to_string())
        })?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.api_base.trim_end_matches('/')),
            api_key,
            text_model: config.text_model.clone(),
            vision_model: config.vision_model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    async fn send(&self, request: &ChatRequest<'_>) -> Result<String, RecognitionError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RecognitionError::Status {
                service: "chat completions".to_string(),
                status: response.status().as_u16(),
            });
        }

        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(RecognitionError::EmptyResponse)
    }
}

fn image_request<'a>(
    model: &'a str,
    prompt: &'a str,
    image: &ProductImage,
    max_tokens: u32,
    temperature: f32,
) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: vec![ChatMessage {
            role: "user",
            content: MessageContent::Parts(vec![
                ContentPart::Text { text: prompt },
                ContentPart::ImageUrl {
                    image_url: ImageUrl { url: image.data_url() },
                },
            ]),
        }],
        max_tokens,
        temperature,
    }
}

#[async_trait]
impl ProductModel for ChatCompletionsModel {
    async fn complete(&self, system: &str, user: &str) -> Result<String, RecognitionError> {
        let request = ChatRequest {
            model: &self.text_model,
            messages: vec![
                ChatMessage { role: "system", content: MessageContent::Text(system) },
                ChatMessage { role: "user", content: MessageContent::Text(user) },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        self.send(&request).await
    }

    async fn describe_image(&self, prompt: &str, image: &ProductImage) -> Result<String, RecognitionError> {
        let request = image_request(&self.vision_model, prompt, image, self.max_tokens, self.temperature);
        self.send(&request).await
    }
}
