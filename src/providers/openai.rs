//! OpenAI provider implementation for Chatdrop
//!
//! This module implements both provider traits against the OpenAI REST API
//! (or any server exposing the same `/chat/completions` and
//! `/images/generations` endpoints).

use crate::config::OpenAiConfig;
use crate::error::{ChatdropError, Result};
use crate::providers::{CompletionProvider, ImageProvider, ImageReference, Message};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OpenAI API provider
///
/// A single instance serves both chat completions and image generation;
/// share it behind an `Arc` to use it for both session roles.
///
/// # Examples
///
/// ```no_run
/// use chatdrop::config::OpenAiConfig;
/// use chatdrop::providers::{CompletionProvider, Message, OpenAiProvider};
///
/// # async fn example() -> chatdrop::error::Result<()> {
/// let provider = OpenAiProvider::new(OpenAiConfig::default(), "sk-...".to_string())?;
/// let reply = provider.complete(&[Message::user("Hello!")]).await?;
/// # Ok(())
/// # }
/// ```
pub struct OpenAiProvider {
    client: Client,
    config: OpenAiConfig,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
    quality: &'a str,
    n: u32,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    b64_json: Option<String>,
    #[serde(default)]
    revised_prompt: Option<String>,
}

impl OpenAiProvider {
    /// Create a new OpenAI provider instance
    ///
    /// # Errors
    ///
    /// Returns `MissingCredentials` for an empty key, or an error if the
    /// HTTP client cannot be built
    pub fn new(config: OpenAiConfig, api_key: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(ChatdropError::MissingCredentials("openai".to_string()).into());
        }

        let mut builder = Client::builder().user_agent(concat!("chatdrop/", env!("CARGO_PKG_VERSION")));
        if let Some(seconds) = config.request_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder
            .build()
            .map_err(|e| ChatdropError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized OpenAI provider: api_base={}, model={}, image_model={}",
            config.api_base,
            config.model,
            config.image_model
        );

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// Get the configured chat model
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_base.trim_end_matches('/'), path)
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response> {
        let url = self.endpoint(path);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("OpenAI request to {} failed: {}", path, e);
                ChatdropError::Provider(format!("OpenAI request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("OpenAI returned error {}: {}", status, error_text);
            return Err(ChatdropError::Provider(format!(
                "OpenAI returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        Ok(response)
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages,
        };

        tracing::debug!("Sending OpenAI chat request: {} messages", messages.len());

        let response = self.post_json("chat/completions", &request).await?;
        let chat: ChatResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse OpenAI chat response: {}", e);
            ChatdropError::Provider(format!("Failed to parse OpenAI response: {}", e))
        })?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                ChatdropError::Provider("OpenAI response contained no message content".to_string())
                    .into()
            })
    }

    fn model_name(&self) -> Option<String> {
        Some(self.config.model.clone())
    }
}

#[async_trait]
impl ImageProvider for OpenAiProvider {
    async fn generate(&self, prompt: &str) -> Result<ImageReference> {
        let request = ImageRequest {
            model: &self.config.image_model,
            prompt,
            size: &self.config.image_size,
            quality: &self.config.image_quality,
            n: 1,
        };

        tracing::debug!("Sending OpenAI image request with model {}", self.config.image_model);

        let response = self.post_json("images/generations", &request).await?;
        let images: ImageResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse OpenAI image response: {}", e);
            ChatdropError::Provider(format!("Failed to parse OpenAI image response: {}", e))
        })?;

        let datum = images.data.into_iter().next().ok_or_else(|| {
            ChatdropError::Provider("OpenAI image response returned no images".to_string())
        })?;

        let url = match (datum.url, datum.b64_json) {
            (Some(url), _) => url,
            (None, Some(b64)) => format!("data:image/png;base64,{}", b64),
            (None, None) => {
                return Err(ChatdropError::Provider(
                    "OpenAI image response had neither url nor b64_json".to_string(),
                )
                .into())
            }
        };

        Ok(ImageReference {
            url,
            revised_prompt: datum.revised_prompt,
        })
    }
}
