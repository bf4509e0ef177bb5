//! Base provider traits and common types for Chatdrop
//!
//! This module defines the completion and image-generation traits that
//! providers implement, along with the role-tagged message types that make
//! up an outgoing request.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Fixed instructions that open every conversation
    System,
    /// The person typing and uploading files
    User,
    /// The model
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// Image reference inside a content part
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    /// `https://` URL or `data:` URI
    pub url: String,
}

/// One part of a multi-part message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text
    Text {
        /// The text
        text: String,
    },
    /// An image for vision-capable models
    ImageUrl {
        /// The image location
        image_url: ImageUrl,
    },
}

/// Message content: a plain string, or text and images
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain string content
    Text(String),
    /// Multi-part content
    Parts(Vec<ContentPart>),
}

/// Message structure for conversation
///
/// Represents one role-tagged entry of the list sent to a completion provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: Role,
    /// Content of the message
    pub content: MessageContent,
}

impl Message {
    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use chatdrop::providers::{Message, Role};
    ///
    /// let msg = Message::user("Hello, assistant!");
    /// assert_eq!(msg.role, Role::User);
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Creates a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Creates a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Creates a user message carrying text followed by images
    ///
    /// Falls back to plain text content when `image_urls` is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use chatdrop::providers::{Message, MessageContent};
    ///
    /// let msg = Message::user_with_images("what is this?", vec!["data:image/png;base64,AAAA".to_string()]);
    /// assert!(matches!(msg.content, MessageContent::Parts(ref parts) if parts.len() == 2));
    /// ```
    pub fn user_with_images(text: impl Into<String>, image_urls: Vec<String>) -> Self {
        if image_urls.is_empty() {
            return Self::user(text);
        }

        let mut parts = vec![ContentPart::Text { text: text.into() }];
        parts.extend(image_urls.into_iter().map(|url| ContentPart::ImageUrl {
            image_url: ImageUrl { url },
        }));

        Self {
            role: Role::User,
            content: MessageContent::Parts(parts),
        }
    }

    /// Text of the message with image parts left out
    pub fn text(&self) -> String {
        match &self.content {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::ImageUrl { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Reference to a generated image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReference {
    /// Where the image can be fetched or displayed from
    pub url: String,
    /// Prompt as rewritten by the provider, when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revised_prompt: Option<String>,
}

/// Completion provider trait
///
/// Takes the ordered conversation and returns the raw reply text,
/// including any routing marker the model prepended.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use chatdrop::error::Result;
/// use chatdrop::providers::{CompletionProvider, Message};
///
/// struct Echo;
///
/// #[async_trait]
/// impl CompletionProvider for Echo {
///     async fn complete(&self, messages: &[Message]) -> Result<String> {
///         Ok(format!("[1]\n{}", messages.last().map(|m| m.text()).unwrap_or_default()))
///     }
/// }
/// ```
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Complete a conversation
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the reply has no text
    async fn complete(&self, messages: &[Message]) -> Result<String>;

    /// Model used for completions, when known
    fn model_name(&self) -> Option<String> {
        None
    }
}

/// Image generation provider trait
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Generate one image for `prompt`
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or no image was returned
    async fn generate(&self, prompt: &str) -> Result<ImageReference>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_constructors() {
        assert_eq!(Message::user("hi").role, Role::User);
        assert_eq!(Message::assistant("hi").role, Role::Assistant);
        assert_eq!(Message::system("hi").role, Role::System);
    }

    #[test]
    fn test_text_message_serialization() {
        let value = serde_json::to_value(Message::user("Hello")).unwrap();
        assert_eq!(value, json!({"role": "user", "content": "Hello"}));
    }

    #[test]
    fn test_multipart_message_serialization() {
        let msg = Message::user_with_images("describe", vec!["data:image/png;base64,AA".into()]);
        let value = serde_json::to_value(msg).unwrap();
        assert_eq!(
            value,
            json!({
                "role": "user",
                "content": [
                    {"type": "text", "text": "describe"},
                    {"type": "image_url", "image_url": {"url": "data:image/png;base64,AA"}}
                ]
            })
        );
    }

    #[test]
    fn test_user_with_no_images_is_plain_text() {
        let msg = Message::user_with_images("plain", Vec::new());
        assert_eq!(msg.content, MessageContent::Text("plain".to_string()));
    }

    #[test]
    fn test_message_text_skips_images() {
        let msg = Message::user_with_images("look", vec!["data:image/png;base64,AA".into()]);
        assert_eq!(msg.text(), "look");
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Assistant.to_string(), "assistant");
        assert_eq!(Role::System.to_string(), "system");
    }

    #[test]
    fn test_message_deserialization_untagged() {
        let msg: Message =
            serde_json::from_value(json!({"role": "assistant", "content": "[1]\nok"})).unwrap();
        assert_eq!(msg, Message::assistant("[1]\nok"));
    }
}
