//! Provider module for Chatdrop
//!
//! This module contains the completion and image provider abstractions and
//! the OpenAI implementation.

pub mod base;
pub mod openai;

pub use base::{
    CompletionProvider, ContentPart, ImageProvider, ImageReference, ImageUrl, Message,
    MessageContent, Role,
};
pub use openai::OpenAiProvider;

use crate::config::ProviderConfig;
use crate::error::{ChatdropError, Result};
use std::sync::Arc;

/// Completion and image providers for one session
pub struct ProviderPair {
    /// Chat completion provider
    pub completion: Arc<dyn CompletionProvider>,
    /// Image generation provider
    pub image: Arc<dyn ImageProvider>,
}

/// Create the providers named by configuration
///
/// # Arguments
///
/// * `config` - Provider configuration
/// * `api_key` - Resolved credential for the provider
///
/// # Errors
///
/// Returns error if the provider type is unknown or initialization fails
pub fn create_providers(config: &ProviderConfig, api_key: String) -> Result<ProviderPair> {
    match config.provider_type.as_str() {
        "openai" => {
            let provider = Arc::new(OpenAiProvider::new(config.openai.clone(), api_key)?);
            Ok(ProviderPair {
                completion: provider.clone(),
                image: provider,
            })
        }
        other => Err(ChatdropError::Provider(format!("Unknown provider type: {}", other)).into()),
    }
}
