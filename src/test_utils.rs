//! Test utilities for Chatdrop
//!
//! This module provides scripted provider fakes, temporary directory
//! management, test file creation, and assertion helpers.

use crate::error::{ChatdropError, Result};
use crate::providers::{CompletionProvider, ImageProvider, ImageReference, Message};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;

/// Completion provider that answers from a fixed script
///
/// Each call pops the next reply; an exhausted script fails the call.
/// Every message list received is recorded.
pub struct ScriptedCompletion {
    replies: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedCompletion {
    /// Create a provider that returns `replies` in order
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Message lists received so far
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedCompletion {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        self.calls.lock().unwrap().push(messages.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ChatdropError::Provider("script exhausted".to_string()).into())
    }

    fn model_name(&self) -> Option<String> {
        Some("scripted".to_string())
    }
}

/// Image provider returning a fixed URL, or always failing
pub struct ScriptedImage {
    url: Option<String>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedImage {
    /// Create a provider that returns `url` for every prompt
    pub fn new(url: &str) -> Self {
        Self {
            url: Some(url.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Create a provider whose every call fails
    pub fn failing() -> Self {
        Self {
            url: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageProvider for ScriptedImage {
    async fn generate(&self, prompt: &str) -> Result<ImageReference> {
        self.calls.lock().unwrap().push(prompt.to_string());
        match &self.url {
            Some(url) => Ok(ImageReference {
                url: url.clone(),
                revised_prompt: None,
            }),
            None => Err(ChatdropError::Provider("image generation unavailable".to_string()).into()),
        }
    }
}

/// Create a temporary directory for testing
///
/// # Returns
///
/// Returns a TempDir that will be cleaned up when dropped
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "test.txt", b"content");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "content");
    }

    #[test]
    #[should_panic(expected = "does not contain")]
    fn test_assert_error_contains_wrong_message() {
        let result: Result<()> = Err(ChatdropError::Config("different error".to_string()).into());
        assert_error_contains(result, "not present");
    }

    #[tokio::test]
    async fn test_scripted_completion_pops_in_order() {
        let provider = ScriptedCompletion::new(&["[1]\na", "[0]"]);
        let messages = [Message::user("hi")];
        assert_eq!(provider.complete(&messages).await.unwrap(), "[1]\na");
        assert_eq!(provider.complete(&messages).await.unwrap(), "[0]");
        assert_error_contains(provider.complete(&messages).await, "script exhausted");
        assert_eq!(provider.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_failing_image_records_prompt() {
        let provider = ScriptedImage::failing();
        assert!(provider.generate("a cat").await.is_err());
        assert_eq!(provider.calls(), vec!["a cat".to_string()]);
    }
}
