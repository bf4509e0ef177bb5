#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use chatdrop::config::Config;
use chatdrop::error::{ChatdropError, Result};
use chatdrop::providers::{CompletionProvider, ImageProvider, ImageReference, Message, ProviderPair};
use chatdrop::session::Session;

/// Completion fake replying from a script and recording requests
#[derive(Default)]
pub struct FakeCompletion {
    replies: Mutex<VecDeque<Result<String>>>,
    pub requests: Mutex<Vec<Vec<Message>>>,
}

impl FakeCompletion {
    pub fn replying(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| Ok(r.to_string())).collect()),
            requests: Mutex::default(),
        }
    }

    pub fn push_failure(&self, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(ChatdropError::Provider(message.to_string()).into()));
    }

    pub fn push_reply(&self, reply: &str) {
        self.replies.lock().unwrap().push_back(Ok(reply.to_string()));
    }

    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for FakeCompletion {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ChatdropError::Provider("no scripted reply".into()).into()))
    }
}

/// Image fake returning a fixed URL and recording prompts
#[derive(Default)]
pub struct FakeImage {
    pub prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl ImageProvider for FakeImage {
    async fn generate(&self, prompt: &str) -> Result<ImageReference> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(ImageReference {
            url: "https://images.example/generated.png".to_string(),
            revised_prompt: None,
        })
    }
}

pub fn session_with(
    config: &Config,
    completion: Arc<FakeCompletion>,
    image: Arc<FakeImage>,
) -> Session {
    Session::new(config, ProviderPair { completion, image })
}

pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
