//! Conversation log
//!
//! This module keeps the two append-only views of a chat: the model-facing
//! record that is replayed to the completion provider, and the display
//! record rendered on the chat surface.

use crate::providers::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed instruction that opens every model-facing log
pub const SYSTEM_INSTRUCTION: &str = "When responding, if the user wants an image to be drawn, write [0] and nothing else. If they want a text conversation without images, write [1] followed by a newline and then your response.";

/// How a display entry should be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Plain text
    Text,
    /// Image reference (URL or data URI)
    Image,
}

/// One committed turn, before it is split into the two log views
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    /// Author of the turn
    pub role: Role,
    /// Text shown to the user
    pub display_text: String,
    /// Text sent to the model when the turn is made
    pub model_text: String,
    /// Text replayed for this turn in later requests when attachments are one-shot
    pub history_text: String,
    /// Rendering of the display text
    pub response_kind: ContentKind,
    /// Inline image data URIs sent with the model text
    pub images: Vec<String>,
    /// Image data URIs shown on the surface but never sent
    pub previews: Vec<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Turn {
    /// A user turn
    ///
    /// # Examples
    ///
    /// ```
    /// use chatdrop::session::conversation::Turn;
    ///
    /// let turn = Turn::user("hi\n\n📎 a.txt", "hi\n\nAttached file contents:\n[File: a.txt]\nabc");
    /// assert_eq!(turn.history_text, turn.display_text);
    /// ```
    pub fn user(display_text: impl Into<String>, model_text: impl Into<String>) -> Self {
        let display_text = display_text.into();
        Self {
            role: Role::User,
            history_text: display_text.clone(),
            display_text,
            model_text: model_text.into(),
            response_kind: ContentKind::Text,
            images: Vec::new(),
            previews: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// An assistant turn: the raw reply for the model, the routed content for display
    pub fn assistant(
        raw_reply: impl Into<String>,
        display_content: impl Into<String>,
        kind: ContentKind,
    ) -> Self {
        let raw_reply = raw_reply.into();
        Self {
            role: Role::Assistant,
            history_text: raw_reply.clone(),
            model_text: raw_reply,
            display_text: display_content.into(),
            response_kind: kind,
            images: Vec::new(),
            previews: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// Entry of the model-facing log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelEntry {
    /// Author
    pub role: Role,
    /// Full text as first sent
    pub text: String,
    /// Reduced text used when attachments are one-shot
    pub history_text: String,
    /// Inline images sent with `text`
    pub images: Vec<String>,
}

/// Entry of the display log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayEntry {
    /// Author
    pub role: Role,
    /// Rendered content
    pub content: String,
    /// Rendering of `content`
    pub kind: ContentKind,
    /// Images shown alongside the entry
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub previews: Vec<String>,
    /// When the turn was committed
    pub created_at: DateTime<Utc>,
}

/// Append-only pair of model-facing and display logs
///
/// The model-facing log always starts with [`SYSTEM_INSTRUCTION`]; every
/// later model entry has exactly one display entry.
#[derive(Debug, Clone)]
pub struct ConversationLog {
    model: Vec<ModelEntry>,
    display: Vec<DisplayEntry>,
}

impl ConversationLog {
    /// Creates a log holding only the system instruction
    ///
    /// # Examples
    ///
    /// ```
    /// use chatdrop::session::conversation::ConversationLog;
    ///
    /// let log = ConversationLog::new();
    /// assert_eq!(log.len(), 1);
    /// assert_eq!(log.display_len(), 0);
    /// ```
    pub fn new() -> Self {
        Self {
            model: vec![ModelEntry {
                role: Role::System,
                text: SYSTEM_INSTRUCTION.to_string(),
                history_text: SYSTEM_INSTRUCTION.to_string(),
                images: Vec::new(),
            }],
            display: Vec::new(),
        }
    }

    /// Append a committed turn to both logs
    pub fn append(&mut self, turn: Turn) {
        self.display.push(DisplayEntry {
            role: turn.role,
            content: turn.display_text,
            kind: turn.response_kind,
            previews: turn.previews,
            created_at: turn.created_at,
        });
        self.model.push(ModelEntry {
            role: turn.role,
            text: turn.model_text,
            history_text: turn.history_text,
            images: turn.images,
        });
    }

    /// Model-facing entries, system instruction first
    pub fn model_entries(&self) -> &[ModelEntry] {
        &self.model
    }

    /// Display entries in commit order
    pub fn display_entries(&self) -> &[DisplayEntry] {
        &self.display
    }

    /// Number of model-facing entries, including the system instruction
    pub fn len(&self) -> usize {
        self.model.len()
    }

    /// Always false; the system instruction is never removed
    pub fn is_empty(&self) -> bool {
        self.model.is_empty()
    }

    /// Number of display entries
    pub fn display_len(&self) -> usize {
        self.display.len()
    }

    /// Number of committed user turns
    pub fn user_turns(&self) -> usize {
        self.display.iter().filter(|e| e.role == Role::User).count()
    }
}

impl Default for ConversationLog {
    fn default() -> Self {
        Self::new()
    }
}
