//! Prompt assembly
//!
//! Merges the pending attachments and the literal text of a submission into
//! a [`Turn`], and builds the outgoing message list from the log.

use crate::config::{AttachmentRetention, ChatConfig, HistoryMode};
use crate::error::ChatdropError;
use crate::ingest::Attachment;
use crate::providers::{Message, Role};
use crate::session::conversation::{ConversationLog, ModelEntry, Turn};

/// Question used when files are submitted without text
pub const ATTACHMENT_SUBSTITUTE_QUESTION: &str = "Please analyze the attached file(s).";

/// A user turn ready to be sent, plus the prompt used for image generation
#[derive(Debug, Clone)]
pub struct AssembledTurn {
    /// The user turn
    pub turn: Turn,
    /// Literal text of the submission, or the substitute question
    pub prompt: String,
}

/// Assemble a user turn from literal text and pending attachments
///
/// # Errors
///
/// Returns `ChatdropError::EmptySubmission` if the text is blank and there is
/// nothing pending, or empty submissions are disabled
///
/// # Examples
///
/// ```
/// use chatdrop::config::ChatConfig;
/// use chatdrop::session::assembler::assemble;
///
/// let assembled = assemble("hello", &[], &ChatConfig::default()).unwrap();
/// assert_eq!(assembled.turn.display_text, "hello");
/// assert_eq!(assembled.turn.model_text, "hello");
/// ```
pub fn assemble(
    literal: &str,
    pending: &[Attachment],
    config: &ChatConfig,
) -> Result<AssembledTurn, ChatdropError> {
    let blank = literal.trim().is_empty();
    if blank && (pending.is_empty() || !config.allow_empty_submission) {
        return Err(ChatdropError::EmptySubmission);
    }

    if pending.is_empty() {
        return Ok(AssembledTurn {
            turn: Turn::user(literal, literal),
            prompt: literal.to_string(),
        });
    }

    let manifest = pending
        .iter()
        .map(|a| format!("📎 {}", a.name))
        .collect::<Vec<_>>()
        .join("\n");
    let display_text = if blank {
        manifest
    } else {
        format!("{}\n\n{}", literal, manifest)
    };

    let question = if blank {
        ATTACHMENT_SUBSTITUTE_QUESTION
    } else {
        literal
    };

    let blocks = pending
        .iter()
        .filter(|a| !a.sends_image())
        .map(|a| format!("[File: {}]\n{}", a.name, a.extracted_text))
        .collect::<Vec<_>>();
    let model_text = if blocks.is_empty() {
        question.to_string()
    } else {
        format!("{}\n\nAttached file contents:\n{}", question, blocks.join("\n\n"))
    };

    let mut turn = Turn::user(display_text, model_text);
    for attachment in pending {
        let Some(uri) = &attachment.image_data_uri else {
            continue;
        };
        if attachment.sends_image() {
            turn.images.push(uri.clone());
        } else {
            turn.previews.push(uri.clone());
        }
    }

    tracing::debug!(
        "Assembled turn with {} attachments ({} inline images)",
        pending.len(),
        turn.images.len()
    );

    Ok(AssembledTurn {
        turn,
        prompt: question.to_string(),
    })
}

/// Build the outgoing message list for `turn` on top of `log`
pub fn build_messages(log: &ConversationLog, turn: &Turn, config: &ChatConfig) -> Vec<Message> {
    match config.history_mode {
        HistoryMode::Structured => structured(log, turn, config.attachment_retention),
        HistoryMode::Flattened => flattened(log, turn, config.attachment_retention),
    }
}

fn replayed_text(entry: &ModelEntry, retention: AttachmentRetention) -> &str {
    match (entry.role, retention) {
        (Role::User, AttachmentRetention::OneShot) => &entry.history_text,
        _ => &entry.text,
    }
}

fn structured(log: &ConversationLog, turn: &Turn, retention: AttachmentRetention) -> Vec<Message> {
    let mut messages: Vec<Message> = log
        .model_entries()
        .iter()
        .map(|entry| match entry.role {
            Role::System => Message::system(entry.text.clone()),
            Role::Assistant => Message::assistant(entry.text.clone()),
            Role::User => match retention {
                AttachmentRetention::OneShot => Message::user(entry.history_text.clone()),
                AttachmentRetention::Persistent => {
                    Message::user_with_images(entry.text.clone(), entry.images.clone())
                }
            },
        })
        .collect();

    messages.push(Message::user_with_images(
        turn.model_text.clone(),
        turn.images.clone(),
    ));
    messages
}

fn flattened(log: &ConversationLog, turn: &Turn, retention: AttachmentRetention) -> Vec<Message> {
    let entries = log.model_entries();
    let system = entries
        .first()
        .map(|e| e.text.clone())
        .unwrap_or_default();

    let prior: Vec<String> = entries
        .iter()
        .filter(|e| e.role != Role::System)
        .map(|e| format!("{}: {}", e.role, replayed_text(e, retention)))
        .collect();

    let content = if prior.is_empty() {
        turn.model_text.clone()
    } else {
        format!(
            "Previous conversation:\n{}\n\nCurrent message:\n{}",
            prior.join("\n"),
            turn.model_text
        )
    };

    vec![
        Message::system(system),
        Message::user_with_images(content, turn.images.clone()),
    ]
}
