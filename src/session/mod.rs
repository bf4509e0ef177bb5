//! Chat session
//!
//! A [`Session`] owns everything one user interaction needs: the
//! conversation log, the pending attachment buffer, the dedup set and the
//! providers. Turns either commit completely or leave the session untouched.

pub mod assembler;
pub mod conversation;
pub mod router;

pub use assembler::{assemble, build_messages, AssembledTurn, ATTACHMENT_SUBSTITUTE_QUESTION};
pub use conversation::{ContentKind, ConversationLog, DisplayEntry, Turn, SYSTEM_INSTRUCTION};
pub use router::{classify, Route, IMAGE_MARKER, TEXT_MARKER};

use crate::config::{ChatConfig, Config};
use crate::error::Result;
use crate::ingest::{ingest_batch, Attachment, UploadCandidate, UploadGate, UploadId, UploadReport};
use crate::providers::{CompletionProvider, ImageProvider, ProviderPair};
use crate::surface::ChatSurface;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Where the current turn is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    /// Waiting for the next submission
    AwaitingInput,
    /// Merging pending attachments and text
    AssemblingPrompt,
    /// Completion request in flight
    AwaitingCompletion,
    /// Image generation request in flight
    RoutingImage,
    /// Stripping the text marker
    RoutingText,
    /// Turn finished, committed or abandoned
    Idle,
}

/// Result of a committed turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Rendering of the assistant content
    pub kind: ContentKind,
    /// Assistant content as displayed
    pub content: String,
    /// Completion text as received, marker included
    pub raw_reply: String,
}

/// Counts reported when a session ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Session identifier
    pub id: Uuid,
    /// Committed user turns
    pub user_turns: usize,
    /// Display log entries
    pub display_entries: usize,
    /// Attachments that were never submitted
    pub discarded_attachments: usize,
    /// Session length in seconds
    pub duration_seconds: i64,
}

/// One chat session
pub struct Session {
    id: Uuid,
    started_at: DateTime<Utc>,
    chat: ChatConfig,
    gate: UploadGate,
    completion: Arc<dyn CompletionProvider>,
    image: Arc<dyn ImageProvider>,
    log: ConversationLog,
    pending: Vec<Attachment>,
    seen: HashSet<UploadId>,
    phase: TurnPhase,
}

impl Session {
    /// Create a session with an empty log
    pub fn new(config: &Config, providers: ProviderPair) -> Self {
        let id = Uuid::new_v4();
        tracing::info!("Starting session {}", id);
        Self {
            id,
            started_at: Utc::now(),
            chat: config.chat.clone(),
            gate: UploadGate::new(&config.upload),
            completion: providers.completion,
            image: providers.image,
            log: ConversationLog::new(),
            pending: Vec::new(),
            seen: HashSet::new(),
            phase: TurnPhase::AwaitingInput,
        }
    }

    /// Session identifier
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Upload gate used by this session
    pub fn gate(&self) -> &UploadGate {
        &self.gate
    }

    /// Conversation log
    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    /// Attachments waiting for the next submission
    pub fn pending(&self) -> &[Attachment] {
        &self.pending
    }

    /// Current turn phase
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Model used for completions, when known
    pub fn model_name(&self) -> Option<String> {
        self.completion.model_name()
    }

    /// Process an upload batch into the pending buffer
    ///
    /// Accepted attachments are appended to whatever is already pending.
    ///
    /// # Errors
    ///
    /// Returns `BatchTooLarge` if the batch exceeds the count ceiling
    pub fn upload(&mut self, batch: Vec<UploadCandidate>) -> Result<UploadReport> {
        let (attachments, report) =
            ingest_batch(&self.gate, batch, self.chat.image_policy, &mut self.seen)?;
        self.pending.extend(attachments);
        Ok(report)
    }

    /// Discard pending attachments, returning how many were dropped
    ///
    /// Dropped files stay marked as seen.
    pub fn clear_pending(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    /// Submit one user turn
    ///
    /// On success both turns are appended to the log, the pending buffer is
    /// emptied and the new display entries are rendered on `surface`. On any
    /// error the log and pending buffer are unchanged.
    ///
    /// # Errors
    ///
    /// Returns `EmptySubmission` for blank input with nothing pending, or the
    /// provider's error if a completion or image request fails
    pub async fn submit(
        &mut self,
        text: &str,
        surface: &mut dyn ChatSurface,
    ) -> Result<TurnOutcome> {
        let result = self.run_turn(text, surface).await;
        if let Err(e) = &result {
            tracing::warn!("Turn abandoned in phase {:?}: {}", self.phase, e);
        }
        self.set_phase(TurnPhase::Idle);
        result
    }

    async fn run_turn(&mut self, text: &str, surface: &mut dyn ChatSurface) -> Result<TurnOutcome> {
        self.set_phase(TurnPhase::AssemblingPrompt);
        let assembled = assemble(text, &self.pending, &self.chat)?;
        let messages = build_messages(&self.log, &assembled.turn, &self.chat);

        self.set_phase(TurnPhase::AwaitingCompletion);
        let raw_reply = self.completion.complete(&messages).await?;

        let (content, kind) = match classify(&raw_reply) {
            Route::Image => {
                self.set_phase(TurnPhase::RoutingImage);
                let reference = self.image.generate(&assembled.prompt).await?;
                if let Some(revised) = &reference.revised_prompt {
                    tracing::debug!("Image prompt revised to: {}", revised);
                }
                (reference.url, ContentKind::Image)
            }
            Route::Text(body) => {
                self.set_phase(TurnPhase::RoutingText);
                (body, ContentKind::Text)
            }
            Route::Unmarked(body) => {
                self.set_phase(TurnPhase::RoutingText);
                (body, ContentKind::Text)
            }
        };

        let first_new = self.log.display_len();
        self.log.append(assembled.turn);
        self.log
            .append(Turn::assistant(raw_reply.clone(), content.clone(), kind));
        let consumed = self.clear_pending();
        tracing::info!(
            "Turn committed ({:?} reply, {} attachments consumed)",
            kind,
            consumed
        );

        for entry in &self.log.display_entries()[first_new..] {
            surface.render(entry.role, &entry.content, entry.kind);
            for preview in &entry.previews {
                surface.render(entry.role, preview, ContentKind::Image);
            }
        }

        Ok(TurnOutcome {
            kind,
            content,
            raw_reply,
        })
    }

    fn set_phase(&mut self, phase: TurnPhase) {
        tracing::trace!("Session {} phase {:?} -> {:?}", self.id, self.phase, phase);
        self.phase = phase;
    }

    /// End the session and release its state
    pub fn end(self) -> SessionSummary {
        let summary = SessionSummary {
            id: self.id,
            user_turns: self.log.user_turns(),
            display_entries: self.log.display_len(),
            discarded_attachments: self.pending.len(),
            duration_seconds: (Utc::now() - self.started_at).num_seconds(),
        };
        tracing::info!(
            "Session {} ended after {} turns",
            summary.id,
            summary.user_turns
        );
        summary
    }
}
