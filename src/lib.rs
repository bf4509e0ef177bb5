//! Chatdrop - file-aware chat library
//!
//! This library provides the core functionality of Chatdrop: an upload
//! pipeline that turns dropped files into prompt text, a chat session that
//! assembles prompts and routes marked replies, and the provider
//! abstractions behind it.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `ingest`: Upload gate, file kind detection, and content extraction
//! - `session`: Conversation log, prompt assembly, response routing, and the session context
//! - `providers`: Completion and image provider traits and the OpenAI implementation
//! - `surface`: Where committed turns are rendered
//! - `credentials`: API key resolution and keyring storage
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use chatdrop::providers::create_providers;
//! use chatdrop::session::Session;
//! use chatdrop::surface::TerminalSurface;
//! use chatdrop::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let providers = create_providers(&config.provider, "sk-...".to_string())?;
//!     let mut session = Session::new(&config, providers);
//!     session.submit("Hello!", &mut TerminalSurface::new()).await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod error;
pub mod ingest;
pub mod providers;
pub mod session;
pub mod surface;

// Re-export commonly used types
pub use config::Config;
pub use error::{ChatdropError, Result};
pub use ingest::{Attachment, UploadCandidate};
pub use session::Session;

#[cfg(test)]
pub mod test_utils;
