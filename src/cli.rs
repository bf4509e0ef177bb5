//! Command-line interface definition for Chatdrop
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for chat, one-shot extraction, and authentication.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Chatdrop - chat with an AI model about the files you drop in
#[derive(Parser, Debug, Clone)]
#[command(name = "chatdrop")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (defaults to the platform config directory)
    #[arg(short, long, env = "CHATDROP_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Chat model to use instead of the configured one
    #[arg(short, long)]
    pub model: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Chatdrop
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Files to attach to the first message
        #[arg(short, long = "file")]
        files: Vec<PathBuf>,
    },

    /// Run files through the upload gate and extractor and print the result
    Extract {
        /// Files to extract
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print attachments as JSON
        #[arg(long)]
        json: bool,
    },

    /// Store the OpenAI API key in the system keyring
    Auth {
        /// Key to store; prompts when omitted
        #[arg(long)]
        key: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: None,
            verbose: false,
            model: None,
            command: Commands::Chat { files: Vec::new() },
        }
    }
}
