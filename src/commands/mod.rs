/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes three top-level command modules:

- `chat`    - Interactive chat session with file attachments
- `extract` - Run files through the upload gate and extractor and print them
- `auth`    - Store the API key in the system keyring
*/

use crate::config::Config;
use crate::error::Result;
use crate::ingest::{FileFailure, UploadCandidate, UploadGate, UploadReport};
use colored::Colorize;
use std::path::PathBuf;

// Special commands parser for the chat loop
pub mod special_commands;

/// Read files from disk as one upload batch
///
/// The batch ceiling is checked before any file is read. Files that cannot
/// be read are returned as failures rather than aborting the batch.
///
/// # Errors
///
/// Returns `BatchTooLarge` if there are more paths than the gate allows
pub async fn load_candidates(
    paths: &[PathBuf],
    gate: &UploadGate,
) -> Result<(Vec<UploadCandidate>, Vec<FileFailure>)> {
    gate.check_count(paths.len())?;

    let mut candidates = Vec::with_capacity(paths.len());
    let mut failures = Vec::new();
    for path in paths {
        match UploadCandidate::from_path(path, gate.max_file_size()).await {
            Ok(candidate) => candidates.push(candidate),
            Err(e) => {
                tracing::warn!("Could not read {}: {}", path.display(), e);
                failures.push(FileFailure {
                    name: path.display().to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }
    Ok((candidates, failures))
}

fn print_upload_report(report: &UploadReport) {
    for name in &report.duplicates {
        println!("{}", format!("Skipped {} (already attached)", name).yellow());
    }
    if let Some(message) = report.aggregated_error() {
        eprintln!("{}", message.red());
        for failure in &report.failures {
            tracing::debug!("{}: {}", failure.name, failure.reason);
        }
    }
    if !report.accepted.is_empty() {
        println!(
            "{}",
            format!(
                "Attached {} file(s): {}",
                report.accepted.len(),
                report.accepted.join(", ")
            )
            .green()
        );
    }
}

// Chat command handler
pub mod chat {
    //! Interactive chat session handler.
    //!
    //! Resolves the API key, creates the providers and a `Session`, and runs
    //! a readline loop. Each line is either a special command or a message.

    use super::*;
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use crate::credentials::{self, ApiKey, CredentialSource};
    use crate::error::ChatdropError;
    use crate::providers::{create_providers, Role};
    use crate::session::{ContentKind, Session};
    use crate::surface::{describe_image, TerminalSurface};
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start an interactive chat session
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `files` - Files attached before the first message
    pub async fn run_chat(config: Config, files: Vec<PathBuf>) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let mut rl = DefaultEditor::new()?;

        let api_key = match credentials::resolve(&config.provider.openai) {
            Some(key) => key,
            None => prompt_for_key(&mut rl)?,
        };
        tracing::debug!("Using API key from {}", api_key.source);

        let providers = create_providers(&config.provider, api_key.value)?;
        let mut session = Session::new(&config, providers);
        let mut surface = TerminalSurface::new();

        print_welcome_banner(&session);

        if !files.is_empty() {
            attach(&mut session, &files).await;
        }

        loop {
            let prompt = format!("{} ", "chatdrop>".cyan().bold());
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        if session.pending().is_empty() {
                            continue;
                        }
                        submit(&mut session, "", &mut surface).await;
                        continue;
                    }

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}\n", e.to_string().red());
                            continue;
                        }
                    };

                    match command {
                        SpecialCommand::Attach(paths) => {
                            let paths: Vec<PathBuf> =
                                paths.into_iter().map(PathBuf::from).collect();
                            attach(&mut session, &paths).await;
                        }
                        SpecialCommand::ShowPending => print_pending(&session),
                        SpecialCommand::DropPending => {
                            let dropped = session.clear_pending();
                            println!("Dropped {} pending file(s)\n", dropped);
                        }
                        SpecialCommand::History => print_history(&session),
                        SpecialCommand::Status => print_status(&session),
                        SpecialCommand::Help => print_help(),
                        SpecialCommand::Exit => break,
                        SpecialCommand::None => {
                            rl.add_history_entry(trimmed)?;
                            submit(&mut session, trimmed, &mut surface).await;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        let summary = session.end();
        println!(
            "Goodbye! {} turn(s) in {}s",
            summary.user_turns, summary.duration_seconds
        );
        if summary.discarded_attachments > 0 {
            println!(
                "{} pending file(s) were not sent",
                summary.discarded_attachments
            );
        }
        Ok(())
    }

    /// Ask for an API key until a non-blank one is entered
    fn prompt_for_key(rl: &mut DefaultEditor) -> Result<ApiKey> {
        println!(
            "{}",
            "No OpenAI API key found in config, OPENAI_API_KEY or the keyring.".yellow()
        );
        loop {
            match rl.readline("OpenAI API key: ") {
                Ok(line) if !line.trim().is_empty() => {
                    return Ok(ApiKey {
                        value: line.trim().to_string(),
                        source: CredentialSource::Prompt,
                    })
                }
                Ok(_) => println!("{}", "Please enter a key to continue.".yellow()),
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    return Err(ChatdropError::MissingCredentials("openai".to_string()).into())
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    async fn attach(session: &mut Session, paths: &[PathBuf]) {
        let (candidates, read_failures) = match load_candidates(paths, session.gate()).await {
            Ok(loaded) => loaded,
            Err(e) => {
                eprintln!("{}\n", e.to_string().red());
                return;
            }
        };

        match session.upload(candidates) {
            Ok(mut report) => {
                report.failures.extend(read_failures);
                print_upload_report(&report);
                println!();
            }
            Err(e) => eprintln!("{}\n", e.to_string().red()),
        }
    }

    async fn submit(session: &mut Session, text: &str, surface: &mut TerminalSurface) {
        if let Err(e) = session.submit(text, surface).await {
            eprintln!("{}\n", format!("Error: {}", e).red());
        }
    }

    fn print_welcome_banner(session: &Session) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║              Chatdrop Interactive Chat - Welcome!            ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        if let Some(model) = session.model_name() {
            println!("Model: {}", model.cyan());
        }
        println!("Type '/attach <path>' to add files, '/help' for commands, 'exit' to quit\n");
    }

    fn print_pending(session: &Session) {
        if session.pending().is_empty() {
            println!("No pending files\n");
            return;
        }
        for attachment in session.pending() {
            println!(
                "📎 {} ({}, {} bytes)",
                attachment.name, attachment.kind, attachment.raw_size_bytes
            );
        }
        println!();
    }

    fn print_history(session: &Session) {
        let entries = session.log().display_entries();
        if entries.is_empty() {
            println!("No messages yet\n");
            return;
        }
        for entry in entries {
            let label = match entry.role {
                Role::User => "you".cyan(),
                Role::Assistant => "assistant".green(),
                Role::System => "system".dimmed(),
            };
            let content = match entry.kind {
                ContentKind::Text => entry.content.clone(),
                ContentKind::Image => format!("[image] {}", describe_image(&entry.content)),
            };
            println!(
                "{} {}: {}",
                entry.created_at.format("%H:%M:%S").to_string().dimmed(),
                label,
                content
            );
        }
        println!();
    }

    fn print_status(session: &Session) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                     Chatdrop Session Status                  ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Session:           {}", session.id());
        println!(
            "Model:             {}",
            session.model_name().unwrap_or_else(|| "unknown".to_string())
        );
        println!("Conversation Size: {} messages", session.log().len());
        println!("Turns:             {}", session.log().user_turns());
        println!("Pending Files:     {}", session.pending().len());
        println!();
    }
}

// One-shot extraction handler
pub mod extract {
    use super::*;
    use crate::ingest::{ingest_batch, Attachment, FileKind};
    use crate::surface::describe_image;
    use serde::Serialize;
    use std::collections::HashSet;

    #[derive(Serialize)]
    struct ExtractOutput<'a> {
        attachments: &'a [Attachment],
        failures: &'a [FileFailure],
        duplicates: &'a [String],
    }

    /// Extract files and print their attachment text
    ///
    /// # Errors
    ///
    /// Returns error if the batch is too large or any file failed
    pub async fn run_extract(config: Config, files: Vec<PathBuf>, json: bool) -> Result<()> {
        tracing::info!("Extracting {} file(s)", files.len());

        let gate = UploadGate::new(&config.upload);
        let (candidates, read_failures) = load_candidates(&files, &gate).await?;

        let mut seen = HashSet::new();
        let (attachments, mut report) =
            ingest_batch(&gate, candidates, config.chat.image_policy, &mut seen)?;
        report.failures.extend(read_failures);

        if json {
            let output = ExtractOutput {
                attachments: &attachments,
                failures: &report.failures,
                duplicates: &report.duplicates,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            for attachment in &attachments {
                println!(
                    "{}",
                    format!(
                        "[File: {}] ({}, {} bytes)",
                        attachment.name, attachment.kind, attachment.raw_size_bytes
                    )
                    .bold()
                );
                if attachment.kind == FileKind::Image && attachment.sends_image() {
                    println!("{}\n", describe_image(&attachment.extracted_text));
                } else {
                    println!("{}\n", attachment.extracted_text);
                }
            }
            for name in &report.duplicates {
                eprintln!("{}", format!("Skipped duplicate {}", name).yellow());
            }
        }

        match report.aggregated_error() {
            Some(message) => Err(anyhow::anyhow!(message)),
            None => Ok(()),
        }
    }
}

// API key storage handler
pub mod auth {
    use super::*;
    use crate::credentials::{self, KEYRING_SERVICE};
    use crate::error::ChatdropError;
    use rustyline::DefaultEditor;

    /// Store an API key in the system keyring, prompting when not given
    ///
    /// # Errors
    ///
    /// Returns error if no key is entered or the keyring write fails
    pub async fn run_auth(key: Option<String>) -> Result<()> {
        let key = match key {
            Some(key) => key,
            None => {
                let mut rl = DefaultEditor::new()?;
                rl.readline("OpenAI API key: ")?
            }
        };

        if key.trim().is_empty() {
            return Err(ChatdropError::MissingCredentials("openai".to_string()).into());
        }

        credentials::store_in_keyring(&key)?;
        println!(
            "{}",
            format!("API key stored in the system keyring ({})", KEYRING_SERVICE).green()
        );
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_auth_blank_key_fails() {
            let res = run_auth(Some("   ".to_string())).await;
            assert!(res.is_err());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UploadConfig;
    use crate::error::ChatdropError;
    use crate::test_utils::{create_test_file, temp_dir};

    #[tokio::test]
    async fn test_load_candidates_checks_count_first() {
        let gate = UploadGate::new(&UploadConfig {
            max_files_per_batch: 1,
            ..UploadConfig::default()
        });
        let paths = vec![PathBuf::from("missing-a.txt"), PathBuf::from("missing-b.txt")];
        let err = load_candidates(&paths, &gate).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ChatdropError>(),
            Some(ChatdropError::BatchTooLarge { count: 2, limit: 1 })
        ));
    }

    #[tokio::test]
    async fn test_load_candidates_reports_unreadable_files() {
        let dir = temp_dir();
        let good = create_test_file(&dir, "good.txt", b"hello");
        let gate = UploadGate::new(&UploadConfig::default());

        let (candidates, failures) =
            load_candidates(&[good, dir.path().join("gone.txt")], &gate)
                .await
                .unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name, "good.txt");
        assert_eq!(failures.len(), 1);
        assert!(failures[0].name.ends_with("gone.txt"));
    }
}
