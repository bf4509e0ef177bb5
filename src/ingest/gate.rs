//! Upload gate
//!
//! Enforces the batch count and per-file size ceilings and drops uploads
//! whose `(name, size)` identifier was already accepted.

use crate::config::UploadConfig;
use crate::error::{ChatdropError, Result};
use crate::ingest::kind::guess_mime_type;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

/// One file offered for upload
#[derive(Debug, Clone)]
pub struct UploadCandidate {
    /// Display name, not guaranteed unique
    pub name: String,
    /// Declared MIME type or extension
    pub declared_type: String,
    /// Size in bytes as reported by the source
    pub size: u64,
    /// File contents; empty when the file was too large to read
    pub data: Vec<u8>,
}

impl UploadCandidate {
    /// Build a candidate from in-memory bytes
    ///
    /// # Examples
    ///
    /// ```
    /// use chatdrop::ingest::UploadCandidate;
    ///
    /// let candidate = UploadCandidate::from_bytes("notes.txt", "text/plain", b"abc".to_vec());
    /// assert_eq!(candidate.size, 3);
    /// ```
    pub fn from_bytes(
        name: impl Into<String>,
        declared_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            size: data.len() as u64,
            data,
        }
    }

    /// Read a candidate from disk, guessing its type from the extension
    ///
    /// Files larger than `max_size` are not read; the gate rejects them on size.
    ///
    /// # Errors
    ///
    /// Returns error if the file metadata or contents cannot be read
    pub async fn from_path(path: &Path, max_size: u64) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(ChatdropError::Extraction {
                name,
                reason: "not a regular file".to_string(),
            }
            .into());
        }

        let size = metadata.len();
        let data = if size > max_size {
            Vec::new()
        } else {
            tokio::fs::read(path).await?
        };

        Ok(Self {
            declared_type: guess_mime_type(&name),
            name,
            size,
            data,
        })
    }

    /// Identifier used for deduplication
    pub fn id(&self) -> UploadId {
        UploadId {
            name: self.name.clone(),
            size: self.size,
        }
    }
}

/// Composite dedup key of an upload
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UploadId {
    /// File name
    pub name: String,
    /// File size in bytes
    pub size: u64,
}

/// A file that was not turned into an attachment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    /// Display name of the file
    pub name: String,
    /// Human-readable reason
    pub reason: String,
}

/// Partition produced by the gate
#[derive(Debug, Default)]
pub struct GateOutcome {
    /// Files that passed every check
    pub accepted: Vec<UploadCandidate>,
    /// Files rejected with a reason
    pub rejected: Vec<FileFailure>,
    /// Names of files skipped as already accepted
    pub duplicates: Vec<String>,
}

/// Count, size and dedup checks for upload batches
#[derive(Debug, Clone)]
pub struct UploadGate {
    max_files: usize,
    max_file_size: u64,
    deduplicate: bool,
}

impl UploadGate {
    /// Create a gate from upload configuration
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            max_files: config.max_files_per_batch,
            max_file_size: config.max_file_size_bytes,
            deduplicate: config.deduplicate,
        }
    }

    /// Per-file size ceiling in bytes
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Reject a batch of `count` files if it exceeds the ceiling
    ///
    /// # Errors
    ///
    /// Returns `BatchTooLarge` when `count` exceeds the per-batch limit
    pub fn check_count(&self, count: usize) -> Result<()> {
        if count > self.max_files {
            tracing::warn!(
                "Rejecting upload batch of {} files (limit {})",
                count,
                self.max_files
            );
            return Err(ChatdropError::BatchTooLarge {
                count,
                limit: self.max_files,
            }
            .into());
        }
        Ok(())
    }

    /// Partition a batch into accepted, rejected and duplicate files
    ///
    /// `seen` holds identifiers accepted earlier in the session. Files
    /// repeated inside the batch are deduplicated as well.
    ///
    /// # Errors
    ///
    /// Returns `BatchTooLarge` for oversized batches; nothing is partitioned then
    pub fn admit(
        &self,
        batch: Vec<UploadCandidate>,
        seen: &HashSet<UploadId>,
    ) -> Result<GateOutcome> {
        self.check_count(batch.len())?;

        let mut outcome = GateOutcome::default();
        let mut batch_ids = HashSet::new();

        for candidate in batch {
            if candidate.size > self.max_file_size {
                let error = ChatdropError::FileTooLarge {
                    name: candidate.name.clone(),
                    size: candidate.size,
                    limit: self.max_file_size,
                };
                tracing::warn!("{}", error);
                outcome.rejected.push(FileFailure {
                    name: candidate.name,
                    reason: error.to_string(),
                });
                continue;
            }

            let id = candidate.id();
            if self.deduplicate && (seen.contains(&id) || !batch_ids.insert(id)) {
                tracing::debug!(
                    "Skipping already accepted upload: {} ({} bytes)",
                    candidate.name,
                    candidate.size
                );
                outcome.duplicates.push(candidate.name);
                continue;
            }

            outcome.accepted.push(candidate);
        }

        Ok(outcome)
    }
}
