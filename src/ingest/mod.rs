//! File ingestion: upload gate and content extraction
//!
//! [`ingest_batch`] runs a batch through the [`UploadGate`] and then
//! [`extract`]s every accepted file, isolating failures per file.

pub mod extract;
pub mod gate;
pub mod kind;

pub use extract::{extract, range_to_csv, Attachment, IMAGE_PLACEHOLDER, SLIDE_DECK_PLACEHOLDER};
pub use gate::{FileFailure, GateOutcome, UploadCandidate, UploadGate, UploadId};
pub use kind::{guess_mime_type, FileKind};

use crate::config::ImagePolicy;
use crate::error::Result;
use serde::Serialize;
use std::collections::HashSet;

/// Result of one upload batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadReport {
    /// Names of files that produced an attachment
    pub accepted: Vec<String>,
    /// Files rejected by the gate or the extractor
    pub failures: Vec<FileFailure>,
    /// Names of files skipped as already accepted
    pub duplicates: Vec<String>,
}

impl UploadReport {
    /// One message naming every failed file, if any failed
    ///
    /// # Examples
    ///
    /// ```
    /// use chatdrop::ingest::{FileFailure, UploadReport};
    ///
    /// let report = UploadReport {
    ///     failures: vec![FileFailure { name: "a.xlsx".into(), reason: "malformed".into() }],
    ///     ..Default::default()
    /// };
    /// assert_eq!(
    ///     report.aggregated_error().unwrap(),
    ///     "Failed to process the following files: a.xlsx"
    /// );
    /// ```
    pub fn aggregated_error(&self) -> Option<String> {
        if self.failures.is_empty() {
            return None;
        }
        let names: Vec<&str> = self.failures.iter().map(|f| f.name.as_str()).collect();
        Some(format!(
            "Failed to process the following files: {}",
            names.join(", ")
        ))
    }
}

/// Gate and extract a batch
///
/// Identifiers of successfully extracted files are added to `seen`, so a
/// file that failed extraction can be offered again.
///
/// # Errors
///
/// Returns `BatchTooLarge` if the batch exceeds the gate's count ceiling;
/// per-file problems are reported in the returned [`UploadReport`]
pub fn ingest_batch(
    gate: &UploadGate,
    batch: Vec<UploadCandidate>,
    image_policy: ImagePolicy,
    seen: &mut HashSet<UploadId>,
) -> Result<(Vec<Attachment>, UploadReport)> {
    let outcome = gate.admit(batch, seen)?;

    let mut report = UploadReport {
        accepted: Vec::new(),
        failures: outcome.rejected,
        duplicates: outcome.duplicates,
    };
    let mut attachments = Vec::with_capacity(outcome.accepted.len());

    for candidate in outcome.accepted {
        match extract(&candidate, image_policy) {
            Ok(attachment) => {
                seen.insert(candidate.id());
                report.accepted.push(attachment.name.clone());
                attachments.push(attachment);
            }
            Err(e) => {
                tracing::warn!("{}", e);
                report.failures.push(FileFailure {
                    name: candidate.name,
                    reason: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        "Upload batch processed: {} accepted, {} failed, {} duplicates",
        report.accepted.len(),
        report.failures.len(),
        report.duplicates.len()
    );

    Ok((attachments, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UploadConfig;
    use crate::error::ChatdropError;

    fn text(name: &str, body: &[u8]) -> UploadCandidate {
        UploadCandidate::from_bytes(name, "text/plain", body.to_vec())
    }

    #[test]
    fn test_failures_are_isolated_per_file() {
        let gate = UploadGate::new(&UploadConfig::default());
        let mut seen = HashSet::new();
        let batch = vec![
            text("good.txt", b"hello"),
            text("bad.txt", &[0xc3, 0x28]),
            UploadCandidate::from_bytes("broken.xlsx", "xlsx", b"nope".to_vec()),
            text("also-good.txt", b"world"),
        ];

        let (attachments, report) =
            ingest_batch(&gate, batch, ImagePolicy::Placeholder, &mut seen).unwrap();

        assert_eq!(attachments.len(), 2);
        assert_eq!(report.accepted, vec!["good.txt", "also-good.txt"]);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(
            report.aggregated_error().unwrap(),
            "Failed to process the following files: bad.txt, broken.xlsx"
        );
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_failed_extraction_is_not_marked_seen() {
        let gate = UploadGate::new(&UploadConfig::default());
        let mut seen = HashSet::new();
        ingest_batch(
            &gate,
            vec![text("bad.txt", &[0xff])],
            ImagePolicy::Placeholder,
            &mut seen,
        )
        .unwrap();
        assert!(seen.is_empty());
    }

    #[test]
    fn test_oversized_batch_produces_nothing() {
        let gate = UploadGate::new(&UploadConfig::default());
        let mut seen = HashSet::new();
        let batch: Vec<_> = (0..11).map(|i| text(&format!("{}.txt", i), b"x")).collect();

        let err = ingest_batch(&gate, batch, ImagePolicy::Placeholder, &mut seen).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ChatdropError>(),
            Some(ChatdropError::BatchTooLarge { .. })
        ));
        assert!(seen.is_empty());
    }

    #[test]
    fn test_resubmission_is_idempotent() {
        let gate = UploadGate::new(&UploadConfig::default());
        let mut seen = HashSet::new();

        let (first, _) = ingest_batch(
            &gate,
            vec![text("notes.txt", b"abc")],
            ImagePolicy::Placeholder,
            &mut seen,
        )
        .unwrap();
        let (second, report) = ingest_batch(
            &gate,
            vec![text("notes.txt", b"abc")],
            ImagePolicy::Placeholder,
            &mut seen,
        )
        .unwrap();

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert_eq!(report.duplicates, vec!["notes.txt"]);
        assert!(report.aggregated_error().is_none());
    }
}
