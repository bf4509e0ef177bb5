//! File kind detection
//!
//! Maps the declared type of an upload (a MIME type or a bare extension) to
//! the extractor branch that handles it.

use serde::{Deserialize, Serialize};

/// Extractor branch for an upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// `xlsx` / `xls` workbook
    Spreadsheet,
    /// `png` / `jpg` / `jpeg` image
    Image,
    /// UTF-8 text
    PlainText,
    /// PDF document
    Pdf,
    /// `pptx` / `ppt` presentation
    SlideDeck,
    /// Anything else
    Unrecognized,
}

impl FileKind {
    /// Detect the kind from a declared MIME type or extension
    ///
    /// # Examples
    ///
    /// ```
    /// use chatdrop::ingest::FileKind;
    ///
    /// assert_eq!(FileKind::detect("application/pdf"), FileKind::Pdf);
    /// assert_eq!(FileKind::detect(".XLSX"), FileKind::Spreadsheet);
    /// assert_eq!(FileKind::detect("video/mp4"), FileKind::Unrecognized);
    /// ```
    pub fn detect(declared_type: &str) -> Self {
        let normalized = declared_type.trim().to_lowercase();
        match normalized.trim_start_matches('.') {
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            | "application/vnd.ms-excel"
            | "xlsx"
            | "xls" => Self::Spreadsheet,
            "image/png" | "image/jpeg" | "image/jpg" | "png" | "jpg" | "jpeg" => Self::Image,
            "text/plain" | "txt" => Self::PlainText,
            "application/pdf" | "pdf" => Self::Pdf,
            "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            | "application/vnd.ms-powerpoint"
            | "pptx"
            | "ppt" => Self::SlideDeck,
            _ => Self::Unrecognized,
        }
    }

    /// Short label used in listings
    pub fn label(&self) -> &'static str {
        match self {
            Self::Spreadsheet => "spreadsheet",
            Self::Image => "image",
            Self::PlainText => "text",
            Self::Pdf => "pdf",
            Self::SlideDeck => "slide deck",
            Self::Unrecognized => "other",
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Guess MIME type from filename extension
pub fn guess_mime_type(filename: &str) -> String {
    let ext = match filename.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    };
    match ext.as_str() {
        "txt" => "text/plain",
        "pdf" => "application/pdf",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "xls" => "application/vnd.ms-excel",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "ppt" => "application/vnd.ms-powerpoint",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "md" | "markdown" => "text/markdown",
        "csv" => "text/csv",
        "json" => "application/json",
        "html" | "htm" => "text/html",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
    .to_string()
}
