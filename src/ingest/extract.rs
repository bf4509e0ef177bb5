//! Content extraction for uploaded files
//!
//! Turns one accepted upload into an [`Attachment`] whose text can be
//! inlined into a prompt. Every branch reports failure as
//! [`ChatdropError::Extraction`] so one bad file never affects its batch.

use crate::config::ImagePolicy;
use crate::error::ChatdropError;
use crate::ingest::gate::UploadCandidate;
use crate::ingest::kind::FileKind;
use base64::Engine;
use calamine::{Data, Range, Reader};
use chrono::Timelike;
use serde::Serialize;
use std::io::Cursor;

/// Text sent to the model in place of an image
pub const IMAGE_PLACEHOLDER: &str = "An image file was uploaded and processed.";

/// Text sent to the model for a presentation
pub const SLIDE_DECK_PLACEHOLDER: &str =
    "A slide deck file was received. Slide contents are not extracted.";

/// Text-renderable representation of one uploaded file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    /// Display name of the file
    pub name: String,
    /// Extractor branch that produced this attachment
    pub kind: FileKind,
    /// Declared MIME type or extension of the upload
    pub declared_type: String,
    /// Text inlined into the prompt for this file
    pub extracted_text: String,
    /// Original size in bytes
    pub raw_size_bytes: u64,
    /// `data:` URI of an image upload, kept under the inline and display-only policies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_data_uri: Option<String>,
}

impl Attachment {
    /// Whether the image itself should be submitted to the model
    pub fn sends_image(&self) -> bool {
        self.kind == FileKind::Image
            && self.image_data_uri.as_deref() == Some(self.extracted_text.as_str())
    }
}

/// Extract one accepted upload
///
/// # Errors
///
/// Returns `ChatdropError::Extraction` if the file cannot be decoded as its
/// declared kind
pub fn extract(
    candidate: &UploadCandidate,
    image_policy: ImagePolicy,
) -> Result<Attachment, ChatdropError> {
    let kind = FileKind::detect(&candidate.declared_type);
    tracing::debug!(
        "Extracting {} as {} ({} bytes)",
        candidate.name,
        kind,
        candidate.size
    );

    let mut image_data_uri = None;
    let extracted_text = match kind {
        FileKind::Spreadsheet => extract_spreadsheet(&candidate.name, &candidate.data)?,
        FileKind::PlainText => extract_plain_text(&candidate.name, &candidate.data)?,
        FileKind::Pdf => extract_pdf(&candidate.name, &candidate.data)?,
        FileKind::Image => {
            let data_uri = encode_image(&candidate.name, &candidate.data)?;
            match image_policy {
                ImagePolicy::Placeholder => IMAGE_PLACEHOLDER.to_string(),
                ImagePolicy::Inline => {
                    image_data_uri = Some(data_uri.clone());
                    data_uri
                }
                ImagePolicy::DisplayOnly => {
                    image_data_uri = Some(data_uri);
                    IMAGE_PLACEHOLDER.to_string()
                }
            }
        }
        FileKind::SlideDeck => SLIDE_DECK_PLACEHOLDER.to_string(),
        FileKind::Unrecognized => format!("A {} file was uploaded.", candidate.declared_type),
    };

    Ok(Attachment {
        name: candidate.name.clone(),
        kind,
        declared_type: candidate.declared_type.clone(),
        extracted_text,
        raw_size_bytes: candidate.size,
        image_data_uri,
    })
}

fn extraction_error(name: &str, reason: impl std::fmt::Display) -> ChatdropError {
    ChatdropError::Extraction {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

fn extract_plain_text(name: &str, data: &[u8]) -> Result<String, ChatdropError> {
    std::str::from_utf8(data)
        .map(str::to_string)
        .map_err(|e| extraction_error(name, format!("file is not valid UTF-8 text ({})", e)))
}

fn extract_spreadsheet(name: &str, data: &[u8]) -> Result<String, ChatdropError> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(data))
        .map_err(|e| extraction_error(name, format!("malformed workbook: {}", e)))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| extraction_error(name, "workbook has no worksheets"))?
        .map_err(|e| extraction_error(name, format!("unreadable worksheet: {}", e)))?;

    range_to_csv(&range).map_err(|e| extraction_error(name, e))
}

/// Serialize a worksheet range as CSV, one record per row in sheet order
///
/// # Errors
///
/// Returns error if the CSV writer fails
pub fn range_to_csv(range: &Range<Data>) -> Result<String, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    for row in range.rows() {
        writer.write_record(row.iter().map(cell_to_field))?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;

    // Cells were written from `String`s, so the buffer is UTF-8.
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Dates are written as calendar values rather than Excel serial numbers
fn cell_to_field(cell: &Data) -> String {
    match cell {
        Data::DateTime(value) if value.is_datetime() => match value.as_datetime() {
            Some(dt) if dt.num_seconds_from_midnight() == 0 => dt.format("%Y-%m-%d").to_string(),
            Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => cell.to_string(),
        },
        other => other.to_string(),
    }
}

#[cfg(feature = "pdf")]
fn extract_pdf(name: &str, data: &[u8]) -> Result<String, ChatdropError> {
    // pdf-extract panics on some malformed documents.
    let parsed = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(data))
        .map_err(|_| extraction_error(name, "corrupt PDF document"))?;
    let pages =
        parsed.map_err(|e| extraction_error(name, format!("corrupt PDF document: {}", e)))?;
    Ok(pages.join("\n"))
}

#[cfg(not(feature = "pdf"))]
fn extract_pdf(name: &str, _data: &[u8]) -> Result<String, ChatdropError> {
    Ok(format!(
        "The PDF document {} was received; text extraction is not enabled in this build.",
        name
    ))
}

fn encode_image(name: &str, data: &[u8]) -> Result<String, ChatdropError> {
    let format = image::guess_format(data)
        .map_err(|e| extraction_error(name, format!("unrecognized image data: {}", e)))?;
    let mime = match format {
        image::ImageFormat::Png => "image/png",
        image::ImageFormat::Jpeg => "image/jpeg",
        other => {
            return Err(extraction_error(
                name,
                format!("unsupported image format: {:?}", other),
            ))
        }
    };

    image::load_from_memory_with_format(data, format)
        .map_err(|e| extraction_error(name, format!("image decoding failed: {}", e)))?;

    let encoded = base64::engine::general_purpose::STANDARD.encode(data);
    Ok(format!("data:{};base64,{}", mime, encoded))
}
