//! Response routing on the model's leading marker

/// Reply prefix requesting image generation
pub const IMAGE_MARKER: &str = "[0]";

/// Reply prefix marking a text answer
pub const TEXT_MARKER: &str = "[1]";

/// Where a raw completion goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Generate an image for the user's prompt
    Image,
    /// Show the reply with its marker removed
    Text(String),
    /// No recognized marker; show the reply as received
    Unmarked(String),
}

/// Classify a raw completion by its prefix
///
/// Only an exact prefix counts; leading whitespace before a marker makes the
/// reply unmarked.
///
/// # Examples
///
/// ```
/// use chatdrop::session::router::{classify, Route};
///
/// assert_eq!(classify("[0]"), Route::Image);
/// assert_eq!(classify("[1]\nHello"), Route::Text("Hello".to_string()));
/// assert_eq!(classify("Hello"), Route::Unmarked("Hello".to_string()));
/// ```
pub fn classify(raw: &str) -> Route {
    if raw.starts_with(IMAGE_MARKER) {
        return Route::Image;
    }
    if let Some(rest) = raw.strip_prefix(TEXT_MARKER) {
        return Route::Text(rest.trim_start().to_string());
    }
    tracing::warn!("Completion has no routing marker; displaying it verbatim");
    Route::Unmarked(raw.to_string())
}
