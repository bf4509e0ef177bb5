//! Chat surface
//!
//! Where committed turns are rendered. The terminal implementation prints
//! colored role labels; [`RecordingSurface`] keeps renders in memory.

use crate::providers::Role;
use crate::session::conversation::ContentKind;
use colored::Colorize;

/// Sink for rendered turns
pub trait ChatSurface {
    /// Render one entry of the display log
    fn render(&mut self, role: Role, content: &str, kind: ContentKind);
}

/// Colored stdout surface
#[derive(Debug, Default)]
pub struct TerminalSurface;

impl TerminalSurface {
    /// Create a terminal surface
    pub fn new() -> Self {
        Self
    }
}

impl ChatSurface for TerminalSurface {
    fn render(&mut self, role: Role, content: &str, kind: ContentKind) {
        let label = match role {
            Role::User => "you".cyan().bold(),
            Role::Assistant => "assistant".green().bold(),
            Role::System => "system".dimmed(),
        };
        match kind {
            ContentKind::Text => println!("{}: {}\n", label, content),
            ContentKind::Image => println!(
                "{}: {} {}\n",
                label,
                "[image]".magenta(),
                describe_image(content)
            ),
        }
    }
}

/// Short description of an image reference for text terminals
///
/// Data URIs are summarized by media type and size instead of printed.
///
/// # Examples
///
/// ```
/// use chatdrop::surface::describe_image;
///
/// assert_eq!(describe_image("https://img.example/a.png"), "https://img.example/a.png");
/// assert_eq!(describe_image("data:image/png;base64,AAAA"), "image/png, 3 bytes");
/// ```
pub fn describe_image(reference: &str) -> String {
    let Some(rest) = reference.strip_prefix("data:") else {
        return reference.to_string();
    };
    let (media_type, payload) = rest.split_once(";base64,").unwrap_or((rest, ""));
    let padding = payload.chars().rev().take_while(|c| *c == '=').count();
    let bytes = (payload.len() / 4 * 3).saturating_sub(padding);
    format!("{}, {} bytes", media_type, bytes)
}

/// Surface that records every render
#[derive(Debug, Default)]
pub struct RecordingSurface {
    /// Renders in call order
    pub renders: Vec<(Role, String, ContentKind)>,
}

impl ChatSurface for RecordingSurface {
    fn render(&mut self, role: Role, content: &str, kind: ContentKind) {
        self.renders.push((role, content.to_string(), kind));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_image_padding() {
        assert_eq!(describe_image("data:image/jpeg;base64,AAA="), "image/jpeg, 2 bytes");
        assert_eq!(describe_image("data:image/png;base64,AA=="), "image/png, 1 bytes");
    }

    #[test]
    fn test_recording_surface_keeps_order() {
        let mut surface = RecordingSurface::default();
        surface.render(Role::User, "hi", ContentKind::Text);
        surface.render(Role::Assistant, "https://x/y.png", ContentKind::Image);
        assert_eq!(surface.renders.len(), 2);
        assert_eq!(surface.renders[1].2, ContentKind::Image);
    }
}
