//! Diagram collaborators.
//!
//! TikZ code blocks are turned into images by a [`DiagramRenderer`], and the
//! figure caption is turned into inline content by a [`CaptionFormatter`].
//! Both do blocking external work; the walker treats them as plain
//! synchronous calls and downgrades their failures to warnings.

use std::io;
use std::path::PathBuf;

use marginalia_ast::{Attr, Inline};

/// Code block class marking a TikZ diagram.
pub const TIKZ_CLASS: &str = "tikz";

/// Attribute naming a TikZ library to load.
pub const LIBRARY_ATTR: &str = "tikzlibrary";

/// Attribute holding the figure caption.
pub const CAPTION_ATTR: &str = "caption";

/// A TikZ picture to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramRequest {
    /// Picture source, usually a `tikzpicture` environment.
    pub code: String,
    /// Font package loaded in the standalone wrapper.
    pub font: String,
    /// Value passed to `\usetikzlibrary`, if any.
    pub library: Option<String>,
    /// Produce a PDF (`true`) or a PNG (`false`).
    pub vector: bool,
}

impl DiagramRequest {
    /// File extension of the produced image.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        if self.vector { "pdf" } else { "png" }
    }
}

/// Renders TikZ pictures to image files.
///
/// Implementations may cache: the same request is expected to yield the
/// same path without re-rendering.
///
/// # Example
///
/// ```
/// use std::io;
/// use std::path::PathBuf;
///
/// use marginalia_filter::{DiagramRenderer, DiagramRequest};
///
/// struct Prerendered;
///
/// impl DiagramRenderer for Prerendered {
///     fn render(&self, request: &DiagramRequest) -> io::Result<PathBuf> {
///         Ok(PathBuf::from(format!("figure.{}", request.extension())))
///     }
/// }
///
/// let request = DiagramRequest {
///     code: "\\begin{tikzpicture}\\end{tikzpicture}".to_owned(),
///     font: "fbb".to_owned(),
///     library: None,
///     vector: true,
/// };
/// assert_eq!(Prerendered.render(&request).unwrap(), PathBuf::from("figure.pdf"));
/// ```
pub trait DiagramRenderer: Send {
    /// Render the picture and return the path of the image file.
    ///
    /// # Errors
    ///
    /// Returns an error when the image cannot be produced.
    fn render(&self, request: &DiagramRequest) -> io::Result<PathBuf>;
}

/// Converts caption markup into inline content.
pub trait CaptionFormatter: Send {
    /// Format a non-empty caption.
    ///
    /// # Errors
    ///
    /// Returns an error when the caption cannot be converted.
    fn format(&self, caption: &str) -> io::Result<Vec<Inline>>;
}

/// Caption formatter that keeps the text as plain words.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainCaptionFormatter;

impl CaptionFormatter for PlainCaptionFormatter {
    fn format(&self, caption: &str) -> io::Result<Vec<Inline>> {
        let mut inlines = Vec::new();
        for word in caption.split_whitespace() {
            if !inlines.is_empty() {
                inlines.push(Inline::Space);
            }
            inlines.push(Inline::Str(word.to_owned()));
        }
        Ok(inlines)
    }
}

/// Whether a code block holds a TikZ picture.
#[must_use]
pub fn is_tikz(attr: &Attr, code: &str) -> bool {
    attr.has_class(TIKZ_CLASS) || code.contains("\\begin{tikzpicture}")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_is_tikz() {
        assert!(is_tikz(&Attr::with_class("tikz"), "\\draw (0,0) -- (1,1);"));
        assert!(is_tikz(
            &Attr::default(),
            "\\begin{tikzpicture}\n\\end{tikzpicture}"
        ));
        assert!(!is_tikz(&Attr::with_class("rust"), "fn main() {}"));
    }

    #[test]
    fn test_plain_caption() {
        let inlines = PlainCaptionFormatter.format("  A  small plot ").unwrap();

        assert_eq!(
            inlines,
            vec![
                Inline::Str("A".to_owned()),
                Inline::Space,
                Inline::Str("small".to_owned()),
                Inline::Space,
                Inline::Str("plot".to_owned()),
            ]
        );
    }

    #[test]
    fn test_extension() {
        let mut request = DiagramRequest {
            code: String::new(),
            font: "fbb".to_owned(),
            library: None,
            vector: true,
        };
        assert_eq!(request.extension(), "pdf");
        request.vector = false;
        assert_eq!(request.extension(), "png");
    }
}
