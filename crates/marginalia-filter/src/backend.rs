//! Output backends and their render tables.
//!
//! A backend is selected from the format argument pandoc passes to the
//! filter. Each backend owns a render table: for every tag it either has a
//! pair of literal [`Fragments`] to splice around the tagged content, or no
//! rendering at all, in which case the tag is stripped.

use marginalia_ast::Inline;

use crate::tags::{BlockTag, Color, CrossRefKind, InlineTag};

/// Inline CSS for floated margin notes on web backends.
macro_rules! margin_style {
    () => {
        "max-width:20%; border: 1px solid black;padding: 1ex; margin: 1ex; float:right; font-size: small;"
    };
}

/// Output backend selected by the pandoc format argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// LaTeX document.
    Latex,
    /// LaTeX slide deck.
    Beamer,
    /// HTML page (`html`, `html4`, `html5`).
    Html,
    /// reveal.js slide deck.
    RevealJs,
    /// Word document.
    Docx,
    /// Markdown output; the document passes through untouched.
    Markdown,
    /// Any other format. Recognised tags are stripped and nothing is emitted.
    Other,
}

/// Literal opening and closing halves of a rendered region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragments {
    pub open: &'static str,
    pub close: &'static str,
}

impl Fragments {
    const fn new(open: &'static str, close: &'static str) -> Self {
        Self { open, close }
    }
}

impl Backend {
    /// Select the backend for a pandoc output format name.
    #[must_use]
    pub fn from_format(format: &str) -> Self {
        match format {
            "latex" => Self::Latex,
            "beamer" => Self::Beamer,
            "html" | "html4" | "html5" => Self::Html,
            "revealjs" => Self::RevealJs,
            "docx" => Self::Docx,
            "markdown" => Self::Markdown,
            _ => Self::Other,
        }
    }

    /// Format name used for raw nodes this backend emits.
    #[must_use]
    pub fn raw_format(self) -> Option<&'static str> {
        match self {
            Self::Latex | Self::Beamer => Some("latex"),
            Self::Html | Self::RevealJs => Some("html"),
            Self::Docx => Some("openxml"),
            Self::Markdown | Self::Other => None,
        }
    }

    /// LaTeX-based backends.
    #[must_use]
    pub fn is_typeset(self) -> bool {
        matches!(self, Self::Latex | Self::Beamer)
    }

    /// Whether color changes inside a highlight must close and reopen it.
    ///
    /// `\hl` and Word highlight runs cannot contain a color switch; HTML
    /// scopes color with nested elements instead.
    #[must_use]
    pub fn splices_highlight(self) -> bool {
        matches!(self, Self::Latex | Self::Beamer | Self::Docx)
    }

    /// Whether figures are produced as PDF rather than PNG.
    #[must_use]
    pub fn wants_vector_figures(self) -> bool {
        self.is_typeset()
    }

    /// Wrap `text` in a raw inline of this backend's format.
    #[must_use]
    pub fn raw_inline(self, text: impl Into<String>) -> Option<Inline> {
        self.raw_format().map(|format| Inline::raw(format, text))
    }

    /// Render table for inline tags.
    #[must_use]
    pub fn inline_fragments(self, tag: InlineTag) -> Option<Fragments> {
        use InlineTag::{Comment, Fixme, Highlight, Margin, SmallCaps};

        match (self, tag) {
            (Self::Latex | Self::Beamer, Comment) => Some(Fragments::new("\\textcolor{cyan}{", "}")),
            (Self::Latex | Self::Beamer, Highlight) => Some(Fragments::new("\\hl{", "}")),
            (Self::Latex | Self::Beamer, Margin) => Some(Fragments::new(
                "\\marginpar{\\begin{flushleft}\\scriptsize{\\textcolor{black}{",
                "}}\\end{flushleft}}",
            )),
            (Self::Latex | Self::Beamer, Fixme) => Some(Fragments::new(
                "\\marginpar{\\scriptsize{\\textcolor{red}{Fix this!}}}\\textcolor{red}{",
                "}",
            )),
            (Self::Latex | Self::Beamer, SmallCaps) => Some(Fragments::new("\\textsc{", "}")),

            (Self::Html | Self::RevealJs, Comment) => {
                Some(Fragments::new("<span style=\"color: cyan;\">", "</span>"))
            }
            (Self::Html | Self::RevealJs, Highlight) => Some(Fragments::new("<mark>", "</mark>")),
            (Self::Html | Self::RevealJs, Margin) => Some(Fragments::new(
                concat!("<span style=\"color: black; ", margin_style!(), "\">"),
                "</span>",
            )),
            (Self::Html | Self::RevealJs, Fixme) => Some(Fragments::new(
                concat!(
                    "<span style=\"color: red; ",
                    margin_style!(),
                    "\">Fix this!</span><span style=\"color: red;\">"
                ),
                "</span>",
            )),
            (Self::Html | Self::RevealJs, SmallCaps) => Some(Fragments::new(
                "<span style=\"font-variant: small-caps;\">",
                "</span>",
            )),

            (Self::Docx, Comment) => Some(Fragments::new(
                "<w:rPr><w:color w:val=\"FF0000\"/></w:rPr><w:t>",
                "</w:t>",
            )),
            (Self::Docx, Highlight) => Some(Fragments::new(
                "<w:rPr><w:highlight w:val=\"yellow\"/></w:rPr><w:t>",
                "</w:t>",
            )),
            (Self::Docx, Fixme) => Some(Fragments::new(
                "<w:rPr><w:color w:val=\"0000FF\"/></w:rPr><w:t>",
                "</w:t>",
            )),
            (Self::Docx, Margin | SmallCaps) | (Self::Markdown | Self::Other, _) => None,
        }
    }

    /// Render table for block tags.
    #[must_use]
    pub fn block_fragments(self, tag: BlockTag) -> Option<Fragments> {
        use BlockTag::{Box, Center, Comment, Speaker};

        match (self, tag) {
            (Self::Latex | Self::Beamer, Comment) => {
                Some(Fragments::new("\\color{cyan}{}", "\\color{black}{}"))
            }
            (Self::Latex | Self::Beamer, Box) => Some(Fragments::new(
                "\\medskip\\begin{mdframed}",
                "\\end{mdframed}\\medskip{}",
            )),
            (Self::Latex | Self::Beamer, Center) => {
                Some(Fragments::new("\\begin{center}", "\\end{center}"))
            }
            (Self::Latex | Self::Beamer, Speaker) => {
                Some(Fragments::new("\\textcolor{cyan}{", "}"))
            }

            (Self::Html | Self::RevealJs, Comment) | (Self::Html, Speaker) => {
                Some(Fragments::new("<div style=\"color: cyan;\">", "</div>"))
            }
            (Self::RevealJs, Speaker) => Some(Fragments::new("<aside class=\"notes\">", "</aside>")),
            (Self::Html | Self::RevealJs, Box) => Some(Fragments::new(
                "<div style=\"border:1px solid black; padding:1.5ex;\">",
                "</div>",
            )),
            (Self::Html | Self::RevealJs, Center) => {
                Some(Fragments::new("<div style=\"text-align:center;\">", "</div>"))
            }

            (Self::Docx | Self::Markdown | Self::Other, _) => None,
        }
    }

    /// Fragment that switches the running text color.
    ///
    /// Only the typeset family restores color explicitly; web backends scope
    /// color with nested elements and Word runs carry their own properties.
    #[must_use]
    pub fn color_fragment(self, color: Color) -> Option<String> {
        self.is_typeset()
            .then(|| format!("\\color{{{}}}{{}}", color.as_str()))
    }

    /// Markup for a cross-reference marker, or `None` when the backend drops it.
    #[must_use]
    pub fn cross_ref(self, kind: CrossRefKind, target: &str) -> Option<String> {
        match (self, kind) {
            (Self::Latex, CrossRefKind::Index) => Some(format!("\\index{{{target}}}")),
            (Self::Latex | Self::Beamer, CrossRefKind::Label) => {
                Some(format!("\\label{{{target}}}"))
            }
            (Self::Latex | Self::Beamer, CrossRefKind::Reference) => {
                Some(format!("\\cref{{{target}}}"))
            }
            (Self::Latex | Self::Beamer, CrossRefKind::PageReference) => {
                Some(format!("\\cpageref{{{target}}}"))
            }
            (Self::Html | Self::RevealJs, CrossRefKind::Label) => {
                Some(format!("<a name=\"{}\"></a>", escape_html(target)))
            }
            (
                Self::Html | Self::RevealJs,
                CrossRefKind::Reference | CrossRefKind::PageReference,
            ) => Some(format!("<a href=\"#{}\">here</a>", escape_html(target))),
            _ => None,
        }
    }

    /// Opening and closing raw inlines wrapped around a no-indent paragraph.
    #[must_use]
    pub fn no_indent(self) -> (Vec<Inline>, Vec<Inline>) {
        match self {
            Self::Latex | Self::Beamer => (vec![Inline::raw("latex", "\\noindent{}")], Vec::new()),
            Self::Html | Self::RevealJs => (
                vec![Inline::raw("html", "<div class=\"noindent\">")],
                vec![Inline::raw("html", "</div>")],
            ),
            Self::Docx | Self::Markdown | Self::Other => (Vec::new(), Vec::new()),
        }
    }
}

/// Escape text for use inside an HTML attribute.
fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_BACKENDS: [Backend; 7] = [
        Backend::Latex,
        Backend::Beamer,
        Backend::Html,
        Backend::RevealJs,
        Backend::Docx,
        Backend::Markdown,
        Backend::Other,
    ];

    const ALL_INLINE: [InlineTag; 5] = [
        InlineTag::Comment,
        InlineTag::Highlight,
        InlineTag::Fixme,
        InlineTag::Margin,
        InlineTag::SmallCaps,
    ];

    #[test]
    fn test_from_format() {
        assert_eq!(Backend::from_format("latex"), Backend::Latex);
        assert_eq!(Backend::from_format("html5"), Backend::Html);
        assert_eq!(Backend::from_format("revealjs"), Backend::RevealJs);
        assert_eq!(Backend::from_format("docx"), Backend::Docx);
        assert_eq!(Backend::from_format("markdown"), Backend::Markdown);
        assert_eq!(Backend::from_format("epub"), Backend::Other);
        assert_eq!(Backend::from_format(""), Backend::Other);
    }

    #[test]
    fn test_margin_style_matches_margin_fragments() {
        let margin = Backend::Html.inline_fragments(InlineTag::Margin).unwrap();
        let fixme = Backend::Html.inline_fragments(InlineTag::Fixme).unwrap();

        assert!(margin.open.contains(margin_style!()));
        assert!(margin.open.starts_with("<span style=\"color: black; "));
        assert!(fixme.open.contains(margin_style!()));
        assert!(fixme.open.ends_with("<span style=\"color: red;\">"));
    }

    #[test]
    fn test_inline_fragments_have_both_halves() {
        for backend in ALL_BACKENDS {
            for tag in ALL_INLINE {
                if let Some(fragments) = backend.inline_fragments(tag) {
                    assert!(!fragments.open.is_empty(), "{backend:?} {tag}");
                    assert!(!fragments.close.is_empty(), "{backend:?} {tag}");
                }
            }
        }
    }

    #[test]
    fn test_speaker_notes_differ_for_reveal() {
        assert_eq!(
            Backend::RevealJs.block_fragments(BlockTag::Speaker),
            Some(Fragments::new("<aside class=\"notes\">", "</aside>"))
        );
        assert_eq!(
            Backend::Html.block_fragments(BlockTag::Speaker),
            Backend::Html.block_fragments(BlockTag::Comment)
        );
    }

    #[test]
    fn test_docx_has_no_block_or_margin_rendering() {
        assert_eq!(Backend::Docx.block_fragments(BlockTag::Box), None);
        assert_eq!(Backend::Docx.inline_fragments(InlineTag::Margin), None);
        assert_eq!(Backend::Docx.inline_fragments(InlineTag::SmallCaps), None);
        assert_eq!(Backend::Docx.color_fragment(Color::Cyan), None);
    }

    #[test]
    fn test_colored_fragments_use_tag_color() {
        for tag in [InlineTag::Comment, InlineTag::Fixme, InlineTag::Margin] {
            let color = tag.color().unwrap().as_str();
            for backend in [Backend::Latex, Backend::Beamer] {
                let open = backend.inline_fragments(tag).unwrap().open;
                assert!(open.contains(&format!("\\textcolor{{{color}}}{{")), "{backend:?} {tag}");
            }
            for backend in [Backend::Html, Backend::RevealJs] {
                let open = backend.inline_fragments(tag).unwrap().open;
                assert!(open.starts_with(&format!("<span style=\"color: {color};")), "{backend:?} {tag}");
            }
        }

        let block = Backend::Latex.block_fragments(BlockTag::Comment).unwrap();
        assert_eq!(
            Some(block.open.to_owned()),
            Backend::Latex.color_fragment(InlineTag::Comment.color().unwrap())
        );
        assert_eq!(
            Some(block.close.to_owned()),
            Backend::Latex.color_fragment(Color::Black)
        );
    }

    #[test]
    fn test_color_fragment() {
        assert_eq!(
            Backend::Beamer.color_fragment(Color::Red).as_deref(),
            Some("\\color{red}{}")
        );
        assert_eq!(Backend::Html.color_fragment(Color::Red), None);
    }

    #[test]
    fn test_cross_refs() {
        assert_eq!(
            Backend::Latex.cross_ref(CrossRefKind::Index, "Kant").as_deref(),
            Some("\\index{Kant}")
        );
        assert_eq!(Backend::Beamer.cross_ref(CrossRefKind::Index, "Kant"), None);
        assert_eq!(
            Backend::Beamer.cross_ref(CrossRefKind::PageReference, "fig").as_deref(),
            Some("\\cpageref{fig}")
        );
        assert_eq!(
            Backend::Html.cross_ref(CrossRefKind::Label, "a\"b").as_deref(),
            Some("<a name=\"a&quot;b\"></a>")
        );
        assert_eq!(
            Backend::Html.cross_ref(CrossRefKind::PageReference, "x").as_deref(),
            Some("<a href=\"#x\">here</a>")
        );
        assert_eq!(Backend::Docx.cross_ref(CrossRefKind::Label, "x"), None);
    }

    #[test]
    fn test_no_indent() {
        let (before, after) = Backend::Latex.no_indent();
        assert_eq!(before, vec![Inline::raw("latex", "\\noindent{}")]);
        assert!(after.is_empty());

        let (before, after) = Backend::Other.no_indent();
        assert!(before.is_empty() && after.is_empty());
    }
}
