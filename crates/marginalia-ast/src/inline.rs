//! Inline nodes.

use serde::{Deserialize, Serialize};

use crate::{Attr, Block};

/// Link or image target: URL and title.
pub type Target = (String, String);

/// An inline node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "c")]
pub enum Inline {
    /// Text run without whitespace.
    Str(String),
    Emph(Vec<Inline>),
    Underline(Vec<Inline>),
    Strong(Vec<Inline>),
    Strikeout(Vec<Inline>),
    Superscript(Vec<Inline>),
    Subscript(Vec<Inline>),
    SmallCaps(Vec<Inline>),
    /// Quoted text.
    Quoted(QuoteType, Vec<Inline>),
    /// Citations with their rendered text.
    Cite(Vec<Citation>, Vec<Inline>),
    /// Inline code.
    Code(Attr, String),
    /// Inter-word space.
    Space,
    /// Soft line break.
    SoftBreak,
    /// Hard line break.
    LineBreak,
    /// TeX math.
    Math(MathType, String),
    /// Raw inline content in the named format.
    RawInline(String, String),
    /// Hyperlink: attributes, link text, target.
    Link(Attr, Vec<Inline>, Target),
    /// Image: attributes, alt text, target.
    Image(Attr, Vec<Inline>, Target),
    /// Footnote or endnote.
    Note(Vec<Block>),
    /// Generic inline container.
    Span(Attr, Vec<Inline>),
}

impl Inline {
    /// Create a raw inline in the given format.
    #[must_use]
    pub fn raw(format: &str, text: impl Into<String>) -> Self {
        Self::RawInline(format.to_owned(), text.into())
    }

    /// Whether this node is inter-word whitespace.
    #[must_use]
    pub fn is_space(&self) -> bool {
        matches!(self, Self::Space | Self::SoftBreak)
    }
}

/// Quote style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum QuoteType {
    SingleQuote,
    DoubleQuote,
}

/// Math style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum MathType {
    DisplayMath,
    InlineMath,
}

/// A single citation inside a [`Inline::Cite`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    pub citation_id: String,
    pub citation_prefix: Vec<Inline>,
    pub citation_suffix: Vec<Inline>,
    pub citation_mode: CitationMode,
    pub citation_note_num: i64,
    pub citation_hash: i64,
}

/// How a citation is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum CitationMode {
    AuthorInText,
    SuppressAuthor,
    NormalCitation,
}
