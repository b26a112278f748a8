//! Annotation tag vocabulary.
//!
//! Tags reach the filter in two surfaces: literal angle-bracket markers that
//! pandoc keeps as raw HTML (`<comment>`, `</!box>`, `<r fig:plot>`), and
//! spans carrying a class (`[text]{.fixme}`). Both resolve to the closed
//! enumerations defined here.

use std::fmt;

use marginalia_ast::Attr;

/// Text colors assigned to annotation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black,
    Cyan,
    Yellow,
    Red,
}

impl Color {
    /// Color name as understood by `xcolor` and CSS.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::Cyan => "cyan",
            Self::Yellow => "yellow",
            Self::Red => "red",
        }
    }
}

/// Tags that delimit a run of text within a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineTag {
    Comment,
    Highlight,
    Fixme,
    Margin,
    SmallCaps,
}

impl InlineTag {
    /// Parse a lowercased tag name (`comment`, `smcaps`, ...).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "comment" => Some(Self::Comment),
            "highlight" => Some(Self::Highlight),
            "fixme" => Some(Self::Fixme),
            "margin" => Some(Self::Margin),
            "smcaps" => Some(Self::SmallCaps),
            _ => None,
        }
    }

    /// Tag name as written between the angle brackets.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::Highlight => "highlight",
            Self::Fixme => "fixme",
            Self::Margin => "margin",
            Self::SmallCaps => "smcaps",
        }
    }

    /// Color the tag's content is set in.
    ///
    /// `None` means the content keeps the surrounding color.
    #[must_use]
    pub fn color(self) -> Option<Color> {
        match self {
            Self::Comment => Some(Color::Cyan),
            Self::Fixme => Some(Color::Red),
            Self::Margin => Some(Color::Black),
            Self::Highlight | Self::SmallCaps => None,
        }
    }
}

impl fmt::Display for InlineTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.name())
    }
}

/// Tags that delimit whole blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTag {
    Comment,
    Box,
    Center,
    Speaker,
}

impl BlockTag {
    /// Parse a lowercased tag name (`!comment`, `center`, ...).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "!comment" => Some(Self::Comment),
            "!box" => Some(Self::Box),
            "center" => Some(Self::Center),
            "!speaker" => Some(Self::Speaker),
            _ => None,
        }
    }

    /// Tag name as written between the angle brackets.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Comment => "!comment",
            Self::Box => "!box",
            Self::Center => "center",
            Self::Speaker => "!speaker",
        }
    }
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.name())
    }
}

/// Whether a marker opens or closes its region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Open,
    Close,
}

/// Stateless cross-reference style markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossRefKind {
    /// `<i TEXT>` / `{.i}`: index entry.
    Index,
    /// `<l LABEL>` / `{.l}`: anchor.
    Label,
    /// `<r LABEL>` / `{.r}`: reference to an anchor.
    Reference,
    /// `<rp LABEL>` / `{.rp}`: page reference to an anchor.
    PageReference,
}

impl CrossRefKind {
    /// Parse the short marker name (`i`, `l`, `r`, `rp`).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "i" => Some(Self::Index),
            "l" => Some(Self::Label),
            "r" => Some(Self::Reference),
            "rp" => Some(Self::PageReference),
            _ => None,
        }
    }
}

/// A raw-markup token recognized by the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    Inline(Edge, InlineTag),
    Block(Edge, BlockTag),
    CrossRef(CrossRefKind, String),
}

impl Marker {
    /// Parse a raw HTML token.
    ///
    /// Region tags are matched case-insensitively; cross-reference markers
    /// need the exact lowercase name followed by a space and an argument.
    /// Returns `None` for anything outside the vocabulary.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let inner = text.trim().strip_prefix('<')?.strip_suffix('>')?;

        if let Some(name) = inner.strip_prefix('/') {
            return Self::region(Edge::Close, &name.trim().to_ascii_lowercase());
        }
        if let Some(marker) = Self::region(Edge::Open, &inner.trim().to_ascii_lowercase()) {
            return Some(marker);
        }

        let (name, argument) = inner.split_once(' ')?;
        let kind = CrossRefKind::from_name(name)?;
        let argument = argument.trim();
        if argument.is_empty() {
            return None;
        }
        Some(Self::CrossRef(kind, argument.to_owned()))
    }

    fn region(edge: Edge, name: &str) -> Option<Self> {
        if let Some(tag) = BlockTag::from_name(name) {
            return Some(Self::Block(edge, tag));
        }
        InlineTag::from_name(name).map(|tag| Self::Inline(edge, tag))
    }
}

/// Meaning of a span's class list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanAnnotation {
    Region(InlineTag),
    CrossRef(CrossRefKind),
}

/// Span classes in the order they are tried.
const SPAN_CLASSES: [(&str, SpanAnnotation); 9] = [
    ("comment", SpanAnnotation::Region(InlineTag::Comment)),
    ("margin", SpanAnnotation::Region(InlineTag::Margin)),
    ("fixme", SpanAnnotation::Region(InlineTag::Fixme)),
    ("highlight", SpanAnnotation::Region(InlineTag::Highlight)),
    ("smcaps", SpanAnnotation::Region(InlineTag::SmallCaps)),
    ("i", SpanAnnotation::CrossRef(CrossRefKind::Index)),
    ("l", SpanAnnotation::CrossRef(CrossRefKind::Label)),
    ("r", SpanAnnotation::CrossRef(CrossRefKind::Reference)),
    ("rp", SpanAnnotation::CrossRef(CrossRefKind::PageReference)),
];

impl SpanAnnotation {
    /// Resolve a span's attributes to an annotation.
    ///
    /// When several recognized classes are present the first one in
    /// [`SPAN_CLASSES`] order wins.
    #[must_use]
    pub fn from_attr(attr: &Attr) -> Option<Self> {
        SPAN_CLASSES
            .iter()
            .find(|(class, _)| attr.has_class(class))
            .map(|(_, annotation)| *annotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inline_tags() {
        assert_eq!(
            Marker::parse("<comment>"),
            Some(Marker::Inline(Edge::Open, InlineTag::Comment))
        );
        assert_eq!(
            Marker::parse("</highlight>"),
            Some(Marker::Inline(Edge::Close, InlineTag::Highlight))
        );
        assert_eq!(
            Marker::parse("<smcaps>"),
            Some(Marker::Inline(Edge::Open, InlineTag::SmallCaps))
        );
    }

    #[test]
    fn test_parse_block_tags_case_insensitive() {
        assert_eq!(
            Marker::parse("<!COMMENT>"),
            Some(Marker::Block(Edge::Open, BlockTag::Comment))
        );
        assert_eq!(
            Marker::parse("</!box>\n"),
            Some(Marker::Block(Edge::Close, BlockTag::Box))
        );
        assert_eq!(
            Marker::parse("<Center>"),
            Some(Marker::Block(Edge::Open, BlockTag::Center))
        );
        assert_eq!(
            Marker::parse("</!speaker>"),
            Some(Marker::Block(Edge::Close, BlockTag::Speaker))
        );
    }

    #[test]
    fn test_parse_cross_refs() {
        assert_eq!(
            Marker::parse("<l fig:plot>"),
            Some(Marker::CrossRef(CrossRefKind::Label, "fig:plot".to_owned()))
        );
        assert_eq!(
            Marker::parse("<rp sec:intro>"),
            Some(Marker::CrossRef(
                CrossRefKind::PageReference,
                "sec:intro".to_owned()
            ))
        );
        assert_eq!(
            Marker::parse("<i Kant, Immanuel>"),
            Some(Marker::CrossRef(
                CrossRefKind::Index,
                "Kant, Immanuel".to_owned()
            ))
        );
    }

    #[test]
    fn test_parse_rejects_other_html() {
        assert_eq!(Marker::parse("<i>"), None);
        assert_eq!(Marker::parse("<a href=\"#x\">"), None);
        assert_eq!(Marker::parse("<r >"), None);
        assert_eq!(Marker::parse("comment"), None);
        assert_eq!(Marker::parse("<div>"), None);
    }

    #[test]
    fn test_span_annotation_priority() {
        let attr = Attr {
            classes: vec!["highlight".to_owned(), "comment".to_owned()],
            ..Attr::default()
        };

        assert_eq!(
            SpanAnnotation::from_attr(&attr),
            Some(SpanAnnotation::Region(InlineTag::Comment))
        );
        assert_eq!(
            SpanAnnotation::from_attr(&Attr::with_class("rp")),
            Some(SpanAnnotation::CrossRef(CrossRefKind::PageReference))
        );
        assert_eq!(SpanAnnotation::from_attr(&Attr::with_class("note")), None);
    }

    #[test]
    fn test_tag_colors() {
        assert_eq!(InlineTag::Comment.color(), Some(Color::Cyan));
        assert_eq!(InlineTag::Fixme.color(), Some(Color::Red));
        assert_eq!(InlineTag::Margin.color(), Some(Color::Black));
        assert_eq!(InlineTag::Highlight.color(), None);
    }

    #[test]
    fn test_display_uses_tag_surface() {
        assert_eq!(InlineTag::Margin.to_string(), "<margin>");
        assert_eq!(BlockTag::Speaker.to_string(), "<!speaker>");
    }
}
