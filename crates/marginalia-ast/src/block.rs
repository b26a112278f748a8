//! Block-level nodes.

use serde::{Deserialize, Serialize};

use crate::{Attr, Inline};

/// A block-level node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "c")]
pub enum Block {
    /// Plain text, not a paragraph.
    Plain(Vec<Inline>),
    /// Paragraph.
    Para(Vec<Inline>),
    /// Lines of a line block (`| ...`).
    LineBlock(Vec<Vec<Inline>>),
    /// Code block with attributes and literal source.
    CodeBlock(Attr, String),
    /// Raw block in the named format.
    RawBlock(String, String),
    /// Block quote.
    BlockQuote(Vec<Block>),
    /// Ordered list with numbering attributes; each item is a list of blocks.
    OrderedList(ListAttributes, Vec<Vec<Block>>),
    /// Bullet list; each item is a list of blocks.
    BulletList(Vec<Vec<Block>>),
    /// Terms with one or more definitions each.
    DefinitionList(Vec<(Vec<Inline>, Vec<Vec<Block>>)>),
    /// Header with level, attributes and text.
    Header(i64, Attr, Vec<Inline>),
    /// Horizontal rule.
    HorizontalRule,
    /// Table.
    Table(
        Attr,
        Caption,
        Vec<ColSpec>,
        TableHead,
        Vec<TableBody>,
        TableFoot,
    ),
    /// Figure with caption and content.
    Figure(Attr, Caption, Vec<Block>),
    /// Generic block container.
    Div(Attr, Vec<Block>),
}

/// List numbering: start number, style, delimiter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListAttributes(pub i64, pub ListNumberStyle, pub ListNumberDelim);

/// Numbering style of an ordered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum ListNumberStyle {
    DefaultStyle,
    Example,
    Decimal,
    LowerRoman,
    UpperRoman,
    LowerAlpha,
    UpperAlpha,
}

/// Delimiter after an ordered list number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum ListNumberDelim {
    DefaultDelim,
    Period,
    OneParen,
    TwoParens,
}

/// Short caption (optional) and full caption.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Caption(pub Option<Vec<Inline>>, pub Vec<Block>);

/// Column alignment and width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColSpec(pub Alignment, pub ColWidth);

/// Horizontal alignment of a column or cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum Alignment {
    AlignLeft,
    AlignRight,
    AlignCenter,
    AlignDefault,
}

/// Relative column width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "c")]
pub enum ColWidth {
    ColWidth(f64),
    ColWidthDefault,
}

/// Table head rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableHead(pub Attr, pub Vec<Row>);

/// Table body: attributes, row-head column count, head rows, body rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableBody(pub Attr, pub i64, pub Vec<Row>, pub Vec<Row>);

/// Table foot rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableFoot(pub Attr, pub Vec<Row>);

/// Table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row(pub Attr, pub Vec<Cell>);

/// Table cell: attributes, alignment, row span, column span, content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell(pub Attr, pub Alignment, pub i64, pub i64, pub Vec<Block>);
