//! Plain-text flattening of inline and block content.

use crate::{Block, Inline, QuoteType};

/// Flatten inlines to plain text.
///
/// Whitespace nodes become a single space, formatting is dropped, raw
/// content and notes produce nothing, and code and math keep their text.
#[must_use]
pub fn stringify(inlines: &[Inline]) -> String {
    let mut out = String::new();
    push_inlines(inlines, &mut out);
    out
}

/// Flatten blocks to plain text, separating blocks with a space.
#[must_use]
pub fn stringify_blocks(blocks: &[Block]) -> String {
    let mut parts = Vec::with_capacity(blocks.len());
    for block in blocks {
        let mut out = String::new();
        push_block(block, &mut out);
        if !out.is_empty() {
            parts.push(out);
        }
    }
    parts.join(" ")
}

fn push_inlines(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        push_inline(inline, out);
    }
}

fn push_inline(inline: &Inline, out: &mut String) {
    match inline {
        Inline::Str(s) | Inline::Code(_, s) | Inline::Math(_, s) => out.push_str(s),
        Inline::Space | Inline::SoftBreak | Inline::LineBreak => out.push(' '),
        Inline::Emph(xs)
        | Inline::Underline(xs)
        | Inline::Strong(xs)
        | Inline::Strikeout(xs)
        | Inline::Superscript(xs)
        | Inline::Subscript(xs)
        | Inline::SmallCaps(xs)
        | Inline::Cite(_, xs)
        | Inline::Link(_, xs, _)
        | Inline::Image(_, xs, _)
        | Inline::Span(_, xs) => push_inlines(xs, out),
        Inline::Quoted(kind, xs) => {
            let (open, close) = match kind {
                QuoteType::SingleQuote => ('\u{2018}', '\u{2019}'),
                QuoteType::DoubleQuote => ('\u{201C}', '\u{201D}'),
            };
            out.push(open);
            push_inlines(xs, out);
            out.push(close);
        }
        Inline::RawInline(..) | Inline::Note(_) => {}
    }
}

fn push_block(block: &Block, out: &mut String) {
    match block {
        Block::Plain(xs) | Block::Para(xs) | Block::Header(_, _, xs) => push_inlines(xs, out),
        Block::LineBlock(lines) => {
            let text: Vec<String> = lines.iter().map(|line| stringify(line)).collect();
            out.push_str(&text.join(" "));
        }
        Block::CodeBlock(_, code) => out.push_str(code),
        Block::BlockQuote(blocks) | Block::Div(_, blocks) | Block::Figure(_, _, blocks) => {
            out.push_str(&stringify_blocks(blocks));
        }
        Block::OrderedList(_, items) | Block::BulletList(items) => {
            let text: Vec<String> = items.iter().map(|item| stringify_blocks(item)).collect();
            out.push_str(&text.join(" "));
        }
        Block::DefinitionList(items) => {
            let mut text = Vec::new();
            for (term, definitions) in items {
                text.push(stringify(term));
                text.extend(definitions.iter().map(|d| stringify_blocks(d)));
            }
            out.push_str(&text.join(" "));
        }
        Block::RawBlock(..) | Block::HorizontalRule | Block::Table(..) => {}
    }
}
