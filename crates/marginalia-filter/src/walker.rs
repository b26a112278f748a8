//! Document walker.
//!
//! A pre-order rewrite of the block tree. Every visit consumes one node and
//! returns its replacements (zero, one or many), and parents rebuild their
//! child lists from them. Containers are always descended so that tag
//! markers inside suppressed content still reach the [`WalkState`]; a
//! container that ends up empty while suppression was in effect is dropped
//! together with its content.

use marginalia_ast::{
    Attr, Block, Caption, Cell, Citation, Inline, Row, TableBody, TableFoot, TableHead, stringify,
};
use tracing::warn;

use crate::diagram::{
    CAPTION_ATTR, CaptionFormatter, DiagramRenderer, DiagramRequest, LIBRARY_ATTR, is_tikz,
};
use crate::error::FilterError;
use crate::state::{BlockEmission, RegionMode, WalkState};
use crate::tags::{BlockTag, Edge, Marker, SpanAnnotation};

type Result<T> = std::result::Result<T, FilterError>;

/// Collaborators used to turn TikZ code blocks into figures.
pub(crate) struct Figures<'a> {
    pub renderer: &'a dyn DiagramRenderer,
    pub captions: &'a dyn CaptionFormatter,
    pub font: String,
}

pub(crate) struct Walker<'a> {
    state: WalkState,
    figures: Option<Figures<'a>>,
    warnings: Vec<String>,
}

impl<'a> Walker<'a> {
    pub fn new(state: WalkState, figures: Option<Figures<'a>>) -> Self {
        Self {
            state,
            figures,
            warnings: Vec::new(),
        }
    }

    /// Consume the walker, returning its final state and warnings.
    pub fn finish(self) -> (WalkState, Vec<String>) {
        (self.state, self.warnings)
    }

    /// Walk the top-level block list.
    pub fn walk_document(&mut self, blocks: Vec<Block>) -> Result<Vec<Block>> {
        let mut out = Vec::with_capacity(blocks.len());
        for (index, block) in blocks.into_iter().enumerate() {
            self.state.position.block = index + 1;
            out.extend(self.walk_block(block)?);
        }
        Ok(out)
    }

    fn tick(&mut self) {
        self.state.position.node += 1;
    }

    /// Whether rebuilt content should disappear with its container.
    fn vanished(&self, entered_suppressed: bool, was_empty: bool, is_empty: bool) -> bool {
        is_empty && (!was_empty || entered_suppressed || self.state.suppressed())
    }

    fn walk_blocks(&mut self, blocks: Vec<Block>) -> Result<Vec<Block>> {
        let mut out = Vec::with_capacity(blocks.len());
        for block in blocks {
            out.extend(self.walk_block(block)?);
        }
        Ok(out)
    }

    fn walk_block(&mut self, block: Block) -> Result<Vec<Block>> {
        self.tick();

        if let Some((edge, tag)) = block_marker(&block) {
            let emission = match edge {
                Edge::Open => self.state.open_block(tag),
                Edge::Close => self.state.close_block(tag)?,
            };
            return Ok(self.emit_block(emission, block));
        }

        let entered = self.state.suppressed();
        let out = match block {
            Block::Para(inlines) => return self.walk_para(inlines, entered),
            Block::Plain(inlines) => {
                let was_empty = is_blank(&inlines);
                let inlines = self.walk_inlines(inlines)?;
                keep_if(
                    !self.vanished(entered, was_empty, is_blank(&inlines)),
                    Block::Plain(inlines),
                )
            }
            Block::LineBlock(lines) => {
                let was_empty = lines.is_empty();
                let mut kept = Vec::with_capacity(lines.len());
                for line in lines {
                    let line_was_blank = is_blank(&line);
                    let line = self.walk_inlines(line)?;
                    if !self.vanished(entered, line_was_blank, is_blank(&line)) {
                        kept.push(line);
                    }
                }
                keep_if(
                    !self.vanished(entered, was_empty, kept.is_empty()),
                    Block::LineBlock(kept),
                )
            }
            Block::CodeBlock(attr, code) => {
                if entered {
                    Vec::new()
                } else if is_tikz(&attr, &code) {
                    self.figure(attr, code)
                } else {
                    vec![Block::CodeBlock(attr, code)]
                }
            }
            Block::RawBlock(..) | Block::HorizontalRule => keep_if(!entered, block),
            Block::BlockQuote(blocks) => {
                let was_empty = blocks.is_empty();
                let blocks = self.walk_blocks(blocks)?;
                keep_if(
                    !self.vanished(entered, was_empty, blocks.is_empty()),
                    Block::BlockQuote(blocks),
                )
            }
            Block::OrderedList(attrs, items) => {
                let was_empty = items.is_empty();
                let items = self.walk_items(items, entered)?;
                keep_if(
                    !self.vanished(entered, was_empty, items.is_empty()),
                    Block::OrderedList(attrs, items),
                )
            }
            Block::BulletList(items) => {
                let was_empty = items.is_empty();
                let items = self.walk_items(items, entered)?;
                keep_if(
                    !self.vanished(entered, was_empty, items.is_empty()),
                    Block::BulletList(items),
                )
            }
            Block::DefinitionList(entries) => {
                let was_empty = entries.is_empty();
                let mut kept = Vec::with_capacity(entries.len());
                for (term, definitions) in entries {
                    let term = self.walk_inlines(term)?;
                    let definitions = self.walk_items(definitions, entered)?;
                    if !self.vanished(entered, false, is_blank(&term) && definitions.is_empty()) {
                        kept.push((term, definitions));
                    }
                }
                keep_if(
                    !self.vanished(entered, was_empty, kept.is_empty()),
                    Block::DefinitionList(kept),
                )
            }
            Block::Header(level, attr, inlines) => {
                let was_empty = is_blank(&inlines);
                let inlines = self.walk_inlines(inlines)?;
                keep_if(
                    !self.vanished(entered, was_empty, is_blank(&inlines)),
                    Block::Header(level, attr, inlines),
                )
            }
            Block::Table(attr, caption, specs, head, bodies, foot) => {
                let caption = self.walk_caption(caption)?;
                let head = TableHead(head.0, self.walk_rows(head.1)?);
                let mut walked = Vec::with_capacity(bodies.len());
                for body in bodies {
                    let TableBody(body_attr, columns, head_rows, rows) = body;
                    walked.push(TableBody(
                        body_attr,
                        columns,
                        self.walk_rows(head_rows)?,
                        self.walk_rows(rows)?,
                    ));
                }
                let foot = TableFoot(foot.0, self.walk_rows(foot.1)?);
                let empty = table_is_empty(&head, &walked, &foot);
                keep_if(
                    !(empty && (entered || self.state.suppressed())),
                    Block::Table(attr, caption, specs, head, walked, foot),
                )
            }
            Block::Figure(attr, caption, blocks) => {
                let was_empty = blocks.is_empty();
                let caption = self.walk_caption(caption)?;
                let blocks = self.walk_blocks(blocks)?;
                keep_if(
                    !self.vanished(entered, was_empty, blocks.is_empty()),
                    Block::Figure(attr, caption, blocks),
                )
            }
            Block::Div(attr, blocks) => {
                let was_empty = blocks.is_empty();
                let blocks = self.walk_blocks(blocks)?;
                keep_if(
                    !self.vanished(entered, was_empty, blocks.is_empty()),
                    Block::Div(attr, blocks),
                )
            }
        };
        Ok(out)
    }

    /// Paragraphs additionally carry the no-indent marker `< `.
    fn walk_para(&mut self, mut inlines: Vec<Inline>, entered: bool) -> Result<Vec<Block>> {
        let no_indent = strip_no_indent(&mut inlines);
        let was_empty = is_blank(&inlines);
        let inlines = self.walk_inlines(inlines)?;
        if self.vanished(entered, was_empty, is_blank(&inlines)) {
            return Ok(Vec::new());
        }
        if !no_indent {
            return Ok(vec![Block::Para(inlines)]);
        }

        let (before, after) = self.state.backend().no_indent();
        Ok(vec![Block::Para([before, inlines, after].concat())])
    }

    fn walk_items(&mut self, items: Vec<Vec<Block>>, entered: bool) -> Result<Vec<Vec<Block>>> {
        let mut kept = Vec::with_capacity(items.len());
        for item in items {
            let was_empty = item.is_empty();
            let item = self.walk_blocks(item)?;
            if !self.vanished(entered, was_empty, item.is_empty()) {
                kept.push(item);
            }
        }
        Ok(kept)
    }

    fn walk_caption(&mut self, caption: Caption) -> Result<Caption> {
        let Caption(short, blocks) = caption;
        let short = match short {
            Some(inlines) => Some(self.walk_inlines(inlines)?),
            None => None,
        };
        Ok(Caption(short, self.walk_blocks(blocks)?))
    }

    fn walk_rows(&mut self, rows: Vec<Row>) -> Result<Vec<Row>> {
        let mut out = Vec::with_capacity(rows.len());
        for Row(attr, cells) in rows {
            let mut walked = Vec::with_capacity(cells.len());
            for Cell(cell_attr, align, row_span, col_span, blocks) in cells {
                let blocks = self.walk_blocks(blocks)?;
                walked.push(Cell(cell_attr, align, row_span, col_span, blocks));
            }
            out.push(Row(attr, walked));
        }
        Ok(out)
    }

    /// Replacement for a block-level region marker.
    fn emit_block(&self, emission: BlockEmission, marker: Block) -> Vec<Block> {
        match emission {
            BlockEmission::Drop => Vec::new(),
            BlockEmission::Keep => vec![marker],
            BlockEmission::Raw(text) => {
                let backend = self.state.backend();
                match backend.raw_inline(text) {
                    Some(raw) if backend.is_typeset() => vec![Block::Para(vec![raw])],
                    Some(raw) => vec![Block::Plain(vec![raw])],
                    None => Vec::new(),
                }
            }
        }
    }

    fn figure(&mut self, attr: Attr, code: String) -> Vec<Block> {
        let Some(figures) = &self.figures else {
            return vec![Block::CodeBlock(attr, code)];
        };

        let request = DiagramRequest {
            code,
            font: figures.font.clone(),
            library: attr.get(LIBRARY_ATTR).map(str::to_owned),
            vector: self.state.backend().wants_vector_figures(),
        };
        let path = match figures.renderer.render(&request) {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "TikZ figure could not be rendered");
                self.warnings
                    .push(format!("TikZ figure could not be rendered: {e}"));
                return vec![Block::CodeBlock(attr, request.code)];
            }
        };

        let caption = attr.get(CAPTION_ATTR).unwrap_or_default().to_owned();
        let caption_inlines = if caption.is_empty() {
            vec![Inline::Str(String::new())]
        } else {
            match figures.captions.format(&caption) {
                Ok(inlines) => inlines,
                Err(e) => {
                    warn!(error = %e, caption = %caption, "Figure caption could not be formatted");
                    self.warnings
                        .push(format!("Figure caption '{caption}' could not be formatted: {e}"));
                    return vec![Block::CodeBlock(attr, request.code)];
                }
            }
        };

        let target = (path.to_string_lossy().into_owned(), caption);
        vec![Block::Para(vec![Inline::Image(attr, caption_inlines, target)])]
    }

    /// Walk an inline list.
    ///
    /// Whitespace is only merged where a node was removed: a whitespace node
    /// following a removal is skipped when it would start the list or double
    /// the whitespace before it, and whitespace left trailing by a removal at
    /// the end of the list is trimmed. Untouched runs pass through as they are.
    fn walk_inlines(&mut self, inlines: Vec<Inline>) -> Result<Vec<Inline>> {
        let mut out: Vec<Inline> = Vec::with_capacity(inlines.len());
        let mut removed = false;
        for inline in inlines {
            let walked = self.walk_inline(inline)?;
            if walked.is_empty() {
                removed = true;
                continue;
            }
            for node in walked {
                if removed && node.is_space() && out.last().is_none_or(Inline::is_space) {
                    continue;
                }
                removed = false;
                out.push(node);
            }
        }
        if removed {
            while out.last().is_some_and(Inline::is_space) {
                out.pop();
            }
        }
        Ok(out)
    }

    fn walk_inline(&mut self, inline: Inline) -> Result<Vec<Inline>> {
        self.tick();
        let entered = self.state.suppressed();

        let out = match inline {
            Inline::RawInline(format, text) if format == "html" => {
                return self.raw_html(format, text, entered);
            }
            Inline::Span(attr, children) => match SpanAnnotation::from_attr(&attr) {
                Some(SpanAnnotation::Region(tag)) => {
                    let (mode, open) = self.state.open_inline(tag);
                    let children = self.walk_inlines(children)?;
                    let close = self.state.close_inline(tag)?;
                    match mode {
                        RegionMode::Suppress => Vec::new(),
                        RegionMode::Strip => children,
                        RegionMode::Render => {
                            let mut out = self.raw(open);
                            out.extend(children);
                            out.extend(self.raw(close));
                            out
                        }
                    }
                }
                Some(SpanAnnotation::CrossRef(kind)) => {
                    if entered {
                        Vec::new()
                    } else {
                        let target = stringify(&children);
                        self.raw(self.state.backend().cross_ref(kind, &target))
                    }
                }
                None => {
                    let was_empty = is_blank(&children);
                    let children = self.walk_inlines(children)?;
                    keep_if(
                        !self.vanished(entered, was_empty, is_blank(&children)),
                        Inline::Span(attr, children),
                    )
                }
            },
            Inline::Emph(xs) => self.container(xs, entered, Inline::Emph)?,
            Inline::Underline(xs) => self.container(xs, entered, Inline::Underline)?,
            Inline::Strong(xs) => self.container(xs, entered, Inline::Strong)?,
            Inline::Strikeout(xs) => self.container(xs, entered, Inline::Strikeout)?,
            Inline::Superscript(xs) => self.container(xs, entered, Inline::Superscript)?,
            Inline::Subscript(xs) => self.container(xs, entered, Inline::Subscript)?,
            Inline::SmallCaps(xs) => self.container(xs, entered, Inline::SmallCaps)?,
            Inline::Quoted(kind, xs) => self.container(xs, entered, |xs| Inline::Quoted(kind, xs))?,
            Inline::Link(attr, xs, target) => {
                self.container(xs, entered, |xs| Inline::Link(attr, xs, target))?
            }
            Inline::Cite(citations, xs) => {
                let citations = self.walk_citations(citations)?;
                self.container(xs, entered, |xs| Inline::Cite(citations, xs))?
            }
            Inline::Image(attr, xs, target) => {
                let xs = self.walk_inlines(xs)?;
                keep_if(!entered, Inline::Image(attr, xs, target))
            }
            Inline::Note(blocks) => {
                let was_empty = blocks.is_empty();
                let blocks = self.walk_blocks(blocks)?;
                keep_if(
                    !self.vanished(entered, was_empty, blocks.is_empty()),
                    Inline::Note(blocks),
                )
            }
            leaf => keep_if(!entered, leaf),
        };
        Ok(out)
    }

    fn container(
        &mut self,
        children: Vec<Inline>,
        entered: bool,
        rebuild: impl FnOnce(Vec<Inline>) -> Inline,
    ) -> Result<Vec<Inline>> {
        let was_empty = is_blank(&children);
        let children = self.walk_inlines(children)?;
        let keep = !self.vanished(entered, was_empty, is_blank(&children));
        Ok(keep_if(keep, rebuild(children)))
    }

    fn walk_citations(&mut self, citations: Vec<Citation>) -> Result<Vec<Citation>> {
        let mut out = Vec::with_capacity(citations.len());
        for mut citation in citations {
            citation.citation_prefix = self.walk_inlines(citation.citation_prefix)?;
            citation.citation_suffix = self.walk_inlines(citation.citation_suffix)?;
            out.push(citation);
        }
        Ok(out)
    }

    /// Raw inline in the backend's format, if there is text to emit.
    fn raw(&self, text: Option<String>) -> Vec<Inline> {
        text.and_then(|text| self.state.backend().raw_inline(text))
            .into_iter()
            .collect()
    }

    /// Raw HTML at inline grain: tag markers of either grain, legacy
    /// cross-references, or unrelated markup.
    fn raw_html(&mut self, format: String, text: String, entered: bool) -> Result<Vec<Inline>> {
        let out = match Marker::parse(&text) {
            Some(Marker::Inline(Edge::Open, tag)) => {
                let (_, open) = self.state.open_inline(tag);
                self.raw(open)
            }
            Some(Marker::Inline(Edge::Close, tag)) => {
                let close = self.state.close_inline(tag)?;
                self.raw(close)
            }
            Some(Marker::Block(edge, tag)) => {
                let emission = match edge {
                    Edge::Open => self.state.open_block(tag),
                    Edge::Close => self.state.close_block(tag)?,
                };
                match emission {
                    BlockEmission::Drop => Vec::new(),
                    BlockEmission::Keep => vec![Inline::RawInline(format, text)],
                    BlockEmission::Raw(fragment) => self.raw(Some(fragment)),
                }
            }
            Some(Marker::CrossRef(kind, target)) => {
                if entered {
                    Vec::new()
                } else {
                    self.raw(self.state.backend().cross_ref(kind, &target))
                }
            }
            None => keep_if(!entered, Inline::RawInline(format, text)),
        };
        Ok(out)
    }
}

/// Block-level region marker carried by a block, if any.
///
/// Raw HTML blocks are matched case-insensitively; a paragraph made of a
/// single string must spell the tag exactly.
fn block_marker(block: &Block) -> Option<(Edge, BlockTag)> {
    let marker = match block {
        Block::RawBlock(format, text) if format == "html" => Marker::parse(text)?,
        Block::Para(inlines) => match inlines.as_slice() {
            [Inline::Str(text)] if text.trim() == text.trim().to_ascii_lowercase() => {
                Marker::parse(text)?
            }
            _ => return None,
        },
        _ => return None,
    };
    match marker {
        Marker::Block(edge, tag) => Some((edge, tag)),
        Marker::Inline(..) | Marker::CrossRef(..) => None,
    }
}

/// Strip a leading `< ` no-indent marker. Returns whether one was present.
fn strip_no_indent(inlines: &mut Vec<Inline>) -> bool {
    let marked = matches!(
        inlines.as_slice(),
        [Inline::Str(first), Inline::Space, ..] if first == "<"
    );
    if marked {
        inlines.drain(..2);
    }
    marked
}

fn keep_if<T>(keep: bool, node: T) -> Vec<T> {
    if keep { vec![node] } else { Vec::new() }
}

fn is_blank(inlines: &[Inline]) -> bool {
    inlines.iter().all(Inline::is_space)
}

fn table_is_empty(head: &TableHead, bodies: &[TableBody], foot: &TableFoot) -> bool {
    let rows = head
        .1
        .iter()
        .chain(bodies.iter().flat_map(|body| body.2.iter().chain(body.3.iter())))
        .chain(foot.1.iter());
    rows.flat_map(|row| row.1.iter())
        .all(|cell| cell.4.is_empty())
}
