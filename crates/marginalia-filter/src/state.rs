//! Region state machines.
//!
//! [`WalkState`] tracks everything that must survive between sibling and
//! descendant nodes during one walk:
//!
//! - the inline stack of open `<comment>`/`<highlight>`/... regions, each with
//!   the [`RegionMode`] decided when it opened;
//! - the color stack, bottom element black, one entry per open inline region
//!   plus one for a block comment open in draft mode;
//! - the block-comment flag, which suppresses everything in publish mode;
//! - whether a `<!box>` was emitted, so the harness can request `mdframed`.
//!
//! Every open and close event returns the raw text to splice at that point,
//! or nothing. Deciding *where* that text goes is the walker's job.

use crate::backend::{Backend, Fragments};
use crate::draft::DraftMode;
use crate::error::{FilterError, Position};
use crate::tags::{BlockTag, Color, Edge, InlineTag};

/// What happens to the content of an inline region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionMode {
    /// Content kept and wrapped in the backend's fragments.
    Render,
    /// Content kept, tags removed.
    Strip,
    /// Content removed.
    Suppress,
}

#[derive(Debug, Clone, Copy)]
struct OpenRegion {
    tag: InlineTag,
    mode: RegionMode,
}

/// Stack of running text colors. Never empty.
#[derive(Debug, Clone)]
struct ColorStack(Vec<Color>);

impl ColorStack {
    fn new() -> Self {
        Self(vec![Color::Black])
    }

    fn top(&self) -> Color {
        self.0.last().copied().unwrap_or(Color::Black)
    }

    fn push(&mut self, color: Color) {
        self.0.push(color);
    }

    fn pop(&mut self) {
        if self.0.len() > 1 {
            self.0.pop();
        }
    }
}

/// Whether a tag takes part in color tracking. Small caps only changes the
/// font shape.
fn recolors(tag: InlineTag) -> bool {
    tag != InlineTag::SmallCaps
}

/// Replacement for a block-region marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockEmission {
    /// Remove the marker.
    Drop,
    /// Leave the marker node as it was.
    Keep,
    /// Replace the marker with this raw fragment.
    Raw(String),
}

/// Mutable state of one walk.
#[derive(Debug)]
pub struct WalkState {
    backend: Backend,
    draft: DraftMode,
    inline_stack: Vec<OpenRegion>,
    colors: ColorStack,
    block_comment: bool,
    box_used: bool,
    /// Location of the node being visited, for error reports.
    pub position: Position,
}

impl WalkState {
    pub fn new(backend: Backend, draft: DraftMode) -> Self {
        Self {
            backend,
            draft,
            inline_stack: Vec::new(),
            colors: ColorStack::new(),
            block_comment: false,
            box_used: false,
            position: Position::default(),
        }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Whether content at the current point is dropped.
    pub fn suppressed(&self) -> bool {
        (self.block_comment && !self.draft.is_draft())
            || self
                .inline_stack
                .iter()
                .any(|region| region.mode == RegionMode::Suppress)
    }

    /// Whether a `<!box>` region was emitted.
    pub fn box_used(&self) -> bool {
        self.box_used
    }

    /// Inline regions still open, outermost first.
    pub fn open_inline_tags(&self) -> Vec<InlineTag> {
        self.inline_stack.iter().map(|region| region.tag).collect()
    }

    /// Whether a block comment is still open.
    pub fn block_comment_open(&self) -> bool {
        self.block_comment
    }

    fn mode_for(&self, tag: InlineTag) -> RegionMode {
        let rendered = self.backend.inline_fragments(tag).is_some();
        match (self.draft, tag) {
            (DraftMode::Publish, InlineTag::Comment | InlineTag::Margin) => RegionMode::Suppress,
            (DraftMode::Publish, InlineTag::Fixme | InlineTag::Highlight) => RegionMode::Strip,
            (DraftMode::Publish, InlineTag::SmallCaps) | (DraftMode::Draft, _) if rendered => {
                RegionMode::Render
            }
            (DraftMode::Draft, InlineTag::Margin) => RegionMode::Suppress,
            _ => RegionMode::Strip,
        }
    }

    /// Highlight fragments to splice around an event, if a rendered
    /// highlight is open and the event is not that highlight's own close.
    fn highlight_splice(&self, tag: InlineTag, edge: Edge) -> Option<Fragments> {
        if !self.backend.splices_highlight()
            || !recolors(tag)
            || (tag == InlineTag::Highlight && edge == Edge::Close)
        {
            return None;
        }
        let highlighted = self
            .inline_stack
            .iter()
            .any(|region| region.tag == InlineTag::Highlight && region.mode == RegionMode::Render);
        if highlighted {
            self.backend.inline_fragments(InlineTag::Highlight)
        } else {
            None
        }
    }

    /// Open an inline region.
    ///
    /// Returns the region's mode and the raw text to emit in place of the
    /// opening marker.
    pub fn open_inline(&mut self, tag: InlineTag) -> (RegionMode, Option<String>) {
        let mode = self.mode_for(tag);
        let text = if self.suppressed() || mode != RegionMode::Render {
            None
        } else {
            self.backend.inline_fragments(tag).map(|fragments| {
                match self.highlight_splice(tag, Edge::Open) {
                    Some(hl) => format!("{}{}{}", hl.close, fragments.open, hl.open),
                    None => fragments.open.to_owned(),
                }
            })
        };

        let color = tag.color().unwrap_or_else(|| self.colors.top());
        self.colors.push(color);
        self.inline_stack.push(OpenRegion { tag, mode });

        (mode, text)
    }

    /// Close the innermost inline region, which must be `tag`.
    ///
    /// Returns the raw text to emit in place of the closing marker.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnopenedTag`] when nothing is open and
    /// [`FilterError::MismatchedTag`] when the innermost region is a
    /// different tag.
    pub fn close_inline(&mut self, tag: InlineTag) -> Result<Option<String>, FilterError> {
        let Some(top) = self.inline_stack.last().copied() else {
            return Err(FilterError::UnopenedTag {
                found: tag,
                position: self.position,
            });
        };
        if top.tag != tag {
            return Err(FilterError::MismatchedTag {
                open: top.tag,
                found: tag,
                position: self.position,
            });
        }

        let splice = self.highlight_splice(tag, Edge::Close);
        self.inline_stack.pop();
        self.colors.pop();

        if top.mode != RegionMode::Render || self.suppressed() {
            return Ok(None);
        }
        let Some(fragments) = self.backend.inline_fragments(tag) else {
            return Ok(None);
        };

        let restore = if self.draft.is_draft() && recolors(tag) {
            self.backend
                .color_fragment(self.colors.top())
                .unwrap_or_default()
        } else {
            String::new()
        };
        let text = match splice {
            Some(hl) => format!("{}{}{restore}{}", hl.close, fragments.close, hl.open),
            None => format!("{}{restore}", fragments.close),
        };
        Ok(Some(text))
    }

    /// Open a block region.
    pub fn open_block(&mut self, tag: BlockTag) -> BlockEmission {
        let was_suppressed = self.suppressed();

        if tag == BlockTag::Comment {
            let already_open = std::mem::replace(&mut self.block_comment, true);
            if !self.draft.is_draft() {
                return BlockEmission::Drop;
            }
            if !already_open {
                self.colors.push(Color::Cyan);
            }
        }
        if was_suppressed {
            return BlockEmission::Drop;
        }
        if tag == BlockTag::Box {
            self.box_used = true;
        }

        self.block_emission(tag, Edge::Open)
    }

    /// Close a block region.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnclosedInline`] when inline regions are still
    /// open; inline regions never span a block region boundary.
    pub fn close_block(&mut self, tag: BlockTag) -> Result<BlockEmission, FilterError> {
        if !self.inline_stack.is_empty() {
            return Err(FilterError::UnclosedInline {
                open: self.open_inline_tags(),
                closing: tag,
                position: self.position,
            });
        }

        if tag == BlockTag::Comment {
            let was_open = std::mem::take(&mut self.block_comment);
            if !self.draft.is_draft() {
                return Ok(BlockEmission::Drop);
            }
            if was_open {
                self.colors.pop();
            }
        } else if self.suppressed() {
            return Ok(BlockEmission::Drop);
        }

        Ok(self.block_emission(tag, Edge::Close))
    }

    fn block_emission(&self, tag: BlockTag, edge: Edge) -> BlockEmission {
        match self.backend.block_fragments(tag) {
            Some(fragments) => BlockEmission::Raw(
                match edge {
                    Edge::Open => fragments.open,
                    Edge::Close => fragments.close,
                }
                .to_owned(),
            ),
            None => BlockEmission::Keep,
        }
    }
}
