//! Annotation filter for pandoc documents.
//!
//! Authors mark up drafts with a small tag vocabulary: comments, margin
//! notes, highlights, fix-me notes, small caps, centered and boxed blocks,
//! speaker notes, labels, references, index entries, no-indent paragraphs and
//! TikZ pictures. This crate rewrites those tags into raw markup for the
//! output format, driven by the document's `draft` flag:
//!
//! - in draft mode annotations are rendered visibly, color-coded;
//! - in publish mode comments and margin notes disappear while highlighted
//!   and fix-me text survives without its markup.
//!
//! # Architecture
//!
//! - `tags`: the closed tag vocabulary ([`InlineTag`], [`BlockTag`], [`Marker`])
//! - [`Backend`]: per-format render tables
//! - [`DraftMode`]: the draft/publish policy
//! - `state`: block and inline region state machines
//! - `walker`: the pre-order document rewrite
//! - [`Filter`]: the harness tying a run together
//!
//! TikZ pictures are delegated to a [`DiagramRenderer`] and figure captions
//! to a [`CaptionFormatter`]; the `marginalia-diagrams` crate provides the
//! implementations that shell out to LaTeX and pandoc.
//!
//! # Example
//!
//! ```
//! use marginalia_ast::{Block, Inline, Pandoc};
//! use marginalia_filter::{Backend, Filter};
//!
//! let doc = Pandoc::new(vec![Block::Para(vec![
//!     Inline::raw("html", "<highlight>"),
//!     Inline::Str("important".to_owned()),
//!     Inline::raw("html", "</highlight>"),
//! ])]);
//!
//! let output = Filter::new(Backend::Html).with_draft(true).run(doc).unwrap();
//! assert_eq!(
//!     output.document.blocks,
//!     vec![Block::Para(vec![
//!         Inline::raw("html", "<mark>"),
//!         Inline::Str("important".to_owned()),
//!         Inline::raw("html", "</mark>"),
//!     ])]
//! );
//! ```

mod backend;
mod diagram;
mod draft;
mod error;
mod filter;
mod state;
mod tags;
mod walker;

pub use backend::{Backend, Fragments};
pub use diagram::{
    CAPTION_ATTR, CaptionFormatter, DiagramRenderer, DiagramRequest, LIBRARY_ATTR,
    PlainCaptionFormatter, TIKZ_CLASS, is_tikz,
};
pub use draft::{DRAFT_KEY, DraftMode};
pub use error::{FilterError, Position};
pub use filter::{DEFAULT_FONT, Filter, FilterOutput};
pub use state::RegionMode;
pub use tags::{BlockTag, Color, CrossRefKind, Edge, InlineTag, Marker, SpanAnnotation};
