//! TikZ figures for Marginalia.
//!
//! This crate provides the external-process side of figure handling:
//! - [`TikzRenderer`] implements [`DiagramRenderer`](marginalia_filter::DiagramRenderer)
//!   by typesetting pictures with a LaTeX engine and caching the results
//! - [`PandocCaptionFormatter`] implements
//!   [`CaptionFormatter`](marginalia_filter::CaptionFormatter) by running
//!   captions through pandoc
//!
//! # Example
//!
//! ```no_run
//! use marginalia_ast::Pandoc;
//! use marginalia_diagrams::{PandocCaptionFormatter, TikzRenderer};
//! use marginalia_filter::{Backend, Filter};
//!
//! let doc = Pandoc::new(Vec::new());
//! let output = Filter::new(Backend::Latex)
//!     .with_diagrams(TikzRenderer::new("/tmp/figures").with_density(150))
//!     .with_captions(PandocCaptionFormatter::default())
//!     .run(doc)
//!     .unwrap();
//! ```

mod caption;
mod consts;
mod error;
mod key;
mod tikz;

pub use caption::PandocCaptionFormatter;
pub use consts::{
    DEFAULT_CONVERT, DEFAULT_DENSITY, DEFAULT_FIGURES_DIR, DEFAULT_LATEX, DEFAULT_PANDOC,
};
pub use error::DiagramError;
pub use key::FigureKey;
pub use tikz::TikzRenderer;
