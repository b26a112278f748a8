//! Defaults for figure rendering.

/// Directory figures are cached in, before `~` expansion.
pub const DEFAULT_FIGURES_DIR: &str = "~/tmp/pandoc/Figures";

/// LaTeX engine used to typeset the standalone picture.
pub const DEFAULT_LATEX: &str = "pdflatex";

/// ImageMagick command used to rasterise PDFs.
pub const DEFAULT_CONVERT: &str = "convert";

/// Rasterisation density for PNG figures, in dots per inch.
pub const DEFAULT_DENSITY: u32 = 300;

/// Pandoc executable used to format captions.
pub const DEFAULT_PANDOC: &str = "pandoc";

/// Base name of the generated LaTeX source inside the scratch directory.
pub(crate) const SOURCE_STEM: &str = "tikz";
