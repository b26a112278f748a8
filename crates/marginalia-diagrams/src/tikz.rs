//! TikZ rendering through a LaTeX engine.
//!
//! Each picture is wrapped in a `standalone` document, typeset in a scratch
//! directory, and the resulting PDF is either copied into the figures
//! directory or rasterised to PNG. Figures are named by their
//! [`FigureKey`] hash, so an existing file is reused without running LaTeX.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use marginalia_filter::{DiagramRenderer, DiagramRequest};
use tracing::debug;

use crate::consts::{DEFAULT_CONVERT, DEFAULT_DENSITY, DEFAULT_LATEX, SOURCE_STEM};
use crate::error::DiagramError;
use crate::key::FigureKey;

/// Number of output lines kept when an external program fails.
const DETAIL_LINES: usize = 20;

/// Renders TikZ pictures with `pdflatex` and `convert`.
#[derive(Debug, Clone)]
pub struct TikzRenderer {
    figures_dir: PathBuf,
    latex: String,
    convert: String,
    density: u32,
}

impl TikzRenderer {
    /// Create a renderer caching figures in `figures_dir`.
    ///
    /// The directory is created on first render.
    pub fn new(figures_dir: impl Into<PathBuf>) -> Self {
        Self {
            figures_dir: figures_dir.into(),
            latex: DEFAULT_LATEX.to_owned(),
            convert: DEFAULT_CONVERT.to_owned(),
            density: DEFAULT_DENSITY,
        }
    }

    /// Use a different LaTeX engine.
    #[must_use]
    pub fn with_latex(mut self, program: impl Into<String>) -> Self {
        self.latex = program.into();
        self
    }

    /// Use a different rasteriser.
    #[must_use]
    pub fn with_convert(mut self, program: impl Into<String>) -> Self {
        self.convert = program.into();
        self
    }

    /// Set the PNG rasterisation density in dots per inch.
    #[must_use]
    pub fn with_density(mut self, density: u32) -> Self {
        self.density = density;
        self
    }

    #[must_use]
    pub fn figures_dir(&self) -> &Path {
        &self.figures_dir
    }

    /// Path the figure for `request` is stored at.
    #[must_use]
    pub fn figure_path(&self, request: &DiagramRequest) -> PathBuf {
        let key = FigureKey {
            code: &request.code,
            font: &request.font,
        };
        self.figures_dir
            .join(format!("{}.{}", key.compute_hash(), request.extension()))
    }

    /// Render a figure, or return the cached one.
    ///
    /// # Errors
    ///
    /// Returns [`DiagramError`] when the figures directory cannot be written
    /// or an external program fails.
    pub fn render_figure(&self, request: &DiagramRequest) -> Result<PathBuf, DiagramError> {
        let path = self.figure_path(request);
        if path.is_file() {
            debug!(path = %path.display(), "Figure cache hit");
            return Ok(path);
        }

        if !self.figures_dir.is_dir() {
            fs::create_dir_all(&self.figures_dir)?;
            debug!(dir = %self.figures_dir.display(), "Created figures directory");
        }

        let scratch = tempfile::tempdir()?;
        let source = scratch.path().join(format!("{SOURCE_STEM}.tex"));
        fs::write(&source, standalone_document(request))?;

        run(Command::new(&self.latex)
            .arg("-interaction=nonstopmode")
            .arg(&source)
            .current_dir(scratch.path()))?;

        let pdf = scratch.path().join(format!("{SOURCE_STEM}.pdf"));
        if request.vector {
            fs::copy(&pdf, &path)?;
        } else {
            run(Command::new(&self.convert)
                .arg("-density")
                .arg(self.density.to_string())
                .arg(&pdf)
                .arg("-quality")
                .arg("100")
                .arg(&path))?;
        }

        debug!(path = %path.display(), "Created figure");
        Ok(path)
    }
}

impl DiagramRenderer for TikzRenderer {
    fn render(&self, request: &DiagramRequest) -> io::Result<PathBuf> {
        Ok(self.render_figure(request)?)
    }
}

/// Wrap a picture in a standalone LaTeX document.
fn standalone_document(request: &DiagramRequest) -> String {
    let mut doc = String::from("\\documentclass{standalone}\n");
    doc.push_str(&format!("\\usepackage{{{}}}\n", request.font));
    doc.push_str("\\usepackage{tikz}\n");
    if let Some(library) = request.library.as_deref().filter(|l| !l.is_empty()) {
        doc.push_str(&format!("\\usetikzlibrary{{{library}}}\n"));
    }
    doc.push_str("\\begin{document}\n");
    doc.push_str(&request.code);
    doc.push_str("\n\\end{document}\n");
    doc
}

/// Run a command to completion, failing on a non-zero exit.
fn run(command: &mut Command) -> Result<Output, DiagramError> {
    let program = command.get_program().to_string_lossy().into_owned();
    let output = command.output().map_err(|source| DiagramError::Spawn {
        program: program.clone(),
        source,
    })?;
    if output.status.success() {
        return Ok(output);
    }

    Err(DiagramError::Command {
        program,
        status: output.status.to_string(),
        detail: tail(&output),
    })
}

/// Last lines of a program's combined output.
fn tail(output: &Output) -> String {
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(DETAIL_LINES);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn request(vector: bool) -> DiagramRequest {
        DiagramRequest {
            code: "\\begin{tikzpicture}\\draw (0,0) -- (1,1);\\end{tikzpicture}".to_owned(),
            font: "fbb".to_owned(),
            library: Some("arrows.meta".to_owned()),
            vector,
        }
    }

    #[test]
    fn test_standalone_document() {
        assert_eq!(
            standalone_document(&request(true)),
            "\\documentclass{standalone}\n\
             \\usepackage{fbb}\n\
             \\usepackage{tikz}\n\
             \\usetikzlibrary{arrows.meta}\n\
             \\begin{document}\n\
             \\begin{tikzpicture}\\draw (0,0) -- (1,1);\\end{tikzpicture}\n\
             \\end{document}\n"
        );
    }

    #[test]
    fn test_standalone_document_without_library() {
        let mut req = request(true);
        req.library = None;

        let doc = standalone_document(&req);

        assert!(!doc.contains("usetikzlibrary"));
    }

    #[test]
    fn test_figure_path_uses_hash_and_extension() {
        let renderer = TikzRenderer::new("/figs");
        let key = FigureKey {
            code: &request(true).code,
            font: "fbb",
        }
        .compute_hash();

        assert_eq!(
            renderer.figure_path(&request(true)),
            PathBuf::from(format!("/figs/{key}.pdf"))
        );
        assert_eq!(
            renderer.figure_path(&request(false)),
            PathBuf::from(format!("/figs/{key}.png"))
        );
    }

    #[test]
    fn test_cached_figure_skips_latex() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = TikzRenderer::new(dir.path()).with_latex("marginalia-no-such-latex");
        let cached = renderer.figure_path(&request(false));
        fs::write(&cached, b"png").unwrap();

        let path = renderer.render(&request(false)).unwrap();

        assert_eq!(path, cached);
    }

    #[test]
    fn test_missing_latex_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let figures = dir.path().join("nested").join("Figures");
        let renderer = TikzRenderer::new(&figures).with_latex("marginalia-no-such-latex");

        let err = renderer.render_figure(&request(true)).unwrap_err();

        assert!(matches!(err, DiagramError::Spawn { ref program, .. } if program == "marginalia-no-such-latex"));
        assert!(figures.is_dir());
    }

    #[test]
    fn test_trait_error_is_io_other() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = TikzRenderer::new(dir.path()).with_latex("marginalia-no-such-latex");

        let err = renderer.render(&request(true)).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::Other);
        assert!(err.to_string().contains("marginalia-no-such-latex"));
    }
}
