//! Caption formatting through pandoc.

use std::io::{self, Write};
use std::process::{Command, Stdio};

use marginalia_ast::{Block, Inline, Pandoc};
use marginalia_filter::CaptionFormatter;

use crate::consts::DEFAULT_PANDOC;
use crate::error::DiagramError;

/// Formats captions as Markdown by running `pandoc -f markdown -t json`.
#[derive(Debug, Clone)]
pub struct PandocCaptionFormatter {
    program: String,
}

impl Default for PandocCaptionFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_PANDOC)
    }
}

impl PandocCaptionFormatter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Convert caption Markdown into inlines.
    ///
    /// # Errors
    ///
    /// Returns [`DiagramError`] when pandoc cannot be run or its output is
    /// not a document.
    pub fn format_caption(&self, caption: &str) -> Result<Vec<Inline>, DiagramError> {
        let mut child = Command::new(&self.program)
            .args(["-f", "markdown", "-t", "json"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| DiagramError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(caption.as_bytes())?;
        }
        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(DiagramError::Command {
                program: self.program.clone(),
                status: output.status.to_string(),
                detail: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        let json = String::from_utf8_lossy(&output.stdout);
        let doc = Pandoc::from_json(&json)?;
        Ok(first_inlines(doc.blocks))
    }
}

impl CaptionFormatter for PandocCaptionFormatter {
    fn format(&self, caption: &str) -> io::Result<Vec<Inline>> {
        Ok(self.format_caption(caption)?)
    }
}

/// Inline content of the first block, if it is a paragraph.
fn first_inlines(blocks: Vec<Block>) -> Vec<Inline> {
    match blocks.into_iter().next() {
        Some(Block::Para(inlines) | Block::Plain(inlines)) => inlines,
        _ => Vec::new(),
    }
}
