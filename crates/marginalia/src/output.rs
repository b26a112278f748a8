//! Colored terminal output utilities.

use console::{Style, Term};

/// Terminal output formatter.
///
/// Writes to stderr; stdout carries the filtered document.
pub(crate) struct Output {
    term: Term,
    yellow: Style,
    red: Style,
}

impl Output {
    /// Create a new output formatter.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
        }
    }

    /// Print a warning message (yellow).
    pub(crate) fn warning(&self, msg: &str) {
        let _ = self.term.write_line(&self.yellow.apply_to(msg).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }
}
