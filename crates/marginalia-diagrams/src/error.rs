//! Figure rendering errors.

use std::io;

/// Error producing a figure or formatting its caption.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DiagramError {
    /// Filesystem error in the figures or scratch directory.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// External program could not be started.
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// External program exited unsuccessfully.
    #[error("{program} failed with {status}: {detail}")]
    Command {
        program: String,
        status: String,
        /// Last lines of the program's output.
        detail: String,
    },

    /// Pandoc produced JSON that is not a document.
    #[error("Invalid caption JSON: {0}")]
    Caption(#[from] serde_json::Error),
}

impl From<DiagramError> for io::Error {
    fn from(err: DiagramError) -> Self {
        match err {
            DiagramError::Io(e) => e,
            other => io::Error::other(other),
        }
    }
}
