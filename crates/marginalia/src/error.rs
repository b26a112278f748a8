//! CLI error types.

use marginalia_config::ConfigError;
use marginalia_filter::FilterError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid pandoc JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Filter(#[from] FilterError),
}
