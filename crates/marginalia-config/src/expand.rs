//! Environment variable and home directory expansion for config values.

use std::borrow::Cow;

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::env(value)
        .map(Cow::into_owned)
        .map_err(|e| env_error(field, &e.var_name))
}

/// Expand a leading `~` and environment variable references.
pub(crate) fn expand_path(value: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::full(value)
        .map(Cow::into_owned)
        .map_err(|e| env_error(field, &e.var_name))
}

fn env_error(field: &str, var_name: &str) -> ConfigError {
    ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{var_name}}} not set"),
    }
}
