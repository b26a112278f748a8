//! Configuration management for Marginalia.
//!
//! Parses `marginalia.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! `diagrams.figures_dir` additionally expands a leading `~` to the home
//! directory. Relative figure directories are resolved against the directory
//! holding the config file.

mod expand;

use marginalia_diagrams::{
    DEFAULT_CONVERT, DEFAULT_DENSITY, DEFAULT_FIGURES_DIR, DEFAULT_LATEX, DEFAULT_PANDOC,
};
use marginalia_filter::DEFAULT_FONT;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the figure cache directory.
    pub figures_dir: Option<PathBuf>,
    /// Override the default figure font.
    pub font: Option<String>,
    /// Force draft (`true`) or publish (`false`) mode.
    pub draft: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "marginalia.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Figure rendering configuration.
    pub diagrams: DiagramsConfig,
    /// Caption formatting configuration.
    pub captions: CaptionsConfig,

    /// Resolved figure cache directory (set after loading).
    #[serde(skip)]
    pub figures_dir: PathBuf,
    /// Draft mode override from the command line.
    #[serde(skip)]
    pub draft: Option<bool>,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Figure rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DiagramsConfig {
    /// Figure cache directory as written in the file.
    pub figures_dir: String,
    /// Font package used when the document sets no `fontfamily`.
    pub default_font: String,
    /// LaTeX engine.
    pub latex: String,
    /// Rasteriser for PNG figures.
    pub convert: String,
    /// Rasterisation density in dots per inch.
    pub density: u32,
}

impl Default for DiagramsConfig {
    fn default() -> Self {
        Self {
            figures_dir: DEFAULT_FIGURES_DIR.to_owned(),
            default_font: DEFAULT_FONT.to_owned(),
            latex: DEFAULT_LATEX.to_owned(),
            convert: DEFAULT_CONVERT.to_owned(),
            density: DEFAULT_DENSITY,
        }
    }
}

/// Caption formatting configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CaptionsConfig {
    /// Pandoc executable used to format captions.
    pub pandoc: String,
}

impl Default for CaptionsConfig {
    fn default() -> Self {
        Self {
            pandoc: DEFAULT_PANDOC.to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`diagrams.figures_dir`").
        field: String,
        /// Error message (e.g., "${`FIGURES`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `marginalia.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or a value fails validation.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_config(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()?
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(figures_dir) = &settings.figures_dir {
            self.figures_dir.clone_from(figures_dir);
        }
        if let Some(font) = &settings.font {
            self.diagrams.default_font.clone_from(font);
        }
        if let Some(draft) = settings.draft {
            self.draft = Some(draft);
        }
    }

    /// Search for config file in `start` and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().unwrap_or_default();
        let mut config = Self::default();
        config.resolve_paths(&cwd)?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if a program name is empty or the
    /// density is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        const MAX_DENSITY: u32 = 2400;

        require_non_empty(&self.diagrams.default_font, "diagrams.default_font")?;
        require_non_empty(&self.diagrams.latex, "diagrams.latex")?;
        require_non_empty(&self.diagrams.convert, "diagrams.convert")?;
        require_non_empty(&self.captions.pandoc, "captions.pandoc")?;

        let density = self.diagrams.density;
        if density == 0 {
            return Err(ConfigError::Validation(
                "diagrams.density must be greater than 0".to_owned(),
            ));
        }
        if density > MAX_DENSITY {
            return Err(ConfigError::Validation(format!(
                "diagrams.density cannot exceed {MAX_DENSITY}"
            )));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let diagrams = &mut self.diagrams;
        diagrams.default_font = expand::expand_env(&diagrams.default_font, "diagrams.default_font")?;
        diagrams.latex = expand::expand_env(&diagrams.latex, "diagrams.latex")?;
        diagrams.convert = expand::expand_env(&diagrams.convert, "diagrams.convert")?;
        self.captions.pandoc = expand::expand_env(&self.captions.pandoc, "captions.pandoc")?;
        Ok(())
    }

    /// Resolve the figure directory against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        let expanded = expand::expand_path(&self.diagrams.figures_dir, "diagrams.figures_dir")?;
        self.figures_dir = config_dir.join(expanded);
        Ok(())
    }
}
