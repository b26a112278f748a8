//! Filtering one document from stdin to stdout.

use std::io::{self, Write};

use marginalia_ast::Pandoc;
use marginalia_config::{CliSettings, Config};
use marginalia_diagrams::{PandocCaptionFormatter, TikzRenderer};
use marginalia_filter::{Backend, Filter};
use tracing::info;

use crate::Cli;
use crate::error::CliError;
use crate::output::Output;

/// Filtered document ready to write.
#[derive(Debug)]
pub(crate) struct Filtered {
    pub json: String,
    pub warnings: Vec<String>,
}

impl Cli {
    /// Filter stdin to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the input is not a pandoc
    /// document, or its annotation tags are malformed. Nothing is written to
    /// stdout in that case.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let draft = self.resolve_draft();
        let format = self.format.unwrap_or_default();

        let cli_settings = CliSettings {
            figures_dir: self.figures_dir,
            font: self.font,
            draft,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            info!(path = %path.display(), "Loaded configuration");
        }

        let input = io::read_to_string(io::stdin().lock())?;
        let filtered = filter_json(&input, &format, &config)?;

        for warning in &filtered.warnings {
            output.warning(&format!("Warning: {warning}"));
        }

        let mut stdout = io::stdout().lock();
        stdout.write_all(filtered.json.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }

    /// Resolve draft override from `--draft`/`--no-draft`.
    fn resolve_draft(&self) -> Option<bool> {
        if self.draft {
            Some(true)
        } else if self.no_draft {
            Some(false)
        } else {
            None
        }
    }
}

/// Build the filter for `backend` from configuration.
fn build_filter(backend: Backend, config: &Config) -> Filter {
    let renderer = TikzRenderer::new(&config.figures_dir)
        .with_latex(&config.diagrams.latex)
        .with_convert(&config.diagrams.convert)
        .with_density(config.diagrams.density);

    let filter = Filter::new(backend)
        .with_diagrams(renderer)
        .with_captions(PandocCaptionFormatter::new(&config.captions.pandoc))
        .with_default_font(&config.diagrams.default_font);

    match config.draft {
        Some(draft) => filter.with_draft(draft),
        None => filter,
    }
}

/// Run the filter over a JSON document.
pub(crate) fn filter_json(input: &str, format: &str, config: &Config) -> Result<Filtered, CliError> {
    let document = Pandoc::from_json(input)?;
    let backend = Backend::from_format(format);

    let output = build_filter(backend, config).run(document)?;

    Ok(Filtered {
        json: output.document.to_json()?,
        warnings: output.warnings,
    })
}
