use binary_helper::config::{load_or_default, LoggingConfig};
use hls::ParseOptions;

use crate::cli::Cli;

#[derive(Debug, Default, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
	/// The logging configuration
	pub logging: LoggingConfig,

	/// The playlist parser configuration
	pub parser: ParseOptions,
}

impl AppConfig {
	/// Loads the config file, then applies the command line and environment overrides.
	pub fn load(cli: &Cli) -> anyhow::Result<Self> {
		let config: Self = load_or_default(cli.config.as_ref())?;
		Ok(config.with_overrides(cli))
	}

	pub fn with_overrides(mut self, cli: &Cli) -> Self {
		if let Some(level) = &cli.log_level {
			self.logging.level = level.clone();
		}

		if let Some(mode) = cli.log_mode {
			self.logging.mode = mode;
		}

		if cli.lenient {
			self.parser.lenient_uris = true;
		}

		self
	}
}
