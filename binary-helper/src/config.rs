use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::logging;

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
	/// The log level to use, this is a tracing env filter
	pub level: String,

	/// What logging mode we should use
	pub mode: logging::Mode,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			mode: logging::Mode::Default,
		}
	}
}

impl LoggingConfig {
	pub fn init(&self) -> Result<(), logging::LoggingError> {
		logging::init(&self.level, self.mode)
	}
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("failed to read config file {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("invalid config file {path}: {source}")]
	Toml {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},
}

/// Reads a TOML config file. Keys the file leaves out keep the values of `T::default()`.
pub fn load_file<T: DeserializeOwned + Default>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
	let path = path.as_ref();

	let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
		path: path.to_owned(),
		source,
	})?;

	let config = parse_str(&content).map_err(|source| ConfigError::Toml {
		path: path.to_owned(),
		source,
	})?;

	tracing::debug!(path = %path.display(), "loaded config file");

	Ok(config)
}

/// Loads `path` when one is given, otherwise returns the defaults.
pub fn load_or_default<T: DeserializeOwned + Default>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError> {
	match path {
		Some(path) => load_file(path),
		None => Ok(T::default()),
	}
}

pub fn parse_str<T: DeserializeOwned>(content: &str) -> Result<T, toml::de::Error> {
	toml::from_str(content)
}
