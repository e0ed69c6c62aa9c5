use std::str::FromStr;

use once_cell::sync::OnceCell;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

type ReloadHandle = Box<dyn Fn(&str) -> Result<(), LoggingError> + Sync + Send>;

static RELOAD_HANDLE: OnceCell<ReloadHandle> = OnceCell::new();

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
	#[default]
	Default,
	Json,
	Pretty,
	Compact,
}

impl FromStr for Mode {
	type Err = LoggingError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"default" => Ok(Self::Default),
			"json" => Ok(Self::Json),
			"pretty" => Ok(Self::Pretty),
			"compact" => Ok(Self::Compact),
			_ => Err(LoggingError::UnknownMode(s.to_owned())),
		}
	}
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
	#[error("unknown logging mode: {0}")]
	UnknownMode(String),
	#[error("invalid log level: {0}")]
	InvalidLevel(#[from] tracing_subscriber::filter::ParseError),
	#[error("failed to init logger: {0}")]
	Init(#[from] tracing_subscriber::util::TryInitError),
	#[error("failed to reload logger: {0}")]
	Reload(#[from] tracing_subscriber::reload::Error),
}

/// Installs the fmt subscriber for `$builder` and returns a closure that swaps its filter.
macro_rules! install {
	($builder:expr, $filter:expr) => {{
		let subscriber = $builder
			.with_writer(std::io::stderr)
			.with_line_number(true)
			.with_file(true)
			.with_env_filter($filter)
			.with_filter_reloading();

		let handle = subscriber.reload_handle();

		subscriber.finish().try_init()?;

		Ok::<_, LoggingError>(Box::new(move |level: &str| {
			handle.reload(EnvFilter::from_str(level)?)?;
			Ok(())
		}) as ReloadHandle)
	}};
}

/// Installs the global subscriber on the first call. Later calls only change the level, the
/// mode is fixed by the first call.
pub fn init(level: &str, mode: Mode) -> Result<(), LoggingError> {
	let reload = RELOAD_HANDLE.get_or_try_init(|| {
		let filter = EnvFilter::from_str(level)?;

		match mode {
			Mode::Default => install!(tracing_subscriber::fmt(), filter),
			Mode::Json => install!(tracing_subscriber::fmt().json(), filter),
			Mode::Pretty => install!(tracing_subscriber::fmt().pretty(), filter),
			Mode::Compact => install!(tracing_subscriber::fmt().compact(), filter),
		}
	})?;

	reload(level)
}
