use std::io::Read;
use std::path::PathBuf;

use anyhow::Context as _;
use binary_helper::logging::Mode;
use hls::{ParseOptions, Playlist};

use crate::config::AppConfig;

pub mod check;
pub mod parse;

/// A helper tool to parse and validate HLS playlists
#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
	/// The config file path (TOML)
	#[clap(long, env = "HLS_CONFIG_PATH")]
	pub config: Option<PathBuf>,

	/// The log level, a tracing env filter
	#[clap(long, env = "HLS_LOG_LEVEL")]
	pub log_level: Option<String>,

	/// The log output mode (default, json, pretty, compact)
	#[clap(long, env = "HLS_LOG_MODE")]
	pub log_mode: Option<Mode>,

	/// Ignore URI lines that do not belong to a segment or variant
	#[clap(long)]
	pub lenient: bool,

	/// Json output
	#[clap(long)]
	pub json: bool,

	#[clap(subcommand)]
	pub command: Commands,
}

pub trait Invokable {
	fn invoke(&self, ctx: &Context) -> anyhow::Result<()>;
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
	/// Parse a playlist and print it
	Parse(parse::Parse),

	/// Validate one or more playlists
	Check(check::Check),
}

impl Invokable for Commands {
	fn invoke(&self, ctx: &Context) -> anyhow::Result<()> {
		match self {
			Self::Parse(cmd) => cmd.invoke(ctx),
			Self::Check(cmd) => cmd.invoke(ctx),
		}
	}
}

/// What every command needs from the command line and the config file.
#[derive(Debug, Clone, Copy)]
pub struct Context {
	pub options: ParseOptions,
	pub json: bool,
}

impl Context {
	pub fn new(cli: &Cli, config: &AppConfig) -> Self {
		Self {
			options: config.parser,
			json: cli.json,
		}
	}

	/// Reads a playlist from a file, or from stdin when `path` is `-`.
	pub fn read(&self, path: &str) -> anyhow::Result<String> {
		if path == "-" {
			let mut content = String::new();
			std::io::stdin()
				.read_to_string(&mut content)
				.context("failed to read stdin")?;
			return Ok(content);
		}

		std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))
	}

	pub fn load(&self, path: &str) -> anyhow::Result<Playlist> {
		let content = self.read(path)?;
		let playlist = hls::parse_with(&content, self.options).with_context(|| format!("failed to parse {path}"))?;

		tracing::info!(path, kind = %playlist.kind(), "parsed playlist");

		Ok(playlist)
	}
}
