use anyhow::Context as _;
use binary_helper::logging;
use clap::Parser;
use cli::{Context, Invokable};
use config::AppConfig;

mod cli;
mod config;
mod display;

#[cfg(test)]
mod tests;

fn main() {
	if let Err(err) = start() {
		eprintln!("{:#}", err);
		std::process::exit(1);
	}
}

fn start() -> anyhow::Result<()> {
	let cli = cli::Cli::parse();

	let config = AppConfig::load(&cli)
		.map_err(|err| {
			// still report the failure through the logger
			let _ = logging::init("info", Default::default());

			err
		})
		.context("failed to load config")?;

	config.logging.init().context("failed to init logging")?;

	tracing::debug!(?config, "starting up");

	cli.command
		.invoke(&Context::new(&cli, &config))
		.context("failed to invoke command")
}
