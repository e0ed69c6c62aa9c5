use hls::DocumentKind;

use crate::cli::{Context, Invokable};
use crate::display;

#[derive(Debug, clap::Args)]
pub struct Check {
	/// The playlists to validate, `-` reads stdin
	#[clap(required = true, num_args = 1..)]
	paths: Vec<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct Report {
	pub path: String,
	pub valid: bool,
	pub kind: Option<DocumentKind>,
	pub error: Option<String>,
}

impl Report {
	fn check(ctx: &Context, path: &str) -> Self {
		match ctx.load(path) {
			Ok(playlist) => Self {
				path: path.to_owned(),
				valid: true,
				kind: Some(playlist.kind()),
				error: None,
			},
			Err(err) => {
				tracing::warn!(path, "invalid playlist: {:#}", err);

				Self {
					path: path.to_owned(),
					valid: false,
					kind: None,
					error: Some(format!("{:#}", err)),
				}
			}
		}
	}
}

impl Invokable for Check {
	fn invoke(&self, ctx: &Context) -> anyhow::Result<()> {
		let reports = self.paths.iter().map(|path| Report::check(ctx, path)).collect::<Vec<_>>();

		if ctx.json {
			println!("{}", display::render_array(&reports, true)?);
		}

		let failed = reports.iter().filter(|r| !r.valid).count();
		if failed > 0 {
			anyhow::bail!("{} of {} playlists are invalid", failed, reports.len());
		}

		tracing::info!(count = reports.len(), "all playlists are valid");

		Ok(())
	}
}
