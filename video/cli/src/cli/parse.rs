use crate::cli::{Context, Invokable};
use crate::display;

#[derive(Debug, clap::Args)]
pub struct Parse {
	/// The playlist to parse, `-` reads stdin
	#[clap(default_value = "-")]
	path: String,

	/// The output format, --json always prints json
	#[clap(long, value_enum, default_value = "m3u8")]
	format: Format,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
	M3u8,
	Json,
	Yaml,
}

impl Parse {
	fn format(&self, ctx: &Context) -> Format {
		if ctx.json {
			Format::Json
		} else {
			self.format
		}
	}
}

impl Invokable for Parse {
	fn invoke(&self, ctx: &Context) -> anyhow::Result<()> {
		let playlist = ctx.load(&self.path)?;

		let output = match self.format(ctx) {
			Format::M3u8 => playlist.to_m3u8(),
			Format::Json => display::render(&playlist, true)?,
			Format::Yaml => display::render(&playlist, false)?,
		};

		println!("{}", output.trim_end());

		Ok(())
	}
}
