use binary_helper::logging::Mode;
use clap::Parser;

use crate::cli::{Cli, Commands, Context};
use crate::config::AppConfig;
use crate::display;

#[test]
fn test_cli_overrides() {
	let cli = Cli::try_parse_from(["hls-cli", "--log-level", "hls=trace", "--log-mode", "json", "--lenient", "parse", "a.m3u8"])
		.unwrap();

	assert!(matches!(cli.command, Commands::Parse(_)));

	let config = AppConfig::default().with_overrides(&cli);
	assert_eq!(config.logging.level, "hls=trace");
	assert_eq!(config.logging.mode, Mode::Json);
	assert!(config.parser.lenient_uris);

	let ctx = Context::new(&cli, &config);
	assert!(ctx.options.lenient_uris);
	assert!(!ctx.json);
}

#[test]
fn test_check_requires_paths() {
	assert!(Cli::try_parse_from(["hls-cli", "check"]).is_err());
	assert!(Cli::try_parse_from(["hls-cli", "check", "a.m3u8", "b.m3u8"]).is_ok());
}

#[test]
fn test_render() {
	let playlist = hls::parse("#EXTM3U\n#EXT-X-TARGETDURATION:10\n#EXTINF:9.5,\nseg1.ts\n#EXT-X-ENDLIST").unwrap();

	let json: serde_json::Value = serde_json::from_str(&display::render(&playlist, true).unwrap()).unwrap();
	assert_eq!(json["__type"], "Playlist");
	assert_eq!(json["kind"], "media");
	assert_eq!(json["segments"][0]["uri"], "seg1.ts");

	let yaml = display::render(&playlist, false).unwrap();
	assert!(yaml.contains("__type: Playlist"));
}
