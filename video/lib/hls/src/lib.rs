//! Parser and validator for HLS (`.m3u8`) media and master playlists.
//!
//! ```
//! let playlist = hls::parse("#EXTM3U\n#EXT-X-TARGETDURATION:10\n#EXTINF:9.5,\nseg1.ts\n#EXT-X-ENDLIST").unwrap();
//! let media = playlist.as_media().unwrap();
//!
//! assert_eq!(media.segments[0].uri, "seg1.ts");
//! assert!(media.end_list);
//! ```

#![forbid(unsafe_code)]

mod attributes;
mod define;
mod errors;
mod parser;
mod playlist;
mod resolve;
mod schema;
mod tags;
mod value;
mod writer;

pub use crate::attributes::{tokenize, MalformedAttributeList};
pub use crate::define::*;
pub use crate::errors::{ErrorKind, ParseError};
pub use crate::parser::{ParseOptions, Parser};
pub use crate::playlist::{
	IFrameStream, MasterPlaylist, MediaPlaylist, MediaSegment, Playlist, RenditionGroup, VariantStream,
};
pub use crate::schema::{descriptor_for, parse_fields, AttributeField, Directive, Fields, PayloadShape, Scope, TagDescriptor};
pub use crate::tags::{
	ByteRange, DateRange, IFrameStreamInf, Inf, Key, Map, Media, SessionData, SessionKey, Start, StreamInf, Tag,
};
pub use crate::value::{convert, unquote, InvalidValue, Value, ValueKind};

/// Parses a playlist with the default options.
pub fn parse(content: &str) -> Result<Playlist, ParseError> {
	Playlist::parse(content)
}

pub fn parse_with(content: &str, options: ParseOptions) -> Result<Playlist, ParseError> {
	Playlist::parse_with(content, options)
}

#[cfg(test)]
mod tests;
