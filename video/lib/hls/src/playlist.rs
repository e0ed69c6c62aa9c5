use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::define::{DocumentKind, MediaPlaylistType, MediaType};
use crate::errors::{ErrorKind, ParseError};
use crate::parser::{Accumulated, ParseOptions, Parser};
use crate::resolve::resolve;
use crate::tags::{ByteRange, DateRange, IFrameStreamInf, Inf, Key, Map, Media, SessionData, SessionKey, Start, StreamInf};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Playlist {
	Media(MediaPlaylist),
	Master(MasterPlaylist),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaPlaylist {
	pub version: Option<u64>,
	pub independent_segments: bool,
	pub start: Option<Start>,
	pub target_duration: u64,
	pub media_sequence: Option<u64>,
	pub discontinuity_sequence: Option<u64>,
	pub end_list: bool,
	pub playlist_type: Option<MediaPlaylistType>,
	pub i_frames_only: bool,
	pub segments: Vec<MediaSegment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaSegment {
	pub info: Inf,
	pub uri: String,
	pub byte_range: Option<ByteRange>,
	pub discontinuity: bool,
	/// The key in effect for this segment, `None` when it is not encrypted.
	pub key: Option<Key>,
	pub map: Option<Map>,
	pub program_date_time: Option<DateTime<FixedOffset>>,
	pub date_range: Option<DateRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MasterPlaylist {
	pub version: Option<u64>,
	pub independent_segments: bool,
	pub start: Option<Start>,
	pub renditions: Vec<Arc<RenditionGroup>>,
	pub variants: Vec<VariantStream>,
	pub i_frame_streams: Vec<IFrameStream>,
	pub session_data: Vec<SessionData>,
	pub session_keys: Vec<SessionKey>,
}

/// Every `#EXT-X-MEDIA` sharing one GROUP-ID and TYPE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenditionGroup {
	pub group_id: String,
	pub media_type: MediaType,
	pub renditions: Vec<Media>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantStream {
	pub info: StreamInf,
	pub uri: String,
	pub audio: Option<Arc<RenditionGroup>>,
	pub video: Option<Arc<RenditionGroup>>,
	pub subtitles: Option<Arc<RenditionGroup>>,
	pub closed_captions: Option<Arc<RenditionGroup>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IFrameStream {
	pub info: IFrameStreamInf,
	pub video: Option<Arc<RenditionGroup>>,
}

impl Playlist {
	pub fn parse(content: &str) -> Result<Self, ParseError> {
		Self::parse_with(content, ParseOptions::default())
	}

	pub fn parse_with(content: &str, options: ParseOptions) -> Result<Self, ParseError> {
		Parser::new(options).parse(content)
	}

	pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
		let content = std::str::from_utf8(bytes).map_err(ErrorKind::from)?;
		Self::parse(content)
	}

	/// Builds a media playlist from directives whose target duration has already been validated.
	pub(crate) fn media(acc: Accumulated, target_duration: u64) -> Self {
		let media = acc.media;
		Self::Media(MediaPlaylist {
			version: acc.version,
			independent_segments: acc.independent_segments,
			start: acc.start,
			target_duration,
			media_sequence: media.media_sequence,
			discontinuity_sequence: media.discontinuity_sequence,
			end_list: media.end_list,
			playlist_type: media.playlist_type,
			i_frames_only: media.i_frames_only,
			segments: media.segments,
		})
	}

	pub(crate) fn master(acc: Accumulated) -> Result<Self, ErrorKind> {
		let master = acc.master;
		let resolved = resolve(master.medias, master.variants, master.i_frame_streams)?;

		Ok(Self::Master(MasterPlaylist {
			version: acc.version,
			independent_segments: acc.independent_segments,
			start: acc.start,
			renditions: resolved.renditions,
			variants: resolved.variants,
			i_frame_streams: resolved.i_frame_streams,
			session_data: master.session_data,
			session_keys: master.session_keys,
		}))
	}

	pub fn kind(&self) -> DocumentKind {
		match self {
			Self::Media(_) => DocumentKind::Media,
			Self::Master(_) => DocumentKind::Master,
		}
	}

	pub fn version(&self) -> Option<u64> {
		match self {
			Self::Media(p) => p.version,
			Self::Master(p) => p.version,
		}
	}

	pub fn as_media(&self) -> Option<&MediaPlaylist> {
		match self {
			Self::Media(p) => Some(p),
			Self::Master(_) => None,
		}
	}

	pub fn as_master(&self) -> Option<&MasterPlaylist> {
		match self {
			Self::Master(p) => Some(p),
			Self::Media(_) => None,
		}
	}
}

impl FromStr for Playlist {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl MediaPlaylist {
	/// The sequence number of the first segment.
	pub fn first_sequence_number(&self) -> u64 {
		self.media_sequence.unwrap_or_default()
	}

	/// Total duration of all segments, in seconds.
	pub fn duration(&self) -> f64 {
		self.segments.iter().map(|s| s.info.duration).sum()
	}
}

impl MasterPlaylist {
	pub fn rendition_group(&self, group_id: &str, media_type: MediaType) -> Option<&Arc<RenditionGroup>> {
		self.renditions
			.iter()
			.find(|g| g.group_id == group_id && g.media_type == media_type)
	}
}
