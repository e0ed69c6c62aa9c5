use std::str::FromStr;

use chrono::{DateTime, Duration, FixedOffset};
use serde::Serialize;

use crate::define::*;
use crate::errors::ErrorKind;
use crate::schema::Fields;
use crate::value::{InvalidValue, ValueKind};

/// One successfully parsed and validated directive.
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
	Version(u64),
	Inf(Inf),
	ByteRange(ByteRange),
	Discontinuity,
	Key(Key),
	Map(Map),
	ProgramDateTime(DateTime<FixedOffset>),
	DateRange(DateRange),
	TargetDuration(u64),
	MediaSequence(u64),
	DiscontinuitySequence(u64),
	EndList,
	PlaylistType(MediaPlaylistType),
	IFramesOnly,
	Media(Media),
	StreamInf(StreamInf),
	IFrameStreamInf(IFrameStreamInf),
	SessionData(SessionData),
	SessionKey(SessionKey),
	IndependentSegments,
	Start(Start),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inf {
	pub duration: f64,
	pub title: Option<String>,
}

impl Inf {
	pub(crate) fn from_fields(mut fields: Fields) -> Result<Self, ErrorKind> {
		Ok(Self {
			duration: fields.required_float("duration")?,
			title: fields.string("title"),
		})
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ByteRange {
	pub length: u64,
	pub offset: Option<u64>,
}

impl ByteRange {
	pub(crate) fn from_fields(mut fields: Fields) -> Result<Self, ErrorKind> {
		Ok(Self {
			length: fields.required_integer("length")?,
			offset: fields.integer("offset"),
		})
	}
}

impl FromStr for ByteRange {
	type Err = InvalidValue;

	/// Parses `<length>[@<offset>]`.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let invalid = || InvalidValue::new(ValueKind::String, s);

		let (length, offset) = match s.split_once('@') {
			Some((length, offset)) => (length, Some(offset)),
			None => (s, None),
		};

		Ok(Self {
			length: length.trim().parse().map_err(|_| invalid())?,
			offset: offset.map(|o| o.trim().parse().map_err(|_| invalid())).transpose()?,
		})
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Key {
	pub method: EncryptionMethod,
	pub uri: Option<String>,
	pub iv: Option<Vec<u8>>,
	pub key_format: Option<String>,
	pub key_format_versions: Option<String>,
}

impl Key {
	pub(crate) fn from_fields(mut fields: Fields) -> Result<Self, ErrorKind> {
		let method = fields.required_token("method")?;

		if method == EncryptionMethod::None {
			if let Some(field) = fields.keys().next() {
				return Err(ErrorKind::ForbiddenField {
					directive: EXT_X_KEY,
					field,
					reason: "METHOD=NONE allows no other attributes",
				});
			}
		} else if !fields.contains("uri") {
			return Err(ErrorKind::MissingRequiredField {
				directive: EXT_X_KEY,
				field: "URI",
			});
		}

		Ok(Self {
			method,
			uri: fields.string("uri"),
			iv: fields.hex("iv"),
			key_format: fields.string("key_format"),
			key_format_versions: fields.string("key_format_versions"),
		})
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Map {
	pub uri: String,
	pub byte_range: Option<ByteRange>,
}

impl Map {
	pub(crate) fn from_fields(mut fields: Fields) -> Result<Self, ErrorKind> {
		Ok(Self {
			uri: fields.required_string("uri")?,
			byte_range: fields
				.string("byte_range")
				.map(|s| s.parse::<ByteRange>().map_err(|err| err.within(EXT_X_MAP)))
				.transpose()?,
		})
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateRange {
	pub id: String,
	pub class: Option<String>,
	pub start_date: DateTime<FixedOffset>,
	pub end_date: Option<DateTime<FixedOffset>>,
	pub duration: Option<f64>,
	pub planned_duration: Option<f64>,
	pub end_on_next: bool,
}

impl DateRange {
	pub(crate) fn from_fields(mut fields: Fields) -> Result<Self, ErrorKind> {
		let range = Self {
			id: fields.required_string("id")?,
			class: fields.string("class"),
			start_date: fields.required_timestamp("start_date")?,
			end_date: fields.timestamp("end_date"),
			duration: fields.float("duration"),
			planned_duration: fields.float("planned_duration"),
			end_on_next: fields.token::<Yes>("end_on_next").is_some(),
		};

		for (field, value) in [("DURATION", range.duration), ("PLANNED-DURATION", range.planned_duration)] {
			if let Some(value) = value.filter(|v| *v < 0.0) {
				return Err(ErrorKind::InvalidValue {
					directive: EXT_X_DATERANGE,
					kind: ValueKind::Float,
					raw: format!("{field}={value}"),
				});
			}
		}

		if range.end_on_next {
			if range.class.is_none() {
				return Err(ErrorKind::MissingRequiredField {
					directive: EXT_X_DATERANGE,
					field: "CLASS",
				});
			}

			let forbidden = match (range.duration, range.end_date) {
				(Some(_), _) => Some("DURATION"),
				(_, Some(_)) => Some("END-DATE"),
				_ => None,
			};

			if let Some(field) = forbidden {
				return Err(ErrorKind::ForbiddenField {
					directive: EXT_X_DATERANGE,
					field,
					reason: "END-ON-NEXT=YES cannot carry an explicit end",
				});
			}
		}

		if let (Some(end_date), Some(duration)) = (range.end_date, range.duration) {
			let delta = Duration::nanoseconds((duration * 1e9).round() as i64);
			if range.start_date + delta != end_date {
				return Err(ErrorKind::InconsistentDateRange { id: range.id });
			}
		}

		Ok(range)
	}
}

/// A rendition declared by `#EXT-X-MEDIA`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Media {
	pub media_type: MediaType,
	pub group_id: String,
	pub name: String,
	pub uri: Option<String>,
	pub language: Option<String>,
	pub assoc_language: Option<String>,
	pub default: bool,
	pub autoselect: bool,
	pub forced: bool,
	pub instream_id: Option<String>,
	pub characteristics: Option<String>,
	pub channels: Option<String>,
}

impl Media {
	pub(crate) fn from_fields(mut fields: Fields) -> Result<Self, ErrorKind> {
		let media_type = fields.required_token("type")?;
		let default = fields.token::<YesNo>("default");
		let autoselect = fields.token::<YesNo>("autoselect");
		let forced = fields.token::<YesNo>("forced");

		let media = Self {
			media_type,
			group_id: fields.required_string("group_id")?,
			name: fields.required_string("name")?,
			uri: fields.string("uri"),
			language: fields.string("language"),
			assoc_language: fields.string("assoc_language"),
			default: default.is_some_and(YesNo::is_yes),
			autoselect: autoselect.is_some_and(YesNo::is_yes),
			forced: forced.is_some_and(YesNo::is_yes),
			instream_id: fields.string("instream_id"),
			characteristics: fields.string("characteristics"),
			channels: fields.string("channels"),
		};

		let forbid = |field, reason| ErrorKind::ForbiddenField {
			directive: EXT_X_MEDIA,
			field,
			reason,
		};

		if media.media_type == MediaType::ClosedCaptions {
			if media.uri.is_some() {
				return Err(forbid("URI", "CLOSED-CAPTIONS renditions are carried in the video stream"));
			}

			if media.instream_id.is_none() {
				return Err(ErrorKind::MissingRequiredField {
					directive: EXT_X_MEDIA,
					field: "INSTREAM-ID",
				});
			}
		} else if media.instream_id.is_some() {
			return Err(forbid("INSTREAM-ID", "only CLOSED-CAPTIONS renditions have an INSTREAM-ID"));
		}

		if forced.is_some() && media.media_type != MediaType::Subtitles {
			return Err(forbid("FORCED", "only SUBTITLES renditions can be forced"));
		}

		if media.default && autoselect == Some(YesNo::No) {
			return Err(forbid("AUTOSELECT", "AUTOSELECT must be YES when DEFAULT is YES"));
		}

		Ok(media)
	}

	/// Two renditions are the same when they share a type, group and name.
	pub fn is_same_rendition(&self, other: &Self) -> bool {
		self.media_type == other.media_type && self.group_id == other.group_id && self.name == other.name
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamInf {
	pub bandwidth: u64,
	pub average_bandwidth: Option<u64>,
	pub codecs: Option<String>,
	pub resolution: Option<Resolution>,
	pub frame_rate: Option<f64>,
	pub hdcp_level: Option<HdcpLevel>,
	pub audio: Option<String>,
	pub video: Option<String>,
	pub subtitles: Option<String>,
	pub closed_captions: Option<String>,
}

impl StreamInf {
	pub(crate) fn from_fields(mut fields: Fields) -> Result<Self, ErrorKind> {
		Ok(Self {
			bandwidth: fields.required_integer("bandwidth")?,
			average_bandwidth: fields.integer("average_bandwidth"),
			codecs: fields.string("codecs"),
			resolution: fields.resolution("resolution"),
			frame_rate: fields.float("frame_rate"),
			hdcp_level: fields.token("hdcp_level"),
			audio: fields.string("audio"),
			video: fields.string("video"),
			subtitles: fields.string("subtitles"),
			// the unquoted NONE token converts to a token, not a group id
			closed_captions: fields.string("closed_captions"),
		})
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IFrameStreamInf {
	pub bandwidth: u64,
	pub uri: String,
	pub average_bandwidth: Option<u64>,
	pub codecs: Option<String>,
	pub resolution: Option<Resolution>,
	pub hdcp_level: Option<HdcpLevel>,
	pub video: Option<String>,
}

impl IFrameStreamInf {
	pub(crate) fn from_fields(mut fields: Fields) -> Result<Self, ErrorKind> {
		Ok(Self {
			bandwidth: fields.required_integer("bandwidth")?,
			uri: fields.required_string("uri")?,
			average_bandwidth: fields.integer("average_bandwidth"),
			codecs: fields.string("codecs"),
			resolution: fields.resolution("resolution"),
			hdcp_level: fields.token("hdcp_level"),
			video: fields.string("video"),
		})
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionData {
	pub data_id: String,
	pub value: Option<String>,
	pub uri: Option<String>,
	pub language: Option<String>,
}

impl SessionData {
	pub(crate) fn from_fields(mut fields: Fields) -> Result<Self, ErrorKind> {
		let data = Self {
			data_id: fields.required_string("data_id")?,
			value: fields.string("value"),
			uri: fields.string("uri"),
			language: fields.string("language"),
		};

		if data.value.is_some() == data.uri.is_some() {
			return Err(ErrorKind::ExactlyOneOf {
				directive: EXT_X_SESSION_DATA,
				first: "VALUE",
				second: "URI",
			});
		}

		Ok(data)
	}

	/// Session data is identified by its DATA-ID and LANGUAGE.
	pub fn is_same_entry(&self, other: &Self) -> bool {
		self.data_id == other.data_id && self.language == other.language
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionKey {
	pub method: SessionEncryptionMethod,
	pub uri: String,
	pub iv: Option<Vec<u8>>,
	pub key_format: Option<String>,
	pub key_format_versions: Option<String>,
}

impl SessionKey {
	pub(crate) fn from_fields(mut fields: Fields) -> Result<Self, ErrorKind> {
		Ok(Self {
			method: fields.required_token("method")?,
			uri: fields.required_string("uri")?,
			iv: fields.hex("iv"),
			key_format: fields.string("key_format"),
			key_format_versions: fields.string("key_format_versions"),
		})
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Start {
	pub time_offset: f64,
	pub precise: bool,
}

impl Start {
	pub(crate) fn from_fields(mut fields: Fields) -> Result<Self, ErrorKind> {
		Ok(Self {
			time_offset: fields.required_float("time_offset")?,
			precise: fields.token::<YesNo>("precise").is_some_and(YesNo::is_yes),
		})
	}
}
