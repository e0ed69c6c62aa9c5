use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use once_cell::sync::Lazy;

use crate::attributes::tokenize;
use crate::define::*;
use crate::errors::ErrorKind;
use crate::tags::{
	ByteRange, DateRange, IFrameStreamInf, Inf, Key, Map, Media, SessionData, SessionKey, Start, StreamInf, Tag,
};
use crate::value::{convert, Value, ValueKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
	Version,
	Inf,
	ByteRange,
	Discontinuity,
	Key,
	Map,
	ProgramDateTime,
	DateRange,
	TargetDuration,
	MediaSequence,
	DiscontinuitySequence,
	EndList,
	PlaylistType,
	IFramesOnly,
	Media,
	StreamInf,
	IFrameStreamInf,
	SessionData,
	SessionKey,
	IndependentSegments,
	Start,
}

/// Which playlist a directive may appear in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
	Media,
	Master,
	Either,
}

impl Scope {
	pub fn document_kind(self) -> Option<DocumentKind> {
		match self {
			Self::Media => Some(DocumentKind::Media),
			Self::Master => Some(DocumentKind::Master),
			Self::Either => None,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
	/// `KEY=VALUE[,KEY=VALUE]*`, matched by key.
	AttributeList,
	/// Values split on the separator, matched by position.
	Positional(char),
	/// The whole payload is the only field.
	Scalar,
	/// No payload, presence is the value.
	Flag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeField {
	pub key: &'static str,
	pub name: &'static str,
	pub kind: ValueKind,
	pub required: bool,
}

const fn required(key: &'static str, name: &'static str, kind: ValueKind) -> AttributeField {
	AttributeField {
		key,
		name,
		kind,
		required: true,
	}
}

const fn optional(key: &'static str, name: &'static str, kind: ValueKind) -> AttributeField {
	AttributeField {
		key,
		name,
		kind,
		required: false,
	}
}

pub struct TagDescriptor {
	pub directive: Directive,
	pub name: &'static str,
	pub scope: Scope,
	pub shape: PayloadShape,
	pub fields: &'static [AttributeField],
	build: fn(Fields) -> Result<Tag, ErrorKind>,
}

impl std::fmt::Debug for TagDescriptor {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TagDescriptor")
			.field("directive", &self.directive)
			.field("name", &self.name)
			.field("scope", &self.scope)
			.field("shape", &self.shape)
			.field("fields", &self.fields)
			.finish()
	}
}

impl TagDescriptor {
	/// Parses the payload of one occurrence of this directive into its tag.
	pub fn parse(&self, payload: &str) -> Result<Tag, ErrorKind> {
		(self.build)(parse_fields(payload, self)?)
	}
}

static DESCRIPTORS: &[TagDescriptor] = &[
	TagDescriptor {
		directive: Directive::Version,
		name: EXT_X_VERSION,
		scope: Scope::Either,
		shape: PayloadShape::Scalar,
		fields: &[required("VERSION", "version", ValueKind::Integer)],
		build: |mut f| Ok(Tag::Version(f.required_integer("version")?)),
	},
	TagDescriptor {
		directive: Directive::Inf,
		name: EXTINF,
		scope: Scope::Media,
		shape: PayloadShape::Positional(','),
		fields: &[
			required("DURATION", "duration", ValueKind::Float),
			optional("TITLE", "title", ValueKind::String),
		],
		build: |f| Ok(Tag::Inf(Inf::from_fields(f)?)),
	},
	TagDescriptor {
		directive: Directive::ByteRange,
		name: EXT_X_BYTERANGE,
		scope: Scope::Media,
		shape: PayloadShape::Positional('@'),
		fields: &[
			required("LENGTH", "length", ValueKind::Integer),
			optional("START", "offset", ValueKind::Integer),
		],
		build: |f| Ok(Tag::ByteRange(ByteRange::from_fields(f)?)),
	},
	TagDescriptor {
		directive: Directive::Discontinuity,
		name: EXT_X_DISCONTINUITY,
		scope: Scope::Media,
		shape: PayloadShape::Flag,
		fields: &[],
		build: |_| Ok(Tag::Discontinuity),
	},
	TagDescriptor {
		directive: Directive::Key,
		name: EXT_X_KEY,
		scope: Scope::Media,
		shape: PayloadShape::AttributeList,
		fields: &[
			required("METHOD", "method", ValueKind::Token(EncryptionMethod::TOKENS)),
			optional("URI", "uri", ValueKind::String),
			optional("IV", "iv", ValueKind::Hex),
			optional("KEYFORMAT", "key_format", ValueKind::String),
			optional("KEYFORMATVERSIONS", "key_format_versions", ValueKind::String),
		],
		build: |f| Ok(Tag::Key(Key::from_fields(f)?)),
	},
	TagDescriptor {
		directive: Directive::Map,
		name: EXT_X_MAP,
		scope: Scope::Media,
		shape: PayloadShape::AttributeList,
		fields: &[
			required("URI", "uri", ValueKind::String),
			optional("BYTERANGE", "byte_range", ValueKind::String),
		],
		build: |f| Ok(Tag::Map(Map::from_fields(f)?)),
	},
	TagDescriptor {
		directive: Directive::ProgramDateTime,
		name: EXT_X_PROGRAM_DATE_TIME,
		scope: Scope::Media,
		shape: PayloadShape::Scalar,
		fields: &[required("DATETIME", "date_time", ValueKind::Timestamp)],
		build: |mut f| Ok(Tag::ProgramDateTime(f.required_timestamp("date_time")?)),
	},
	TagDescriptor {
		directive: Directive::DateRange,
		name: EXT_X_DATERANGE,
		scope: Scope::Media,
		shape: PayloadShape::AttributeList,
		fields: &[
			required("ID", "id", ValueKind::String),
			required("START-DATE", "start_date", ValueKind::Timestamp),
			optional("CLASS", "class", ValueKind::String),
			optional("END-DATE", "end_date", ValueKind::Timestamp),
			optional("DURATION", "duration", ValueKind::Float),
			optional("PLANNED-DURATION", "planned_duration", ValueKind::Float),
			optional("END-ON-NEXT", "end_on_next", ValueKind::Token(Yes::TOKENS)),
		],
		build: |f| Ok(Tag::DateRange(DateRange::from_fields(f)?)),
	},
	TagDescriptor {
		directive: Directive::TargetDuration,
		name: EXT_X_TARGETDURATION,
		scope: Scope::Media,
		shape: PayloadShape::Scalar,
		fields: &[required("DURATION", "duration", ValueKind::Integer)],
		build: |mut f| Ok(Tag::TargetDuration(f.required_integer("duration")?)),
	},
	TagDescriptor {
		directive: Directive::MediaSequence,
		name: EXT_X_MEDIA_SEQUENCE,
		scope: Scope::Media,
		shape: PayloadShape::Scalar,
		fields: &[required("NUMBER", "number", ValueKind::Integer)],
		build: |mut f| Ok(Tag::MediaSequence(f.required_integer("number")?)),
	},
	TagDescriptor {
		directive: Directive::DiscontinuitySequence,
		name: EXT_X_DISCONTINUITY_SEQUENCE,
		scope: Scope::Media,
		shape: PayloadShape::Scalar,
		fields: &[required("NUMBER", "number", ValueKind::Integer)],
		build: |mut f| Ok(Tag::DiscontinuitySequence(f.required_integer("number")?)),
	},
	TagDescriptor {
		directive: Directive::EndList,
		name: EXT_X_ENDLIST,
		scope: Scope::Media,
		shape: PayloadShape::Flag,
		fields: &[],
		build: |_| Ok(Tag::EndList),
	},
	TagDescriptor {
		directive: Directive::PlaylistType,
		name: EXT_X_PLAYLIST_TYPE,
		scope: Scope::Media,
		shape: PayloadShape::Scalar,
		fields: &[required("TYPE", "type", ValueKind::Token(MediaPlaylistType::TOKENS))],
		build: |mut f| Ok(Tag::PlaylistType(f.required_token("type")?)),
	},
	TagDescriptor {
		directive: Directive::IFramesOnly,
		name: EXT_X_I_FRAMES_ONLY,
		scope: Scope::Media,
		shape: PayloadShape::Flag,
		fields: &[],
		build: |_| Ok(Tag::IFramesOnly),
	},
	TagDescriptor {
		directive: Directive::Media,
		name: EXT_X_MEDIA,
		scope: Scope::Master,
		shape: PayloadShape::AttributeList,
		fields: &[
			required("TYPE", "type", ValueKind::Token(MediaType::TOKENS)),
			required("GROUP-ID", "group_id", ValueKind::String),
			required("NAME", "name", ValueKind::String),
			optional("URI", "uri", ValueKind::String),
			optional("LANGUAGE", "language", ValueKind::String),
			optional("ASSOC-LANGUAGE", "assoc_language", ValueKind::String),
			optional("DEFAULT", "default", ValueKind::Token(YesNo::TOKENS)),
			optional("AUTOSELECT", "autoselect", ValueKind::Token(YesNo::TOKENS)),
			optional("FORCED", "forced", ValueKind::Token(YesNo::TOKENS)),
			optional("INSTREAM-ID", "instream_id", ValueKind::String),
			optional("CHARACTERISTICS", "characteristics", ValueKind::String),
			optional("CHANNELS", "channels", ValueKind::String),
		],
		build: |f| Ok(Tag::Media(Media::from_fields(f)?)),
	},
	TagDescriptor {
		directive: Directive::StreamInf,
		name: EXT_X_STREAM_INF,
		scope: Scope::Master,
		shape: PayloadShape::AttributeList,
		fields: &[
			required("BANDWIDTH", "bandwidth", ValueKind::Integer),
			optional("AVERAGE-BANDWIDTH", "average_bandwidth", ValueKind::Integer),
			optional("CODECS", "codecs", ValueKind::String),
			optional("RESOLUTION", "resolution", ValueKind::Resolution),
			optional("FRAME-RATE", "frame_rate", ValueKind::Float),
			optional("HDCP-LEVEL", "hdcp_level", ValueKind::Token(HdcpLevel::TOKENS)),
			optional("AUDIO", "audio", ValueKind::String),
			optional("VIDEO", "video", ValueKind::String),
			optional("SUBTITLES", "subtitles", ValueKind::String),
			optional("CLOSED-CAPTIONS", "closed_captions", ValueKind::QuotedOrNone),
		],
		build: |f| Ok(Tag::StreamInf(StreamInf::from_fields(f)?)),
	},
	TagDescriptor {
		directive: Directive::IFrameStreamInf,
		name: EXT_X_I_FRAME_STREAM_INF,
		scope: Scope::Master,
		shape: PayloadShape::AttributeList,
		fields: &[
			required("BANDWIDTH", "bandwidth", ValueKind::Integer),
			required("URI", "uri", ValueKind::String),
			optional("AVERAGE-BANDWIDTH", "average_bandwidth", ValueKind::Integer),
			optional("CODECS", "codecs", ValueKind::String),
			optional("RESOLUTION", "resolution", ValueKind::Resolution),
			optional("HDCP-LEVEL", "hdcp_level", ValueKind::Token(HdcpLevel::TOKENS)),
			optional("VIDEO", "video", ValueKind::String),
		],
		build: |f| Ok(Tag::IFrameStreamInf(IFrameStreamInf::from_fields(f)?)),
	},
	TagDescriptor {
		directive: Directive::SessionData,
		name: EXT_X_SESSION_DATA,
		scope: Scope::Master,
		shape: PayloadShape::AttributeList,
		fields: &[
			required("DATA-ID", "data_id", ValueKind::String),
			optional("VALUE", "value", ValueKind::String),
			optional("URI", "uri", ValueKind::String),
			optional("LANGUAGE", "language", ValueKind::String),
		],
		build: |f| Ok(Tag::SessionData(SessionData::from_fields(f)?)),
	},
	TagDescriptor {
		directive: Directive::SessionKey,
		name: EXT_X_SESSION_KEY,
		scope: Scope::Master,
		shape: PayloadShape::AttributeList,
		fields: &[
			required("METHOD", "method", ValueKind::Token(SessionEncryptionMethod::TOKENS)),
			required("URI", "uri", ValueKind::String),
			optional("IV", "iv", ValueKind::Hex),
			optional("KEYFORMAT", "key_format", ValueKind::String),
			optional("KEYFORMATVERSIONS", "key_format_versions", ValueKind::String),
		],
		build: |f| Ok(Tag::SessionKey(SessionKey::from_fields(f)?)),
	},
	TagDescriptor {
		directive: Directive::IndependentSegments,
		name: EXT_X_INDEPENDENT_SEGMENTS,
		scope: Scope::Either,
		shape: PayloadShape::Flag,
		fields: &[],
		build: |_| Ok(Tag::IndependentSegments),
	},
	TagDescriptor {
		directive: Directive::Start,
		name: EXT_X_START,
		scope: Scope::Either,
		shape: PayloadShape::AttributeList,
		fields: &[
			required("TIME-OFFSET", "time_offset", ValueKind::Float),
			optional("PRECISE", "precise", ValueKind::Token(YesNo::TOKENS)),
		],
		build: |f| Ok(Tag::Start(Start::from_fields(f)?)),
	},
];

static BY_NAME: Lazy<HashMap<&'static str, &'static TagDescriptor>> =
	Lazy::new(|| DESCRIPTORS.iter().map(|d| (d.name, d)).collect());

/// Looks up the descriptor of a directive by its literal name, e.g. `#EXT-X-KEY`.
pub fn descriptor_for(name: &str) -> Option<&'static TagDescriptor> {
	BY_NAME.get(name).copied()
}

impl Directive {
	pub fn descriptor(self) -> &'static TagDescriptor {
		// DESCRIPTORS is declared in the same order as the variants
		&DESCRIPTORS[self as usize]
	}

	pub fn name(self) -> &'static str {
		self.descriptor().name
	}
}

/// The converted fields of one directive occurrence, keyed by semantic name.
#[derive(Debug, Clone)]
pub struct Fields {
	directive: &'static str,
	values: Vec<(&'static AttributeField, Value)>,
}

impl Fields {
	pub fn directive(&self) -> &'static str {
		self.directive
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	/// Wire keys of the fields that are still present, in parse order.
	pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.values.iter().map(|(field, _)| field.key)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.values.iter().any(|(field, _)| field.name == name)
	}

	pub fn take(&mut self, name: &str) -> Option<Value> {
		let idx = self.values.iter().position(|(field, _)| field.name == name)?;
		Some(self.values.remove(idx).1)
	}

	pub fn string(&mut self, name: &str) -> Option<String> {
		match self.take(name)? {
			Value::String(s) => Some(s),
			_ => None,
		}
	}

	pub fn integer(&mut self, name: &str) -> Option<u64> {
		match self.take(name)? {
			Value::Integer(i) => Some(i),
			_ => None,
		}
	}

	pub fn float(&mut self, name: &str) -> Option<f64> {
		match self.take(name)? {
			Value::Float(f) => Some(f),
			_ => None,
		}
	}

	pub fn timestamp(&mut self, name: &str) -> Option<DateTime<FixedOffset>> {
		match self.take(name)? {
			Value::Timestamp(ts) => Some(ts),
			_ => None,
		}
	}

	pub fn resolution(&mut self, name: &str) -> Option<Resolution> {
		match self.take(name)? {
			Value::Resolution(r) => Some(r),
			_ => None,
		}
	}

	pub fn hex(&mut self, name: &str) -> Option<Vec<u8>> {
		match self.take(name)? {
			Value::Hex(bytes) => Some(bytes),
			_ => None,
		}
	}

	pub fn token<T: Token>(&mut self, name: &str) -> Option<T> {
		match self.take(name)? {
			Value::Token(token) => T::from_token(token),
			_ => None,
		}
	}

	fn missing(&self, name: &str) -> ErrorKind {
		let field = self.descriptor_field(name);
		ErrorKind::MissingRequiredField {
			directive: self.directive,
			field,
		}
	}

	fn descriptor_field(&self, name: &str) -> &'static str {
		descriptor_for(self.directive)
			.and_then(|d| d.fields.iter().find(|f| f.name == name))
			.map(|f| f.key)
			.unwrap_or("attribute")
	}

	pub fn required_string(&mut self, name: &str) -> Result<String, ErrorKind> {
		self.string(name).ok_or_else(|| self.missing(name))
	}

	pub fn required_integer(&mut self, name: &str) -> Result<u64, ErrorKind> {
		self.integer(name).ok_or_else(|| self.missing(name))
	}

	pub fn required_float(&mut self, name: &str) -> Result<f64, ErrorKind> {
		self.float(name).ok_or_else(|| self.missing(name))
	}

	pub fn required_timestamp(&mut self, name: &str) -> Result<DateTime<FixedOffset>, ErrorKind> {
		self.timestamp(name).ok_or_else(|| self.missing(name))
	}

	pub fn required_token<T: Token>(&mut self, name: &str) -> Result<T, ErrorKind> {
		self.token(name).ok_or_else(|| self.missing(name))
	}
}

/// Converts the payload of a directive into typed fields according to its descriptor.
pub fn parse_fields(payload: &str, descriptor: &TagDescriptor) -> Result<Fields, ErrorKind> {
	let mut fields = Fields {
		directive: descriptor.name,
		values: Vec::with_capacity(descriptor.fields.len()),
	};

	let mut insert = |field: &'static AttributeField, raw: &str| -> Result<(), ErrorKind> {
		let value = convert(raw, field.kind).map_err(|err| err.within(descriptor.name))?;
		// a repeated attribute replaces the earlier occurrence
		fields.values.retain(|(f, _)| f.key != field.key);
		fields.values.push((field, value));
		Ok(())
	};

	match descriptor.shape {
		PayloadShape::AttributeList => {
			for (key, raw) in tokenize(payload).map_err(|err| err.within(descriptor.name))? {
				match descriptor.fields.iter().find(|f| f.key == key) {
					Some(field) => insert(field, raw)?,
					None => tracing::debug!(directive = descriptor.name, key, "ignoring unknown attribute"),
				}
			}
		}
		PayloadShape::Positional(separator) => {
			let parts = payload.splitn(descriptor.fields.len(), separator);
			for (field, raw) in descriptor.fields.iter().zip(parts) {
				let raw = raw.trim();
				if !raw.is_empty() {
					insert(field, raw)?;
				}
			}
		}
		PayloadShape::Scalar => {
			if let Some(field) = descriptor.fields.first() {
				if !payload.is_empty() {
					insert(field, payload)?;
				}
			}
		}
		PayloadShape::Flag => {
			if !payload.is_empty() {
				tracing::debug!(directive = descriptor.name, payload, "ignoring payload of flag directive");
			}
		}
	}

	if let Some(field) = descriptor.fields.iter().find(|f| f.required && !fields.contains(f.name)) {
		return Err(ErrorKind::MissingRequiredField {
			directive: descriptor.name,
			field: field.key,
		});
	}

	Ok(fields)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_registry_order() {
		for descriptor in DESCRIPTORS {
			assert_eq!(descriptor.directive.descriptor().name, descriptor.name);
			assert!(std::ptr::eq(descriptor_for(descriptor.name).unwrap(), descriptor));
		}

		assert!(descriptor_for("#EXT-X-UNKNOWN").is_none());
		assert_eq!(Directive::Start.name(), EXT_X_START);
	}

	#[test]
	fn test_parse_fields_positional() {
		let mut fields = parse_fields("10.5, Title, with comma", Directive::Inf.descriptor()).unwrap();

		assert_eq!(fields.float("duration"), Some(10.5));
		assert_eq!(fields.string("title").as_deref(), Some("Title, with comma"));

		let fields = parse_fields("10,", Directive::Inf.descriptor()).unwrap();
		assert!(!fields.contains("title"));
	}

	#[test]
	fn test_parse_fields_missing() {
		assert_eq!(
			parse_fields("URI=\"x\"", Directive::Key.descriptor()).unwrap_err(),
			ErrorKind::MissingRequiredField {
				directive: EXT_X_KEY,
				field: "METHOD",
			}
		);

		assert_eq!(
			parse_fields("", Directive::TargetDuration.descriptor()).unwrap_err(),
			ErrorKind::MissingRequiredField {
				directive: EXT_X_TARGETDURATION,
				field: "DURATION",
			}
		);
	}

	#[test]
	fn test_parse_fields_unknown_keys() {
		let fields = parse_fields("TIME-OFFSET=2.5,X-FOO=\"bar\"", Directive::Start.descriptor()).unwrap();

		assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["TIME-OFFSET"]);
	}

	#[test]
	fn test_parse_with_borrowed_descriptor() {
		let descriptor: &TagDescriptor = descriptor_for(EXT_X_VERSION).unwrap();

		assert_eq!(descriptor.parse("7").unwrap(), Tag::Version(7));
		assert!(parse_fields("7", descriptor).unwrap().contains("version"));
	}

	#[test]
	fn test_parse_fields_malformed() {
		assert_eq!(
			parse_fields("BANDWIDTH=1,CODECS=\"avc1", Directive::StreamInf.descriptor()).unwrap_err(),
			ErrorKind::MalformedAttributeList {
				directive: EXT_X_STREAM_INF,
				payload: "BANDWIDTH=1,CODECS=\"avc1".to_string(),
			}
		);
	}

	#[test]
	fn test_parse_fields_invalid_value() {
		assert_eq!(
			parse_fields("METHOD=aes-128", Directive::Key.descriptor()).unwrap_err(),
			ErrorKind::InvalidValue {
				directive: EXT_X_KEY,
				kind: ValueKind::Token(EncryptionMethod::TOKENS),
				raw: "aes-128".to_string(),
			}
		);
	}
}
