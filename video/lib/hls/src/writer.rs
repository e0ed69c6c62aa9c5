use std::fmt::{self, Display, Write};

use chrono::{DateTime, FixedOffset, SecondsFormat};

use crate::define::*;
use crate::playlist::{MasterPlaylist, MediaPlaylist, Playlist};
use crate::tags::{ByteRange, DateRange, IFrameStreamInf, Inf, Key, Map, Media, SessionData, SessionKey, Start, StreamInf};

/// Writes `KEY=VALUE` pairs separated by commas.
struct Attributes<'a, 'b> {
	f: &'a mut fmt::Formatter<'b>,
	first: bool,
}

impl<'a, 'b> Attributes<'a, 'b> {
	fn start(f: &'a mut fmt::Formatter<'b>, directive: &str) -> Result<Self, fmt::Error> {
		write!(f, "{directive}:")?;
		Ok(Self { f, first: true })
	}

	fn plain(&mut self, key: &str, value: Option<impl Display>) -> fmt::Result {
		let Some(value) = value else {
			return Ok(());
		};

		if !self.first {
			self.f.write_char(',')?;
		}

		self.first = false;
		write!(self.f, "{key}={value}")
	}

	fn quoted(&mut self, key: &str, value: Option<impl AsRef<str>>) -> fmt::Result {
		self.plain(key, value.map(|v| format!("\"{}\"", v.as_ref())))
	}

	fn flag(&mut self, key: &str, set: bool) -> fmt::Result {
		self.plain(key, set.then_some("YES"))
	}

	fn hex(&mut self, key: &str, value: Option<&[u8]>) -> fmt::Result {
		self.plain(
			key,
			value.map(|bytes| bytes.iter().fold(String::from("0x"), |mut s, b| {
				let _ = write!(s, "{b:02X}");
				s
			})),
		)
	}

	fn end(self) -> fmt::Result {
		self.f.write_char('\n')
	}
}

fn timestamp(ts: &DateTime<FixedOffset>) -> String {
	ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

impl Display for Inf {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		writeln!(f, "{EXTINF}:{},{}", self.duration, self.title.as_deref().unwrap_or_default())
	}
}

impl Display for ByteRange {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self.offset {
			Some(offset) => write!(f, "{}@{}", self.length, offset),
			None => write!(f, "{}", self.length),
		}
	}
}

impl Display for Key {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let mut attrs = Attributes::start(f, EXT_X_KEY)?;
		attrs.plain("METHOD", Some(self.method))?;
		attrs.quoted("URI", self.uri.as_deref())?;
		attrs.hex("IV", self.iv.as_deref())?;
		attrs.quoted("KEYFORMAT", self.key_format.as_deref())?;
		attrs.quoted("KEYFORMATVERSIONS", self.key_format_versions.as_deref())?;
		attrs.end()
	}
}

impl Display for Map {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let mut attrs = Attributes::start(f, EXT_X_MAP)?;
		attrs.quoted("URI", Some(&self.uri))?;
		attrs.quoted("BYTERANGE", self.byte_range.map(|r| r.to_string()).as_deref())?;
		attrs.end()
	}
}

impl Display for DateRange {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let mut attrs = Attributes::start(f, EXT_X_DATERANGE)?;
		attrs.quoted("ID", Some(&self.id))?;
		attrs.quoted("CLASS", self.class.as_deref())?;
		attrs.quoted("START-DATE", Some(&timestamp(&self.start_date)))?;
		attrs.quoted("END-DATE", self.end_date.as_ref().map(timestamp).as_deref())?;
		attrs.plain("DURATION", self.duration)?;
		attrs.plain("PLANNED-DURATION", self.planned_duration)?;
		attrs.flag("END-ON-NEXT", self.end_on_next)?;
		attrs.end()
	}
}

impl Display for Media {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let mut attrs = Attributes::start(f, EXT_X_MEDIA)?;
		attrs.plain("TYPE", Some(self.media_type))?;
		attrs.quoted("GROUP-ID", Some(&self.group_id))?;
		attrs.quoted("NAME", Some(&self.name))?;
		attrs.quoted("LANGUAGE", self.language.as_deref())?;
		attrs.quoted("ASSOC-LANGUAGE", self.assoc_language.as_deref())?;
		attrs.flag("DEFAULT", self.default)?;
		attrs.flag("AUTOSELECT", self.autoselect)?;
		attrs.flag("FORCED", self.forced)?;
		attrs.quoted("INSTREAM-ID", self.instream_id.as_deref())?;
		attrs.quoted("CHARACTERISTICS", self.characteristics.as_deref())?;
		attrs.quoted("CHANNELS", self.channels.as_deref())?;
		attrs.quoted("URI", self.uri.as_deref())?;
		attrs.end()
	}
}

impl Display for StreamInf {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let mut attrs = Attributes::start(f, EXT_X_STREAM_INF)?;
		attrs.plain("BANDWIDTH", Some(self.bandwidth))?;
		attrs.plain("AVERAGE-BANDWIDTH", self.average_bandwidth)?;
		attrs.quoted("CODECS", self.codecs.as_deref())?;
		attrs.plain("RESOLUTION", self.resolution)?;
		attrs.plain("FRAME-RATE", self.frame_rate)?;
		attrs.plain("HDCP-LEVEL", self.hdcp_level)?;
		attrs.quoted("AUDIO", self.audio.as_deref())?;
		attrs.quoted("VIDEO", self.video.as_deref())?;
		attrs.quoted("SUBTITLES", self.subtitles.as_deref())?;
		attrs.quoted("CLOSED-CAPTIONS", self.closed_captions.as_deref())?;
		attrs.end()
	}
}

impl Display for IFrameStreamInf {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let mut attrs = Attributes::start(f, EXT_X_I_FRAME_STREAM_INF)?;
		attrs.plain("BANDWIDTH", Some(self.bandwidth))?;
		attrs.plain("AVERAGE-BANDWIDTH", self.average_bandwidth)?;
		attrs.quoted("CODECS", self.codecs.as_deref())?;
		attrs.plain("RESOLUTION", self.resolution)?;
		attrs.plain("HDCP-LEVEL", self.hdcp_level)?;
		attrs.quoted("VIDEO", self.video.as_deref())?;
		attrs.quoted("URI", Some(&self.uri))?;
		attrs.end()
	}
}

impl Display for SessionData {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let mut attrs = Attributes::start(f, EXT_X_SESSION_DATA)?;
		attrs.quoted("DATA-ID", Some(&self.data_id))?;
		attrs.quoted("VALUE", self.value.as_deref())?;
		attrs.quoted("URI", self.uri.as_deref())?;
		attrs.quoted("LANGUAGE", self.language.as_deref())?;
		attrs.end()
	}
}

impl Display for SessionKey {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let mut attrs = Attributes::start(f, EXT_X_SESSION_KEY)?;
		attrs.plain("METHOD", Some(self.method))?;
		attrs.quoted("URI", Some(&self.uri))?;
		attrs.hex("IV", self.iv.as_deref())?;
		attrs.quoted("KEYFORMAT", self.key_format.as_deref())?;
		attrs.quoted("KEYFORMATVERSIONS", self.key_format_versions.as_deref())?;
		attrs.end()
	}
}

impl Display for Start {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let mut attrs = Attributes::start(f, EXT_X_START)?;
		attrs.plain("TIME-OFFSET", Some(self.time_offset))?;
		attrs.flag("PRECISE", self.precise)?;
		attrs.end()
	}
}

fn write_shared(f: &mut fmt::Formatter, version: Option<u64>, independent_segments: bool, start: Option<&Start>) -> fmt::Result {
	writeln!(f, "{EXTM3U}")?;

	if let Some(version) = version {
		writeln!(f, "{EXT_X_VERSION}:{version}")?;
	}

	if independent_segments {
		writeln!(f, "{EXT_X_INDEPENDENT_SEGMENTS}")?;
	}

	if let Some(start) = start {
		write!(f, "{start}")?;
	}

	Ok(())
}

impl Display for MediaPlaylist {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write_shared(f, self.version, self.independent_segments, self.start.as_ref())?;

		writeln!(f, "{EXT_X_TARGETDURATION}:{}", self.target_duration)?;

		if let Some(sequence) = self.media_sequence {
			writeln!(f, "{EXT_X_MEDIA_SEQUENCE}:{sequence}")?;
		}

		if let Some(sequence) = self.discontinuity_sequence {
			writeln!(f, "{EXT_X_DISCONTINUITY_SEQUENCE}:{sequence}")?;
		}

		if let Some(ty) = self.playlist_type {
			writeln!(f, "{EXT_X_PLAYLIST_TYPE}:{ty}")?;
		}

		if self.i_frames_only {
			writeln!(f, "{EXT_X_I_FRAMES_ONLY}")?;
		}

		let mut key = None;
		let mut map = None;

		for segment in &self.segments {
			// keys and maps carry over to following segments, so only changes are written
			if segment.key.as_ref() != key {
				match &segment.key {
					Some(k) => write!(f, "{k}")?,
					None => writeln!(f, "{EXT_X_KEY}:METHOD={}", EncryptionMethod::None)?,
				}
				key = segment.key.as_ref();
			}

			if segment.map.as_ref() != map {
				if let Some(m) = &segment.map {
					write!(f, "{m}")?;
				}
				map = segment.map.as_ref();
			}

			if segment.discontinuity {
				writeln!(f, "{EXT_X_DISCONTINUITY}")?;
			}

			if let Some(ts) = &segment.program_date_time {
				writeln!(f, "{EXT_X_PROGRAM_DATE_TIME}:{}", timestamp(ts))?;
			}

			if let Some(range) = &segment.date_range {
				write!(f, "{range}")?;
			}

			if let Some(range) = &segment.byte_range {
				writeln!(f, "{EXT_X_BYTERANGE}:{range}")?;
			}

			write!(f, "{}", segment.info)?;
			writeln!(f, "{}", segment.uri)?;
		}

		if self.end_list {
			writeln!(f, "{EXT_X_ENDLIST}")?;
		}

		Ok(())
	}
}

impl Display for MasterPlaylist {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write_shared(f, self.version, self.independent_segments, self.start.as_ref())?;

		for media in self.renditions.iter().flat_map(|g| g.renditions.iter()) {
			write!(f, "{media}")?;
		}

		for data in &self.session_data {
			write!(f, "{data}")?;
		}

		for key in &self.session_keys {
			write!(f, "{key}")?;
		}

		for variant in &self.variants {
			write!(f, "{}", variant.info)?;
			writeln!(f, "{}", variant.uri)?;
		}

		for stream in &self.i_frame_streams {
			write!(f, "{}", stream.info)?;
		}

		Ok(())
	}
}

impl Display for Playlist {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Media(p) => Display::fmt(p, f),
			Self::Master(p) => Display::fmt(p, f),
		}
	}
}

impl Playlist {
	pub fn to_m3u8(&self) -> String {
		self.to_string()
	}
}
