use serde::{Deserialize, Serialize};

use crate::define::*;
use crate::errors::{ErrorKind, ParseError};
use crate::playlist::{MediaSegment, Playlist};
use crate::schema::{descriptor_for, TagDescriptor};
use crate::tags::*;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
	/// Ignore URI lines that do not follow `#EXTINF` or `#EXT-X-STREAM-INF` instead of
	/// rejecting them. Without this they are only ignored after `#EXT-X-ENDLIST`.
	pub lenient_uris: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
	ExpectHeader,
	Scanning,
	Done,
}

/// A directive waiting for the URI line that completes it.
#[derive(Debug, Default)]
enum Pending {
	#[default]
	Idle,
	Segment(Inf),
	Variant(StreamInf),
}

impl Pending {
	fn directive(&self) -> Option<&'static str> {
		match self {
			Self::Idle => None,
			Self::Segment(_) => Some(EXTINF),
			Self::Variant(_) => Some(EXT_X_STREAM_INF),
		}
	}
}

/// Tags that apply to the next media segment only.
#[derive(Debug, Default)]
struct NextSegment {
	byte_range: Option<ByteRange>,
	discontinuity: bool,
	program_date_time: Option<chrono::DateTime<chrono::FixedOffset>>,
	date_range: Option<DateRange>,
}

#[derive(Debug, Default)]
pub(crate) struct MediaState {
	pub target_duration: Option<u64>,
	pub media_sequence: Option<u64>,
	pub discontinuity_sequence: Option<u64>,
	pub end_list: bool,
	pub playlist_type: Option<MediaPlaylistType>,
	pub i_frames_only: bool,
	pub segments: Vec<MediaSegment>,
	next: NextSegment,
	key: Option<Key>,
	map: Option<Map>,
}

#[derive(Debug, Default)]
pub(crate) struct MasterState {
	pub medias: Vec<Media>,
	pub variants: Vec<(StreamInf, String)>,
	pub i_frame_streams: Vec<IFrameStreamInf>,
	pub session_data: Vec<SessionData>,
	pub session_keys: Vec<SessionKey>,
}

/// Everything accumulated by one scan, handed to the playlist builder.
#[derive(Debug, Default)]
pub(crate) struct Accumulated {
	pub version: Option<u64>,
	pub independent_segments: bool,
	pub start: Option<Start>,
	pub media: MediaState,
	pub master: MasterState,
}

/// Single-use playlist parser. Each call to [`parse`](Parser::parse) owns all of its state.
#[derive(Debug)]
pub struct Parser {
	options: ParseOptions,
	state: State,
	line: usize,
	kind: Option<DocumentKind>,
	pending: Pending,
	acc: Accumulated,
}

impl Default for Parser {
	fn default() -> Self {
		Self::new(ParseOptions::default())
	}
}

impl Parser {
	pub fn new(options: ParseOptions) -> Self {
		Self {
			options,
			state: State::ExpectHeader,
			line: 0,
			kind: None,
			pending: Pending::Idle,
			acc: Accumulated::default(),
		}
	}

	pub fn parse(mut self, content: &str) -> Result<Playlist, ParseError> {
		for (idx, line) in content.lines().enumerate() {
			self.line = idx + 1;
			self.feed(line.trim()).map_err(|kind| ParseError::at(self.line, kind))?;
		}

		self.finish().map_err(ParseError::from)
	}

	fn feed(&mut self, line: &str) -> Result<(), ErrorKind> {
		match self.state {
			State::ExpectHeader if line.is_empty() => Ok(()),
			State::ExpectHeader if line == EXTM3U => {
				self.state = State::Scanning;
				Ok(())
			}
			State::ExpectHeader => Err(ErrorKind::InvalidHeader(line.to_owned())),
			State::Scanning => self.scan(line),
			State::Done => Ok(()),
		}
	}

	fn scan(&mut self, line: &str) -> Result<(), ErrorKind> {
		if line.is_empty() {
			return Ok(());
		}

		if !line.starts_with('#') {
			return self.uri(line);
		}

		if !line.starts_with(DIRECTIVE_PREFIX) {
			tracing::trace!(line = self.line, "skipping comment");
			return Ok(());
		}

		let (name, payload) = match line.split_once(':') {
			Some((name, payload)) => (name, payload.trim()),
			None => (line, ""),
		};

		match descriptor_for(name) {
			Some(descriptor) => self.directive(descriptor, payload),
			None => {
				tracing::debug!(line = self.line, directive = name, "ignoring unknown directive");
				Ok(())
			}
		}
	}

	fn directive(&mut self, descriptor: &'static TagDescriptor, payload: &str) -> Result<(), ErrorKind> {
		tracing::trace!(line = self.line, directive = descriptor.name, "parsing directive");

		if let Some(found) = descriptor.scope.document_kind() {
			match self.kind {
				None => self.kind = Some(found),
				Some(locked) if locked != found => {
					return Err(ErrorKind::MixedDocumentKind {
						directive: descriptor.name,
						locked,
						found,
					});
				}
				Some(_) => {}
			}
		}

		let tag = descriptor.parse(payload)?;
		self.route(tag)
	}

	fn route(&mut self, tag: Tag) -> Result<(), ErrorKind> {
		let acc = &mut self.acc;
		let media = &mut acc.media;
		let master = &mut acc.master;

		match tag {
			Tag::Version(version) => singleton(&mut acc.version, version, EXT_X_VERSION),
			Tag::Inf(_) if media.end_list => {
				tracing::debug!(line = self.line, "ignoring #EXTINF after #EXT-X-ENDLIST");
				Ok(())
			}
			Tag::Inf(info) => return self.open(Pending::Segment(info)),
			Tag::ByteRange(range) => singleton(&mut media.next.byte_range, range, EXT_X_BYTERANGE),
			Tag::Discontinuity => flag(&mut media.next.discontinuity, EXT_X_DISCONTINUITY),
			Tag::Key(key) => {
				media.key = (key.method != EncryptionMethod::None).then_some(key);
				Ok(())
			}
			Tag::Map(map) => {
				media.map = Some(map);
				Ok(())
			}
			Tag::ProgramDateTime(ts) => singleton(&mut media.next.program_date_time, ts, EXT_X_PROGRAM_DATE_TIME),
			Tag::DateRange(range) => singleton(&mut media.next.date_range, range, EXT_X_DATERANGE),
			Tag::TargetDuration(duration) => singleton(&mut media.target_duration, duration, EXT_X_TARGETDURATION),
			Tag::MediaSequence(number) => {
				before_segments(media, &self.pending, EXT_X_MEDIA_SEQUENCE)?;
				singleton(&mut media.media_sequence, number, EXT_X_MEDIA_SEQUENCE)
			}
			Tag::DiscontinuitySequence(number) => {
				before_segments(media, &self.pending, EXT_X_DISCONTINUITY_SEQUENCE)?;
				singleton(&mut media.discontinuity_sequence, number, EXT_X_DISCONTINUITY_SEQUENCE)
			}
			Tag::EndList => flag(&mut media.end_list, EXT_X_ENDLIST),
			Tag::PlaylistType(ty) => singleton(&mut media.playlist_type, ty, EXT_X_PLAYLIST_TYPE),
			Tag::IFramesOnly => flag(&mut media.i_frames_only, EXT_X_I_FRAMES_ONLY),
			Tag::Media(rendition) => {
				if master.medias.iter().any(|m| m.is_same_rendition(&rendition)) {
					return Err(ErrorKind::DuplicateDirective(EXT_X_MEDIA));
				}

				master.medias.push(rendition);
				Ok(())
			}
			Tag::StreamInf(info) => return self.open(Pending::Variant(info)),
			Tag::IFrameStreamInf(info) => {
				master.i_frame_streams.push(info);
				Ok(())
			}
			Tag::SessionData(data) => {
				if master.session_data.iter().any(|d| d.is_same_entry(&data)) {
					return Err(ErrorKind::DuplicateDirective(EXT_X_SESSION_DATA));
				}

				master.session_data.push(data);
				Ok(())
			}
			Tag::SessionKey(key) => {
				if master.session_keys.contains(&key) {
					return Err(ErrorKind::DuplicateDirective(EXT_X_SESSION_KEY));
				}

				master.session_keys.push(key);
				Ok(())
			}
			Tag::IndependentSegments => flag(&mut acc.independent_segments, EXT_X_INDEPENDENT_SEGMENTS),
			Tag::Start(start) => singleton(&mut acc.start, start, EXT_X_START),
		}
	}

	fn open(&mut self, pending: Pending) -> Result<(), ErrorKind> {
		if let Some(directive) = self.pending.directive() {
			return Err(ErrorKind::IncompleteCompositeRecord(directive));
		}

		self.pending = pending;
		Ok(())
	}

	fn uri(&mut self, line: &str) -> Result<(), ErrorKind> {
		match std::mem::take(&mut self.pending) {
			Pending::Segment(info) => {
				let media = &mut self.acc.media;
				let next = std::mem::take(&mut media.next);

				media.segments.push(MediaSegment {
					info,
					uri: line.to_owned(),
					byte_range: next.byte_range,
					discontinuity: next.discontinuity,
					key: media.key.clone(),
					map: media.map.clone(),
					program_date_time: next.program_date_time,
					date_range: next.date_range,
				});
			}
			Pending::Variant(info) => self.acc.master.variants.push((info, line.to_owned())),
			Pending::Idle if self.acc.media.end_list || self.options.lenient_uris => {
				tracing::debug!(line = self.line, uri = line, "ignoring URI without a pending directive");
			}
			Pending::Idle => return Err(ErrorKind::UnexpectedUri(line.to_owned())),
		}

		Ok(())
	}

	fn finish(mut self) -> Result<Playlist, ErrorKind> {
		if self.state == State::ExpectHeader {
			return Err(ErrorKind::InvalidHeader(String::new()));
		}

		self.state = State::Done;

		if let Some(directive) = self.pending.directive() {
			return Err(ErrorKind::IncompleteCompositeRecord(directive));
		}

		let playlist = match self.kind.ok_or(ErrorKind::UnknownDocumentKind)? {
			DocumentKind::Media => {
				let media = &self.acc.media;
				let target = media
					.target_duration
					.ok_or(ErrorKind::MissingRequiredDirective(EXT_X_TARGETDURATION))?;

				// half-way durations round to the even integer
				if let Some(segment) = media
					.segments
					.iter()
					.find(|s| s.info.duration.round_ties_even() > target as f64)
				{
					return Err(ErrorKind::SegmentExceedsTargetDuration {
						duration: segment.info.duration,
						target,
					});
				}

				Playlist::media(self.acc, target)
			}
			DocumentKind::Master => Playlist::master(self.acc)?,
		};

		tracing::debug!(kind = %playlist.kind(), "playlist built");

		Ok(playlist)
	}
}

fn singleton<T>(slot: &mut Option<T>, value: T, directive: &'static str) -> Result<(), ErrorKind> {
	if slot.is_some() {
		return Err(ErrorKind::DuplicateDirective(directive));
	}

	*slot = Some(value);
	Ok(())
}

fn flag(slot: &mut bool, directive: &'static str) -> Result<(), ErrorKind> {
	if *slot {
		return Err(ErrorKind::DuplicateDirective(directive));
	}

	*slot = true;
	Ok(())
}

fn before_segments(media: &MediaState, pending: &Pending, directive: &'static str) -> Result<(), ErrorKind> {
	if !media.segments.is_empty() || matches!(pending, Pending::Segment(_)) {
		return Err(ErrorKind::MisplacedDirective(directive));
	}

	Ok(())
}
