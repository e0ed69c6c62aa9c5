use chrono::DateTime;

use crate::*;

fn load(line: &str) -> Result<Tag, ErrorKind> {
	let (name, payload) = line.split_once(':').unwrap_or((line, ""));
	descriptor_for(name).expect("known directive").parse(payload)
}

#[test]
fn test_version() {
	assert_eq!(load("#EXT-X-VERSION:2").unwrap(), Tag::Version(2));
	assert_eq!(
		load("#EXT-X-VERSION:two").unwrap_err(),
		ErrorKind::InvalidValue {
			directive: EXT_X_VERSION,
			kind: ValueKind::Integer,
			raw: "two".to_string(),
		}
	);
}

#[test]
fn test_ext_inf() {
	assert_eq!(
		load("#EXTINF:123.4,Test").unwrap(),
		Tag::Inf(Inf {
			duration: 123.4,
			title: Some("Test".to_string()),
		})
	);

	assert_eq!(
		load("#EXTINF:123").unwrap(),
		Tag::Inf(Inf {
			duration: 123.0,
			title: None,
		})
	);

	assert_eq!(
		load("#EXTINF:").unwrap_err(),
		ErrorKind::MissingRequiredField {
			directive: EXTINF,
			field: "DURATION",
		}
	);
}

#[test]
fn test_byte_range() {
	assert_eq!(
		load("#EXT-X-BYTERANGE:1234@20").unwrap(),
		Tag::ByteRange(ByteRange {
			length: 1234,
			offset: Some(20),
		})
	);

	assert_eq!(
		load("#EXT-X-BYTERANGE:321").unwrap(),
		Tag::ByteRange(ByteRange {
			length: 321,
			offset: None,
		})
	);

	assert!(load("#EXT-X-BYTERANGE:1@2@3").is_err());
}

#[test]
fn test_discontinuity() {
	assert_eq!(load("#EXT-X-DISCONTINUITY").unwrap(), Tag::Discontinuity);
}

#[test]
fn test_key() {
	let uri = "https://example.com/key.php";

	assert_eq!(
		load(&format!("#EXT-X-KEY:METHOD=AES-128,URI=\"{uri}\"")).unwrap(),
		Tag::Key(Key {
			method: EncryptionMethod::Aes128,
			uri: Some(uri.to_string()),
			iv: None,
			key_format: None,
			key_format_versions: None,
		})
	);

	let Tag::Key(key) = load("#EXT-X-KEY:METHOD=SAMPLE-AES,URI=\"k\",IV=0x0000000000000000000000000000ABCD").unwrap() else {
		panic!("expected a key");
	};
	assert_eq!(key.iv.as_ref().map(Vec::len), Some(16));
	assert_eq!(key.iv.unwrap()[14..], [0xab_u8, 0xcd]);

	assert!(matches!(
		load("#EXT-X-KEY:METHOD=NONE").unwrap(),
		Tag::Key(Key {
			method: EncryptionMethod::None,
			uri: None,
			..
		})
	));
}

#[test]
fn test_key_none_forbids_attributes() {
	assert_eq!(
		load("#EXT-X-KEY:METHOD=NONE,URI=\"x\"").unwrap_err(),
		ErrorKind::ForbiddenField {
			directive: EXT_X_KEY,
			field: "URI",
			reason: "METHOD=NONE allows no other attributes",
		}
	);

	assert!(matches!(
		load("#EXT-X-KEY:METHOD=NONE,IV=0x01").unwrap_err(),
		ErrorKind::ForbiddenField { field: "IV", .. }
	));
}

#[test]
fn test_key_requires_uri() {
	assert_eq!(
		load("#EXT-X-KEY:METHOD=AES-128").unwrap_err(),
		ErrorKind::MissingRequiredField {
			directive: EXT_X_KEY,
			field: "URI",
		}
	);
}

#[test]
fn test_map() {
	let uri = "https://example.com/map.php";

	assert_eq!(
		load(&format!("#EXT-X-MAP:URI=\"{uri}\"")).unwrap(),
		Tag::Map(Map {
			uri: uri.to_string(),
			byte_range: None,
		})
	);

	assert_eq!(
		load("#EXT-X-MAP:URI=\"init.mp4\",BYTERANGE=\"720@0\"").unwrap(),
		Tag::Map(Map {
			uri: "init.mp4".to_string(),
			byte_range: Some(ByteRange {
				length: 720,
				offset: Some(0),
			}),
		})
	);

	assert_eq!(
		load("#EXT-X-MAP:URI=\"init.mp4\",BYTERANGE=\"x@0\"").unwrap_err(),
		ErrorKind::InvalidValue {
			directive: EXT_X_MAP,
			kind: ValueKind::String,
			raw: "x@0".to_string(),
		}
	);
}

#[test]
fn test_program_date_time() {
	let dt = "2010-02-19T14:54:23.031+08:00";

	assert_eq!(
		load(&format!("#EXT-X-PROGRAM-DATE-TIME:{dt}")).unwrap(),
		Tag::ProgramDateTime(DateTime::parse_from_rfc3339(dt).unwrap())
	);

	assert!(load("#EXT-X-PROGRAM-DATE-TIME:yesterday").is_err());
}

#[test]
fn test_date_range() {
	let Tag::DateRange(range) =
		load("#EXT-X-DATERANGE:ID=\"splice-6FFFFFF0\",START-DATE=\"2014-03-05T11:15:00Z\",PLANNED-DURATION=59.993").unwrap()
	else {
		panic!("expected a date range");
	};

	assert_eq!(range.id, "splice-6FFFFFF0");
	assert_eq!(range.start_date, DateTime::parse_from_rfc3339("2014-03-05T11:15:00Z").unwrap());
	assert_eq!(range.planned_duration, Some(59.993));
	assert!(!range.end_on_next);
}

#[test]
fn test_date_range_end_and_duration() {
	assert!(load(
		"#EXT-X-DATERANGE:ID=\"a\",START-DATE=\"2014-03-05T11:15:00Z\",END-DATE=\"2014-03-05T11:16:00.5Z\",DURATION=60.5"
	)
	.is_ok());

	assert_eq!(
		load("#EXT-X-DATERANGE:ID=\"a\",START-DATE=\"2014-03-05T11:15:00Z\",END-DATE=\"2014-03-05T11:16:00Z\",DURATION=60.5")
			.unwrap_err(),
		ErrorKind::InconsistentDateRange { id: "a".to_string() }
	);

	assert!(load("#EXT-X-DATERANGE:ID=\"a\",START-DATE=\"2014-03-05T11:15:00Z\",DURATION=-1").is_err());
}

#[test]
fn test_date_range_end_on_next() {
	assert!(load("#EXT-X-DATERANGE:ID=\"a\",CLASS=\"ad\",START-DATE=\"2014-03-05T11:15:00Z\",END-ON-NEXT=YES").is_ok());

	assert_eq!(
		load("#EXT-X-DATERANGE:ID=\"a\",START-DATE=\"2014-03-05T11:15:00Z\",END-ON-NEXT=YES").unwrap_err(),
		ErrorKind::MissingRequiredField {
			directive: EXT_X_DATERANGE,
			field: "CLASS",
		}
	);

	assert!(matches!(
		load("#EXT-X-DATERANGE:ID=\"a\",CLASS=\"ad\",START-DATE=\"2014-03-05T11:15:00Z\",DURATION=1,END-ON-NEXT=YES")
			.unwrap_err(),
		ErrorKind::ForbiddenField { field: "DURATION", .. }
	));

	assert!(load("#EXT-X-DATERANGE:ID=\"a\",CLASS=\"ad\",START-DATE=\"2014-03-05T11:15:00Z\",END-ON-NEXT=NO").is_err());
}

#[test]
fn test_scalars() {
	assert_eq!(load("#EXT-X-TARGETDURATION:123").unwrap(), Tag::TargetDuration(123));
	assert_eq!(load("#EXT-X-MEDIA-SEQUENCE:1234").unwrap(), Tag::MediaSequence(1234));
	assert_eq!(
		load("#EXT-X-DISCONTINUITY-SEQUENCE:1234").unwrap(),
		Tag::DiscontinuitySequence(1234)
	);
	assert_eq!(
		load("#EXT-X-PLAYLIST-TYPE:EVENT").unwrap(),
		Tag::PlaylistType(MediaPlaylistType::Event)
	);
	assert!(load("#EXT-X-PLAYLIST-TYPE:event").is_err());
}

#[test]
fn test_flags() {
	assert_eq!(load("#EXT-X-ENDLIST").unwrap(), Tag::EndList);
	assert_eq!(load("#EXT-X-I-FRAMES-ONLY").unwrap(), Tag::IFramesOnly);
	assert_eq!(load("#EXT-X-INDEPENDENT-SEGMENTS").unwrap(), Tag::IndependentSegments);
}

#[test]
fn test_media() {
	let Tag::Media(media) =
		load("#EXT-X-MEDIA:TYPE=VIDEO,GROUP-ID=\"low\",NAME=\"Main\",DEFAULT=YES,URI=\"low/main/audio-video.m3u8\"").unwrap()
	else {
		panic!("expected a media tag");
	};

	assert_eq!(media.media_type, MediaType::Video);
	assert_eq!(media.group_id, "low");
	assert_eq!(media.name, "Main");
	assert!(media.default);
	assert!(!media.autoselect);
	assert_eq!(media.uri.as_deref(), Some("low/main/audio-video.m3u8"));
}

#[test]
fn test_media_closed_captions() {
	assert_eq!(
		load("#EXT-X-MEDIA:TYPE=CLOSED-CAPTIONS,GROUP-ID=\"cc\",NAME=\"CC1\"").unwrap_err(),
		ErrorKind::MissingRequiredField {
			directive: EXT_X_MEDIA,
			field: "INSTREAM-ID",
		}
	);

	assert!(matches!(
		load("#EXT-X-MEDIA:TYPE=CLOSED-CAPTIONS,GROUP-ID=\"cc\",NAME=\"CC1\",INSTREAM-ID=\"CC1\",URI=\"cc.m3u8\"")
			.unwrap_err(),
		ErrorKind::ForbiddenField { field: "URI", .. }
	));

	assert!(matches!(
		load("#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID=\"aac\",NAME=\"en\",INSTREAM-ID=\"CC1\"").unwrap_err(),
		ErrorKind::ForbiddenField {
			field: "INSTREAM-ID",
			..
		}
	));
}

#[test]
fn test_media_forced_and_default() {
	assert!(load("#EXT-X-MEDIA:TYPE=SUBTITLES,GROUP-ID=\"s\",NAME=\"en\",FORCED=YES,URI=\"s.m3u8\"").is_ok());

	assert!(matches!(
		load("#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID=\"a\",NAME=\"en\",FORCED=NO").unwrap_err(),
		ErrorKind::ForbiddenField { field: "FORCED", .. }
	));

	assert!(matches!(
		load("#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID=\"a\",NAME=\"en\",DEFAULT=YES,AUTOSELECT=NO").unwrap_err(),
		ErrorKind::ForbiddenField {
			field: "AUTOSELECT",
			..
		}
	));
}

#[test]
fn test_stream_inf() {
	let Tag::StreamInf(info) =
		load("#EXT-X-STREAM-INF:BANDWIDTH=1280000,CODECS=\"ac-3,mp4a.40.2\",VIDEO=\"low\",RESOLUTION=416x234").unwrap()
	else {
		panic!("expected a stream info");
	};

	assert_eq!(info.bandwidth, 1280000);
	assert_eq!(info.codecs.as_deref(), Some("ac-3,mp4a.40.2"));
	assert_eq!(info.video.as_deref(), Some("low"));
	assert_eq!(
		info.resolution,
		Some(Resolution {
			width: 416,
			height: 234,
		})
	);

	assert_eq!(
		load("#EXT-X-STREAM-INF:CODECS=\"avc1\"").unwrap_err(),
		ErrorKind::MissingRequiredField {
			directive: EXT_X_STREAM_INF,
			field: "BANDWIDTH",
		}
	);

	assert!(matches!(
		load("#EXT-X-STREAM-INF:BANDWIDTH=1,CODECS=\"avc1"),
		Err(ErrorKind::MalformedAttributeList {
			directive: EXT_X_STREAM_INF,
			..
		})
	));
}

#[test]
fn test_i_frame_stream_inf() {
	assert_eq!(
		load("#EXT-X-I-FRAME-STREAM-INF:BANDWIDTH=150000,URI=\"mid/iframe.m3u8\"").unwrap(),
		Tag::IFrameStreamInf(IFrameStreamInf {
			bandwidth: 150000,
			uri: "mid/iframe.m3u8".to_string(),
			average_bandwidth: None,
			codecs: None,
			resolution: None,
			hdcp_level: None,
			video: None,
		})
	);
}

#[test]
fn test_session_data() {
	assert_eq!(
		load("#EXT-X-SESSION-DATA:DATA-ID=\"com.example.title\",LANGUAGE=\"en\",VALUE=\"This is an example\"").unwrap(),
		Tag::SessionData(SessionData {
			data_id: "com.example.title".to_string(),
			value: Some("This is an example".to_string()),
			uri: None,
			language: Some("en".to_string()),
		})
	);

	let exactly_one = ErrorKind::ExactlyOneOf {
		directive: EXT_X_SESSION_DATA,
		first: "VALUE",
		second: "URI",
	};

	assert_eq!(load("#EXT-X-SESSION-DATA:DATA-ID=\"a\"").unwrap_err(), exactly_one);
	assert_eq!(
		load("#EXT-X-SESSION-DATA:DATA-ID=\"a\",VALUE=\"b\",URI=\"c\"").unwrap_err(),
		exactly_one
	);
}

#[test]
fn test_session_key() {
	let uri = "https://example.com/key.php";

	assert_eq!(
		load(&format!("#EXT-X-SESSION-KEY:METHOD=AES-128,URI=\"{uri}\"")).unwrap(),
		Tag::SessionKey(SessionKey {
			method: SessionEncryptionMethod::Aes128,
			uri: uri.to_string(),
			iv: None,
			key_format: None,
			key_format_versions: None,
		})
	);

	assert!(load("#EXT-X-SESSION-KEY:METHOD=NONE,URI=\"x\"").is_err());
}

#[test]
fn test_start() {
	assert_eq!(
		load("#EXT-X-START:TIME-OFFSET=1000,PRECISE=YES").unwrap(),
		Tag::Start(Start {
			time_offset: 1000.0,
			precise: true,
		})
	);

	assert_eq!(
		load("#EXT-X-START:TIME-OFFSET=-2.5").unwrap(),
		Tag::Start(Start {
			time_offset: -2.5,
			precise: false,
		})
	);
}
