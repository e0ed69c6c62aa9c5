use std::fmt;

use serde::Serialize;

pub const EXTM3U: &str = "#EXTM3U";
pub const DIRECTIVE_PREFIX: &str = "#EXT";

// Basic tags
pub const EXT_X_VERSION: &str = "#EXT-X-VERSION";

// Media segment tags
pub const EXTINF: &str = "#EXTINF";
pub const EXT_X_BYTERANGE: &str = "#EXT-X-BYTERANGE";
pub const EXT_X_DISCONTINUITY: &str = "#EXT-X-DISCONTINUITY";
pub const EXT_X_KEY: &str = "#EXT-X-KEY";
pub const EXT_X_MAP: &str = "#EXT-X-MAP";
pub const EXT_X_PROGRAM_DATE_TIME: &str = "#EXT-X-PROGRAM-DATE-TIME";
pub const EXT_X_DATERANGE: &str = "#EXT-X-DATERANGE";

// Media playlist tags
pub const EXT_X_TARGETDURATION: &str = "#EXT-X-TARGETDURATION";
pub const EXT_X_MEDIA_SEQUENCE: &str = "#EXT-X-MEDIA-SEQUENCE";
pub const EXT_X_DISCONTINUITY_SEQUENCE: &str = "#EXT-X-DISCONTINUITY-SEQUENCE";
pub const EXT_X_ENDLIST: &str = "#EXT-X-ENDLIST";
pub const EXT_X_PLAYLIST_TYPE: &str = "#EXT-X-PLAYLIST-TYPE";
pub const EXT_X_I_FRAMES_ONLY: &str = "#EXT-X-I-FRAMES-ONLY";

// Master playlist tags
pub const EXT_X_MEDIA: &str = "#EXT-X-MEDIA";
pub const EXT_X_STREAM_INF: &str = "#EXT-X-STREAM-INF";
pub const EXT_X_I_FRAME_STREAM_INF: &str = "#EXT-X-I-FRAME-STREAM-INF";
pub const EXT_X_SESSION_DATA: &str = "#EXT-X-SESSION-DATA";
pub const EXT_X_SESSION_KEY: &str = "#EXT-X-SESSION-KEY";

// Media or master playlist tags
pub const EXT_X_INDEPENDENT_SEGMENTS: &str = "#EXT-X-INDEPENDENT-SEGMENTS";
pub const EXT_X_START: &str = "#EXT-X-START";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentKind {
	Media,
	Master,
}

impl fmt::Display for DocumentKind {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Media => write!(f, "MEDIA"),
			Self::Master => write!(f, "MASTER"),
		}
	}
}

/// An enumerated attribute value with a fixed, case-sensitive set of wire tokens.
pub trait Token: Sized + Copy + 'static {
	const TOKENS: &'static [&'static str];

	fn from_token(token: &str) -> Option<Self>;

	fn as_token(&self) -> &'static str;
}

macro_rules! token_enum {
	($(#[$meta:meta])* $name:ident { $($variant:ident => $token:literal),+ $(,)? }) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
		pub enum $name {
			$($variant),+
		}

		impl Token for $name {
			const TOKENS: &'static [&'static str] = &[$($token),+];

			fn from_token(token: &str) -> Option<Self> {
				match token {
					$($token => Some(Self::$variant),)+
					_ => None,
				}
			}

			fn as_token(&self) -> &'static str {
				match self {
					$(Self::$variant => $token),+
				}
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
				f.write_str(self.as_token())
			}
		}

		impl Serialize for $name {
			fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
				serializer.serialize_str(self.as_token())
			}
		}
	};
}

token_enum!(EncryptionMethod {
	None => "NONE",
	Aes128 => "AES-128",
	SampleAes => "SAMPLE-AES",
});

token_enum!(SessionEncryptionMethod {
	Aes128 => "AES-128",
	SampleAes => "SAMPLE-AES",
});

token_enum!(
	/// The value of `#EXT-X-PLAYLIST-TYPE`.
	MediaPlaylistType {
		Event => "EVENT",
		Vod => "VOD",
	}
);

token_enum!(MediaType {
	Audio => "AUDIO",
	Video => "VIDEO",
	Subtitles => "SUBTITLES",
	ClosedCaptions => "CLOSED-CAPTIONS",
});

token_enum!(YesNo {
	Yes => "YES",
	No => "NO",
});

token_enum!(
	/// Attributes such as `END-ON-NEXT` only ever carry `YES`.
	Yes {
		Yes => "YES",
	}
);

token_enum!(HdcpLevel {
	Type0 => "TYPE-0",
	None => "NONE",
});

impl YesNo {
	pub fn is_yes(self) -> bool {
		self == Self::Yes
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Resolution {
	pub width: u64,
	pub height: u64,
}

impl fmt::Display for Resolution {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}x{}", self.width, self.height)
	}
}
