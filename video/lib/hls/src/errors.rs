use std::fmt;

use crate::define::{DocumentKind, MediaType};
use crate::value::ValueKind;

/// The reason a playlist failed to parse.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ErrorKind {
	#[error("invalid header: expected #EXTM3U, found {0:?}")]
	InvalidHeader(String),
	#[error("malformed attribute list for {directive}: {payload:?}")]
	MalformedAttributeList { directive: &'static str, payload: String },
	#[error("invalid {kind} for {directive}: {raw:?}")]
	InvalidValue {
		directive: &'static str,
		kind: ValueKind,
		raw: String,
	},
	#[error("missing {field} for {directive}")]
	MissingRequiredField {
		directive: &'static str,
		field: &'static str,
	},
	#[error("{field} is not allowed for {directive}: {reason}")]
	ForbiddenField {
		directive: &'static str,
		field: &'static str,
		reason: &'static str,
	},
	#[error("{directive} requires exactly one of {first} or {second}")]
	ExactlyOneOf {
		directive: &'static str,
		first: &'static str,
		second: &'static str,
	},
	#[error("duplicated {0}")]
	DuplicateDirective(&'static str),
	#[error("{directive} belongs to a {found} playlist but the playlist is {locked}")]
	MixedDocumentKind {
		directive: &'static str,
		locked: DocumentKind,
		found: DocumentKind,
	},
	#[error("no {media_type} rendition group with GROUP-ID {group_id:?}")]
	UnresolvedRenditionGroup { group_id: String, media_type: MediaType },
	#[error("date range {id:?} has an END-DATE that does not match START-DATE + DURATION")]
	InconsistentDateRange { id: String },
	#[error("{0} is not followed by a URI")]
	IncompleteCompositeRecord(&'static str),
	#[error("segment duration {duration} exceeds target duration {target}")]
	SegmentExceedsTargetDuration { duration: f64, target: u64 },
	#[error("unable to determine the playlist type")]
	UnknownDocumentKind,
	#[error("unexpected URI line: {0:?}")]
	UnexpectedUri(String),
	#[error("{0} must appear before the first media segment")]
	MisplacedDirective(&'static str),
	#[error("missing {0}")]
	MissingRequiredDirective(&'static str),
	#[error("invalid encoding, UTF-8 required: {0}")]
	InvalidUtf8(#[from] std::str::Utf8Error),
}

/// A fatal parse error, with the 1-based line it was raised on when it is tied to one.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
	line: Option<usize>,
	kind: ErrorKind,
}

impl ParseError {
	pub(crate) fn at(line: usize, kind: ErrorKind) -> Self {
		Self { line: Some(line), kind }
	}

	pub fn line(&self) -> Option<usize> {
		self.line
	}

	pub fn kind(&self) -> &ErrorKind {
		&self.kind
	}

	pub fn into_kind(self) -> ErrorKind {
		self.kind
	}
}

impl From<ErrorKind> for ParseError {
	fn from(kind: ErrorKind) -> Self {
		Self { line: None, kind }
	}
}

impl fmt::Display for ParseError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self.line {
			Some(line) => write!(f, "line {}: {}", line, self.kind),
			None => write!(f, "{}", self.kind),
		}
	}
}

impl std::error::Error for ParseError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		Some(&self.kind)
	}
}
