use std::fmt;

use chrono::{DateTime, FixedOffset};

use crate::define::Resolution;
use crate::errors::ErrorKind;

/// A raw value that does not match its expected kind.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid {kind}: {raw:?}")]
pub struct InvalidValue {
	pub kind: ValueKind,
	pub raw: String,
}

impl InvalidValue {
	pub fn new(kind: ValueKind, raw: impl Into<String>) -> Self {
		Self { kind, raw: raw.into() }
	}

	/// Attaches the directive the value was read from.
	pub fn within(self, directive: &'static str) -> ErrorKind {
		ErrorKind::InvalidValue {
			directive,
			kind: self.kind,
			raw: self.raw,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
	String,
	Integer,
	Float,
	Timestamp,
	/// One of a fixed set of case-sensitive tokens.
	Token(&'static [&'static str]),
	Resolution,
	Hex,
	/// A quoted string, or the unquoted token `NONE`.
	QuotedOrNone,
}

impl fmt::Display for ValueKind {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::String => write!(f, "string"),
			Self::Integer => write!(f, "integer"),
			Self::Float => write!(f, "float"),
			Self::Timestamp => write!(f, "timestamp"),
			Self::Token(tokens) => write!(f, "token (one of {})", tokens.join(", ")),
			Self::Resolution => write!(f, "resolution"),
			Self::Hex => write!(f, "hexadecimal sequence"),
			Self::QuotedOrNone => write!(f, "quoted string or NONE"),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	String(String),
	Integer(u64),
	Float(f64),
	Timestamp(DateTime<FixedOffset>),
	Token(&'static str),
	Resolution(Resolution),
	Hex(Vec<u8>),
}

/// Strips one pair of surrounding double quotes, if both are present.
pub fn unquote(raw: &str) -> &str {
	raw.strip_prefix('"')
		.and_then(|s| s.strip_suffix('"'))
		.unwrap_or(raw)
}

pub fn convert(raw: &str, kind: ValueKind) -> Result<Value, InvalidValue> {
	let invalid = || InvalidValue::new(kind, raw);

	let value = match kind {
		ValueKind::String => Value::String(unquote(raw).to_owned()),
		ValueKind::Integer => Value::Integer(raw.trim().parse().map_err(|_| invalid())?),
		ValueKind::Float => {
			let float: f64 = raw.trim().parse().map_err(|_| invalid())?;
			if !float.is_finite() {
				return Err(invalid());
			}

			Value::Float(float)
		}
		ValueKind::Timestamp => {
			Value::Timestamp(DateTime::parse_from_rfc3339(unquote(raw.trim())).map_err(|_| invalid())?)
		}
		ValueKind::Token(tokens) => {
			let token = tokens.iter().copied().find(|t| *t == raw).ok_or_else(invalid)?;
			Value::Token(token)
		}
		ValueKind::Resolution => Value::Resolution(parse_resolution(raw.trim()).ok_or_else(invalid)?),
		ValueKind::Hex => Value::Hex(parse_hex(raw.trim()).ok_or_else(invalid)?),
		ValueKind::QuotedOrNone if raw.trim() == "NONE" => Value::Token("NONE"),
		ValueKind::QuotedOrNone => Value::String(unquote(raw).to_owned()),
	};

	Ok(value)
}

fn parse_resolution(raw: &str) -> Option<Resolution> {
	let mut parts = raw.split('x');
	let width = parts.next()?.parse().ok()?;
	let height = parts.next()?.parse().ok()?;

	if parts.next().is_some() {
		return None;
	}

	Some(Resolution { width, height })
}

fn parse_hex(raw: &str) -> Option<Vec<u8>> {
	let digits = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X"))?;
	if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
		return None;
	}

	// an odd digit count is padded with a leading zero nibble
	let padded = if digits.len() % 2 == 1 {
		format!("0{digits}")
	} else {
		digits.to_owned()
	};

	(0..padded.len())
		.step_by(2)
		.map(|i| u8::from_str_radix(&padded[i..i + 2], 16).ok())
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_unquote() {
		assert_eq!(unquote("\"abc\""), "abc");
		assert_eq!(unquote("abc"), "abc");
		assert_eq!(unquote("\"abc"), "\"abc");
		assert_eq!(unquote("\""), "\"");
		assert_eq!(unquote("\"\""), "");
	}

	#[test]
	fn test_convert_numbers() {
		assert_eq!(convert(" 42 ", ValueKind::Integer).unwrap(), Value::Integer(42));
		assert_eq!(convert("9.5", ValueKind::Float).unwrap(), Value::Float(9.5));
		assert!(convert("-1", ValueKind::Integer).is_err());
		assert!(convert("inf", ValueKind::Float).is_err());
		assert!(convert("ten", ValueKind::Float).is_err());
	}

	#[test]
	fn test_convert_token() {
		const TOKENS: &[&str] = &["YES", "NO"];

		assert_eq!(convert("YES", ValueKind::Token(TOKENS)).unwrap(), Value::Token("YES"));
		assert_eq!(
			convert("yes", ValueKind::Token(TOKENS)).unwrap_err(),
			InvalidValue::new(ValueKind::Token(TOKENS), "yes")
		);
	}

	#[test]
	fn test_convert_resolution() {
		assert_eq!(
			convert("1920x1080", ValueKind::Resolution).unwrap(),
			Value::Resolution(Resolution {
				width: 1920,
				height: 1080,
			})
		);
		assert!(convert("1920", ValueKind::Resolution).is_err());
		assert!(convert("1920x1080x3", ValueKind::Resolution).is_err());
		assert!(convert("axb", ValueKind::Resolution).is_err());
	}

	#[test]
	fn test_convert_timestamp() {
		let Value::Timestamp(ts) = convert("2010-02-19T14:54:23.031+08:00", ValueKind::Timestamp).unwrap() else {
			panic!("expected a timestamp");
		};
		assert_eq!(ts.timestamp_millis(), 1266562463031);

		assert!(convert("\"2014-03-05T11:15:00Z\"", ValueKind::Timestamp).is_ok());
		assert!(convert("2014-03-05", ValueKind::Timestamp).is_err());
	}

	#[test]
	fn test_convert_quoted_or_none() {
		assert_eq!(convert("NONE", ValueKind::QuotedOrNone).unwrap(), Value::Token("NONE"));
		assert_eq!(
			convert("\"NONE\"", ValueKind::QuotedOrNone).unwrap(),
			Value::String("NONE".to_string())
		);
		assert_eq!(
			convert("\"cc\"", ValueKind::QuotedOrNone).unwrap(),
			Value::String("cc".to_string())
		);
	}

	#[test]
	fn test_convert_hex() {
		assert_eq!(
			convert("0x0102AbcD", ValueKind::Hex).unwrap(),
			Value::Hex(vec![0x01, 0x02, 0xab, 0xcd])
		);
		assert_eq!(convert("0X123", ValueKind::Hex).unwrap(), Value::Hex(vec![0x01, 0x23]));
		assert!(convert("1234", ValueKind::Hex).is_err());
		assert!(convert("0x", ValueKind::Hex).is_err());
		assert!(convert("0xZZ", ValueKind::Hex).is_err());
	}
}
