use crate::errors::ErrorKind;

/// An attribute list that does not follow `KEY=VALUE[,KEY=VALUE]*`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed attribute list: {0:?}")]
pub struct MalformedAttributeList(pub String);

impl MalformedAttributeList {
	pub fn within(self, directive: &'static str) -> ErrorKind {
		ErrorKind::MalformedAttributeList {
			directive,
			payload: self.0,
		}
	}
}

enum Mode {
	Key { start: usize },
	Value { start: usize, quoted: bool },
}

/// Splits an attribute list (`KEY=VALUE[,KEY=VALUE]*`) into its raw pairs.
///
/// Values are returned as written, quotes included. Commas inside a quoted value are part of
/// the value.
pub fn tokenize(payload: &str) -> Result<Vec<(&str, &str)>, MalformedAttributeList> {
	let malformed = || MalformedAttributeList(payload.to_owned());

	let mut tokens = Vec::new();
	let mut mode = Mode::Key { start: 0 };

	for (idx, c) in payload.char_indices() {
		match &mut mode {
			Mode::Key { start } => match c {
				'=' => {
					let key = &payload[*start..idx];
					if key.is_empty() {
						return Err(malformed());
					}

					tokens.push(key);
					mode = Mode::Value {
						start: idx + 1,
						quoted: false,
					};
				}
				'A'..='Z' | '0'..='9' | '-' => {}
				_ => return Err(malformed()),
			},
			Mode::Value { start, quoted } => match c {
				'"' => *quoted = !*quoted,
				',' if !*quoted => {
					tokens.push(&payload[*start..idx]);
					mode = Mode::Key { start: idx + 1 };
				}
				_ => {}
			},
		}
	}

	match mode {
		Mode::Value { quoted: true, .. } => return Err(malformed()),
		Mode::Value { start, .. } => tokens.push(&payload[start..]),
		// a dangling key leaves the token count odd
		Mode::Key { start } if start < payload.len() => return Err(malformed()),
		Mode::Key { .. } => {}
	}

	if tokens.len() % 2 != 0 {
		return Err(malformed());
	}

	Ok(tokens.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_tokenize() {
		let pairs = tokenize("BANDWIDTH=1280000,CODECS=\"ac-3,mp4a.40.2\",VIDEO=\"low\"").unwrap();

		assert_eq!(
			pairs,
			vec![
				("BANDWIDTH", "1280000"),
				("CODECS", "\"ac-3,mp4a.40.2\""),
				("VIDEO", "\"low\""),
			]
		);
	}

	#[test]
	fn test_tokenize_empty() {
		assert!(tokenize("").unwrap().is_empty());
		assert_eq!(tokenize("A=").unwrap(), vec![("A", "")]);
		assert_eq!(tokenize("A=1,").unwrap(), vec![("A", "1")]);
	}

	#[test]
	fn test_tokenize_malformed() {
		for payload in ["A", "A=1,B", "=1", "a=1", "A =1", "A=\"1,B=2", "A=1,,B=2"] {
			assert_eq!(
				tokenize(payload).unwrap_err(),
				MalformedAttributeList(payload.to_string()),
				"{payload}"
			);
		}
	}

	#[test]
	fn test_tokenize_rejoin() {
		let payload = "URI=\"a,b=c\",IV=0x1f,KEYFORMAT=\"identity\"";
		let pairs = tokenize(payload).unwrap();

		let rejoined = pairs.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join(",");

		assert_eq!(rejoined, payload);
		assert_eq!(tokenize(&rejoined).unwrap(), pairs);
	}
}
