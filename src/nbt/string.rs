use std::{
	borrow::Cow,
	fmt,
	hash::{Hash, Hasher},
	ops::Deref,
};

use crate::nbt::{mutf8, NbtResult};

/// A string as stored in a tag tree.
///
/// `as_str` gives the decoded text. Strings whose bytes are not what
/// [`mutf8::encode`] would produce for that text (unpaired surrogates,
/// 4-byte UTF-8, overlong forms) also keep the bytes they were read from,
/// and are written back with exactly those bytes.
#[derive(Debug, Clone, Default)]
pub struct NbtString {
	text: String,
	raw: Option<Box<[u8]>>,
}

impl NbtString {
	pub fn new<S: Into<String>>(text: S) -> Self {
		Self {
			text: text.into(),
			raw: None,
		}
	}

	pub fn from_mutf8(bytes: &[u8]) -> NbtResult<Self> {
		let text = mutf8::decode(bytes)?;
		let raw = if mutf8::is_plain_ascii(bytes) || mutf8::encode(&text) == bytes {
			None
		} else {
			Some(Box::from(bytes))
		};
		Ok(Self { text, raw })
	}

	/// The bytes to write for this string.
	pub fn to_mutf8(&self) -> Cow<'_, [u8]> {
		match &self.raw {
			Some(raw) => Cow::Borrowed(&raw[..]),
			None => Cow::Owned(mutf8::encode(&self.text)),
		}
	}

	pub fn as_str(&self) -> &str {
		&self.text
	}
}

impl Deref for NbtString {
	type Target = str;

	fn deref(&self) -> &str {
		&self.text
	}
}

impl PartialEq for NbtString {
	fn eq(&self, other: &Self) -> bool {
		self.text == other.text && self.raw == other.raw
	}
}

impl Eq for NbtString {}

// Hashes like `str` so compounds can be searched with a plain `&str`.
impl Hash for NbtString {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.text.hash(state);
	}
}

impl indexmap::Equivalent<NbtString> for str {
	fn equivalent(&self, key: &NbtString) -> bool {
		key.text == self
	}
}

impl PartialEq<str> for NbtString {
	fn eq(&self, other: &str) -> bool {
		self.text == other
	}
}

impl PartialEq<&str> for NbtString {
	fn eq(&self, other: &&str) -> bool {
		self.text == *other
	}
}

impl From<&str> for NbtString {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}

impl From<String> for NbtString {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

impl From<&String> for NbtString {
	fn from(value: &String) -> Self {
		Self::new(value.as_str())
	}
}

impl fmt::Display for NbtString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.text)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::nbt::Map;

	#[test]
	fn canonical_bytes_are_not_kept() {
		let name = NbtString::from_mutf8(&[b'a', 0xC0, 0x80]).unwrap();
		assert_eq!(name, "a\0");
		assert_eq!(name, NbtString::from("a\0"));
		assert!(matches!(name.to_mutf8(), Cow::Owned(_)));
	}

	#[test]
	fn non_canonical_bytes_are_written_back() {
		let cases: [&[u8]; 4] = [
			&[b'a', 0xED, 0xA0, 0xBC],
			&[0xF0, 0x9F, 0x8F, 0xB0],
			&[0xC1, 0x81],
			&[b'a', 0x00],
		];
		for bytes in cases {
			let string = NbtString::from_mutf8(bytes).unwrap();
			assert_eq!(&*string.to_mutf8(), bytes);
		}
		let lone = NbtString::from_mutf8(cases[0]).unwrap();
		assert_eq!(lone, "a\u{FFFD}");
		assert!(matches!(lone.to_mutf8(), Cow::Borrowed(_)));
		let overlong = NbtString::from_mutf8(cases[2]).unwrap();
		assert_eq!(overlong, "A");
		assert_ne!(overlong, NbtString::from("A"));
	}

	#[test]
	fn compounds_are_searched_by_text() {
		let mut map = Map::new();
		map.insert(NbtString::from_mutf8(&[b'x', 0xC1, 0x90, b'o', b's']).unwrap(), crate::nbt::Tag::Int(1));
		map.insert("zPos".into(), crate::nbt::Tag::Int(2));
		assert!(map.get("xPos").is_some());
		assert!(map.get("zPos").is_some());
		assert!(map.get("yPos").is_none());
	}
}
