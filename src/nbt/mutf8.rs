//! Java's "modified UTF-8", the string encoding used by NBT.
//!
//! It differs from UTF-8 in two ways: `U+0000` is written as `C0 80`, and
//! characters outside the BMP are written as two 3-byte surrogates.
//!
//! Java's writer encodes UTF-16 code units one at a time, so an unpaired
//! surrogate is valid input. `decode` replaces those with `U+FFFD`.
//! Plain 4-byte UTF-8 sequences and overlong forms are also accepted on
//! read, but they are never produced. Use [`NbtString`](crate::nbt::NbtString)
//! to keep the original bytes of such strings.

use crate::nbt::NbtError;

/// True when `bytes` is the same in UTF-8 and modified UTF-8.
pub fn is_plain_ascii(bytes: &[u8]) -> bool {
	bytes.iter().all(|b| *b != 0 && *b < 0x80)
}

/// Decodes modified UTF-8. Only truncated sequences and bytes that cannot
/// start a sequence are errors.
pub fn decode(bytes: &[u8]) -> Result<String, NbtError> {
	if is_plain_ascii(bytes) {
		return String::from_utf8(bytes.to_vec()).map_err(|_| NbtError::InvalidString);
	}
	let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
	let mut out = String::with_capacity(bytes.len());
	let mut index = 0;
	let continuation = |b: Option<&u8>| -> Result<u32, NbtError> {
		match b {
			Some(b) if b & 0xC0 == 0x80 => Ok((b & 0x3F) as u32),
			_ => Err(NbtError::InvalidString),
		}
	};
	while index < bytes.len() {
		let lead = bytes[index];
		if lead < 0x80 {
			units.push(lead as u16);
			index += 1;
		} else if lead & 0xE0 == 0xC0 {
			let value = ((lead & 0x1F) as u32) << 6 | continuation(bytes.get(index + 1))?;
			units.push(value as u16);
			index += 2;
		} else if lead & 0xF0 == 0xE0 {
			let value = ((lead & 0x0F) as u32) << 12
				| continuation(bytes.get(index + 1))? << 6
				| continuation(bytes.get(index + 2))?;
			units.push(value as u16);
			index += 3;
		} else if lead & 0xF8 == 0xF0 {
			let value = ((lead & 0x07) as u32) << 18
				| continuation(bytes.get(index + 1))? << 12
				| continuation(bytes.get(index + 2))? << 6
				| continuation(bytes.get(index + 3))?;
			flush_units(&mut units, &mut out);
			out.push(char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER));
			index += 4;
		} else {
			return Err(NbtError::InvalidString);
		}
	}
	flush_units(&mut units, &mut out);
	Ok(out)
}

fn flush_units(units: &mut Vec<u16>, out: &mut String) {
	out.extend(
		char::decode_utf16(units.drain(..))
			.map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
	);
}

pub fn encode(text: &str) -> Vec<u8> {
	if is_plain_ascii(text.as_bytes()) {
		return text.as_bytes().to_vec();
	}
	let mut out = Vec::with_capacity(text.len() + 8);
	for unit in text.encode_utf16() {
		match unit {
			0x0001..=0x007F => out.push(unit as u8),
			0x0000 | 0x0080..=0x07FF => {
				out.push(0xC0 | ((unit >> 6) & 0x1F) as u8);
				out.push(0x80 | (unit & 0x3F) as u8);
			}
			_ => {
				out.push(0xE0 | ((unit >> 12) & 0x0F) as u8);
				out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
				out.push(0x80 | (unit & 0x3F) as u8);
			}
		}
	}
	out
}
