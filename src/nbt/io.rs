//! Binary reading and writing of tag trees.

use std::{
	fs::File,
	io::{
		BufReader,
		Read, Write,
	},
	path::Path,
};

use byteorder::{
	BigEndian,
	ReadBytesExt,
	WriteBytesExt,
};
use flate2::read::{
	GzDecoder,
	ZlibDecoder,
};

use crate::{
	McResult,
	ioext::{Readable, Writable},
	nbt::{
		Map,
		MAX_DEPTH,
		NbtError,
		NbtResult,
		NbtString,
		tag::*,
	},
};

/// Types that can be decoded from an NBT byte stream.
pub trait NbtRead: Sized {
	fn nbt_read<R: Read>(reader: &mut R) -> NbtResult<Self>;
}

/// Types that can be encoded into an NBT byte stream.
/// Returns the number of bytes written.
pub trait NbtWrite {
	fn nbt_write<W: Write>(&self, writer: &mut W) -> NbtResult<usize>;
}

fn read_length<R: Read>(reader: &mut R) -> NbtResult<usize> {
	let length = reader.read_i32::<BigEndian>()?;
	if length < 0 {
		return Err(NbtError::NegativeLength(length));
	}
	Ok(length as usize)
}

fn write_length<W: Write>(writer: &mut W, length: usize) -> NbtResult<usize> {
	let length = i32::try_from(length).map_err(|_| NbtError::LengthOverflow(length))?;
	writer.write_i32::<BigEndian>(length)?;
	Ok(4)
}

/// Lengths come from untrusted input, so never reserve more than this up front.
const RESERVE_LIMIT: usize = 4096;

fn read_string<R: Read>(reader: &mut R) -> NbtResult<NbtString> {
	let length = reader.read_u16::<BigEndian>()? as usize;
	let mut buffer = vec![0u8; length];
	reader.read_exact(&mut buffer)?;
	NbtString::from_mutf8(&buffer)
}

fn write_string<W: Write>(writer: &mut W, value: &NbtString) -> NbtResult<usize> {
	let bytes = value.to_mutf8();
	let length = u16::try_from(bytes.len()).map_err(|_| NbtError::StringTooLong(bytes.len()))?;
	writer.write_u16::<BigEndian>(length)?;
	writer.write_all(&bytes)?;
	Ok(2 + bytes.len())
}

macro_rules! read_array {
	($reader:ident, $read:ident $(::<$order:ty>)?) => {
		{
			let length = read_length($reader)?;
			let mut values = Vec::with_capacity(length.min(RESERVE_LIMIT));
			for _ in 0..length {
				values.push($reader.$read$(::<$order>)?()?);
			}
			values
		}
	};
}

macro_rules! read_list_of {
	($length:ident, $read:expr) => {
		{
			let mut values = Vec::with_capacity($length.min(RESERVE_LIMIT));
			for _ in 0..$length {
				values.push($read);
			}
			values
		}
	};
}

fn read_payload<R: Read>(reader: &mut R, id: TagID, depth: usize) -> NbtResult<Tag> {
	Ok(match id {
		TagID::End => return Err(NbtError::EndTagMarker),
		TagID::Byte => Tag::Byte(reader.read_i8()?),
		TagID::Short => Tag::Short(reader.read_i16::<BigEndian>()?),
		TagID::Int => Tag::Int(reader.read_i32::<BigEndian>()?),
		TagID::Long => Tag::Long(reader.read_i64::<BigEndian>()?),
		TagID::Float => Tag::Float(reader.read_f32::<BigEndian>()?),
		TagID::Double => Tag::Double(reader.read_f64::<BigEndian>()?),
		TagID::ByteArray => Tag::ByteArray(read_array!(reader, read_i8)),
		TagID::String => Tag::String(read_string(reader)?),
		TagID::List => Tag::List(read_list(reader, depth + 1)?),
		TagID::Compound => Tag::Compound(read_compound(reader, depth + 1)?),
		TagID::IntArray => Tag::IntArray(read_array!(reader, read_i32::<BigEndian>)),
		TagID::LongArray => Tag::LongArray(read_array!(reader, read_i64::<BigEndian>)),
	})
}

fn read_list<R: Read>(reader: &mut R, depth: usize) -> NbtResult<ListTag> {
	if depth > MAX_DEPTH {
		return Err(NbtError::DepthLimit);
	}
	let id = TagID::try_from(reader.read_u8()?)?;
	let length = read_length(reader)?;
	Ok(match id {
		TagID::End if length == 0 => ListTag::Empty,
		TagID::End => return Err(NbtError::UntypedList),
		TagID::Byte => ListTag::Byte(read_list_of!(length, reader.read_i8()?)),
		TagID::Short => ListTag::Short(read_list_of!(length, reader.read_i16::<BigEndian>()?)),
		TagID::Int => ListTag::Int(read_list_of!(length, reader.read_i32::<BigEndian>()?)),
		TagID::Long => ListTag::Long(read_list_of!(length, reader.read_i64::<BigEndian>()?)),
		TagID::Float => ListTag::Float(read_list_of!(length, reader.read_f32::<BigEndian>()?)),
		TagID::Double => ListTag::Double(read_list_of!(length, reader.read_f64::<BigEndian>()?)),
		TagID::ByteArray => ListTag::ByteArray(read_list_of!(length, read_array!(reader, read_i8))),
		TagID::String => ListTag::String(read_list_of!(length, read_string(reader)?)),
		TagID::List => ListTag::List(read_list_of!(length, read_list(reader, depth + 1)?)),
		TagID::Compound => ListTag::Compound(read_list_of!(length, read_compound(reader, depth + 1)?)),
		TagID::IntArray => ListTag::IntArray(read_list_of!(length, read_array!(reader, read_i32::<BigEndian>))),
		TagID::LongArray => ListTag::LongArray(read_list_of!(length, read_array!(reader, read_i64::<BigEndian>))),
	})
}

fn read_compound<R: Read>(reader: &mut R, depth: usize) -> NbtResult<Map> {
	if depth > MAX_DEPTH {
		return Err(NbtError::DepthLimit);
	}
	let mut map = Map::new();
	loop {
		let id = TagID::try_from(reader.read_u8()?)?;
		if id == TagID::End {
			break;
		}
		let name = read_string(reader)?;
		let tag = read_payload(reader, id, depth)?;
		if map.contains_key(&name) {
			return Err(NbtError::DuplicateKey(name.to_string()));
		}
		map.insert(name, tag);
	}
	Ok(map)
}

macro_rules! write_array {
	($writer:ident, $values:expr, $write:ident $(::<$order:ty>)?) => {
		{
			let mut size = write_length($writer, $values.len())?;
			for value in $values.iter() {
				$writer.$write$(::<$order>)?(*value)?;
				size += std::mem::size_of_val(value);
			}
			size
		}
	};
}

fn write_payload<W: Write>(writer: &mut W, tag: &Tag) -> NbtResult<usize> {
	Ok(match tag {
		Tag::Byte(value) => { writer.write_i8(*value)?; 1 }
		Tag::Short(value) => { writer.write_i16::<BigEndian>(*value)?; 2 }
		Tag::Int(value) => { writer.write_i32::<BigEndian>(*value)?; 4 }
		Tag::Long(value) => { writer.write_i64::<BigEndian>(*value)?; 8 }
		Tag::Float(value) => { writer.write_f32::<BigEndian>(*value)?; 4 }
		Tag::Double(value) => { writer.write_f64::<BigEndian>(*value)?; 8 }
		Tag::ByteArray(values) => write_array!(writer, values, write_i8),
		Tag::String(value) => write_string(writer, value)?,
		Tag::List(list) => write_list(writer, list)?,
		Tag::Compound(map) => write_compound(writer, map)?,
		Tag::IntArray(values) => write_array!(writer, values, write_i32::<BigEndian>),
		Tag::LongArray(values) => write_array!(writer, values, write_i64::<BigEndian>),
	})
}

fn write_list<W: Write>(writer: &mut W, list: &ListTag) -> NbtResult<usize> {
	writer.write_u8(list.id().value())?;
	let mut size = 1 + write_length(writer, list.len())?;
	match list {
		ListTag::Empty => (),
		ListTag::Byte(values) => for value in values { writer.write_i8(*value)?; size += 1; },
		ListTag::Short(values) => for value in values { writer.write_i16::<BigEndian>(*value)?; size += 2; },
		ListTag::Int(values) => for value in values { writer.write_i32::<BigEndian>(*value)?; size += 4; },
		ListTag::Long(values) => for value in values { writer.write_i64::<BigEndian>(*value)?; size += 8; },
		ListTag::Float(values) => for value in values { writer.write_f32::<BigEndian>(*value)?; size += 4; },
		ListTag::Double(values) => for value in values { writer.write_f64::<BigEndian>(*value)?; size += 8; },
		ListTag::ByteArray(arrays) => for values in arrays { size += write_array!(writer, values, write_i8); },
		ListTag::String(values) => for value in values { size += write_string(writer, value)?; },
		ListTag::List(lists) => for inner in lists { size += write_list(writer, inner)?; },
		ListTag::Compound(maps) => for map in maps { size += write_compound(writer, map)?; },
		ListTag::IntArray(arrays) => for values in arrays { size += write_array!(writer, values, write_i32::<BigEndian>); },
		ListTag::LongArray(arrays) => for values in arrays { size += write_array!(writer, values, write_i64::<BigEndian>); },
	}
	Ok(size)
}

fn write_compound<W: Write>(writer: &mut W, map: &Map) -> NbtResult<usize> {
	let mut size = 0;
	for (name, tag) in map {
		writer.write_u8(tag.id().value())?;
		size += 1 + write_string(writer, name)?;
		size += write_payload(writer, tag)?;
	}
	writer.write_u8(TagID::End.value())?;
	Ok(size + 1)
}

impl NbtRead for NamedTag {
	fn nbt_read<R: Read>(reader: &mut R) -> NbtResult<Self> {
		let id = TagID::try_from(reader.read_u8()?)?;
		if id == TagID::End {
			return Err(NbtError::EndTagMarker);
		}
		let name = read_string(reader)?;
		let tag = read_payload(reader, id, 0)?;
		Ok(NamedTag { name, tag })
	}
}

impl NbtWrite for NamedTag {
	fn nbt_write<W: Write>(&self, writer: &mut W) -> NbtResult<usize> {
		writer.write_u8(self.tag.id().value())?;
		let size = 1 + write_string(writer, &self.name)?;
		Ok(size + write_payload(writer, &self.tag)?)
	}
}

impl Readable for NamedTag {
	fn read_from<R: Read>(reader: &mut R) -> McResult<Self> {
		Ok(NamedTag::nbt_read(reader)?)
	}
}

impl Writable for NamedTag {
	fn write_to<W: Write>(&self, writer: &mut W) -> McResult<usize> {
		Ok(self.nbt_write(writer)?)
	}
}

/// Decodes a tree from memory, requiring that every byte is consumed.
pub fn from_bytes(bytes: &[u8]) -> NbtResult<NamedTag> {
	let mut reader = bytes;
	let tag = NamedTag::nbt_read(&mut reader)?;
	if !reader.is_empty() {
		return Err(NbtError::IoError(std::io::Error::new(
			std::io::ErrorKind::InvalidData,
			format!("{} trailing bytes after root tag", reader.len()),
		)));
	}
	Ok(tag)
}

pub fn to_bytes(tag: &NamedTag) -> NbtResult<Vec<u8>> {
	let mut buffer = Vec::with_capacity(4096);
	tag.nbt_write(&mut buffer)?;
	Ok(buffer)
}

/// Reads a standalone tag file such as a claim file.
/// The file may be gzip-compressed, zlib-compressed, or raw.
pub fn read_nbt_file<P: AsRef<Path>>(path: P) -> McResult<NamedTag> {
	let mut bytes = Vec::new();
	BufReader::new(File::open(path)?).read_to_end(&mut bytes)?;
	let tag = match bytes.as_slice() {
		[0x1F, 0x8B, ..] => {
			let mut decoded = Vec::new();
			GzDecoder::new(bytes.as_slice()).read_to_end(&mut decoded)?;
			from_bytes(&decoded)?
		}
		[0x78, second, ..] if (0x7800u16 | *second as u16) % 31 == 0 => {
			let mut decoded = Vec::new();
			ZlibDecoder::new(bytes.as_slice()).read_to_end(&mut decoded)?;
			from_bytes(&decoded)?
		}
		_ => from_bytes(&bytes)?,
	};
	Ok(tag)
}

/// Writes an uncompressed tag file.
pub fn write_nbt_file<P: AsRef<Path>>(path: P, tag: &NamedTag) -> McResult<()> {
	let bytes = to_bytes(tag)?;
	std::fs::write(path, bytes)?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::{Rng, SeedableRng, rngs::StdRng};
	use flate2::{write::GzEncoder, Compression};

	fn sample_tree() -> NamedTag {
		let mut position = Map::new();
		position.insert("x".into(), Tag::Int(5));
		position.insert("z".into(), Tag::Int(-7));
		let mut root = Map::new();
		root.insert("DataVersion".into(), Tag::Int(3465));
		root.insert("Status".into(), Tag::from("minecraft:full"));
		root.insert("block_entities".into(), Tag::List(ListTag::Compound(Vec::new())));
		root.insert("PostProcessing".into(), Tag::List(ListTag::List(vec![ListTag::Empty, ListTag::Short(vec![1, 2])])));
		root.insert("positions".into(), Tag::List(ListTag::Compound(vec![position])));
		root.insert("heights".into(), Tag::LongArray(vec![i64::MIN, 0, i64::MAX]));
		root.insert("light".into(), Tag::ByteArray(vec![-1, 0, 1]));
		root.insert("Position".into(), Tag::IntArray(vec![5, -7]));
		root.insert("nan".into(), Tag::Float(f32::from_bits(0x7FC0_0001)));
		root.insert("name\0".into(), Tag::from("Ch\u{e2}teau \u{1F3F0}"));
		NamedTag::root(root)
	}

	#[test]
	fn encode_decode_is_byte_identical() {
		let tree = sample_tree();
		let bytes = to_bytes(&tree).unwrap();
		let decoded = from_bytes(&bytes).unwrap();
		let reencoded = to_bytes(&decoded).unwrap();
		assert_eq!(bytes, reencoded);
	}

	fn string_tag(name: &[u8], value: &[u8]) -> Vec<u8> {
		let mut bytes = vec![8u8];
		bytes.extend_from_slice(&(name.len() as u16).to_be_bytes());
		bytes.extend_from_slice(name);
		bytes.extend_from_slice(&(value.len() as u16).to_be_bytes());
		bytes.extend_from_slice(value);
		bytes
	}

	#[test]
	fn java_strings_are_written_back_unchanged() {
		let values: [&[u8]; 5] = [
			// Unpaired high surrogate.
			&[b'S', b'i', b'g', b'n', 0xED, 0xA0, 0xBC],
			// 4-byte UTF-8.
			&[0xF0, 0x9F, 0x8F, 0xB0],
			// Overlong 'A'.
			&[0xC1, 0x81],
			// Raw NUL.
			&[0x00],
			// Pair written as surrogates.
			&[0xED, 0xA0, 0xBC, 0xED, 0xBF, 0xB0],
		];
		for value in values {
			for bytes in [string_tag(b"", value), string_tag(value, b"text")] {
				let decoded = from_bytes(&bytes).unwrap();
				assert_eq!(to_bytes(&decoded).unwrap(), bytes);
			}
		}

		let mut compound = vec![10u8, 0, 0];
		compound.extend(string_tag(&[0xED, 0xB0, 0x80], &[0xED, 0xA0, 0x80]));
		compound.extend(string_tag(b"Text", b"plain"));
		compound.push(0);
		let decoded = from_bytes(&compound).unwrap();
		assert_eq!(decoded.tag.get("\u{FFFD}").and_then(Tag::as_str), Some("\u{FFFD}"));
		assert_eq!(to_bytes(&decoded).unwrap(), compound);
	}

	#[test]
	fn write_size_matches_buffer() {
		let tree = sample_tree();
		let mut buffer = Vec::new();
		let size = tree.nbt_write(&mut buffer).unwrap();
		assert_eq!(size, buffer.len());
	}

	#[test]
	fn compound_order_is_preserved() {
		let mut map = Map::new();
		for key in ["zeta", "alpha", "mu"] {
			map.insert(key.into(), Tag::Byte(1));
		}
		let decoded = from_bytes(&to_bytes(&NamedTag::root(map)).unwrap()).unwrap();
		let keys: Vec<&str> = decoded.tag.as_compound().unwrap().keys().map(|key| key.as_str()).collect();
		assert_eq!(keys, ["zeta", "alpha", "mu"]);
	}

	#[test]
	fn truncated_input_fails_at_every_cut() {
		let bytes = to_bytes(&sample_tree()).unwrap();
		let mut rng = StdRng::seed_from_u64(0x5EED);
		for _ in 0..64 {
			let cut = rng.gen_range(0..bytes.len());
			assert!(from_bytes(&bytes[..cut]).is_err(), "cut at {cut} decoded");
		}
	}

	#[test]
	fn type_inconsistent_input_is_rejected() {
		// Compound containing an unknown tag id.
		let bytes = [10u8, 0, 0, 42, 0, 1, b'a'];
		assert!(matches!(from_bytes(&bytes), Err(NbtError::UnsupportedTagId(42))));
		// List of End with a non-zero length.
		let bytes = [9u8, 0, 0, 0, 0, 0, 0, 2];
		assert!(matches!(from_bytes(&bytes), Err(NbtError::UntypedList)));
		// Negative array length.
		let bytes = [11u8, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF];
		assert!(matches!(from_bytes(&bytes), Err(NbtError::NegativeLength(-1))));
		// Root End tag.
		assert!(matches!(from_bytes(&[0u8]), Err(NbtError::EndTagMarker)));
	}

	#[test]
	fn duplicate_keys_are_rejected() {
		let bytes = [10u8, 0, 0, 1, 0, 1, b'a', 1, 1, 0, 1, b'a', 2, 0];
		assert!(matches!(from_bytes(&bytes), Err(NbtError::DuplicateKey(_))));
	}

	#[test]
	fn deep_nesting_is_rejected() {
		let mut bytes = vec![9u8, 0, 0];
		for _ in 0..(MAX_DEPTH + 2) {
			bytes.extend_from_slice(&[9, 0, 0, 0, 1]);
		}
		assert!(matches!(from_bytes(&bytes), Err(NbtError::DepthLimit)));
	}

	#[test]
	fn reads_gzipped_files() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("claim.nbt");
		let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
		sample_tree().nbt_write(&mut encoder).unwrap();
		std::fs::write(&path, encoder.finish().unwrap()).unwrap();
		let expected = to_bytes(&sample_tree()).unwrap();
		assert_eq!(to_bytes(&read_nbt_file(&path).unwrap()).unwrap(), expected);

		let raw = dir.path().join("raw.nbt");
		write_nbt_file(&raw, &sample_tree()).unwrap();
		assert_eq!(to_bytes(&read_nbt_file(&raw).unwrap()).unwrap(), expected);
	}
}
