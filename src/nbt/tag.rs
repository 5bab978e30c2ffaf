use crate::nbt::{
	Map,
	NbtError,
	NbtString,
	tagtype::*,
};

/// The one-byte type marker that precedes every tag on disk.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagID {
	End = 0,
	Byte = 1,
	Short = 2,
	Int = 3,
	Long = 4,
	Float = 5,
	Double = 6,
	ByteArray = 7,
	String = 8,
	List = 9,
	Compound = 10,
	IntArray = 11,
	LongArray = 12,
}

impl TagID {
	pub fn value(self) -> u8 {
		self as u8
	}

}

impl TryFrom<u8> for TagID {
	type Error = NbtError;

	fn try_from(value: u8) -> Result<Self, Self::Error> {
		Ok(match value {
			0 => TagID::End,
			1 => TagID::Byte,
			2 => TagID::Short,
			3 => TagID::Int,
			4 => TagID::Long,
			5 => TagID::Float,
			6 => TagID::Double,
			7 => TagID::ByteArray,
			8 => TagID::String,
			9 => TagID::List,
			10 => TagID::Compound,
			11 => TagID::IntArray,
			12 => TagID::LongArray,
			unexpected => return Err(NbtError::UnsupportedTagId(unexpected)),
		})
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
	Byte(Byte),
	Short(Short),
	Int(Int),
	Long(Long),
	Float(Float),
	Double(Double),
	ByteArray(ByteArray),
	String(String),
	List(ListTag),
	Compound(Compound),
	IntArray(IntArray),
	LongArray(LongArray),
}

/// A homogenous list of tags.
/// An empty list keeps its declared element type (`Compound(vec![])` is not
/// the same thing as `Empty`) so that it is written back the way it was read.
#[derive(Debug, Clone, PartialEq)]
pub enum ListTag {
	Empty,
	Byte(Vec<Byte>),
	Short(Vec<Short>),
	Int(Vec<Int>),
	Long(Vec<Long>),
	Float(Vec<Float>),
	Double(Vec<Double>),
	ByteArray(Vec<ByteArray>),
	String(Vec<String>),
	List(Vec<ListTag>),
	Compound(Vec<Compound>),
	IntArray(Vec<IntArray>),
	LongArray(Vec<LongArray>),
}

/// The root of a tag tree: a single tag with a name (usually empty).
#[derive(Debug, Clone, PartialEq)]
pub struct NamedTag {
	pub name: String,
	pub tag: Tag,
}

impl Tag {
	pub fn id(&self) -> TagID {
		match self {
			Tag::Byte(_) => TagID::Byte,
			Tag::Short(_) => TagID::Short,
			Tag::Int(_) => TagID::Int,
			Tag::Long(_) => TagID::Long,
			Tag::Float(_) => TagID::Float,
			Tag::Double(_) => TagID::Double,
			Tag::ByteArray(_) => TagID::ByteArray,
			Tag::String(_) => TagID::String,
			Tag::List(_) => TagID::List,
			Tag::Compound(_) => TagID::Compound,
			Tag::IntArray(_) => TagID::IntArray,
			Tag::LongArray(_) => TagID::LongArray,
		}
	}

	/// Looks up a child of a Compound tag.
	pub fn get(&self, key: &str) -> Option<&Tag> {
		match self {
			Tag::Compound(map) => map.get(key),
			_ => None,
		}
	}

	/// Any integral tag widened to i64.
	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Tag::Byte(value) => Some(*value as i64),
			Tag::Short(value) => Some(*value as i64),
			Tag::Int(value) => Some(*value as i64),
			Tag::Long(value) => Some(*value),
			_ => None,
		}
	}

	/// Any integral tag that fits in an i32.
	pub fn as_i32(&self) -> Option<i32> {
		self.as_i64().and_then(|value| i32::try_from(value).ok())
	}

	pub fn as_string(&self) -> Option<&NbtString> {
		match self {
			Tag::String(value) => Some(value),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		self.as_string().map(NbtString::as_str)
	}

	pub fn as_list(&self) -> Option<&ListTag> {
		match self {
			Tag::List(list) => Some(list),
			_ => None,
		}
	}

	pub fn as_compound(&self) -> Option<&Map> {
		match self {
			Tag::Compound(map) => Some(map),
			_ => None,
		}
	}

	pub fn into_compound(self) -> Option<Map> {
		match self {
			Tag::Compound(map) => Some(map),
			_ => None,
		}
	}
}

impl ListTag {
	/// The element type written in the list header.
	pub fn id(&self) -> TagID {
		match self {
			ListTag::Empty => TagID::End,
			ListTag::Byte(_) => TagID::Byte,
			ListTag::Short(_) => TagID::Short,
			ListTag::Int(_) => TagID::Int,
			ListTag::Long(_) => TagID::Long,
			ListTag::Float(_) => TagID::Float,
			ListTag::Double(_) => TagID::Double,
			ListTag::ByteArray(_) => TagID::ByteArray,
			ListTag::String(_) => TagID::String,
			ListTag::List(_) => TagID::List,
			ListTag::Compound(_) => TagID::Compound,
			ListTag::IntArray(_) => TagID::IntArray,
			ListTag::LongArray(_) => TagID::LongArray,
		}
	}

	pub fn len(&self) -> usize {
		match self {
			ListTag::Empty => 0,
			ListTag::Byte(list) => list.len(),
			ListTag::Short(list) => list.len(),
			ListTag::Int(list) => list.len(),
			ListTag::Long(list) => list.len(),
			ListTag::Float(list) => list.len(),
			ListTag::Double(list) => list.len(),
			ListTag::ByteArray(list) => list.len(),
			ListTag::String(list) => list.len(),
			ListTag::List(list) => list.len(),
			ListTag::Compound(list) => list.len(),
			ListTag::IntArray(list) => list.len(),
			ListTag::LongArray(list) => list.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Returns the element at `index` widened to an owned integer, if the
	/// list holds an integral type.
	pub fn int_at(&self, index: usize) -> Option<i64> {
		match self {
			ListTag::Byte(list) => list.get(index).map(|v| *v as i64),
			ListTag::Short(list) => list.get(index).map(|v| *v as i64),
			ListTag::Int(list) => list.get(index).map(|v| *v as i64),
			ListTag::Long(list) => list.get(index).copied(),
			_ => None,
		}
	}

	pub fn compounds(&self) -> Option<&[Map]> {
		match self {
			ListTag::Compound(list) => Some(list),
			ListTag::Empty => Some(&[]),
			_ => None,
		}
	}
}

impl NamedTag {
	pub fn new<S: Into<NbtString>>(name: S, tag: Tag) -> Self {
		Self {
			name: name.into(),
			tag,
		}
	}

	/// A root compound with an empty name, the common shape of chunk payloads.
	pub fn root(map: Map) -> Self {
		Self::new("", Tag::Compound(map))
	}
}

macro_rules! __tag_from_impls {
	($($type:ty => $variant:ident;)+) => {
		$(
			impl From<$type> for Tag {
				fn from(value: $type) -> Self {
					Tag::$variant(value)
				}
			}

			impl From<Vec<$type>> for ListTag {
				fn from(value: Vec<$type>) -> Self {
					ListTag::$variant(value)
				}
			}
		)+
	};
}

__tag_from_impls!{
	Byte => Byte;
	Short => Short;
	Int => Int;
	Long => Long;
	Float => Float;
	Double => Double;
	String => String;
	ListTag => List;
	Map => Compound;
}

impl From<&str> for Tag {
	fn from(value: &str) -> Self {
		Tag::String(NbtString::from(value))
	}
}

impl From<std::string::String> for Tag {
	fn from(value: std::string::String) -> Self {
		Tag::String(NbtString::from(value))
	}
}

impl From<ByteArray> for Tag {
	fn from(value: ByteArray) -> Self {
		Tag::ByteArray(value)
	}
}

impl From<IntArray> for Tag {
	fn from(value: IntArray) -> Self {
		Tag::IntArray(value)
	}
}

impl From<LongArray> for Tag {
	fn from(value: LongArray) -> Self {
		Tag::LongArray(value)
	}
}
