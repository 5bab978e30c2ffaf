//! The tag-tree (NBT) format used by chunk payloads and claim files.
//!
//! Decoding then encoding any tree is byte-identical: compound key order is
//! kept, empty lists remember their element type, and strings keep the
//! exact modified UTF-8 bytes they were read from.

pub mod tag;
pub mod tagtype;
pub mod io;
pub mod mutf8;
pub mod string;
pub mod macros;

use thiserror::Error;

pub use tag::{
	Tag,
	TagID,
	ListTag,
	NamedTag,
};
pub use string::NbtString;

/// Compound storage. Insertion order is the on-disk order.
pub type Map = indexmap::IndexMap<NbtString, Tag>;

/// Nesting limit for compounds and lists, matching the game's own reader.
pub const MAX_DEPTH: usize = 512;

#[derive(Debug, Error)]
pub enum NbtError {
	#[error("IO Error: {0}")]
	IoError(#[from] std::io::Error),
	#[error("Unsupported Tag ID: {0}")]
	UnsupportedTagId(u8),
	#[error("Encountered the End Tag ID marker.")]
	EndTagMarker,
	#[error("Negative length: {0}")]
	NegativeLength(i32),
	#[error("Duplicate key in Compound: \"{0}\"")]
	DuplicateKey(String),
	#[error("Invalid modified UTF-8 string.")]
	InvalidString,
	#[error("Non-empty list declared with the End element type.")]
	UntypedList,
	#[error("Maximum nesting depth of {MAX_DEPTH} exceeded.")]
	DepthLimit,
	#[error("String is too long to encode ({0} bytes).")]
	StringTooLong(usize),
	#[error("Sequence is too long to encode ({0} elements).")]
	LengthOverflow(usize),
}

pub type NbtResult<T> = Result<T, NbtError>;
