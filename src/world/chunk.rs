//! Chunks as stored in region and entity files, and the rules used to
//! find their position and entity list across data versions.

use crate::{
	McError,
	McResult,
	nbt::{Map, NamedTag, Tag, ListTag},
	world::io::region::{
		coord::RegionCoord,
		timestamp::Timestamp,
	},
};

/// Assumed when a chunk has no `DataVersion` (anything older than snapshot 15w32a).
pub const VERSION_PRE_15W32A: i32 = -1;
/// Some entity files written by this version wrap the payload in an extra
/// compound with an empty name.
pub const VERSION_1_17_1: i32 = 2730;
/// Snapshot 21w43a flattened the `Level` compound and renamed
/// `TileEntities` to `block_entities`.
pub const VERSION_21W43A: i32 = 2844;

/// Where a chunk's position was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionSource {
	/// `xPos`/`zPos` (block region files).
	Region,
	/// `Position` (entity files).
	Entity,
	/// `Position` under the extra `""` compound.
	WrappedEntity,
}

/// What the extractor learned about a chunk payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkInfo {
	pub version: i32,
	pub x: i32,
	pub z: i32,
	pub source: PositionSource,
}

pub fn data_version(root: &Map) -> i32 {
	root.get("DataVersion")
		.and_then(Tag::as_i32)
		.unwrap_or(VERSION_PRE_15W32A)
}

/// The compound that holds the chunk's fields. Older chunks keep them
/// under `Level`.
pub fn payload(root: &Map, version: i32) -> &Map {
	if version >= VERSION_21W43A {
		return root;
	}
	root.get("Level")
		.and_then(Tag::as_compound)
		.unwrap_or(root)
}

fn compound_list<'a>(payload: &'a Map, key: &str) -> Option<&'a [Map]> {
	payload.get(key)
		.and_then(Tag::as_list)
		.and_then(ListTag::compounds)
}

/// The tile-entity list (or entity list for entity files).
/// Missing or non-compound lists are treated as empty.
pub fn entity_list(root: &Map, version: i32) -> &[Map] {
	let payload = payload(root, version);
	let primary = if version >= VERSION_21W43A {
		"block_entities"
	} else {
		"TileEntities"
	};
	compound_list(payload, primary)
		.or_else(|| compound_list(payload, "Entities"))
		.unwrap_or(&[])
}

fn read_position(map: &Map) -> Option<(i32, i32)> {
	match map.get("Position")? {
		Tag::IntArray(values) if values.len() == 2 => Some((values[0], values[1])),
		Tag::List(list) if list.len() == 2 => {
			let x = i32::try_from(list.int_at(0)?).ok()?;
			let z = i32::try_from(list.int_at(1)?).ok()?;
			Some((x, z))
		}
		_ => None,
	}
}

/// Finds the position of a chunk payload.
pub fn position(payload: &Map) -> Option<((i32, i32), PositionSource)> {
	let x = payload.get("xPos").and_then(Tag::as_i32);
	let z = payload.get("zPos").and_then(Tag::as_i32);
	if let (Some(x), Some(z)) = (x, z) {
		return Some(((x, z), PositionSource::Region));
	}
	if let Some(position) = read_position(payload) {
		return Some((position, PositionSource::Entity));
	}
	payload.get("")
		.and_then(Tag::as_compound)
		.and_then(read_position)
		.map(|position| (position, PositionSource::WrappedEntity))
}

/// Selects the extraction rule for a chunk by its declared version and the
/// fields present.
pub fn extract(root: &Map) -> McResult<ChunkInfo> {
	let version = data_version(root);
	let payload = payload(root, version);
	let ((x, z), source) = position(payload).ok_or(McError::UnrecoverablePosition)?;
	Ok(ChunkInfo { version, x, z, source })
}

/// A decoded chunk. Owned by whichever region currently holds it.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
	/// The slot this chunk occupies in its region.
	pub slot: RegionCoord,
	/// The per-chunk timestamp from the region header.
	pub timestamp: Timestamp,
	pub info: ChunkInfo,
	pub root: NamedTag,
}

impl Chunk {
	pub fn from_tag(slot: RegionCoord, timestamp: Timestamp, root: NamedTag) -> McResult<Self> {
		let map = root.tag.as_compound().ok_or(McError::UnrecoverablePosition)?;
		let info = extract(map)?;
		Ok(Self {
			slot,
			timestamp,
			info,
			root,
		})
	}

	/// Absolute chunk coordinate, as stored inside the chunk.
	pub fn position(&self) -> (i32, i32) {
		(self.info.x, self.info.z)
	}

	/// The chunk's entity or tile-entity list.
	pub fn entities(&self) -> &[Map] {
		match self.root.tag.as_compound() {
			Some(map) => entity_list(map, self.info.version),
			None => &[],
		}
	}
}
