//! A whole region file held in memory.

use std::{
	fs::File,
	io::Write,
	path::{Path, PathBuf},
	str::FromStr,
	sync::OnceLock,
};

use flate2::Compression;
use regex::Regex;
use tempfile::NamedTempFile;

use crate::{
	McError,
	McResult,
	world::{
		chunk::Chunk,
		io::region::{
			HEADER_SIZE,
			coord::{RegionCoord, REGION_COORD_RANGE},
			header::RegionHeader,
			reader::RegionReader,
			writer::RegionWriter,
		},
	},
};

/// The coordinate of a region, parsed from `r.<x>.<z>.<ext>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegionFileName {
	pub x: i32,
	pub z: i32,
	pub extension: String,
}

fn region_name_pattern() -> &'static Regex {
	static PATTERN: OnceLock<Regex> = OnceLock::new();
	PATTERN.get_or_init(|| {
		Regex::new(r"^r\.(-?\d+)\.(-?\d+)\.(\w+)$").expect("valid region name pattern")
	})
}

impl FromStr for RegionFileName {
	type Err = McError;

	fn from_str(name: &str) -> Result<Self, Self::Err> {
		let invalid = || McError::InvalidRegionFileName(name.to_owned());
		let captures = region_name_pattern().captures(name).ok_or_else(invalid)?;
		let coord = |index: usize| {
			captures[index].parse::<i32>()
				.ok()
				.filter(|value| REGION_COORD_RANGE.contains(value))
				.ok_or_else(invalid)
		};
		Ok(Self {
			x: coord(1)?,
			z: coord(2)?,
			extension: captures[3].to_owned(),
		})
	}
}

impl RegionFileName {
	pub fn from_path(path: &Path) -> McResult<Self> {
		let name = path.file_name()
			.and_then(|name| name.to_str())
			.ok_or_else(|| McError::InvalidRegionFileName(path.display().to_string()))?;
		name.parse()
	}
}

impl std::fmt::Display for RegionFileName {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "r.{}.{}.{}", self.x, self.z, self.extension)
	}
}

/// A chunk that could not be decoded when the region was opened.
#[derive(Debug)]
pub struct ChunkFailure {
	pub slot: RegionCoord,
	pub error: McError,
}

/// Up to 1024 chunks addressed by local coordinate.
pub struct Region {
	pub x: i32,
	pub z: i32,
	chunks: Vec<Option<Chunk>>,
	/// Chunks that failed to decode and are treated as absent.
	pub failures: Vec<ChunkFailure>,
}

impl Region {
	/// Creates a region with no chunks.
	pub fn new_empty(x: i32, z: i32) -> Self {
		Self {
			x,
			z,
			chunks: (0..1024).map(|_| None).collect(),
			failures: Vec::new(),
		}
	}

	/// Reads every chunk in a region file.
	/// Corrupt chunks do not fail the whole file; they are recorded in
	/// [Region::failures] and left absent.
	pub fn open<P: AsRef<Path>>(path: P) -> McResult<Self> {
		let path = path.as_ref();
		let metadata = match std::fs::metadata(path) {
			Ok(metadata) => metadata,
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
				return Err(McError::ContainerNotFound(path.to_owned()));
			}
			Err(err) => return Err(err.into()),
		};
		let file_size = metadata.len();
		if file_size == 0 {
			return Err(McError::EmptyContainer(path.to_owned()));
		}
		if file_size < HEADER_SIZE {
			return Err(McError::InvalidRegionFile);
		}
		let name = RegionFileName::from_path(path)?;
		let mut region = Region::new_empty(name.x, name.z);
		let mut reader = RegionReader::open_with_capacity(64 * 1024, path)?;
		let header = reader.read_header()?;
		for slot in RegionCoord::all() {
			let sector = header.sectors[slot];
			if sector.is_empty() {
				continue;
			}
			if !sector.fits_within(file_size) {
				region.failures.push(ChunkFailure { slot, error: McError::SectorOutOfBounds });
				continue;
			}
			let decoded = reader.read_chunk(sector)
				.and_then(|tag| match tag {
					Some(tag) => Chunk::from_tag(slot, header.timestamps[slot], tag).map(Some),
					None => Ok(None),
				});
			match decoded {
				Ok(chunk) => region.chunks[slot.index()] = chunk,
				Err(error) => region.failures.push(ChunkFailure { slot, error }),
			}
		}
		Ok(region)
	}

	pub fn lookup(&self, slot: RegionCoord) -> Option<&Chunk> {
		self.chunks[slot.index()].as_ref()
	}

	/// Removes the chunk at `slot`, handing over ownership.
	pub fn take(&mut self, slot: RegionCoord) -> Option<Chunk> {
		self.chunks[slot.index()].take()
	}

	/// Stores a chunk in its slot, replacing whatever was there.
	pub fn insert(&mut self, chunk: Chunk) -> Option<Chunk> {
		let index = chunk.slot.index();
		self.chunks[index].replace(chunk)
	}

	pub fn len(&self) -> usize {
		self.chunks.iter().filter(|chunk| chunk.is_some()).count()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
		self.chunks.iter().flatten()
	}

	/// Writes the region to a temporary file next to `path`, then moves
	/// it over `path` so readers never see a partial file.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> McResult<()> {
		let path = path.as_ref();
		let directory = path.parent()
			.filter(|parent| !parent.as_os_str().is_empty())
			.map(Path::to_path_buf)
			.unwrap_or_else(|| PathBuf::from("."));
		let mut temp = NamedTempFile::new_in(&directory)?;
		if let Ok(existing) = std::fs::metadata(path) {
			temp.as_file().set_permissions(existing.permissions())?;
		}
		self.write_to_file(temp.as_file_mut())?;
		temp.persist(path).map_err(|err| err.error)?;
		Ok(())
	}

	fn write_to_file(&self, file: &mut File) -> McResult<()> {
		let mut writer = RegionWriter::<&mut File>::with_capacity(64 * 1024, file);
		let mut header = RegionHeader::default();
		writer.write_empty_header()?;
		for chunk in self.chunks() {
			let sector = writer.write_data_to_sector(Compression::default(), &chunk.root)?;
			header.sectors[chunk.slot] = sector;
			header.timestamps[chunk.slot] = chunk.timestamp;
		}
		writer.write_header(&header)?;
		let mut inner = writer.finish();
		inner.flush()?;
		inner.into_inner().map_err(|err| err.into_error())?.sync_all()?;
		Ok(())
	}
}

impl std::fmt::Debug for Region {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Region")
			.field("x", &self.x)
			.field("z", &self.z)
			.field("chunks", &self.len())
			.field("failures", &self.failures.len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		compound,
		nbt::{NamedTag, Tag},
		world::io::region::timestamp::Timestamp,
	};

	fn chunk(x: i32, z: i32, marker: i32) -> Chunk {
		let tag = compound! {
			("DataVersion", 3465i32),
			("xPos", x),
			("zPos", z),
			("marker", marker),
		};
		Chunk::from_tag(RegionCoord::from_absolute(x, z), Timestamp::from(1_700_000_000u32), NamedTag::new("", tag)).unwrap()
	}

	#[test]
	fn parses_region_file_names() {
		let name: RegionFileName = "r.-1.12.mca".parse().unwrap();
		assert_eq!((name.x, name.z, name.extension.as_str()), (-1, 12, "mca"));
		assert_eq!(name.to_string(), "r.-1.12.mca");
		assert!("r.1.mca".parse::<RegionFileName>().is_err());
		assert!("region.0.0.mca".parse::<RegionFileName>().is_err());
	}

	#[test]
	fn extreme_region_coordinates_are_rejected() {
		let edge: RegionFileName = "r.67108863.-67108864.mca".parse().unwrap();
		assert_eq!(RegionCoord::new(31, 0).absolute(edge.x, edge.z), (i32::MAX, i32::MIN));
		for name in ["r.2147483647.0.mca", "r.0.-67108865.mca", "r.67108864.0.mca", "r.99999999999.0.mca"] {
			assert!(matches!(name.parse::<RegionFileName>(), Err(McError::InvalidRegionFileName(_))), "{name}");
		}
	}

	#[test]
	fn save_then_open() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("r.-1.0.mca");
		let mut region = Region::new_empty(-1, 0);
		region.insert(chunk(-32, 0, 1));
		region.insert(chunk(-1, 31, 2));
		region.save(&path).unwrap();

		let opened = Region::open(&path).unwrap();
		assert_eq!((opened.x, opened.z), (-1, 0));
		assert_eq!(opened.len(), 2);
		assert!(opened.failures.is_empty());
		let slot = RegionCoord::from_absolute(-1, 31);
		let found = opened.lookup(slot).unwrap();
		assert_eq!(found.position(), (-1, 31));
		assert_eq!(found.root.tag.get("marker").and_then(Tag::as_i32), Some(2));
		assert_eq!(found.timestamp, Timestamp::from(1_700_000_000u32));
		assert!(opened.lookup(RegionCoord::new(5, 5)).is_none());
	}

	#[test]
	fn insert_overwrites_and_take_moves() {
		let mut region = Region::new_empty(0, 0);
		assert!(region.insert(chunk(3, 3, 1)).is_none());
		let replaced = region.insert(chunk(3, 3, 2)).unwrap();
		assert_eq!(replaced.root.tag.get("marker").and_then(Tag::as_i32), Some(1));
		let taken = region.take(RegionCoord::new(3, 3)).unwrap();
		assert_eq!(taken.root.tag.get("marker").and_then(Tag::as_i32), Some(2));
		assert!(region.is_empty());
	}

	#[test]
	fn open_distinguishes_missing_and_empty() {
		let dir = tempfile::tempdir().unwrap();
		let missing = dir.path().join("r.0.0.mca");
		assert!(matches!(Region::open(&missing), Err(McError::ContainerNotFound(_))));
		std::fs::write(&missing, b"").unwrap();
		assert!(matches!(Region::open(&missing), Err(McError::EmptyContainer(_))));
		std::fs::write(&missing, [0u8; 100]).unwrap();
		assert!(matches!(Region::open(&missing), Err(McError::InvalidRegionFile)));
		let misnamed = dir.path().join("region.mca");
		std::fs::write(&misnamed, [0u8; 8192]).unwrap();
		assert!(matches!(Region::open(&misnamed), Err(McError::InvalidRegionFileName(_))));
	}

	#[test]
	fn corrupt_chunk_is_recorded_not_fatal() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("r.0.0.mca");
		let mut region = Region::new_empty(0, 0);
		region.insert(chunk(0, 0, 1));
		region.insert(chunk(1, 0, 2));
		region.save(&path).unwrap();
		// Point slot (1, 0) past the end of the file.
		let mut bytes = std::fs::read(&path).unwrap();
		bytes[4..8].copy_from_slice(&[0, 0, 100, 1]);
		std::fs::write(&path, bytes).unwrap();

		let opened = Region::open(&path).unwrap();
		assert_eq!(opened.len(), 1);
		assert_eq!(opened.failures.len(), 1);
		assert_eq!(opened.failures[0].slot, RegionCoord::new(1, 0));
	}
}
