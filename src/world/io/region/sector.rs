use std::io::{Read, SeekFrom, Write};

use crate::{
	McResult,
	ioext::*,
	world::io::region::{HEADER_SIZE, SECTOR_SIZE},
};

/// One sector table entry: a 3-byte sector offset and a 1-byte sector
/// count, packed into a big-endian `u32` exactly as stored.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct RegionSector(u32);

impl RegionSector {
	/// `offset` and `count` are in sectors. Offsets above 24 bits are cut.
	pub fn new(offset: u32, count: u8) -> Self {
		Self((offset << 8) | u32::from(count))
	}

	pub const fn empty() -> Self {
		Self(0)
	}

	pub fn sector_offset(&self) -> u64 {
		u64::from(self.0 >> 8)
	}

	pub fn sector_count(&self) -> u64 {
		u64::from(self.0 & 0xFF)
	}

	/// First sector after this one.
	pub fn sector_end_offset(&self) -> u64 {
		self.sector_offset() + self.sector_count()
	}

	/// Byte position of the chunk's length prefix.
	pub fn offset(&self) -> u64 {
		self.sector_offset() * SECTOR_SIZE
	}

	pub fn end_offset(&self) -> u64 {
		self.sector_end_offset() * SECTOR_SIZE
	}

	/// Bytes reserved for the chunk, padding included.
	pub fn size(&self) -> u64 {
		self.sector_count() * SECTOR_SIZE
	}

	/// Absent chunks have an all-zero entry.
	pub fn is_empty(&self) -> bool {
		self.0 == 0
	}

	/// Whether the entry can hold a chunk in a file of `file_size` bytes:
	/// past the header, at least one sector, and inside the file.
	pub fn fits_within(&self, file_size: u64) -> bool {
		self.offset() >= HEADER_SIZE
			&& self.sector_count() > 0
			&& self.end_offset() <= file_size
	}
}

impl Readable for RegionSector {
	fn read_from<R: Read>(reader: &mut R) -> McResult<Self> {
		reader.read_value().map(Self)
	}
}

impl Writable for RegionSector {
	fn write_to<W: Write>(&self, writer: &mut W) -> McResult<usize> {
		writer.write_value(self.0)
	}
}

impl Seekable for RegionSector {
	fn seeker(&self) -> SeekFrom {
		SeekFrom::Start(self.offset())
	}
}
