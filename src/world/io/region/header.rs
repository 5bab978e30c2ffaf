use std::{
	io::{Read, Write},
	ops::{Index, IndexMut},
};

use crate::{
	McResult,
	ioext::*,
	world::io::region::{
		coord::RegionCoord,
		sector::RegionSector,
		timestamp::Timestamp,
	},
};

/// 1024 entries, one per slot, indexed by [RegionCoord].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionTable<T>(Box<[T; 1024]>);

pub type SectorTable = RegionTable<RegionSector>;
pub type TimestampTable = RegionTable<Timestamp>;

impl<T: Default + Copy> Default for RegionTable<T> {
	fn default() -> Self {
		Self(Box::new([T::default(); 1024]))
	}
}

impl<T> Index<RegionCoord> for RegionTable<T> {
	type Output = T;

	fn index(&self, coord: RegionCoord) -> &T {
		&self.0[coord.index()]
	}
}

impl<T> IndexMut<RegionCoord> for RegionTable<T> {
	fn index_mut(&mut self, coord: RegionCoord) -> &mut T {
		&mut self.0[coord.index()]
	}
}

impl<T: Readable + Default + Copy> Readable for RegionTable<T> {
	fn read_from<R: Read>(reader: &mut R) -> McResult<Self> {
		let mut table = Self::default();
		for entry in table.0.iter_mut() {
			*entry = T::read_from(reader)?;
		}
		Ok(table)
	}
}

impl<T: Writable> Writable for RegionTable<T> {
	fn write_to<W: Write>(&self, writer: &mut W) -> McResult<usize> {
		self.0.iter().try_fold(0, |total, entry| Ok(total + entry.write_to(writer)?))
	}
}

/// The first 8KiB of a region file: the sector table, then the timestamp table.
#[derive(Debug, Clone, Default)]
pub struct RegionHeader {
	pub sectors: SectorTable,
	pub timestamps: TimestampTable,
}

impl Readable for RegionHeader {
	fn read_from<R: Read>(reader: &mut R) -> McResult<Self> {
		let sectors = SectorTable::read_from(reader)?;
		let timestamps = TimestampTable::read_from(reader)?;
		Ok(Self { sectors, timestamps })
	}
}

impl Writable for RegionHeader {
	fn write_to<W: Write>(&self, writer: &mut W) -> McResult<usize> {
		Ok(self.sectors.write_to(writer)? + self.timestamps.write_to(writer)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Cursor;

	#[test]
	fn header_is_8kib() {
		let mut header = RegionHeader::default();
		let coord = RegionCoord::new(3, 1);
		header.sectors[coord] = RegionSector::new(2, 1);
		header.timestamps[coord] = Timestamp::from(77u32);
		let mut buffer = Vec::new();
		assert_eq!(header.write_to(&mut buffer).unwrap(), 8192);
		assert_eq!(buffer.len(), 8192);
		// slot 35, second table
		assert_eq!(&buffer[35 * 4..36 * 4], &[0, 0, 2, 1]);
		assert_eq!(&buffer[4096 + 35 * 4..4096 + 36 * 4], &[0, 0, 0, 77]);
		let read = RegionHeader::read_from(&mut Cursor::new(buffer)).unwrap();
		assert_eq!(read.sectors[coord], RegionSector::new(2, 1));
		assert_eq!(read.timestamps[coord], Timestamp::from(77u32));
		assert!(read.sectors[RegionCoord::new(0, 0)].is_empty());
	}
}
