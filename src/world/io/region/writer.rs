use std::io::{
	Write,
	BufWriter,
	Seek, SeekFrom,
};

use crate::{
	ioext::*,
	McResult, McError,
};

use super::{
	compressionscheme::*,
	header::*,
	sector::*,
	is_multiple_of_4096,
	required_sectors,
	pad_size,
	HEADER_SIZE,
};

use flate2::{
	Compression,
	write::ZlibEncoder,
};

/// An abstraction for writing Region files.
/// Write an empty header, write each chunk with `write_data_to_sector`
/// while recording the returned sectors, then go back and write the
/// real header. Call `.finish()` to take the writer back.
pub struct RegionWriter<W: Write + Seek> {
	writer: W,
}

impl<W: Write + Seek> Write for RegionWriter<W> {
	fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
		self.writer.write(buf)
	}

	fn flush(&mut self) -> std::io::Result<()> {
		self.writer.flush()
	}
}

impl<W: Write + Seek> Seek for RegionWriter<W> {
	fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
		self.writer.seek(pos)
	}
}

impl<W: Write + Seek> RegionWriter<W> {
	pub fn new(writer: W) -> Self {
		Self {
			writer,
		}
	}

	pub fn with_capacity(capacity: usize, inner: W) -> RegionWriter<BufWriter<W>> {
		RegionWriter::<BufWriter<W>>{
			writer: BufWriter::with_capacity(capacity, inner)
		}
	}

	/// Writes an 8KiB zeroed header. Assumes the writer is at the
	/// start of the file.
	pub fn write_empty_header(&mut self) -> McResult<u64> {
		Ok(self.writer.write_zeroes(HEADER_SIZE)?)
	}

	/// Seeks to the beginning of the stream and writes a header, then
	/// returns to where the stream was.
	pub fn write_header(&mut self, header: &RegionHeader) -> McResult<()> {
		let ret = self.writer.seek_return()?;
		self.writer.seek(SeekFrom::Start(0))?;
		header.write_to(&mut self.writer)?;
		self.writer.seek(ret)?;
		Ok(())
	}

	/// Writes zlib-compressed data starting at the current position,
	/// which must be on a 4KiB boundary, then pads to the next boundary.
	/// The header is not touched. Returns the sector that was written to.
	pub fn write_data_to_sector<T: Writable>(
		&mut self,
		compression: Compression,
		data: &T
	) -> McResult<RegionSector> {
		let sector_offset = self.writer.stream_position()?;
		if !is_multiple_of_4096(sector_offset) {
			return Err(McError::StreamSectorBoundaryError);
		}
		// Length placeholder.
		self.writer.write_all(&[0u8; 4])?;
		self.writer.write_value(CompressionScheme::ZLib)?;
		let mut compressor = ZlibEncoder::new(
			&mut self.writer,
			compression
		);
		data.write_to(&mut compressor)?;
		compressor.finish()?;
		let final_offset: u64 = self.writer.stream_position()?;
		// Includes the compression byte.
		let length: u64 = (final_offset - sector_offset) - 4;
		let sector_count = required_sectors((length + 4) as u32);
		if sector_count > 255 || length > u32::MAX as u64 {
			return Err(McError::ChunkTooLarge);
		}
		self.writer.write_zeroes(pad_size(length + 4))?;
		let return_position = self.writer.seek_return()?;
		self.writer.seek(SeekFrom::Start(sector_offset))?;
		self.writer.write_value(length as u32)?;
		self.writer.seek(return_position)?;
		Ok(RegionSector::new(
			sector_offset.overflowing_shr(12).0 as u32,
			sector_count as u8
		))
	}

	/// Returns the inner writer.
	pub fn finish(self) -> W {
		self.writer
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use super::super::{
		coord::RegionCoord,
		reader::RegionReader,
		timestamp::Timestamp,
	};
	use crate::nbt::{Map, NamedTag, Tag};
	use std::io::Cursor;

	#[test]
	fn written_chunks_can_be_read_back() {
		let mut root = Map::new();
		root.insert("xPos".into(), Tag::Int(1));
		root.insert("zPos".into(), Tag::Int(2));
		let tag = NamedTag::root(root);

		let mut writer = RegionWriter::new(Cursor::new(Vec::new()));
		writer.write_empty_header().unwrap();
		let sector = writer.write_data_to_sector(Compression::default(), &tag).unwrap();
		assert_eq!(sector.sector_offset(), 2);
		assert_eq!(sector.sector_count(), 1);
		let mut header = RegionHeader::default();
		let coord = RegionCoord::new(1, 2);
		header.sectors[coord] = sector;
		header.timestamps[coord] = Timestamp::from(1234u32);
		writer.write_header(&header).unwrap();
		let bytes = writer.finish().into_inner();
		assert_eq!(bytes.len(), 3 * 4096);

		let mut reader = RegionReader::new(Cursor::new(bytes));
		let header = reader.read_header().unwrap();
		assert_eq!(header.timestamps[coord], Timestamp::from(1234u32));
		let chunk = reader.read_chunk(header.sectors[coord]).unwrap();
		assert_eq!(chunk, Some(tag));
	}

	#[test]
	fn writes_must_be_aligned() {
		let mut writer = RegionWriter::new(Cursor::new(Vec::new()));
		writer.write_all(&[0u8; 10]).unwrap();
		let tag = NamedTag::root(Map::new());
		assert!(matches!(
			writer.write_data_to_sector(Compression::default(), &tag),
			Err(McError::StreamSectorBoundaryError)
		));
	}
}
