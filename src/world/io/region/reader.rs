use std::{
	fs::File,
	path::Path,
	io::{
		BufReader,
		Read,
		Seek, SeekFrom,
	},
};
use crate::{
	McResult, McError,
	ioext::*,
	nbt::NamedTag,
};

use super::{
	header::*,
	sector::*,
	compressionscheme::*,
};

use flate2::{
	read::GzDecoder,
	read::ZlibDecoder,
};

/// An abstraction for reading Region files.
/// Read the header first, then read chunks from the sectors it points to.
pub struct RegionReader<R: Read + Seek> {
	reader: R,
}

impl RegionReader<BufReader<File>> {
	/// Opens a buffered file as a RegionReader.
	pub fn open_with_capacity(
		capacity: usize,
		path: impl AsRef<Path>,
	) -> McResult<RegionReader<BufReader<File>>> {
		let file = File::open(path)?;
		Ok(RegionReader::with_capacity(capacity, file))
	}
}

impl<R: Read + Seek> RegionReader<R> {
	pub fn new(reader: R) -> Self {
		Self {
			reader,
		}
	}

	pub fn with_capacity(capacity: usize, inner: R) -> RegionReader<BufReader<R>> {
		RegionReader {
			reader: BufReader::with_capacity(capacity, inner),
		}
	}

	/// Reads both header tables from the start of the file.
	pub fn read_header(&mut self) -> McResult<RegionHeader> {
		self.reader.seek(SeekFrom::Start(0))?;
		RegionHeader::read_from(&mut self.reader)
	}

	/// Reads the chunk stored in `sector`.
	/// Returns `None` if the sector holds a zero length, which the game
	/// writes for chunks that were allocated but never saved.
	pub fn read_chunk(&mut self, sector: RegionSector) -> McResult<Option<NamedTag>> {
		self.reader.seek(sector.seeker())?;
		let length = u32::read_from(&mut self.reader)? as u64;
		if length == 0 {
			return Ok(None);
		}
		// The length counts the compression byte but not itself.
		if length + 4 > sector.size() {
			return Err(McError::SectorOutOfBounds);
		}
		let compression_scheme = CompressionScheme::read_from(&mut self.reader)?;
		// Subtract 1 from length for compression scheme.
		let mut payload = (&mut self.reader).take(length - 1);
		Ok(Some(match compression_scheme {
			CompressionScheme::GZip => {
				NamedTag::read_from(&mut GzDecoder::new(payload))?
			}
			CompressionScheme::ZLib => {
				NamedTag::read_from(&mut ZlibDecoder::new(payload))?
			}
			CompressionScheme::Uncompressed => {
				NamedTag::read_from(&mut payload)?
			}
		}))
	}
}
