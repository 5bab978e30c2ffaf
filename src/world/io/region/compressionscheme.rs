use std::io::{Read, Write};
use crate::{
	McResult, McError,
	ioext::*,
};

/// Compression scheme byte that precedes each chunk payload.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionScheme {
	/// GZip compression is used.
	GZip = 1,
	/// ZLib compression is used.
	ZLib = 2,
	/// Data is uncompressed.
	Uncompressed = 3,
}

impl TryFrom<u8> for CompressionScheme {
	type Error = McError;

	/// LZ4 (4) and externally stored chunks (high bit set) are not supported.
	fn try_from(value: u8) -> Result<Self, Self::Error> {
		match value {
			1 => Ok(Self::GZip),
			2 => Ok(Self::ZLib),
			3 => Ok(Self::Uncompressed),
			unexpected => Err(McError::InvalidCompressionScheme(unexpected)),
		}
	}
}

impl Writable for CompressionScheme {
	fn write_to<W: Write>(&self, writer: &mut W) -> McResult<usize> {
		writer.write_value(*self as u8)
	}
}

impl Readable for CompressionScheme {
	fn read_from<R: Read>(reader: &mut R) -> McResult<Self> {
		Self::try_from(reader.read_value::<u8>()?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unsupported_schemes() {
		assert_eq!(CompressionScheme::try_from(2).unwrap(), CompressionScheme::ZLib);
		assert!(matches!(CompressionScheme::try_from(4), Err(McError::InvalidCompressionScheme(4))));
		assert!(matches!(CompressionScheme::try_from(130), Err(McError::InvalidCompressionScheme(130))));
	}
}
