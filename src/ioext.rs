use std::io::{
	self,
	Read, Write,
	Seek, SeekFrom,
};

use byteorder::{
	BigEndian,
	ReadBytesExt,
	WriteBytesExt,
};

use crate::McResult;

/// A value that can be read from a big-endian byte stream.
pub trait Readable: Sized {
	fn read_from<R: Read>(reader: &mut R) -> McResult<Self>;
}

/// A value that can be written to a big-endian byte stream.
/// Returns the number of bytes written.
pub trait Writable {
	fn write_to<W: Write>(&self, writer: &mut W) -> McResult<usize>;
}

/// Something with a fixed location in a seekable stream.
pub trait Seekable {
	fn seeker(&self) -> SeekFrom;
}

macro_rules! __primitive_io_impls {
	($($type:ty => $read:ident, $write:ident;)+) => {
		$(
			impl Readable for $type {
				fn read_from<R: Read>(reader: &mut R) -> McResult<Self> {
					Ok(reader.$read::<BigEndian>()?)
				}
			}

			impl Writable for $type {
				fn write_to<W: Write>(&self, writer: &mut W) -> McResult<usize> {
					writer.$write::<BigEndian>(*self)?;
					Ok(std::mem::size_of::<$type>())
				}
			}
		)+
	};
}

__primitive_io_impls!{
	u16 => read_u16, write_u16;
	u32 => read_u32, write_u32;
	u64 => read_u64, write_u64;
	i16 => read_i16, write_i16;
	i32 => read_i32, write_i32;
	i64 => read_i64, write_i64;
}

impl Readable for u8 {
	fn read_from<R: Read>(reader: &mut R) -> McResult<Self> {
		Ok(reader.read_u8()?)
	}
}

impl Writable for u8 {
	fn write_to<W: Write>(&self, writer: &mut W) -> McResult<usize> {
		writer.write_u8(*self)?;
		Ok(1)
	}
}

pub trait ReadExt: Read + Sized {
	fn read_value<T: Readable>(&mut self) -> McResult<T> {
		T::read_from(self)
	}
}

impl<R: Read> ReadExt for R {}

pub trait WriteExt: Write + Sized {
	fn write_value<T: Writable>(&mut self, value: T) -> McResult<usize> {
		value.write_to(self)
	}
}

impl<W: Write> WriteExt for W {}

pub trait SeekExt: Seek {
	/// Returns a [SeekFrom] that will bring the stream back to where it is now.
	fn seek_return(&mut self) -> io::Result<SeekFrom> {
		Ok(SeekFrom::Start(self.stream_position()?))
	}
}

impl<S: Seek> SeekExt for S {}

pub trait WriteZeroes {
	fn write_zeroes(&mut self, count: u64) -> io::Result<u64>;
}

impl<T: Write> WriteZeroes for T {
	fn write_zeroes(&mut self, count: u64) -> io::Result<u64> {
		const ZEROES: &'static [u8; 4096] = &[0u8; 4096];
		let mut remainder = count;
		while remainder >= ZEROES.len() as u64 {
			self.write_all(ZEROES)?;
			remainder -= ZEROES.len() as u64;
		}
		if remainder != 0 {
			self.write_all(&ZEROES[0..remainder as usize])?;
		}
		Ok(count)
	}
}
