use std::io::{Read, Write};

use chrono::{DateTime, Utc};

use crate::{
	McResult,
	for_each_int_type,
	ioext::*,
};

/// Last time the game saved a chunk, in Unix seconds.
/// Carried with the chunk so a rewrite keeps it.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default, Hash)]
pub struct Timestamp(u32);

impl Timestamp {
	pub fn seconds(&self) -> u32 {
		self.0
	}

	pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
		DateTime::<Utc>::from_timestamp(i64::from(self.0), 0)
	}
}

// Out of range values saturate to 0 or `u32::MAX`.
macro_rules! __timestamp_from_unsigned {
	($type:ty) => {
		impl From<$type> for Timestamp {
			fn from(seconds: $type) -> Self {
				Self(u32::try_from(seconds).unwrap_or(u32::MAX))
			}
		}
	};
}

macro_rules! __timestamp_from_signed {
	($type:ty) => {
		impl From<$type> for Timestamp {
			fn from(seconds: $type) -> Self {
				Self(u32::try_from(seconds.max(0)).unwrap_or(u32::MAX))
			}
		}
	};
}

for_each_int_type!(__timestamp_from_unsigned;unsigned);
for_each_int_type!(__timestamp_from_signed;signed);

impl From<DateTime<Utc>> for Timestamp {
	fn from(value: DateTime<Utc>) -> Self {
		Self::from(value.timestamp())
	}
}

impl Readable for Timestamp {
	fn read_from<R: Read>(reader: &mut R) -> McResult<Self> {
		reader.read_value().map(Self)
	}
}

impl Writable for Timestamp {
	fn write_to<W: Write>(&self, writer: &mut W) -> McResult<usize> {
		writer.write_value(self.0)
	}
}

impl std::fmt::Display for Timestamp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self.to_datetime() {
			Some(datetime) => write!(f, "{}", datetime.format("%Y-%m-%d %H:%M:%S")),
			None => write!(f, "{}", self.0),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn display_formats_utc() {
		assert_eq!(Timestamp::from(0u32).to_string(), "1970-01-01 00:00:00");
		assert_eq!(Timestamp::from(1_700_000_000i64).seconds(), 1_700_000_000);
		let now = Utc::now();
		assert_eq!(Timestamp::from(now).seconds() as i64, now.timestamp());
	}

	#[test]
	fn out_of_range_saturates() {
		assert_eq!(Timestamp::from(-5i64).seconds(), 0);
		assert_eq!(Timestamp::from(1u64 << 40).seconds(), u32::MAX);
		assert_eq!(Timestamp::from(i128::MIN).seconds(), 0);
		let far = DateTime::<Utc>::from_timestamp(1 << 33, 0).unwrap();
		assert_eq!(Timestamp::from(far).seconds(), u32::MAX);
		let early = DateTime::<Utc>::from_timestamp(-86_400, 0).unwrap();
		assert_eq!(Timestamp::from(early).seconds(), 0);
	}
}
