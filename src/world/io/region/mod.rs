//! The Anvil region file layout.
//!
//! A region file starts with an 8KiB header: a table of 1024 [sector::RegionSector]
//! values followed by a table of 1024 [timestamp::Timestamp] values. Chunks follow,
//! each one starting on a 4KiB boundary.

pub mod header;
pub mod sector;
pub mod timestamp;
pub mod coord;
pub mod reader;
pub mod writer;
pub mod compressionscheme;

/// Size of one sector, and of each header table.
pub const SECTOR_SIZE: u64 = 4096;

/// Size of the full header (sector table + timestamp table).
pub const HEADER_SIZE: u64 = SECTOR_SIZE * 2;

/// Tests if a value is a multiple of 4096.
pub const fn is_multiple_of_4096(n: u64) -> bool {
	(n & 4095) == 0
}

/// Counts the number of 4KiB sectors required to accomodate `size` bytes.
pub const fn required_sectors(size: u32) -> u32 {
	let sub = size.overflowing_shr(12).0;
	// true => 1 | false => 0
	let overflow = !is_multiple_of_4096(size as u64) as u32;
	sub + overflow
}

/// Returns the number of bytes that must be added to `size` to reach
/// the next multiple of 4096.
pub const fn pad_size(size: u64) -> u64 {
	(4096 - (size & 4095)) & 4095
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sector_math() {
		assert_eq!(required_sectors(0), 0);
		assert_eq!(required_sectors(1), 1);
		assert_eq!(required_sectors(4096), 1);
		assert_eq!(required_sectors(4097), 2);
		assert_eq!(pad_size(4096), 0);
		assert_eq!(pad_size(4100), 4092);
		assert!(is_multiple_of_4096(HEADER_SIZE));
	}
}
