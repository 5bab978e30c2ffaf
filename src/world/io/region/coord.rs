use crate::for_each_int_type;

/// Chunks per region along each axis.
pub const REGION_WIDTH: i32 = 32;

/// Region coordinates whose chunks all have an `i32` coordinate.
pub const REGION_COORD_RANGE: std::ops::RangeInclusive<i32> = (i32::MIN / REGION_WIDTH)..=(i32::MAX / REGION_WIDTH);

/// A chunk slot inside a region, packed as `x | z << 5`, which is also the
/// slot's index in both header tables.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct RegionCoord(u16);

impl RegionCoord {
	/// Values above 31 wrap into the region.
	pub fn new(x: u16, z: u16) -> Self {
		Self((x & 31) | ((z & 31) << 5))
	}

	/// The slot an absolute chunk coordinate lands in. `-1` becomes `31`.
	pub fn from_absolute(x: i32, z: i32) -> Self {
		Self::new(x.rem_euclid(REGION_WIDTH) as u16, z.rem_euclid(REGION_WIDTH) as u16)
	}

	/// All 1024 slots, in table order.
	pub fn all() -> impl Iterator<Item = RegionCoord> {
		(0u16..1024).map(RegionCoord)
	}

	pub fn index(&self) -> usize {
		self.0 as usize
	}

	pub fn x(&self) -> i32 {
		i32::from(self.0 & 31)
	}

	pub fn z(&self) -> i32 {
		i32::from(self.0 >> 5)
	}

	/// Absolute chunk coordinate of this slot in region (`region_x`, `region_z`).
	/// Wraps for regions outside [`REGION_COORD_RANGE`].
	pub fn absolute(&self, region_x: i32, region_z: i32) -> (i32, i32) {
		(
			region_x.wrapping_mul(REGION_WIDTH).wrapping_add(self.x()),
			region_z.wrapping_mul(REGION_WIDTH).wrapping_add(self.z()),
		)
	}
}

macro_rules! __regioncoord_from_pair {
	($type:ty) => {
		impl From<($type, $type)> for RegionCoord {
			fn from((x, z): ($type, $type)) -> Self {
				Self::new(x as u16, z as u16)
			}
		}
	};
}

for_each_int_type!(__regioncoord_from_pair);

impl std::fmt::Display for RegionCoord {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "[{}, {}]", self.x(), self.z())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn negative_coordinates_wrap() {
		let coord = RegionCoord::from_absolute(-1, -32);
		assert_eq!((coord.x(), coord.z()), (31, 0));
		assert_eq!(coord.absolute(-1, -1), (-1, -32));
		assert_eq!(RegionCoord::from((37i32, 5i32)), RegionCoord::new(5, 5));
		assert_eq!(RegionCoord::from_absolute(-33, 64), RegionCoord::new(31, 0));
	}

	#[test]
	fn absolute_does_not_overflow() {
		let coord = RegionCoord::new(31, 31);
		assert_eq!(coord.absolute(*REGION_COORD_RANGE.end(), 0), (i32::MAX, 31));
		let (x, _) = coord.absolute(i32::MAX, 0);
		assert_eq!(x, i32::MAX.wrapping_mul(REGION_WIDTH).wrapping_add(31));
	}

	#[test]
	fn all_covers_every_slot_once() {
		let coords: Vec<RegionCoord> = RegionCoord::all().collect();
		assert_eq!(coords.len(), 1024);
		assert_eq!(coords[33].index(), 33);
		assert_eq!((coords[33].x(), coords[33].z()), (1, 1));
		assert_eq!(coords[1023].to_string(), "[31, 31]");
	}
}
