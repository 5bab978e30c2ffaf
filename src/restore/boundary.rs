use std::{fmt, str::FromStr};

use crate::McError;

/// An inclusive rectangle in region coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Boundary {
	pub min_x: i32,
	pub min_z: i32,
	pub max_x: i32,
	pub max_z: i32,
}

impl Boundary {
	/// Corners may be given in any order.
	pub fn new(x1: i32, z1: i32, x2: i32, z2: i32) -> Self {
		Self {
			min_x: x1.min(x2),
			min_z: z1.min(z2),
			max_x: x1.max(x2),
			max_z: z1.max(z2),
		}
	}

	pub fn contains(&self, region_x: i32, region_z: i32) -> bool {
		(self.min_x..=self.max_x).contains(&region_x)
			&& (self.min_z..=self.max_z).contains(&region_z)
	}
}

impl From<[i32; 4]> for Boundary {
	fn from([min_x, min_z, max_x, max_z]: [i32; 4]) -> Self {
		Self::new(min_x, min_z, max_x, max_z)
	}
}

impl TryFrom<&[i32]> for Boundary {
	type Error = McError;

	fn try_from(values: &[i32]) -> Result<Self, Self::Error> {
		let corners: [i32; 4] = values.try_into()
			.map_err(|_| McError::Config(format!("boundary needs 4 values, got {}", values.len())))?;
		Ok(Self::from(corners))
	}
}

/// `minX,minZ,maxX,maxZ` or the same separated by spaces.
impl FromStr for Boundary {
	type Err = McError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let values = s.split(|c: char| c == ',' || c.is_whitespace())
			.filter(|part| !part.is_empty())
			.map(|part| part.parse::<i32>()
				.map_err(|_| McError::Config(format!("invalid boundary value \"{part}\""))))
			.collect::<Result<Vec<i32>, McError>>()?;
		Self::try_from(values.as_slice())
	}
}

impl fmt::Display for Boundary {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "({}, {}) to ({}, {})", self.min_x, self.min_z, self.max_x, self.max_z)
	}
}
