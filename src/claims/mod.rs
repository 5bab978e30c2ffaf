//! Claim exclusion: which chunks keep their active state during a restore.

pub mod record;
pub mod subconfig;
pub mod locate;
pub mod resolver;

use std::collections::HashSet;

pub use locate::{locate_claims, ClaimsLocation};
pub use record::{ClaimArea, ClaimRecord};
pub use resolver::{AreaDecision, ExclusionResolver, RestoreReason};
pub use subconfig::SubconfigMapping;

/// Absolute chunk coordinates that must not be restored.
/// Built once per run and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet(HashSet<(i32, i32)>);

impl ExclusionSet {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn contains(&self, x: i32, z: i32) -> bool {
		self.0.contains(&(x, z))
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl Extend<(i32, i32)> for ExclusionSet {
	fn extend<T: IntoIterator<Item = (i32, i32)>>(&mut self, iter: T) {
		self.0.extend(iter)
	}
}

impl FromIterator<(i32, i32)> for ExclusionSet {
	fn from_iter<T: IntoIterator<Item = (i32, i32)>>(iter: T) -> Self {
		Self(iter.into_iter().collect())
	}
}
