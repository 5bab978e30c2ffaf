//! Run-wide settings that rarely change between resets.
//!
//! ```toml
//! override_owners = ["00000000-0000-0000-0000-000000000000"]
//! never_restore = ["The Terminus", "Palisades Heath Tower"]
//! workers = 8
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::{McError, McResult};

/// Claim names longer than this are cut by the claims mod, so a longer
/// protected name could never match.
pub const MAX_CLAIM_NAME_LENGTH: usize = 100;

pub const SERVER_OWNER: &str = "00000000-0000-0000-0000-000000000000";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RestoreConfig {
	/// Owners whose claims are restored unless their area name is protected.
	pub override_owners: Vec<String>,
	/// Area names that are never restored, even for override owners.
	pub never_restore: Vec<String>,
	/// Extension of block and entity containers.
	pub region_extension: String,
	/// Marker file in the active world that disables the ordering check.
	pub override_marker: String,
	/// Worker pool size. Defaults to the available parallelism.
	pub workers: Option<usize>,
}

impl Default for RestoreConfig {
	fn default() -> Self {
		Self {
			override_owners: vec![SERVER_OWNER.to_owned()],
			never_restore: vec![
				"The Terminus".to_owned(),
				"Palisades Heath Tower".to_owned(),
			],
			region_extension: "mca".to_owned(),
			override_marker: ".restore.override".to_owned(),
			workers: None,
		}
	}
}

impl RestoreConfig {
	pub fn from_toml_str(s: &str) -> McResult<Self> {
		let config: Self = toml::from_str(s)?;
		config.validate()?;
		Ok(config)
	}

	pub fn from_toml_file(path: impl AsRef<Path>) -> McResult<Self> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path)
			.map_err(|err| McError::Config(format!("{}: {err}", path.display())))?;
		Self::from_toml_str(&content)
	}

	pub fn validate(&self) -> McResult<()> {
		if let Some(name) = self.never_restore.iter().find(|name| name.chars().count() > MAX_CLAIM_NAME_LENGTH) {
			return McError::custom(format!(
				"never_restore name is longer than {MAX_CLAIM_NAME_LENGTH} characters: \"{name}\""
			));
		}
		if self.region_extension.is_empty() || self.region_extension.contains('.') {
			return McError::custom(format!("invalid region_extension \"{}\"", self.region_extension));
		}
		if self.override_marker.is_empty() {
			return McError::custom("override_marker must not be empty");
		}
		if self.workers == Some(0) {
			return McError::custom("workers must be at least 1");
		}
		Ok(())
	}

	pub fn is_override_owner(&self, owner: &str) -> bool {
		self.override_owners.iter().any(|candidate| candidate == owner)
	}

	pub fn is_never_restore(&self, name: &str) -> bool {
		self.never_restore.iter().any(|candidate| candidate == name)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		let config = RestoreConfig::default();
		assert!(config.is_override_owner(SERVER_OWNER));
		assert!(config.is_never_restore("The Terminus"));
		assert!(!config.is_never_restore("the terminus"));
		assert!(config.validate().is_ok());
	}

	#[test]
	fn partial_file_keeps_defaults() {
		let config = RestoreConfig::from_toml_str("never_restore = [\"Checkpoint\"]\nworkers = 2\n").unwrap();
		assert_eq!(config.never_restore, ["Checkpoint"]);
		assert_eq!(config.workers, Some(2));
		assert_eq!(config.region_extension, "mca");
		assert!(config.is_override_owner(SERVER_OWNER));
	}

	#[test]
	fn rejects_bad_values() {
		let long = "x".repeat(MAX_CLAIM_NAME_LENGTH + 1);
		let text = format!("never_restore = [\"{long}\"]");
		assert!(matches!(RestoreConfig::from_toml_str(&text), Err(McError::Config(_))));
		assert!(matches!(RestoreConfig::from_toml_str("workers = 0"), Err(McError::Config(_))));
		assert!(matches!(RestoreConfig::from_toml_str("unknown = 1"), Err(McError::Toml(_))));
		assert!(matches!(RestoreConfig::from_toml_file("/nonexistent/restore.toml"), Err(McError::Config(_))));
	}
}
