//! Finding the claims data for the dimension being restored.
//!
//! Open Parties and Claims keeps its data in the world save, while the
//! dimension folder passed in may be the save itself (overworld), a
//! `DIM-1`/`DIM1` folder one level down, or a custom dimension three levels
//! down (`dimensions/<namespace>/<name>`).

use std::path::{Path, PathBuf};

use crate::{McError, McResult};

pub const OVERWORLD: &str = "minecraft:overworld";
pub const THE_NETHER: &str = "minecraft:the_nether";
pub const THE_END: &str = "minecraft:the_end";

/// Path of the claims folder relative to a world save.
pub fn claims_subpath() -> PathBuf {
	["data", "openpartiesandclaims", "player-claims"].iter().collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimsLocation {
	pub claims_dir: PathBuf,
	/// Sibling `player-configs` folder.
	pub configs_dir: PathBuf,
	/// Dimension id the claims are filtered by.
	pub dimension: String,
}

impl ClaimsLocation {
	fn new(claims_dir: PathBuf, dimension: String) -> Self {
		let configs_dir = claims_dir
			.parent()
			.map(|opac| opac.join("player-configs"))
			.unwrap_or_else(|| PathBuf::from("player-configs"));
		Self {
			claims_dir,
			configs_dir,
			dimension,
		}
	}
}

fn folder_name(path: &Path) -> Option<&str> {
	path.file_name().and_then(|name| name.to_str())
}

/// Tries each depth in order and uses the first that has a claims folder.
pub fn locate_claims(active: &Path) -> McResult<ClaimsLocation> {
	let active = std::fs::canonicalize(active).unwrap_or_else(|_| active.to_path_buf());
	let subpath = claims_subpath();

	let direct = active.join(&subpath);
	if direct.is_dir() {
		return Ok(ClaimsLocation::new(direct, OVERWORLD.to_owned()));
	}

	if let Some(parent) = active.parent() {
		let claims_dir = parent.join(&subpath);
		if claims_dir.is_dir() {
			let dimension = match folder_name(&active) {
				Some("DIM-1") => THE_NETHER,
				Some("DIM1") => THE_END,
				_ => return Err(McError::UnknownDimension(active)),
			};
			return Ok(ClaimsLocation::new(claims_dir, dimension.to_owned()));
		}
	}

	if let Some(save) = active.ancestors().nth(3) {
		let claims_dir = save.join(&subpath);
		if claims_dir.is_dir() {
			let name = folder_name(&active).ok_or_else(|| McError::UnknownDimension(active.clone()))?;
			return Ok(ClaimsLocation::new(claims_dir, format!("minecraft:{name}")));
		}
	}

	Err(McError::ClaimsDirectoryNotFound(direct))
}
