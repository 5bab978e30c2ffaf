//! Area names from `player-configs`.
//!
//! `player-configs/<owner>.toml` names the claims that use no sub-config
//! (index -1). `player-configs/sub-configs/<owner>/<id>$<index>.toml` names
//! the claims that use sub-config `<index>`. Both store the name under
//! `playerConfig.claims.name`.

use std::{
	collections::HashMap,
	path::{Path, PathBuf},
	sync::Arc,
};

use serde::Deserialize;

use crate::{
	McResult,
	claims::record::MAIN_CONFIG_INDEX,
	log::Logger,
	log_debug,
	log_warn,
};

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
	#[serde(rename = "playerConfig")]
	player_config: Option<PlayerConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct PlayerConfig {
	claims: Option<ClaimsSection>,
}

#[derive(Debug, Default, Deserialize)]
struct ClaimsSection {
	name: Option<String>,
}

/// Reads `playerConfig.claims.name` from a config file's text.
/// `Ok(None)` means the file parsed but has no name.
pub fn parse_area_name(text: &str) -> McResult<Option<String>> {
	let file: ConfigFile = toml::from_str(text)?;
	Ok(file.player_config
		.and_then(|config| config.claims)
		.and_then(|claims| claims.name))
}

/// `anything$3.toml` gives `3`. Only positive indices are valid; the main
/// config has its own file.
pub fn subconfig_index(file_name: &str) -> Option<i32> {
	let stem = file_name.strip_suffix(".toml")?;
	let index: i32 = stem.rsplit('$').next()?.parse().ok()?;
	(index > 0).then_some(index)
}

/// (owner, sub-config index) to area name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubconfigMapping {
	names: HashMap<(String, i32), String>,
}

impl SubconfigMapping {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert<O: Into<String>, N: Into<String>>(&mut self, owner: O, index: i32, name: N) -> Option<String> {
		self.names.insert((owner.into(), index), name.into())
	}

	pub fn get(&self, owner: &str, index: i32) -> Option<&str> {
		self.names.get(&(owner.to_owned(), index)).map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.names.len()
	}

	pub fn is_empty(&self) -> bool {
		self.names.is_empty()
	}

	/// Loads the names for each owner in `owners`. Unreadable or nameless
	/// files are skipped with a warning; a missing directory is not an error.
	pub fn load(configs_dir: &Path, owners: &[String], logger: &Arc<dyn Logger>) -> Self {
		let mut mapping = Self::new();
		for owner in owners {
			mapping.load_owner(configs_dir, owner, logger);
		}
		mapping
	}

	fn load_owner(&mut self, configs_dir: &Path, owner: &str, logger: &Arc<dyn Logger>) {
		let main_config = configs_dir.join(format!("{owner}.toml"));
		if main_config.is_file() {
			if let Some(name) = read_area_name(&main_config, logger) {
				log_debug!(logger, "Main config of {owner} is named \"{name}\"");
				self.insert(owner, MAIN_CONFIG_INDEX, name);
			}
		} else {
			log_warn!(logger, "Skipping missing config file for {owner}");
		}

		let subconfig_dir = configs_dir.join("sub-configs").join(owner);
		let entries = match std::fs::read_dir(&subconfig_dir) {
			Ok(entries) => entries,
			Err(_) => {
				log_warn!(logger, "Cannot find sub-config directory {}", subconfig_dir.display());
				return;
			}
		};
		let mut paths: Vec<PathBuf> = entries
			.filter_map(|entry| entry.ok().map(|entry| entry.path()))
			.collect();
		paths.sort();
		for path in paths {
			let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
				continue;
			};
			if !file_name.ends_with(".toml") {
				log_warn!(logger, "Skipping non-TOML file {file_name} in sub-config directory");
				continue;
			}
			let Some(index) = subconfig_index(file_name) else {
				log_warn!(logger, "Skipping incorrect sub-config file name {file_name}");
				continue;
			};
			if let Some(name) = read_area_name(&path, logger) {
				log_debug!(logger, "Sub-config {index} of {owner} is named \"{name}\"");
				self.insert(owner, index, name);
			}
		}
	}
}

fn read_area_name(path: &Path, logger: &Arc<dyn Logger>) -> Option<String> {
	let text = match std::fs::read_to_string(path) {
		Ok(text) => text,
		Err(err) => {
			log_warn!(logger, "Cannot read config file {}: {err}", path.display());
			return None;
		}
	};
	match parse_area_name(&text) {
		Ok(Some(name)) => Some(name),
		Ok(None) => {
			log_warn!(logger, "Cannot find field playerConfig.claims.name in {}. This file will be skipped.", path.display());
			None
		}
		Err(err) => {
			log_warn!(logger, "Skipping malformed config file {}: {err}", path.display());
			None
		}
	}
}
