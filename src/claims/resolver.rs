use std::{
	collections::HashMap,
	path::{Path, PathBuf},
	sync::Arc,
};

use crate::{
	McError,
	McResult,
	claims::{
		ExclusionSet,
		locate::ClaimsLocation,
		record::{ClaimArea, ClaimRecord},
		subconfig::SubconfigMapping,
	},
	config::RestoreConfig,
	log::Logger,
	log_debug,
	log_info,
	log_warn,
};

/// What happens to one claim area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AreaDecision {
	/// Its chunks keep their active state.
	Preserve,
	/// Its chunks are restored like unclaimed land.
	Restore(RestoreReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreReason {
	/// Override owner, and the area name is not protected.
	Unprotected(String),
	/// Override owner, and no name is known for the sub-config.
	Unnamed(i32),
	/// Override owner, and the sub-config index could not be read.
	MalformedIndex,
}

/// Builds the per-dimension sets of chunks that must survive a restore.
pub struct ExclusionResolver {
	claims_dir: PathBuf,
	mapping: SubconfigMapping,
	config: RestoreConfig,
	logger: Arc<dyn Logger>,
}

impl ExclusionResolver {
	pub fn new(
		claims_dir: PathBuf,
		mapping: SubconfigMapping,
		config: &RestoreConfig,
		logger: Arc<dyn Logger>,
	) -> Self {
		Self {
			claims_dir,
			mapping,
			config: config.clone(),
			logger,
		}
	}

	/// Loads the sub-config names for the override owners and builds a resolver.
	pub fn from_location(location: &ClaimsLocation, config: &RestoreConfig, logger: Arc<dyn Logger>) -> Self {
		let mapping = SubconfigMapping::load(&location.configs_dir, &config.override_owners, &logger);
		log_debug!(logger, "Loaded {} sub-config names from {}", mapping.len(), location.configs_dir.display());
		Self::new(location.claims_dir.clone(), mapping, config, logger)
	}

	pub fn claims_dir(&self) -> &Path {
		&self.claims_dir
	}

	/// Claims of ordinary owners are always preserved. Claims of override
	/// owners are preserved only when their area name is protected.
	pub fn decide(&self, owner: &str, area: &ClaimArea) -> AreaDecision {
		if !self.config.is_override_owner(owner) {
			return AreaDecision::Preserve;
		}
		let Some(index) = area.sub_config_index else {
			return AreaDecision::Restore(RestoreReason::MalformedIndex);
		};
		match self.mapping.get(owner, index) {
			Some(name) if self.config.is_never_restore(name) => AreaDecision::Preserve,
			Some(name) => AreaDecision::Restore(RestoreReason::Unprotected(name.to_owned())),
			None => AreaDecision::Restore(RestoreReason::Unnamed(index)),
		}
	}

	/// Reads every claim file. Files that cannot be read are skipped.
	pub fn load_records(&self) -> McResult<Vec<ClaimRecord>> {
		let entries = std::fs::read_dir(&self.claims_dir)
			.map_err(|_| McError::ClaimsDirectoryNotFound(self.claims_dir.clone()))?;
		let mut paths: Vec<PathBuf> = entries
			.filter_map(|entry| entry.ok().map(|entry| entry.path()))
			.collect();
		paths.sort();
		let mut records = Vec::with_capacity(paths.len());
		for path in paths {
			let file_name = path.file_name()
				.map(|name| name.to_string_lossy().into_owned())
				.unwrap_or_default();
			if !file_name.ends_with(".nbt") || !path.is_file() {
				log_warn!(self.logger, "Skipped non-NBT file {file_name} in claims directory {}", self.claims_dir.display());
				continue;
			}
			match ClaimRecord::read(&path) {
				Ok(record) if record.is_empty() => {
					log_debug!(self.logger, "Skipped empty claim file {file_name}");
				}
				Ok(record) => records.push(record),
				Err(err) => {
					log_warn!(self.logger, "Skipping invalid claim file {file_name}: {err}");
				}
			}
		}
		Ok(records)
	}

	/// Adds the preserved positions of `record` in `dimension` to `set`.
	pub fn apply(&self, record: &ClaimRecord, dimension: &str, set: &mut ExclusionSet) {
		for area in record.areas(dimension) {
			if area.skipped_positions > 0 {
				log_warn!(
					self.logger,
					"Skipping {} invalid claim positions of {} in {dimension}",
					area.skipped_positions, record.owner
				);
			}
			match self.decide(&record.owner, area) {
				AreaDecision::Preserve => set.extend(area.positions.iter().copied()),
				AreaDecision::Restore(RestoreReason::Unprotected(name)) => {
					log_debug!(self.logger, "Ignoring claims of {name} ({} chunks)", area.positions.len());
				}
				AreaDecision::Restore(RestoreReason::Unnamed(index)) => {
					log_debug!(self.logger, "Ignoring unnamed sub-config claims ${index} of {}", record.owner);
				}
				AreaDecision::Restore(RestoreReason::MalformedIndex) => {
					log_warn!(self.logger, "The claims of {} contain a malformed subConfigIndex. That claim will be restored.", record.owner);
				}
			}
		}
	}

	/// The exclusion set for one dimension.
	pub fn resolve(&self, dimension: &str) -> McResult<ExclusionSet> {
		let records = self.load_records()?;
		let mut set = ExclusionSet::new();
		for record in &records {
			self.apply(record, dimension, &mut set);
		}
		log_info!(self.logger, "{} claimed chunks in {dimension} will be preserved", set.len());
		Ok(set)
	}

	/// Exclusion sets for every dimension named in any claim file.
	pub fn resolve_all(&self) -> McResult<HashMap<String, ExclusionSet>> {
		let records = self.load_records()?;
		let mut sets: HashMap<String, ExclusionSet> = HashMap::new();
		for record in &records {
			for dimension in record.dimensions.keys() {
				let set = sets.entry(dimension.to_string()).or_default();
				self.apply(record, dimension, set);
			}
		}
		Ok(sets)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		config::SERVER_OWNER,
		log::NoOpLogger,
		nbt::io::write_nbt_file,
	};

	fn area(index: Option<i32>, positions: &[(i32, i32)]) -> ClaimArea {
		ClaimArea {
			forceloaded: 0,
			sub_config_index: index,
			positions: positions.to_vec(),
			skipped_positions: 0,
		}
	}

	fn resolver(mapping: SubconfigMapping) -> ExclusionResolver {
		let config = RestoreConfig {
			never_restore: vec!["Checkpoint".to_owned()],
			..RestoreConfig::default()
		};
		ExclusionResolver::new(PathBuf::from("unused"), mapping, &config, Arc::new(NoOpLogger))
	}

	#[test]
	fn ordinary_owners_are_always_preserved() {
		let resolver = resolver(SubconfigMapping::new());
		assert_eq!(resolver.decide("someone", &area(Some(3), &[(1, 1)])), AreaDecision::Preserve);
		assert_eq!(resolver.decide("someone", &area(None, &[(1, 1)])), AreaDecision::Preserve);
	}

	#[test]
	fn override_owner_with_protected_name_is_preserved() {
		let mut mapping = SubconfigMapping::new();
		mapping.insert(SERVER_OWNER, 3, "Checkpoint");
		mapping.insert(SERVER_OWNER, 4, "Market");
		let resolver = resolver(mapping);
		assert_eq!(resolver.decide(SERVER_OWNER, &area(Some(3), &[])), AreaDecision::Preserve);
		assert_eq!(
			resolver.decide(SERVER_OWNER, &area(Some(4), &[])),
			AreaDecision::Restore(RestoreReason::Unprotected("Market".to_owned()))
		);
	}

	#[test]
	fn override_owner_without_mapping_is_restored() {
		let resolver = resolver(SubconfigMapping::new());
		assert_eq!(
			resolver.decide(SERVER_OWNER, &area(Some(3), &[])),
			AreaDecision::Restore(RestoreReason::Unnamed(3))
		);
		assert_eq!(
			resolver.decide(SERVER_OWNER, &area(None, &[])),
			AreaDecision::Restore(RestoreReason::MalformedIndex)
		);
	}

	#[test]
	fn apply_collects_preserved_positions_for_dimension() {
		let mut mapping = SubconfigMapping::new();
		mapping.insert(SERVER_OWNER, 3, "Checkpoint");
		let resolver = resolver(mapping);
		let mut record = ClaimRecord {
			owner: SERVER_OWNER.to_owned(),
			username: None,
			confirmed_activity: None,
			dimensions: Default::default(),
		};
		record.dimensions.insert("minecraft:overworld".into(), vec![
			area(Some(3), &[(5, 5), (5, 6)]),
			area(Some(9), &[(5, 7)]),
		]);
		record.dimensions.insert("minecraft:the_nether".into(), vec![area(Some(3), &[(0, 0)])]);
		let mut set = ExclusionSet::new();
		resolver.apply(&record, "minecraft:overworld", &mut set);
		assert_eq!(set.len(), 2);
		assert!(set.contains(5, 5) && set.contains(5, 6));
		assert!(!set.contains(5, 7));
		assert!(!set.contains(0, 0));
	}

	fn record(owner: &str, dimensions: Vec<(&str, Vec<ClaimArea>)>) -> ClaimRecord {
		ClaimRecord {
			owner: owner.to_owned(),
			username: None,
			confirmed_activity: None,
			dimensions: dimensions.into_iter().map(|(name, areas)| (name.into(), areas)).collect(),
		}
	}

	#[test]
	fn resolve_all_builds_a_set_per_dimension() {
		let dir = tempfile::tempdir().unwrap();
		let player = record("00000000-0000-0000-0000-000000000001", vec![
			("minecraft:overworld", vec![area(Some(-1), &[(1, 1), (2, 2)])]),
			("minecraft:the_nether", vec![area(None, &[(0, 0)])]),
		]);
		let server = record(SERVER_OWNER, vec![
			("minecraft:overworld", vec![area(Some(3), &[(5, 5)]), area(Some(4), &[(6, 6)])]),
			("minecraft:the_nether", vec![area(None, &[(7, 7)])]),
			("minecraft:the_end", vec![area(Some(9), &[(8, 8)])]),
		]);
		for record in [&player, &server] {
			let path = dir.path().join(format!("{}.nbt", record.owner));
			write_nbt_file(path, &record.to_tag()).unwrap();
		}
		let mut mapping = SubconfigMapping::new();
		mapping.insert(SERVER_OWNER, 3, "Checkpoint");
		mapping.insert(SERVER_OWNER, 4, "Market");
		let config = RestoreConfig {
			never_restore: vec!["Checkpoint".to_owned()],
			..RestoreConfig::default()
		};
		let resolver = ExclusionResolver::new(dir.path().to_path_buf(), mapping, &config, Arc::new(NoOpLogger));

		let sets = resolver.resolve_all().unwrap();
		assert_eq!(sets.len(), 3);
		let overworld = &sets["minecraft:overworld"];
		assert_eq!(overworld.len(), 3);
		assert!(overworld.contains(1, 1) && overworld.contains(2, 2) && overworld.contains(5, 5));
		assert!(!overworld.contains(6, 6));
		let nether = &sets["minecraft:the_nether"];
		assert_eq!(nether.len(), 1);
		assert!(nether.contains(0, 0));
		assert!(sets["minecraft:the_end"].is_empty());

		let single = resolver.resolve("minecraft:overworld").unwrap();
		assert_eq!(single.len(), overworld.len());
	}

	#[test]
	fn missing_claims_directory() {
		let resolver = resolver(SubconfigMapping::new());
		assert!(matches!(resolver.resolve("minecraft:overworld"), Err(McError::ClaimsDirectoryNotFound(_))));
	}
}
