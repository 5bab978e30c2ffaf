//! Restores one region: its block file and its entity file.

use std::{
	path::Path,
	sync::Arc,
};

use filetime::FileTime;

use crate::{
	McError,
	McResult,
	claims::ExclusionSet,
	log::{Logger, PrefixedLogger},
	log_debug,
	log_error,
	log_info,
	log_trace,
	log_warn,
	restore::{
		options::{ContainerKind, RestoreOptions},
		report::{ContainerResult, MergeStats, RegionOutcome, RegionReport, SkipReason},
	},
	world::{
		chunk::Chunk,
		io::region::coord::RegionCoord,
		region::{Region, RegionFileName},
	},
};

/// What to do with one container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerPlan {
	Skip(SkipReason),
	/// Rebuild, then stamp the active file with the original's modification time.
	Merge(FileTime),
}

/// Compares an original container with its active counterpart.
/// A missing active file never causes a skip.
pub fn plan_container(original: &Path, active: &Path) -> McResult<ContainerPlan> {
	let original_meta = match std::fs::metadata(original) {
		Ok(meta) => meta,
		Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
			return Ok(ContainerPlan::Skip(SkipReason::OriginalMissing));
		}
		Err(err) => return Err(err.into()),
	};
	if original_meta.len() == 0 {
		return Ok(ContainerPlan::Skip(SkipReason::OriginalEmpty));
	}
	let original_mtime = FileTime::from_last_modification_time(&original_meta);
	let active_mtime = std::fs::metadata(active)
		.ok()
		.map(|meta| FileTime::from_last_modification_time(&meta));
	if active_mtime == Some(original_mtime) {
		return Ok(ContainerPlan::Skip(SkipReason::Unchanged));
	}
	Ok(ContainerPlan::Merge(original_mtime))
}

/// Rebuilds a container slot by slot.
///
/// A chunk present on one side only is kept, except active-only entity
/// chunks, which survive only when claimed. A chunk present on both sides
/// keeps its active version when claimed and is reverted otherwise.
pub fn merge_regions(
	kind: ContainerKind,
	mut original: Region,
	mut active: Region,
	exclusions: Option<&ExclusionSet>,
) -> (Region, MergeStats) {
	let is_excluded = |chunk: &Chunk| {
		let (x, z) = chunk.position();
		exclusions.is_some_and(|set| set.contains(x, z))
	};
	let mut merged = Region::new_empty(active.x, active.z);
	let mut stats = MergeStats::default();
	for slot in RegionCoord::all() {
		match (active.take(slot), original.take(slot)) {
			(None, None) => {}
			(None, Some(reference)) => {
				stats.kept_original += 1;
				merged.insert(reference);
			}
			(Some(current), None) => {
				if kind == ContainerKind::Blocks || is_excluded(&current) {
					stats.kept_active += 1;
					merged.insert(current);
				} else {
					stats.dropped += 1;
					stats.dropped_entities += current.entities().len();
				}
			}
			(Some(current), Some(reference)) => {
				if is_excluded(&current) {
					stats.preserved += 1;
					merged.insert(current);
				} else {
					stats.reverted += 1;
					merged.insert(reference);
				}
			}
		}
	}
	(merged, stats)
}

fn log_failures(logger: &dyn Logger, kind: ContainerKind, side: &str, region: &Region) {
	for failure in &region.failures {
		let (x, z) = failure.slot.absolute(region.x, region.z);
		log_warn!(logger, "Chunk {x},{z} in the {side} {kind} file is unreadable and treated as absent: {}", failure.error);
	}
}

/// A diff task for one region file. Everything it borrows is read-only.
pub struct RegionTask<'a> {
	pub options: &'a RestoreOptions,
	pub exclusions: Option<&'a ExclusionSet>,
	pub logger: Arc<dyn Logger>,
}

impl<'a> RegionTask<'a> {
	pub fn new(options: &'a RestoreOptions, exclusions: Option<&'a ExclusionSet>, logger: Arc<dyn Logger>) -> Self {
		Self {
			options,
			exclusions,
			logger,
		}
	}

	/// Restores the region named `file_name`. Errors end up in the report;
	/// they never escape the task.
	pub fn run(&self, file_name: &str) -> RegionReport {
		let name: RegionFileName = match file_name.parse() {
			Ok(name) => name,
			Err(err) => {
				log_error!(self.logger, "{err}");
				return RegionReport::new(file_name, RegionOutcome::Failed(err.to_string()));
			}
		};
		let logger = PrefixedLogger::new(self.logger.clone(), format!("r.{}.{}", name.x, name.z));
		if let Some(boundary) = self.options.boundary {
			if !boundary.contains(name.x, name.z) {
				log_trace!(logger, "Outside of boundary {boundary}");
				return RegionReport::new(file_name, RegionOutcome::Skipped(SkipReason::OutsideBoundary));
			}
		}

		let mut report = RegionReport::new(file_name, RegionOutcome::Restored);
		for kind in ContainerKind::ALL {
			let result = match self.restore_container(&name, file_name, kind, &logger) {
				Ok(result) => result,
				Err(err) => {
					log_error!(logger, "Failed to restore the {kind} file: {err}");
					report.outcome = RegionOutcome::Failed(format!("{kind} file: {err}"));
					return report;
				}
			};
			if matches!(result, ContainerResult::Merged(_)) && !self.options.preview {
				report.written = true;
			}
			match kind {
				ContainerKind::Blocks => report.blocks = Some(result),
				ContainerKind::Entities => report.entities = Some(result),
			}
		}

		if let (Some(ContainerResult::Skipped(reason)), Some(ContainerResult::Skipped(_))) = (&report.blocks, &report.entities) {
			log_trace!(logger, "Skipped: {reason}");
			report.outcome = RegionOutcome::Skipped(*reason);
		} else {
			log_debug!(logger, "Restored: {}", report.stats());
		}
		report
	}

	fn restore_container(
		&self,
		name: &RegionFileName,
		file_name: &str,
		kind: ContainerKind,
		logger: &PrefixedLogger,
	) -> McResult<ContainerResult> {
		let original_path = self.options.original_container(kind, file_name);
		let active_path = self.options.active_container(kind, file_name);
		let original_mtime = match plan_container(&original_path, &active_path)? {
			ContainerPlan::Skip(reason) => return Ok(ContainerResult::Skipped(reason)),
			ContainerPlan::Merge(mtime) => mtime,
		};

		let original = Region::open(&original_path)?;
		log_failures(logger, kind, "original", &original);
		let active = match Region::open(&active_path) {
			Ok(region) => region,
			Err(McError::ContainerNotFound(_) | McError::EmptyContainer(_)) => {
				log_debug!(logger, "No active {kind} file, starting from an empty one");
				Region::new_empty(name.x, name.z)
			}
			Err(err) => return Err(err),
		};
		log_failures(logger, kind, "active", &active);
		let corrupt = original.failures.len() + active.failures.len();

		let (merged, mut stats) = merge_regions(kind, original, active, self.exclusions);
		stats.corrupt = corrupt;

		if self.options.preview {
			log_info!(logger, "Would rebuild the {kind} file: {stats}");
			return Ok(ContainerResult::Merged(stats));
		}
		if let Some(parent) = active_path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		merged.save(&active_path)?;
		filetime::set_file_mtime(&active_path, original_mtime)?;
		log_trace!(logger, "Rebuilt the {kind} file: {stats}");
		Ok(ContainerResult::Merged(stats))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		compound,
		nbt::{ListTag, Map, NamedTag, Tag},
		world::io::region::timestamp::Timestamp,
	};

	fn block_chunk(x: i32, z: i32, marker: i32) -> Chunk {
		let tag = compound! {
			("DataVersion", 3465i32),
			("xPos", x),
			("zPos", z),
			("marker", marker),
		};
		Chunk::from_tag(RegionCoord::from_absolute(x, z), Timestamp::default(), NamedTag::new("", tag)).unwrap()
	}

	fn entity_chunk(x: i32, z: i32, marker: i32) -> Chunk {
		let tag = compound! {
			("DataVersion", 3465i32),
			("Position", vec![x, z]),
			("marker", marker),
			("Entities", Tag::List(ListTag::Compound(vec![Map::new(), Map::new()]))),
		};
		Chunk::from_tag(RegionCoord::from_absolute(x, z), Timestamp::default(), NamedTag::new("", tag)).unwrap()
	}

	fn marker(region: &Region, x: i32, z: i32) -> Option<i32> {
		region.lookup(RegionCoord::from_absolute(x, z))
			.and_then(|chunk| chunk.root.tag.get("marker"))
			.and_then(Tag::as_i32)
	}

	fn region_of(chunks: Vec<Chunk>) -> Region {
		let mut region = Region::new_empty(0, 0);
		for chunk in chunks {
			region.insert(chunk);
		}
		region
	}

	#[test]
	fn blocks_follow_claims() {
		let original = region_of(vec![block_chunk(5, 5, 0), block_chunk(5, 6, 0), block_chunk(5, 7, 0), block_chunk(1, 1, 0)]);
		let active = region_of(vec![block_chunk(5, 5, 1), block_chunk(5, 6, 1), block_chunk(5, 7, 1), block_chunk(2, 2, 1)]);
		let exclusions: ExclusionSet = [(5, 5), (5, 6)].into_iter().collect();
		let (merged, stats) = merge_regions(ContainerKind::Blocks, original, active, Some(&exclusions));
		assert_eq!(marker(&merged, 5, 5), Some(1));
		assert_eq!(marker(&merged, 5, 6), Some(1));
		assert_eq!(marker(&merged, 5, 7), Some(0));
		assert_eq!(marker(&merged, 1, 1), Some(0));
		assert_eq!(marker(&merged, 2, 2), Some(1));
		assert_eq!(stats, MergeStats { reverted: 1, preserved: 2, kept_active: 1, kept_original: 1, ..Default::default() });
	}

	#[test]
	fn without_exclusion_everything_reverts() {
		let original = region_of(vec![block_chunk(5, 5, 0)]);
		let active = region_of(vec![block_chunk(5, 5, 1)]);
		let (merged, stats) = merge_regions(ContainerKind::Blocks, original, active, None);
		assert_eq!(marker(&merged, 5, 5), Some(0));
		assert_eq!(stats.reverted, 1);
	}

	#[test]
	fn active_only_entities_need_a_claim() {
		let original = region_of(vec![]);
		let active = region_of(vec![entity_chunk(3, 3, 1), entity_chunk(4, 4, 1)]);
		let exclusions: ExclusionSet = [(3, 3)].into_iter().collect();
		let (merged, stats) = merge_regions(ContainerKind::Entities, original, active, Some(&exclusions));
		assert_eq!(marker(&merged, 3, 3), Some(1));
		assert_eq!(marker(&merged, 4, 4), None);
		assert_eq!((stats.kept_active, stats.dropped, stats.dropped_entities), (1, 1, 2));
	}

	#[test]
	fn plans_by_original_state() {
		let dir = tempfile::tempdir().unwrap();
		let original = dir.path().join("original.mca");
		let active = dir.path().join("active.mca");
		assert_eq!(plan_container(&original, &active).unwrap(), ContainerPlan::Skip(SkipReason::OriginalMissing));
		std::fs::write(&original, b"").unwrap();
		assert_eq!(plan_container(&original, &active).unwrap(), ContainerPlan::Skip(SkipReason::OriginalEmpty));
		std::fs::write(&original, [0u8; 16]).unwrap();
		let mtime = FileTime::from_unix_time(1_600_000_000, 0);
		filetime::set_file_mtime(&original, mtime).unwrap();
		assert_eq!(plan_container(&original, &active).unwrap(), ContainerPlan::Merge(mtime));
		std::fs::write(&active, [0u8; 16]).unwrap();
		filetime::set_file_mtime(&active, mtime).unwrap();
		assert_eq!(plan_container(&original, &active).unwrap(), ContainerPlan::Skip(SkipReason::Unchanged));
	}
}
