//! Schedules one region task per active region file.

use std::{
	path::Path,
	sync::{
		Arc,
		atomic::{AtomicBool, AtomicUsize, Ordering},
	},
	time::{Instant, SystemTime},
};

use rayon::prelude::*;

use crate::{
	McError,
	McResult,
	claims::{locate_claims, ExclusionResolver, ExclusionSet},
	log::Logger,
	log_debug,
	log_info,
	log_warn,
	restore::{
		engine::RegionTask,
		options::{ContainerKind, RestoreOptions},
		report::{RegionOutcome, RegionReport, RunStatus, RunSummary},
	},
};

/// Set from a signal handler. Tasks that have not started check it and
/// return without touching anything.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn cancel(&self) {
		self.0.store(true, Ordering::SeqCst);
	}

	pub fn is_cancelled(&self) -> bool {
		self.0.load(Ordering::SeqCst)
	}
}

/// Completed-task counter, logged roughly every tenth of the run.
struct Progress<'a> {
	done: AtomicUsize,
	last_step: AtomicUsize,
	total: usize,
	enabled: bool,
	logger: &'a dyn Logger,
}

impl<'a> Progress<'a> {
	fn new(total: usize, enabled: bool, logger: &'a dyn Logger) -> Self {
		Self {
			done: AtomicUsize::new(0),
			last_step: AtomicUsize::new(0),
			total,
			enabled,
			logger,
		}
	}

	fn tick(&self) {
		let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
		if !self.enabled || self.total == 0 {
			return;
		}
		let step = done * 10 / self.total;
		if self.last_step.fetch_max(step, Ordering::Relaxed) < step {
			log_info!(self.logger, "Progress: {done}/{} regions ({}%)", self.total, step * 10);
		}
	}
}

/// Newest modification time among the region files in `dir`.
pub fn newest_region_mtime(dir: &Path, extension: &str) -> McResult<Option<SystemTime>> {
	let mut newest = None;
	for entry in std::fs::read_dir(dir)? {
		let path = entry?.path();
		if path.extension().and_then(|ext| ext.to_str()) != Some(extension) {
			continue;
		}
		let modified = std::fs::metadata(&path)?.modified()?;
		if newest.map_or(true, |current| modified > current) {
			newest = Some(modified);
		}
	}
	Ok(newest)
}

/// Fails when the original world looks newer than the active one, which
/// usually means the paths were swapped. A marker file in the active world
/// disables the check.
pub fn check_world_order(options: &RestoreOptions, logger: &dyn Logger) -> McResult<()> {
	let marker = options.active.join(&options.config.override_marker);
	if marker.exists() {
		log_warn!(logger, "Found {}, skipping the world order check", marker.display());
		return Ok(());
	}
	let extension = &options.config.region_extension;
	let original = newest_region_mtime(&options.container_dir(&options.original, ContainerKind::Blocks), extension)?;
	let active = newest_region_mtime(&options.container_dir(&options.active, ContainerKind::Blocks), extension)?;
	match (original, active) {
		(Some(original), Some(active)) if original > active => Err(McError::OriginalNewerThanActive),
		_ => Ok(()),
	}
}

/// Active region file names, sorted. Files with another extension are skipped.
pub fn region_file_names(options: &RestoreOptions, logger: &dyn Logger) -> McResult<Vec<String>> {
	let dir = options.container_dir(&options.active, ContainerKind::Blocks);
	let entries = std::fs::read_dir(&dir).map_err(|_| McError::WorldDirectoryNotFound(dir.clone()))?;
	let mut names = Vec::new();
	for entry in entries {
		let entry = entry?;
		let name = entry.file_name().to_string_lossy().into_owned();
		let matches_extension = Path::new(&name)
			.extension()
			.and_then(|ext| ext.to_str())
			== Some(options.config.region_extension.as_str());
		if matches_extension && entry.path().is_file() {
			names.push(name);
		} else {
			log_debug!(logger, "Skipping {name} in {}", dir.display());
		}
	}
	names.sort();
	Ok(names)
}

fn resolve_exclusions(options: &RestoreOptions, logger: &Arc<dyn Logger>) -> McResult<Option<(String, ExclusionSet)>> {
	if !options.exclude_claims {
		return Ok(None);
	}
	let location = locate_claims(&options.active)?;
	let resolver = ExclusionResolver::from_location(&location, &options.config, logger.clone());
	log_info!(logger, "Using claims in {} for dimension {}", resolver.claims_dir().display(), location.dimension);
	let set = resolver.resolve(&location.dimension)?;
	Ok(Some((location.dimension, set)))
}

fn dispatch(
	names: &[String],
	options: &RestoreOptions,
	exclusions: Option<&ExclusionSet>,
	logger: &Arc<dyn Logger>,
	cancel: &CancelToken,
) -> McResult<Vec<RegionReport>> {
	let progress = Progress::new(names.len(), options.progress, logger.as_ref());
	let task = RegionTask::new(options, exclusions, logger.clone());
	let run_one = |name: &String| {
		if cancel.is_cancelled() {
			return RegionReport::new(name.as_str(), RegionOutcome::Cancelled);
		}
		let report = task.run(name);
		progress.tick();
		report
	};
	if options.sequential {
		return Ok(names.iter().map(run_one).collect());
	}
	let workers = options.config.workers
		.or_else(|| std::thread::available_parallelism().ok().map(|count| count.get()))
		.unwrap_or(1);
	log_debug!(logger, "Restoring with {workers} workers");
	let pool = rayon::ThreadPoolBuilder::new()
		.num_threads(workers)
		.thread_name(|index| format!("restore-{index}"))
		.build()
		.map_err(|err| std::io::Error::other(err.to_string()))?;
	Ok(pool.install(|| names.par_iter().map(run_one).collect()))
}

/// Runs a whole restore.
///
/// Precondition failures end the run with an error before any file is
/// touched. Everything after that is reported per region in the summary.
pub fn run(options: &RestoreOptions, logger: Arc<dyn Logger>, cancel: &CancelToken) -> McResult<RunSummary> {
	let start = Instant::now();
	for world in [&options.original, &options.active] {
		if !world.is_dir() {
			return Err(McError::WorldDirectoryNotFound(world.clone()));
		}
	}
	options.config.validate()?;
	check_world_order(options, logger.as_ref())?;

	let exclusions = resolve_exclusions(options, &logger)?;
	let names = region_file_names(options, logger.as_ref())?;
	if options.preview {
		log_info!(logger, "Preview mode, no files will be written");
	}
	if let Some(boundary) = options.boundary {
		log_info!(logger, "Restoring regions from {boundary}");
	}
	log_info!(logger, "Restoring {} regions", names.len());

	let reports = dispatch(
		&names,
		options,
		exclusions.as_ref().map(|(_, set)| set),
		&logger,
		cancel,
	)?;
	// A late interrupt still counts, even if every task had already started.
	let interrupted = cancel.is_cancelled()
		|| reports.iter().any(|report| report.outcome == RegionOutcome::Cancelled);
	let (dimension, excluded_chunks) = match exclusions {
		Some((dimension, set)) => (Some(dimension), set.len()),
		None => (None, 0),
	};
	let summary = RunSummary {
		status: if interrupted { RunStatus::Interrupted } else { RunStatus::Completed },
		dimension,
		excluded_chunks,
		reports,
		elapsed: start.elapsed(),
	};
	if interrupted {
		log_warn!(logger, "Interrupted. {summary}");
	} else {
		log_info!(logger, "Finished. {summary}");
	}
	Ok(summary)
}
