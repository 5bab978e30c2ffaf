use std::{fmt, time::Duration};

/// Why a container or region was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
	OutsideBoundary,
	OriginalMissing,
	OriginalEmpty,
	/// The active file already carries the original's modification time.
	Unchanged,
}

impl fmt::Display for SkipReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			SkipReason::OutsideBoundary => "outside boundary",
			SkipReason::OriginalMissing => "no original file",
			SkipReason::OriginalEmpty => "original file is empty",
			SkipReason::Unchanged => "already restored",
		})
	}
}

/// Per-container merge counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
	/// Present in both, original kept.
	pub reverted: usize,
	/// Present in both, claimed, active kept.
	pub preserved: usize,
	/// Only in the active file, kept.
	pub kept_active: usize,
	/// Only in the original file, kept.
	pub kept_original: usize,
	/// Active-only entity chunks without a claim.
	pub dropped: usize,
	/// Entities held by the dropped chunks.
	pub dropped_entities: usize,
	/// Chunks that failed to decode and were treated as absent.
	pub corrupt: usize,
}

impl MergeStats {
	/// Chunks in the rebuilt container.
	pub fn written(&self) -> usize {
		self.reverted + self.preserved + self.kept_active + self.kept_original
	}
}

impl std::ops::AddAssign for MergeStats {
	fn add_assign(&mut self, rhs: Self) {
		self.reverted += rhs.reverted;
		self.preserved += rhs.preserved;
		self.kept_active += rhs.kept_active;
		self.kept_original += rhs.kept_original;
		self.dropped += rhs.dropped;
		self.dropped_entities += rhs.dropped_entities;
		self.corrupt += rhs.corrupt;
	}
}

impl fmt::Display for MergeStats {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} reverted, {} preserved, {} active only, {} original only, {} dropped ({} entities), {} corrupt",
			self.reverted, self.preserved, self.kept_active, self.kept_original, self.dropped, self.dropped_entities, self.corrupt
		)
	}
}

/// What one container went through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerResult {
	Skipped(SkipReason),
	Merged(MergeStats),
}

impl ContainerResult {
	pub fn stats(&self) -> Option<&MergeStats> {
		match self {
			ContainerResult::Merged(stats) => Some(stats),
			ContainerResult::Skipped(_) => None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionOutcome {
	/// At least one container was rebuilt. In preview mode nothing was written.
	Restored,
	Skipped(SkipReason),
	Failed(String),
	/// Never started because the run was interrupted.
	Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionReport {
	pub file_name: String,
	pub outcome: RegionOutcome,
	pub blocks: Option<ContainerResult>,
	pub entities: Option<ContainerResult>,
	/// Whether any file was rewritten.
	pub written: bool,
}

impl RegionReport {
	pub fn new<S: Into<String>>(file_name: S, outcome: RegionOutcome) -> Self {
		Self {
			file_name: file_name.into(),
			outcome,
			blocks: None,
			entities: None,
			written: false,
		}
	}

	/// Combined counts of both containers.
	pub fn stats(&self) -> MergeStats {
		let mut total = MergeStats::default();
		for result in [&self.blocks, &self.entities].into_iter().flatten() {
			if let Some(stats) = result.stats() {
				total += *stats;
			}
		}
		total
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
	Completed,
	Interrupted,
}

impl RunStatus {
	pub fn exit_code(self) -> i32 {
		match self {
			RunStatus::Completed => 0,
			RunStatus::Interrupted => 1,
		}
	}
}

#[derive(Debug, Clone)]
pub struct RunSummary {
	pub status: RunStatus,
	/// Dimension used for claim exclusion, if enabled.
	pub dimension: Option<String>,
	pub excluded_chunks: usize,
	pub reports: Vec<RegionReport>,
	pub elapsed: Duration,
}

impl RunSummary {
	fn count(&self, predicate: impl Fn(&RegionOutcome) -> bool) -> usize {
		self.reports.iter().filter(|report| predicate(&report.outcome)).count()
	}

	pub fn restored(&self) -> usize {
		self.count(|outcome| matches!(outcome, RegionOutcome::Restored))
	}

	pub fn skipped(&self) -> usize {
		self.count(|outcome| matches!(outcome, RegionOutcome::Skipped(_)))
	}

	pub fn failed(&self) -> usize {
		self.count(|outcome| matches!(outcome, RegionOutcome::Failed(_)))
	}

	pub fn cancelled(&self) -> usize {
		self.count(|outcome| matches!(outcome, RegionOutcome::Cancelled))
	}

	pub fn report(&self, file_name: &str) -> Option<&RegionReport> {
		self.reports.iter().find(|report| report.file_name == file_name)
	}

	pub fn exit_code(&self) -> i32 {
		self.status.exit_code()
	}
}

impl fmt::Display for RunSummary {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} regions: {} restored, {} skipped, {} failed, {} cancelled in {:.2}s",
			self.reports.len(),
			self.restored(),
			self.skipped(),
			self.failed(),
			self.cancelled(),
			self.elapsed.as_secs_f64()
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn summary_counts() {
		let mut restored = RegionReport::new("r.0.0.mca", RegionOutcome::Restored);
		restored.blocks = Some(ContainerResult::Merged(MergeStats { reverted: 3, preserved: 1, ..Default::default() }));
		restored.entities = Some(ContainerResult::Merged(MergeStats { dropped: 2, ..Default::default() }));
		let summary = RunSummary {
			status: RunStatus::Interrupted,
			dimension: None,
			excluded_chunks: 0,
			reports: vec![
				restored,
				RegionReport::new("r.0.1.mca", RegionOutcome::Skipped(SkipReason::Unchanged)),
				RegionReport::new("r.0.2.mca", RegionOutcome::Failed("bad".to_owned())),
				RegionReport::new("r.0.3.mca", RegionOutcome::Cancelled),
			],
			elapsed: Duration::from_millis(1500),
		};
		assert_eq!((summary.restored(), summary.skipped(), summary.failed(), summary.cancelled()), (1, 1, 1, 1));
		assert_eq!(summary.exit_code(), 1);
		let stats = summary.report("r.0.0.mca").unwrap().stats();
		assert_eq!((stats.reverted, stats.preserved, stats.dropped, stats.written()), (3, 1, 2, 4));
		assert!(summary.to_string().starts_with("4 regions: 1 restored"));
	}
}
