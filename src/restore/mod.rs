//! Restoring an active world toward its original.
//!
//! [run] checks the preconditions, builds the claim exclusions once and then
//! hands every active region file to a [RegionTask]. Tasks share nothing
//! mutable, so they run on a worker pool in any order.

pub mod boundary;
pub mod options;
pub mod report;
pub mod engine;
pub mod run;

pub use boundary::Boundary;
pub use engine::{merge_regions, plan_container, ContainerPlan, RegionTask};
pub use options::{ContainerKind, RestoreOptions};
pub use report::{
	ContainerResult,
	MergeStats,
	RegionOutcome,
	RegionReport,
	RunStatus,
	RunSummary,
	SkipReason,
};
pub use run::{run, CancelToken};
