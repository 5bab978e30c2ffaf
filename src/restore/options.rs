use std::path::{Path, PathBuf};

use crate::{
	config::RestoreConfig,
	restore::boundary::Boundary,
};

/// The two containers kept for every region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
	/// Block data, `<world>/region`.
	Blocks,
	/// Entity data, `<world>/entities`.
	Entities,
}

impl ContainerKind {
	pub const ALL: [ContainerKind; 2] = [ContainerKind::Blocks, ContainerKind::Entities];

	pub fn directory(self) -> &'static str {
		match self {
			ContainerKind::Blocks => "region",
			ContainerKind::Entities => "entities",
		}
	}
}

impl std::fmt::Display for ContainerKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			ContainerKind::Blocks => "block",
			ContainerKind::Entities => "entity",
		})
	}
}

/// Settings for one run.
#[derive(Debug, Clone)]
pub struct RestoreOptions {
	/// The reference world.
	pub original: PathBuf,
	/// The world being restored in place.
	pub active: PathBuf,
	pub exclude_claims: bool,
	pub boundary: Option<Boundary>,
	/// Run every decision but write nothing.
	pub preview: bool,
	pub sequential: bool,
	/// Log progress while tasks complete.
	pub progress: bool,
	pub config: RestoreConfig,
}

impl RestoreOptions {
	pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(original: P, active: Q) -> Self {
		Self {
			original: original.into(),
			active: active.into(),
			exclude_claims: false,
			boundary: None,
			preview: false,
			sequential: false,
			progress: true,
			config: RestoreConfig::default(),
		}
	}

	pub fn container_dir(&self, world: &Path, kind: ContainerKind) -> PathBuf {
		world.join(kind.directory())
	}

	pub fn original_container(&self, kind: ContainerKind, file_name: &str) -> PathBuf {
		self.container_dir(&self.original, kind).join(file_name)
	}

	pub fn active_container(&self, kind: ContainerKind, file_name: &str) -> PathBuf {
		self.container_dir(&self.active, kind).join(file_name)
	}
}
