use std::path::PathBuf;

use thiserror::Error;

use crate::nbt::NbtError;

/// The master error type.
#[derive(Debug, Error)]
pub enum McError {
	#[error("IO Error: {0}")]
	IoError(#[from] std::io::Error),
	#[error("Malformed tag tree: {0}")]
	MalformedTagTree(#[from] NbtError),
	#[error("Region file not found: {0}")]
	ContainerNotFound(PathBuf),
	#[error("Region file is empty: {0}")]
	EmptyContainer(PathBuf),
	#[error("Region file is too small to contain a header.")]
	InvalidRegionFile,
	#[error("Region file name does not match r.<x>.<z>.<ext>: \"{0}\"")]
	InvalidRegionFileName(String),
	#[error("Invalid Compression value: {0}")]
	InvalidCompressionScheme(u8),
	#[error("Attempted to write chunk data that takes up more that 255 4KiB blocks.")]
	ChunkTooLarge,
	#[error("Chunk sector points outside of the region file.")]
	SectorOutOfBounds,
	#[error("Stream position was not on a 4KiB boundary.")]
	StreamSectorBoundaryError,
	#[error("Could not determine the chunk's position.")]
	UnrecoverablePosition,
	#[error("World Directory not found. {0}")]
	WorldDirectoryNotFound(PathBuf),
	#[error("The original world was modified more recently than the active world.")]
	OriginalNewerThanActive,
	#[error("Claims directory not found. {0}")]
	ClaimsDirectoryNotFound(PathBuf),
	#[error("Malformed claim file: {0}")]
	MalformedClaim(String),
	#[error("Could not infer the dimension of {0}")]
	UnknownDimension(PathBuf),
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Failed to parse TOML: {0}")]
	Toml(#[from] toml::de::Error),
}

impl McError {
	#[inline(always)]
	pub fn custom<T, S: AsRef<str>>(msg: S) -> Result<T,Self> {
		Err(McError::Config(msg.as_ref().to_owned()))
	}

	/// Returns true for errors that abort the whole run before any region is touched.
	pub fn is_precondition(&self) -> bool {
		matches!(self,
			McError::WorldDirectoryNotFound(_)
			| McError::OriginalNewerThanActive
			| McError::ClaimsDirectoryNotFound(_)
			| McError::UnknownDimension(_)
			| McError::Config(_)
			| McError::Toml(_)
		)
	}

	/// Process exit status for an error that ended the run.
	pub fn exit_code(&self) -> i32 {
		match self {
			McError::WorldDirectoryNotFound(_) => -1,
			McError::OriginalNewerThanActive => -2,
			McError::ClaimsDirectoryNotFound(_)
			| McError::UnknownDimension(_) => -3,
			McError::Config(_)
			| McError::Toml(_) => -4,
			_ => -5,
		}
	}
}

pub type McResult<T> = Result<T,McError>;
