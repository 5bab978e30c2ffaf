//! Global `tracing` subscriber for the command line tool.
//!
//! Every run writes a fresh file `restore_logs/log_<unix seconds>.txt` next
//! to console output on stderr. `RUST_LOG` overrides the verbosity flag.

use std::{
	fs,
	io,
	path::{Path, PathBuf},
};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
	EnvFilter,
	layer::SubscriberExt,
	util::SubscriberInitExt,
};

pub const DEFAULT_LOG_DIR: &str = "restore_logs";

/// Keeps the background file writer alive. Dropping it flushes the file.
pub struct LoggingGuard {
	_file_guard: WorkerGuard,
	pub log_path: PathBuf,
}

/// Filter directive for a `-v` count.
pub fn verbosity_filter(verbose: u8) -> &'static str {
	match verbose {
		0 => "info",
		1 => "debug",
		_ => "trace",
	}
}

pub fn log_file_name(unix_seconds: u64) -> String {
	format!("log_{unix_seconds}.txt")
}

pub fn init_logging<P: AsRef<Path>>(log_dir: P, verbose: u8) -> Result<LoggingGuard, io::Error> {
	let log_dir = log_dir.as_ref();
	fs::create_dir_all(log_dir)?;
	let seconds = std::time::SystemTime::now()
		.duration_since(std::time::UNIX_EPOCH)
		.map(|elapsed| elapsed.as_secs())
		.unwrap_or_default();
	let file_name = log_file_name(seconds);

	let file_appender = tracing_appender::rolling::never(log_dir, &file_name);
	let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

	let file_layer = tracing_subscriber::fmt::layer()
		.with_writer(non_blocking_file)
		.with_ansi(false)
		.with_thread_names(true);

	let console_layer = tracing_subscriber::fmt::layer()
		.with_writer(io::stderr)
		.with_target(false);

	let env_filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(verbosity_filter(verbose)));

	tracing_subscriber::registry()
		.with(env_filter)
		.with(file_layer)
		.with(console_layer)
		.try_init()
		.map_err(|err| io::Error::new(io::ErrorKind::Other, err.to_string()))?;

	Ok(LoggingGuard {
		_file_guard: file_guard,
		log_path: log_dir.join(file_name),
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn verbosity_levels() {
		assert_eq!(verbosity_filter(0), "info");
		assert_eq!(verbosity_filter(1), "debug");
		assert_eq!(verbosity_filter(5), "trace");
	}

	#[test]
	fn file_name_uses_unix_seconds() {
		assert_eq!(log_file_name(1_700_000_000), "log_1700000000.txt");
	}
}
