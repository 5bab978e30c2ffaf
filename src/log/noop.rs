use crate::log::{LogLevel, Logger};
use std::fmt::Arguments;

/// Discards everything. Used by tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLogger;

impl Logger for NoOpLogger {
	#[inline]
	fn log(&self, _level: LogLevel, _args: Arguments<'_>) {}
}
