use crate::log::{LogLevel, Logger};
use std::fmt::Arguments;

/// Forwards to the global `tracing` subscriber set up by [crate::logging].
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
	pub fn new() -> Self {
		Self
	}
}

impl Logger for TracingLogger {
	fn log(&self, level: LogLevel, args: Arguments<'_>) {
		match level {
			LogLevel::Trace => tracing::trace!("{}", args),
			LogLevel::Debug => tracing::debug!("{}", args),
			LogLevel::Info => tracing::info!("{}", args),
			LogLevel::Warn => tracing::warn!("{}", args),
			LogLevel::Error => tracing::error!("{}", args),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn works_without_subscriber() {
		let logger: Box<dyn Logger> = Box::new(TracingLogger::new());
		logger.info(format_args!("no subscriber installed"));
	}
}
