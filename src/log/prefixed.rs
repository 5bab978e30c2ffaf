use crate::log::{LogLevel, Logger};
use std::{fmt::Arguments, sync::Arc};

/// Tags every line with a fixed prefix, e.g. `[r.0.-1]`, before handing
/// it to the inner logger. Each region task gets its own.
#[derive(Clone)]
pub struct PrefixedLogger {
	inner: Arc<dyn Logger>,
	prefix: String,
}

impl PrefixedLogger {
	pub fn new<S: Into<String>>(inner: Arc<dyn Logger>, prefix: S) -> Self {
		Self {
			inner,
			prefix: prefix.into(),
		}
	}
}

impl Logger for PrefixedLogger {
	fn log(&self, level: LogLevel, args: Arguments<'_>) {
		self.inner.log(level, format_args!("[{}] {}", self.prefix, args));
	}
}
