use std::fmt::Arguments;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
	Trace,
	Debug,
	Info,
	Warn,
	Error,
}

/// Logging interface shared across worker threads.
pub trait Logger: Send + Sync {
	fn log(&self, level: LogLevel, args: Arguments<'_>);

	fn trace(&self, args: Arguments<'_>) {
		self.log(LogLevel::Trace, args);
	}

	fn debug(&self, args: Arguments<'_>) {
		self.log(LogLevel::Debug, args);
	}

	fn info(&self, args: Arguments<'_>) {
		self.log(LogLevel::Info, args);
	}

	fn warn(&self, args: Arguments<'_>) {
		self.log(LogLevel::Warn, args);
	}

	fn error(&self, args: Arguments<'_>) {
		self.log(LogLevel::Error, args);
	}
}

#[macro_export]
macro_rules! log_trace {
	($logger:expr, $($arg:tt)*) => {
		$logger.trace(format_args!($($arg)*))
	};
}

#[macro_export]
macro_rules! log_debug {
	($logger:expr, $($arg:tt)*) => {
		$logger.debug(format_args!($($arg)*))
	};
}

#[macro_export]
macro_rules! log_info {
	($logger:expr, $($arg:tt)*) => {
		$logger.info(format_args!($($arg)*))
	};
}

#[macro_export]
macro_rules! log_warn {
	($logger:expr, $($arg:tt)*) => {
		$logger.warn(format_args!($($arg)*))
	};
}

#[macro_export]
macro_rules! log_error {
	($logger:expr, $($arg:tt)*) => {
		$logger.error(format_args!($($arg)*))
	};
}
