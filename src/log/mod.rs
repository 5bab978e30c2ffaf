//! Logging context passed explicitly into the resolver and each region task.
//!
//! Library code takes an `Arc<dyn Logger>` rather than calling `tracing`
//! directly, so tests can run silently and each task can tag its own lines.
//!
//! ```
//! use mcrestore::log::{Logger, NoOpLogger};
//! use mcrestore::log_info;
//! use std::sync::Arc;
//!
//! let logger: Arc<dyn Logger> = Arc::new(NoOpLogger);
//! log_info!(logger, "Restoring {} regions", 12);
//! ```

mod noop;
mod prefixed;
mod tracing_adapter;
mod r#trait;

pub use noop::NoOpLogger;
pub use prefixed::PrefixedLogger;
pub use r#trait::{LogLevel, Logger};
pub use tracing_adapter::TracingLogger;
