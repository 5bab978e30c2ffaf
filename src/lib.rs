pub mod nbt;
pub mod world;
pub mod ioext;
pub mod error;
pub mod macros;
pub mod claims;
pub mod config;
pub mod restore;
pub mod log;
pub mod logging;

pub use flate2;

pub use error::McError;
pub use error::McResult;
