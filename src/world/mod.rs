pub mod chunk;
pub mod io;
pub mod region;
