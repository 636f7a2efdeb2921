//! Child process spawning, signalling and stream reading.

mod reader;
mod supervisor;

pub use reader::*;
pub use supervisor::*;
