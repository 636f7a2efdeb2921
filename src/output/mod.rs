//! Where kept lines go: the console and an optional log file.

mod log_file;
mod sink;

pub use log_file::*;
pub use sink::*;
