//! The two ways to run: spawn a child, or filter our own stdin.

mod error;
mod pipe;
mod spawn;

pub use error::*;
pub use pipe::*;
pub use spawn::*;
