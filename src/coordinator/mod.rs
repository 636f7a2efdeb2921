//! Merges the child's two line streams and switches between passthrough and
//! interactive filter editing.

mod event;
mod runner;
mod state;

pub use event::*;
pub use runner::*;
pub use state::*;
