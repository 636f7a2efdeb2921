//! Line filtering: ignore rules, sed-style substitutions and the engine that applies them.

mod engine;
mod error;
mod line;
mod substitution;

pub use engine::*;
pub use error::*;
pub use line::*;
pub use substitution::*;
