//! Interactive filter editing: the prompt, its commands and the keypress
//! watcher that opens it.

mod command;
mod keypress;
mod session;
mod terminal;

pub use command::*;
pub use keypress::*;
pub use session::*;
pub use terminal::*;
