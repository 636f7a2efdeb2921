//! Prolix - trim the output of chatty commands.
//!
//! Runs a command, filters its stdout and stderr line by line, and lets the
//! operator add ignore and rewrite rules interactively while it runs.

pub mod commands;
pub mod config;
pub mod coordinator;
pub mod display;
pub mod filter;
pub mod interactive;
pub mod output;
pub mod process;
