//! Operator-facing text: help, rule listings, statistics and status lines.
//!
//! Status lines go to stderr so they never mix with filtered stdout.

use std::fmt::Write as _;

use owo_colors::OwoColorize;

use crate::filter::{FilterEngine, FilterStats};

/// Help shown by the interactive `help` command.
#[must_use]
pub fn interactive_help() -> String {
    const COMMANDS: [(&str, &str); 7] = [
        ("ignore-line", "add a full match to ignore"),
        ("ignore-re", "add an ignore pattern, e.g. ^(FINE|DEBUG)"),
        ("ignore-substring", "add a partial match to ignore"),
        ("pats", "list ignore patterns"),
        ("quit", "terminate running program"),
        ("stats", "print stats"),
        ("snippet", "add a snippet expression, e.g. s/^(INFO|WARNING|ERROR) //"),
    ];

    let mut out = String::new();
    for (name, text) in COMMANDS {
        let _ = writeln!(out, "{:<16} - {text}", name.bold());
    }
    out.push_str("\nTo keep going, just enter an empty line.\n");
    out
}

/// List every installed rule, grouped by kind, in registration order.
#[must_use]
pub fn format_patterns(engine: &FilterEngine) -> String {
    let rules = engine.ignore_rules();
    let mut out = String::new();

    let mut section = |name: &str, items: Vec<&str>| {
        let _ = writeln!(out, " * {}", name.bold());
        for item in items {
            let _ = writeln!(out, "{item}");
        }
    };

    section(
        "ignore-re",
        rules.patterns().iter().map(regex::Regex::as_str).collect(),
    );
    section(
        "ignore-line",
        rules.lines().iter().map(String::as_str).collect(),
    );
    section(
        "ignore-substring",
        rules.substrings().iter().map(String::as_str).collect(),
    );
    section(
        "snippet",
        engine
            .substitutions()
            .rules()
            .iter()
            .map(crate::filter::Substitution::expression)
            .collect(),
    );

    out
}

/// One-line summary of the counters.
#[must_use]
pub fn format_stats(stats: FilterStats) -> String {
    format!("Suppressed {}/{} lines.\n", stats.suppressed, stats.total)
}

/// Announce the command about to run.
pub fn print_running(command: &[String]) {
    let quoted: Vec<String> = command
        .iter()
        .map(|arg| shell_escape::escape(arg.as_str().into()).into_owned())
        .collect();
    eprintln!("{} {}", "Running:".blue().bold(), quoted.join(" "));
}

/// Announce pipe mode.
pub fn print_pipe_mode() {
    eprintln!("{}", "Running in pipe mode".blue().bold());
}

/// Final summary.
pub fn print_done(stats: FilterStats) {
    eprint!("{} {}", "Done.".green().bold(), format_stats(stats));
}

/// Report a fatal error.
pub fn print_error(message: &str) {
    eprintln!("{} {}", "[ERROR]".red().bold(), message);
}
