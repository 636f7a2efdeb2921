//! Log file naming.
//!
//! `auto` picks `<program>.%d`, or `prolix.%d` when filtering a pipe. A bare
//! file name lands in the temporary directory. `%d` becomes a local timestamp.

use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use chrono::{DateTime, TimeZone};

/// Log name that asks for an automatically chosen file.
pub const AUTO_LOG_NAME: &str = "auto";

const TIMESTAMP_PLACEHOLDER: &str = "%d";
const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Work out the log path for the `--log` value `requested`.
///
/// `program` is the child executable, or `None` in pipe mode.
#[must_use]
pub fn resolve_log_path<Tz>(requested: &str, program: Option<&str>, now: &DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let name = if requested == AUTO_LOG_NAME {
        let base = program
            .and_then(|p| Path::new(p).file_name())
            .and_then(|n| n.to_str())
            .unwrap_or(env!("CARGO_PKG_NAME"));
        format!("{base}.{TIMESTAMP_PLACEHOLDER}")
    } else {
        requested.to_string()
    };

    let name = name.replace(
        TIMESTAMP_PLACEHOLDER,
        &now.format(TIMESTAMP_FORMAT).to_string(),
    );

    if name.contains(MAIN_SEPARATOR) {
        PathBuf::from(name)
    } else {
        std::env::temp_dir().join(name)
    }
}
