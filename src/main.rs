//! Prolix - trim the output of chatty commands.
//!
//! ```text
//! prolix --ignore-substring '(spam)' -- mycmd --spamlevel=4
//! cat existing.log | prolix -b spammy
//! ```
//!
//! While the command runs, hit enter to add filters interactively.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use prolix::commands::{run_pipe, run_spawn};
use prolix::config::{FilterConfig, RunConfig};
use prolix::display;

#[derive(Parser)]
#[command(
    name = "prolix",
    about = "Trim the output of chatty commands, interactively",
    version
)]
struct Cli {
    /// Log kept output to this file ('auto' picks a name, %d expands to the time)
    #[arg(long)]
    log: Option<String>,

    /// Filter stdin even if a command is given
    #[arg(long)]
    pipe: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Ignore lines matching this regex (repeatable)
    #[arg(short = 'r', long = "ignore-re", alias = "ignore_re", value_name = "REGEX")]
    ignore_re: Vec<String>,

    /// Ignore lines equal to this text (repeatable)
    #[arg(short = 'i', long = "ignore-line", alias = "ignore_line", value_name = "LINE")]
    ignore_line: Vec<String>,

    /// Ignore lines containing this text (repeatable)
    #[arg(
        short = 'b',
        long = "ignore-substring",
        alias = "ignore_substring",
        value_name = "TEXT"
    )]
    ignore_substring: Vec<String>,

    /// Rewrite kept lines with a sed-style expression, e.g. 's/^INFO //' (repeatable)
    #[arg(short = 's', long = "snippet", value_name = "EXPR")]
    snippet: Vec<String>,

    /// Seconds to wait after SIGTERM before sending SIGKILL
    #[arg(long, default_value_t = 10, value_name = "SECS")]
    grace_period: u64,

    /// Command to run, after `--`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

impl From<Cli> for RunConfig {
    fn from(cli: Cli) -> Self {
        Self {
            log: cli.log,
            pipe: cli.pipe,
            verbose: cli.verbose,
            filters: FilterConfig {
                ignore_re: cli.ignore_re,
                ignore_line: cli.ignore_line,
                ignore_substring: cli.ignore_substring,
                snippets: cli.snippet,
            },
            command: cli.command,
            grace_period: Duration::from_secs(cli.grace_period),
        }
    }
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = RunConfig::from(cli);
    let result = if config.is_pipe_mode() {
        run_pipe(&config).await
    } else {
        run_spawn(&config).await
    };

    match result {
        Ok(summary) => {
            if config.verbose > 0 {
                display::print_done(summary.stats);
            }
            ExitCode::from(summary.exit_code)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Run failed");
            display::print_error(&e.to_string());
            ExitCode::from(e.exit_code())
        }
    }
}
