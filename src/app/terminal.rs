//! Terminal setup for one x2pdf run: the stderr log subscriber, and whether
//! logs are coloured and a spinner is drawn while the API is busy.
//!
//! Colour is off for `--no-color`, a non-empty `NO_COLOR`, or `TERM=dumb`.
//! The spinner needs an interactive stderr and stays off under `--quiet` and
//! on dumb terminals, so piped or scripted runs get plain log lines only.

use std::io::{self, IsTerminal};

use tracing_subscriber::EnvFilter;

use crate::cli::GlobalArgs;

/// Decorations allowed for this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TerminalStyle {
    pub(crate) color: bool,
    pub(crate) spinner: bool,
}

/// The parts of the process environment the style depends on.
#[derive(Debug, Clone, Copy, Default)]
struct Environment {
    no_color: bool,
    dumb: bool,
    stderr_is_terminal: bool,
}

impl Environment {
    fn current() -> Self {
        Self {
            no_color: std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty()),
            dumb: std::env::var("TERM").is_ok_and(|value| value.eq_ignore_ascii_case("dumb")),
            stderr_is_terminal: io::stderr().is_terminal(),
        }
    }
}

impl TerminalStyle {
    /// Reads the environment and combines it with the command-line flags.
    pub(crate) fn detect(args: &GlobalArgs) -> Self {
        Self::decide(args, Environment::current())
    }

    fn decide(args: &GlobalArgs, env: Environment) -> Self {
        Self {
            color: !(args.no_color || env.no_color || env.dumb),
            spinner: env.stderr_is_terminal && !args.quiet && !env.dumb,
        }
    }
}

/// Installs the stderr subscriber. `RUST_LOG` wins over `default_level`.
pub(crate) fn init_tracing(default_level: &str, color: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_ansi(color)
        .with_env_filter(filter)
        .try_init();
}
