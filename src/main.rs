//! CLI entry point for the x2pdf tool.

// Clippy lints - strict for binary code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use std::process::ExitCode;

mod app;
mod app_config;
mod cli;
mod output;

/// Process outcome reported to the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    Success,
    Failure,
}

impl ProcessExit {
    fn code(self) -> ExitCode {
        match self {
            Self::Success => ExitCode::SUCCESS,
            Self::Failure => ExitCode::FAILURE,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is normal; the token may come from the real environment.
    let _ = dotenvy::dotenv();

    let outcome = match app::runtime::run_x2pdf().await {
        Ok(outcome) => outcome,
        Err(error) => {
            eprintln!("Error: {error:#}");
            ProcessExit::Failure
        }
    };
    outcome.code()
}
