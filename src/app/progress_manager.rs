//! Progress UI (spinner) while waiting on the API.

use std::future::Future;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Runs `task` with a spinner on stderr showing `message`.
/// When `use_spinner` is false the task runs without any UI.
pub(crate) async fn with_spinner<F, T>(use_spinner: bool, message: String, task: F) -> T
where
    F: Future<Output = T>,
{
    if !use_spinner {
        return task.await;
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));

    let output = task.await;
    spinner.finish_and_clear();
    output
}
