//! Spinner shown while an image is pulled.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;

use crate::adapter::inbound::cli::output;
use crate::port::PullProgress;

const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Starts a spinner on the first pull line and mirrors the latest line in it.
/// Nothing is drawn in JSON or quiet mode.
#[derive(Default)]
pub struct SpinnerProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl SpinnerProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn start_spinner() -> ProgressBar {
    if output::is_json() || output::is_quiet() {
        return ProgressBar::hidden();
    }
    let style = ProgressStyle::default_spinner()
        .tick_strings(FRAMES)
        .template("  {spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    let bar = ProgressBar::new_spinner().with_style(style);
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

impl PullProgress for SpinnerProgress {
    fn on_line(&self, line: &str) {
        let mut bar = self.bar.lock();
        bar.get_or_insert_with(start_spinner)
            .set_message(line.trim().to_string());
    }

    fn on_finish(&self) {
        if let Some(bar) = self.bar.lock().take() {
            bar.finish_and_clear();
            output::success("Image pulled");
        }
    }
}
