//! Progress reporting for long decode passes, built on indicatif.
//!
//! indicatif draws to stderr and stays silent when stderr is not a
//! terminal, so redirected runs and tests produce no bar output.

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle};

/// Byte-based progress bar over an in-memory log.
pub struct ProgressBar {
    bar: IndicatifBar,
}

impl ProgressBar {
    pub fn new(total_bytes: usize, label: &str) -> Self {
        let bar = IndicatifBar::new(total_bytes as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {percent:>3}% ({binary_bytes}/{binary_total_bytes}) {eta}")
        {
            bar.set_style(style.progress_chars("█░"));
        }
        bar.set_message(label.to_string());

        Self { bar }
    }

    pub fn update(&self, bytes: usize) {
        self.bar.set_position(bytes as u64);
    }

    pub fn finish(&self) {
        self.bar.finish();
    }

    /// Remove the bar from the terminal, e.g. before reporting an error.
    pub fn abandon(&self) {
        self.bar.finish_and_clear();
    }
}
