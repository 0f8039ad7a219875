//! Progress reporting for slicing batches

use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar over a batch of parent rasters
pub struct SliceProgress {
    bar: ProgressBar,
}

impl SliceProgress {
    /// Create a bar for `total` parents
    pub fn new(total: u64, description: &str) -> Self {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );
        bar.set_message(description.to_string());
        SliceProgress { bar }
    }

    /// Record one finished parent
    pub fn advance(&self, parent_id: &str) {
        self.bar.set_message(parent_id.to_string());
        self.bar.inc(1);
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("Completed");
    }
}
