//! Pixel statistics for patches
//!
//! Per-channel arithmetic mean and population standard deviation over a
//! patch's pixels, computed in one pass from running sums. Intensities
//! are normalized to [0, 1]. Results cache on the record: a patch whose
//! statistics are already present is returned untouched, so statistics
//! go stale if the file is replaced on disk (a documented limitation of
//! the cache-then-skip policy).

use log::debug;

use crate::errors::{PatchError, PatchResult};
use crate::tree::{ChannelStats, ImageRecord, PixelStats};

#[cfg(test)]
mod tests;

/// Running sums for one channel
#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    sum: f64,
    sum_sq: f64,
    count: u64,
}

impl Accumulator {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.sum_sq += value * value;
        self.count += 1;
    }

    fn merge(&mut self, other: &Accumulator) {
        self.sum += other.sum;
        self.sum_sq += other.sum_sq;
        self.count += other.count;
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum / self.count as f64
    }

    /// Population standard deviation
    fn std_dev(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let mean = self.mean();
        let variance = self.sum_sq / self.count as f64 - mean * mean;
        // Rounding can push a constant channel's variance a hair below zero
        variance.max(0.0).sqrt()
    }
}

/// Computes and caches per-channel pixel statistics
pub struct StatsComputer;

impl StatsComputer {
    /// Compute a patch's pixel statistics, or return the cached ones
    ///
    /// # Arguments
    /// * `record` - Child record backed by a patch file
    ///
    /// # Returns
    /// The record's statistics (possibly cached), or an error when the
    /// file cannot be read
    pub fn compute(record: &mut ImageRecord) -> PatchResult<PixelStats> {
        if let Some(stats) = record.pixel_stats {
            debug!("Statistics cached for {}", record.id);
            return Ok(stats);
        }

        let path = record.path.as_ref().ok_or_else(|| {
            PatchError::GenericError(format!("Record {} has no file path", record.id))
        })?;

        let img = image::open(path)?;
        let has_alpha = img.color().channel_count() >= 4;
        let rgba = img.to_rgba8();

        let mut red = Accumulator::default();
        let mut green = Accumulator::default();
        let mut blue = Accumulator::default();
        let mut alpha = Accumulator::default();

        for pixel in rgba.pixels() {
            red.push(pixel.0[0] as f64 / 255.0);
            green.push(pixel.0[1] as f64 / 255.0);
            blue.push(pixel.0[2] as f64 / 255.0);
            if has_alpha {
                alpha.push(pixel.0[3] as f64 / 255.0);
            }
        }

        let mut rgb = Accumulator::default();
        rgb.merge(&red);
        rgb.merge(&green);
        rgb.merge(&blue);

        let stats = PixelStats {
            mean: ChannelStats {
                red: red.mean(),
                green: green.mean(),
                blue: blue.mean(),
                rgb: rgb.mean(),
                alpha: has_alpha.then(|| alpha.mean()),
            },
            std_dev: ChannelStats {
                red: red.std_dev(),
                green: green.std_dev(),
                blue: blue.std_dev(),
                rgb: rgb.std_dev(),
                alpha: has_alpha.then(|| alpha.std_dev()),
            },
        };

        record.pixel_stats = Some(stats);
        Ok(stats)
    }
}
