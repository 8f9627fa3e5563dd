use crate::{DEFLATE_RATIO, TOLERANCE_RATIO};
use std::num::NonZeroU64;

/// The ratios used to turn an uncompressed size into a part count.
///
/// The default uses [`DEFLATE_RATIO`] and [`TOLERANCE_RATIO`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Estimator {
    pub deflate_ratio: f64,
    pub tolerance_ratio: f64,
}

impl Default for Estimator {
    fn default() -> Self {
        Self {
            deflate_ratio: DEFLATE_RATIO,
            tolerance_ratio: TOLERANCE_RATIO,
        }
    }
}

/// The outcome of [`Estimator::estimate`], along with the values it was derived from.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SplitEstimate {
    pub number_of_files: i64,
    pub total_size_bytes: i64,
    pub block_size: NonZeroU64,
    /// Approximate size after compression, in bytes
    pub total_size_deflate: f64,
    pub split: bool,
    /// Number of parts, always at least 1 when `split` is set, 0 otherwise
    pub parts: u64,
}

impl SplitEstimate {
    /// The deflated size as a fraction of a single block.
    #[must_use]
    pub fn block_fraction(&self) -> f64 {
        self.total_size_deflate / self.block_size.get() as f64
    }
}

impl Estimator {
    #[must_use]
    pub fn new(deflate_ratio: f64, tolerance_ratio: f64) -> Self {
        Self {
            deflate_ratio,
            tolerance_ratio,
        }
    }

    /// Approximate size of `total_size_bytes` bytes once compressed.
    #[must_use]
    #[inline]
    pub fn deflated_size(&self, total_size_bytes: i64) -> f64 {
        self.deflate_ratio * total_size_bytes as f64
    }

    /// The largest remainder, in bytes, that is folded into the other parts
    /// rather than rounded up into a part of its own.
    #[must_use]
    #[inline]
    pub fn tolerance(&self, block_size: NonZeroU64) -> f64 {
        self.tolerance_ratio * block_size.get() as f64
    }

    /// Whether splitting is warranted at all.
    ///
    /// No files never split. A single file is left alone if it fits in one
    /// block, or overshoots it by less than the tolerance. Anything else splits.
    #[must_use]
    pub fn should_split(
        &self,
        number_of_files: i64,
        total_size_deflate: f64,
        block_size: NonZeroU64,
    ) -> bool {
        let block = block_size.get() as f64;
        match number_of_files {
            0 => false,
            1 if total_size_deflate <= block => false,
            1 if total_size_deflate < block * (1.0 + self.tolerance_ratio) => false,
            _ => true,
        }
    }

    /// Number of parts for `total_size_deflate` bytes, assuming a split was decided.
    ///
    /// A remainder within the tolerance rounds the quotient to the nearest
    /// integer (half away from zero), a larger one rounds it up. Never less than 1.
    ///
    /// The remainder is always non-negative, even for a negative size.
    #[must_use]
    pub fn split_parts(&self, total_size_deflate: f64, block_size: NonZeroU64) -> u64 {
        let block = block_size.get() as f64;
        let remaining = total_size_deflate.rem_euclid(block);
        let quotient = total_size_deflate / block;

        let parts = if remaining <= self.tolerance(block_size) {
            quotient.round()
        } else {
            quotient.ceil()
        };
        // float to int casts saturate, and NaN becomes 0
        (parts as i64).max(1) as u64
    }

    #[must_use]
    pub fn estimate(
        &self,
        number_of_files: i64,
        total_size_bytes: i64,
        block_size: NonZeroU64,
    ) -> SplitEstimate {
        let _span = tracing::trace_span!(
            "estimate",
            number_of_files,
            total_size_bytes,
            block_size = block_size.get(),
        )
        .entered();

        let total_size_deflate = self.deflated_size(total_size_bytes);
        let split = self.should_split(number_of_files, total_size_deflate, block_size);
        let parts = if split {
            self.split_parts(total_size_deflate, block_size)
        } else {
            0
        };
        tracing::debug!(total_size_deflate, split, parts, "estimated split");

        SplitEstimate {
            number_of_files,
            total_size_bytes,
            block_size,
            total_size_deflate,
            split,
            parts,
        }
    }

    #[must_use]
    pub fn part_count(
        &self,
        number_of_files: i64,
        total_size_bytes: i64,
        block_size: NonZeroU64,
    ) -> u64 {
        self.estimate(number_of_files, total_size_bytes, block_size)
            .parts
    }
}
