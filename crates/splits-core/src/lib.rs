//! Estimates how many block sized parts a set of files should be split into
//! once it has been deflate compressed.

use std::num::NonZeroU64;

pub mod estimator;

pub use estimator::{Estimator, SplitEstimate};

/// Empirical expansion applied to the uncompressed size to approximate the
/// size produced by the target deflate implementation.
///
/// This is slightly larger than what a generic gzip stream produces.
pub const DEFLATE_RATIO: f64 = 1.365;

/// Slack relative to the block size.
///
/// A single file within this margin of a block is not split, and a trailing
/// remainder within this margin is folded into the other parts instead of
/// getting a part of its own.
pub const TOLERANCE_RATIO: f64 = 0.1562;

/// Returns whether `number_of_files` files with a combined deflated size of
/// `total_size_deflate` bytes should be split into `block_size` parts at all.
#[must_use]
#[inline]
pub fn should_split(number_of_files: i64, total_size_deflate: f64, block_size: NonZeroU64) -> bool {
    Estimator::default().should_split(number_of_files, total_size_deflate, block_size)
}

/// Returns the number of parts `number_of_files` files totalling
/// `total_size_bytes` uncompressed bytes should be split into.
///
/// Zero means the files should be left as they are.
#[must_use]
#[inline]
pub fn part_count(number_of_files: i64, total_size_bytes: i64, block_size: NonZeroU64) -> u64 {
    Estimator::default().part_count(number_of_files, total_size_bytes, block_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HDFS_BLOCK: NonZeroU64 = match NonZeroU64::new(134_217_728) {
        Some(size) => size,
        None => panic!("block size must be non-zero"),
    };

    #[test]
    fn no_files_never_split() {
        for size in [0.0, 1.0, 1e6, 1e12] {
            assert!(!should_split(0, size, HDFS_BLOCK));
        }
        assert_eq!(part_count(0, 1_000_000, HDFS_BLOCK), 0);
        assert_eq!(part_count(0, i64::MAX, HDFS_BLOCK), 0);
    }

    #[test]
    fn single_file_within_block() {
        let block = HDFS_BLOCK.get() as f64;
        assert!(!should_split(1, block, HDFS_BLOCK));
        assert!(!should_split(1, block * 1.1, HDFS_BLOCK));
        assert!(should_split(1, block * 1.2, HDFS_BLOCK));
    }

    #[test]
    fn many_files_always_split() {
        for files in [2, 5, 1000] {
            assert!(should_split(files, 1.0, HDFS_BLOCK));
        }
    }

    #[test]
    fn reference_scenarios() {
        assert_eq!(part_count(1, 100_000_000, HDFS_BLOCK), 0);
        assert_eq!(part_count(1, 1_000_000_000, HDFS_BLOCK), 11);
        assert_eq!(part_count(5, 1, HDFS_BLOCK), 1);
    }
}
