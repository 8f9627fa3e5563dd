use splits_core::{part_count, should_split, Estimator, DEFLATE_RATIO, TOLERANCE_RATIO};
use std::num::NonZeroU64;

fn block(size: u64) -> NonZeroU64 {
    NonZeroU64::new(size).unwrap()
}

const HDFS_BLOCK: u64 = 134_217_728;

#[test]
fn zero_files() {
    assert_eq!(part_count(0, 1_000_000, block(HDFS_BLOCK)), 0);
}

#[test]
fn single_file_inside_tolerance() {
    // 136,500,000 deflated bytes is ~1.017 blocks
    assert_eq!(part_count(1, 100_000_000, block(HDFS_BLOCK)), 0);
}

#[test]
fn single_large_file() {
    // 1,365,000,000 deflated bytes is ~10.17 blocks, and the remainder of
    // ~22.8MB is larger than the ~21MB tolerance, so it gets its own part
    let deflated = DEFLATE_RATIO * 1_000_000_000.0;
    let remaining = deflated % HDFS_BLOCK as f64;
    assert!(remaining > TOLERANCE_RATIO * HDFS_BLOCK as f64);
    assert_eq!(part_count(1, 1_000_000_000, block(HDFS_BLOCK)), 11);
}

#[test]
fn many_tiny_files() {
    assert_eq!(part_count(5, 1, block(HDFS_BLOCK)), 1);
}

#[test]
fn negative_total_size() {
    // -1365 deflated bytes leave a remainder of 635, which rounds up to a
    // single part
    assert_eq!(part_count(2, -1000, block(1000)), 1);
}

#[test]
fn many_files_always_split() {
    for files in 2..50 {
        for size in [0.5, 1.0, 1e3, 1e9] {
            assert!(should_split(files, size, block(HDFS_BLOCK)));
        }
    }
}

#[test]
fn single_file_boundary() {
    let b = block(1_000_000);
    assert!(!should_split(1, 1_000_000.0, b));
    assert!(!should_split(1, 1_156_100.0, b));
    assert!(should_split(1, 1_156_300.0, b));
}

#[test]
fn part_count_grows_with_size() {
    let b = block(1 << 20);
    let mut previous = 0;
    for size in (0..200).map(|i| i * 512 * 1024) {
        let parts = part_count(3, size, b);
        assert!(parts >= 1);
        assert!(parts >= previous, "{size}: {parts} < {previous}");
        previous = parts;
    }
}

#[test]
fn repeated_calls_agree() {
    let estimator = Estimator::default();
    let first = estimator.estimate(7, 987_654_321, block(HDFS_BLOCK));
    for _ in 0..10 {
        assert_eq!(estimator.estimate(7, 987_654_321, block(HDFS_BLOCK)), first);
    }
}

#[test]
fn default_estimator_matches_free_functions() {
    let estimator = Estimator::default();
    assert_eq!(estimator.deflate_ratio, DEFLATE_RATIO);
    assert_eq!(estimator.tolerance_ratio, TOLERANCE_RATIO);
    for (files, size) in [(0, 10), (1, 10), (1, 1 << 30), (4, 1 << 28)] {
        assert_eq!(
            estimator.part_count(files, size, block(HDFS_BLOCK)),
            part_count(files, size, block(HDFS_BLOCK)),
        );
    }
}
