//! Rayon-based parallelisation utilities.
//!
//! Rolling-window estimates and hedge rules are independent given a fixed
//! book and factor snapshot, so they are mapped in parallel. All helpers
//! preserve input order.
//!
//! # Performance Targets
//!
//! - Serial execution below the threshold, where thread hand-off dominates
//! - Batched work units sized for cache reuse of the trailing window

use std::ops::Range;

use rayon::prelude::*;

/// Batch size for parallel processing.
pub const DEFAULT_BATCH_SIZE: usize = 64;

/// Default minimum item count before going parallel.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 100;

/// Order-preserving parallel map over a slice.
pub fn parallel_map<T, R, F>(items: &[T], mapper: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    items.par_iter().map(mapper).collect()
}

/// Configuration for parallel execution.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ParallelConfig {
    /// Minimum items per rayon work unit
    pub batch_size: usize,
    /// Minimum items before using parallelism
    pub parallel_threshold: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl ParallelConfig {
    /// Creates a new parallel configuration.
    pub fn new(batch_size: usize, parallel_threshold: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            parallel_threshold,
        }
    }

    /// Always serial; useful for deterministic debugging.
    pub fn serial() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            parallel_threshold: usize::MAX,
        }
    }

    /// Returns whether to use parallel processing for the given item count.
    #[inline]
    pub fn should_parallelize(&self, n_items: usize) -> bool {
        n_items >= self.parallel_threshold
    }

    /// Maps every index in `range`, in order, serially or on rayon.
    pub fn map_range<R, F>(&self, range: Range<usize>, f: F) -> Vec<R>
    where
        R: Send,
        F: Fn(usize) -> R + Sync + Send,
    {
        if self.should_parallelize(range.len()) {
            range
                .into_par_iter()
                .with_min_len(self.batch_size.max(1))
                .map(f)
                .collect()
        } else {
            range.map(f).collect()
        }
    }

    /// Maps every item of a slice, in order, serially or on rayon.
    pub fn map_slice<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        if self.should_parallelize(items.len()) {
            parallel_map(items, f)
        } else {
            items.iter().map(f).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_map() {
        let items: Vec<i32> = (0..100).collect();
        let doubled: Vec<i32> = parallel_map(&items, |&x| x * 2);

        assert_eq!(doubled.len(), 100);
        assert_eq!(doubled[50], 100);
    }

    #[test]
    fn test_parallel_config_default() {
        let config = ParallelConfig::default();
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.parallel_threshold, 100);
    }

    #[test]
    fn test_should_parallelize() {
        let config = ParallelConfig::default();
        assert!(!config.should_parallelize(50));
        assert!(config.should_parallelize(100));
        assert!(config.should_parallelize(1000));
        assert!(!ParallelConfig::serial().should_parallelize(1_000_000));
    }

    #[test]
    fn test_map_range_preserves_order() {
        let serial = ParallelConfig::serial().map_range(0..500, |i| i * i);
        let parallel = ParallelConfig::new(8, 1).map_range(0..500, |i| i * i);
        assert_eq!(serial, parallel);
        assert_eq!(parallel[499], 499 * 499);
    }

    #[test]
    fn test_map_slice_preserves_order() {
        let items: Vec<u64> = (0..300).collect();
        let out = ParallelConfig::new(4, 10).map_slice(&items, |x| x + 1);
        assert_eq!(out, (1..301).collect::<Vec<u64>>());
    }

    #[test]
    fn test_new_clamps_batch_size() {
        assert_eq!(ParallelConfig::new(0, 10).batch_size, 1);
    }
}
