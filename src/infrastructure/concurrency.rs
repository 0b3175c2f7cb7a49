/// Worker pool for CPU-bound extraction.
///
/// A local rayon pool rather than the global one, so each run is sized by
/// its own `--workers` setting and tests can build pools side by side.

use anyhow::{Context, Result};

/// Stack size of pool threads. Deeply nested sources recurse through the
/// tree builder; the builder's own recursion limit must trip first.
pub const WORKER_STACK_SIZE: usize = 16 * 1024 * 1024;

/// One worker per core.
pub fn default_workers() -> usize {
    std::cmp::max(1, num_cpus::get())
}

/// Build the extraction pool with `workers` named threads.
pub fn build_worker_pool(workers: usize) -> Result<rayon::ThreadPool> {
    let workers = std::cmp::max(1, workers);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .stack_size(WORKER_STACK_SIZE)
        .thread_name(|index| format!("extract-{index}"))
        .build()
        .context("failed to build extraction worker pool")?;

    tracing::debug!(workers, cores = num_cpus::get(), "initialized worker pool");
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_has_requested_size() {
        let pool = build_worker_pool(3).unwrap();
        assert_eq!(pool.current_num_threads(), 3);
    }

    #[test]
    fn test_zero_workers_still_builds_one() {
        let pool = build_worker_pool(0).unwrap();
        assert_eq!(pool.current_num_threads(), 1);
    }

    #[test]
    fn test_default_workers_is_positive() {
        assert!(default_workers() >= 1);
    }
}
