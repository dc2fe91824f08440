use crate::error::Result;
use rayon::ThreadPoolBuilder;
use std::sync::LazyLock;

/// Worker count used when no explicit size is configured.
pub const MAX_DEFAULT_WORKERS: usize = 16;

static NUM_CPUS: LazyLock<usize> = LazyLock::new(|| {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1)
});

/// Default worker count: available parallelism, capped at [`MAX_DEFAULT_WORKERS`]
#[must_use]
pub fn default_workers() -> usize {
    (*NUM_CPUS).min(MAX_DEFAULT_WORKERS)
}

/// Build a fixed-size pool of hashing workers.
///
/// The pool is owned by the caller and torn down when dropped, so each bulk
/// operation gets its own workers rather than sharing a process-wide pool.
///
/// # Errors
///
/// Returns an error if the operating system refuses to spawn the threads
pub fn build_pool(num_threads: usize) -> Result<rayon::ThreadPool> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(num_threads.max(1))
        .thread_name(|i| format!("bulkhash-worker-{i}"))
        .build()?;
    Ok(pool)
}
