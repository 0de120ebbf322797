//! Thread tools

use crate::types::Result;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Create a pool of worker threads
pub fn create_pool(num_threads: usize) -> Result<ThreadPool> {
    Ok(ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|i| format!("meshprobe-worker-{i}"))
        .build()?)
}

/// Run `op` on a dedicated pool of `num_threads` workers, or on the global pool if `None`
pub fn run_in_pool<R: Send>(
    num_threads: Option<usize>,
    op: impl FnOnce() -> R + Send,
) -> Result<R> {
    match num_threads {
        Some(n) => Ok(create_pool(n)?.install(op)),
        None => Ok(op()),
    }
}
