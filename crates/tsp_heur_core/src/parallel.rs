use std::thread;

use rayon::ThreadPool;

use crate::{Error, Result};

const THREAD_FALLBACK_PARALLELISM: usize = 2;
const THREAD_MIN_PARALLELISM: usize = 2;
const THREAD_RESERVED_CORES: usize = 1;

/// Worker count used when a config asks for `threads = 0`.
pub fn available_threads() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(THREAD_FALLBACK_PARALLELISM)
        .max(THREAD_MIN_PARALLELISM)
        - THREAD_RESERVED_CORES
}

pub(crate) fn resolve_threads(requested: usize) -> usize {
    if requested == 0 {
        available_threads()
    } else {
        requested
    }
}

/// Fixed-size pool shared by the parallel phases of one solver run.
pub(crate) fn build_pool(threads: usize) -> Result<ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(resolve_threads(threads))
        .thread_name(|idx| format!("tsp-heur-worker-{idx}"))
        .build()
        .map_err(|e| Error::other(format!("rayon pool: {e}")))
}

/// Runs `op` inside a dedicated pool unless the run is single-threaded.
pub(crate) fn run_with_threads<T, F>(threads: usize, op: F) -> Result<T>
where
    T: Send,
    F: FnOnce() -> Result<T> + Send,
{
    if resolve_threads(threads) <= 1 {
        return op();
    }
    build_pool(threads)?.install(op)
}

#[cfg(test)]
mod tests {
    use super::{available_threads, resolve_threads, run_with_threads};

    #[test]
    fn zero_threads_means_all_available() {
        assert_eq!(resolve_threads(0), available_threads());
        assert_eq!(resolve_threads(3), 3);
        assert!(available_threads() >= 1);
    }

    #[test]
    fn run_with_threads_returns_op_result() {
        let sequential = run_with_threads(1, || Ok(21 * 2)).expect("sequential run");
        let pooled = run_with_threads(2, || Ok(rayon::current_num_threads())).expect("pooled run");
        assert_eq!(sequential, 42);
        assert_eq!(pooled, 2);
    }
}
