//! Bounded-parallelism executor for I/O-bound async work
//!
//! Resolution fans out over every candidate package, and each package may
//! trigger several filesystem scans. Running all of that unbounded would
//! exhaust file descriptors on large dependency trees, so every fan-out in
//! the pipeline goes through [`run_all`], which caps the number of workers
//! in flight while keeping the output in input order.

pub mod memoize;

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::future;
use tokio::sync::Semaphore;

/// Maximum number of workers in flight at once. Fixed rather than
/// caller-configurable: the bound exists to protect file descriptors, not
/// to tune throughput.
const MAX_CONCURRENT_TASKS: usize = 8;

/// Runs `worker` over all items with bounded concurrency.
///
/// The returned vector matches the input order regardless of completion
/// order. If a worker fails, the error is returned after every
/// already-started worker has settled; work that has not started yet by
/// the time the failure is observed is skipped.
pub async fn run_all<T, R, E, F, Fut>(items: Vec<T>, worker: F) -> Result<Vec<R>, E>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_TASKS));
    let failed = Arc::new(AtomicBool::new(false));

    let tasks = items.into_iter().map(|item| {
        let semaphore = Arc::clone(&semaphore);
        let failed = Arc::clone(&failed);
        let fut = worker(item);
        async move {
            let _permit = semaphore
                .acquire()
                .await
                .expect("task runner semaphore closed");
            if failed.load(Ordering::Acquire) {
                return None;
            }
            match fut.await {
                Ok(value) => Some(Ok(value)),
                Err(err) => {
                    failed.store(true, Ordering::Release);
                    Some(Err(err))
                }
            }
        }
    });

    // join_all keeps input order and only resolves once every wrapper has
    // settled, so an error never races ahead of in-flight workers.
    let settled = future::join_all(tasks).await;

    let mut first_error = None;
    let mut results = Vec::with_capacity(settled.len());
    for outcome in settled {
        match outcome {
            Some(Ok(value)) => results.push(value),
            Some(Err(err)) => {
                first_error.get_or_insert(err);
            }
            // Skipped after a failure was observed; the error below covers it.
            None => {}
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(results),
    }
}
