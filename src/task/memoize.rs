//! Request-scoped memoization of expensive async lookups
//!
//! A [`MemoScope`] lives for exactly one resolution run and is passed by
//! reference to whatever needs it, so cache lifetime is visible in every
//! signature and two independent runs can never observe each other's
//! entries. Within a scope, concurrent callers racing on the same key
//! await a single computation instead of duplicating the work.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;

/// Per-run cache that deduplicates async computations by key.
///
/// Values must be cheap to clone; callers caching large results should
/// wrap them in `Arc`. A failed computation is not cached, so a later
/// call with the same key retries it.
pub struct MemoScope<K, V> {
    entries: Mutex<HashMap<K, Arc<OnceCell<V>>>>,
}

impl<K, V> MemoScope<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached value for `key`, computing it at most once per
    /// scope. Concurrent calls with an equal key share one in-flight
    /// computation.
    pub async fn get_or_compute<E, F, Fut>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let cell = {
            let mut entries = self.entries.lock().expect("memo scope lock poisoned");
            Arc::clone(
                entries
                    .entry(key)
                    .or_insert_with(|| Arc::new(OnceCell::new())),
            )
        };
        cell.get_or_try_init(compute).await.cloned()
    }

    /// Number of keys whose computation has completed. Used by tests and
    /// debug assertions to confirm a scope starts fresh.
    pub fn computed_len(&self) -> usize {
        self.entries
            .lock()
            .expect("memo scope lock poisoned")
            .values()
            .filter(|cell| cell.initialized())
            .count()
    }
}

impl<K, V> Default for MemoScope<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn computes_once_per_key_within_scope() {
        let scope: MemoScope<&str, usize> = MemoScope::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value: Result<usize, Infallible> = scope
                .get_or_compute("key", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                })
                .await;
            assert_eq!(value.unwrap(), 42);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(scope.computed_len(), 1);
    }

    #[tokio::test]
    async fn distinct_keys_never_collide() {
        let scope: MemoScope<String, String> = MemoScope::new();

        let a: Result<String, Infallible> = scope
            .get_or_compute("a".to_string(), || async { Ok("value-a".to_string()) })
            .await;
        let b: Result<String, Infallible> = scope
            .get_or_compute("b".to_string(), || async { Ok("value-b".to_string()) })
            .await;

        assert_eq!(a.unwrap(), "value-a");
        assert_eq!(b.unwrap(), "value-b");
        assert_eq!(scope.computed_len(), 2);
    }

    #[tokio::test]
    async fn sequential_scopes_share_nothing() {
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let scope: MemoScope<&str, usize> = MemoScope::new();
            assert_eq!(scope.computed_len(), 0);

            let value: Result<usize, Infallible> = scope
                .get_or_compute("shared-key", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                })
                .await;
            assert_eq!(value.unwrap(), 7);

            // Same key again inside the same scope: no extra call.
            let _: Result<usize, Infallible> = scope
                .get_or_compute("shared-key", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                })
                .await;
        }

        // One call per scope, not one call total and not four.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_computation() {
        let scope = Arc::new(MemoScope::<&str, usize>::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let scope = Arc::clone(&scope);
                let calls = Arc::clone(&calls);
                tokio::spawn(async move {
                    let value: Result<usize, Infallible> = scope
                        .get_or_compute("key", || async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                            Ok(1)
                        })
                        .await;
                    value.unwrap()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), 1);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_computation_is_retried() {
        let scope: MemoScope<&str, usize> = MemoScope::new();
        let calls = AtomicUsize::new(0);

        let first: Result<usize, &str> = scope
            .get_or_compute("key", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("transient")
            })
            .await;
        assert!(first.is_err());
        assert_eq!(scope.computed_len(), 0);

        let second: Result<usize, &str> = scope
            .get_or_compute("key", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(9)
            })
            .await;
        assert_eq!(second.unwrap(), 9);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
