// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Batch fetcher capabilities consumed by resolvers.

use std::{
    collections::{HashMap, HashSet},
    fmt,
    sync::Arc,
};

use refdata_spawn::Spawner;

use crate::FetchError;

/// A blocking batch lookup against the source of truth.
///
/// Returns only the entries it found; a key absent from the result means "not found", never an
/// error. An `Err` is a fault visible to every caller depending on this invocation.
///
/// Any matching closure is a `BatchFetcher`:
///
/// ```
/// use std::collections::{HashMap, HashSet};
/// use refdata::{BatchFetcher, FetchError};
///
/// let fetcher = |keys: &HashSet<String>| -> Result<HashMap<String, usize>, FetchError> {
///     Ok(keys.iter().map(|k| (k.clone(), k.len())).collect())
/// };
///
/// let keys = HashSet::from(["abc".to_string()]);
/// assert_eq!(fetcher.fetch(&keys).unwrap()["abc"], 3);
/// ```
pub trait BatchFetcher<K, V>: Send + Sync {
    /// Looks up `keys`, blocking the calling thread.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] when the source cannot be consulted.
    fn fetch(&self, keys: &HashSet<K>) -> Result<HashMap<K, V>, FetchError>;
}

impl<K, V, F> BatchFetcher<K, V> for F
where
    F: Fn(&HashSet<K>) -> Result<HashMap<K, V>, FetchError> + Send + Sync,
{
    fn fetch(&self, keys: &HashSet<K>) -> Result<HashMap<K, V>, FetchError> {
        self(keys)
    }
}

/// An asynchronous batch lookup against the source of truth.
///
/// Same contract as [`BatchFetcher`], expressed as a future.
pub trait AsyncBatchFetcher<K, V>: Send + Sync {
    /// Looks up `keys`.
    fn fetch(&self, keys: HashSet<K>) -> impl Future<Output = Result<HashMap<K, V>, FetchError>> + Send;
}

/// An [`AsyncBatchFetcher`] built from a closure returning a future.
///
/// Created by [`fetch_fn`].
#[derive(Clone)]
pub struct FetchFn<F>(F);

impl<F> fmt::Debug for FetchFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchFn").finish_non_exhaustive()
    }
}

/// Builds an [`AsyncBatchFetcher`] from a closure.
///
/// ```
/// use std::collections::HashMap;
/// use refdata::{AsyncBatchFetcher, FetchError, fetch_fn};
///
/// let fetcher = fetch_fn(|keys: std::collections::HashSet<u32>| async move {
///     Ok::<_, FetchError>(keys.into_iter().map(|k| (k, k * 2)).collect::<HashMap<_, _>>())
/// });
/// # let _ = fetcher;
/// ```
pub fn fetch_fn<K, V, F, Fut>(f: F) -> FetchFn<F>
where
    F: Fn(HashSet<K>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<HashMap<K, V>, FetchError>> + Send,
{
    FetchFn(f)
}

impl<K, V, F, Fut> AsyncBatchFetcher<K, V> for FetchFn<F>
where
    F: Fn(HashSet<K>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<HashMap<K, V>, FetchError>> + Send,
{
    fn fetch(&self, keys: HashSet<K>) -> impl Future<Output = Result<HashMap<K, V>, FetchError>> + Send {
        (self.0)(keys)
    }
}

/// Adapts a [`BatchFetcher`] into an [`AsyncBatchFetcher`].
///
/// Every call is dispatched onto the spawner's blocking facility, so no caller and no async
/// worker thread waits on the blocking lookup. A panic inside the wrapped fetcher surfaces as a
/// [`FetchError`] wrapping the [`JoinError`](refdata_spawn::JoinError).
pub struct Blocking<F> {
    fetcher: Arc<F>,
    spawner: Spawner,
}

impl<F> Blocking<F> {
    /// Wraps `fetcher`, running its calls through `spawner`.
    #[must_use]
    pub fn new(fetcher: F, spawner: Spawner) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            spawner,
        }
    }
}

impl<F> Clone for Blocking<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            spawner: self.spawner.clone(),
        }
    }
}

impl<F> fmt::Debug for Blocking<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blocking").field("spawner", &self.spawner).finish_non_exhaustive()
    }
}

impl<K, V, F> AsyncBatchFetcher<K, V> for Blocking<F>
where
    K: Send + 'static,
    V: Send + 'static,
    F: BatchFetcher<K, V> + 'static,
{
    fn fetch(&self, keys: HashSet<K>) -> impl Future<Output = Result<HashMap<K, V>, FetchError>> + Send {
        let fetcher = Arc::clone(&self.fetcher);
        let handle = self.spawner.spawn_blocking(move || fetcher.fetch(&keys));
        async move { handle.await.unwrap_or_else(|e| Err(FetchError::new(e))) }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn inline_spawner() -> Spawner {
        Spawner::new_custom(|fut| futures::executor::block_on(fut))
    }

    #[test]
    fn closure_is_a_batch_fetcher() {
        let fetcher = |keys: &HashSet<u32>| -> Result<HashMap<u32, u32>, FetchError> { Ok(keys.iter().map(|k| (*k, k + 1)).collect()) };

        let found = BatchFetcher::fetch(&fetcher, &HashSet::from([1, 2])).unwrap();
        assert_eq!(found, HashMap::from([(1, 2), (2, 3)]));
    }

    #[test]
    fn fetch_fn_forwards_keys() {
        let fetcher = fetch_fn(|keys: HashSet<u32>| async move {
            Ok::<_, FetchError>(keys.into_iter().map(|k| (k, k.to_string())).collect::<HashMap<_, _>>())
        });

        let found = futures::executor::block_on(fetcher.fetch(HashSet::from([7]))).unwrap();
        assert_eq!(found, HashMap::from([(7, "7".to_string())]));
    }

    #[test]
    fn blocking_runs_fetcher_through_spawner() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let fetcher = Blocking::new(
            move |keys: &HashSet<u32>| -> Result<HashMap<u32, u32>, FetchError> {
                counted.fetch_add(1, Ordering::SeqCst);
                Ok(keys.iter().map(|k| (*k, *k)).collect())
            },
            inline_spawner(),
        );

        let found = futures::executor::block_on(fetcher.fetch(HashSet::from([3]))).unwrap();
        assert_eq!(found, HashMap::from([(3, 3)]));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn blocking_propagates_fetch_errors() {
        let fetcher = Blocking::new(
            |_: &HashSet<u32>| -> Result<HashMap<u32, u32>, FetchError> { Err(FetchError::from_message("offline")) },
            inline_spawner(),
        );

        let err = futures::executor::block_on(fetcher.fetch(HashSet::from([3]))).unwrap_err();
        assert_eq!(err.to_string(), "offline");
    }

    #[test]
    fn blocking_reports_dropped_work_as_fetch_error() {
        let fetcher = Blocking::new(
            |_: &HashSet<u32>| -> Result<HashMap<u32, u32>, FetchError> { Ok(HashMap::new()) },
            Spawner::new_custom(|_fut| {}),
        );

        let err = futures::executor::block_on(fetcher.fetch(HashSet::from([3]))).unwrap_err();
        assert_eq!(err.to_string(), refdata_spawn::JoinError::Cancelled.to_string());
    }
}
