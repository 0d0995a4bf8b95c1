// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! A recording cache for tests of code that sits in front of a [`CacheTier`].

use std::{collections::HashMap, fmt, hash::Hash, sync::Arc};

use parking_lot::Mutex;

use crate::{CacheTier, Error};

/// One call made against a [`MockCache`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheOp<K, V> {
    /// `get(key)`.
    Get(K),
    /// `insert(key, value)`.
    Insert {
        /// The inserted key.
        key: K,
        /// The inserted value.
        value: V,
    },
    /// `invalidate(key)`.
    Invalidate(K),
    /// `clear()`.
    Clear,
}

impl<K, V> CacheOp<K, V> {
    fn label(&self) -> &'static str {
        match self {
            Self::Get(_) => "get",
            Self::Insert { .. } => "insert",
            Self::Invalidate(_) => "invalidate",
            Self::Clear => "clear",
        }
    }
}

type FailPredicate<K, V> = Box<dyn Fn(&CacheOp<K, V>) -> bool + Send + Sync>;

struct State<K, V> {
    entries: HashMap<K, V>,
    log: Vec<CacheOp<K, V>>,
    fail: Option<FailPredicate<K, V>>,
}

impl<K, V> State<K, V> {
    /// Logs `op` and reports whether it was told to fail.
    fn admit(&mut self, op: CacheOp<K, V>) -> Result<(), Error> {
        let refused = self.fail.as_ref().is_some_and(|fail| fail(&op));
        let label = op.label();
        self.log.push(op);
        if refused {
            Err(Error::caused_by(format!("mock cache refused {label}")))
        } else {
            Ok(())
        }
    }
}

/// An in-memory [`CacheTier`] that logs every call and fails the calls you tell it to.
///
/// Clones share entries, log and failure rule. Failed calls are logged too and leave the entries
/// untouched.
///
/// ```
/// use refdata_tier::{CacheTier, testing::{CacheOp, MockCache}};
///
/// # futures::executor::block_on(async {
/// let cache = MockCache::<&str, u32>::new();
/// cache.fail_when(|op| matches!(op, CacheOp::Get(key) if *key == "broken"));
///
/// cache.insert(&"fine", 1).await.unwrap();
/// assert_eq!(cache.get(&"fine").await.unwrap(), Some(1));
/// assert!(cache.get(&"broken").await.is_err());
/// assert_eq!(cache.inserts(), vec![("fine", 1)]);
/// # });
/// ```
pub struct MockCache<K, V> {
    state: Arc<Mutex<State<K, V>>>,
}

impl<K, V> MockCache<K, V> {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::with_data(HashMap::new())
    }

    /// Creates a cache holding `entries`.
    #[must_use]
    pub fn with_data(entries: HashMap<K, V>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                entries,
                log: Vec::new(),
                fail: None,
            })),
        }
    }

    /// Number of entries currently stored.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Makes every call matching `predicate` fail from now on, replacing any earlier rule.
    pub fn fail_when<F>(&self, predicate: F)
    where
        F: Fn(&CacheOp<K, V>) -> bool + Send + Sync + 'static,
    {
        self.state.lock().fail = Some(Box::new(predicate));
    }

    /// Lets every call succeed again.
    pub fn clear_failures(&self) {
        self.state.lock().fail = None;
    }

    /// Forgets the logged calls.
    pub fn clear_operations(&self) {
        self.state.lock().log.clear();
    }
}

impl<K: Eq + Hash, V> MockCache<K, V> {
    /// Whether `key` is currently stored.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.state.lock().entries.contains_key(key)
    }
}

impl<K: Clone, V: Clone> MockCache<K, V> {
    /// Every logged call, oldest first.
    #[must_use]
    pub fn operations(&self) -> Vec<CacheOp<K, V>> {
        self.state.lock().log.clone()
    }

    /// The logged inserts as `(key, value)` pairs, oldest first, failed ones included.
    #[must_use]
    pub fn inserts(&self) -> Vec<(K, V)> {
        self.state
            .lock()
            .log
            .iter()
            .filter_map(|op| match op {
                CacheOp::Insert { key, value } => Some((key.clone(), value.clone())),
                _ => None,
            })
            .collect()
    }
}

impl<K, V> CacheTier<K, V> for MockCache<K, V>
where
    K: Clone + Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    async fn get(&self, key: &K) -> Result<Option<V>, Error> {
        let mut state = self.state.lock();
        state.admit(CacheOp::Get(key.clone()))?;
        Ok(state.entries.get(key).cloned())
    }

    async fn insert(&self, key: &K, value: V) -> Result<(), Error> {
        let mut state = self.state.lock();
        state.admit(CacheOp::Insert {
            key: key.clone(),
            value: value.clone(),
        })?;
        state.entries.insert(key.clone(), value);
        Ok(())
    }

    async fn invalidate(&self, key: &K) -> Result<(), Error> {
        let mut state = self.state.lock();
        state.admit(CacheOp::Invalidate(key.clone()))?;
        state.entries.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), Error> {
        let mut state = self.state.lock();
        state.admit(CacheOp::Clear)?;
        state.entries.clear();
        Ok(())
    }

    fn len(&self) -> Option<u64> {
        Some(self.entry_count() as u64)
    }
}

impl<K, V> Clone for MockCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<K, V> Default for MockCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for MockCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MockCache")
            .field("entries", &state.entries)
            .field("logged", &state.log.len())
            .field("failing", &state.fail.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn logs_calls_in_order() {
        let cache = MockCache::<&str, i32>::new();
        cache.insert(&"a", 1).await.unwrap();
        cache.get(&"a").await.unwrap();
        cache.invalidate(&"a").await.unwrap();
        cache.clear().await.unwrap();

        assert_eq!(
            cache.operations(),
            vec![
                CacheOp::Insert { key: "a", value: 1 },
                CacheOp::Get("a"),
                CacheOp::Invalidate("a"),
                CacheOp::Clear,
            ]
        );
    }

    #[tokio::test]
    async fn refused_calls_are_logged_and_change_nothing() {
        let cache = MockCache::<&str, i32>::new();
        cache.fail_when(|op| matches!(op, CacheOp::Insert { .. }));

        let error = cache.insert(&"a", 1).await.unwrap_err();
        assert!(error.to_string().contains("insert"));
        assert_eq!(cache.entry_count(), 0);
        assert_eq!(cache.inserts(), vec![("a", 1)]);

        cache.clear_failures();
        cache.insert(&"a", 1).await.unwrap();
        assert!(cache.contains_key(&"a"));
    }

    #[tokio::test]
    async fn clones_share_state() {
        let cache = MockCache::with_data(HashMap::from([("k", 7)]));
        let clone = cache.clone();

        assert_eq!(clone.get(&"k").await.unwrap(), Some(7));
        assert_eq!(cache.operations().len(), 1);

        cache.clear_operations();
        assert!(clone.operations().is_empty());
        assert_eq!(cache.len(), Some(1));
        assert!(format!("{cache:?}").contains("logged: 0"));
    }
}
