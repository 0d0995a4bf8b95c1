// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The moka-backed [`CacheTier`].

use std::hash::Hash;

use moka::future::Cache;
use refdata_tier::{CacheTier, Error};

use crate::builder::InMemoryCacheBuilder;

/// A concurrent in-memory [`CacheTier`] backed by [`moka`].
///
/// None of its operations fail. Clones share storage.
///
/// ```
/// use refdata_memory::InMemoryCache;
/// use refdata_tier::CacheTier;
///
/// # futures::executor::block_on(async {
/// let currencies = InMemoryCache::<&str, &str>::new();
/// currencies.insert(&"GBP", "Pound sterling").await.unwrap();
/// assert_eq!(currencies.get(&"GBP").await.unwrap(), Some("Pound sterling"));
/// assert_eq!(currencies.get(&"XXX").await.unwrap(), None);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    entries: Cache<K, V>,
}

impl<K, V> InMemoryCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// An unbounded cache without expiry.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// A cache holding at most `max_capacity` entries.
    #[must_use]
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self::builder().max_capacity(max_capacity).build()
    }

    /// Starts configuring a cache.
    #[must_use]
    pub fn builder() -> InMemoryCacheBuilder<K, V> {
        InMemoryCacheBuilder::new()
    }

    pub(crate) fn from_moka(entries: Cache<K, V>) -> Self {
        Self { entries }
    }

    /// Runs moka's deferred housekeeping: evictions, expirations and the entry count.
    ///
    /// [`len`](CacheTier::len) lags behind writes until this has run.
    pub async fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks().await;
    }
}

impl<K, V> Default for InMemoryCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> CacheTier<K, V> for InMemoryCache<K, V>
where
    K: Clone + Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Result<Option<V>, Error> {
        Ok(self.entries.get(key).await)
    }

    async fn insert(&self, key: &K, value: V) -> Result<(), Error> {
        self.entries.insert(key.clone(), value).await;
        Ok(())
    }

    async fn invalidate(&self, key: &K) -> Result<(), Error> {
        self.entries.invalidate(key).await;
        Ok(())
    }

    async fn clear(&self) -> Result<(), Error> {
        self.entries.invalidate_all();
        Ok(())
    }

    fn len(&self) -> Option<u64> {
        Some(self.entries.entry_count())
    }
}
