// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Configuration of an [`InMemoryCache`].

use std::{fmt, hash::Hash, time::Duration};

use moka::future::{Cache, CacheBuilder};

use crate::tier::InMemoryCache;

/// Configures capacity and expiry of an [`InMemoryCache`].
///
/// Nothing is bounded unless asked for: the default cache keeps every entry until it is
/// invalidated.
///
/// ```
/// use std::time::Duration;
/// use refdata_memory::InMemoryCache;
///
/// let countries = InMemoryCache::<String, String>::builder()
///     .max_capacity(250)
///     .time_to_live(Duration::from_secs(3600))
///     .name("countries")
///     .build();
/// # let _ = countries;
/// ```
pub struct InMemoryCacheBuilder<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    moka: CacheBuilder<K, V, Cache<K, V>>,
}

impl<K, V> InMemoryCacheBuilder<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Starts from an unbounded cache without expiry.
    #[must_use]
    pub fn new() -> Self {
        Self { moka: Cache::builder() }
    }

    /// Caps the number of entries; beyond it moka evicts by `TinyLFU`.
    #[must_use]
    pub fn max_capacity(self, capacity: u64) -> Self {
        Self {
            moka: self.moka.max_capacity(capacity),
        }
    }

    /// Pre-allocates room for `capacity` entries.
    #[must_use]
    pub fn initial_capacity(self, capacity: usize) -> Self {
        Self {
            moka: self.moka.initial_capacity(capacity),
        }
    }

    /// Expires entries this long after they were written.
    ///
    /// An expired entry reads as a miss, so the next lookup resolves it again.
    #[must_use]
    pub fn time_to_live(self, duration: Duration) -> Self {
        Self {
            moka: self.moka.time_to_live(duration),
        }
    }

    /// Expires entries that have been neither read nor written for this long.
    #[must_use]
    pub fn time_to_idle(self, duration: Duration) -> Self {
        Self {
            moka: self.moka.time_to_idle(duration),
        }
    }

    /// Names the cache in moka's own diagnostics.
    #[must_use]
    pub fn name(self, name: &str) -> Self {
        Self { moka: self.moka.name(name) }
    }

    /// Builds the cache.
    #[must_use]
    pub fn build(self) -> InMemoryCache<K, V> {
        InMemoryCache::from_moka(self.moka.build())
    }
}

impl<K, V> Default for InMemoryCacheBuilder<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for InMemoryCacheBuilder<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryCacheBuilder").finish_non_exhaustive()
    }
}
