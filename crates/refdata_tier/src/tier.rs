// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The core trait for cache collaborators.

use crate::Error;

/// Trait for cache implementations used by a caching resolver.
///
/// Only `get` and `insert` are exercised on the resolution path. `invalidate` and `clear` let
/// owners of the cache drop stale reference data. `len` and `is_empty` have defaults:
/// - `len`: Returns `None` (not all caches track size)
/// - `is_empty`: Delegates to `len`
///
/// Absence of a key is never recorded: a resolver only ever inserts values a fetch actually
/// produced.
pub trait CacheTier<K, V>: Send + Sync {
    /// Looks up a value, returning an error if the operation fails.
    fn get(&self, key: &K) -> impl Future<Output = Result<Option<V>, Error>> + Send;

    /// Stores a value, returning an error if the operation fails.
    fn insert(&self, key: &K, value: V) -> impl Future<Output = Result<(), Error>> + Send;

    /// Removes a value, returning an error if the operation fails.
    fn invalidate(&self, key: &K) -> impl Future<Output = Result<(), Error>> + Send;

    /// Removes all values, returning an error if the operation fails.
    fn clear(&self) -> impl Future<Output = Result<(), Error>> + Send;

    /// Returns the number of entries, if supported.
    ///
    /// Returns `None` for implementations that don't track size.
    fn len(&self) -> Option<u64> {
        None
    }

    /// Returns `true` if the cache contains no entries.
    ///
    /// Returns `None` for implementations that don't track size.
    fn is_empty(&self) -> Option<bool> {
        self.len().map(|len| len == 0)
    }
}
