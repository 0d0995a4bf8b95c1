// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The lookup-by-key-set contract shared by every resolver.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use futures::future::BoxFuture;

use crate::Error;

/// Future returned by [`Resolver::future`].
pub type ResolveFuture<K, V> = BoxFuture<'static, Result<HashMap<K, V>, Error>>;

/// Resolves a set of keys to the values currently known for them.
///
/// Keys the source does not know are absent from the result; absence is never an error. The
/// result never contains keys outside the requested set.
pub trait Resolver<K, V>: Send + Sync {
    /// Starts resolving `keys` without blocking.
    ///
    /// Whatever the resolver can decide up front (coalescing, cache reads) happens before this
    /// returns; the remainder completes when the future is polled. Dropping the future detaches
    /// this caller only.
    fn future(&self, keys: HashSet<K>) -> ResolveFuture<K, V>;

    /// Resolves `keys`, blocking the calling thread until the result is ready.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when a fetch this call depends on fails.
    fn get(&self, keys: HashSet<K>) -> Result<HashMap<K, V>, Error> {
        futures::executor::block_on(self.future(keys))
    }
}

impl<K, V, R> Resolver<K, V> for Arc<R>
where
    R: Resolver<K, V> + ?Sized,
{
    fn future(&self, keys: HashSet<K>) -> ResolveFuture<K, V> {
        (**self).future(keys)
    }

    fn get(&self, keys: HashSet<K>) -> Result<HashMap<K, V>, Error> {
        (**self).get(keys)
    }
}
