// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Cache-aside resolution in front of another resolver.

use std::{
    collections::{HashMap, HashSet},
    fmt,
    hash::Hash,
    marker::PhantomData,
    sync::Arc,
};

use futures::{FutureExt, future};
use refdata_tier::CacheTier;

use crate::{
    ResolveFuture, Resolver,
    coalescing::DEFAULT_NAME,
    telemetry::{ResolverActivity, ResolverOperation, ResolverTelemetry},
};

/// A [`Resolver`] that serves keys from a cache and resolves only the misses.
///
/// Values the underlying resolver finds are written back to the cache; keys it does not find
/// stay uncached, so a later lookup asks again. Only the requested misses are ever written.
///
/// Cache failures never fail a lookup: a failed read counts as a miss and a failed write is
/// logged while the value is still returned.
///
/// Cloning is cheap; clones share the cache and the underlying resolver.
///
/// # Examples
///
/// ```
/// use std::collections::{HashMap, HashSet};
/// use refdata::{CachingResolver, CoalescingResolver, FetchError, InMemoryCache, Resolver, fetch_fn};
/// use refdata_spawn::Spawner;
///
/// # #[tokio::main(flavor = "multi_thread")]
/// # async fn main() {
/// let fetcher = fetch_fn(|keys: HashSet<String>| async move {
///     Ok::<_, FetchError>(keys.into_iter().map(|k| (k.clone(), k.to_uppercase())).collect::<HashMap<_, _>>())
/// });
/// let resolver = CachingResolver::new(CoalescingResolver::new(fetcher, Spawner::new_tokio()), InMemoryCache::new());
///
/// let found = resolver.future(HashSet::from(["eur".to_string()])).await.unwrap();
/// assert_eq!(found["eur"], "EUR");
/// # }
/// ```
pub struct CachingResolver<K, V, R, C> {
    shared: Arc<Shared<R, C>>,
    _types: PhantomData<fn(K) -> V>,
}

struct Shared<R, C> {
    resolver: R,
    cache: C,
    telemetry: ResolverTelemetry,
    name: &'static str,
}

impl<K, V, R, C> CachingResolver<K, V, R, C>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    R: Resolver<K, V> + 'static,
    C: CacheTier<K, V> + 'static,
{
    /// Puts `cache` in front of `resolver`.
    #[must_use]
    pub fn new(resolver: R, cache: C) -> Self {
        Self::with_telemetry(resolver, cache, ResolverTelemetry::disabled(), DEFAULT_NAME)
    }

    pub(crate) fn with_telemetry(resolver: R, cache: C, telemetry: ResolverTelemetry, name: &'static str) -> Self {
        Self {
            shared: Arc::new(Shared {
                resolver,
                cache,
                telemetry,
                name,
            }),
            _types: PhantomData,
        }
    }

    /// Returns the cache consulted before resolving.
    #[must_use]
    pub fn cache(&self) -> &C {
        &self.shared.cache
    }

    /// Returns the resolver that handles cache misses.
    #[must_use]
    pub fn inner(&self) -> &R {
        &self.shared.resolver
    }

    /// Drops `key` from the cache so the next lookup resolves it again.
    ///
    /// # Errors
    ///
    /// Returns the cache's error if the removal fails.
    pub async fn invalidate(&self, key: &K) -> refdata_tier::Result<()> {
        self.shared.cache.invalidate(key).await
    }
}

impl<R, C> Shared<R, C> {
    /// Files one cache read into hits or misses. A failed read is a miss.
    fn classify<K, V>(&self, key: K, read: refdata_tier::Result<Option<V>>, cached: &mut HashMap<K, V>, uncached: &mut HashSet<K>)
    where
        K: Eq + Hash,
    {
        match read {
            Ok(Some(value)) => {
                cached.insert(key, value);
            }
            Ok(None) => {
                uncached.insert(key);
            }
            Err(e) => {
                tracing::warn!(refdata.name = self.name, error = %e, "cache read failed, treating as a miss");
                self.telemetry
                    .record(self.name, ResolverOperation::Cache, ResolverActivity::CacheError, 1, None);
                uncached.insert(key);
            }
        }
    }

    fn record_reads(&self, hits: usize, misses: usize) {
        if hits > 0 {
            self.telemetry
                .record(self.name, ResolverOperation::Cache, ResolverActivity::CacheHit, hits, None);
        }
        if misses > 0 {
            self.telemetry
                .record(self.name, ResolverOperation::Cache, ResolverActivity::CacheMiss, misses, None);
        }
    }
}

/// Resolves the misses through the underlying resolver, writes found values back, and merges
/// them with the hits.
fn resolve_misses<K, V, R, C>(shared: &Arc<Shared<R, C>>, mut cached: HashMap<K, V>, uncached: HashSet<K>) -> ResolveFuture<K, V>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    R: Resolver<K, V> + 'static,
    C: CacheTier<K, V> + 'static,
{
    shared.record_reads(cached.len(), uncached.len());

    if uncached.is_empty() {
        return future::ready(Ok(cached)).boxed();
    }

    let pending = shared.resolver.future(uncached.clone());
    let shared = Arc::clone(shared);
    async move {
        let resolved = pending.await?;
        for (key, value) in resolved {
            if !uncached.contains(&key) {
                continue;
            }
            if let Err(e) = shared.cache.insert(&key, value.clone()).await {
                tracing::warn!(refdata.name = shared.name, error = %e, "cache write failed, value still returned");
                shared
                    .telemetry
                    .record(shared.name, ResolverOperation::Cache, ResolverActivity::CacheError, 1, None);
            }
            cached.insert(key, value);
        }
        Ok(cached)
    }
    .boxed()
}

impl<K, V, R, C> Resolver<K, V> for CachingResolver<K, V, R, C>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    R: Resolver<K, V> + 'static,
    C: CacheTier<K, V> + 'static,
{
    fn future(&self, keys: HashSet<K>) -> ResolveFuture<K, V> {
        if keys.is_empty() {
            return future::ready(Ok(HashMap::new())).boxed();
        }

        let shared = &self.shared;
        let mut cached = HashMap::with_capacity(keys.len());
        let mut uncached = HashSet::new();
        let mut suspended = Vec::new();

        for key in keys {
            match shared.cache.get(&key).now_or_never() {
                Some(read) => shared.classify(key, read, &mut cached, &mut uncached),
                None => suspended.push(key),
            }
        }

        if suspended.is_empty() {
            return resolve_misses(shared, cached, uncached);
        }

        // The cache suspended on some reads; finish them before resolving the misses.
        let shared = Arc::clone(shared);
        async move {
            for key in suspended {
                let read = shared.cache.get(&key).await;
                shared.classify(key, read, &mut cached, &mut uncached);
            }
            resolve_misses(&shared, cached, uncached).await
        }
        .boxed()
    }
}

impl<K, V, R, C> Clone for CachingResolver<K, V, R, C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            _types: PhantomData,
        }
    }
}

impl<K, V, R: fmt::Debug, C: fmt::Debug> fmt::Debug for CachingResolver<K, V, R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachingResolver")
            .field("name", &self.shared.name)
            .field("resolver", &self.shared.resolver)
            .field("cache", &self.shared.cache)
            .finish()
    }
}
