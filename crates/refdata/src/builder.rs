// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builders wiring a fetcher, spawner, telemetry and cache into a resolver stack.

use std::{fmt, hash::Hash, marker::PhantomData};

use opentelemetry::metrics::{Meter, MeterProvider};
use refdata_spawn::Spawner;
use refdata_tier::CacheTier;

use crate::{
    AsyncBatchFetcher, BatchFetcher, Blocking, CachingResolver, CoalescingResolver,
    coalescing::DEFAULT_NAME,
    telemetry::{ResolverTelemetry, metrics::create_meter},
};

/// Placeholder for a builder that has no fetcher yet.
///
/// A [`ResolverBuilder`] holding this type offers no `build()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFetcher;

/// Builder for a [`CoalescingResolver`], optionally fronted by a cache.
///
/// # Examples
///
/// ```
/// use std::collections::{HashMap, HashSet};
/// use refdata::{FetchError, Resolver, ResolverBuilder};
/// use refdata_spawn::Spawner;
///
/// # #[tokio::main(flavor = "multi_thread")]
/// # async fn main() {
/// let resolver = ResolverBuilder::new(Spawner::new_tokio())
///     .blocking_fetcher(|keys: &HashSet<u32>| -> Result<HashMap<u32, String>, FetchError> {
///         Ok(keys.iter().map(|k| (*k, format!("item-{k}"))).collect())
///     })
///     .name("items")
///     .enable_logs()
///     .memory()
///     .build();
///
/// let found = resolver.future(HashSet::from([1, 2])).await.unwrap();
/// assert_eq!(found[&2], "item-2");
/// # }
/// ```
pub struct ResolverBuilder<K, V, F = NoFetcher> {
    fetcher: F,
    spawner: Spawner,
    name: &'static str,
    logs_enabled: bool,
    meter: Option<Meter>,
    _types: PhantomData<fn(K) -> V>,
}

impl<K, V> ResolverBuilder<K, V, NoFetcher> {
    /// Starts a builder whose fetches run on `spawner`.
    #[must_use]
    pub fn new(spawner: Spawner) -> Self {
        Self {
            fetcher: NoFetcher,
            spawner,
            name: DEFAULT_NAME,
            logs_enabled: false,
            meter: None,
            _types: PhantomData,
        }
    }
}

impl<K, V, F> ResolverBuilder<K, V, F> {
    /// Uses an asynchronous fetcher.
    #[must_use]
    pub fn fetcher<G>(self, fetcher: G) -> ResolverBuilder<K, V, G>
    where
        G: AsyncBatchFetcher<K, V>,
    {
        ResolverBuilder {
            fetcher,
            spawner: self.spawner,
            name: self.name,
            logs_enabled: self.logs_enabled,
            meter: self.meter,
            _types: PhantomData,
        }
    }

    /// Uses a blocking fetcher, dispatched onto the spawner's blocking facility.
    #[must_use]
    pub fn blocking_fetcher<B>(self, fetcher: B) -> ResolverBuilder<K, V, Blocking<B>>
    where
        B: BatchFetcher<K, V>,
    {
        let blocking = Blocking::new(fetcher, self.spawner.clone());
        ResolverBuilder {
            fetcher: blocking,
            spawner: self.spawner,
            name: self.name,
            logs_enabled: self.logs_enabled,
            meter: self.meter,
            _types: PhantomData,
        }
    }

    /// Sets the name reported in logs and metrics.
    #[must_use]
    pub fn name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Emits a `tracing` event for every recorded activity.
    #[must_use]
    pub fn enable_logs(mut self) -> Self {
        self.logs_enabled = true;
        self
    }

    /// Records metrics through a meter obtained from `provider`.
    #[must_use]
    pub fn metrics(mut self, provider: &dyn MeterProvider) -> Self {
        self.meter = Some(create_meter(provider));
        self
    }

    /// Fronts the resolver with `cache`.
    #[must_use]
    pub fn cache<C>(self, cache: C) -> CachedResolverBuilder<K, V, F, C>
    where
        C: CacheTier<K, V>,
    {
        CachedResolverBuilder { base: self, cache }
    }

    /// Fronts the resolver with an unbounded [`InMemoryCache`](refdata_memory::InMemoryCache).
    #[cfg(feature = "memory")]
    #[cfg_attr(docsrs, doc(cfg(feature = "memory")))]
    #[must_use]
    pub fn memory(self) -> CachedResolverBuilder<K, V, F, refdata_memory::InMemoryCache<K, V>>
    where
        K: Clone + Eq + Hash + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        self.cache(refdata_memory::InMemoryCache::new())
    }

    fn telemetry(&self) -> ResolverTelemetry {
        ResolverTelemetry::new(self.logs_enabled, self.meter.as_ref())
    }
}

impl<K, V, F> ResolverBuilder<K, V, F>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    F: AsyncBatchFetcher<K, V> + 'static,
{
    /// Builds the coalescing resolver.
    #[must_use]
    pub fn build(self) -> CoalescingResolver<K, V, F> {
        let telemetry = self.telemetry();
        CoalescingResolver::with_telemetry(self.fetcher, self.spawner, telemetry, self.name)
    }
}

impl<K, V, F: fmt::Debug> fmt::Debug for ResolverBuilder<K, V, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverBuilder")
            .field("fetcher", &self.fetcher)
            .field("spawner", &self.spawner)
            .field("name", &self.name)
            .field("logs_enabled", &self.logs_enabled)
            .field("metrics_enabled", &self.meter.is_some())
            .finish()
    }
}

/// Builder for a [`CachingResolver`] in front of a [`CoalescingResolver`].
///
/// Created by [`ResolverBuilder::cache`] or [`ResolverBuilder::memory`].
pub struct CachedResolverBuilder<K, V, F, C> {
    base: ResolverBuilder<K, V, F>,
    cache: C,
}

impl<K, V, F, C> CachedResolverBuilder<K, V, F, C>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    F: AsyncBatchFetcher<K, V> + 'static,
    C: CacheTier<K, V> + 'static,
{
    /// Builds the caching resolver and the coalescing resolver behind it.
    ///
    /// Both layers share one telemetry handle and report under the same name.
    #[must_use]
    pub fn build(self) -> CachingResolver<K, V, CoalescingResolver<K, V, F>, C> {
        let telemetry = self.base.telemetry();
        let name = self.base.name;
        let coalescing = CoalescingResolver::with_telemetry(self.base.fetcher, self.base.spawner, telemetry.clone(), name);
        CachingResolver::with_telemetry(coalescing, self.cache, telemetry, name)
    }
}

impl<K, V, F: fmt::Debug, C: fmt::Debug> fmt::Debug for CachedResolverBuilder<K, V, F, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedResolverBuilder")
            .field("base", &self.base)
            .field("cache", &self.cache)
            .finish()
    }
}
