// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Coalescing, cache-aside batch resolution of key-addressed reference data.
//!
//! Reference data (currencies, countries, product codes, ...) is looked up by key sets rather
//! than single keys. This crate puts two layers between callers and the batch source:
//!
//! - [`CoalescingResolver`] guarantees that concurrent callers asking for overlapping keys never
//!   have more than one fetch outstanding per key. Each caller joins the fetches already covering
//!   some of its keys and starts at most one new fetch for the rest.
//! - [`CachingResolver`] serves keys from a [`CacheTier`] and only resolves the misses, writing
//!   back whatever was found. Keys the source does not know are never cached.
//!
//! Both implement [`Resolver`], with a non-blocking [`future`](Resolver::future) and a blocking
//! [`get`](Resolver::get).
//!
//! # Quick Start
//!
//! ```
//! use std::collections::{HashMap, HashSet};
//! use refdata::{FetchError, Resolver, ResolverBuilder, fetch_fn};
//! use refdata_spawn::Spawner;
//!
//! # #[tokio::main(flavor = "multi_thread")]
//! # async fn main() {
//! let resolver = ResolverBuilder::new(Spawner::new_tokio())
//!     .fetcher(fetch_fn(|codes: HashSet<String>| async move {
//!         let known = HashMap::from([("GBP".to_string(), "Pound sterling".to_string())]);
//!         Ok::<_, FetchError>(codes.into_iter().filter_map(|c| known.get(&c).map(|n| (c, n.clone()))).collect::<HashMap<_, _>>())
//!     }))
//!     .name("currencies")
//!     .memory()
//!     .build();
//!
//! let found = resolver.future(HashSet::from(["GBP".to_string(), "XXX".to_string()])).await.unwrap();
//! assert_eq!(found.len(), 1);
//! assert_eq!(found["GBP"], "Pound sterling");
//! # }
//! ```
//!
//! # Fetch Lifecycle
//!
//! A fetch runs on the configured [`Spawner`](refdata_spawn::Spawner), detached from the callers
//! waiting on it. Dropping a [`ResolveFuture`] (for example after a timeout) detaches only that
//! caller; the fetch completes, every other waiter receives its result, and its keys are released
//! so the next lookup starts afresh. A failed fetch is reported to every waiter as the same
//! [`Error::Fetch`] and is never cached.
//!
//! # Features
//!
//! - `memory` (default): re-exports [`InMemoryCache`] and enables [`ResolverBuilder::memory`]
//! - `test-util`: exposes [`testing::MockCache`](refdata_tier::testing::MockCache) for cache interaction tests

pub mod builder;
mod caching;
mod coalescing;
mod error;
mod fetch;
mod resolver;
mod telemetry;
mod toggle;

#[doc(inline)]
pub use builder::{CachedResolverBuilder, NoFetcher, ResolverBuilder};
pub use caching::CachingResolver;
pub use coalescing::CoalescingResolver;
pub use error::{Error, FetchError, Result};
pub use fetch::{AsyncBatchFetcher, BatchFetcher, Blocking, FetchFn, fetch_fn};
#[cfg(feature = "memory")]
#[doc(inline)]
pub use refdata_memory::{InMemoryCache, InMemoryCacheBuilder};
#[doc(inline)]
pub use refdata_tier::CacheTier;
pub use resolver::{ResolveFuture, Resolver};
#[cfg(feature = "test-util")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-util")))]
pub use refdata_tier::testing;
pub use telemetry::ResolverTelemetry;
pub use toggle::Toggle;
