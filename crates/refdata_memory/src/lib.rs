// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! In-memory reference-data cache backed by moka.
//!
//! This crate provides [`InMemoryCache`], a concurrent [`CacheTier`](refdata_tier::CacheTier)
//! using moka's `TinyLFU` eviction algorithm. Use [`InMemoryCacheBuilder`] to configure
//! capacity, TTL, and TTI without exposing moka types directly. Expiry and eviction live here,
//! in the cache collaborator; resolvers never impose a policy of their own.
//!
//! # Quick Start
//!
//! ```
//! use refdata_memory::InMemoryCacheBuilder;
//! use refdata_tier::CacheTier;
//! use std::time::Duration;
//!
//! # futures::executor::block_on(async {
//! let cache = InMemoryCacheBuilder::<String, String>::new()
//!     .max_capacity(1000)
//!     .time_to_live(Duration::from_secs(300))
//!     .build();
//!
//! cache.insert(&"A".to_string(), "apple".to_string()).await.unwrap();
//! let value = cache.get(&"A".to_string()).await.unwrap();
//! assert_eq!(value.as_deref(), Some("apple"));
//! # });
//! ```

pub mod builder;
pub mod tier;

#[doc(inline)]
pub use builder::InMemoryCacheBuilder;
#[doc(inline)]
pub use tier::InMemoryCache;
