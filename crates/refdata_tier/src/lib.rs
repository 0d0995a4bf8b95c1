// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! The cache contract consumed by reference-data resolvers.
//!
//! A caching resolver reads [`CacheTier`] before fetching and writes back whatever the fetch
//! found. Eviction and expiry belong to the tier; the resolver imposes neither. Tiers are shared
//! between concurrent lookups, so every method takes `&self`.
//!
//! Cache failures are reported as [`Error`]. Resolvers treat a failed read as a miss and a
//! failed write as a warning, so a tier never has to hide its own failures.
//!
//! # Implementing a Cache Tier
//!
//! A tier over a read-only snapshot, refusing writes:
//!
//! ```
//! use std::collections::HashMap;
//! use refdata_tier::{CacheTier, Error};
//!
//! struct Snapshot(HashMap<&'static str, &'static str>);
//!
//! impl CacheTier<&'static str, &'static str> for Snapshot {
//!     async fn get(&self, key: &&'static str) -> Result<Option<&'static str>, Error> {
//!         Ok(self.0.get(key).copied())
//!     }
//!
//!     async fn insert(&self, _key: &&'static str, _value: &'static str) -> Result<(), Error> {
//!         Err(Error::caused_by("snapshot is read-only"))
//!     }
//!
//!     async fn invalidate(&self, _key: &&'static str) -> Result<(), Error> {
//!         Err(Error::caused_by("snapshot is read-only"))
//!     }
//!
//!     async fn clear(&self) -> Result<(), Error> {
//!         Err(Error::caused_by("snapshot is read-only"))
//!     }
//!
//!     fn len(&self) -> Option<u64> {
//!         Some(self.0.len() as u64)
//!     }
//! }
//!
//! let snapshot = Snapshot(HashMap::from([("GB", "United Kingdom")]));
//! assert_eq!(snapshot.is_empty(), Some(false));
//! ```
//!
//! # Features
//!
//! - `test-util`: [`testing::MockCache`], a recording tier with failure injection

pub mod error;
#[cfg(any(feature = "test-util", test))]
pub mod testing;
pub(crate) mod tier;

#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use tier::CacheTier;
