// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

//! A runtime-agnostic execution facility for reference-data fetches.
//!
//! Resolvers hand every underlying fetch to a [`Spawner`] so the fetch runs independently of
//! the callers waiting on it: a caller that gives up does not stop a fetch other callers still
//! depend on. Blocking fetchers go through [`Spawner::spawn_blocking`] so no async worker is
//! stalled by them.
//!
//! # Quick Start
//!
//! ```rust
//! use refdata_spawn::Spawner;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let spawner = Spawner::new_tokio();
//! let result = spawner.spawn(async { 1 + 1 }).await;
//! assert_eq!(result, Ok(2));
//!
//! let blocking = spawner.spawn_blocking(|| "from the blocking pool").await;
//! assert_eq!(blocking, Ok("from the blocking pool"));
//! # }
//! ```
//!
//! # Features
//!
//! - `tokio`: Enables [`Spawner::new_tokio`] and [`Spawner::with_tokio_handle`]
//! - `custom`: Enables [`Spawner::new_custom`]

#[cfg(feature = "custom")]
mod custom;
mod error;
#[cfg(any(feature = "tokio", feature = "custom"))]
mod handle;
#[cfg(any(feature = "tokio", feature = "custom"))]
mod spawner;

pub use error::JoinError;
#[cfg(any(feature = "tokio", feature = "custom"))]
pub use handle::JoinHandle;
#[cfg(any(feature = "tokio", feature = "custom"))]
pub use spawner::Spawner;
