// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for cache operations.

/// An error from a cache operation.
///
/// Opaque over whatever the cache implementation failed with; the original error is available
/// through [`source`](std::error::Error::source).
///
/// ```
/// use refdata_tier::Error;
///
/// let error = Error::caused_by("shard 3 timed out");
/// assert_eq!(error.to_string(), "cache operation failed: shard 3 timed out");
/// ```
#[derive(Debug, thiserror::Error)]
#[error("cache operation failed: {source}")]
pub struct Error {
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl Error {
    /// Wraps `cause`, which may be another error or a plain message.
    pub fn caused_by(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self { source: cause.into() }
    }
}

/// A specialized [`Result`] type for cache operations.
pub type Result<T> = std::result::Result<T, Error>;
