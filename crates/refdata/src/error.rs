// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for reference-data resolution.

use std::{fmt, sync::Arc};

/// Result alias for resolution outcomes.
pub type Result<T> = std::result::Result<T, Error>;

/// A fault raised by a batch fetcher.
///
/// The underlying error is shared, so one failed fetch can be handed to the caller that started
/// it and to every caller that joined it without copying or re-wrapping.
#[derive(Clone)]
pub struct FetchError {
    source: Arc<dyn std::error::Error + Send + Sync>,
}

impl FetchError {
    /// Wraps an arbitrary error raised while fetching.
    #[must_use]
    pub fn new(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self { source: Arc::new(source) }
    }

    /// Creates a fetch error carrying only a message.
    #[must_use]
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            source: Arc::new(Message(message.into())),
        }
    }

    /// Returns `true` if both values share the same underlying error.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.source, &other.source)
    }
}

impl fmt::Debug for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.source, f)
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.source, f)
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.source)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct Message(String);

/// Failure observed by a resolver caller.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The batch fetcher reported a fault.
    ///
    /// Every caller that depended on the failed fetch receives the same [`FetchError`].
    #[error("reference data fetch failed: {0}")]
    Fetch(#[source] FetchError),

    /// The fetch task ended without producing a result.
    ///
    /// This happens when the fetcher panics or the executor drops the task.
    #[error("reference data fetch was abandoned before completing")]
    Abandoned,

    /// The resolver is switched off.
    #[error("reference data resolver is unavailable")]
    Unavailable,
}

impl Error {
    /// Returns the fetch fault, if this failure came from the fetcher.
    #[must_use]
    pub fn as_fetch(&self) -> Option<&FetchError> {
        match self {
            Self::Fetch(e) => Some(e),
            Self::Abandoned | Self::Unavailable => None,
        }
    }
}

impl From<FetchError> for Error {
    fn from(value: FetchError) -> Self {
        Self::Fetch(value)
    }
}
