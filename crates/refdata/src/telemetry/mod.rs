// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Resolver telemetry integration with OpenTelemetry and `tracing`.
//!
//! Every notable resolution step is recorded as a `(resolver name, operation, activity)`
//! triple. Metrics are emitted only when a meter is configured, logs only when logging is
//! enabled; with neither, recording is a few branch checks.

use std::sync::Arc;

use opentelemetry::logs::Severity;
use opentelemetry::metrics::{Counter, Histogram};

pub(crate) mod attributes;
pub(crate) mod metrics;
mod recorder;
#[cfg(test)]
pub(crate) mod testing;

/// Telemetry handle shared by the resolvers of one stack.
///
/// Cloning is cheap; clones record into the same instruments.
#[derive(Clone, Debug)]
pub struct ResolverTelemetry {
    inner: Arc<ResolverTelemetryInner>,
}

#[derive(Debug)]
struct ResolverTelemetryInner {
    logging_enabled: bool,
    event_counter: Option<Counter<u64>>,
    fetch_duration: Option<Histogram<f64>>,
    keys_counter: Option<Counter<u64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResolverOperation {
    Resolve,
    Fetch,
    Cache,
}

impl ResolverOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Resolve => "resolve",
            Self::Fetch => "fetch",
            Self::Cache => "cache",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResolverActivity {
    CacheHit,
    CacheMiss,
    Joined,
    Started,
    Completed,
    Failed,
    Abandoned,
    CacheError,
}

impl ResolverActivity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CacheHit => "cache.hit",
            Self::CacheMiss => "cache.miss",
            Self::Joined => "joined",
            Self::Started => "started",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Abandoned => "abandoned",
            Self::CacheError => "cache.error",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            Self::CacheHit | Self::CacheMiss | Self::Joined => Severity::Debug,
            Self::Started | Self::Completed => Severity::Info,
            Self::Failed | Self::Abandoned | Self::CacheError => Severity::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_as_str() {
        assert_eq!(ResolverOperation::Resolve.as_str(), "resolve");
        assert_eq!(ResolverOperation::Fetch.as_str(), "fetch");
        assert_eq!(ResolverOperation::Cache.as_str(), "cache");
    }

    #[test]
    fn activity_as_str() {
        assert_eq!(ResolverActivity::CacheHit.as_str(), "cache.hit");
        assert_eq!(ResolverActivity::CacheMiss.as_str(), "cache.miss");
        assert_eq!(ResolverActivity::Joined.as_str(), "joined");
        assert_eq!(ResolverActivity::Started.as_str(), "started");
        assert_eq!(ResolverActivity::Completed.as_str(), "completed");
        assert_eq!(ResolverActivity::Failed.as_str(), "failed");
        assert_eq!(ResolverActivity::Abandoned.as_str(), "abandoned");
        assert_eq!(ResolverActivity::CacheError.as_str(), "cache.error");
    }

    #[test]
    fn activity_severity() {
        assert_eq!(ResolverActivity::CacheHit.severity(), Severity::Debug);
        assert_eq!(ResolverActivity::CacheMiss.severity(), Severity::Debug);
        assert_eq!(ResolverActivity::Joined.severity(), Severity::Debug);
        assert_eq!(ResolverActivity::Started.severity(), Severity::Info);
        assert_eq!(ResolverActivity::Completed.severity(), Severity::Info);
        assert_eq!(ResolverActivity::Failed.severity(), Severity::Error);
        assert_eq!(ResolverActivity::Abandoned.severity(), Severity::Error);
        assert_eq!(ResolverActivity::CacheError.severity(), Severity::Error);
    }
}
