// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Resolver telemetry construction and recording.

use std::{sync::Arc, time::Duration};

use opentelemetry::{KeyValue, logs::Severity, metrics::Meter};

use super::{
    ResolverActivity, ResolverOperation, ResolverTelemetry, ResolverTelemetryInner, attributes,
    metrics::{create_event_counter, create_fetch_duration_histogram, create_keys_counter},
};

impl ResolverTelemetry {
    /// Creates a telemetry handle.
    ///
    /// # Arguments
    ///
    /// * `logging_enabled` - Whether to emit a `tracing` event per recorded activity
    /// * `meter` - Meter to create instruments on; `None` disables metrics
    #[must_use]
    pub fn new(logging_enabled: bool, meter: Option<&Meter>) -> Self {
        Self {
            inner: Arc::new(ResolverTelemetryInner {
                logging_enabled,
                event_counter: meter.map(create_event_counter),
                fetch_duration: meter.map(create_fetch_duration_histogram),
                keys_counter: meter.map(create_keys_counter),
            }),
        }
    }

    /// Creates a telemetry handle that records nothing.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(false, None)
    }

    /// Records one resolution activity.
    ///
    /// `duration` is only provided for completed fetches and feeds the fetch duration histogram.
    pub(crate) fn record(
        &self,
        name: &'static str,
        operation: ResolverOperation,
        activity: ResolverActivity,
        keys: usize,
        duration: Option<Duration>,
    ) {
        let attrs = [
            KeyValue::new(attributes::RESOLVER_NAME, name),
            KeyValue::new(attributes::RESOLVER_OPERATION_NAME, operation.as_str()),
            KeyValue::new(attributes::RESOLVER_ACTIVITY_NAME, activity.as_str()),
        ];

        if let Some(c) = &self.inner.event_counter {
            c.add(1, &attrs);
        }

        if let Some(c) = &self.inner.keys_counter {
            c.add(u64::try_from(keys).unwrap_or(u64::MAX), &attrs);
        }

        if let (Some(d), Some(h)) = (duration, &self.inner.fetch_duration) {
            h.record(d.as_secs_f64(), &attrs);
        }

        if self.inner.logging_enabled {
            Self::emit(name, operation, activity, keys, duration);
        }
    }

    fn emit(name: &'static str, operation: ResolverOperation, activity: ResolverActivity, keys: usize, duration: Option<Duration>) {
        let op = operation.as_str();
        let ac = activity.as_str();
        let duration_ns = duration.map(|d| d.as_nanos());

        // Tracing levels must be constant. Field names mirror the constants in attributes.rs.
        macro_rules! emit_event {
            ($level:ident) => {
                tracing::$level!(
                    refdata.name = name,
                    refdata.operation = op,
                    refdata.activity = ac,
                    refdata.keys = keys,
                    refdata.duration_ns = ?duration_ns,
                    "refdata.event"
                )
            };
        }

        match activity.severity() {
            Severity::Error => emit_event!(error),
            Severity::Info => emit_event!(info),
            Severity::Debug => emit_event!(debug),
            _ => {}
        }
    }
}

impl Default for ResolverTelemetry {
    fn default() -> Self {
        Self::disabled()
    }
}
