// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use opentelemetry::{
    InstrumentationScope,
    metrics::{Counter, Histogram, Meter, MeterProvider},
};

const METER_NAME: &str = "refdata";
const VERSION: &str = "v0.1.0";
const SCHEMA_URL: &str = "https://opentelemetry.io/schemas/1.47.0";
const EVENT_COUNT_NAME: &str = "refdata.event.count";
const FETCH_DURATION_NAME: &str = "refdata.fetch.duration";
const KEYS_COUNT_NAME: &str = "refdata.keys.count";

pub(crate) fn create_meter(meter_provider: &dyn MeterProvider) -> Meter {
    meter_provider.meter_with_scope(
        InstrumentationScope::builder(METER_NAME)
            .with_version(VERSION)
            .with_schema_url(SCHEMA_URL)
            .build(),
    )
}

pub(crate) fn create_event_counter(meter: &Meter) -> Counter<u64> {
    meter
        .u64_counter(EVENT_COUNT_NAME)
        .with_description("Reference data resolution events")
        .with_unit("{event}")
        .build()
}

pub(crate) fn create_fetch_duration_histogram(meter: &Meter) -> Histogram<f64> {
    meter
        .f64_histogram(FETCH_DURATION_NAME)
        .with_description("Duration of underlying batch fetches")
        .with_unit("s")
        .build()
}

pub(crate) fn create_keys_counter(meter: &Meter) -> Counter<u64> {
    meter
        .u64_counter(KEYS_COUNT_NAME)
        .with_description("Keys involved in reference data resolution events")
        .with_unit("{key}")
        .build()
}
