// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

pub(crate) const RESOLVER_NAME: &str = "refdata.name";

#[cfg(test)]
pub(crate) const RESOLVER_EVENT_NAME: &str = "refdata.event";

pub(crate) const RESOLVER_OPERATION_NAME: &str = "refdata.operation";

pub(crate) const RESOLVER_ACTIVITY_NAME: &str = "refdata.activity";

#[cfg(test)]
pub(crate) const RESOLVER_KEYS_NAME: &str = "refdata.keys";

#[cfg(test)]
pub(crate) const RESOLVER_DURATION_NAME: &str = "refdata.duration_ns";
