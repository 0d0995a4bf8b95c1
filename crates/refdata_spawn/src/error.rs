// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// Reason a spawned task did not produce a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum JoinError {
    /// The task panicked.
    #[error("spawned task panicked")]
    Panicked,
    /// The task was dropped by its executor before completing.
    #[error("spawned task was dropped before completing")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_reason() {
        assert_eq!(JoinError::Panicked.to_string(), "spawned task panicked");
        assert_eq!(JoinError::Cancelled.to_string(), "spawned task was dropped before completing");
    }
}
