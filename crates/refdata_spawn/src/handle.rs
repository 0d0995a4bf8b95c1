// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! [`JoinHandle`] for awaiting spawned task results.

use std::{
    fmt::Debug,
    pin::Pin,
    task::{Context, Poll},
};

#[cfg(feature = "custom")]
use futures_channel::oneshot;

use crate::JoinError;

/// A handle to a spawned task that can be awaited to retrieve its result.
///
/// Dropping the handle detaches the task; it keeps running to completion.
///
/// Awaiting resolves to [`JoinError`] instead of panicking when the task did not finish.
/// Custom executors cannot tell a panic from a dropped task, so both surface as
/// [`JoinError::Cancelled`] there.
pub struct JoinHandle<T>(pub(crate) JoinHandleInner<T>);

pub(crate) enum JoinHandleInner<T> {
    #[cfg(feature = "tokio")]
    Tokio(::tokio::task::JoinHandle<T>),
    #[cfg(feature = "custom")]
    Custom(oneshot::Receiver<T>),
}

impl<T> Future for JoinHandle<T> {
    type Output = Result<T, JoinError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().0 {
            #[cfg(feature = "tokio")]
            JoinHandleInner::Tokio(jh) => Pin::new(jh).poll(cx).map(|res| {
                res.map_err(|e| if e.is_panic() { JoinError::Panicked } else { JoinError::Cancelled })
            }),
            #[cfg(feature = "custom")]
            JoinHandleInner::Custom(rx) => Pin::new(rx).poll(cx).map(|res| res.map_err(|oneshot::Canceled| JoinError::Cancelled)),
        }
    }
}

impl<T> Debug for JoinHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JoinHandle").finish_non_exhaustive()
    }
}
