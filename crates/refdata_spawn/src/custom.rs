// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::{fmt, pin::Pin, sync::Arc};

use futures_channel::oneshot;

use crate::handle::{JoinHandle, JoinHandleInner};

/// A unit of work handed to a custom spawn function.
pub(crate) type BoxedFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// A user-supplied spawn function. Results travel back over a oneshot channel.
#[derive(Clone)]
pub(crate) struct SpawnHook(Arc<dyn Fn(BoxedFuture) + Send + Sync>);

impl SpawnHook {
    pub(crate) fn new(f: impl Fn(BoxedFuture) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub(crate) fn submit<T: Send + 'static>(&self, work: impl Future<Output = T> + Send + 'static) -> JoinHandle<T> {
        let (tx, rx) = oneshot::channel();
        (self.0)(Box::pin(async move {
            // Nobody may be waiting for the result.
            let _ = tx.send(work.await);
        }));
        JoinHandle(JoinHandleInner::Custom(rx))
    }
}

impl fmt::Debug for SpawnHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SpawnHook")
    }
}
