// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! [`Spawner`] for plugging in runtime implementations.

use crate::handle::JoinHandle;
#[cfg(feature = "tokio")]
use crate::handle::JoinHandleInner;

#[cfg(feature = "custom")]
use crate::custom::{BoxedFuture, SpawnHook};

/// Runtime-agnostic task spawner.
///
/// `Spawner` abstracts task spawning across different async runtimes. Use the
/// built-in constructors for Tokio, or [`Spawner::new_custom`] for anything else.
///
/// # Examples
///
/// ```rust
/// use refdata_spawn::Spawner;
///
/// # #[tokio::main]
/// # async fn main() {
/// let spawner = Spawner::new_tokio();
/// let value = spawner.spawn(async { 1 + 1 }).await;
/// assert_eq!(value, Ok(2));
/// # }
/// ```
///
/// ## Custom Runtime
///
/// ```rust
/// use refdata_spawn::Spawner;
///
/// let spawner = Spawner::new_custom(|fut| {
///     std::thread::spawn(move || futures::executor::block_on(fut));
/// });
///
/// let value = futures::executor::block_on(spawner.spawn(async { "done" }));
/// assert_eq!(value, Ok("done"));
/// ```
#[derive(Debug, Clone)]
pub struct Spawner(SpawnerKind);

#[derive(Debug, Clone)]
enum SpawnerKind {
    #[cfg(feature = "tokio")]
    Tokio,
    #[cfg(feature = "tokio")]
    TokioHandle(::tokio::runtime::Handle),
    #[cfg(feature = "custom")]
    Custom(SpawnHook),
}

impl Spawner {
    /// Creates a spawner that uses the ambient Tokio runtime.
    ///
    /// The runtime is looked up each time work is spawned, so [`Spawner::spawn`] panics
    /// when called outside of a Tokio runtime context. Use [`Spawner::with_tokio_handle`]
    /// when work is submitted from plain threads.
    #[must_use]
    #[cfg(feature = "tokio")]
    #[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
    pub fn new_tokio() -> Self {
        Self(SpawnerKind::Tokio)
    }

    /// Creates a spawner bound to a specific Tokio runtime.
    ///
    /// Work can be spawned from any thread, inside or outside that runtime.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use refdata_spawn::Spawner;
    ///
    /// let runtime = tokio::runtime::Builder::new_multi_thread().build().unwrap();
    /// let spawner = Spawner::with_tokio_handle(runtime.handle().clone());
    ///
    /// let value = runtime.block_on(spawner.spawn(async { 7 }));
    /// assert_eq!(value, Ok(7));
    /// ```
    #[must_use]
    #[cfg(feature = "tokio")]
    #[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
    pub fn with_tokio_handle(handle: ::tokio::runtime::Handle) -> Self {
        Self(SpawnerKind::TokioHandle(handle))
    }

    /// Creates a custom spawner from a closure.
    ///
    /// The closure receives a boxed, pinned future and is responsible for
    /// driving it to completion on the appropriate executor.
    #[cfg(feature = "custom")]
    #[cfg_attr(docsrs, doc(cfg(feature = "custom")))]
    pub fn new_custom<F>(f: F) -> Self
    where
        F: Fn(BoxedFuture) + Send + Sync + 'static,
    {
        Self(SpawnerKind::Custom(SpawnHook::new(f)))
    }

    /// Spawns an async task.
    ///
    /// Returns a [`JoinHandle`] that can be awaited to retrieve the task's result,
    /// or dropped to let the task run in fire-and-forget mode.
    ///
    /// # Panics
    ///
    /// Panics if the spawner came from [`Spawner::new_tokio`] and no Tokio runtime is current.
    pub fn spawn<T: Send + 'static>(&self, work: impl Future<Output = T> + Send + 'static) -> JoinHandle<T> {
        match &self.0 {
            #[cfg(feature = "tokio")]
            SpawnerKind::Tokio => JoinHandle(JoinHandleInner::Tokio(::tokio::spawn(work))),
            #[cfg(feature = "tokio")]
            SpawnerKind::TokioHandle(handle) => JoinHandle(JoinHandleInner::Tokio(handle.spawn(work))),
            #[cfg(feature = "custom")]
            SpawnerKind::Custom(hook) => hook.submit(work),
        }
    }

    /// Runs a blocking closure without stalling async workers.
    ///
    /// Tokio spawners use the runtime's blocking pool. Custom spawners receive the closure
    /// wrapped in a future, so the executor they wrap decides where it runs.
    ///
    /// # Panics
    ///
    /// Panics if the spawner came from [`Spawner::new_tokio`] and no Tokio runtime is current.
    pub fn spawn_blocking<T, F>(&self, work: F) -> JoinHandle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        match &self.0 {
            #[cfg(feature = "tokio")]
            SpawnerKind::Tokio => JoinHandle(JoinHandleInner::Tokio(::tokio::task::spawn_blocking(work))),
            #[cfg(feature = "tokio")]
            SpawnerKind::TokioHandle(handle) => JoinHandle(JoinHandleInner::Tokio(handle.spawn_blocking(work))),
            #[cfg(feature = "custom")]
            SpawnerKind::Custom(hook) => hook.submit(async move { work() }),
        }
    }
}
