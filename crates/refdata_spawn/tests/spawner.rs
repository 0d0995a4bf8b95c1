// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(missing_docs, reason = "test code")]
#![cfg(all(feature = "tokio", feature = "custom"))]

//! Tests for `Spawner` implementations.

use refdata_spawn::{JoinError, Spawner};

static_assertions::assert_impl_all!(Spawner: Send, Sync, Clone);
static_assertions::assert_impl_all!(refdata_spawn::JoinHandle<u32>: Send, Unpin);

fn thread_spawner() -> Spawner {
    Spawner::new_custom(|fut| {
        std::thread::spawn(move || futures::executor::block_on(fut));
    })
}

#[tokio::test]
async fn tokio_spawn_and_await() {
    let spawner = Spawner::new_tokio();
    assert_eq!(spawner.spawn(async { 42 }).await, Ok(42));
}

#[tokio::test]
async fn tokio_spawn_blocking_and_await() {
    let spawner = Spawner::new_tokio();
    let result = spawner
        .spawn_blocking(|| {
            std::thread::sleep(std::time::Duration::from_millis(5));
            "slept"
        })
        .await;
    assert_eq!(result, Ok("slept"));
}

#[tokio::test]
async fn tokio_dropped_handle_keeps_running() {
    let spawner = Spawner::new_tokio();
    let (tx, rx) = tokio::sync::oneshot::channel();

    drop(spawner.spawn(async move {
        tx.send(42).unwrap();
    }));

    assert_eq!(rx.await.unwrap(), 42);
}

#[tokio::test]
async fn tokio_panic_surfaces_as_join_error() {
    let spawner = Spawner::new_tokio();
    let result = spawner.spawn(async { panic!("boom") }).await;
    assert_eq!(result, Err::<(), _>(JoinError::Panicked));
}

#[test]
fn tokio_handle_spawns_from_plain_thread() {
    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build().unwrap();
    let spawner = Spawner::with_tokio_handle(runtime.handle().clone());

    let handle = std::thread::spawn(move || futures::executor::block_on(spawner.spawn_blocking(|| 5)))
        .join()
        .unwrap();
    assert_eq!(handle, Ok(5));
}

#[test]
fn custom_spawn_and_await() {
    let spawner = thread_spawner();
    assert_eq!(futures::executor::block_on(spawner.spawn(async { 42 })), Ok(42));
}

#[test]
fn custom_spawn_blocking_runs_on_executor() {
    let spawner = thread_spawner();
    let caller = std::thread::current().id();
    let worker = futures::executor::block_on(spawner.spawn_blocking(|| std::thread::current().id())).unwrap();
    assert_ne!(caller, worker);
}

#[test]
fn custom_executor_dropping_work_cancels() {
    let spawner = Spawner::new_custom(|_fut| {});
    let result = futures::executor::block_on(spawner.spawn(async { 1 }));
    assert_eq!(result, Err(JoinError::Cancelled));
}

#[test]
fn custom_spawner_debug() {
    let spawner = Spawner::new_custom(|_| {});
    let debug_str = format!("{spawner:?}");
    assert!(debug_str.contains("SpawnHook"));
}
