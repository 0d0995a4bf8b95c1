// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Coalescing of concurrent, overlapping batch lookups.
//!
//! Every in-flight fetch is registered in one table under each key it covers. A caller whose
//! keys are partly covered joins the covering fetches for those keys and starts one new fetch
//! for the rest, so no key ever has more than one fetch outstanding. The table lock is held only
//! while partitioning and while releasing, never across a fetch.

use std::{
    collections::{HashMap, HashSet},
    fmt,
    hash::Hash,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Instant,
};

use futures::{
    FutureExt,
    channel::oneshot,
    future::{self, BoxFuture, Shared},
};
use parking_lot::Mutex;
use refdata_spawn::Spawner;

use crate::{
    AsyncBatchFetcher, Error, FetchError, ResolveFuture, Resolver,
    telemetry::{ResolverActivity, ResolverOperation, ResolverTelemetry},
};

pub(crate) const DEFAULT_NAME: &str = "refdata";

type FetchOutcome<K, V> = Result<HashMap<K, V>, FetchError>;
type SharedOutcome<K, V> = Shared<BoxFuture<'static, Result<Arc<HashMap<K, V>>, Error>>>;
type OngoingTable<K, V> = Mutex<HashMap<K, Arc<Request<K, V>>>>;

/// One in-flight fetch, shared by its owner and every caller that joins it.
struct Request<K, V> {
    id: u64,
    outcome: SharedOutcome<K, V>,
}

impl<K, V> Request<K, V>
where
    K: Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn new(id: u64, rx: oneshot::Receiver<FetchOutcome<K, V>>) -> Self {
        let outcome = rx
            .map(|received| match received {
                Ok(Ok(values)) => Ok(Arc::new(values)),
                Ok(Err(e)) => Err(Error::Fetch(e)),
                Err(oneshot::Canceled) => Err(Error::Abandoned),
            })
            .boxed()
            .shared();
        Self { id, outcome }
    }
}

/// The requests one caller waits on, with the keys it wants from each.
struct Sources<K, V> {
    owned: Option<Source<K, V>>,
    joined: Vec<Source<K, V>>,
}

struct Source<K, V> {
    request: Arc<Request<K, V>>,
    keys: Vec<K>,
}

/// A fetch that still has to be handed to the spawner.
struct PendingFetch<K, V>
where
    K: Eq + Hash,
{
    keys: HashSet<K>,
    in_flight: InFlight<K, V>,
}

/// Owner side of a request.
///
/// Releases the request's keys from the table exactly once, before the outcome is delivered,
/// including when the fetch task is torn down without completing.
struct InFlight<K, V>
where
    K: Eq + Hash,
{
    table: Arc<OngoingTable<K, V>>,
    id: u64,
    keys: Vec<K>,
    tx: Option<oneshot::Sender<FetchOutcome<K, V>>>,
    telemetry: ResolverTelemetry,
    name: &'static str,
    started: Instant,
}

impl<K, V> InFlight<K, V>
where
    K: Eq + Hash,
{
    fn complete(mut self, outcome: FetchOutcome<K, V>) {
        let activity = if outcome.is_ok() {
            ResolverActivity::Completed
        } else {
            ResolverActivity::Failed
        };
        self.record(activity);
        self.release();
        if let Some(tx) = self.tx.take() {
            // Every waiter may have detached already.
            let _ = tx.send(outcome);
        }
    }

    fn release(&mut self) {
        if self.keys.is_empty() {
            return;
        }
        let mut table = self.table.lock();
        for key in self.keys.drain(..) {
            if table.get(&key).is_some_and(|r| r.id == self.id) {
                table.remove(&key);
            }
        }
    }

    fn record(&self, activity: ResolverActivity) {
        self.telemetry
            .record(self.name, ResolverOperation::Fetch, activity, self.keys.len(), Some(self.started.elapsed()));
    }
}

impl<K, V> Drop for InFlight<K, V>
where
    K: Eq + Hash,
{
    fn drop(&mut self) {
        if self.tx.is_some() {
            self.record(ResolverActivity::Abandoned);
            self.release();
        }
    }
}

/// A [`Resolver`] that guarantees at most one outstanding fetch per key.
///
/// Concurrent callers with overlapping key sets share fetches: a caller joins the in-flight
/// fetch covering each of its keys and starts a single new fetch for the keys nobody is fetching
/// yet. Fetches run on the configured [`Spawner`], independently of the callers waiting on them,
/// so a caller that drops its future never cancels a fetch others depend on.
///
/// Cloning is cheap; clones share the same in-flight table.
///
/// # Examples
///
/// ```
/// use std::collections::{HashMap, HashSet};
/// use refdata::{CoalescingResolver, FetchError, Resolver, fetch_fn};
/// use refdata_spawn::Spawner;
///
/// # #[tokio::main(flavor = "multi_thread")]
/// # async fn main() {
/// let resolver = CoalescingResolver::new(
///     fetch_fn(|keys: HashSet<&'static str>| async move {
///         Ok::<_, FetchError>(keys.into_iter().map(|k| (k, k.len())).collect::<HashMap<_, _>>())
///     }),
///     Spawner::new_tokio(),
/// );
///
/// let found = resolver.future(HashSet::from(["apple", "fig"])).await.unwrap();
/// assert_eq!(found, HashMap::from([("apple", 5), ("fig", 3)]));
/// assert_eq!(resolver.in_flight(), 0);
/// # }
/// ```
pub struct CoalescingResolver<K, V, F>
where
    K: Eq + Hash,
{
    fetcher: Arc<F>,
    spawner: Spawner,
    ongoing: Arc<OngoingTable<K, V>>,
    next_id: Arc<AtomicU64>,
    telemetry: ResolverTelemetry,
    name: &'static str,
}

impl<K, V, F> CoalescingResolver<K, V, F>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    F: AsyncBatchFetcher<K, V> + 'static,
{
    /// Creates a resolver that fetches through `fetcher` and drives fetches on `spawner`.
    #[must_use]
    pub fn new(fetcher: F, spawner: Spawner) -> Self {
        Self::with_telemetry(fetcher, spawner, ResolverTelemetry::disabled(), DEFAULT_NAME)
    }

    pub(crate) fn with_telemetry(fetcher: F, spawner: Spawner, telemetry: ResolverTelemetry, name: &'static str) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            spawner,
            ongoing: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(0)),
            telemetry,
            name,
        }
    }

    /// Returns how many keys currently have a fetch outstanding.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.ongoing.lock().len()
    }

    /// Returns the name this resolver reports in telemetry.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Splits `keys` into joins of in-flight requests and one new request for the rest.
    ///
    /// The new request is registered under all of its keys in the same critical section that
    /// decided they were unclaimed.
    fn partition(&self, keys: HashSet<K>) -> (Sources<K, V>, Option<PendingFetch<K, V>>) {
        let mut joined: Vec<Source<K, V>> = Vec::new();
        let mut group_of: HashMap<u64, usize> = HashMap::new();
        let mut new_keys = HashSet::new();

        let mut table = self.ongoing.lock();
        for key in keys {
            match table.get(&key) {
                Some(request) => {
                    let group = *group_of.entry(request.id).or_insert_with(|| {
                        joined.push(Source {
                            request: Arc::clone(request),
                            keys: Vec::new(),
                        });
                        joined.len() - 1
                    });
                    joined[group].keys.push(key);
                }
                None => {
                    new_keys.insert(key);
                }
            }
        }

        if new_keys.is_empty() {
            drop(table);
            return (Sources { owned: None, joined }, None);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        let request = Arc::new(Request::new(id, rx));
        for key in &new_keys {
            table.insert(key.clone(), Arc::clone(&request));
        }
        drop(table);

        let owned_keys: Vec<K> = new_keys.iter().cloned().collect();
        let pending = PendingFetch {
            in_flight: InFlight {
                table: Arc::clone(&self.ongoing),
                id,
                keys: owned_keys.clone(),
                tx: Some(tx),
                telemetry: self.telemetry.clone(),
                name: self.name,
                started: Instant::now(),
            },
            keys: new_keys,
        };
        let owned = Source { request, keys: owned_keys };
        (
            Sources {
                owned: Some(owned),
                joined,
            },
            Some(pending),
        )
    }

    fn start(&self, pending: PendingFetch<K, V>) {
        let PendingFetch { keys, in_flight } = pending;
        self.telemetry
            .record(self.name, ResolverOperation::Fetch, ResolverActivity::Started, keys.len(), None);

        let fetcher = Arc::clone(&self.fetcher);
        // The handle is dropped: the fetch runs detached from every caller.
        drop(self.spawner.spawn(async move {
            let outcome = fetcher.fetch(keys).await;
            in_flight.complete(outcome);
        }));
    }
}

/// Waits on every source and merges the keys this caller asked for.
///
/// When several sources fail, the caller's own request wins, then joined requests in the order
/// they were first encountered.
async fn gather<K, V>(sources: Sources<K, V>, capacity: usize) -> Result<HashMap<K, V>, Error>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    let ordered: Vec<Source<K, V>> = sources.owned.into_iter().chain(sources.joined).collect();
    let outcomes = future::join_all(ordered.iter().map(|s| s.request.outcome.clone())).await;

    let mut merged = HashMap::with_capacity(capacity);
    let mut failure = None;
    for (source, outcome) in ordered.into_iter().zip(outcomes) {
        match outcome {
            Ok(values) => {
                for key in source.keys {
                    if let Some(value) = values.get(&key) {
                        merged.insert(key, value.clone());
                    }
                }
            }
            Err(e) => {
                failure.get_or_insert(e);
            }
        }
    }

    match failure {
        Some(e) => Err(e),
        None => Ok(merged),
    }
}

impl<K, V, F> Resolver<K, V> for CoalescingResolver<K, V, F>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    F: AsyncBatchFetcher<K, V> + 'static,
{
    fn future(&self, keys: HashSet<K>) -> ResolveFuture<K, V> {
        if keys.is_empty() {
            return future::ready(Ok(HashMap::new())).boxed();
        }

        let requested = keys.len();
        let (sources, pending) = self.partition(keys);

        let joined_keys: usize = sources.joined.iter().map(|s| s.keys.len()).sum();
        if joined_keys > 0 {
            self.telemetry
                .record(self.name, ResolverOperation::Resolve, ResolverActivity::Joined, joined_keys, None);
        }

        if let Some(pending) = pending {
            self.start(pending);
        }

        gather(sources, requested).boxed()
    }
}

impl<K, V, F> Clone for CoalescingResolver<K, V, F>
where
    K: Eq + Hash,
{
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            spawner: self.spawner.clone(),
            ongoing: Arc::clone(&self.ongoing),
            next_id: Arc::clone(&self.next_id),
            telemetry: self.telemetry.clone(),
            name: self.name,
        }
    }
}

impl<K, V, F> fmt::Debug for CoalescingResolver<K, V, F>
where
    K: Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoalescingResolver")
            .field("name", &self.name)
            .field("in_flight", &self.ongoing.lock().len())
            .finish_non_exhaustive()
    }
}
