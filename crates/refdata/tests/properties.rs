// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Property tests for coalescing arbitrary overlapping lookups.

use std::{
    collections::{HashMap, HashSet},
    pin::Pin,
    sync::Arc,
};

use futures::executor::block_on;
use parking_lot::Mutex;
use proptest::{
    collection::{hash_set, vec},
    prelude::*,
};
use refdata::{CoalescingResolver, FetchError, Resolver, fetch_fn};
use refdata_spawn::Spawner;

type Task = Pin<Box<dyn Future<Output = ()> + Send>>;

fn manual_spawner() -> (Spawner, Arc<Mutex<Vec<Task>>>) {
    let queue: Arc<Mutex<Vec<Task>>> = Arc::default();
    let sink = Arc::clone(&queue);
    (Spawner::new_custom(move |fut| sink.lock().push(fut)), queue)
}

fn run_all(queue: &Mutex<Vec<Task>>) {
    let tasks: Vec<_> = queue.lock().drain(..).collect();
    for task in tasks {
        block_on(task);
    }
}

/// Multiples of three are unknown to the source.
fn known(key: u8) -> Option<u32> {
    (key % 3 != 0).then(|| u32::from(key) * 10)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Property: while lookups overlap, every key is fetched exactly once and every caller
    /// receives exactly the found subset of what it asked for.
    #[test]
    fn overlapping_lookups_fetch_each_key_once(requests in vec(hash_set(0u8..16, 0..6), 1..8)) {
        let (spawner, queue) = manual_spawner();
        let calls: Arc<Mutex<Vec<HashSet<u8>>>> = Arc::default();
        let fetcher = fetch_fn({
            let calls = Arc::clone(&calls);
            move |keys: HashSet<u8>| {
                calls.lock().push(keys.clone());
                async move {
                    Ok::<_, FetchError>(keys.into_iter().filter_map(|k| known(k).map(|v| (k, v))).collect::<HashMap<_, _>>())
                }
            }
        });
        let resolver = CoalescingResolver::new(fetcher, spawner);

        let lookups: Vec<_> = requests.iter().map(|keys| resolver.future(keys.clone())).collect();
        let outstanding: HashSet<u8> = requests.iter().flatten().copied().collect();
        prop_assert_eq!(resolver.in_flight(), outstanding.len());

        run_all(&queue);

        for (requested, lookup) in requests.iter().zip(lookups) {
            let found = block_on(lookup).unwrap();
            let expected: HashMap<u8, u32> = requested.iter().filter_map(|k| known(*k).map(|v| (*k, v))).collect();
            prop_assert_eq!(found, expected);
        }

        let mut fetched = HashSet::new();
        for call in calls.lock().iter() {
            prop_assert!(!call.is_empty());
            for key in call {
                prop_assert!(fetched.insert(*key), "key {} fetched twice", key);
            }
        }
        prop_assert_eq!(fetched, outstanding);
        prop_assert_eq!(resolver.in_flight(), 0);
    }

    /// Property: once every fetch has settled, repeating the same lookups starts fresh fetches.
    #[test]
    fn settled_keys_are_fetched_again(keys in hash_set(0u8..16, 1..8)) {
        let (spawner, queue) = manual_spawner();
        let calls: Arc<Mutex<usize>> = Arc::default();
        let fetcher = fetch_fn({
            let calls = Arc::clone(&calls);
            move |keys: HashSet<u8>| {
                *calls.lock() += 1;
                async move {
                    Ok::<_, FetchError>(keys.into_iter().filter_map(|k| known(k).map(|v| (k, v))).collect::<HashMap<_, _>>())
                }
            }
        });
        let resolver = CoalescingResolver::new(fetcher, spawner);

        for round in 1..=2 {
            let lookup = resolver.future(keys.clone());
            run_all(&queue);
            let found = block_on(lookup).unwrap();
            prop_assert!(found.keys().all(|k| keys.contains(k)));
            prop_assert_eq!(*calls.lock(), round);
        }
    }
}
