//! Process-wide rules-container cache.
//!
//! One slot, refresh-on-miss. Every verification on a client observes the
//! same decoded snapshot without a per-call fetch, and concurrent misses
//! collapse into a single upstream fetch.
//!
//! The fetch runs in a spawned task: a caller that wins the race and is then
//! cancelled does not abort the fetch for the callers waiting on it, and the
//! completed result still lands in the slot. Readers hold the state lock
//! only long enough to clone an `Arc`, so a populated cache never serializes
//! its callers.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, watch};

use protect_types::error::{Error, TransportError};
use protect_types::rules::RulesContainer;

use crate::container;

/// The cached fetch result: the container both raw (governance signatures
/// cover the raw bytes) and decoded.
#[derive(Debug, Clone)]
pub struct CachedRules {
    pub raw_base64: String,
    pub container: RulesContainer,
}

type FetchResult = Result<Arc<CachedRules>, Error>;

enum State {
    Empty,
    /// A fetch is in flight; the receiver yields its result exactly once.
    Fetching(watch::Receiver<Option<FetchResult>>),
    Ready(Arc<CachedRules>),
}

/// A single-slot, single-flight cache of the decoded rules container.
pub struct RulesCache {
    state: Arc<Mutex<State>>,
}

impl Default for RulesCache {
    fn default() -> Self {
        Self::new()
    }
}

impl RulesCache {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::Empty)),
        }
    }

    /// Returns the cached container, fetching it with `fetcher` on a miss.
    ///
    /// `fetcher` resolves to the container's base64; decoding happens here
    /// so the slot only ever holds a fully decoded value. At most one fetch
    /// is in flight at a time; concurrent callers wait on the same result. A
    /// failed fetch leaves the slot empty and the next caller retries.
    pub async fn get<F, Fut>(&self, fetcher: F) -> FetchResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, Error>> + Send + 'static,
    {
        let mut receiver = {
            let mut state = self.state.lock().await;
            match &mut *state {
                State::Ready(cached) => return Ok(Arc::clone(cached)),
                State::Fetching(receiver) => receiver.clone(),
                slot @ State::Empty => {
                    let (sender, receiver) = watch::channel(None);
                    *slot = State::Fetching(receiver.clone());
                    spawn_fetch(Arc::clone(&self.state), fetcher(), sender);
                    receiver
                }
            }
        };

        loop {
            let settled = receiver.borrow_and_update().clone();
            if let Some(result) = settled {
                return result;
            }
            receiver.changed().await.map_err(|_| {
                Error::Transport(TransportError::Failure(
                    "rules fetch task terminated without a result".into(),
                ))
            })?;
        }
    }

    /// Clears the slot. A fetch already in flight is left to complete; its
    /// result is at least as fresh as anything a new fetch would return.
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        if matches!(&*state, State::Ready(_)) {
            *state = State::Empty;
        }
    }
}

fn spawn_fetch<Fut>(
    state: Arc<Mutex<State>>,
    fetch: Fut,
    sender: watch::Sender<Option<FetchResult>>,
) where
    Fut: Future<Output = Result<String, Error>> + Send + 'static,
{
    tokio::spawn(async move {
        let result = match fetch.await {
            Ok(raw_base64) => container::rules_container_from_base64(&raw_base64)
                .map(|container| {
                    Arc::new(CachedRules {
                        raw_base64,
                        container,
                    })
                })
                .map_err(Error::from),
            Err(error) => Err(error),
        };

        {
            let mut state = state.lock().await;
            match &result {
                Ok(cached) => *state = State::Ready(Arc::clone(cached)),
                Err(error) => {
                    tracing::warn!(%error, "rules container fetch failed");
                    *state = State::Empty;
                }
            }
        }
        // Waiters learn the outcome only after the slot is settled, so no
        // caller can observe a partial state.
        let _ = sender.send(Some(result));
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use protect_types::util::b64;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn container_b64() -> String {
        b64::encode(r#"{"users": [{"id": "u1"}]}"#)
    }

    #[tokio::test]
    async fn miss_fetches_then_hit_reuses() {
        let cache = RulesCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let calls = Arc::clone(&calls);
            let cached = cache
                .get(move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(container_b64())
                })
                .await
                .expect("fetch succeeds");
            assert_eq!(cached.container.users[0].id, "u1");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_misses_collapse_into_one_fetch() {
        let cache = Arc::new(RulesCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                cache
                    .get(move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok(container_b64())
                    })
                    .await
                    .expect("fetch succeeds")
            }));
        }

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.expect("task joins"));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // Every caller observes the same decoded instance.
        for result in &results {
            assert!(Arc::ptr_eq(result, &results[0]));
        }
    }

    #[tokio::test]
    async fn invalidate_forces_a_refetch() {
        let cache = RulesCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let fetch = |calls: Arc<AtomicUsize>| {
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(container_b64())
            }
        };

        cache.get(fetch(Arc::clone(&calls))).await.expect("first");
        cache.invalidate().await;
        cache.get(fetch(Arc::clone(&calls))).await.expect("second");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_fetch_leaves_the_slot_empty() {
        let cache = RulesCache::new();

        let err = cache
            .get(|| async { Err(Error::Transport(TransportError::Failure("down".into()))) })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));

        // Undecodable base64 is also a miss, not a poisoned slot.
        let err = cache
            .get(|| async { Ok("!!! not base64".to_string()) })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Integrity(_)));

        let cached = cache
            .get(|| async { Ok(container_b64()) })
            .await
            .expect("recovers after failures");
        assert_eq!(cached.container.users.len(), 1);
    }

    #[tokio::test]
    async fn cancelled_winner_does_not_abort_the_fetch() {
        let cache = Arc::new(RulesCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        // Winner starts the fetch and is cancelled while it is in flight.
        let winner = {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            tokio::spawn(async move {
                cache
                    .get(move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok(container_b64())
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        winner.abort();
        assert!(winner.await.is_err());

        // A waiter arriving afterwards gets the winner's fetch, not a new one.
        let cached = cache
            .get(|| async {
                panic!("a second fetch must not start while one is in flight")
            })
            .await
            .expect("in-flight fetch completes");
        assert_eq!(cached.container.users[0].id, "u1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
