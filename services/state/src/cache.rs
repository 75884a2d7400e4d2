//! Staleness-tracked cache slots with in-flight deduplication.
//!
//! Each entity class owns one slot. Concurrent readers of a stale slot
//! collapse onto a single fetch; the winners wait on a `Notify` and read
//! the stored result when the fetcher finishes. A failed fetch stores
//! nothing, so the next reader takes over the fetch instead of serving a
//! poisoned value.

use crate::reader::ReadError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::time::{Duration, Instant};
use tracing::{debug, warn};
use types::AccountAddress;

/// The independently-refreshed slices of mirrored ledger state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityClass {
    Pool,
    Staking(AccountAddress),
    Polls,
    PlatformStats,
}

/// How long a fetched value stays servable, per class. The windows follow
/// the refresh cadence the dashboard needs: balances move fast, poll and
/// platform aggregates slowly.
#[derive(Debug, Clone)]
pub struct StalenessConfig {
    pub pool: Duration,
    pub staking: Duration,
    pub polls: Duration,
    pub platform_stats: Duration,
}

impl Default for StalenessConfig {
    fn default() -> Self {
        Self {
            pool: Duration::from_secs(30),
            staking: Duration::from_secs(30),
            polls: Duration::from_secs(300),
            platform_stats: Duration::from_secs(300),
        }
    }
}

impl StalenessConfig {
    pub fn window(&self, class: &EntityClass) -> Duration {
        match class {
            EntityClass::Pool => self.pool,
            EntityClass::Staking(_) => self.staking,
            EntityClass::Polls => self.polls,
            EntityClass::PlatformStats => self.platform_stats,
        }
    }
}

/// Observable slot lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    /// No value, or the value aged past its window.
    Stale,
    /// A fetch is in flight; readers are parked on its completion.
    Fetching,
    Fresh,
}

struct CachedEntry<T> {
    value: T,
    fetched_at: Instant,
}

// Waiters re-check the slot after this long even without a wakeup, in
// case the fetcher died between storing and notifying.
const WAIT_RECHECK: Duration = Duration::from_secs(30);

/// One value type cached across entity-class keys.
///
/// Each slot carries a generation counter bumped by `invalidate` and
/// `force_refresh`. A fetch only stores its result while the generation it
/// started under is still current, so a slow read that straddles a write
/// invalidation cannot resurrect the pre-write value.
pub struct ClassCache<T: Clone> {
    entries: DashMap<EntityClass, CachedEntry<T>>,
    in_flight: DashMap<EntityClass, Arc<Notify>>,
    generations: DashMap<EntityClass, u64>,
}

impl<T: Clone> Default for ClassCache<T> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
            in_flight: DashMap::new(),
            generations: DashMap::new(),
        }
    }
}

impl<T: Clone> ClassCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, class: &EntityClass, window: Duration) -> FetchState {
        if self.in_flight.contains_key(class) {
            return FetchState::Fetching;
        }
        match self.entries.get(class) {
            Some(entry) if entry.fetched_at.elapsed() <= window => FetchState::Fresh,
            _ => FetchState::Stale,
        }
    }

    fn generation(&self, class: &EntityClass) -> u64 {
        self.generations.get(class).map(|g| *g).unwrap_or(0)
    }

    /// Drop the slot so the next read refetches. Also orphans any fetch
    /// already in flight: its result will be discarded on completion.
    pub fn invalidate(&self, class: &EntityClass) {
        *self.generations.entry(*class).or_insert(0) += 1;
        if self.entries.remove(class).is_some() {
            debug!(?class, "cache slot invalidated");
        }
    }

    /// Serve the slot if fresh, otherwise fetch through `fetch`. Concurrent
    /// callers on the same stale slot share one fetch. Errors are returned
    /// to the caller that ran the fetch and leave the slot empty.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        class: EntityClass,
        window: Duration,
        fetch: F,
    ) -> Result<T, ReadError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ReadError>>,
    {
        loop {
            if let Some(entry) = self.entries.get(&class) {
                if entry.fetched_at.elapsed() <= window {
                    return Ok(entry.value.clone());
                }
            }

            match self.in_flight.entry(class) {
                Entry::Occupied(occupied) => {
                    let notify = occupied.get().clone();
                    drop(occupied);
                    // Timeout guards against a missed wakeup; the loop
                    // re-checks the slot either way.
                    let _ = tokio::time::timeout(WAIT_RECHECK, notify.notified()).await;
                    if let Some(entry) = self.entries.get(&class) {
                        if entry.fetched_at.elapsed() <= window {
                            return Ok(entry.value.clone());
                        }
                    }
                    // Fetch failed or the value is already stale again;
                    // loop and take over.
                }
                Entry::Vacant(vacant) => {
                    let notify = Arc::new(Notify::new());
                    vacant.insert(notify.clone());
                    let started = self.generation(&class);
                    let result = self.run_fetch(class, started, fetch()).await;
                    notify.notify_waiters();
                    return result;
                }
            }
        }
    }

    /// Refetch unconditionally, replacing whatever the slot holds. The
    /// generation bump orphans any slower fetch already in flight, so the
    /// forced value always wins regardless of completion order.
    pub async fn force_refresh<F, Fut>(&self, class: EntityClass, fetch: F) -> Result<T, ReadError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ReadError>>,
    {
        let notify = match self.in_flight.entry(class) {
            Entry::Occupied(occupied) => occupied.get().clone(),
            Entry::Vacant(vacant) => {
                let notify = Arc::new(Notify::new());
                vacant.insert(notify.clone());
                notify
            }
        };
        let started = {
            let mut gen = self.generations.entry(class).or_insert(0);
            *gen += 1;
            *gen
        };
        let result = self.run_fetch(class, started, fetch()).await;
        notify.notify_waiters();
        result
    }

    async fn run_fetch<Fut>(
        &self,
        class: EntityClass,
        started: u64,
        fut: Fut,
    ) -> Result<T, ReadError>
    where
        Fut: Future<Output = Result<T, ReadError>>,
    {
        let result = fut.await;
        match &result {
            Ok(value) => {
                // Holding the generation guard across the insert keeps an
                // invalidation from landing between the check and the store.
                let guard = self.generations.get(&class);
                let current = guard.as_deref().copied().unwrap_or(0);
                if current == started {
                    self.entries.insert(
                        class,
                        CachedEntry {
                            value: value.clone(),
                            fetched_at: Instant::now(),
                        },
                    );
                } else {
                    debug!(?class, "slot invalidated mid-fetch, result discarded");
                }
            }
            Err(error) => {
                warn!(?class, %error, "fetch failed, slot left stale");
            }
        }
        self.in_flight.remove(&class);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn window() -> Duration {
        Duration::from_secs(30)
    }

    #[tokio::test]
    async fn fresh_slot_serves_without_fetching() {
        let cache: ClassCache<u64> = ClassCache::new();
        let calls = AtomicU64::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_fetch(EntityClass::Pool, window(), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42u64)
                })
                .await
                .unwrap();
            assert_eq!(value, 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.state(&EntityClass::Pool, window()), FetchState::Fresh);
    }

    #[tokio::test]
    async fn invalidation_forces_a_refetch() {
        let cache: ClassCache<u64> = ClassCache::new();
        let calls = AtomicU64::new(0);
        let fetch = || async {
            Ok(calls.fetch_add(1, Ordering::SeqCst))
        };

        assert_eq!(cache.get_or_fetch(EntityClass::Polls, window(), fetch).await.unwrap(), 0);
        cache.invalidate(&EntityClass::Polls);
        assert_eq!(cache.state(&EntityClass::Polls, window()), FetchState::Stale);
        assert_eq!(cache.get_or_fetch(EntityClass::Polls, window(), fetch).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn failed_fetch_leaves_slot_stale() {
        let cache: ClassCache<u64> = ClassCache::new();
        let calls = AtomicU64::new(0);

        let err = cache
            .get_or_fetch(EntityClass::Pool, window(), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ReadError::Network { reason: "down".into() })
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ReadError::Network { .. }));
        assert_eq!(cache.state(&EntityClass::Pool, window()), FetchState::Stale);

        // Next reader retries instead of serving the failure.
        let value = cache
            .get_or_fetch(EntityClass::Pool, window(), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(7u64)
            })
            .await
            .unwrap();
        assert_eq!(value, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn force_refresh_replaces_a_fresh_value() {
        let cache: ClassCache<u64> = ClassCache::new();
        cache
            .get_or_fetch(EntityClass::PlatformStats, window(), || async { Ok(1u64) })
            .await
            .unwrap();

        let value = cache
            .force_refresh(EntityClass::PlatformStats, || async { Ok(2u64) })
            .await
            .unwrap();
        assert_eq!(value, 2);

        // The replacement is what subsequent reads see.
        let value = cache
            .get_or_fetch(EntityClass::PlatformStats, window(), || async { Ok(99u64) })
            .await
            .unwrap();
        assert_eq!(value, 2);
    }

    #[tokio::test]
    async fn invalidation_during_a_fetch_discards_the_result() {
        let cache: Arc<ClassCache<u64>> = Arc::new(ClassCache::new());
        let gate = Arc::new(Notify::new());

        let stalled = {
            let cache = Arc::clone(&cache);
            let gate = Arc::clone(&gate);
            tokio::spawn(async move {
                cache
                    .get_or_fetch(EntityClass::Pool, window(), move || {
                        let gate = Arc::clone(&gate);
                        async move {
                            gate.notified().await;
                            Ok(1_000_000u64)
                        }
                    })
                    .await
            })
        };
        while cache.state(&EntityClass::Pool, window()) != FetchState::Fetching {
            tokio::task::yield_now().await;
        }

        cache.invalidate(&EntityClass::Pool);
        gate.notify_one();
        // The orphaned fetcher still receives its own result.
        assert_eq!(stalled.await.unwrap().unwrap(), 1_000_000);

        // The slot did not keep it; the next read refetches.
        assert_eq!(cache.state(&EntityClass::Pool, window()), FetchState::Stale);
        let value = cache
            .get_or_fetch(EntityClass::Pool, window(), || async { Ok(2_000_000u64) })
            .await
            .unwrap();
        assert_eq!(value, 2_000_000);
    }

    #[tokio::test]
    async fn forced_refresh_wins_over_a_slower_fetch() {
        let cache: Arc<ClassCache<u64>> = Arc::new(ClassCache::new());
        let gate = Arc::new(Notify::new());

        let stalled = {
            let cache = Arc::clone(&cache);
            let gate = Arc::clone(&gate);
            tokio::spawn(async move {
                cache
                    .get_or_fetch(EntityClass::Pool, window(), move || {
                        let gate = Arc::clone(&gate);
                        async move {
                            gate.notified().await;
                            Ok(1u64)
                        }
                    })
                    .await
            })
        };
        while cache.state(&EntityClass::Pool, window()) != FetchState::Fetching {
            tokio::task::yield_now().await;
        }

        let forced = cache
            .force_refresh(EntityClass::Pool, || async { Ok(2u64) })
            .await
            .unwrap();
        assert_eq!(forced, 2);

        // The older fetch lands last but cannot overwrite the forced value.
        gate.notify_one();
        assert_eq!(stalled.await.unwrap().unwrap(), 1);
        let value = cache
            .get_or_fetch(EntityClass::Pool, window(), || async { Ok(99u64) })
            .await
            .unwrap();
        assert_eq!(value, 2);
    }

    #[tokio::test]
    async fn staking_slots_are_per_address() {
        let cache: ClassCache<u64> = ClassCache::new();
        let a = AccountAddress::from_hex("0xa").unwrap();
        let b = AccountAddress::from_hex("0xb").unwrap();

        cache
            .get_or_fetch(EntityClass::Staking(a), window(), || async { Ok(10u64) })
            .await
            .unwrap();
        let value = cache
            .get_or_fetch(EntityClass::Staking(b), window(), || async { Ok(20u64) })
            .await
            .unwrap();
        assert_eq!(value, 20);

        cache.invalidate(&EntityClass::Staking(a));
        assert_eq!(cache.state(&EntityClass::Staking(b), window()), FetchState::Fresh);
    }
}
