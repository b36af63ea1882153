use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::debug;

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone)]
pub struct ManualClock(Arc<Mutex<Instant>>);

impl ManualClock {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(Instant::now())))
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.0.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Hit,
    Miss,
}

struct Entry<V> {
    fetched_at: Instant,
    value: V,
}

type KeyLock = Arc<tokio::sync::Mutex<()>>;

struct Inner<V> {
    entries: HashMap<String, Entry<V>>,
    in_flight: HashMap<String, KeyLock>,
}

pub struct TtlCache<V> {
    inner: Mutex<Inner<V>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(Inner { entries: HashMap::new(), in_flight: HashMap::new() }),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.live(&self.lock(), key)
    }

    pub async fn get_or_fill<F, Fut>(&self, key: &str, fill: F) -> (V, Lookup)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        let key_lock = {
            let mut inner = self.lock();
            if let Some(v) = self.live(&inner, key) {
                return (v, Lookup::Hit);
            }
            inner.in_flight.entry(key.to_string()).or_default().clone()
        };

        let _flight = key_lock.lock().await;
        // released on drop, so a cancelled fill does not strand the key
        let _slot = InFlight { cache: self, key, lock: &key_lock };
        if let Some(v) = self.get(key) {
            debug!(%key, "filled by a concurrent request");
            return (v, Lookup::Hit);
        }

        let value = fill().await;

        let mut inner = self.lock();
        inner.entries.insert(
            key.to_string(),
            Entry { fetched_at: self.clock.now(), value: value.clone() },
        );
        let removed = self.sweep_locked(&mut inner);
        if removed > 0 {
            debug!(removed, remaining = inner.entries.len(), "swept expired cache entries");
        }
        (value, Lookup::Miss)
    }

    pub fn sweep(&self) -> usize {
        self.sweep_locked(&mut self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Inner<V>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn live(&self, inner: &Inner<V>, key: &str) -> Option<V> {
        let entry = inner.entries.get(key)?;
        self.is_fresh(entry.fetched_at).then(|| entry.value.clone())
    }

    fn is_fresh(&self, fetched_at: Instant) -> bool {
        self.clock.now().saturating_duration_since(fetched_at) < self.ttl
    }

    fn sweep_locked(&self, inner: &mut Inner<V>) -> usize {
        let before = inner.entries.len();
        inner.entries.retain(|_, e| self.is_fresh(e.fetched_at));
        before - inner.entries.len()
    }
}

struct InFlight<'a, V> {
    cache: &'a TtlCache<V>,
    key: &'a str,
    lock: &'a KeyLock,
}

impl<V> Drop for InFlight<'_, V> {
    fn drop(&mut self) {
        let mut inner = self.cache.inner.lock().unwrap_or_else(|e| e.into_inner());
        // a later caller may already have registered a fresh lock for the key
        if inner.in_flight.get(self.key).is_some_and(|l| Arc::ptr_eq(l, self.lock)) {
            inner.in_flight.remove(self.key);
        }
    }
}
