//! Versioned cache manager (C5): two-tier `(namespace, key)` store with
//! single-flighted loads. The in-flight/shared-future mechanism mirrors the
//! teacher's `DocState` (`src/worker.rs`) almost line for line, generalized
//! from one crate-name key to an arbitrary `(Namespace, String)` key.

mod disk;
mod memory;

use crate::config::CacheCapacities;
use crate::error::{CoreError, Result, TransientError};
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Search,
    Corpus,
    Trie,
    Semantic,
    Dictionary,
    Provider,
    Default,
}

impl Namespace {
    pub const ALL: [Namespace; 7] = [
        Namespace::Search,
        Namespace::Corpus,
        Namespace::Trie,
        Namespace::Semantic,
        Namespace::Dictionary,
        Namespace::Provider,
        Namespace::Default,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Corpus => "corpus",
            Self::Trie => "trie",
            Self::Semantic => "semantic",
            Self::Dictionary => "dictionary",
            Self::Provider => "provider",
            Self::Default => "default",
        }
    }

    fn capacity(self, capacities: &CacheCapacities) -> usize {
        match self {
            Self::Search => capacities.search,
            Self::Corpus => capacities.corpus,
            Self::Trie => capacities.trie,
            Self::Semantic => capacities.semantic,
            Self::Dictionary => capacities.dictionary,
            Self::Provider => capacities.provider,
            Self::Default => capacities.default,
        }
    }

    /// Corpus and trie payloads compress well (repetitive text); search
    /// results and status lookups are small enough that compression isn't
    /// worth the CPU.
    fn compresses(self) -> bool {
        matches!(self, Self::Corpus | Self::Trie | Self::Semantic)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NamespaceStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

type LoadResult = std::result::Result<Arc<Vec<u8>>, String>;
type SharedLoad = Shared<BoxFuture<'static, LoadResult>>;

pub struct CacheManager {
    memory: memory::MemoryCache,
    disk: disk::DiskCache,
    in_flight: Mutex<HashMap<(Namespace, String), SharedLoad>>,
    stats: Mutex<HashMap<Namespace, NamespaceStats>>,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf, capacities: CacheCapacities) -> Self {
        Self {
            memory: memory::MemoryCache::new(move |ns| ns.capacity(&capacities)),
            disk: disk::DiskCache::new(cache_dir),
            in_flight: Mutex::new(HashMap::new()),
            stats: Mutex::new(Namespace::ALL.iter().map(|&ns| (ns, NamespaceStats::default())).collect()),
        }
    }

    async fn record_hit(&self, ns: Namespace) {
        self.stats.lock().await.entry(ns).or_default().hits += 1;
    }

    async fn record_miss(&self, ns: Namespace) {
        self.stats.lock().await.entry(ns).or_default().misses += 1;
    }

    async fn record_eviction(&self, ns: Namespace) {
        self.stats.lock().await.entry(ns).or_default().evictions += 1;
    }

    /// L1, then L2 (promoting an L2 hit back into L1). Returns `None` on a
    /// clean miss; deserialization failures are treated as misses rather
    /// than surfaced, since a corrupt cache entry must never break a query.
    pub async fn get<T: DeserializeOwned>(&self, ns: Namespace, key: &str) -> Option<T> {
        if let Some(bytes) = self.memory.get(ns, key).await {
            self.record_hit(ns).await;
            return postcard::from_bytes(&bytes).ok();
        }

        if let Some(bytes) = self.disk.get(ns, key).await {
            self.record_hit(ns).await;
            self.memory.set(ns, key.to_string(), Arc::new(bytes.clone())).await;
            return postcard::from_bytes(&bytes).ok();
        }

        self.record_miss(ns).await;
        None
    }

    /// Write through to both tiers.
    pub async fn set<T: Serialize>(&self, ns: Namespace, key: &str, value: &T) -> Result<()> {
        let bytes = postcard::to_stdvec(value)
            .map_err(|e| CoreError::from(TransientError::CacheUnavailable(e.to_string())))?;

        let evicted = self.memory.set(ns, key.to_string(), Arc::new(bytes.clone())).await;
        if evicted {
            self.record_eviction(ns).await;
        }

        self.disk
            .set(ns, key, bytes, ns.compresses())
            .await
            .map_err(|e| CoreError::from(TransientError::CacheUnavailable(format!("{e:#}"))))
    }

    pub async fn invalidate(&self, ns: Namespace, key: &str) {
        self.memory.invalidate(ns, key).await;
        self.disk.invalidate(ns, key).await;
    }

    pub async fn clear(&self, ns: Namespace) {
        self.memory.clear(ns).await;
        self.disk.clear(ns).await;
    }

    pub async fn get_stats(&self) -> HashMap<Namespace, NamespaceStats> {
        self.stats.lock().await.clone()
    }

    /// Get-or-load, single-flighted per `(namespace, key)`: concurrent
    /// callers that miss at the same time share one invocation of `loader`
    /// rather than each recomputing it.
    pub async fn get_or_load<T, F, Fut>(&self, ns: Namespace, key: &str, loader: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        if let Some(value) = self.get::<T>(ns, key).await {
            return Ok(value);
        }

        let map_key = (ns, key.to_string());

        // Check-and-insert happens inside one lock acquisition (no `.await`
        // in the closure) so concurrent misses on the same key can only
        // ever create one shared future; every other caller just clones it.
        let shared = {
            let mut in_flight = self.in_flight.lock().await;
            in_flight
                .entry(map_key.clone())
                .or_insert_with(|| {
                    let fut: BoxFuture<'static, LoadResult> = Box::pin(async move {
                        let value = loader().await.map_err(|e| e.to_string())?;
                        postcard::to_stdvec(&value)
                            .map(Arc::new)
                            .map_err(|e| e.to_string())
                    });
                    fut.shared()
                })
                .clone()
        };

        let result = shared.await;
        self.in_flight.lock().await.remove(&map_key);

        let bytes = result.map_err(|e| CoreError::from(TransientError::CacheUnavailable(e)))?;
        let value: T = postcard::from_bytes(&bytes)
            .map_err(|e| CoreError::from(TransientError::CacheUnavailable(e.to_string())))?;

        self.set(ns, key, &value).await?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn manager() -> (CacheManager, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let manager = CacheManager::new(dir.path().to_path_buf(), CacheCapacities::default());
        (manager, dir)
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let (cache, _dir) = manager();
        cache.set(Namespace::Search, "q1", &42u32).await.unwrap();
        check!(cache.get::<u32>(Namespace::Search, "q1").await == Some(42));
    }

    #[tokio::test]
    async fn miss_then_hit_updates_stats() {
        let (cache, _dir) = manager();
        check!(cache.get::<u32>(Namespace::Search, "absent").await.is_none());
        cache.set(Namespace::Search, "absent", &7u32).await.unwrap();
        cache.get::<u32>(Namespace::Search, "absent").await;

        let stats = cache.get_stats().await;
        let s = stats[&Namespace::Search];
        check!(s.misses >= 1);
        check!(s.hits >= 1);
    }

    #[tokio::test]
    async fn get_or_load_invokes_loader_once_on_concurrent_miss() {
        let (cache, _dir) = manager();
        let cache = Arc::new(cache);
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_load(Namespace::Corpus, "k", move || {
                        let calls = calls.clone();
                        async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                            Ok::<u32, CoreError>(99)
                        }
                    })
                    .await
            }));
        }

        for h in handles {
            check!(h.await.unwrap().unwrap() == 99);
        }
        check!(calls.load(Ordering::SeqCst) == 1);
    }
}
