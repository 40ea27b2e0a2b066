//! L1: per-namespace in-memory LRU, expected sub-millisecond.

use super::Namespace;
use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct MemoryCache {
    namespaces: HashMap<Namespace, RwLock<LruCache<String, Arc<Vec<u8>>>>>,
}

impl MemoryCache {
    pub fn new(capacity_of: impl Fn(Namespace) -> usize) -> Self {
        let namespaces = Namespace::ALL
            .iter()
            .map(|&ns| {
                let capacity = NonZeroUsize::new(capacity_of(ns).max(1)).expect("capacity > 0");
                (ns, RwLock::new(LruCache::new(capacity)))
            })
            .collect();
        Self { namespaces }
    }

    fn lock(&self, ns: Namespace) -> &RwLock<LruCache<String, Arc<Vec<u8>>>> {
        self.namespaces.get(&ns).expect("namespace enumeration is exhaustive")
    }

    pub async fn get(&self, ns: Namespace, key: &str) -> Option<Arc<Vec<u8>>> {
        self.lock(ns).write().await.get(key).cloned()
    }

    /// Insert a value, returning `true` if it evicted a *different* key to
    /// make room (an update to an existing key is not an eviction).
    pub async fn set(&self, ns: Namespace, key: String, value: Arc<Vec<u8>>) -> bool {
        let mut cache = self.lock(ns).write().await;
        match cache.push(key.clone(), value) {
            Some((evicted_key, _)) => evicted_key != key,
            None => false,
        }
    }

    pub async fn invalidate(&self, ns: Namespace, key: &str) {
        self.lock(ns).write().await.pop(key);
    }

    pub async fn clear(&self, ns: Namespace) {
        self.lock(ns).write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[tokio::test]
    async fn get_set_round_trips() {
        let cache = MemoryCache::new(|_| 4);
        cache
            .set(Namespace::Search, "k".to_string(), Arc::new(vec![1, 2, 3]))
            .await;
        check!(cache.get(Namespace::Search, "k").await.as_deref() == Some(&vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn eviction_reported_when_over_capacity() {
        let cache = MemoryCache::new(|_| 1);
        let first = cache
            .set(Namespace::Search, "a".to_string(), Arc::new(vec![1]))
            .await;
        let second = cache
            .set(Namespace::Search, "b".to_string(), Arc::new(vec![2]))
            .await;
        check!(!first);
        check!(second);
        check!(cache.get(Namespace::Search, "a").await.is_none());
    }
}
