//! Translation Cache
//!
//! Memoizes translated text per (source text, source language, target
//! language). The eviction policy is chosen by the owner; `Unbounded` keeps
//! every entry for the lifetime of the cache.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use crate::types::Language;

/// Eviction policy for the translation cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvictionPolicy {
    /// Never evict. Memory grows with every distinct input.
    Unbounded,
    /// Keep at most `capacity` entries, dropping the least recently used
    Lru { capacity: usize },
    /// LRU bounded, and entries older than `ttl` are treated as misses
    Ttl { capacity: usize, ttl: Duration },
}

impl EvictionPolicy {
    fn capacity(&self) -> Option<usize> {
        match self {
            EvictionPolicy::Unbounded => None,
            EvictionPolicy::Lru { capacity } | EvictionPolicy::Ttl { capacity, .. } => {
                Some((*capacity).max(1))
            }
        }
    }

    fn ttl(&self) -> Option<Duration> {
        match self {
            EvictionPolicy::Ttl { ttl, .. } => Some(*ttl),
            _ => None,
        }
    }
}

impl Default for EvictionPolicy {
    fn default() -> Self {
        EvictionPolicy::Unbounded
    }
}

/// Exact cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub source_code: String,
    pub source_language: Language,
    pub target_language: Language,
}

impl CacheKey {
    pub fn new(source_code: &str, source_language: &Language, target_language: &Language) -> Self {
        Self {
            source_code: source_code.to_string(),
            source_language: source_language.clone(),
            target_language: target_language.clone(),
        }
    }
}

#[derive(Debug, Clone)]
struct CachedTranslation {
    code: String,
    created_at: Instant,
}

/// Translation memo cache with a pluggable eviction policy
#[derive(Debug)]
pub struct TranslationCache {
    entries: HashMap<CacheKey, CachedTranslation>,
    /// LRU order (front = most recently used); unused when unbounded
    order: VecDeque<CacheKey>,
    policy: EvictionPolicy,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl TranslationCache {
    pub fn new(policy: EvictionPolicy) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            policy,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    pub fn unbounded() -> Self {
        Self::new(EvictionPolicy::Unbounded)
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    fn touch(&mut self, key: &CacheKey) {
        if self.policy.capacity().is_none() {
            return;
        }
        self.order.retain(|k| k != key);
        self.order.push_front(key.clone());
    }

    fn evict_if_needed(&mut self) {
        let Some(capacity) = self.policy.capacity() else {
            return;
        };
        while self.order.len() > capacity {
            if let Some(old) = self.order.pop_back() {
                self.entries.remove(&old);
                self.evictions += 1;
            }
        }
    }

    fn remove(&mut self, key: &CacheKey) {
        self.entries.remove(key);
        self.order.retain(|k| k != key);
    }

    /// Look up a translation, counting the hit or miss
    pub fn get(&mut self, key: &CacheKey) -> Option<String> {
        let expired = match (self.entries.get(key), self.policy.ttl()) {
            (None, _) => {
                self.misses += 1;
                return None;
            }
            (Some(entry), Some(ttl)) => entry.created_at.elapsed() >= ttl,
            (Some(_), None) => false,
        };

        if expired {
            self.remove(key);
            self.evictions += 1;
            self.misses += 1;
            return None;
        }

        self.hits += 1;
        self.touch(key);
        self.entries.get(key).map(|entry| entry.code.clone())
    }

    pub fn put(&mut self, key: CacheKey, code: String) {
        self.touch(&key);
        self.entries.insert(
            key,
            CachedTranslation {
                code,
                created_at: Instant::now(),
            },
        );
        self.evict_if_needed();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    pub fn capacity(&self) -> Option<usize> {
        self.policy.capacity()
    }
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: &str) -> CacheKey {
        CacheKey::new(code, &Language::Python, &Language::JavaScript)
    }

    #[test]
    fn test_unbounded_keeps_everything() {
        let mut cache = TranslationCache::unbounded();
        for i in 0..100 {
            cache.put(key(&format!("x = {}", i)), format!("x = {};", i));
        }
        assert_eq!(cache.len(), 100);
        assert_eq!(cache.capacity(), None);
        assert_eq!(cache.get(&key("x = 0")), Some("x = 0;".to_string()));
        assert_eq!(cache.evictions(), 0);
    }

    #[test]
    fn test_hit_and_miss_counters() {
        let mut cache = TranslationCache::default();
        assert!(cache.get(&key("a")).is_none());
        cache.put(key("a"), "A".to_string());
        assert_eq!(cache.get(&key("a")).as_deref(), Some("A"));
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
    }

    #[test]
    fn test_key_includes_languages() {
        let mut cache = TranslationCache::default();
        cache.put(key("a"), "A".to_string());
        let other = CacheKey::new("a", &Language::Python, &Language::Java);
        assert!(cache.get(&other).is_none());
    }

    #[test]
    fn test_lru_evicts_least_recently_used() {
        let mut cache = TranslationCache::new(EvictionPolicy::Lru { capacity: 2 });
        cache.put(key("a"), "A".to_string());
        cache.put(key("b"), "B".to_string());
        // touch "a" so "b" becomes the oldest
        assert!(cache.get(&key("a")).is_some());
        cache.put(key("c"), "C".to_string());

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&key("b")).is_none());
        assert!(cache.get(&key("a")).is_some());
        assert!(cache.get(&key("c")).is_some());
        assert_eq!(cache.evictions(), 1);
    }

    #[test]
    fn test_lru_capacity_one() {
        let mut cache = TranslationCache::new(EvictionPolicy::Lru { capacity: 1 });
        cache.put(key("a"), "A".to_string());
        cache.put(key("b"), "B".to_string());
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key("a")).is_none());
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let cache = TranslationCache::new(EvictionPolicy::Lru { capacity: 0 });
        assert_eq!(cache.capacity(), Some(1));
        assert_eq!(cache.policy().capacity(), Some(1));
    }

    #[test]
    fn test_ttl_expires_entries() {
        let mut cache = TranslationCache::new(EvictionPolicy::Ttl {
            capacity: 10,
            ttl: Duration::ZERO,
        });
        cache.put(key("a"), "A".to_string());
        assert!(cache.get(&key("a")).is_none());
        assert!(cache.is_empty());
        assert_eq!(cache.evictions(), 1);
    }

    #[test]
    fn test_ttl_fresh_entry_hits() {
        let mut cache = TranslationCache::new(EvictionPolicy::Ttl {
            capacity: 10,
            ttl: Duration::from_secs(300),
        });
        cache.put(key("a"), "A".to_string());
        assert_eq!(cache.get(&key("a")).as_deref(), Some("A"));
    }

    #[test]
    fn test_clear() {
        let mut cache = TranslationCache::new(EvictionPolicy::Lru { capacity: 4 });
        cache.put(key("a"), "A".to_string());
        cache.clear();
        assert!(cache.is_empty());
    }
}
