// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Cognigate Contributors

//! Result cache (C8) — a bounded, TTL-expiring memoization layer over the
//! policy evaluator.
//!
//! Capacity eviction uses an insertion-order `VecDeque` as an LRU ring
//! alongside the entry map. The cache is explicitly advisory: it may be
//! disabled without changing verdict correctness, only latency.

use std::collections::{HashMap, VecDeque};
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

use crate::types::{CacheableVerdict, RigorMode, TrustLevel};

const DEFAULT_CAPACITY: usize = 10_000;
const DEFAULT_TTL_SECONDS: f64 = 300.0;

fn now_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// `(plan_id, sorted policy-id list, trust_level, rigor_mode)`, per §4.8.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    plan_id: String,
    policy_ids: Vec<String>,
    trust_level: u8,
    rigor_mode: &'static str,
}

impl CacheKey {
    pub fn new(plan_id: &str, policy_ids: &[String], trust_level: TrustLevel, rigor_mode: RigorMode) -> Self {
        let mut policy_ids: Vec<String> = policy_ids.to_vec();
        policy_ids.sort();
        CacheKey {
            plan_id: plan_id.to_string(),
            policy_ids,
            trust_level: trust_level.as_u8(),
            rigor_mode: match rigor_mode {
                RigorMode::Strict => "STRICT",
                RigorMode::Standard => "STANDARD",
                RigorMode::Lite => "LITE",
            },
        }
    }
}

struct Entry {
    verdict: CacheableVerdict,
    inserted_at: f64,
}

struct Inner {
    entries: HashMap<CacheKey, Entry>,
    order: VecDeque<CacheKey>,
    capacity: usize,
    ttl_seconds: f64,
}

/// Bounded least-recently-used cache of [`CacheableVerdict`] keyed by
/// [`CacheKey`]. A miss (absent, expired, or disabled) always falls through
/// to a full policy evaluation; a hit returns the exact same semantically
/// significant fields a fresh evaluation would (T5).
pub struct ResultCache {
    inner: Mutex<Inner>,
    enabled: bool,
}

impl ResultCache {
    pub fn new(capacity: usize, ttl_seconds: f64) -> Self {
        ResultCache {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                order: VecDeque::new(),
                capacity,
                ttl_seconds,
            }),
            enabled: true,
        }
    }

    pub fn disabled() -> Self {
        ResultCache {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                order: VecDeque::new(),
                capacity: 0,
                ttl_seconds: 0.0,
            }),
            enabled: false,
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<CacheableVerdict> {
        if !self.enabled {
            return None;
        }
        let mut inner = self.inner.lock();
        let ttl = inner.ttl_seconds;
        let now = now_seconds();
        let hit = match inner.entries.get(key) {
            Some(entry) if now - entry.inserted_at <= ttl => Some(entry.verdict.clone()),
            Some(_) => None,
            None => None,
        };
        if hit.is_none() {
            inner.entries.remove(key);
        } else {
            Self::touch(&mut inner, key);
        }
        hit
    }

    pub fn put(&self, key: CacheKey, verdict: CacheableVerdict) {
        if !self.enabled {
            return;
        }
        let mut inner = self.inner.lock();
        let capacity = inner.capacity;
        if !inner.entries.contains_key(&key) {
            inner.order.push_back(key.clone());
        }
        inner.entries.insert(
            key,
            Entry {
                verdict,
                inserted_at: now_seconds(),
            },
        );
        while inner.entries.len() > capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.entries.remove(&oldest);
            } else {
                break;
            }
        }
    }

    fn touch(inner: &mut Inner, key: &CacheKey) {
        if let Some(pos) = inner.order.iter().position(|k| k == key) {
            if let Some(k) = inner.order.remove(pos) {
                inner.order.push_back(k);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL_SECONDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Action;

    fn verdict() -> CacheableVerdict {
        CacheableVerdict {
            allowed: true,
            action: Action::Allow,
            violations: Vec::new(),
            policies_evaluated: vec!["basis-core-security".to_string()],
            constraints_evaluated: 2,
            trust_impact: 0,
            requires_approval: false,
            approval_timeout: None,
            rigor_mode: RigorMode::Strict,
            modifications: None,
        }
    }

    #[test]
    fn hit_after_put() {
        let cache = ResultCache::new(10, 300.0);
        let key = CacheKey::new("plan_1", &["b".to_string(), "a".to_string()], TrustLevel::Trusted, RigorMode::Strict);
        cache.put(key.clone(), verdict());
        assert!(cache.get(&key).is_some());
    }

    #[test]
    fn policy_id_order_does_not_affect_key_equality() {
        let key_a = CacheKey::new("plan_1", &["b".to_string(), "a".to_string()], TrustLevel::Trusted, RigorMode::Strict);
        let key_b = CacheKey::new("plan_1", &["a".to_string(), "b".to_string()], TrustLevel::Trusted, RigorMode::Strict);
        assert_eq!(key_a, key_b);
    }

    #[test]
    fn miss_on_unknown_key() {
        let cache = ResultCache::new(10, 300.0);
        let key = CacheKey::new("plan_missing", &[], TrustLevel::Trusted, RigorMode::Strict);
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn capacity_eviction_drops_oldest_entry() {
        let cache = ResultCache::new(2, 300.0);
        let key1 = CacheKey::new("plan_1", &[], TrustLevel::Trusted, RigorMode::Strict);
        let key2 = CacheKey::new("plan_2", &[], TrustLevel::Trusted, RigorMode::Strict);
        let key3 = CacheKey::new("plan_3", &[], TrustLevel::Trusted, RigorMode::Strict);
        cache.put(key1.clone(), verdict());
        cache.put(key2.clone(), verdict());
        cache.put(key3.clone(), verdict());
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&key1).is_none());
        assert!(cache.get(&key3).is_some());
    }

    #[test]
    fn disabled_cache_never_hits() {
        let cache = ResultCache::disabled();
        let key = CacheKey::new("plan_1", &[], TrustLevel::Trusted, RigorMode::Strict);
        cache.put(key.clone(), verdict());
        assert!(cache.get(&key).is_none());
    }
}
