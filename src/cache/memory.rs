//! In-process shared tier
//!
//! Behaves like a remote key-value store with per-key TTLs. One instance can
//! be handed to several [`CacheStore`](crate::cache::CacheStore)s to model
//! sibling processes sharing a tier, and it can be switched offline to
//! exercise the local fallback.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::cache::shared::SharedTier;
use crate::error::{DirError, Result};

/// One stored value with its expiry bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub key: String,
    pub value: String,
    pub written_at: Instant,
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.written_at) >= self.ttl
    }
}

#[derive(Debug)]
pub struct MemoryTier {
    entries: RwLock<HashMap<String, CacheEntry>>,
    available: AtomicBool,
}

impl Default for MemoryTier {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTier {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate the tier going down or coming back.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    /// Live (unexpired) entry for `key`, regardless of availability.
    pub fn entry(&self, key: &str) -> Option<CacheEntry> {
        let now = Instant::now();
        self.entries
            .read()
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
            .cloned()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .values()
            .filter(|entry| !entry.is_expired_at(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> Result<()> {
        if self.is_available() {
            Ok(())
        } else {
            Err(DirError::SharedCacheUnavailable(
                "memory tier is offline".to_string(),
            ))
        }
    }
}

impl SharedTier for MemoryTier {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        self.check_available()?;
        let now = Instant::now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired_at(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }
        self.entries.write().remove(key);
        Ok(None)
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.check_available()?;
        let entry = CacheEntry {
            key: key.to_string(),
            value: value.to_string(),
            written_at: Instant::now(),
            ttl,
        };
        self.entries.write().insert(key.to_string(), entry);
        Ok(())
    }

    fn delete_prefix(&self, prefix: &str) -> Result<usize> {
        self.check_available()?;
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        Ok(before - entries.len())
    }

    fn ping(&self) -> Result<()> {
        self.check_available()
    }
}
