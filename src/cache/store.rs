//! Two-tier cache store
//!
//! Reads try the shared tier first; a shared hit is authoritative. A shared
//! miss or failure falls back to the process-local map. Writes go to the
//! shared tier best-effort and always to the local map, which has no TTL of
//! its own and is emptied only by [`CacheStore::delete_pattern`].
//!
//! Callers address entries by name; the store prepends its namespace, so
//! every key it writes is covered by a namespace purge.
//!
//! Shared-tier failures never surface to callers; they are logged and
//! counted. Only invalid arguments are errors.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::cache::shared::SharedTier;
use crate::error::{DirError, Result};

const GLOB_METACHARACTERS: [char; 4] = ['*', '?', '[', ']'];

pub struct CacheStore {
    namespace: String,
    default_ttl: Duration,
    shared: Option<Arc<dyn SharedTier>>,
    local: RwLock<HashMap<String, String>>,
    counters: Counters,
}

#[derive(Default)]
struct Counters {
    shared_hits: AtomicU64,
    local_hits: AtomicU64,
    misses: AtomicU64,
    shared_errors: AtomicU64,
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("namespace", &self.namespace)
            .field("default_ttl", &self.default_ttl)
            .field("shared", &self.shared.as_ref().map(|tier| tier.name()))
            .field("local_entries", &self.local.read().len())
            .finish_non_exhaustive()
    }
}

/// What a bulk delete removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
    /// Keys removed from the shared tier; `None` if it is absent or failed.
    pub shared_removed: Option<usize>,
    pub local_cleared: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SharedStatus {
    /// No shared tier configured
    Disabled,
    Online,
    Offline,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub namespace: String,
    pub default_ttl_secs: u64,
    pub shared_backend: Option<&'static str>,
    pub shared_status: SharedStatus,
    pub local_entries: usize,
    pub shared_hits: u64,
    pub local_hits: u64,
    pub misses: u64,
    pub shared_errors: u64,
}

impl CacheStore {
    pub fn new(
        namespace: impl Into<String>,
        default_ttl: Duration,
        shared: Option<Arc<dyn SharedTier>>,
    ) -> Result<Self> {
        let namespace = namespace.into();
        validate_prefix(&namespace)?;
        validate_ttl(default_ttl)?;
        Ok(Self {
            namespace,
            default_ttl,
            shared,
            local: RwLock::new(HashMap::new()),
            counters: Counters::default(),
        })
    }

    /// Store with no shared tier at all.
    pub fn local_only(namespace: impl Into<String>, default_ttl: Duration) -> Result<Self> {
        Self::new(namespace, default_ttl, None)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub const fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn has_shared_tier(&self) -> bool {
        self.shared.is_some()
    }

    /// Full cache key for `name` under this store's namespace.
    pub fn key(&self, name: &str) -> String {
        format!("{}{name}", self.namespace)
    }

    /// Value cached under `name`. The namespace is applied here; callers
    /// never build full keys themselves.
    pub fn get(&self, name: &str) -> Option<String> {
        let key = self.key(name);
        if let Some(shared) = &self.shared {
            match shared.get(&key) {
                Ok(Some(value)) => {
                    self.counters.shared_hits.fetch_add(1, Ordering::Relaxed);
                    debug!(key, "shared cache hit");
                    return Some(value);
                }
                Ok(None) => {}
                Err(err) => self.shared_failure("get", &err),
            }
        }

        let local = self.local.read().get(&key).cloned();
        if local.is_some() {
            self.counters.local_hits.fetch_add(1, Ordering::Relaxed);
            debug!(key, "local cache hit");
        } else {
            self.counters.misses.fetch_add(1, Ordering::Relaxed);
            debug!(key, "cache miss");
        }
        local
    }

    pub fn set(&self, name: &str, value: &str, ttl: Duration) -> Result<()> {
        validate_ttl(ttl)?;
        let key = self.key(name);
        if let Some(shared) = &self.shared {
            if let Err(err) = shared.set(&key, value, ttl) {
                self.shared_failure("set", &err);
            }
        }
        self.local.write().insert(key, value.to_string());
        Ok(())
    }

    /// Delete every shared key starting with `prefix` and clear the whole
    /// local map. `prefix` is a full key prefix and must lie inside the
    /// namespace.
    pub fn delete_pattern(&self, prefix: &str) -> Result<PurgeReport> {
        validate_prefix(prefix)?;
        if !prefix.starts_with(self.namespace.as_str()) {
            return Err(DirError::InvalidArgument(format!(
                "cache prefix {prefix} is outside namespace {}",
                self.namespace
            )));
        }
        let shared_removed = match &self.shared {
            Some(shared) => match shared.delete_prefix(prefix) {
                Ok(removed) => Some(removed),
                Err(err) => {
                    self.shared_failure("delete_pattern", &err);
                    None
                }
            },
            None => None,
        };

        let local_cleared = {
            let mut local = self.local.write();
            let cleared = local.len();
            local.clear();
            cleared
        };

        debug!(prefix, ?shared_removed, local_cleared, "cache purged");
        Ok(PurgeReport {
            shared_removed,
            local_cleared,
        })
    }

    /// Decode a cached JSON payload. Undecodable payloads count as a miss.
    pub fn get_json<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let raw = self.get(name)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                debug!(name, error = %err, "discarding undecodable cache payload");
                None
            }
        }
    }

    pub fn set_json<T: Serialize + ?Sized>(&self, name: &str, value: &T, ttl: Duration) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.set(name, &raw, ttl)
    }

    /// Probe the shared tier now.
    pub fn shared_status(&self) -> SharedStatus {
        match &self.shared {
            None => SharedStatus::Disabled,
            Some(shared) => match shared.ping() {
                Ok(()) => SharedStatus::Online,
                Err(_) => SharedStatus::Offline,
            },
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            namespace: self.namespace.clone(),
            default_ttl_secs: self.default_ttl.as_secs(),
            shared_backend: self.shared.as_ref().map(|tier| tier.name()),
            shared_status: self.shared_status(),
            local_entries: self.local.read().len(),
            shared_hits: self.counters.shared_hits.load(Ordering::Relaxed),
            local_hits: self.counters.local_hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            shared_errors: self.counters.shared_errors.load(Ordering::Relaxed),
        }
    }

    fn shared_failure(&self, op: &str, err: &DirError) {
        self.counters.shared_errors.fetch_add(1, Ordering::Relaxed);
        warn!(op, error = %err, "shared cache call failed, using local fallback");
    }
}

/// A bulk-delete prefix must be non-empty and free of glob metacharacters.
pub fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() {
        return Err(DirError::InvalidArgument(
            "cache prefix must not be empty".to_string(),
        ));
    }
    if prefix.contains(GLOB_METACHARACTERS) {
        return Err(DirError::InvalidArgument(format!(
            "cache prefix must not contain glob metacharacters: {prefix}"
        )));
    }
    Ok(())
}

fn validate_ttl(ttl: Duration) -> Result<()> {
    if ttl.is_zero() {
        return Err(DirError::InvalidArgument(
            "cache ttl must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
