//! Cache and index invalidation after directory writes

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::info;

use crate::cache::{CacheStore, PurgeReport};
use crate::error::Result;
use crate::search::SearchIndex;

/// Single entry point for "directory content changed".
///
/// Purges every cached payload under the store's namespace (shared tier by
/// prefix, local map wholesale) and drops the search index snapshot so the
/// next search rebuilds. Sibling processes only see the shared-tier purge;
/// their own index and local map catch up on their next count change or
/// local write.
#[derive(Debug)]
pub struct InvalidationCoordinator {
    cache: Arc<CacheStore>,
    index: Arc<SearchIndex>,
    invalidations: AtomicU64,
}

impl InvalidationCoordinator {
    pub const fn new(cache: Arc<CacheStore>, index: Arc<SearchIndex>) -> Self {
        Self {
            cache,
            index,
            invalidations: AtomicU64::new(0),
        }
    }

    pub fn invalidate_all(&self) -> Result<PurgeReport> {
        let report = self.cache.delete_pattern(self.cache.namespace())?;
        self.index.invalidate();
        self.invalidations.fetch_add(1, Ordering::Relaxed);
        info!(
            shared_removed = ?report.shared_removed,
            local_cleared = report.local_cleared,
            "directory caches invalidated"
        );
        Ok(report)
    }

    /// Number of completed `invalidate_all` calls in this process.
    pub fn invalidation_count(&self) -> u64 {
        self.invalidations.load(Ordering::Relaxed)
    }

    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    pub fn index(&self) -> &Arc<SearchIndex> {
        &self.index
    }
}
