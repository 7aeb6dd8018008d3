//! Per-process search index over directory entries
//!
//! The index is a derived projection of the backing store: every entry's
//! name normalized, affix-stripped and split into words once, so a query
//! only has to be normalized once and then compared against precomputed
//! forms.
//!
//! Staleness is detected two ways:
//! - a cheap count check against the live row count (`generation_token`)
//! - an explicit [`SearchIndex::invalidate`] call after content writes,
//!   which catches in-place renames and relinks the count cannot see
//!
//! A rebuild produces a fresh [`IndexSnapshot`] and swaps it in under a
//! write lock. Callers hold an `Arc` to the snapshot they were given, so an
//! in-flight search keeps a complete index even while a newer one is
//! installed.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::search::affix::strip_affixes;
use crate::search::normalize::normalize;

/// One searchable leader record as read from the backing store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    pub entry_id: i64,
    pub display_name: String,
    pub parent_id: Option<i64>,
    /// Display name of the linked location, if any
    pub parent_name: Option<String>,
}

/// Precomputed match forms of one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedEntry {
    pub entry_id: i64,
    pub parent_id: Option<i64>,
    pub display_name: String,
    pub parent_name: Option<String>,
    pub normalized_name: String,
    pub stripped_name: String,
    pub normalized_words: Vec<String>,
    pub stripped_words: Vec<String>,
}

impl IndexedEntry {
    pub fn from_entry(entry: DirectoryEntry) -> Self {
        let normalized_name = normalize(&entry.display_name);
        let stripped_name = strip_affixes(&normalized_name);
        let normalized_words = words(&normalized_name);
        let stripped_words = words(&stripped_name);
        Self {
            entry_id: entry.entry_id,
            parent_id: entry.parent_id,
            display_name: entry.display_name,
            parent_name: entry.parent_name,
            normalized_name,
            stripped_name,
            normalized_words,
            stripped_words,
        }
    }
}

pub(crate) fn words(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_owned).collect()
}

/// Read access to the backing store needed to build the index.
pub trait EntrySource {
    /// Live number of directory entries.
    fn entry_count(&self) -> Result<u64>;

    /// Every entry joined with its location, in the store's natural order.
    fn load_entries(&self) -> Result<Vec<DirectoryEntry>>;
}

/// A fully built index.
#[derive(Debug)]
pub struct IndexSnapshot {
    pub entries: Vec<IndexedEntry>,
    /// Row count observed when this snapshot was built
    pub generation_token: u64,
    pub built_at: DateTime<Utc>,
}

impl IndexSnapshot {
    fn build(entries: Vec<DirectoryEntry>, generation_token: u64) -> Self {
        Self {
            entries: entries.into_iter().map(IndexedEntry::from_entry).collect(),
            generation_token,
            built_at: Utc::now(),
        }
    }
}

struct Slot {
    snapshot: Option<Arc<IndexSnapshot>>,
    /// Bumped by every invalidation; a rebuild only installs its snapshot if
    /// no invalidation happened while it was loading.
    epoch: u64,
}

/// Lazily rebuilt, explicitly invalidated search index.
pub struct SearchIndex {
    slot: RwLock<Slot>,
    rebuilds: AtomicU64,
}

impl std::fmt::Debug for SearchIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchIndex")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl Default for SearchIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchIndex {
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(Slot {
                snapshot: None,
                epoch: 0,
            }),
            rebuilds: AtomicU64::new(0),
        }
    }

    /// Current index, rebuilding it first if it is missing or its
    /// generation token no longer matches the live row count.
    ///
    /// A failed count or load is returned as an error; the previously
    /// installed snapshot is left untouched but not served for this call.
    pub fn get_index<S>(&self, source: &S) -> Result<Arc<IndexSnapshot>>
    where
        S: EntrySource + ?Sized,
    {
        let live_count = source.entry_count()?;

        let epoch = {
            let slot = self.slot.read();
            if let Some(snapshot) = &slot.snapshot {
                if snapshot.generation_token == live_count {
                    return Ok(Arc::clone(snapshot));
                }
                debug!(
                    cached = snapshot.generation_token,
                    live = live_count,
                    "search index count mismatch"
                );
            }
            slot.epoch
        };

        let entries = source.load_entries()?;
        let snapshot = Arc::new(IndexSnapshot::build(entries, live_count));
        self.rebuilds.fetch_add(1, Ordering::Relaxed);

        let mut slot = self.slot.write();
        if slot.epoch == epoch {
            slot.snapshot = Some(Arc::clone(&snapshot));
            info!(
                entries = snapshot.entries.len(),
                generation = live_count,
                "search index rebuilt"
            );
        } else {
            debug!("search index invalidated during rebuild; not installing");
        }
        Ok(snapshot)
    }

    /// Drop the installed snapshot so the next [`get_index`](Self::get_index)
    /// rebuilds regardless of the row count.
    pub fn invalidate(&self) {
        let mut slot = self.slot.write();
        slot.snapshot = None;
        slot.epoch = slot.epoch.wrapping_add(1);
        debug!(epoch = slot.epoch, "search index invalidated");
    }

    pub fn stats(&self) -> IndexStats {
        let slot = self.slot.read();
        IndexStats {
            entries: slot.snapshot.as_ref().map(|s| s.entries.len()),
            generation_token: slot.snapshot.as_ref().map(|s| s.generation_token),
            built_at: slot.snapshot.as_ref().map(|s| s.built_at),
            rebuilds: self.rebuilds.load(Ordering::Relaxed),
        }
    }
}

/// Index statistics
#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    /// Entries in the installed snapshot, `None` when nothing is installed
    pub entries: Option<usize>,
    pub generation_token: Option<u64>,
    pub built_at: Option<DateTime<Utc>>,
    /// Rebuilds performed by this process
    pub rebuilds: u64,
}
