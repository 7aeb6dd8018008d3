//! Read-through cached directory listings

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::cache::CacheStore;
use crate::error::Result;
use crate::storage::{Database, LocationListing};

pub const LOCATIONS_KEY: &str = "locations";
pub const AREAS_KEY: &str = "areas";
pub const DISTRICTS_KEY: &str = "districts:";

/// Cache key name (without namespace) for the district listing of `area`.
pub fn districts_key(area: Option<&str>) -> String {
    format!("{DISTRICTS_KEY}{}", area.unwrap_or_default())
}

#[derive(Debug, Clone)]
pub struct DirectoryListings {
    cache: Arc<CacheStore>,
}

impl DirectoryListings {
    pub const fn new(cache: Arc<CacheStore>) -> Self {
        Self { cache }
    }

    /// Every location with its linked entries.
    pub fn locations(&self, db: &Database) -> Result<Vec<LocationListing>> {
        self.read_through(LOCATIONS_KEY, || db.list_locations_with_entries())
    }

    pub fn areas(&self, db: &Database) -> Result<Vec<String>> {
        self.read_through(AREAS_KEY, || db.list_areas())
    }

    /// Districts of `area`, or of every area with `None`.
    pub fn districts(&self, db: &Database, area: Option<&str>) -> Result<Vec<String>> {
        let area = area.map(str::trim).filter(|area| !area.is_empty());
        self.read_through(&districts_key(area), || db.list_districts(area))
    }

    fn read_through<T, F>(&self, name: &str, load: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T>,
    {
        if let Some(cached) = self.cache.get_json(name) {
            return Ok(cached);
        }

        let fresh = load()?;
        self.cache.set_json(name, &fresh, self.cache.default_ttl())?;
        debug!(name, "listing cached");
        Ok(fresh)
    }
}
