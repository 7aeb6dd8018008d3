//! Application context
//!
//! Owns every long-lived service. Built once per process; nothing in the
//! crate reaches for globals.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::{CacheStore, RedisTier, SharedTier};
use crate::cli::Cli;
use crate::config::{CacheConfig, Config};
use crate::directory::{DirectoryAdmin, DirectoryListings};
use crate::error::Result;
use crate::invalidation::InvalidationCoordinator;
use crate::search::{SearchHit, SearchIndex, search};
use crate::storage::Database;

pub struct AppContext {
    pub config: Config,
    pub config_path: Option<PathBuf>,
    pub db: Database,
    pub cache: Arc<CacheStore>,
    pub index: Arc<SearchIndex>,
    pub coordinator: InvalidationCoordinator,
    pub listings: DirectoryListings,
    pub robot_mode: bool,
    pub verbosity: u8,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("db", &self.db)
            .field("cache", &self.cache)
            .field("robot_mode", &self.robot_mode)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = Config::load(cli.config.as_deref())?;
        if let Some(db) = &cli.db {
            config.storage.db_path.clone_from(db);
        }

        let db = Database::open(&config.storage.db_path)?;
        debug!(path = %config.storage.db_path.display(), "database opened");
        let shared = connect_shared_tier(&config.cache);

        let mut ctx = Self::with_parts(config, db, shared)?;
        ctx.config_path.clone_from(&cli.config);
        ctx.robot_mode = cli.json;
        ctx.verbosity = cli.verbose;
        Ok(ctx)
    }

    /// Assemble the services around an already-open database and an
    /// optional shared tier.
    pub fn with_parts(
        config: Config,
        db: Database,
        shared: Option<Arc<dyn SharedTier>>,
    ) -> Result<Self> {
        let cache = Arc::new(CacheStore::new(
            config.cache.namespace.clone(),
            config.cache.ttl(),
            shared,
        )?);
        let index = Arc::new(SearchIndex::new());
        let coordinator = InvalidationCoordinator::new(Arc::clone(&cache), Arc::clone(&index));
        let listings = DirectoryListings::new(Arc::clone(&cache));

        Ok(Self {
            config,
            config_path: None,
            db,
            cache,
            index,
            coordinator,
            listings,
            robot_mode: false,
            verbosity: 0,
        })
    }

    pub const fn admin(&self) -> DirectoryAdmin<'_> {
        DirectoryAdmin::new(&self.db, &self.coordinator)
    }

    /// Search with the configured result cap, or `limit` if given.
    pub fn search(&self, query: &str, limit: Option<usize>) -> Result<Vec<SearchHit>> {
        let limit = limit.unwrap_or(self.config.search.max_results);
        search(&self.index, &self.db, query, limit)
    }
}

/// Build the shared tier from config. Absent or malformed URLs fall back to
/// local-only caching; an unreachable server yields a tier that re-probes.
pub fn connect_shared_tier(config: &CacheConfig) -> Option<Arc<dyn SharedTier>> {
    let Some(url) = config.redis_url.as_deref() else {
        info!("no shared cache configured, using local cache only");
        return None;
    };
    match RedisTier::connect(url, config.timeout(), config.reprobe_interval()) {
        Ok(tier) => Some(Arc::new(tier)),
        Err(err) => {
            warn!(error = %err, "invalid shared cache url, using local cache only");
            None
        }
    }
}
