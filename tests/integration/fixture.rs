use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use imamdir::app::AppContext;
use imamdir::cache::{MemoryTier, SharedTier};
use imamdir::config::Config;
use imamdir::search::SearchHit;
use imamdir::storage::Database;
use imamdir::test_utils::init_test_logging;

/// In-memory context holding exactly `names`, inserted in order.
pub fn context_with_entries(names: &[&str]) -> AppContext {
    init_test_logging();
    let db = Database::open_in_memory().expect("open db");
    for name in names {
        db.create_entry(name, None).expect("insert entry");
    }
    AppContext::with_parts(Config::default(), db, None).expect("context")
}

pub fn hit_names(hits: &[SearchHit]) -> Vec<&str> {
    hits.iter().map(|hit| hit.display_name.as_str()).collect()
}

/// A database file opened by several contexts that share one cache tier,
/// standing in for sibling processes.
pub struct SiblingFixture {
    _dir: TempDir,
    pub db_path: PathBuf,
    pub tier: Arc<MemoryTier>,
}

impl SiblingFixture {
    pub fn new() -> Self {
        init_test_logging();
        let dir = TempDir::new().expect("temp dir");
        let db_path = dir.path().join("directory.db");
        // create the schema once up front
        Database::open(&db_path).expect("create db");
        Self {
            _dir: dir,
            db_path,
            tier: Arc::new(MemoryTier::new()),
        }
    }

    pub fn process(&self) -> AppContext {
        let db = Database::open(&self.db_path).expect("open db");
        let shared: Arc<dyn SharedTier> = self.tier.clone();
        AppContext::with_parts(Config::default(), db, Some(shared)).expect("context")
    }
}
