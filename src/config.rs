use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::validate_prefix;
use crate::error::{DirError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

impl Config {
    /// Defaults, then the global file or the explicit one (`--config` or
    /// `IMAMDIR_CONFIG`), then environment overrides.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        Self::load_with(explicit_path, |key| std::env::var(key).ok())
    }

    /// [`Config::load`] with a custom environment lookup.
    pub fn load_with<F>(explicit_path: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| env("IMAMDIR_CONFIG").map(PathBuf::from));

        if let Some(path) = explicit {
            let patch = Self::load_patch(&path)?.ok_or_else(|| {
                DirError::MissingConfig(format!("config file {} not found", path.display()))
            })?;
            config.merge_patch(patch);
        } else if let Some(global) = Self::load_global()? {
            config.merge_patch(global);
        }

        config.apply_env_overrides(&env)?;
        config.validate()?;

        Ok(config)
    }

    /// `<config_dir>/imamdir/config.toml`
    pub fn global_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("imamdir").join("config.toml"))
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        match Self::global_path() {
            Some(path) => Self::load_patch(&path),
            None => Ok(None),
        }
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| DirError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| DirError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.storage {
            self.storage.merge(patch);
        }
        if let Some(patch) = patch.cache {
            self.cache.merge(patch);
        }
        if let Some(patch) = patch.search {
            self.search.merge(patch);
        }
    }

    fn apply_env_overrides<F>(&mut self, env: &F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = env_string(env, "IMAMDIR_DB") {
            self.storage.db_path = PathBuf::from(value);
        }

        if let Some(value) = env_string(env, "REDIS_URL") {
            self.cache.redis_url = Some(value);
        }
        if let Some(value) = env_u64(env, "CACHE_TTL")? {
            self.cache.ttl_seconds = value;
        }
        if let Some(value) = env_string(env, "IMAMDIR_CACHE_NAMESPACE") {
            self.cache.namespace = value;
        }
        if let Some(value) = env_u64(env, "IMAMDIR_CACHE_TIMEOUT_MS")? {
            self.cache.timeout_ms = value;
        }
        if let Some(value) = env_u64(env, "IMAMDIR_CACHE_REPROBE_SECONDS")? {
            self.cache.reprobe_seconds = value;
        }

        if let Some(value) = env_usize(env, "IMAMDIR_SEARCH_MAX_RESULTS")? {
            self.search.max_results = value;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        validate_prefix(&self.cache.namespace)
            .map_err(|err| DirError::Config(format!("cache.namespace: {err}")))?;
        if self.cache.ttl_seconds == 0 {
            return Err(DirError::Config("cache.ttl_seconds must be positive".to_string()));
        }
        if self.cache.timeout_ms == 0 {
            return Err(DirError::Config("cache.timeout_ms must be positive".to_string()));
        }
        if self.search.max_results == 0 {
            return Err(DirError::Config("search.max_results must be positive".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

impl StorageConfig {
    fn merge(&mut self, patch: StoragePatch) {
        if let Some(value) = patch.db_path {
            self.db_path = value;
        }
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("imamdir")
        .join("directory.db")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Shared tier; unset means local-only caching
    #[serde(default)]
    pub redis_url: Option<String>,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub ttl_seconds: u64,
    #[serde(default)]
    pub timeout_ms: u64,
    #[serde(default)]
    pub reprobe_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            namespace: "imamdir:".to_string(),
            ttl_seconds: 300,
            timeout_ms: 2000,
            reprobe_seconds: 30,
        }
    }
}

impl CacheConfig {
    fn merge(&mut self, patch: CachePatch) {
        if let Some(value) = patch.redis_url {
            self.redis_url = Some(value);
        }
        if let Some(value) = patch.namespace {
            self.namespace = value;
        }
        if let Some(value) = patch.ttl_seconds {
            self.ttl_seconds = value;
        }
        if let Some(value) = patch.timeout_ms {
            self.timeout_ms = value;
        }
        if let Some(value) = patch.reprobe_seconds {
            self.reprobe_seconds = value;
        }
    }

    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub const fn reprobe_interval(&self) -> Duration {
        Duration::from_secs(self.reprobe_seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: crate::search::DEFAULT_MAX_RESULTS,
        }
    }
}

impl SearchConfig {
    fn merge(&mut self, patch: SearchPatch) {
        if let Some(value) = patch.max_results {
            self.max_results = value;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub storage: Option<StoragePatch>,
    pub cache: Option<CachePatch>,
    pub search: Option<SearchPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct StoragePatch {
    pub db_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CachePatch {
    pub redis_url: Option<String>,
    pub namespace: Option<String>,
    pub ttl_seconds: Option<u64>,
    pub timeout_ms: Option<u64>,
    pub reprobe_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SearchPatch {
    pub max_results: Option<usize>,
}

fn env_string<F>(env: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    env(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_u64<F>(env: &F, key: &str) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    match env_string(env, key) {
        Some(value) => value
            .parse::<u64>()
            .map(Some)
            .map_err(|err| DirError::Config(format!("invalid {key} value {value}: {err}"))),
        None => Ok(None),
    }
}

fn env_usize<F>(env: &F, key: &str) -> Result<Option<usize>>
where
    F: Fn(&str) -> Option<String>,
{
    match env_string(env, key) {
        Some(value) => value
            .parse::<usize>()
            .map(Some)
            .map_err(|err| DirError::Config(format!("invalid {key} value {value}: {err}"))),
        None => Ok(None),
    }
}
