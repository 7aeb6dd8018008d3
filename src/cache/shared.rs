//! Shared cache tier abstraction
//!
//! The shared tier is the only piece of state visible to every process
//! serving the directory. Implementations are blocking and must bound every
//! call with a short timeout; the cache store treats any error as a miss.

use std::time::Duration;

use crate::error::Result;

pub trait SharedTier: Send + Sync {
    /// Short label for status output (`redis`, `memory`).
    fn name(&self) -> &'static str;

    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace `key` with `value`, expiring after `ttl`.
    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Delete every key starting with `prefix`. Returns the number removed.
    fn delete_prefix(&self, prefix: &str) -> Result<usize>;

    fn ping(&self) -> Result<()>;
}
