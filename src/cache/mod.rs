//! Response cache
//!
//! [`CacheStore`] fronts an optional [`SharedTier`] (Redis in production,
//! [`MemoryTier`] in tests) with a process-local fallback map.

pub mod memory;
pub mod redis_tier;
pub mod shared;
pub mod store;

pub use memory::{CacheEntry, MemoryTier};
pub use redis_tier::RedisTier;
pub use shared::SharedTier;
pub use store::{CacheStats, CacheStore, PurgeReport, SharedStatus, validate_prefix};
