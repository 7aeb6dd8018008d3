pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod directory;
pub mod error;
pub mod invalidation;
pub mod search;
pub mod storage;
pub mod test_utils;

pub use error::{DirError, Result};

/// Package version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
