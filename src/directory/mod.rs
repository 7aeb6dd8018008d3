//! Directory services built on the backing store and the cache

pub mod admin;
pub mod listings;

pub use admin::DirectoryAdmin;
pub use listings::{DirectoryListings, districts_key};
