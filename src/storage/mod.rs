//! Storage layer for imamdir
//!
//! SQLite is the backing store for locations, entries and change requests.
//! The search index and cache are projections of it.

pub mod migrations;
pub mod sqlite;

pub use sqlite::{
    ChangeKind, ChangeProposal, ChangeRequest, ChangeStatus, Database, EntryRecord, LinkedEntry,
    LocationDraft, LocationListing, LocationRecord,
};
