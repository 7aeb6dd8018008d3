//! Name search over the leader directory
//!
//! Arabic-aware fuzzy matching: normalization, honorific stripping,
//! bigram similarity and a tiered ranker over a cached per-process index.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                        Raw query                               │
//! └────────────────────────────────────────────────────────────────┘
//!                                │
//!                                ▼
//!                ┌───────────────────────────────┐
//!                │ normalize.rs → affix.rs       │
//!                │ (QueryForms::parse)           │
//!                └───────────────────────────────┘
//!                                │
//!                                ▼
//! ┌──────────────────────────────┐  ┌──────────────────────────────┐
//! │   SearchIndex (index.rs)     │◀─│   EntrySource                │
//! │   count check / invalidate   │  │   (storage::Database)        │
//! └──────────────────────────────┘  └──────────────────────────────┘
//!                                │
//!                                ▼
//!                ┌───────────────────────────────┐
//!                │ ranker.rs (tiers + bigrams)   │
//!                └───────────────────────────────┘
//!                                │
//!                                ▼
//!                       Top-N SearchHit list
//! ```

pub mod affix;
pub mod engine;
pub mod index;
pub mod normalize;
pub mod ranker;
pub mod similarity;

pub use affix::strip_affixes;
pub use engine::{SearchHit, search};
pub use index::{DirectoryEntry, EntrySource, IndexSnapshot, IndexStats, IndexedEntry, SearchIndex};
pub use normalize::normalize;
pub use ranker::{DEFAULT_MAX_RESULTS, MatchCandidate, QueryForms, rank, score};
pub use similarity::bigram_similarity;
