//! Query entry point: parse, fetch the current snapshot, rank, project.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::search::index::{EntrySource, SearchIndex};
use crate::search::ranker::{QueryForms, rank};

/// One ranked search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub entry_id: i64,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    pub score: u8,
}

/// Rank the directory against `raw_query`, best first, at most `limit` hits.
///
/// A blank query (or one that strips to nothing) returns no hits without
/// touching the index or the source.
pub fn search<S>(index: &SearchIndex, source: &S, raw_query: &str, limit: usize) -> Result<Vec<SearchHit>>
where
    S: EntrySource + ?Sized,
{
    let Some(query) = QueryForms::parse(raw_query) else {
        return Ok(Vec::new());
    };

    let snapshot = index.get_index(source)?;
    let hits: Vec<SearchHit> = rank(&query, &snapshot.entries, limit)
        .into_iter()
        .map(|candidate| SearchHit {
            entry_id: candidate.entry.entry_id,
            display_name: candidate.entry.display_name.clone(),
            parent_id: candidate.entry.parent_id,
            parent_name: candidate.entry.parent_name.clone(),
            score: candidate.score,
        })
        .collect();

    debug!(
        query = %query.normalized,
        hits = hits.len(),
        generation = snapshot.generation_token,
        "search complete"
    );
    Ok(hits)
}
