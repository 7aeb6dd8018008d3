//! SQLite database layer

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};

use crate::error::{DirError, Result};
use crate::search::index::{DirectoryEntry, EntrySource};
use crate::search::normalize;
use crate::storage::migrations;

/// SQLite database wrapper for the leader directory
pub struct Database {
    conn: Connection,
    schema_version: u32,
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("schema_version", &self.schema_version)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub id: i64,
    pub name: String,
    pub district: String,
    pub area: String,
    pub map_link: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields accepted when creating or updating a location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationDraft {
    pub name: String,
    pub district: String,
    pub area: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_link: Option<String>,
}

impl LocationDraft {
    fn validate(&self) -> Result<()> {
        require_text("location name", &self.name)?;
        require_text("district", &self.district)?;
        require_text("area", &self.area)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub id: i64,
    pub name: String,
    pub location_id: Option<i64>,
    pub audio_sample: Option<String>,
    pub verified_at: Option<String>,
    pub verified_by: Option<String>,
    pub created_at: String,
}

/// Entry as shown under its location in a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedEntry {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_sample: Option<String>,
}

/// A location together with every entry linked to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationListing {
    pub id: i64,
    pub name: String,
    pub district: String,
    pub area: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_link: Option<String>,
    pub entries: Vec<LinkedEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Pending,
    Approved,
    Rejected,
}

impl ChangeStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeStatus {
    type Err = DirError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(DirError::InvalidArgument(format!(
                "unknown change request status: {other}"
            ))),
        }
    }
}

/// What a change request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Add a location that is not in the directory yet, optionally with
    /// its leader.
    NewLocation,
    /// Replace the leader at an existing location.
    LeaderChange,
}

impl ChangeKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NewLocation => "new_location",
            Self::LeaderChange => "leader_change",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeKind {
    type Err = DirError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "new_location" => Ok(Self::NewLocation),
            "leader_change" => Ok(Self::LeaderChange),
            other => Err(DirError::InvalidArgument(format!(
                "unknown change request kind: {other}"
            ))),
        }
    }
}

/// A community proposal, either a new location or a different leader at an
/// existing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub id: i64,
    pub kind: ChangeKind,
    /// Set at submission for leader changes and on approval for new
    /// locations.
    pub location_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_location: Option<LocationDraft>,
    pub current_entry_id: Option<i64>,
    pub proposed_entry_id: Option<i64>,
    pub proposed_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposed_audio: Option<String>,
    pub notes: Option<String>,
    pub submitted_by: String,
    pub status: ChangeStatus,
    pub reject_reason: Option<String>,
    pub created_at: String,
    pub reviewed_at: Option<String>,
    pub reviewed_by: Option<String>,
}

/// Fields accepted when submitting a change request.
///
/// Exactly one of `location_id` or `new_location` names the location. At
/// most one of `proposed_entry_id` or `proposed_name` names the incoming
/// leader; a leader change needs one, a new location may leave both empty.
/// `proposed_audio` goes with `proposed_name`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeProposal {
    pub location_id: Option<i64>,
    pub new_location: Option<LocationDraft>,
    pub proposed_entry_id: Option<i64>,
    pub proposed_name: Option<String>,
    pub proposed_audio: Option<String>,
    pub notes: Option<String>,
    pub submitted_by: String,
}

const LOCATION_COLUMNS: &str = "id, name, district, area, map_link, created_at, updated_at";
const ENTRY_COLUMNS: &str =
    "id, name, location_id, audio_sample, verified_at, verified_by, created_at";
const CHANGE_COLUMNS: &str = "id, kind, location_id, location_name, location_district, \
     location_area, location_map_link, current_entry_id, proposed_entry_id, proposed_name, \
     proposed_audio, notes, submitted_by, status, reject_reason, created_at, reviewed_at, \
     reviewed_by";

impl Database {
    /// Open database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        Self::configure_pragmas(&conn)?;
        let schema_version = migrations::run_migrations(&conn)?;

        Ok(Self {
            conn,
            schema_version,
        })
    }

    /// Private in-memory database, mostly for tests and benches.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let schema_version = migrations::run_migrations(&conn)?;
        Ok(Self {
            conn,
            schema_version,
        })
    }

    /// Get a reference to the connection
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Current schema version after migrations.
    pub const fn schema_version(&self) -> u32 {
        self.schema_version
    }

    // ---------------------------------------------------------------------
    // Locations
    // ---------------------------------------------------------------------

    pub fn create_location(&self, draft: &LocationDraft) -> Result<LocationRecord> {
        draft.validate()?;
        let now = now_rfc3339();
        self.conn.execute(
            "INSERT INTO locations (name, district, area, map_link, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                draft.name.trim(),
                draft.district.trim(),
                draft.area.trim(),
                draft.map_link.as_deref(),
                now,
                now
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.require_location(id)
    }

    pub fn update_location(&self, id: i64, draft: &LocationDraft) -> Result<LocationRecord> {
        draft.validate()?;
        let changed = self.conn.execute(
            "UPDATE locations SET name = ?, district = ?, area = ?, map_link = ?, updated_at = ? \
             WHERE id = ?",
            params![
                draft.name.trim(),
                draft.district.trim(),
                draft.area.trim(),
                draft.map_link.as_deref(),
                now_rfc3339(),
                id
            ],
        )?;
        if changed == 0 {
            return Err(location_not_found(id));
        }
        self.require_location(id)
    }

    /// Delete a location. Linked entries stay in the directory, unlinked.
    pub fn delete_location(&self, id: i64) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM locations WHERE id = ?", [id])?;
        if changed == 0 {
            return Err(location_not_found(id));
        }
        Ok(())
    }

    pub fn get_location(&self, id: i64) -> Result<Option<LocationRecord>> {
        let sql = format!("SELECT {LOCATION_COLUMNS} FROM locations WHERE id = ?");
        Ok(self
            .conn
            .query_row(&sql, [id], location_from_row)
            .optional()?)
    }

    fn require_location(&self, id: i64) -> Result<LocationRecord> {
        self.get_location(id)?
            .ok_or_else(|| location_not_found(id))
    }

    /// Every location with its linked entries, ordered by area then name.
    pub fn list_locations_with_entries(&self) -> Result<Vec<LocationListing>> {
        let mut linked: HashMap<i64, Vec<LinkedEntry>> = HashMap::new();
        let mut stmt = self.conn.prepare(
            "SELECT id, name, audio_sample, location_id FROM entries \
             WHERE location_id IS NOT NULL ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(3)?,
                LinkedEntry {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    audio_sample: row.get(2)?,
                },
            ))
        })?;
        for row in rows {
            let (location_id, entry) = row?;
            linked.entry(location_id).or_default().push(entry);
        }

        let sql = format!("SELECT {LOCATION_COLUMNS} FROM locations ORDER BY area, name, id");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], location_from_row)?;
        let mut results = Vec::new();
        for row in rows {
            let location = row?;
            results.push(LocationListing {
                entries: linked.remove(&location.id).unwrap_or_default(),
                id: location.id,
                name: location.name,
                district: location.district,
                area: location.area,
                map_link: location.map_link,
            });
        }
        Ok(results)
    }

    /// Locations narrowed by exact `area` and `district`, then by `query`
    /// as a normalized substring of the location name, its district or the
    /// name of any linked entry. Blank filters are ignored. Ordered by name.
    pub fn search_locations(
        &self,
        area: Option<&str>,
        district: Option<&str>,
        query: Option<&str>,
    ) -> Result<Vec<LocationListing>> {
        let area = non_blank(area);
        let district = non_blank(district);
        let needle = non_blank(query).map(normalize).filter(|q| !q.is_empty());

        let mut results: Vec<LocationListing> = self
            .list_locations_with_entries()?
            .into_iter()
            .filter(|location| area.is_none_or(|area| location.area == area))
            .filter(|location| district.is_none_or(|district| location.district == district))
            .filter(|location| {
                needle.as_deref().is_none_or(|needle| {
                    normalize(&location.name).contains(needle)
                        || normalize(&location.district).contains(needle)
                        || location
                            .entries
                            .iter()
                            .any(|entry| normalize(&entry.name).contains(needle))
                })
            })
            .collect();
        results.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(results)
    }

    /// Distinct areas, sorted.
    pub fn list_areas(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT area FROM locations ORDER BY area")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        collect_rows(rows)
    }

    /// Distinct districts, sorted, optionally restricted to one area.
    pub fn list_districts(&self, area: Option<&str>) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT district FROM locations \
             WHERE ?1 IS NULL OR area = ?1 ORDER BY district",
        )?;
        let rows = stmt.query_map([area], |row| row.get(0))?;
        collect_rows(rows)
    }

    // ---------------------------------------------------------------------
    // Entries
    // ---------------------------------------------------------------------

    pub fn create_entry(&self, name: &str, location_id: Option<i64>) -> Result<EntryRecord> {
        self.create_entry_with_audio(name, location_id, None)
    }

    /// Create an entry with a link to a recitation sample.
    pub fn create_entry_with_audio(
        &self,
        name: &str,
        location_id: Option<i64>,
        audio_sample: Option<&str>,
    ) -> Result<EntryRecord> {
        require_text("entry name", name)?;
        if let Some(location_id) = location_id {
            self.require_location(location_id)?;
        }
        self.conn.execute(
            "INSERT INTO entries (name, location_id, audio_sample, created_at) \
             VALUES (?, ?, ?, ?)",
            params![name.trim(), location_id, non_blank(audio_sample), now_rfc3339()],
        )?;
        let id = self.conn.last_insert_rowid();
        self.require_entry(id)
    }

    pub fn get_entry(&self, id: i64) -> Result<Option<EntryRecord>> {
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE id = ?");
        Ok(self
            .conn
            .query_row(&sql, [id], entry_from_row)
            .optional()?)
    }

    fn require_entry(&self, id: i64) -> Result<EntryRecord> {
        self.get_entry(id)?.ok_or_else(|| entry_not_found(id))
    }

    /// Rename in place. The row count does not change.
    pub fn rename_entry(&self, id: i64, name: &str) -> Result<()> {
        require_text("entry name", name)?;
        let changed = self.conn.execute(
            "UPDATE entries SET name = ? WHERE id = ?",
            params![name.trim(), id],
        )?;
        if changed == 0 {
            return Err(entry_not_found(id));
        }
        Ok(())
    }

    /// Link an entry to a location, or unlink it with `None`.
    pub fn link_entry(&self, id: i64, location_id: Option<i64>) -> Result<()> {
        if let Some(location_id) = location_id {
            self.require_location(location_id)?;
        }
        let changed = self.conn.execute(
            "UPDATE entries SET location_id = ? WHERE id = ?",
            params![location_id, id],
        )?;
        if changed == 0 {
            return Err(entry_not_found(id));
        }
        Ok(())
    }

    pub fn delete_entry(&self, id: i64) -> Result<()> {
        let changed = self.conn.execute("DELETE FROM entries WHERE id = ?", [id])?;
        if changed == 0 {
            return Err(entry_not_found(id));
        }
        Ok(())
    }

    /// Replace the audio sample link, or clear it with `None`.
    pub fn set_audio_sample(&self, id: i64, audio_sample: Option<&str>) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE entries SET audio_sample = ? WHERE id = ?",
            params![non_blank(audio_sample), id],
        )?;
        if changed == 0 {
            return Err(entry_not_found(id));
        }
        Ok(())
    }

    /// Stamp an entry as checked by `verified_by`.
    pub fn mark_verified(&self, id: i64, verified_by: &str) -> Result<()> {
        require_text("verifier", verified_by)?;
        let changed = self.conn.execute(
            "UPDATE entries SET verified_at = ?, verified_by = ? WHERE id = ?",
            params![now_rfc3339(), verified_by.trim(), id],
        )?;
        if changed == 0 {
            return Err(entry_not_found(id));
        }
        Ok(())
    }

    pub fn count_entries(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// Every entry left-joined to its location, ordered by entry id.
    pub fn load_directory_entries(&self) -> Result<Vec<DirectoryEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT e.id, e.name, e.location_id, l.name \
             FROM entries e LEFT JOIN locations l ON l.id = e.location_id \
             ORDER BY e.id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(DirectoryEntry {
                entry_id: row.get(0)?,
                display_name: row.get(1)?,
                parent_id: row.get(2)?,
                parent_name: row.get(3)?,
            })
        })?;
        collect_rows(rows)
    }

    // ---------------------------------------------------------------------
    // Change requests
    // ---------------------------------------------------------------------

    /// Record a pending proposal. For a leader change the entry currently
    /// linked to the location is captured so reviewers see who would be
    /// replaced.
    pub fn submit_change_request(&self, proposal: &ChangeProposal) -> Result<ChangeRequest> {
        require_text("submitter", &proposal.submitted_by)?;
        let kind = match (proposal.location_id, proposal.new_location.as_ref()) {
            (Some(_), None) => ChangeKind::LeaderChange,
            (None, Some(draft)) => {
                draft.validate()?;
                ChangeKind::NewLocation
            }
            (Some(_), Some(_)) => {
                return Err(DirError::InvalidArgument(
                    "give either an existing location or a new one, not both".to_string(),
                ));
            }
            (None, None) => {
                return Err(DirError::InvalidArgument(
                    "a change request needs a location id or a new location".to_string(),
                ));
            }
        };

        let proposed_name = non_blank(proposal.proposed_name.as_deref());
        let proposed_audio = non_blank(proposal.proposed_audio.as_deref());
        match (proposal.proposed_entry_id, proposed_name) {
            (Some(_), Some(_)) => {
                return Err(DirError::InvalidArgument(
                    "give either a proposed entry id or a name, not both".to_string(),
                ));
            }
            (None, None) if kind == ChangeKind::LeaderChange => {
                return Err(DirError::InvalidArgument(
                    "a change request needs a proposed entry id or name".to_string(),
                ));
            }
            (Some(entry_id), None) => {
                self.require_entry(entry_id)?;
            }
            _ => {}
        }
        if proposed_audio.is_some() && proposed_name.is_none() {
            return Err(DirError::InvalidArgument(
                "an audio sample needs a proposed name".to_string(),
            ));
        }

        let current_entry_id = match proposal.location_id {
            Some(location_id) => {
                self.require_location(location_id)?;
                self.current_entry_for(location_id)?
            }
            None => None,
        };
        let draft = proposal.new_location.as_ref();
        self.conn.execute(
            "INSERT INTO change_requests \
             (kind, location_id, location_name, location_district, location_area, \
              location_map_link, current_entry_id, proposed_entry_id, proposed_name, \
              proposed_audio, notes, submitted_by, status, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                kind.as_str(),
                proposal.location_id,
                draft.map(|d| d.name.trim()),
                draft.map(|d| d.district.trim()),
                draft.map(|d| d.area.trim()),
                draft.and_then(|d| non_blank(d.map_link.as_deref())),
                current_entry_id,
                proposal.proposed_entry_id,
                proposed_name,
                proposed_audio,
                non_blank(proposal.notes.as_deref()),
                proposal.submitted_by.trim(),
                ChangeStatus::Pending.as_str(),
                now_rfc3339()
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.require_change_request(id)
    }

    pub fn get_change_request(&self, id: i64) -> Result<Option<ChangeRequest>> {
        let sql = format!("SELECT {CHANGE_COLUMNS} FROM change_requests WHERE id = ?");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(change_request_from_row(row)?));
        }
        Ok(None)
    }

    fn require_change_request(&self, id: i64) -> Result<ChangeRequest> {
        self.get_change_request(id)?
            .ok_or_else(|| DirError::NotFound(format!("change request {id}")))
    }

    /// Newest first, optionally filtered by status.
    pub fn list_change_requests(&self, status: Option<ChangeStatus>) -> Result<Vec<ChangeRequest>> {
        let sql = format!(
            "SELECT {CHANGE_COLUMNS} FROM change_requests \
             WHERE ?1 IS NULL OR status = ?1 ORDER BY created_at DESC, id DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([status.map(ChangeStatus::as_str)])?;
        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            results.push(change_request_from_row(row)?);
        }
        Ok(results)
    }

    /// Apply a pending proposal in one transaction.
    ///
    /// A new-location request creates the location from its draft. A leader
    /// change unlinks the location's current entry. Either way the proposed
    /// entry is then linked, or created from the proposed name, and the
    /// request is marked approved. A leader change whose proposed entry was
    /// deleted fails with `Conflict` and nothing changes.
    ///
    /// The returned request has `location_id` and `proposed_entry_id` set to
    /// the rows that are now linked.
    pub fn approve_change_request(&self, id: i64, reviewed_by: &str) -> Result<ChangeRequest> {
        require_text("reviewer", reviewed_by)?;
        // The helpers below share this connection, so they run inside tx.
        let tx = self.conn.unchecked_transaction()?;

        let request = self.require_pending(id)?;
        let location_id = match (request.kind, request.location_id) {
            (ChangeKind::NewLocation, _) => {
                let draft = request.new_location.as_ref().ok_or_else(|| {
                    DirError::Conflict(format!("change request {id} has no location draft"))
                })?;
                self.create_location(draft)?.id
            }
            (ChangeKind::LeaderChange, Some(location_id)) => {
                self.require_location(location_id)?;
                if let Some(current) = self.current_entry_for(location_id)? {
                    tx.execute(
                        "UPDATE entries SET location_id = NULL WHERE id = ?",
                        [current],
                    )?;
                }
                location_id
            }
            (ChangeKind::LeaderChange, None) => {
                return Err(DirError::Conflict(format!(
                    "change request {id} has no location"
                )));
            }
        };

        let linked_id = match (request.proposed_entry_id, request.proposed_name.as_deref()) {
            (Some(entry_id), _) => {
                let changed = tx.execute(
                    "UPDATE entries SET location_id = ? WHERE id = ?",
                    params![location_id, entry_id],
                )?;
                if changed == 0 {
                    return Err(entry_not_found(entry_id));
                }
                Some(entry_id)
            }
            (None, Some(name)) => Some(
                self.create_entry_with_audio(
                    name,
                    Some(location_id),
                    request.proposed_audio.as_deref(),
                )?
                .id,
            ),
            (None, None) if request.kind == ChangeKind::NewLocation => None,
            (None, None) => {
                return Err(DirError::Conflict(format!(
                    "change request {id} has no proposed entry"
                )));
            }
        };

        tx.execute(
            "UPDATE change_requests SET status = ?, location_id = ?, proposed_entry_id = ?, \
             reviewed_at = ?, reviewed_by = ? WHERE id = ?",
            params![
                ChangeStatus::Approved.as_str(),
                location_id,
                linked_id,
                now_rfc3339(),
                reviewed_by.trim(),
                id
            ],
        )?;
        tx.commit()?;

        self.require_change_request(id)
    }

    /// Close a pending proposal without touching directory content.
    pub fn reject_change_request(
        &self,
        id: i64,
        reviewed_by: &str,
        reason: Option<&str>,
    ) -> Result<ChangeRequest> {
        require_text("reviewer", reviewed_by)?;
        self.require_pending(id)?;
        let reason = reason.map(str::trim).filter(|reason| !reason.is_empty());
        self.conn.execute(
            "UPDATE change_requests SET status = ?, reject_reason = ?, reviewed_at = ?, \
             reviewed_by = ? WHERE id = ?",
            params![
                ChangeStatus::Rejected.as_str(),
                reason,
                now_rfc3339(),
                reviewed_by.trim(),
                id
            ],
        )?;
        self.require_change_request(id)
    }

    fn require_pending(&self, id: i64) -> Result<ChangeRequest> {
        let request = self.require_change_request(id)?;
        if request.status != ChangeStatus::Pending {
            return Err(DirError::Conflict(format!(
                "change request {id} is already {}",
                request.status
            )));
        }
        Ok(request)
    }

    fn current_entry_for(&self, location_id: i64) -> Result<Option<i64>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id FROM entries WHERE location_id = ? ORDER BY id LIMIT 1",
                [location_id],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn configure_pragmas(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA temp_store = MEMORY;
             PRAGMA foreign_keys = ON;",
        )?;
        Ok(())
    }
}

impl EntrySource for Database {
    fn entry_count(&self) -> Result<u64> {
        self.count_entries()
    }

    fn load_entries(&self) -> Result<Vec<DirectoryEntry>> {
        self.load_directory_entries()
    }
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Trimmed text, or `None` when absent or blank.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DirError::InvalidArgument(format!("{field} must not be empty")));
    }
    Ok(())
}

fn location_not_found(id: i64) -> DirError {
    DirError::NotFound(format!("location {id}"))
}

fn entry_not_found(id: i64) -> DirError {
    DirError::NotFound(format!("entry {id}"))
}

fn collect_rows<T>(
    rows: impl Iterator<Item = rusqlite::Result<T>>,
) -> Result<Vec<T>> {
    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

fn location_from_row(row: &Row<'_>) -> rusqlite::Result<LocationRecord> {
    Ok(LocationRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        district: row.get(2)?,
        area: row.get(3)?,
        map_link: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<EntryRecord> {
    Ok(EntryRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        location_id: row.get(2)?,
        audio_sample: row.get(3)?,
        verified_at: row.get(4)?,
        verified_by: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn change_request_from_row(row: &Row<'_>) -> Result<ChangeRequest> {
    let kind: String = row.get(1)?;
    let status: String = row.get(13)?;
    let location_name: Option<String> = row.get(3)?;
    let new_location = match location_name {
        Some(name) => Some(LocationDraft {
            name,
            district: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
            area: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
            map_link: row.get(6)?,
        }),
        None => None,
    };
    Ok(ChangeRequest {
        id: row.get(0)?,
        kind: kind.parse()?,
        location_id: row.get(2)?,
        new_location,
        current_entry_id: row.get(7)?,
        proposed_entry_id: row.get(8)?,
        proposed_name: row.get(9)?,
        proposed_audio: row.get(10)?,
        notes: row.get(11)?,
        submitted_by: row.get(12)?,
        status: status.parse()?,
        reject_reason: row.get(14)?,
        created_at: row.get(15)?,
        reviewed_at: row.get(16)?,
        reviewed_by: row.get(17)?,
    })
}
