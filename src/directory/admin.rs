//! Administrative writes
//!
//! Every write that changes searchable or cached content commits first and
//! then calls [`InvalidationCoordinator::invalidate_all`] exactly once.
//! Verification stamps and change-request submission or rejection leave
//! the caches alone.

use tracing::info;

use crate::error::Result;
use crate::invalidation::InvalidationCoordinator;
use crate::storage::{
    ChangeProposal, ChangeRequest, Database, EntryRecord, LocationDraft, LocationRecord,
};

#[derive(Debug, Clone, Copy)]
pub struct DirectoryAdmin<'a> {
    db: &'a Database,
    coordinator: &'a InvalidationCoordinator,
}

impl<'a> DirectoryAdmin<'a> {
    pub const fn new(db: &'a Database, coordinator: &'a InvalidationCoordinator) -> Self {
        Self { db, coordinator }
    }

    pub fn create_location(&self, draft: &LocationDraft) -> Result<LocationRecord> {
        let location = self.db.create_location(draft)?;
        self.content_changed("location created", location.id)?;
        Ok(location)
    }

    pub fn update_location(&self, id: i64, draft: &LocationDraft) -> Result<LocationRecord> {
        let location = self.db.update_location(id, draft)?;
        self.content_changed("location updated", id)?;
        Ok(location)
    }

    pub fn delete_location(&self, id: i64) -> Result<()> {
        self.db.delete_location(id)?;
        self.content_changed("location deleted", id)
    }

    pub fn create_entry(&self, name: &str, location_id: Option<i64>) -> Result<EntryRecord> {
        self.create_entry_with_audio(name, location_id, None)
    }

    pub fn create_entry_with_audio(
        &self,
        name: &str,
        location_id: Option<i64>,
        audio_sample: Option<&str>,
    ) -> Result<EntryRecord> {
        let entry = self.db.create_entry_with_audio(name, location_id, audio_sample)?;
        self.content_changed("entry created", entry.id)?;
        Ok(entry)
    }

    /// Listings carry the sample link, so this invalidates too.
    pub fn set_audio_sample(&self, id: i64, audio_sample: Option<&str>) -> Result<()> {
        self.db.set_audio_sample(id, audio_sample)?;
        self.content_changed("entry audio updated", id)
    }

    pub fn rename_entry(&self, id: i64, name: &str) -> Result<()> {
        self.db.rename_entry(id, name)?;
        self.content_changed("entry renamed", id)
    }

    pub fn link_entry(&self, id: i64, location_id: Option<i64>) -> Result<()> {
        self.db.link_entry(id, location_id)?;
        self.content_changed("entry relinked", id)
    }

    pub fn delete_entry(&self, id: i64) -> Result<()> {
        self.db.delete_entry(id)?;
        self.content_changed("entry deleted", id)
    }

    pub fn mark_verified(&self, id: i64, verified_by: &str) -> Result<()> {
        self.db.mark_verified(id, verified_by)
    }

    pub fn submit_change_request(&self, proposal: &ChangeProposal) -> Result<ChangeRequest> {
        let request = self.db.submit_change_request(proposal)?;
        info!(
            request = request.id,
            kind = %request.kind,
            location = ?request.location_id,
            "change request submitted"
        );
        Ok(request)
    }

    pub fn approve_change_request(&self, id: i64, reviewed_by: &str) -> Result<ChangeRequest> {
        let request = self.db.approve_change_request(id, reviewed_by)?;
        self.content_changed("change request approved", id)?;
        Ok(request)
    }

    pub fn reject_change_request(
        &self,
        id: i64,
        reviewed_by: &str,
        reason: Option<&str>,
    ) -> Result<ChangeRequest> {
        let request = self.db.reject_change_request(id, reviewed_by, reason)?;
        info!(request = id, "change request rejected");
        Ok(request)
    }

    fn content_changed(&self, what: &str, id: i64) -> Result<()> {
        info!(id, "{what}");
        self.coordinator.invalidate_all().map(|_| ())
    }
}
