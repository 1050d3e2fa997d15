//! StoredFile - アップロードされたファイルのメタデータ
//!
//! Retention is expressed in whole days. A file uploaded with a retention
//! period gets `expires_at = uploaded_at + retention_days`; a file without one
//! keeps `expires_at = None` and is never removed by the sweeper.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{FileId, TaskId};

/// Metadata row for one stored file artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    pub id: FileId,
    /// Location of the physical artifact, as understood by the `ArtifactStore`.
    pub path: String,
    pub original_name: String,
    pub size_bytes: u64,
    pub retention_days: Option<u32>,
    pub expires_at: Option<DateTime<Utc>>,
    pub task_id: Option<TaskId>,
    pub uploaded_at: DateTime<Utc>,
}

impl StoredFile {
    /// True once the retention window has elapsed (`now >= expires_at`).
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

/// Upload about to be recorded; the id is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewStoredFile {
    pub path: String,
    pub original_name: String,
    pub size_bytes: u64,
    pub retention_days: Option<u32>,
    pub task_id: Option<TaskId>,
}

impl NewStoredFile {
    /// Expiry to persist alongside the row.
    pub fn expires_at(&self, uploaded_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        expiry_for(self.retention_days, uploaded_at)
    }
}

/// `uploaded_at + retention_days`, or `None` for permanent retention.
pub fn expiry_for(retention_days: Option<u32>, uploaded_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
    retention_days.map(|days| uploaded_at + Duration::days(i64::from(days)))
}
