//! Status - サイクルごとの集計
//!
//! Every pass returns its counts; the loop bundles them into a `CycleReport`
//! and publishes the latest one through `SweeperHandle::reports()`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ErrorKind, SweepError, SweepId};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionReport {
    /// Rows selected as expired at the start of the pass.
    pub expired: usize,
    /// Metadata rows deleted by the committed batch.
    pub records_removed: usize,
    pub artifacts_removed: usize,
    /// Artifacts that were already gone; counted as success.
    pub artifacts_missing: usize,
    /// Artifacts that could not be removed; their rows were deleted anyway.
    pub artifact_failures: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlineReport {
    pub due_soon_tasks: usize,
    pub overdue_tasks: usize,
    pub notifications_created: usize,
}

/// Result of one pass as recorded in the cycle report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PassOutcome<T> {
    Completed(T),
    Failed { kind: ErrorKind, error: String },
}

impl<T> PassOutcome<T> {
    pub fn completed(&self) -> Option<&T> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl<T> From<Result<T, SweepError>> for PassOutcome<T> {
    fn from(value: Result<T, SweepError>) -> Self {
        match value {
            Ok(report) => Self::Completed(report),
            Err(err) => Self::Failed {
                kind: err.kind(),
                error: err.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    pub sweep_id: SweepId,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub retention: PassOutcome<RetentionReport>,
    pub deadlines: PassOutcome<DeadlineReport>,
}

impl CycleReport {
    pub fn is_clean(&self) -> bool {
        !self.retention.is_failed() && !self.deadlines.is_failed()
    }
}
