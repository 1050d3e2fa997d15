//! Deadline - due-soon / overdue の判定
//!
//! Both sets are recomputed from `now` on every pass; nothing is
//! checkpointed between cycles.
//!
//! - due-soon: `now < due_at <= cutoff`
//! - overdue:  `due_at < now`
//!
//! A task due exactly at `now` is in neither set.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::{SweepError, SweepResult};

/// Largest accepted `days_ahead`.
pub const MAX_DUE_SOON_DAYS: u32 = 366;

/// How far ahead a deadline counts as "due soon".
///
/// `days_ahead = 1` covers the rest of today and all of tomorrow: the cutoff
/// is the midnight (UTC) that ends tomorrow, not the one that ends today, so
/// a task due twelve hours from now is always included whatever the hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueSoonWindow {
    pub days_ahead: u32,
}

impl Default for DueSoonWindow {
    fn default() -> Self {
        Self { days_ahead: 1 }
    }
}

impl DueSoonWindow {
    /// Inclusive upper bound of the due-soon range.
    pub fn cutoff(&self, now: DateTime<Utc>) -> SweepResult<DateTime<Utc>> {
        let start_of_today = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        Duration::try_days(i64::from(self.days_ahead) + 1)
            .and_then(|span| start_of_today.checked_add_signed(span))
            .ok_or_else(|| {
                SweepError::Config(format!(
                    "due-soon window of {} days overflows from {now}",
                    self.days_ahead
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineStatus {
    DueSoon,
    Overdue,
}
