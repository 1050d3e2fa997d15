//! Domain identifiers (strongly-typed IDs).
//!
//! Rows owned by the surrounding application are keyed by integer primary
//! keys. `RowId<T>` wraps the raw `i64` and uses a phantom marker so a
//! `FileId` can never be passed where a `TaskId` is expected.
//!
//! A sweep cycle itself is identified by a ULID (`SweepId`): sortable by
//! start time and generated without coordination, which makes it a good
//! correlation key for log lines.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// IdMarker は各 ID 型のマーカー trait
///
/// Display で使うプレフィックス（"file-", "task-" など）を提供します。
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// Integer row id tagged with the table it belongs to.
#[repr(transparent)]
#[derive(Serialize, Deserialize)]
#[serde(transparent, bound = "")]
pub struct RowId<T: IdMarker> {
    value: i64,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> RowId<T> {
    pub const fn new(value: i64) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    /// Raw primary key, as stored in the database.
    pub const fn get(&self) -> i64 {
        self.value
    }
}

// derive would put bounds on `T`; the marker types are uninhabited enums, so
// these are implemented by hand on the wrapped value only.
impl<T: IdMarker> Clone for RowId<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: IdMarker> Copy for RowId<T> {}

impl<T: IdMarker> PartialEq for RowId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: IdMarker> Eq for RowId<T> {}

impl<T: IdMarker> std::hash::Hash for RowId<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T: IdMarker> PartialOrd for RowId<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: IdMarker> Ord for RowId<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value.cmp(&other.value)
    }
}

impl<T: IdMarker> From<i64> for RowId<T> {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> fmt::Debug for RowId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.value)
    }
}

impl<T: IdMarker> fmt::Display for RowId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.value)
    }
}

// ========================================
// マーカー型の定義
// ========================================

pub enum File {}

impl IdMarker for File {
    fn prefix() -> &'static str {
        "file-"
    }
}

pub enum Task {}

impl IdMarker for Task {
    fn prefix() -> &'static str {
        "task-"
    }
}

pub enum User {}

impl IdMarker for User {
    fn prefix() -> &'static str {
        "user-"
    }
}

pub enum Board {}

impl IdMarker for Board {
    fn prefix() -> &'static str {
        "board-"
    }
}

pub enum Notification {}

impl IdMarker for Notification {
    fn prefix() -> &'static str {
        "notification-"
    }
}

/// Identifier of a stored file artifact.
pub type FileId = RowId<File>;

/// Identifier of a task (a card on a kanban board).
pub type TaskId = RowId<Task>;

/// Identifier of an application user.
pub type UserId = RowId<User>;

/// Identifier of a kanban board.
pub type BoardId = RowId<Board>;

/// Identifier of a notification row.
pub type NotificationId = RowId<Notification>;

/// Identifier of one sweep cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SweepId(Ulid);

impl SweepId {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl From<Ulid> for SweepId {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl fmt::Display for SweepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sweep-{}", self.0)
    }
}
