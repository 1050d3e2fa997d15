//! Notification - ユーザー向け通知
//!
//! The sweeper only ever appends rows; `read`/`read_at` are owned by the
//! request-facing layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::deadline::DeadlineStatus;
use super::ids::{NotificationId, TaskId, UserId};
use super::task::DueTask;

/// Category of a notification. Stored as its snake_case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    CardAssigned,
    CardCompleted,
    CardCommented,
    CardDueSoon,
    CardOverdue,
    Mention,
    System,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CardAssigned => "card_assigned",
            Self::CardCompleted => "card_completed",
            Self::CardCommented => "card_commented",
            Self::CardDueSoon => "card_due_soon",
            Self::CardOverdue => "card_overdue",
            Self::Mention => "mention",
            Self::System => "system",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DeadlineStatus> for NotificationKind {
    fn from(status: DeadlineStatus) -> Self {
        match status {
            DeadlineStatus::DueSoon => Self::CardDueSoon,
            DeadlineStatus::Overdue => Self::CardOverdue,
        }
    }
}

/// Who a deadline notification is worded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Assignee,
    BoardOwner,
}

/// Notification row about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNotification {
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub task_id: Option<TaskId>,
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewNotification {
    /// Deadline notice for `task`, worded for `audience`.
    pub fn deadline(
        task: &DueTask,
        status: DeadlineStatus,
        audience: Audience,
        user_id: UserId,
        created_at: DateTime<Utc>,
    ) -> Self {
        let title = match (status, audience) {
            (DeadlineStatus::DueSoon, Audience::Assignee) => format!("Deadline soon: {}", task.title),
            (DeadlineStatus::DueSoon, Audience::BoardOwner) => {
                format!("Deadline approaching: {}", task.title)
            }
            (DeadlineStatus::Overdue, _) => format!("Overdue: {}", task.title),
        };
        let message = match status {
            DeadlineStatus::DueSoon => format!("Task '{}' is due by the end of tomorrow", task.title),
            DeadlineStatus::Overdue => format!("Task '{}' is overdue!", task.title),
        };
        Self {
            user_id,
            kind: status.into(),
            title,
            message,
            task_id: Some(task.id),
            link: Some(task.link()),
            created_at,
        }
    }
}

/// Persisted notification row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub task_id: Option<TaskId>,
    pub link: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

impl Notification {
    /// Row as it looks right after insertion.
    pub fn unread(id: NotificationId, new: NewNotification) -> Self {
        Self {
            id,
            user_id: new.user_id,
            kind: new.kind,
            title: new.title,
            message: new.message,
            task_id: new.task_id,
            link: new.link,
            read: false,
            created_at: new.created_at,
            read_at: None,
        }
    }
}
