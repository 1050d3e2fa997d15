//! Domain model (IDs, stored files, tasks, deadlines, notifications, errors).

pub mod deadline;
pub mod errors;
pub mod file;
pub mod ids;
pub mod notification;
pub mod task;

pub use self::deadline::{DeadlineStatus, DueSoonWindow};
pub use self::errors::{ErrorKind, SweepError, SweepResult};
pub use self::file::{NewStoredFile, StoredFile, expiry_for};
pub use self::ids::{BoardId, FileId, NotificationId, SweepId, TaskId, UserId};
pub use self::notification::{Audience, NewNotification, Notification, NotificationKind};
pub use self::task::DueTask;
