//! InMemoryStore - 開発・テスト用の正本
//!
//! Implements `FileStore`, `TaskStore` and `NotificationStore` over plain maps
//! behind one mutex. Commit failures can be injected to exercise the
//! roll-back paths of the passes.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    DueTask, FileId, NewNotification, NewStoredFile, Notification, NotificationId, StoredFile,
    SweepError, SweepResult, TaskId,
};
use crate::ports::{FileStore, NotificationStore, TaskStore};

#[derive(Default)]
struct InMemoryState {
    files: BTreeMap<FileId, StoredFile>,
    tasks: BTreeMap<TaskId, DueTask>,
    notifications: Vec<Notification>,
    next_file_id: i64,
    next_notification_id: i64,
    /// Number of upcoming commits (of either kind) that will fail.
    failing_commits: usize,
}

impl InMemoryState {
    fn take_commit_failure(&mut self) -> bool {
        if self.failing_commits > 0 {
            self.failing_commits -= 1;
            true
        } else {
            false
        }
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<InMemoryState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, InMemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record an upload, computing its expiry from `uploaded_at`.
    pub fn add_upload(&self, upload: NewStoredFile, uploaded_at: DateTime<Utc>) -> FileId {
        let mut state = self.lock();
        state.next_file_id += 1;
        let id = FileId::new(state.next_file_id);
        let expires_at = upload.expires_at(uploaded_at);
        state.files.insert(
            id,
            StoredFile {
                id,
                path: upload.path,
                original_name: upload.original_name,
                size_bytes: upload.size_bytes,
                retention_days: upload.retention_days,
                expires_at,
                task_id: upload.task_id,
                uploaded_at,
            },
        );
        id
    }

    pub fn put_task(&self, task: DueTask) {
        self.lock().tasks.insert(task.id, task);
    }

    /// Mark a task complete, as a user would through the CRUD layer.
    pub fn complete_task(&self, id: TaskId, at: DateTime<Utc>) {
        if let Some(task) = self.lock().tasks.get_mut(&id) {
            task.completed = true;
            task.completed_at = Some(at);
        }
    }

    /// Make the next `n` commits fail and roll back.
    pub fn fail_next_commits(&self, n: usize) {
        self.lock().failing_commits = n;
    }

    pub fn files(&self) -> Vec<StoredFile> {
        self.lock().files.values().cloned().collect()
    }

    pub fn tasks(&self) -> Vec<DueTask> {
        self.lock().tasks.values().cloned().collect()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().notifications.clone()
    }
}

#[async_trait]
impl FileStore for InMemoryStore {
    async fn expired_files(&self, now: DateTime<Utc>) -> SweepResult<Vec<StoredFile>> {
        Ok(self
            .lock()
            .files
            .values()
            .filter(|file| file.is_expired(now))
            .cloned()
            .collect())
    }

    async fn delete_files(&self, ids: &[FileId]) -> SweepResult<usize> {
        let mut state = self.lock();
        if state.take_commit_failure() {
            return Err(SweepError::Commit("injected commit failure".to_string()));
        }
        let removed = ids
            .iter()
            .filter(|id| state.files.remove(*id).is_some())
            .count();
        Ok(removed)
    }
}

#[async_trait]
impl TaskStore for InMemoryStore {
    async fn open_tasks_due_between(
        &self,
        after: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> SweepResult<Vec<DueTask>> {
        Ok(self
            .lock()
            .tasks
            .values()
            .filter(|task| !task.completed)
            .filter(|task| task.due_at.is_some_and(|due| due > after && due <= until))
            .cloned()
            .collect())
    }

    async fn open_tasks_due_before(&self, before: DateTime<Utc>) -> SweepResult<Vec<DueTask>> {
        Ok(self
            .lock()
            .tasks
            .values()
            .filter(|task| !task.completed)
            .filter(|task| task.due_at.is_some_and(|due| due < before))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl NotificationStore for InMemoryStore {
    async fn insert_notifications(&self, batch: &[NewNotification]) -> SweepResult<usize> {
        let mut state = self.lock();
        if state.take_commit_failure() {
            return Err(SweepError::Commit("injected commit failure".to_string()));
        }
        for new in batch {
            state.next_notification_id += 1;
            let id = NotificationId::new(state.next_notification_id);
            state.notifications.push(Notification::unread(id, new.clone()));
        }
        Ok(batch.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BoardId, NotificationKind, UserId};
    use chrono::{Duration, TimeZone};

    fn upload(retention_days: Option<u32>) -> NewStoredFile {
        NewStoredFile {
            path: "uploads/report.pdf".to_string(),
            original_name: "report.pdf".to_string(),
            size_bytes: 2048,
            retention_days,
            task_id: None,
        }
    }

    #[tokio::test]
    async fn failed_delete_commit_leaves_every_row() {
        let store = InMemoryStore::new();
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let a = store.add_upload(upload(Some(1)), t0);
        let b = store.add_upload(upload(Some(1)), t0);

        store.fail_next_commits(1);
        let err = store.delete_files(&[a, b]).await.unwrap_err();
        assert!(matches!(err, SweepError::Commit(_)));
        assert_eq!(store.files().len(), 2);

        assert_eq!(store.delete_files(&[a, b]).await.unwrap(), 2);
        assert!(store.files().is_empty());
    }

    #[tokio::test]
    async fn due_range_queries_skip_completed_tasks() {
        let store = InMemoryStore::new();
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap();
        for (id, offset, completed) in [(1, 2, false), (2, 2, true), (3, -2, false)] {
            store.put_task(DueTask {
                id: TaskId::new(id),
                board_id: BoardId::new(1),
                title: format!("task {id}"),
                due_at: Some(now + Duration::hours(offset)),
                completed,
                completed_at: None,
                assignees: vec![UserId::new(1)],
                board_owner: Some(UserId::new(2)),
            });
        }

        let soon = store
            .open_tasks_due_between(now, now + Duration::days(1))
            .await
            .unwrap();
        assert_eq!(soon.iter().map(|t| t.id).collect::<Vec<_>>(), vec![TaskId::new(1)]);

        let overdue = store.open_tasks_due_before(now).await.unwrap();
        assert_eq!(overdue.iter().map(|t| t.id).collect::<Vec<_>>(), vec![TaskId::new(3)]);
    }

    #[tokio::test]
    async fn inserted_notifications_start_unread() {
        let store = InMemoryStore::new();
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let new = NewNotification {
            user_id: UserId::new(3),
            kind: NotificationKind::System,
            title: "hello".to_string(),
            message: "world".to_string(),
            task_id: None,
            link: None,
            created_at: at,
        };
        assert_eq!(store.insert_notifications(&[new]).await.unwrap(), 1);

        let rows = store.notifications();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].read);
        assert_eq!(rows[0].read_at, None);
    }
}
