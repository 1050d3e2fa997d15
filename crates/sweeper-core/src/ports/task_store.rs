//! TaskStore port - カード（タスク）の読み取り専用ビュー
//!
//! The sweeper never writes through this port; task rows belong to the CRUD
//! layer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{DueTask, SweepResult};

/// TaskStore は期限付きの未完了タスクを返す
///
/// # 設計原則
/// - completed = false かつ due_at が設定されている行のみ
/// - assignees / board owner は結合済みで返す
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Open tasks with `after < due_at <= until`.
    async fn open_tasks_due_between(
        &self,
        after: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> SweepResult<Vec<DueTask>>;

    /// Open tasks with `due_at < before`.
    async fn open_tasks_due_before(&self, before: DateTime<Utc>) -> SweepResult<Vec<DueTask>>;
}
