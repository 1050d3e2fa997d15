//! DeadlineNotifier - 期限間近・期限切れタスクの通知
//!
//! # フロー
//! 1. due-soon 集合（now < due_at <= cutoff）と overdue 集合（due_at < now）を取得
//! 2. タスクごとに担当者全員 + ボードのオーナーへ通知を作る
//! 3. 全通知を 1 トランザクションで insert
//!
//! There is no memory of earlier cycles: a task that stays overdue is
//! notified again on every cycle. The owner gets their own notice even when
//! they are also an assignee, since the wording differs.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info};

use super::status::DeadlineReport;
use crate::domain::{Audience, DeadlineStatus, DueSoonWindow, DueTask, NewNotification, SweepResult};
use crate::ports::{Clock, NotificationStore, TaskStore};

pub struct DeadlineNotifier {
    tasks: Arc<dyn TaskStore>,
    notifications: Arc<dyn NotificationStore>,
    clock: Arc<dyn Clock>,
    window: DueSoonWindow,
}

impl DeadlineNotifier {
    pub fn new(
        tasks: Arc<dyn TaskStore>,
        notifications: Arc<dyn NotificationStore>,
        clock: Arc<dyn Clock>,
        window: DueSoonWindow,
    ) -> Self {
        Self {
            tasks,
            notifications,
            clock,
            window,
        }
    }

    pub async fn run(&self) -> SweepResult<DeadlineReport> {
        let now = self.clock.now();
        let cutoff = self.window.cutoff(now)?;

        let due_soon = self.tasks.open_tasks_due_between(now, cutoff).await?;
        let overdue = self.tasks.open_tasks_due_before(now).await?;

        let mut batch = Vec::new();
        for task in &due_soon {
            batch.extend(fan_out(task, DeadlineStatus::DueSoon, now));
        }
        for task in &overdue {
            batch.extend(fan_out(task, DeadlineStatus::Overdue, now));
        }

        let mut report = DeadlineReport {
            due_soon_tasks: due_soon.len(),
            overdue_tasks: overdue.len(),
            notifications_created: 0,
        };

        if !batch.is_empty() {
            report.notifications_created =
                match self.notifications.insert_notifications(&batch).await {
                    Ok(inserted) => inserted,
                    Err(err) => {
                        error!(batch = batch.len(), error = %err, "deadline notifications rolled back");
                        return Err(err);
                    }
                };
        }

        info!(
            due_soon_tasks = report.due_soon_tasks,
            overdue_tasks = report.overdue_tasks,
            notifications_created = report.notifications_created,
            %cutoff,
            "deadline pass complete"
        );
        Ok(report)
    }
}

/// One notice per assignee, plus one for the board owner.
pub fn fan_out(task: &DueTask, status: DeadlineStatus, now: DateTime<Utc>) -> Vec<NewNotification> {
    let mut out: Vec<NewNotification> = task
        .assignees
        .iter()
        .map(|&user| NewNotification::deadline(task, status, Audience::Assignee, user, now))
        .collect();
    if let Some(owner) = task.board_owner {
        out.push(NewNotification::deadline(task, status, Audience::BoardOwner, owner, now));
    }
    out
}
