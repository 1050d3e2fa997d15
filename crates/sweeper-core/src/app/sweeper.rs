//! Sweeper - 定期メンテナンスループ
//!
//! # フロー
//! 1. RetentionExpiry を最後まで実行
//! 2. DeadlineNotifier を最後まで実行
//! 3. interval だけ待つ（stop / trigger で中断可能）
//!
//! Each cycle runs on its own spawned task so that a panic inside a pass is
//! caught at the loop boundary instead of killing the loop. A pass failure
//! is recorded in the cycle report and does not prevent the other pass.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info, info_span, warn};

use super::deadlines::DeadlineNotifier;
use super::retention::RetentionExpiry;
use super::status::{CycleReport, PassOutcome};
use crate::ports::{Clock, IdGenerator};

pub struct Sweeper {
    retention: RetentionExpiry,
    deadlines: DeadlineNotifier,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    interval: Duration,
}

impl Sweeper {
    pub(crate) fn new(
        retention: RetentionExpiry,
        deadlines: DeadlineNotifier,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        interval: Duration,
    ) -> Self {
        Self {
            retention,
            deadlines,
            clock,
            ids,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run both passes once, in order, and report what happened.
    pub async fn run_cycle(&self) -> CycleReport {
        let sweep_id = self.ids.generate_sweep_id();
        let span = info_span!("sweep", %sweep_id);
        async {
            let started_at = self.clock.now();

            let retention: PassOutcome<_> = self.retention.run().await.into();
            if let PassOutcome::Failed { kind, error } = &retention {
                warn!(?kind, %error, "retention pass failed");
            }

            let deadlines: PassOutcome<_> = self.deadlines.run().await.into();
            if let PassOutcome::Failed { kind, error } = &deadlines {
                warn!(?kind, %error, "deadline pass failed");
            }

            CycleReport {
                sweep_id,
                started_at,
                finished_at: self.clock.now(),
                retention,
                deadlines,
            }
        }
        .instrument(span)
        .await
    }

    /// Spawn the loop. The first cycle starts immediately.
    pub fn start(self) -> SweeperHandle {
        let sweeper = Arc::new(self);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (reports_tx, reports_rx) = watch::channel(None);
        let trigger = Arc::new(Notify::new());

        let join = tokio::spawn(sweep_loop(
            sweeper,
            shutdown_rx,
            Arc::clone(&trigger),
            reports_tx,
        ));

        SweeperHandle {
            shutdown_tx,
            trigger,
            reports: reports_rx,
            join,
        }
    }
}

/// Handle to a running sweeper loop.
/// - `stop()` で sleep を中断してループの終了を待つ
/// - 実行中のサイクルは最後まで走る（未コミットの変更はロールバックされる）
pub struct SweeperHandle {
    shutdown_tx: watch::Sender<bool>,
    trigger: Arc<Notify>,
    reports: watch::Receiver<Option<CycleReport>>,
    join: JoinHandle<()>,
}

impl SweeperHandle {
    /// Start the next cycle now instead of waiting out the interval.
    pub fn trigger(&self) {
        self.trigger.notify_one();
    }

    /// Latest completed cycle report (`None` until the first cycle finishes).
    pub fn reports(&self) -> watch::Receiver<Option<CycleReport>> {
        self.reports.clone()
    }

    pub fn request_stop(&self) {
        // ignore send error: the loop may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn stop(self) {
        self.request_stop();
        if let Err(err) = self.join.await {
            error!(error = %err, "sweeper loop ended abnormally");
        }
    }
}

async fn sweep_loop(
    sweeper: Arc<Sweeper>,
    mut shutdown_rx: watch::Receiver<bool>,
    trigger: Arc<Notify>,
    reports_tx: watch::Sender<Option<CycleReport>>,
) {
    info!(interval_secs = sweeper.interval.as_secs(), "sweeper started");
    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        let cycle = tokio::spawn({
            let sweeper = Arc::clone(&sweeper);
            async move { sweeper.run_cycle().await }
        });
        match cycle.await {
            Ok(report) => {
                reports_tx.send_replace(Some(report));
            }
            Err(err) if err.is_panic() => {
                error!(error = %err, "sweep cycle panicked, continuing with next cycle");
            }
            Err(err) => {
                error!(error = %err, "sweep cycle was cancelled, continuing with next cycle");
            }
        }

        tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() {
                    // dropping the handle ends the loop
                    break;
                }
            }
            _ = trigger.notified() => {
                debug!("cycle triggered");
            }
            _ = tokio::time::sleep(sweeper.interval) => {}
        }
    }
    info!("sweeper stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::SweeperBuilder;
    use crate::domain::{BoardId, DueTask, ErrorKind, NewStoredFile, SweepResult, TaskId, UserId};
    use crate::impls::{InMemoryArtifactStore, InMemoryStore};
    use crate::ports::{FixedClock, TaskStore};
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 1, 9, 0, 0).unwrap()
    }

    fn seeded() -> (Arc<InMemoryStore>, Arc<InMemoryArtifactStore>, Arc<FixedClock>) {
        let store = Arc::new(InMemoryStore::new());
        let artifacts = Arc::new(InMemoryArtifactStore::new());
        let clock = Arc::new(FixedClock::new(t0()));

        store.add_upload(
            NewStoredFile {
                path: "uploads/old.zip".to_string(),
                original_name: "old.zip".to_string(),
                size_bytes: 5,
                retention_days: Some(1),
                task_id: None,
            },
            t0() - chrono::Duration::days(2),
        );
        artifacts.put("uploads/old.zip");
        store.put_task(DueTask {
            id: TaskId::new(1),
            board_id: BoardId::new(1),
            title: "Late".to_string(),
            due_at: Some(t0() - chrono::Duration::hours(1)),
            completed: false,
            completed_at: None,
            assignees: vec![UserId::new(2)],
            board_owner: Some(UserId::new(1)),
        });
        (store, artifacts, clock)
    }

    fn sweeper(
        store: &Arc<InMemoryStore>,
        artifacts: &Arc<InMemoryArtifactStore>,
        clock: &Arc<FixedClock>,
    ) -> Sweeper {
        SweeperBuilder::new()
            .store(store.clone())
            .artifacts(artifacts.clone())
            .clock(clock.clone())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn run_cycle_executes_both_passes() {
        let (store, artifacts, clock) = seeded();
        let report = sweeper(&store, &artifacts, &clock).run_cycle().await;

        assert!(report.is_clean());
        assert_eq!(report.retention.completed().unwrap().records_removed, 1);
        assert_eq!(report.deadlines.completed().unwrap().notifications_created, 2);
        assert_eq!(report.started_at, t0());
    }

    #[tokio::test]
    async fn failed_retention_commit_does_not_skip_deadlines() {
        let (store, artifacts, clock) = seeded();
        store.fail_next_commits(1);

        let report = sweeper(&store, &artifacts, &clock).run_cycle().await;

        assert!(matches!(
            report.retention,
            PassOutcome::Failed { kind: ErrorKind::Transient, .. }
        ));
        assert_eq!(report.deadlines.completed().unwrap().notifications_created, 2);
        assert_eq!(store.files().len(), 1);
    }

    struct PanickingTasks;

    #[async_trait]
    impl TaskStore for PanickingTasks {
        async fn open_tasks_due_between(
            &self,
            _after: DateTime<Utc>,
            _until: DateTime<Utc>,
        ) -> SweepResult<Vec<DueTask>> {
            panic!("task table exploded");
        }

        async fn open_tasks_due_before(&self, _before: DateTime<Utc>) -> SweepResult<Vec<DueTask>> {
            Ok(vec![])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_cycle_does_not_kill_the_loop() {
        let (store, artifacts, clock) = seeded();
        let sweeper = SweeperBuilder::new()
            .files(store.clone())
            .tasks(Arc::new(PanickingTasks))
            .notifications(store.clone())
            .artifacts(artifacts.clone())
            .clock(clock.clone())
            .interval(Duration::from_secs(60))
            .build()
            .unwrap();

        let handle = sweeper.start();
        // no report is published for a panicked cycle; the loop keeps sleeping
        tokio::time::sleep(Duration::from_secs(150)).await;
        assert!(!handle.join.is_finished());
        assert!(handle.reports().borrow().is_none());

        // the retention pass of the panicked cycles still ran
        assert!(store.files().is_empty());
        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn loop_waits_interval_between_cycles() {
        let (store, artifacts, clock) = seeded();
        let handle = SweeperBuilder::new()
            .store(store.clone())
            .artifacts(artifacts.clone())
            .clock(clock.clone())
            .interval(Duration::from_secs(3600))
            .build()
            .unwrap()
            .start();
        let mut reports = handle.reports();

        let started = tokio::time::Instant::now();
        reports.changed().await.unwrap();
        let first = reports.borrow_and_update().clone().unwrap();
        reports.changed().await.unwrap();
        let second = reports.borrow_and_update().clone().unwrap();

        assert!(started.elapsed() >= Duration::from_secs(3600));
        assert_ne!(first.sweep_id, second.sweep_id);
        // overdue task is notified again on the second cycle
        assert_eq!(store.notifications().len(), 4);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn trigger_runs_a_cycle_without_waiting() {
        let (store, artifacts, clock) = seeded();
        let handle = sweeper(&store, &artifacts, &clock).start();
        let mut reports = handle.reports();
        reports.changed().await.unwrap();

        let before = tokio::time::Instant::now();
        handle.trigger();
        reports.changed().await.unwrap();

        assert!(before.elapsed() < Duration::from_secs(3600));
        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_ends_the_loop() {
        let (store, artifacts, clock) = seeded();
        let handle = sweeper(&store, &artifacts, &clock).start();
        let mut reports = handle.reports();
        reports.changed().await.unwrap();

        let SweeperHandle {
            shutdown_tx, join, ..
        } = handle;
        drop(shutdown_tx);
        let before = tokio::time::Instant::now();
        join.await.unwrap();
        assert!(before.elapsed() < Duration::from_secs(3600));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_interrupts_the_sleep() {
        let (store, artifacts, clock) = seeded();
        let handle = sweeper(&store, &artifacts, &clock).start();
        let mut reports = handle.reports();
        reports.changed().await.unwrap();

        let before = tokio::time::Instant::now();
        handle.stop().await;
        assert!(before.elapsed() < Duration::from_secs(3600));
    }
}
