use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rusqlite::params;
use sweeper_core::SweeperBuilder;
use sweeper_core::domain::{NewStoredFile, TaskId};
use sweeper_core::impls::{LocalArtifactStore, SqliteStore};
use sweeper_core::ports::FixedClock;
use tempfile::TempDir;

struct Env {
    _dir: TempDir,
    uploads: std::path::PathBuf,
    store: Arc<SqliteStore>,
    clock: Arc<FixedClock>,
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 3, 20, 0, 0).unwrap()
}

fn env() -> Env {
    let dir = tempfile::tempdir().expect("tempdir");
    let uploads = dir.path().join("uploads");
    std::fs::create_dir_all(&uploads).expect("uploads dir");
    let store = Arc::new(SqliteStore::open(dir.path().join("crm.db")).expect("open db"));

    // users 1..=3, board 1 owned by user 3, one column
    store
        .with_connection(|conn| {
            conn.execute_batch(
                "INSERT INTO users (id, username) VALUES (1, 'alice'), (2, 'bob'), (3, 'manager');
                 INSERT INTO boards (id, title, owner_id) VALUES (1, 'Sales', 3);
                 INSERT INTO board_columns (id, board_id, title) VALUES (1, 1, 'Doing');",
            )
        })
        .expect("seed");

    Env {
        _dir: dir,
        uploads,
        store,
        clock: Arc::new(FixedClock::new(t0())),
    }
}

impl Env {
    fn card(&self, id: i64, due_at: Option<DateTime<Utc>>, completed: bool, assignees: &[i64]) {
        self.store
            .with_connection(|conn| {
                conn.execute(
                    "INSERT INTO cards (id, column_id, title, due_at, completed) VALUES (?1, 1, ?2, ?3, ?4)",
                    params![id, format!("Card {id}"), due_at.map(|at| at.timestamp_millis()), completed],
                )?;
                for user in assignees {
                    conn.execute(
                        "INSERT INTO card_assignees (card_id, user_id) VALUES (?1, ?2)",
                        params![id, user],
                    )?;
                }
                Ok(())
            })
            .expect("insert card");
    }

    fn notifications(&self) -> Vec<(i64, String, Option<i64>, Option<String>, bool)> {
        self.store
            .with_connection(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT user_id, type, card_id, link, is_read FROM notifications ORDER BY user_id, id",
                )?;
                let rows = stmt
                    .query_map([], |row| {
                        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            })
            .expect("read notifications")
    }

    fn file_count(&self) -> i64 {
        self.store
            .with_connection(|conn| conn.query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0)))
            .expect("count files")
    }

    fn sweeper(&self) -> sweeper_core::Sweeper {
        SweeperBuilder::new()
            .store(self.store.clone())
            .artifacts(Arc::new(LocalArtifactStore::new(self.uploads.clone())))
            .clock(self.clock.clone())
            .build()
            .expect("build sweeper")
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn due_soon_card_notifies_both_assignees_and_the_manager() {
    let env = env();
    env.card(10, Some(t0() + Duration::hours(12)), false, &[1, 2]);
    env.card(11, Some(t0() + Duration::hours(12)), true, &[1, 2]);
    env.card(12, None, false, &[1]);

    let report = env.sweeper().run_cycle().await;
    assert!(report.is_clean());

    let rows = env.notifications();
    assert_eq!(rows.len(), 3);
    assert_eq!(
        rows.iter().map(|r| r.0).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    for (_, kind, card_id, link, read) in rows {
        assert_eq!(kind, "card_due_soon");
        assert_eq!(card_id, Some(10));
        assert_eq!(link.as_deref(), Some("/boards/1#card-10"));
        assert!(!read);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn due_soon_window_ends_at_midnight_after_tomorrow() {
    let env = env();
    // t0 is 20:00, so the window closes 28 hours later at 2025-11-05T00:00Z
    let cutoff = Utc.with_ymd_and_hms(2025, 11, 5, 0, 0, 0).unwrap();
    env.card(30, Some(cutoff), false, &[1]);
    env.card(31, Some(cutoff + Duration::milliseconds(1)), false, &[1]);
    env.card(32, Some(t0()), false, &[1]);

    let report = env.sweeper().run_cycle().await;
    let deadlines = report.deadlines.completed().unwrap();
    assert_eq!(deadlines.due_soon_tasks, 1);
    assert_eq!(deadlines.overdue_tasks, 0);

    let rows = env.notifications();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.2 == Some(30) && r.1 == "card_due_soon"));
}

#[tokio::test(flavor = "multi_thread")]
async fn expired_upload_is_removed_from_disk_and_database() {
    let env = env();
    std::fs::write(env.uploads.join("invoice.pdf"), b"%PDF").unwrap();
    std::fs::write(env.uploads.join("logo.png"), b"png").unwrap();
    let expiring = env
        .store
        .record_upload(
            NewStoredFile {
                path: "invoice.pdf".to_string(),
                original_name: "invoice.pdf".to_string(),
                size_bytes: 4,
                retention_days: Some(1),
                task_id: None,
            },
            t0(),
        )
        .await
        .unwrap();
    let permanent = env
        .store
        .record_upload(
            NewStoredFile {
                path: "logo.png".to_string(),
                original_name: "logo.png".to_string(),
                size_bytes: 3,
                retention_days: None,
                task_id: None,
            },
            t0(),
        )
        .await
        .unwrap();

    env.clock.advance(Duration::hours(25));
    let sweeper = env.sweeper();
    let report = sweeper.run_cycle().await;

    let retention = report.retention.completed().unwrap();
    assert_eq!(retention.records_removed, 1);
    assert_eq!(retention.artifacts_removed, 1);
    assert!(env.store.get_file(expiring).await.unwrap().is_none());
    assert!(!env.uploads.join("invoice.pdf").exists());

    assert!(env.store.get_file(permanent).await.unwrap().is_some());
    assert!(env.uploads.join("logo.png").exists());

    // immediate second pass has nothing left to do
    let again = sweeper.run_cycle().await;
    assert_eq!(again.retention.completed().unwrap().records_removed, 0);
    assert_eq!(env.file_count(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn failing_notification_insert_persists_nothing() {
    let env = env();
    env.card(20, Some(t0() - Duration::hours(2)), false, &[1, 2]);
    env.store
        .with_connection(|conn| {
            conn.execute_batch(
                "CREATE TRIGGER reject_manager BEFORE INSERT ON notifications WHEN NEW.user_id = 3
                 BEGIN SELECT RAISE(ABORT, 'mailbox full'); END;",
            )
        })
        .unwrap();

    let report = env.sweeper().run_cycle().await;

    assert!(report.deadlines.is_failed());
    assert!(env.notifications().is_empty());
    // the card itself is untouched
    let completed: bool = env
        .store
        .with_connection(|conn| {
            conn.query_row("SELECT completed FROM cards WHERE id = ?1", params![TaskId::new(20).get()], |row| {
                row.get(0)
            })
        })
        .unwrap();
    assert!(!completed);
}
