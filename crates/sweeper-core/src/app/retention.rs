//! RetentionExpiry - 保存期限切れファイルの削除
//!
//! # フロー
//! 1. FileStore::expired_files(now) で expires_at <= now の行を取得
//! 2. 1 件ずつ ArtifactStore から物理ファイルを削除（存在しなければ成功扱い）
//! 3. 全行の削除を 1 トランザクションでコミット
//!
//! A failed artifact deletion is logged and counted but the row is still
//! deleted, leaving an orphan on disk. A failed commit rolls back every row;
//! artifacts already removed in that cycle stay removed and are reported.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::status::RetentionReport;
use crate::domain::{StoredFile, SweepResult};
use crate::ports::{ArtifactStore, Clock, FileStore};

pub struct RetentionExpiry {
    files: Arc<dyn FileStore>,
    artifacts: Arc<dyn ArtifactStore>,
    clock: Arc<dyn Clock>,
}

enum ArtifactRemoval {
    Removed,
    AlreadyGone,
}

impl RetentionExpiry {
    pub fn new(
        files: Arc<dyn FileStore>,
        artifacts: Arc<dyn ArtifactStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            files,
            artifacts,
            clock,
        }
    }

    pub async fn run(&self) -> SweepResult<RetentionReport> {
        let now = self.clock.now();
        let expired = self.files.expired_files(now).await?;
        let mut report = RetentionReport {
            expired: expired.len(),
            ..RetentionReport::default()
        };

        if expired.is_empty() {
            info!(records_removed = 0, "retention pass complete, nothing expired");
            return Ok(report);
        }

        let mut staged = Vec::with_capacity(expired.len());
        for file in &expired {
            match self.remove_artifact(file).await {
                Ok(ArtifactRemoval::Removed) => report.artifacts_removed += 1,
                Ok(ArtifactRemoval::AlreadyGone) => report.artifacts_missing += 1,
                Err(err) => {
                    report.artifact_failures += 1;
                    error!(
                        file_id = %file.id,
                        path = %file.path,
                        error = %err,
                        "failed to remove expired artifact, deleting its record anyway"
                    );
                }
            }
            staged.push(file.id);
        }

        match self.files.delete_files(&staged).await {
            Ok(removed) => report.records_removed = removed,
            Err(err) => {
                error!(batch = staged.len(), error = %err, "file record deletion rolled back");
                if report.artifacts_removed > 0 {
                    warn!(
                        artifacts_removed = report.artifacts_removed,
                        "records still reference artifacts removed in this cycle"
                    );
                }
                return Err(err);
            }
        }

        info!(
            records_removed = report.records_removed,
            artifacts_removed = report.artifacts_removed,
            artifacts_missing = report.artifacts_missing,
            artifact_failures = report.artifact_failures,
            "retention pass complete"
        );
        Ok(report)
    }

    async fn remove_artifact(&self, file: &StoredFile) -> SweepResult<ArtifactRemoval> {
        if !self.artifacts.exists(&file.path).await? {
            return Ok(ArtifactRemoval::AlreadyGone);
        }
        self.artifacts.delete(&file.path).await?;
        Ok(ArtifactRemoval::Removed)
    }
}
