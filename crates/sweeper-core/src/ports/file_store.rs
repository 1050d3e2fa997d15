//! FileStore port - files テーブル（メタデータ）

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{FileId, StoredFile, SweepResult};

/// FileStore は StoredFile のメタデータを扱う
///
/// # 設計原則
/// - `delete_files` は 1 トランザクション: 全件削除されるか、1 件も削除されないか
/// - 失敗時は `SweepError::Commit` を返し、行はそのまま残る
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Rows with non-null `expires_at <= now`.
    async fn expired_files(&self, now: DateTime<Utc>) -> SweepResult<Vec<StoredFile>>;

    /// Delete every row in `ids` as one unit. Returns the number of rows removed.
    async fn delete_files(&self, ids: &[FileId]) -> SweepResult<usize>;
}
