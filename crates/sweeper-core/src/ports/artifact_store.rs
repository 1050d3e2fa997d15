//! ArtifactStore port - 物理ファイルの保存先（ローカルディスクなど）
//!
//! The sweeper only needs two operations: existence check and deletion.

use async_trait::async_trait;

use crate::domain::SweepResult;

/// ArtifactStore は物理ファイルへのアクセスを抽象化
///
/// # 設計原則
/// - `delete` は冪等（存在しなければ成功扱い）
/// - メタデータ（DB 行）は扱わない。それは FileStore の責務
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn exists(&self, path: &str) -> SweepResult<bool>;

    /// Remove the artifact at `path`. Succeeds when it is already absent.
    async fn delete(&self, path: &str) -> SweepResult<()>;
}
