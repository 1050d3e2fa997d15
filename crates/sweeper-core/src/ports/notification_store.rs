//! NotificationStore port - notifications テーブル（追記のみ）

use async_trait::async_trait;

use crate::domain::{NewNotification, SweepResult};

/// NotificationStore は通知をまとめて追加する
///
/// 全件 insert されるか、1 件も insert されないか（途中までの通知は残さない）。
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Returns the number of rows inserted.
    async fn insert_notifications(&self, batch: &[NewNotification]) -> SweepResult<usize>;
}
