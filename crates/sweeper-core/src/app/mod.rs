//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてスイープ処理を実装します。
//!
//! # 主要コンポーネント
//! - **SweeperBuilder**: collaborator のワイヤリングと起動時検証
//! - **Sweeper**: スケジューリングループ（retention → deadlines → sleep）
//! - **RetentionExpiry**: 保存期限切れファイルの削除
//! - **DeadlineNotifier**: 期限間近・期限切れタスクの通知
//! - **status**: サイクルごとの集計

pub mod builder;
pub mod deadlines;
pub mod retention;
pub mod status;
pub mod sweeper;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, SweeperBuilder};
pub use self::deadlines::DeadlineNotifier;
pub use self::retention::RetentionExpiry;
pub use self::status::{CycleReport, DeadlineReport, PassOutcome, RetentionReport};
pub use self::sweeper::{Sweeper, SweeperHandle};
