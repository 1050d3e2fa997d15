//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は周辺アプリケーションが所有する資源（リレーショナル DB、
//! アップロードディレクトリ、時計）へのインターフェースです。
//!
//! # 設計原則
//! - DB が source of truth（正本）。スイーパーは状態を持たない
//! - Task は読み取りのみ、Notification は追記のみ、StoredFile は読み取りと削除のみ

pub mod artifact_store;
pub mod clock;
pub mod file_store;
pub mod id_generator;
pub mod notification_store;
pub mod task_store;

// 主要な trait を再エクスポート
pub use self::artifact_store::ArtifactStore;
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::file_store::FileStore;
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::notification_store::NotificationStore;
pub use self::task_store::TaskStore;
