//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **SqliteStore**: FileStore / TaskStore / NotificationStore（本番用）
//! - **LocalArtifactStore**: アップロードディレクトリ（本番用）
//! - **InMemoryStore** / **InMemoryArtifactStore**: テスト・開発用。
//!   コミット失敗や削除失敗を注入できる

pub mod inmem_artifacts;
pub mod inmem_store;
pub mod local_artifacts;
pub mod sqlite;

// 主要な型を再エクスポート
pub use self::inmem_artifacts::InMemoryArtifactStore;
pub use self::inmem_store::InMemoryStore;
pub use self::local_artifacts::LocalArtifactStore;
pub use self::sqlite::{DbError, SqliteStore};
