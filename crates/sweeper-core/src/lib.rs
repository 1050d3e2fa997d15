//! sweeper-core
//!
//! Recurring maintenance sweep for the kanban project-management backend.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, file, task, deadline, notification, errors）
//! - **ports**: 抽象化レイヤー（FileStore, TaskStore, NotificationStore, ArtifactStore, Clock, IdGenerator）
//! - **app**: スイープ処理（builder, sweeper, retention, deadlines, status）
//! - **impls**: 実装（SqliteStore, LocalArtifactStore, InMemory 実装）
//! - **config**: SweeperConfig

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;

pub use app::{Sweeper, SweeperBuilder, SweeperHandle};
pub use config::SweeperConfig;
