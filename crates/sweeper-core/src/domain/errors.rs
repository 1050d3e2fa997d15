//! Errors - エラー型と分類

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// ErrorKind は実行エラーの分類
///
/// - Transient: 一時的なエラー（次のサイクルで再試行される）
/// - Permanent: 恒久的なエラー（設定ミスなど、再試行しても直らない）
/// - Infrastructure: インフラエラー（DB / ストレージの障害）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Transient,
    Permanent,
    Infrastructure,
}

/// SweepError はスイープ処理のエラー
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("artifact operation failed for {path}: {source}")]
    Artifact {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("store query failed: {0}")]
    Store(String),

    /// The pass's write unit was rolled back; nothing from it persisted.
    #[error("commit failed, batch rolled back: {0}")]
    Commit(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SweepError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Artifact { .. } => ErrorKind::Transient,
            Self::Store(_) => ErrorKind::Infrastructure,
            Self::Commit(_) => ErrorKind::Transient,
            Self::Config(_) => ErrorKind::Permanent,
        }
    }
}

pub type SweepResult<T> = Result<T, SweepError>;
