//! LocalArtifactStore - アップロードディレクトリ上のファイル
//!
//! Relative paths are resolved against `root`; absolute paths are used as-is
//! (rows written by older uploads may carry either form).

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::{SweepError, SweepResult};
use crate::ports::ArtifactStore;

pub struct LocalArtifactStore {
    root: PathBuf,
}

impl LocalArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.root.join(candidate)
        }
    }
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    async fn exists(&self, path: &str) -> SweepResult<bool> {
        tokio::fs::try_exists(self.resolve(path))
            .await
            .map_err(|source| SweepError::Artifact {
                path: path.to_string(),
                source,
            })
    }

    async fn delete(&self, path: &str) -> SweepResult<()> {
        match tokio::fs::remove_file(self.resolve(path)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SweepError::Artifact {
                path: path.to_string(),
                source,
            }),
        }
    }
}
