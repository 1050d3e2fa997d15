//! InMemoryArtifactStore - テスト用の物理ファイル置き場

use std::collections::HashSet;
use std::io;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::{SweepError, SweepResult};
use crate::ports::ArtifactStore;

#[derive(Default)]
struct Artifacts {
    present: HashSet<String>,
    /// Paths whose deletion fails with `PermissionDenied`.
    locked: HashSet<String>,
}

#[derive(Default)]
pub struct InMemoryArtifactStore {
    inner: Mutex<Artifacts>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Artifacts> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn put(&self, path: impl Into<String>) {
        self.lock().present.insert(path.into());
    }

    pub fn lock_path(&self, path: impl Into<String>) {
        self.lock().locked.insert(path.into());
    }

    pub fn contains(&self, path: &str) -> bool {
        self.lock().present.contains(path)
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn exists(&self, path: &str) -> SweepResult<bool> {
        Ok(self.contains(path))
    }

    async fn delete(&self, path: &str) -> SweepResult<()> {
        let mut artifacts = self.lock();
        if artifacts.locked.contains(path) {
            return Err(SweepError::Artifact {
                path: path.to_string(),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            });
        }
        artifacts.present.remove(path);
        Ok(())
    }
}
