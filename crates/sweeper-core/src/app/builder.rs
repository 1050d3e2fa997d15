//! SweeperBuilder - スイーパーの構築とワイヤリング
//!
//! # Fail-fast 設計
//! - 必須の collaborator（FileStore, TaskStore, NotificationStore, ArtifactStore）が
//!   揃っていなければ build() で BuildError を返す
//! - Clock / IdGenerator は省略時に SystemClock / UlidGenerator を使う

use std::sync::Arc;
use std::time::Duration;

use super::deadlines::DeadlineNotifier;
use super::retention::RetentionExpiry;
use super::sweeper::Sweeper;
use crate::config::SweeperConfig;
use crate::domain::SweepError;
use crate::ports::{
    ArtifactStore, Clock, FileStore, IdGenerator, NotificationStore, SystemClock, TaskStore,
    UlidGenerator,
};

/// SweeperBuilder は Sweeper を構築
///
/// # 使用例
/// ```ignore
/// let sweeper = SweeperBuilder::new()
///     .store(Arc::new(SqliteStore::open("crm.db")?))
///     .artifacts(Arc::new(LocalArtifactStore::new("uploads")))
///     .config(config)
///     .build()?;
/// let handle = sweeper.start();
/// ```
#[derive(Default)]
pub struct SweeperBuilder {
    files: Option<Arc<dyn FileStore>>,
    tasks: Option<Arc<dyn TaskStore>>,
    notifications: Option<Arc<dyn NotificationStore>>,
    artifacts: Option<Arc<dyn ArtifactStore>>,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn IdGenerator>>,
    config: SweeperConfig,
}

/// BuildError はスイーパー構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing collaborators: {0:?}. These must be provided before build().")]
    Missing(Vec<&'static str>),

    #[error(transparent)]
    InvalidConfig(#[from] SweepError),
}

impl SweeperBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use one backend for files, tasks and notifications.
    pub fn store<S>(self, store: Arc<S>) -> Self
    where
        S: FileStore + TaskStore + NotificationStore + 'static,
    {
        self.files(store.clone())
            .tasks(store.clone())
            .notifications(store)
    }

    pub fn files(mut self, files: Arc<dyn FileStore>) -> Self {
        self.files = Some(files);
        self
    }

    pub fn tasks(mut self, tasks: Arc<dyn TaskStore>) -> Self {
        self.tasks = Some(tasks);
        self
    }

    pub fn notifications(mut self, notifications: Arc<dyn NotificationStore>) -> Self {
        self.notifications = Some(notifications);
        self
    }

    pub fn artifacts(mut self, artifacts: Arc<dyn ArtifactStore>) -> Self {
        self.artifacts = Some(artifacts);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn config(mut self, config: SweeperConfig) -> Self {
        self.config = config;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.config.interval = interval;
        self
    }

    pub fn build(self) -> Result<Sweeper, BuildError> {
        let mut missing = Vec::new();
        if self.files.is_none() {
            missing.push("FileStore");
        }
        if self.tasks.is_none() {
            missing.push("TaskStore");
        }
        if self.notifications.is_none() {
            missing.push("NotificationStore");
        }
        if self.artifacts.is_none() {
            missing.push("ArtifactStore");
        }
        let (Some(files), Some(tasks), Some(notifications), Some(artifacts)) =
            (self.files, self.tasks, self.notifications, self.artifacts)
        else {
            return Err(BuildError::Missing(missing));
        };

        self.config.validate()?;

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let ids = self
            .ids
            .unwrap_or_else(|| Arc::new(UlidGenerator::new(Arc::clone(&clock))));

        Ok(Sweeper::new(
            RetentionExpiry::new(files, artifacts, Arc::clone(&clock)),
            DeadlineNotifier::new(tasks, notifications, Arc::clone(&clock), self.config.due_soon),
            clock,
            ids,
            self.config.interval,
        ))
    }
}
