//! Sweeper configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::deadline::MAX_DUE_SOON_DAYS;
use crate::domain::{DueSoonWindow, SweepError, SweepResult};

pub const DEFAULT_INTERVAL_SECS: u64 = 3600;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweeperConfig {
    /// Wait between the end of one cycle and the start of the next.
    #[serde(with = "interval_secs")]
    pub interval: Duration,
    pub due_soon: DueSoonWindow,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            due_soon: DueSoonWindow::default(),
        }
    }
}

impl SweeperConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_due_soon_days(mut self, days_ahead: u32) -> Self {
        self.due_soon = DueSoonWindow { days_ahead };
        self
    }

    pub fn validate(&self) -> SweepResult<()> {
        if self.interval.is_zero() {
            return Err(SweepError::Config("interval must be greater than zero".to_string()));
        }
        if self.due_soon.days_ahead > MAX_DUE_SOON_DAYS {
            return Err(SweepError::Config(format!(
                "due-soon window must be at most {MAX_DUE_SOON_DAYS} days, got {}",
                self.due_soon.days_ahead
            )));
        }
        Ok(())
    }
}

mod interval_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
