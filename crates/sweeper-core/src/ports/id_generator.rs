//! IdGenerator port - ID 生成の抽象化
//!
//! Only sweep cycles get ids minted here; row ids come from the database.
//!
//! # 実装
//! - **UlidGenerator**: ULID ベース（本番用）

use std::sync::Arc;

use crate::domain::ids::SweepId;
use crate::ports::Clock;
use ulid::Ulid;

/// IdGenerator はサイクル ID を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（ループのタスクから使う）
pub trait IdGenerator: Send + Sync {
    fn generate_sweep_id(&self) -> SweepId;
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// timestamp 部分は Clock から取るので、FixedClock を使えば
/// テストでも決定的な順序になります。
pub struct UlidGenerator {
    clock: Arc<dyn Clock>,
}

impl UlidGenerator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl IdGenerator for UlidGenerator {
    fn generate_sweep_id(&self) -> SweepId {
        let timestamp_ms = self.clock.now().timestamp_millis().max(0) as u64;
        SweepId::from(Ulid::from_parts(timestamp_ms, rand::random()))
    }
}
