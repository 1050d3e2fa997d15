use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{BoardId, TaskId, UserId};

/// A card as the sweeper sees it: read-only projection of the task row, its
/// assignees and the owner of the board it lives on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueTask {
    pub id: TaskId,
    pub board_id: BoardId,
    pub title: String,
    pub due_at: Option<DateTime<Utc>>,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub assignees: Vec<UserId>,
    /// `None` when the card is detached from a board.
    pub board_owner: Option<UserId>,
}

impl DueTask {
    /// Deep link the frontend resolves to the card on its board.
    pub fn link(&self) -> String {
        format!("/boards/{}#card-{}", self.board_id.get(), self.id.get())
    }
}
