use tracing::info;
use uuid::Uuid;

use super::{Kanban, KanbanResult};
use crate::auth::{
    authorization::{require_board_owner, require_user, visible_board},
    caller::Caller,
};
use crate::models::board::{Board, CreateBoard, DEFAULT_COLUMNS};

impl Kanban {
    /// The caller's boards, newest first; empty when anonymous
    pub async fn list_boards(&self, caller: &Caller) -> KanbanResult<Vec<Board>> {
        let Some(user_id) = caller.user_id() else {
            return Ok(Vec::new());
        };

        Ok(self.store.list_boards(user_id).await?)
    }

    /// The board if the caller owns it
    pub async fn get_board(&self, caller: &Caller, board_id: Uuid) -> KanbanResult<Option<Board>> {
        Ok(visible_board(self.store.as_ref(), caller, board_id).await?)
    }

    /// Creates a board seeded with the default columns
    pub async fn create_board(&self, caller: &Caller, name: String) -> KanbanResult<Uuid> {
        let owner_id = require_user(caller)?;

        let (board, columns) = self
            .store
            .create_board(CreateBoard { name, owner_id }, &DEFAULT_COLUMNS)
            .await?;

        info!(board_id = %board.id, %owner_id, columns = columns.len(), "Board created");

        Ok(board.id)
    }

    /// Deletes a board with all its columns and tasks
    pub async fn remove_board(&self, caller: &Caller, board_id: Uuid) -> KanbanResult<()> {
        require_board_owner(self.store.as_ref(), caller, board_id).await?;

        let removal = self.store.delete_board(board_id).await?;

        info!(
            %board_id,
            columns_removed = removal.columns_removed,
            tasks_removed = removal.tasks_removed,
            "Board deleted"
        );

        Ok(())
    }
}
