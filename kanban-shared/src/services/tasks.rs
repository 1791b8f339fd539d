use tracing::{debug, info};
use uuid::Uuid;

use super::{Kanban, KanbanResult};
use crate::auth::{
    authorization::{require_board_owner, require_column_owner, require_task_owner, visible_board},
    caller::Caller,
};
use crate::models::task::{CreateTask, MoveTask, Task, UpdateTask};

impl Kanban {
    /// A board's tasks by rank; empty unless the caller owns the board
    ///
    /// Ranks are per column, so callers regroup by `column_id`.
    pub async fn list_tasks(&self, caller: &Caller, board_id: Uuid) -> KanbanResult<Vec<Task>> {
        if visible_board(self.store.as_ref(), caller, board_id).await?.is_none() {
            return Ok(Vec::new());
        }

        Ok(self.store.list_tasks(board_id).await?)
    }

    /// Appends a task to a column on the caller's board
    ///
    /// The caller becomes the task's owner. A column on someone else's board
    /// is reported exactly like a missing one.
    pub async fn create_task(&self, caller: &Caller, data: CreateTask) -> KanbanResult<Uuid> {
        let board = require_board_owner(self.store.as_ref(), caller, data.board_id).await?;
        require_column_owner(self.store.as_ref(), caller, data.column_id).await?;

        let task = self.store.append_task(data, board.owner_id).await?;

        info!(
            task_id = %task.id,
            board_id = %task.board_id,
            column_id = %task.column_id,
            order = task.order,
            "Task created"
        );

        Ok(task.id)
    }

    /// Edits the title and/or description of the caller's task
    pub async fn update_task(
        &self,
        caller: &Caller,
        task_id: Uuid,
        data: UpdateTask,
    ) -> KanbanResult<()> {
        require_task_owner(self.store.as_ref(), caller, task_id).await?;

        if data.is_empty() {
            debug!(%task_id, "Empty task update");
            return Ok(());
        }

        self.store.update_task(task_id, data).await?;

        Ok(())
    }

    /// Moves the caller's task to a column and rank
    ///
    /// The destination column must be on one of the caller's boards; other
    /// users' columns are never re-ranked.
    pub async fn move_task(
        &self,
        caller: &Caller,
        task_id: Uuid,
        destination: MoveTask,
    ) -> KanbanResult<()> {
        let task = require_task_owner(self.store.as_ref(), caller, task_id).await?;
        require_column_owner(self.store.as_ref(), caller, destination.column_id).await?;

        let moved = self.store.move_task(task_id, destination).await?;

        info!(
            %task_id,
            from_column = %task.column_id,
            to_column = %moved.column_id,
            requested = destination.order,
            order = moved.order,
            "Task moved"
        );

        Ok(())
    }

    /// Deletes the caller's task
    pub async fn remove_task(&self, caller: &Caller, task_id: Uuid) -> KanbanResult<()> {
        require_task_owner(self.store.as_ref(), caller, task_id).await?;

        self.store.delete_task(task_id).await?;

        info!(%task_id, "Task deleted");

        Ok(())
    }
}
