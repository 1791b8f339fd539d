use tracing::info;
use uuid::Uuid;

use super::{Kanban, KanbanResult};
use crate::auth::{
    authorization::{require_board_owner, require_column_owner, visible_board},
    caller::Caller,
};
use crate::models::column::{Column, CreateColumn};

impl Kanban {
    /// A board's columns by rank; empty unless the caller owns the board
    pub async fn list_columns(&self, caller: &Caller, board_id: Uuid) -> KanbanResult<Vec<Column>> {
        if visible_board(self.store.as_ref(), caller, board_id).await?.is_none() {
            return Ok(Vec::new());
        }

        Ok(self.store.list_columns(board_id).await?)
    }

    /// Appends a column to the caller's board
    pub async fn create_column(
        &self,
        caller: &Caller,
        board_id: Uuid,
        name: String,
    ) -> KanbanResult<Uuid> {
        require_board_owner(self.store.as_ref(), caller, board_id).await?;

        let column = self.store.append_column(CreateColumn { board_id, name }).await?;

        info!(column_id = %column.id, %board_id, order = column.order, "Column created");

        Ok(column.id)
    }

    /// Deletes a column and the tasks in it
    pub async fn remove_column(&self, caller: &Caller, column_id: Uuid) -> KanbanResult<()> {
        require_column_owner(self.store.as_ref(), caller, column_id).await?;

        let removal = self.store.delete_column(column_id).await?;

        info!(%column_id, tasks_removed = removal.tasks_removed, "Column deleted");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::task::CreateTask;
    use crate::services::KanbanError;
    use crate::store::{memory::MemoryStore, ranking::RankPolicy};

    async fn setup(policy: RankPolicy) -> (Kanban, Caller, Uuid) {
        let kanban = Kanban::new(Arc::new(MemoryStore::new(policy)));
        let me = Caller::User(Uuid::new_v4());
        let board_id = kanban.create_board(&me, "Sprint".to_string()).await.unwrap();
        (kanban, me, board_id)
    }

    #[tokio::test]
    async fn test_create_column_order_is_count() {
        let (kanban, me, board_id) = setup(RankPolicy::Append).await;

        let review = kanban.create_column(&me, board_id, "REVIEW".to_string()).await.unwrap();
        let columns = kanban.list_columns(&me, board_id).await.unwrap();

        assert_eq!(columns.len(), 4);
        assert_eq!(columns[3].id, review);
        assert_eq!(columns[3].order, 3);
    }

    #[tokio::test]
    async fn test_remove_column_deletes_its_tasks() {
        let (kanban, me, board_id) = setup(RankPolicy::Append).await;
        let columns = kanban.list_columns(&me, board_id).await.unwrap();

        for (column, title) in [(&columns[0], "a"), (&columns[0], "b"), (&columns[1], "c")] {
            kanban
                .create_task(
                    &me,
                    CreateTask {
                        title: title.to_string(),
                        description: None,
                        column_id: column.id,
                        board_id,
                    },
                )
                .await
                .unwrap();
        }

        kanban.remove_column(&me, columns[0].id).await.unwrap();

        let tasks = kanban.list_tasks(&me, board_id).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "c");

        assert!(matches!(
            kanban.remove_column(&me, columns[0].id).await,
            Err(KanbanError::NotFound { entity: "column" })
        ));
    }

    #[tokio::test]
    async fn test_column_order_can_collide_under_append() {
        let (kanban, me, board_id) = setup(RankPolicy::Append).await;
        let columns = kanban.list_columns(&me, board_id).await.unwrap();

        kanban.remove_column(&me, columns[0].id).await.unwrap();
        kanban.create_column(&me, board_id, "REVIEW".to_string()).await.unwrap();

        let orders: Vec<i32> = kanban
            .list_columns(&me, board_id)
            .await
            .unwrap()
            .iter()
            .map(|c| c.order)
            .collect();
        assert_eq!(orders, vec![1, 2, 2]);
    }

    #[tokio::test]
    async fn test_columns_stay_dense_under_dense_policy() {
        let (kanban, me, board_id) = setup(RankPolicy::Dense).await;
        let columns = kanban.list_columns(&me, board_id).await.unwrap();

        kanban.remove_column(&me, columns[0].id).await.unwrap();
        kanban.create_column(&me, board_id, "REVIEW".to_string()).await.unwrap();

        let listed = kanban.list_columns(&me, board_id).await.unwrap();
        assert_eq!(
            listed.iter().map(|c| (c.name.as_str(), c.order)).collect::<Vec<_>>(),
            vec![("IN PROGRESS", 0), ("DONE", 1), ("REVIEW", 2)]
        );
    }

    #[tokio::test]
    async fn test_columns_isolated_between_users() {
        let (kanban, me, board_id) = setup(RankPolicy::Append).await;
        let stranger = Caller::User(Uuid::new_v4());
        let columns = kanban.list_columns(&me, board_id).await.unwrap();

        assert!(kanban.list_columns(&stranger, board_id).await.unwrap().is_empty());
        assert!(kanban.list_columns(&Caller::Anonymous, board_id).await.unwrap().is_empty());
        assert!(matches!(
            kanban.create_column(&stranger, board_id, "X".to_string()).await,
            Err(KanbanError::NotFound { entity: "board" })
        ));
        assert!(matches!(
            kanban.remove_column(&stranger, columns[0].id).await,
            Err(KanbanError::NotFound { entity: "column" })
        ));
        assert!(matches!(
            kanban.create_column(&Caller::Anonymous, board_id, "X".to_string()).await,
            Err(KanbanError::Unauthenticated)
        ));
    }
}
