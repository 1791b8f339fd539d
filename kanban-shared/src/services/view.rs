use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use super::{Kanban, KanbanResult};
use crate::auth::{authorization::visible_board, caller::Caller};
use crate::models::{board::Board, column::Column, task::Task};

/// A column with its tasks, both in rank order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnView {
    #[serde(flatten)]
    pub column: Column,
    pub tasks: Vec<Task>,
}

/// Whole-board snapshot
///
/// `unplaced` holds tasks created on this board whose column is no longer
/// one of the board's columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardView {
    pub board: Board,
    pub columns: Vec<ColumnView>,
    pub unplaced: Vec<Task>,
}

impl Kanban {
    /// The board grouped into columns, or `None` if the caller can't see it
    ///
    /// Composed from three reads, so under concurrent writers the parts may
    /// come from slightly different moments.
    pub async fn view_board(&self, caller: &Caller, board_id: Uuid) -> KanbanResult<Option<BoardView>> {
        let Some(board) = visible_board(self.store.as_ref(), caller, board_id).await? else {
            return Ok(None);
        };

        let columns = self.store.list_columns(board_id).await?;
        let tasks = self.store.list_tasks(board_id).await?;

        Ok(Some(assemble(board, columns, tasks)))
    }
}

fn assemble(board: Board, columns: Vec<Column>, tasks: Vec<Task>) -> BoardView {
    let mut grouped: HashMap<Uuid, Vec<Task>> = HashMap::new();
    let mut unplaced = Vec::new();

    for task in tasks {
        if columns.iter().any(|c| c.id == task.column_id) {
            grouped.entry(task.column_id).or_default().push(task);
        } else {
            unplaced.push(task);
        }
    }

    let columns = columns
        .into_iter()
        .map(|column| ColumnView {
            tasks: grouped.remove(&column.id).unwrap_or_default(),
            column,
        })
        .collect();

    BoardView {
        board,
        columns,
        unplaced,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::task::{CreateTask, MoveTask};
    use crate::store::{memory::MemoryStore, ranking::RankPolicy};

    #[tokio::test]
    async fn test_view_groups_tasks_by_column() {
        let kanban = Kanban::new(Arc::new(MemoryStore::new(RankPolicy::Append)));
        let me = Caller::User(Uuid::new_v4());
        let board_id = kanban.create_board(&me, "Sprint".to_string()).await.unwrap();
        let columns = kanban.list_columns(&me, board_id).await.unwrap();

        for title in ["Fix bug", "Write docs"] {
            kanban
                .create_task(
                    &me,
                    CreateTask {
                        title: title.to_string(),
                        description: None,
                        column_id: columns[0].id,
                        board_id,
                    },
                )
                .await
                .unwrap();
        }

        let view = kanban.view_board(&me, board_id).await.unwrap().unwrap();
        assert_eq!(view.board.id, board_id);
        assert_eq!(view.columns.len(), 3);
        assert_eq!(
            view.columns[0].tasks.iter().map(|t| t.title.as_str()).collect::<Vec<_>>(),
            vec!["Fix bug", "Write docs"]
        );
        assert!(view.columns[1].tasks.is_empty());
        assert!(view.unplaced.is_empty());

        assert!(kanban.view_board(&Caller::Anonymous, board_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_view_reports_tasks_moved_off_board() {
        let kanban = Kanban::new(Arc::new(MemoryStore::new(RankPolicy::Append)));
        let me = Caller::User(Uuid::new_v4());
        let home = kanban.create_board(&me, "Home".to_string()).await.unwrap();
        let away = kanban.create_board(&me, "Away".to_string()).await.unwrap();
        let home_columns = kanban.list_columns(&me, home).await.unwrap();
        let away_columns = kanban.list_columns(&me, away).await.unwrap();

        let task_id = kanban
            .create_task(
                &me,
                CreateTask {
                    title: "wanderer".to_string(),
                    description: None,
                    column_id: home_columns[0].id,
                    board_id: home,
                },
            )
            .await
            .unwrap();
        kanban
            .move_task(
                &me,
                task_id,
                MoveTask {
                    column_id: away_columns[1].id,
                    order: 0,
                },
            )
            .await
            .unwrap();

        let view = kanban.view_board(&me, home).await.unwrap().unwrap();
        assert_eq!(view.unplaced.len(), 1);
        assert_eq!(view.unplaced[0].id, task_id);
    }

    #[test]
    fn test_column_view_serializes_flat() {
        let column = Column {
            id: Uuid::new_v4(),
            name: "BACKLOG".to_string(),
            board_id: Uuid::new_v4(),
            order: 0,
            created_at: chrono::Utc::now(),
        };
        let json = serde_json::to_value(ColumnView {
            column,
            tasks: Vec::new(),
        })
        .unwrap();

        assert_eq!(json["name"], "BACKLOG");
        assert!(json["tasks"].as_array().unwrap().is_empty());
    }
}
