/// Kanban operations
///
/// [`Kanban`] is the operation surface the API calls: board, column and task
/// CRUD plus the composed board view. Each operation takes the caller,
/// runs the ownership guard, then makes exactly one store call for its
/// mutation, so atomicity is whatever the store gives that call.
///
/// # Read/write asymmetry
///
/// Reads never fail on identity: an anonymous caller or a non-owner gets an
/// empty list or `None`. Writes fail with [`KanbanError::Unauthenticated`] or
/// [`KanbanError::NotFound`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use kanban_shared::auth::caller::Caller;
/// use kanban_shared::services::Kanban;
/// use kanban_shared::store::{memory::MemoryStore, ranking::RankPolicy};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), kanban_shared::services::KanbanError> {
/// let kanban = Kanban::new(Arc::new(MemoryStore::new(RankPolicy::Append)));
/// let me = Caller::User(Uuid::new_v4());
///
/// let board_id = kanban.create_board(&me, "Sprint".to_string()).await?;
/// let columns = kanban.list_columns(&me, board_id).await?;
/// assert_eq!(columns.len(), 3);
/// # Ok(())
/// # }
/// ```

mod boards;
mod columns;
mod tasks;
mod view;

pub use view::{BoardView, ColumnView};

use std::sync::Arc;

use crate::auth::authorization::AuthzError;
use crate::store::{KanbanStore, StoreError};

/// Error type for kanban operations
#[derive(Debug, thiserror::Error)]
pub enum KanbanError {
    /// Write attempted without identity
    #[error("Authentication required")]
    Unauthenticated,

    /// Entity missing or not owned by the caller
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// Store failure
    #[error(transparent)]
    Store(StoreError),
}

impl From<AuthzError> for KanbanError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Unauthenticated => KanbanError::Unauthenticated,
            AuthzError::NotFound(entity) => KanbanError::NotFound { entity },
            AuthzError::Store(e) => e.into(),
        }
    }
}

impl From<StoreError> for KanbanError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(entity) => KanbanError::NotFound { entity },
            other => KanbanError::Store(other),
        }
    }
}

/// Kanban result type alias
pub type KanbanResult<T> = Result<T, KanbanError>;

/// Kanban operations over a shared store
#[derive(Clone)]
pub struct Kanban {
    store: Arc<dyn KanbanStore>,
}

impl Kanban {
    pub fn new(store: Arc<dyn KanbanStore>) -> Self {
        Self { store }
    }

    /// The store these operations run against
    pub fn store(&self) -> &Arc<dyn KanbanStore> {
        &self.store
    }
}

impl std::fmt::Debug for Kanban {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kanban")
            .field("backend", &self.store.backend())
            .field("rank_policy", &self.store.rank_policy())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_not_found_maps_to_entity() {
        let err: KanbanError = StoreError::NotFound("column").into();
        assert!(matches!(err, KanbanError::NotFound { entity: "column" }));
        assert_eq!(err.to_string(), "column not found");
    }

    #[test]
    fn test_authz_errors_map() {
        assert!(matches!(
            KanbanError::from(AuthzError::Unauthenticated),
            KanbanError::Unauthenticated
        ));
        assert!(matches!(
            KanbanError::from(AuthzError::Store(StoreError::Conflict("x".into()))),
            KanbanError::Store(StoreError::Conflict(_))
        ));
    }
}
