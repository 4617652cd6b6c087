use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Filter, NewTask, Task, TaskId, TaskPatch, User};

#[derive(Error, Debug, Clone)]
pub enum RepositoryError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// The single seam to the backend service. Every remote operation the board
/// performs goes through here; tests substitute a mock to count and inspect
/// requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BoardRepository: Send + Sync {
    /// `GET /user`, the assignable users.
    async fn list_users(&self) -> RepositoryResult<Vec<User>>;

    /// `GET /todo` under the given filter's query parameters.
    async fn list_tasks(&self, filter: Filter) -> RepositoryResult<Vec<Task>>;

    /// `POST /todo`. The created task is returned but callers re-fetch the
    /// list rather than splicing it in.
    async fn create_task(&self, new_task: &NewTask) -> RepositoryResult<Task>;

    /// `PUT /todo/{id}` patching exactly one field.
    async fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> RepositoryResult<Task>;

    /// `PUT /todo/trash_box`: permanently remove all trashed tasks.
    async fn empty_trash(&self) -> RepositoryResult<()>;
}
