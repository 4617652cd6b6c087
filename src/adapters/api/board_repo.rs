use async_trait::async_trait;

use super::{ApiClient, TodoCreateDto, TodoDto, UserDto};
use crate::domain::{Filter, NewTask, Task, TaskId, TaskPatch, User};
use crate::ports::{BoardRepository, RepositoryResult};

pub struct HttpBoardRepository {
    client: ApiClient,
}

impl HttpBoardRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    fn build_list_query_params(filter: Filter) -> Vec<(String, String)> {
        let mut params = Vec::new();

        // is_trashed is always sent; is_completed only when the filter cares
        // about completion state.
        params.push(("is_trashed".to_string(), filter.trashed_param().to_string()));

        if let Some(completed) = filter.completed_param() {
            params.push(("is_completed".to_string(), completed.to_string()));
        }

        params
    }

    fn build_query_string(params: &[(String, String)]) -> String {
        if params.is_empty() {
            return String::new();
        }

        format!(
            "?{}",
            params
                .iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                .collect::<Vec<_>>()
                .join("&")
        )
    }

    fn list_path(filter: Filter) -> String {
        let params = Self::build_list_query_params(filter);
        format!("/todo{}", Self::build_query_string(&params))
    }
}

#[async_trait]
impl BoardRepository for HttpBoardRepository {
    async fn list_users(&self) -> RepositoryResult<Vec<User>> {
        let user_dtos: Vec<UserDto> = self.client.get_list("/user").await?;
        Ok(user_dtos.into_iter().map(|dto| dto.into()).collect())
    }

    async fn list_tasks(&self, filter: Filter) -> RepositoryResult<Vec<Task>> {
        let path = Self::list_path(filter);

        let todo_dtos: Vec<TodoDto> = self.client.get_list(&path).await?;
        Ok(todo_dtos.into_iter().map(|dto| dto.into()).collect())
    }

    async fn create_task(&self, new_task: &NewTask) -> RepositoryResult<Task> {
        let create_dto = TodoCreateDto::from(new_task);

        let todo_dto: TodoDto = self.client.post("/todo", &create_dto).await?;
        Ok(todo_dto.into())
    }

    async fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> RepositoryResult<Task> {
        let path = format!("/todo/{}", id.0);

        let todo_dto: TodoDto = self.client.put(&path, patch).await?;
        Ok(todo_dto.into())
    }

    async fn empty_trash(&self) -> RepositoryResult<()> {
        self.client.put_empty("/todo/trash_box").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_path_always_carries_is_trashed() {
        assert_eq!(
            HttpBoardRepository::list_path(Filter::All),
            "/todo?is_trashed=false"
        );
        assert_eq!(
            HttpBoardRepository::list_path(Filter::Trashed),
            "/todo?is_trashed=true"
        );
    }

    #[test]
    fn completion_filters_add_is_completed() {
        assert_eq!(
            HttpBoardRepository::list_path(Filter::Completed),
            "/todo?is_trashed=false&is_completed=true"
        );
        assert_eq!(
            HttpBoardRepository::list_path(Filter::Uncompleted),
            "/todo?is_trashed=false&is_completed=false"
        );
    }

    #[test]
    fn trash_filter_ignores_completion_state() {
        let params = HttpBoardRepository::build_list_query_params(Filter::Trashed);
        assert!(params.iter().all(|(k, _)| k != "is_completed"));
    }
}
