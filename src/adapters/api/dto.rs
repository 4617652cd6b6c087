use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::domain::{NewTask, Task, TaskId, TaskPatch, User, UserId};

// DTOs matching the backend wire contract.

#[derive(Debug, Serialize, Deserialize)]
pub struct TodoDto {
    pub id: String,
    pub user_name: String,
    pub contents: String,
    pub deadline_str: String,
    pub is_completed: bool,
    pub is_trashed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserDto {
    pub id: String,
    pub full_name: String,
}

#[derive(Debug, Serialize)]
pub struct TodoCreateDto {
    pub contents: String,
    pub deadline_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl From<TodoDto> for Task {
    fn from(dto: TodoDto) -> Self {
        Self {
            id: TaskId(dto.id),
            assignee_name: dto.user_name,
            contents: dto.contents,
            deadline: dto.deadline_str,
            completed: dto.is_completed,
            trashed: dto.is_trashed,
        }
    }
}

impl From<UserDto> for User {
    fn from(dto: UserDto) -> Self {
        Self {
            id: UserId(dto.id),
            full_name: dto.full_name,
        }
    }
}

impl From<&NewTask> for TodoCreateDto {
    fn from(new_task: &NewTask) -> Self {
        Self {
            contents: new_task.contents.clone(),
            deadline_at: new_task.deadline_at,
            user_id: new_task.assignee.as_ref().map(|id| id.0.clone()),
        }
    }
}

// `PUT /todo/{id}` takes a body with exactly one field; the patch variant
// decides which key appears.
impl Serialize for TaskPatch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            TaskPatch::Completed(value) => map.serialize_entry(self.field_name(), value)?,
            TaskPatch::Trashed(value) => map.serialize_entry(self.field_name(), value)?,
            TaskPatch::Contents(value) => map.serialize_entry(self.field_name(), value)?,
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn patch_serializes_to_exactly_one_key() {
        let body = serde_json::to_value(TaskPatch::Completed(true)).unwrap();
        assert_eq!(body, json!({ "is_completed": true }));
        assert_eq!(body.as_object().unwrap().len(), 1);

        let body = serde_json::to_value(TaskPatch::Trashed(false)).unwrap();
        assert_eq!(body, json!({ "is_trashed": false }));

        let body = serde_json::to_value(TaskPatch::Contents("rewrite".into())).unwrap();
        assert_eq!(body, json!({ "contents": "rewrite" }));
    }

    #[test]
    fn create_body_omits_absent_assignee() {
        let deadline = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let dto = TodoCreateDto::from(&NewTask {
            contents: "buy milk".to_string(),
            deadline_at: deadline,
            assignee: None,
        });

        let body = serde_json::to_value(&dto).unwrap();
        assert_eq!(body["contents"], "buy milk");
        assert_eq!(body["deadline_at"], "2024-05-01T12:00:00Z");
        assert!(body.get("user_id").is_none());
    }

    #[test]
    fn create_body_carries_assignee_id() {
        let dto = TodoCreateDto::from(&NewTask {
            contents: "buy milk".to_string(),
            deadline_at: Utc::now(),
            assignee: Some("u1".into()),
        });

        let body = serde_json::to_value(&dto).unwrap();
        assert_eq!(body["user_id"], "u1");
    }

    #[test]
    fn todo_dto_maps_onto_domain_task() {
        let dto: TodoDto = serde_json::from_value(json!({
            "id": "7",
            "user_name": "Alice Example",
            "contents": "buy milk",
            "deadline_str": "2024-05-01 12:00",
            "is_completed": true,
            "is_trashed": false
        }))
        .unwrap();

        let task: Task = dto.into();
        assert_eq!(task.id, TaskId::from("7"));
        assert_eq!(task.assignee_name, "Alice Example");
        assert_eq!(task.deadline, "2024-05-01 12:00");
        assert!(task.completed);
        assert!(!task.trashed);
    }
}
