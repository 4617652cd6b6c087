use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        TaskId(s)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        TaskId(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub assignee_name: String,
    pub contents: String,
    /// Deadline as the server formats it for display.
    pub deadline: String,
    pub completed: bool,
    pub trashed: bool,
}

/// The four mutually exclusive view modes. Drives which query parameters
/// accompany the task-list fetch; not persisted across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Uncompleted,
    Completed,
    Trashed,
}

impl Filter {
    pub const ALL: [Filter; 4] = [
        Filter::All,
        Filter::Uncompleted,
        Filter::Completed,
        Filter::Trashed,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Uncompleted => "Uncompleted",
            Filter::Completed => "Completed",
            Filter::Trashed => "Trash",
        }
    }

    /// Value of the `is_trashed` query parameter, always sent.
    pub fn trashed_param(&self) -> bool {
        matches!(self, Filter::Trashed)
    }

    /// Value of the `is_completed` query parameter. `None` means the
    /// parameter is omitted entirely (All and Trashed don't care; the trash
    /// filter takes priority over completion state).
    pub fn completed_param(&self) -> Option<bool> {
        match self {
            Filter::Completed => Some(true),
            Filter::Uncompleted => Some(false),
            Filter::All | Filter::Trashed => None,
        }
    }

    pub fn next(&self) -> Filter {
        match self {
            Filter::All => Filter::Uncompleted,
            Filter::Uncompleted => Filter::Completed,
            Filter::Completed => Filter::Trashed,
            Filter::Trashed => Filter::All,
        }
    }

    pub fn prev(&self) -> Filter {
        match self {
            Filter::All => Filter::Trashed,
            Filter::Uncompleted => Filter::All,
            Filter::Completed => Filter::Uncompleted,
            Filter::Trashed => Filter::Completed,
        }
    }
}

impl std::str::FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "uncompleted" => Ok(Filter::Uncompleted),
            "completed" => Ok(Filter::Completed),
            "trashed" | "trash" => Ok(Filter::Trashed),
            other => Err(format!(
                "unknown filter '{other}' (expected all, uncompleted, completed or trashed)"
            )),
        }
    }
}

/// A single-field update to one task. Closed set of typed variants rather
/// than an open key/value map; each variant becomes a one-key JSON body on
/// the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskPatch {
    Completed(bool),
    Trashed(bool),
    Contents(String),
}

impl TaskPatch {
    /// Wire name of the patched field.
    pub fn field_name(&self) -> &'static str {
        match self {
            TaskPatch::Completed(_) => "is_completed",
            TaskPatch::Trashed(_) => "is_trashed",
            TaskPatch::Contents(_) => "contents",
        }
    }
}

/// Payload of a task-creation request.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub contents: String,
    pub deadline_at: DateTime<Utc>,
    pub assignee: Option<super::UserId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trashed_param_is_true_only_for_trash_filter() {
        for filter in Filter::ALL {
            assert_eq!(filter.trashed_param(), filter == Filter::Trashed);
        }
    }

    #[test]
    fn completed_param_present_only_for_completion_filters() {
        assert_eq!(Filter::All.completed_param(), None);
        assert_eq!(Filter::Trashed.completed_param(), None);
        assert_eq!(Filter::Completed.completed_param(), Some(true));
        assert_eq!(Filter::Uncompleted.completed_param(), Some(false));
    }

    #[test]
    fn filter_cycle_visits_all_codes() {
        let mut filter = Filter::All;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(filter);
            filter = filter.next();
        }
        assert_eq!(filter, Filter::All);
        assert_eq!(seen, Filter::ALL.to_vec());
        for f in Filter::ALL {
            assert_eq!(f.next().prev(), f);
        }
    }

    #[test]
    fn filter_parses_from_cli_names() {
        assert_eq!("all".parse::<Filter>(), Ok(Filter::All));
        assert_eq!("Completed".parse::<Filter>(), Ok(Filter::Completed));
        assert_eq!("trash".parse::<Filter>(), Ok(Filter::Trashed));
        assert!("done".parse::<Filter>().is_err());
    }
}
