use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::join;

use crate::domain::{Draft, Filter, Task, TaskId, TaskPatch, User, UserId};
use crate::ports::BoardRepository;

/// The board controller. Owns all client-side state (draft, active filter and
/// the two snapshots) and orchestrates the remote calls. Every
/// mutation is followed by a re-fetch under the active filter; the snapshot
/// is always replaced wholesale with the last successful response, never
/// merged.
///
/// Request failures collapse into a single pending notice the UI shows as a
/// blocking modal. Reads behave the same way: the prior snapshot stays and
/// the notice carries the raw error description.
pub struct Board {
    repo: Arc<dyn BoardRepository>,
    draft: Draft,
    filter: Filter,
    users: Vec<User>,
    tasks: Vec<Task>,
    notice: Option<String>,
}

impl Board {
    pub fn new(repo: Arc<dyn BoardRepository>) -> Self {
        Self {
            repo,
            draft: Draft::default(),
            filter: Filter::All,
            users: Vec::new(),
            tasks: Vec::new(),
            notice: None,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// The pending error notice, if any. Stays until dismissed.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    fn report_failure(&mut self, context: &str, err: impl std::fmt::Display) {
        tracing::warn!("{context} failed: {err}");
        self.notice = Some(format!("{err}"));
    }

    /// First activation: fetch the user list and the task list (All filter)
    /// concurrently. Neither depends on the other.
    pub async fn initialize(&mut self) {
        let (users, tasks) = join!(self.repo.list_users(), self.repo.list_tasks(Filter::All));
        match users {
            Ok(users) => self.users = users,
            Err(e) => self.report_failure("user fetch", e),
        }
        match tasks {
            Ok(tasks) => self.tasks = tasks,
            Err(e) => self.report_failure("task fetch", e),
        }
    }

    /// Fetch the task list under the given filter and replace the snapshot.
    /// On failure the snapshot is left as it was.
    pub async fn load_tasks(&mut self, filter: Filter) {
        match self.repo.list_tasks(filter).await {
            Ok(tasks) => self.tasks = tasks,
            Err(e) => self.report_failure("task fetch", e),
        }
    }

    pub async fn select_filter(&mut self, filter: Filter) {
        self.filter = filter;
        self.load_tasks(filter).await;
    }

    pub fn set_draft_contents(&mut self, contents: impl Into<String>) {
        self.draft.set_contents(contents);
    }

    /// Absent values are ignored; the draft keeps its previous deadline.
    pub fn set_draft_deadline(&mut self, deadline: Option<DateTime<Utc>>) {
        self.draft.set_deadline(deadline);
    }

    pub fn set_draft_assignee(&mut self, assignee: Option<UserId>) {
        self.draft.set_assignee(assignee);
    }

    /// Create a task from the draft. Silently does nothing while the draft
    /// contents are empty. Success or failure, the list is re-fetched and
    /// only the contents are cleared; deadline and assignee survive for
    /// the next entry.
    pub async fn submit_draft(&mut self) {
        let Some(new_task) = self.draft.to_new_task() else {
            return;
        };

        if let Err(e) = self.repo.create_task(&new_task).await {
            self.report_failure("task creation", e);
        }

        self.load_tasks(self.filter).await;
        self.draft.clear_contents();
    }

    /// Patch a single field of one task, then re-fetch to reflect server
    /// state. No optimistic local mutation.
    pub async fn update_task(&mut self, id: &TaskId, patch: TaskPatch) {
        if let Err(e) = self.repo.update_task(id, &patch).await {
            self.report_failure("task update", e);
        }

        self.load_tasks(self.filter).await;
    }

    /// Row action: move the task to the trash, or restore it.
    pub async fn toggle_trashed(&mut self, id: &TaskId) {
        let Some(task) = self.tasks.iter().find(|t| &t.id == id) else {
            return;
        };
        let patch = TaskPatch::Trashed(!task.trashed);
        self.update_task(id, patch).await;
    }

    /// Row action: flip the completed flag. Not invocable for trashed tasks;
    /// a trashed row issues no request at all.
    pub async fn toggle_completed(&mut self, id: &TaskId) {
        let Some(task) = self.tasks.iter().find(|t| &t.id == id) else {
            return;
        };
        if task.trashed {
            return;
        }
        let patch = TaskPatch::Completed(!task.completed);
        self.update_task(id, patch).await;
    }

    /// Permanently remove every trashed task. Only reachable from the Trash
    /// view; the backend owns the semantics, this is one opaque bulk call
    /// followed by the usual re-fetch.
    pub async fn empty_trash(&mut self) {
        if self.filter != Filter::Trashed {
            return;
        }

        if let Err(e) = self.repo.empty_trash().await {
            self.report_failure("emptying trash", e);
        }

        self.load_tasks(self.filter).await;
    }
}
