use chrono::{DateTime, Utc};

use super::{NewTask, UserId};

/// The not-yet-submitted task being composed. Lives only in the controller's
/// working memory; after a submission attempt only the contents are cleared,
/// deadline and assignee stick around for the next entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    contents: String,
    deadline: Option<DateTime<Utc>>,
    assignee: Option<UserId>,
}

impl Draft {
    pub fn contents(&self) -> &str {
        &self.contents
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    pub fn assignee(&self) -> Option<&UserId> {
        self.assignee.as_ref()
    }

    pub fn set_contents(&mut self, contents: impl Into<String>) {
        self.contents = contents.into();
    }

    /// An absent value is ignored; the previously picked deadline stays.
    pub fn set_deadline(&mut self, deadline: Option<DateTime<Utc>>) {
        if let Some(deadline) = deadline {
            self.deadline = Some(deadline);
        }
    }

    pub fn set_assignee(&mut self, assignee: Option<UserId>) {
        self.assignee = assignee;
    }

    pub fn clear_contents(&mut self) {
        self.contents.clear();
    }

    /// Build the creation payload, or `None` when the contents are empty
    /// (an empty draft is never submitted). A missing deadline falls back to
    /// the current time.
    pub fn to_new_task(&self) -> Option<NewTask> {
        if self.contents.is_empty() {
            return None;
        }
        Some(NewTask {
            contents: self.contents.clone(),
            deadline_at: self.deadline.unwrap_or_else(Utc::now),
            assignee: self.assignee.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn deadline_setter_ignores_absent_value() {
        let mut draft = Draft::default();
        let picked = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        draft.set_deadline(None);
        assert_eq!(draft.deadline(), None);

        draft.set_deadline(Some(picked));
        draft.set_deadline(None);
        assert_eq!(draft.deadline(), Some(picked));
    }

    #[test]
    fn empty_contents_yields_no_payload() {
        let mut draft = Draft::default();
        draft.set_assignee(Some("u1".into()));
        assert_eq!(draft.to_new_task(), None);
    }

    #[test]
    fn clear_contents_keeps_deadline_and_assignee() {
        let mut draft = Draft::default();
        let picked = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        draft.set_contents("buy milk");
        draft.set_deadline(Some(picked));
        draft.set_assignee(Some("u1".into()));

        draft.clear_contents();
        assert_eq!(draft.contents(), "");
        assert_eq!(draft.deadline(), Some(picked));
        assert_eq!(draft.assignee(), Some(&UserId::from("u1")));
    }

    #[test]
    fn missing_deadline_falls_back_to_now() {
        let mut draft = Draft::default();
        draft.set_contents("buy milk");
        let before = Utc::now();
        let payload = draft.to_new_task().unwrap();
        let after = Utc::now();
        assert!(payload.deadline_at >= before && payload.deadline_at <= after);
        assert_eq!(payload.assignee, None);
    }
}
