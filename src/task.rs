use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A single to-do record. Field names on disk follow the camelCase layout
/// of the storage slot (`dueDate`, `createdAt`).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Builds a fresh, pending task with a new id.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        due_date: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: description.into(),
            due_date,
            completed: false,
            created_at,
        }
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.due_date < now
    }

    pub fn status(&self, now: DateTime<Utc>) -> Status {
        if self.completed {
            Status::Completed
        } else if self.is_overdue(now) {
            Status::Overdue
        } else {
            Status::Pending
        }
    }
}

/// Which derived view of the collection is shown. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    All,
    Pending,
    Completed,
}

impl Filter {
    pub const ALL: [Filter; 3] = [Filter::All, Filter::Pending, Filter::Completed];

    pub fn matches(self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Pending => !task.completed,
            Filter::Completed => task.completed,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Filter::All => Filter::Pending,
            Filter::Pending => Filter::Completed,
            Filter::Completed => Filter::All,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Pending => "pending",
            Filter::Completed => "completed",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "pending" => Ok(Filter::Pending),
            "completed" => Ok(Filter::Completed),
            other => Err(format!("unknown filter: {other}")),
        }
    }
}

/// One of the two display groupings on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Pending,
    Completed,
}

impl Bucket {
    pub fn id(self) -> &'static str {
        match self {
            Bucket::Pending => "pending",
            Bucket::Completed => "completed",
        }
    }

    pub fn filter(self) -> Filter {
        match self {
            Bucket::Pending => Filter::Pending,
            Bucket::Completed => Filter::Completed,
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Badge shown on a task card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Pending,
    Overdue,
    Completed,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::Overdue => "Overdue",
            Status::Completed => "Completed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn pending_task_past_due_is_overdue() {
        let task = Task::new("Pay rent", "", now() - Duration::hours(1), now());
        assert!(task.is_overdue(now()));
        assert_eq!(task.status(now()), Status::Overdue);
    }

    #[test]
    fn completed_task_is_never_overdue() {
        let mut task = Task::new("Pay rent", "", now() - Duration::days(30), now());
        task.completed = true;
        assert!(!task.is_overdue(now()));
        assert_eq!(task.status(now()), Status::Completed);
    }

    #[test]
    fn due_exactly_now_is_not_overdue() {
        let task = Task::new("Call mom", "", now(), now());
        assert!(!task.is_overdue(now()));
        assert_eq!(task.status(now()), Status::Pending);
    }

    #[test]
    fn fresh_tasks_get_distinct_ids() {
        let a = Task::new("a", "", now(), now());
        let b = Task::new("b", "", now(), now());
        assert_ne!(a.id, b.id);
        assert!(!a.completed);
    }

    #[test]
    fn serializes_with_camel_case_dates() {
        let task = Task::new("Buy milk", "2%", now(), now());
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["dueDate"], "2024-05-10T12:00:00Z");
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["completed"], false);
    }

    #[test]
    fn filter_parses_and_cycles() {
        assert_eq!("Pending".parse::<Filter>().unwrap(), Filter::Pending);
        assert!("done".parse::<Filter>().is_err());
        assert_eq!(Filter::Completed.next(), Filter::All);
        assert_eq!(Filter::All.to_string(), "all");
    }
}
