use crate::error::ValidationError;
use crate::storage::Storage;
use crate::store::TaskStore;
use crate::task::Task;
use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Field {
    #[default]
    Title,
    Description,
    DueDate,
}

impl Field {
    pub fn next(self) -> Self {
        match self {
            Field::Title => Field::Description,
            Field::Description => Field::DueDate,
            Field::DueDate => Field::Title,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Field::Title => Field::DueDate,
            Field::Description => Field::Title,
            Field::DueDate => Field::Description,
        }
    }
}

/// What a successful submit asks the store to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Add(Task),
    Edit(Task),
}

/// The add/edit form. All validation happens here, before the store is
/// touched.
#[derive(Debug, Clone, Default)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub focus: Field,
    editing: Option<Task>,
}

impl TaskForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// A blank add form prefilled with a title and a due date string.
    pub fn filled(title: impl Into<String>, due_date: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            due_date: due_date.into(),
            ..Self::default()
        }
    }

    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: format_due_date(task.due_date),
            focus: Field::Title,
            editing: Some(task.clone()),
        }
    }

    pub fn is_edit(&self) -> bool {
        self.editing.is_some()
    }

    pub fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            Field::Title => &mut self.title,
            Field::Description => &mut self.description,
            Field::DueDate => &mut self.due_date,
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.focused_mut().push(c);
    }

    pub fn backspace(&mut self) {
        self.focused_mut().pop();
    }

    /// Validates the form against the current collection and builds the
    /// task to store. Nothing is mutated here.
    pub fn submit<S: Storage>(
        &self,
        store: &TaskStore<S>,
        now: DateTime<Utc>,
    ) -> Result<Submission, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let due_date = parse_due_date(&self.due_date)?;

        let own_id = self.editing.as_ref().map(|t| t.id.as_str());
        if store.title_taken(title, own_id) {
            return Err(ValidationError::DuplicateTitle);
        }

        let description = self.description.trim();
        Ok(match &self.editing {
            Some(original) => Submission::Edit(Task {
                id: original.id.clone(),
                title: title.to_string(),
                description: description.to_string(),
                due_date,
                completed: original.completed,
                created_at: original.created_at,
            }),
            None => Submission::Add(Task::new(title, description, due_date, now)),
        })
    }
}

/// Parses `YYYY-MM-DD` as local midnight of that day.
pub fn parse_due_date(input: &str) -> Result<DateTime<Utc>, ValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ValidationError::MissingDueDate);
    }
    let date = NaiveDate::parse_from_str(input, DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDueDate(input.to_string()))?;
    let midnight = date.and_time(NaiveTime::default());
    Ok(match Local.from_local_datetime(&midnight).earliest() {
        Some(local) => local.with_timezone(&Utc),
        // Midnight skipped by a DST jump.
        None => midnight.and_utc(),
    })
}

pub fn format_due_date(due: DateTime<Utc>) -> String {
    due.with_timezone(&Local).format(DATE_FORMAT).to_string()
}
