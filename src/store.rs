use crate::error::{StorageError, StoreError, StoreResult};
use crate::storage::{load_tasks, save_tasks, Storage};
use crate::task::{Bucket, Filter, Task};

/// The single source of truth for the task collection.
///
/// Insertion order is the display order. Every mutation that changes the
/// collection is written back to the storage slot before returning.
#[derive(Debug)]
pub struct TaskStore<S: Storage> {
    tasks: Vec<Task>,
    filter: Filter,
    storage: S,
}

impl<S: Storage> TaskStore<S> {
    /// Hydrates the collection from `storage`; an empty slot gives an empty
    /// store.
    pub fn open(storage: S) -> StoreResult<Self> {
        let tasks = load_tasks(&storage).map_err(|err| match err {
            StorageError::Io(_) => StoreError::Load(err),
            StorageError::Serialization(_) => StoreError::Corrupt(err),
        })?;
        tracing::info!(count = tasks.len(), "tasks loaded");
        Ok(Self {
            tasks,
            filter: Filter::All,
            storage,
        })
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    pub fn filtered_view(&self, filter: Filter) -> Vec<&Task> {
        self.tasks.iter().filter(|t| filter.matches(t)).collect()
    }

    /// The view selected by the current filter.
    pub fn visible(&self) -> Vec<&Task> {
        self.filtered_view(self.filter)
    }

    pub fn bucket(&self, bucket: Bucket) -> Vec<&Task> {
        self.filtered_view(bucket.filter())
    }

    /// True when another task already uses `title`, ignoring surrounding
    /// whitespace and case. `own_id` excludes the task being edited.
    pub fn title_taken(&self, title: &str, own_id: Option<&str>) -> bool {
        let wanted = title.trim().to_lowercase();
        self.tasks
            .iter()
            .any(|t| t.title.trim().to_lowercase() == wanted && Some(t.id.as_str()) != own_id)
    }

    /// Appends a validated task.
    pub fn add(&mut self, task: Task) -> StoreResult<()> {
        tracing::info!(id = %task.id, title = %task.title, "task added");
        self.tasks.push(task);
        self.persist()
    }

    /// Replaces the task with the same id in place. Returns `false` (and
    /// writes nothing) when no such task exists.
    pub fn edit(&mut self, task: Task) -> StoreResult<bool> {
        let Some(slot) = self.tasks.iter_mut().find(|t| t.id == task.id) else {
            tracing::debug!(id = %task.id, "edit ignored, unknown id");
            return Ok(false);
        };
        tracing::info!(id = %task.id, "task edited");
        *slot = task;
        self.persist()?;
        Ok(true)
    }

    /// Removes the task with `id`. Returns whether anything was removed.
    pub fn delete(&mut self, id: &str) -> StoreResult<bool> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            tracing::debug!(id, "delete ignored, unknown id");
            return Ok(false);
        }
        tracing::info!(id, "task deleted");
        self.persist()?;
        Ok(true)
    }

    /// Flips `completed`. Returns the new value, or `None` for an unknown id.
    pub fn toggle_complete(&mut self, id: &str) -> StoreResult<Option<bool>> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            tracing::debug!(id, "toggle ignored, unknown id");
            return Ok(None);
        };
        task.completed = !task.completed;
        let completed = task.completed;
        tracing::info!(id, completed, "task toggled");
        self.persist()?;
        Ok(Some(completed))
    }

    fn persist(&mut self) -> StoreResult<()> {
        save_tasks(&mut self.storage, &self.tasks).map_err(|err| {
            tracing::error!(error = %err, "failed to save tasks");
            StoreError::Persist(err)
        })
    }
}
