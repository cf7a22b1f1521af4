use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum StoreError {
    /// The in-memory change was applied but could not be written out.
    #[error("failed to save tasks: {0}")]
    Persist(#[source] StorageError),

    /// The slot exists but could not be read at all.
    #[error("failed to load tasks: {0}")]
    Load(#[source] StorageError),

    #[error("stored tasks could not be read: {0}")]
    Corrupt(#[source] StorageError),
}

/// Rejections raised by the task form before anything reaches the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title is required")]
    EmptyTitle,

    #[error("Due date is required")]
    MissingDueDate,

    #[error("Due date must look like YYYY-MM-DD, got {0:?}")]
    InvalidDueDate(String),

    #[error("A task with this title already exists")]
    DuplicateTitle,
}

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("no quotes available")]
    Empty,

    #[error("quote source failed: {0}")]
    Source(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
