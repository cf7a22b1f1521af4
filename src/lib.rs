pub mod app;
pub mod config;
pub mod drag;
pub mod error;
pub mod form;
pub mod logging;
pub mod notify;
pub mod quote;
pub mod storage;
pub mod store;
pub mod task;
pub mod ui;

pub use drag::{apply_drop, reconcile, DragLocation, DragOutcome, DropResult, Grab};
pub use error::{StorageError, StoreError, ValidationError};
pub use storage::{JsonFileStorage, MemoryStorage, Storage};
pub use store::TaskStore;
pub use task::{Bucket, Filter, Task};
