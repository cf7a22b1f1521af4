//! Turns drag-and-drop gestures on the two-bucket board into store commands.
//!
//! Bucket membership comes from `completed` alone, so a drop never splices
//! the list. The source index only identifies which task was dragged; the
//! destination index is ignored. When the grab recorded the task id, a drop
//! whose source index now points at a different task is refused.

use crate::error::StoreResult;
use crate::storage::Storage;
use crate::store::TaskStore;
use crate::task::{Bucket, Filter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragLocation {
    pub bucket: Bucket,
    pub index: usize,
}

impl DragLocation {
    pub fn new(bucket: Bucket, index: usize) -> Self {
        Self { bucket, index }
    }
}

/// A task picked up from the board, remembered by position and by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grab {
    pub source: DragLocation,
    pub id: String,
}

impl Grab {
    pub fn new(source: DragLocation, id: impl Into<String>) -> Self {
        Self {
            source,
            id: id.into(),
        }
    }

    pub fn drop_at(self, destination: Option<DragLocation>) -> DropResult {
        DropResult {
            source: self.source,
            destination,
            dragged: Some(self.id),
        }
    }
}

/// A finished drag. `destination` is `None` when the drop landed outside
/// any bucket. `dragged` is the id seen at grab time, if known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropResult {
    pub source: DragLocation,
    pub destination: Option<DragLocation>,
    pub dragged: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Filtered,
    Cancelled,
    DroppedInPlace,
    SameBucket,
    UnknownSource,
    /// The collection changed under the drag; the index names another task.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    Ignored(IgnoreReason),
    Toggle {
        id: String,
        title: String,
        to: Bucket,
    },
}

/// Works out what a drop means without touching the store.
pub fn reconcile<S: Storage>(store: &TaskStore<S>, result: &DropResult) -> DragOutcome {
    if store.filter() != Filter::All {
        return DragOutcome::Ignored(IgnoreReason::Filtered);
    }
    let Some(destination) = result.destination else {
        return DragOutcome::Ignored(IgnoreReason::Cancelled);
    };
    if destination == result.source {
        return DragOutcome::Ignored(IgnoreReason::DroppedInPlace);
    }
    if destination.bucket == result.source.bucket {
        return DragOutcome::Ignored(IgnoreReason::SameBucket);
    }

    match store.bucket(result.source.bucket).get(result.source.index) {
        Some(task) if result.dragged.as_deref().is_some_and(|id| id != task.id) => {
            DragOutcome::Ignored(IgnoreReason::Stale)
        }
        Some(task) => DragOutcome::Toggle {
            id: task.id.clone(),
            title: task.title.clone(),
            to: destination.bucket,
        },
        None => DragOutcome::Ignored(IgnoreReason::UnknownSource),
    }
}

/// Reconciles `result` and applies the resulting toggle, if any.
pub fn apply_drop<S: Storage>(
    store: &mut TaskStore<S>,
    result: &DropResult,
) -> StoreResult<DragOutcome> {
    let outcome = reconcile(store, result);
    match &outcome {
        DragOutcome::Toggle { id, to, .. } => {
            tracing::debug!(id = %id, to = %to, "drop moves task across buckets");
            store.toggle_complete(id)?;
        }
        DragOutcome::Ignored(reason) => {
            tracing::trace!(?reason, "drop ignored");
        }
    }
    Ok(outcome)
}
