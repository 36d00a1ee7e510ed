//! Task completion and incident tracking.
//!
//! Both operations mutate one task's row state and nothing else. They
//! are last-writer-wins by design: concurrent clients editing the same
//! task do not conflict, whichever write lands last is what a re-fetch
//! observes. There is no uncomplete operation, so completion is
//! monotonic; incidents are fully orthogonal to completion and can be
//! reported, edited, or cleared on pending and completed tasks alike.

use chrono::Utc;
use tracing::info;

use crate::identity::Actor;
use crate::model::{new_id, Completion, Incident, Task};
use crate::store::Store;

mod error;


pub use error::MutationError;

/// Marks a task completed, attributed to the acting user at the current
/// time, and returns the updated task.
///
/// Re-invoking on an already-completed task is idempotent in state and
/// overwrites the attribution — last writer wins, no conflict is
/// raised.
///
/// # Errors
///
/// Returns [`MutationError::TaskNotFound`] if the id resolves to no
/// task, or a store error if the write fails; the caller keeps its
/// prior state and retries.
pub fn complete_task<S: Store + ?Sized>(
    store: &S,
    task_id: &str,
    acting_user: &Actor,
) -> Result<Task, MutationError> {
    let completion = Completion {
        by: acting_user.user_id.clone(),
        at: Utc::now(),
    };

    let task = store
        .mark_task_completed(task_id, &completion)?
        .ok_or_else(|| MutationError::TaskNotFound {
            task_id: task_id.to_string(),
        })?;

    info!(task = %task.id, by = %completion.by, "task completed");
    Ok(task)
}

/// Reports, edits, or clears the incident attached to a task, driven by
/// the note text:
///
/// - non-empty note, no incident → report one, attributed to the acting
///   user at the current time;
/// - non-empty note, incident exists → replace its note, preserving the
///   original reporter and report time;
/// - empty note, incident exists → delete it (the single removal
///   mechanism);
/// - empty note, no incident → no-op.
///
/// The note is trimmed before any of the above; a whitespace-only note
/// counts as empty. Returns the incident now attached to the task, or
/// `None` if none remains.
///
/// # Errors
///
/// Returns [`MutationError::TaskNotFound`] if the id resolves to no
/// task, or a store error if the write fails.
pub fn report_or_update_incident<S: Store + ?Sized>(
    store: &S,
    task_id: &str,
    acting_user: &Actor,
    note: &str,
) -> Result<Option<Incident>, MutationError> {
    let task = store
        .task(task_id)?
        .ok_or_else(|| MutationError::TaskNotFound {
            task_id: task_id.to_string(),
        })?;

    let note = note.trim();
    if note.is_empty() {
        if store.delete_incident_for_task(&task.id)? {
            info!(task = %task.id, "incident cleared");
        }
        return Ok(None);
    }

    let candidate = Incident {
        id: new_id(),
        task_id: task.id.clone(),
        shift_id: task.shift_id.clone(),
        reported_by: acting_user.user_id.clone(),
        note: note.to_string(),
        reported_at: Utc::now(),
    };
    let incident = store.upsert_incident_note(&candidate)?;

    info!(task = %task.id, incident = %incident.id, "incident recorded");
    Ok(Some(incident))
}
