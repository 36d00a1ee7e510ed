//! Idempotent provisioning of shifts and their checklists.
//!
//! A date's shifts and a shift's tasks are created lazily the first time
//! someone looks at them, so provisioning runs on every view entry and
//! must be safe to repeat and to race: two clients opening the same date
//! at once still end up with exactly one opening and one closing shift,
//! each carrying exactly one copy of the catalog checklist.
//!
//! Both operations lean on the store's conditional inserts rather than a
//! check-then-insert sequence. The shift pair goes through
//! insert-if-absent over the `(location, date, kind, area)` key; the
//! task batch is guarded by the secondary `(shift, subcategory, text)`
//! key, so even a double materialization race inserts nothing twice.
//!
//! The one deliberate staleness: a shift that already has any task is
//! considered materialized and is never reconciled against the current
//! catalog, so catalog changes only reach shifts provisioned after the
//! change ships.

use std::collections::BTreeSet;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::catalog;
use crate::model::{new_id, Shift, ShiftKey, ShiftKind, ShiftPair, Task, TaskStatus, DEFAULT_AREA};
use crate::store::Store;

mod error;

#[cfg(test)]
mod tests;

pub use error::ProvisionError;

/// Ensures exactly one opening and one closing shift exist for the
/// location and day, creating whichever are missing, and returns the
/// resolved pair.
///
/// `location_id` of `None` addresses the legacy no-location shift pair.
///
/// # Errors
///
/// Returns [`ProvisionError`] if the store fails; the caller must not
/// assume the shifts exist and should retry the whole call.
pub fn ensure_shift_pair<S: Store + ?Sized>(
    store: &S,
    location_id: Option<&str>,
    date: NaiveDate,
) -> Result<ShiftPair, ProvisionError> {
    let opening = ensure_shift(store, location_id, date, ShiftKind::Opening)?;
    let closing = ensure_shift(store, location_id, date, ShiftKind::Closing)?;
    Ok(ShiftPair { opening, closing })
}

fn ensure_shift<S: Store + ?Sized>(
    store: &S,
    location_id: Option<&str>,
    date: NaiveDate,
    kind: ShiftKind,
) -> Result<Shift, ProvisionError> {
    let candidate = Shift {
        id: new_id(),
        location_id: location_id.map(ToString::to_string),
        date,
        kind,
        area: DEFAULT_AREA.to_string(),
        assigned_users: BTreeSet::new(),
        created_at: Utc::now(),
    };

    if store.insert_shift_if_absent(&candidate)? {
        info!(%kind, %date, location = ?location_id, "provisioned shift");
    } else {
        debug!(%kind, %date, location = ?location_id, "shift already provisioned");
    }

    // Re-read to observe whichever insert won the key.
    let key = ShiftKey::with_default_area(location_id, date, kind);
    store
        .find_shift(&key)?
        .ok_or(ProvisionError::ShiftUnresolved { date, kind })
}

/// Ensures the shift's checklist is materialized from the task catalog.
///
/// A shift with any task at all is treated as already materialized and
/// left untouched. Otherwise the catalog for the shift's kind is
/// flattened into one pending task per `(subcategory, text)` pair and
/// inserted as a single batch.
///
/// # Errors
///
/// Returns [`ProvisionError`] if the store fails; no checklist should be
/// rendered until a retry succeeds.
pub fn ensure_tasks<S: Store + ?Sized>(store: &S, shift: &Shift) -> Result<(), ProvisionError> {
    if store.task_count(&shift.id)? > 0 {
        debug!(shift = %shift.id, "checklist already materialized");
        return Ok(());
    }

    let batch: Vec<Task> = catalog::checklist(shift.kind)
        .map(|(subcategory, text)| Task {
            id: new_id(),
            shift_id: shift.id.clone(),
            text: text.to_string(),
            category: shift.kind,
            subcategory: subcategory.to_string(),
            status: TaskStatus::Pending,
            completion: None,
        })
        .collect();

    let inserted = store.insert_tasks_if_absent(&batch)?;
    info!(shift = %shift.id, kind = %shift.kind, inserted, "materialized checklist");
    Ok(())
}
