//! Provisioning error types.

use chrono::NaiveDate;
use thiserror::Error;

use crate::model::ShiftKind;
use crate::store::StoreError;

/// A persistence failure while ensuring shift or task existence.
///
/// Nothing here is fatal: the caller should not render a checklist for
/// the affected date until retrying the same idempotent call succeeds.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProvisionError {
    /// The store rejected a read or write.
    #[error("storage failure while provisioning: {0}")]
    Store(#[from] StoreError),

    /// The shift could not be read back after insert-if-absent. Only
    /// reachable if a row is removed out from under this engine.
    #[error("{kind} shift for {date} vanished after provisioning")]
    ShiftUnresolved {
        /// The calendar day being provisioned.
        date: NaiveDate,
        /// The shift kind that could not be resolved.
        kind: ShiftKind,
    },
}
