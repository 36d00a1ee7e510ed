//! Mutation error types.

use thiserror::Error;

use crate::model::Role;
use crate::store::StoreError;

/// A completion, incident, or roster write failed.
///
/// No partial mutation is assumed committed: the caller surfaces the
/// failure, keeps its prior state, and retries the same call.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MutationError {
    /// The store rejected a read or write.
    #[error("storage failure during mutation: {0}")]
    Store(#[from] StoreError),

    /// The targeted task does not exist.
    #[error("task not found: {task_id}")]
    TaskNotFound {
        /// The task id that resolved to nothing.
        task_id: String,
    },

    /// The targeted shift does not exist.
    #[error("shift not found: {shift_id}")]
    ShiftNotFound {
        /// The shift id that resolved to nothing.
        shift_id: String,
    },

    /// The acting user's role does not permit this operation.
    #[error("operation requires the supervisor role, actor has {role}")]
    SupervisorRequired {
        /// The role the actor actually holds.
        role: Role,
    },
}
