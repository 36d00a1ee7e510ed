//! Persistence layer for shifts, tasks, incidents, and the rows they
//! reference.
//!
//! The engine's correctness under concurrent clients rests entirely on
//! this layer's atomicity: provisioning uses conditional
//! insert-if-absent over composite uniqueness keys (never
//! check-then-insert), task materialization is one batch guarded by a
//! secondary uniqueness key, and completion/incident writes are plain
//! last-writer-wins updates. The [`Store`] trait captures exactly that
//! surface; callers compose it, they never reach the database directly.
//!
//! Two backends are provided:
//!
//! - [`SqliteStore`]: durable storage with the uniqueness keys enforced
//!   by the schema and `INSERT OR IGNORE` realizing insert-if-absent.
//! - [`MemoryStore`]: the same observable semantics under a single
//!   process-local lock, for tests and in-process callers.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use thiserror::Error;

use crate::model::{Completion, Incident, Location, Shift, ShiftKey, Task, UserProfile};

mod memory;
mod sqlite;


pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Errors surfaced by a store backend.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// Database error from `SQLite`.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O error during database operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be encoded for storage.
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// A persisted row could not be decoded into its entity type.
    #[error("corrupt {entity} row {id}: {detail}")]
    CorruptRow {
        /// The entity table the row came from.
        entity: &'static str,
        /// Primary key of the offending row.
        id: String,
        /// What failed to decode.
        detail: String,
    },
}

/// Storage operations the lifecycle engine is written against.
///
/// Every method is one atomic step from the caller's point of view; the
/// engine never assumes ordering between two calls beyond what a single
/// method guarantees. Conditional inserts report whether the row was
/// created so callers can log provisioning without a second read.
pub trait Store: Send + Sync {
    // ---------------------------------------------------------------------
    // Shifts
    // ---------------------------------------------------------------------

    /// Inserts a shift unless one already occupies its uniqueness key
    /// `(location, date, kind, area)`. Returns `true` if the row was
    /// created, `false` if a shift already held the key.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn insert_shift_if_absent(&self, shift: &Shift) -> Result<bool, StoreError>;

    /// Looks up the shift occupying a uniqueness key, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is corrupt.
    fn find_shift(&self, key: &ShiftKey) -> Result<Option<Shift>, StoreError>;

    /// Looks up a shift by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is corrupt.
    fn shift(&self, shift_id: &str) -> Result<Option<Shift>, StoreError>;

    /// All shifts of a calendar day, ordered opening before closing.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is corrupt.
    fn shifts_for_date(&self, date: NaiveDate) -> Result<Vec<Shift>, StoreError>;

    /// A location's shifts on a calendar day, ordered opening before
    /// closing.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is corrupt.
    fn shifts_for_location(
        &self,
        location_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Shift>, StoreError>;

    /// The shifts of a calendar day whose roster contains the given
    /// user, ordered opening before closing.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is corrupt.
    fn shifts_for_date_assigned_to(
        &self,
        date: NaiveDate,
        user_id: &str,
    ) -> Result<Vec<Shift>, StoreError>;

    /// Replaces a shift's roster wholesale. Returns the updated shift,
    /// or `None` if no shift has that id.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn set_assigned_users(
        &self,
        shift_id: &str,
        users: &BTreeSet<String>,
    ) -> Result<Option<Shift>, StoreError>;

    // ---------------------------------------------------------------------
    // Tasks
    // ---------------------------------------------------------------------

    /// Batch-inserts checklist tasks, silently skipping any row whose
    /// `(shift, subcategory, text)` key is already taken. Returns how
    /// many rows were actually created. All-or-nothing on failure.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch fails; no rows are inserted then.
    fn insert_tasks_if_absent(&self, tasks: &[Task]) -> Result<usize, StoreError>;

    /// Number of tasks materialized for a shift.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn task_count(&self, shift_id: &str) -> Result<usize, StoreError>;

    /// Looks up a task by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is corrupt.
    fn task(&self, task_id: &str) -> Result<Option<Task>, StoreError>;

    /// A shift's checklist, ordered by (category, subcategory, text) so
    /// grouped views are stable.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is corrupt.
    fn tasks_for_shift(&self, shift_id: &str) -> Result<Vec<Task>, StoreError>;

    /// Marks a task completed with the given attribution, overwriting
    /// any previous attribution (last writer wins). Returns the updated
    /// task, or `None` if no task has that id.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn mark_task_completed(
        &self,
        task_id: &str,
        completion: &Completion,
    ) -> Result<Option<Task>, StoreError>;

    // ---------------------------------------------------------------------
    // Incidents
    // ---------------------------------------------------------------------

    /// The incident attached to a task, if any. At most one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is corrupt.
    fn incident_for_task(&self, task_id: &str) -> Result<Option<Incident>, StoreError>;

    /// Inserts the candidate incident, or — if the task already carries
    /// one — updates only that incident's note, preserving the original
    /// reporter and report time. Returns the winning row.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn upsert_incident_note(&self, candidate: &Incident) -> Result<Incident, StoreError>;

    /// Deletes the incident attached to a task. Returns whether one
    /// existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn delete_incident_for_task(&self, task_id: &str) -> Result<bool, StoreError>;

    /// All incidents of a shift's tasks.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is corrupt.
    fn incidents_for_shift(&self, shift_id: &str) -> Result<Vec<Incident>, StoreError>;

    // ---------------------------------------------------------------------
    // Profiles and locations (referenced rows)
    // ---------------------------------------------------------------------

    /// The profiles matching the given ids, ordered by name. Ids that
    /// resolve to nothing are simply absent from the result — callers
    /// render those as unknown users.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is corrupt.
    fn profiles_by_ids(&self, ids: &[String]) -> Result<Vec<UserProfile>, StoreError>;

    /// All worker-role profiles, ordered by name (the assignable pool).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is corrupt.
    fn workers(&self) -> Result<Vec<UserProfile>, StoreError>;

    /// Inserts a profile row. Profile lifecycle belongs to the external
    /// user-provisioning service; this exists for it and for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn insert_profile(&self, profile: &UserProfile) -> Result<(), StoreError>;

    /// Inserts a location row.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn insert_location(&self, location: &Location) -> Result<(), StoreError>;

    /// Looks up a location by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is corrupt.
    fn location(&self, location_id: &str) -> Result<Option<Location>, StoreError>;

    /// All locations, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is corrupt.
    fn locations(&self) -> Result<Vec<Location>, StoreError>;

    /// Deletes a location row. Returns whether one existed. Shifts
    /// already provisioned for it are left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn delete_location(&self, location_id: &str) -> Result<bool, StoreError>;
}
