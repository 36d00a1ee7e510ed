//! Core entity types for the shift/task lifecycle engine.
//!
//! Entities mirror the persisted rows: a [`Shift`] is a scheduled work
//! period of a fixed [`ShiftKind`] for a location and calendar day, a
//! [`Task`] is one checklist item belonging to a shift, and an
//! [`Incident`] is a free-text note attached to a single task. User and
//! location rows are referenced by id only; the engine never owns their
//! lifecycle.
//!
//! # Identifiers
//!
//! All ids are UUIDv4 strings minted with [`new_id`]. References held in
//! `assigned_users`, [`Completion::by`], and [`Incident::reported_by`]
//! are weak: an id that resolves to no profile is rendered with a
//! fallback name at display time, never treated as a hard error.
//!
//! # Dates
//!
//! Calendar days travel as ISO `YYYY-MM-DD` strings with no time or
//! timezone component ([`parse_day`]); instants (`created_at`,
//! completion and report timestamps) are UTC.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;


/// The fixed area tag every provisioned shift carries.
pub const DEFAULT_AREA: &str = "salon";

/// Display fallback for a user id that resolves to no profile.
pub const UNKNOWN_USER: &str = "Usuario desconocido";

/// Mints a fresh entity id.
#[must_use]
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Parses an ISO calendar-day string (`YYYY-MM-DD`).
///
/// # Errors
///
/// Returns [`DayParseError`] if the string is not a valid ISO day.
pub fn parse_day(value: &str) -> Result<NaiveDate, DayParseError> {
    NaiveDate::from_str(value).map_err(|source| DayParseError {
        value: value.to_string(),
        source,
    })
}

/// A calendar-day string failed to parse.
#[derive(Debug, Error)]
#[error("invalid calendar day {value:?}: {source}")]
pub struct DayParseError {
    /// The rejected input.
    pub value: String,
    /// The underlying chrono error.
    #[source]
    pub source: chrono::ParseError,
}

/// The two shift types provisioned for every location and day.
///
/// Persisted as the original Spanish spellings `"apertura"` (opening)
/// and `"cierre"` (closing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ShiftKind {
    /// Opening shift (`"apertura"`).
    #[serde(rename = "apertura")]
    Opening,
    /// Closing shift (`"cierre"`).
    #[serde(rename = "cierre")]
    Closing,
}

impl ShiftKind {
    /// Both kinds in provisioning order (opening sorts before closing,
    /// matching the persisted spellings).
    pub const ALL: [Self; 2] = [Self::Opening, Self::Closing];

    /// The persisted spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Opening => "apertura",
            Self::Closing => "cierre",
        }
    }
}

impl fmt::Display for ShiftKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShiftKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "apertura" => Ok(Self::Opening),
            "cierre" => Ok(Self::Closing),
            other => Err(UnknownVariant {
                field: "shift kind",
                value: other.to_string(),
            }),
        }
    }
}

/// Lifecycle state of a checklist task.
///
/// There is no uncomplete transition: once completed, nothing in this
/// engine moves a task back to pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Not yet done.
    Pending,
    /// Marked done by some actor.
    Completed,
}

impl TaskStatus {
    /// The persisted spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            other => Err(UnknownVariant {
                field: "task status",
                value: other.to_string(),
            }),
        }
    }
}

/// Role of a profile, deciding which mutating operations it may invoke.
///
/// Workers persist as `"garzon"`, the original waiter role name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// May assign teams and manage locations, and sees every shift.
    #[serde(rename = "supervisor")]
    Supervisor,
    /// Works assigned shifts; sees only shifts containing them.
    #[serde(rename = "garzon")]
    Worker,
}

impl Role {
    /// The persisted spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Supervisor => "supervisor",
            Self::Worker => "garzon",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "supervisor" => Ok(Self::Supervisor),
            "garzon" => Ok(Self::Worker),
            other => Err(UnknownVariant {
                field: "role",
                value: other.to_string(),
            }),
        }
    }
}

/// A persisted enum column held a spelling this build does not know.
#[derive(Debug, Error)]
#[error("unknown {field}: {value:?}")]
pub struct UnknownVariant {
    /// Which column/field was being decoded.
    pub field: &'static str,
    /// The rejected spelling.
    pub value: String,
}

/// The uniqueness key a shift is provisioned under.
///
/// At most one shift exists per key; the store enforces this with a
/// composite unique constraint and the provisioner relies on
/// insert-if-absent over it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShiftKey {
    /// Owning location, or `None` for the legacy no-location shift.
    pub location_id: Option<String>,
    /// Calendar day.
    pub date: NaiveDate,
    /// Opening or closing.
    pub kind: ShiftKind,
    /// Area tag; [`DEFAULT_AREA`] for everything this engine provisions.
    pub area: String,
}

impl ShiftKey {
    /// Key for the given location/day/kind with the default area.
    #[must_use]
    pub fn with_default_area(
        location_id: Option<&str>,
        date: NaiveDate,
        kind: ShiftKind,
    ) -> Self {
        Self {
            location_id: location_id.map(ToString::to_string),
            date,
            kind,
            area: DEFAULT_AREA.to_string(),
        }
    }
}

/// A scheduled work period for one location and calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    /// Entity id.
    pub id: String,
    /// Owning location, or `None` for the legacy no-location shift.
    pub location_id: Option<String>,
    /// Calendar day the shift belongs to.
    pub date: NaiveDate,
    /// Opening or closing.
    #[serde(rename = "type")]
    pub kind: ShiftKind,
    /// Area tag.
    pub area: String,
    /// Roster of assigned user ids. Order is irrelevant; replaced
    /// wholesale by team assignment.
    pub assigned_users: BTreeSet<String>,
    /// When the row was provisioned.
    pub created_at: DateTime<Utc>,
}

impl Shift {
    /// The uniqueness key this shift occupies.
    #[must_use]
    pub fn key(&self) -> ShiftKey {
        ShiftKey {
            location_id: self.location_id.clone(),
            date: self.date,
            kind: self.kind,
            area: self.area.clone(),
        }
    }

    /// Whether anyone is assigned.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.assigned_users.is_empty()
    }
}

/// The opening and closing shifts resolved for one location and day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftPair {
    /// The opening shift.
    pub opening: Shift,
    /// The closing shift.
    pub closing: Shift,
}

/// Attribution of a completed task: who, and when.
///
/// Carried as one value so the two halves can never disagree — a task
/// either has both or neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    /// Acting user recorded for the completion.
    #[serde(rename = "completed_by")]
    pub by: String,
    /// When the completion landed.
    #[serde(rename = "completed_at")]
    pub at: DateTime<Utc>,
}

/// One checklist item of a shift.
///
/// The text/category/subcategory triple is fixed at materialization from
/// the task catalog and never mutated afterward; only the status and
/// completion attribution change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Entity id.
    pub id: String,
    /// Owning shift.
    pub shift_id: String,
    /// Checklist text, verbatim from the catalog.
    pub text: String,
    /// Mirrors the owning shift's kind.
    pub category: ShiftKind,
    /// Catalog subcategory key this task came from.
    pub subcategory: String,
    /// Pending or completed.
    pub status: TaskStatus,
    /// Present exactly when `status` is completed.
    #[serde(flatten)]
    pub completion: Option<Completion>,
}

impl Task {
    /// Whether the task has been completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

/// A free-text note attached to one task, independent of its completion
/// state. At most one exists per task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    /// Entity id.
    pub id: String,
    /// The task the note is attached to.
    pub task_id: String,
    /// The task's owning shift, denormalized for per-shift listings.
    pub shift_id: String,
    /// Acting user that first reported the incident. Preserved across
    /// note updates.
    pub reported_by: String,
    /// Non-empty, trimmed note text.
    pub note: String,
    /// When the incident was first reported. Preserved across updates.
    pub reported_at: DateTime<Utc>,
}

/// A user row, referenced by id from rosters, completions, and reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Entity id (owned by the external identity provider).
    pub id: String,
    /// Display name.
    pub full_name: String,
    /// Contact email.
    pub email: String,
    /// Supervisor or worker.
    pub role: Role,
}

/// A physical location shifts are provisioned for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Entity id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// When the location was registered.
    pub created_at: DateTime<Utc>,
}
