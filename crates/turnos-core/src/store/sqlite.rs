//! `SQLite`-backed store implementation.
//!
//! Uses `SQLite` with WAL mode for the underlying storage. The
//! uniqueness keys live in the schema, so `INSERT OR IGNORE` (and
//! `ON CONFLICT ... DO UPDATE` for incident notes) give the atomic
//! conditional writes the provisioners and tracker depend on, even with
//! several client processes sharing one database file.

// SQLite returns i64 for counts, but they're always non-negative.
// Mutex poisoning indicates a panic in another thread, which is unrecoverable.
#![allow(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::missing_panics_doc
)]

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OpenFlags, OptionalExtension};
use tracing::debug;

use super::{Store, StoreError};
use crate::model::{
    Completion, Incident, Location, Role, Shift, ShiftKey, ShiftKind, Task, TaskStatus,
    UserProfile,
};

/// Schema SQL embedded at compile time.
const SCHEMA_SQL: &str = include_str!("schema.sql");

const SHIFT_COLUMNS: &str = "id, location_id, date, kind, area, assigned_users, created_at";
const TASK_COLUMNS: &str =
    "id, shift_id, text, category, subcategory, status, completed_by, completed_at";
const INCIDENT_COLUMNS: &str = "id, task_id, shift_id, reported_by, note, reported_at";

/// The durable store backed by `SQLite`.
///
/// WAL mode allows concurrent reads while writes are in progress; the
/// connection itself is shared behind a mutex, so one handle can be
/// cloned across threads of a single process.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    #[allow(dead_code)]
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Opens or creates a store at the specified path.
    ///
    /// If the database doesn't exist, it is created with the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        Self::initialize_connection(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path.to_path_buf()),
        })
    }

    /// Creates an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_connection(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        })
    }

    /// Initialize the connection with schema and pragmas.
    fn initialize_connection(conn: &Connection) -> Result<(), StoreError> {
        // Execute schema (includes PRAGMA statements)
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }
}

/// Wraps a decode failure so it can travel through a rusqlite row
/// mapping closure.
fn decode_err(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn parse_instant(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| decode_err(idx, e))
}

fn row_to_shift(row: &rusqlite::Row<'_>) -> rusqlite::Result<Shift> {
    let kind: String = row.get(3)?;
    let users: String = row.get(5)?;
    let created_at: String = row.get(6)?;
    let date: String = row.get(2)?;

    Ok(Shift {
        id: row.get(0)?,
        location_id: row.get(1)?,
        date: NaiveDate::from_str(&date).map_err(|e| decode_err(2, e))?,
        kind: ShiftKind::from_str(&kind).map_err(|e| decode_err(3, e))?,
        area: row.get(4)?,
        assigned_users: serde_json::from_str::<BTreeSet<String>>(&users)
            .map_err(|e| decode_err(5, e))?,
        created_at: parse_instant(6, &created_at)?,
    })
}

fn row_to_task(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    let category: String = row.get(3)?;
    let status: String = row.get(5)?;
    let completed_by: Option<String> = row.get(6)?;
    let completed_at: Option<String> = row.get(7)?;

    let completion = match (completed_by, completed_at) {
        (Some(by), Some(at)) => Some(Completion {
            by,
            at: parse_instant(7, &at)?,
        }),
        _ => None,
    };

    Ok(Task {
        id: row.get(0)?,
        shift_id: row.get(1)?,
        text: row.get(2)?,
        category: ShiftKind::from_str(&category).map_err(|e| decode_err(3, e))?,
        subcategory: row.get(4)?,
        status: TaskStatus::from_str(&status).map_err(|e| decode_err(5, e))?,
        completion,
    })
}

fn row_to_incident(row: &rusqlite::Row<'_>) -> rusqlite::Result<Incident> {
    let reported_at: String = row.get(5)?;

    Ok(Incident {
        id: row.get(0)?,
        task_id: row.get(1)?,
        shift_id: row.get(2)?,
        reported_by: row.get(3)?,
        note: row.get(4)?,
        reported_at: parse_instant(5, &reported_at)?,
    })
}

fn row_to_profile(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserProfile> {
    let role: String = row.get(3)?;

    Ok(UserProfile {
        id: row.get(0)?,
        full_name: row.get(1)?,
        email: row.get(2)?,
        role: Role::from_str(&role).map_err(|e| decode_err(3, e))?,
    })
}

fn row_to_location(row: &rusqlite::Row<'_>) -> rusqlite::Result<Location> {
    let created_at: String = row.get(3)?;

    Ok(Location {
        id: row.get(0)?,
        name: row.get(1)?,
        address: row.get(2)?,
        created_at: parse_instant(3, &created_at)?,
    })
}

/// `?, ?, ...` placeholder list for an `IN` clause.
fn repeat_vars(count: usize) -> String {
    let mut vars = "?,".repeat(count);
    vars.pop();
    vars
}

impl Store for SqliteStore {
    fn insert_shift_if_absent(&self, shift: &Shift) -> Result<bool, StoreError> {
        let roster = serde_json::to_string(&shift.assigned_users)?;
        let conn = self.conn.lock().unwrap();

        let inserted = conn.execute(
            "INSERT OR IGNORE INTO shifts (id, location_id, date, kind, area, assigned_users, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                shift.id,
                shift.location_id,
                shift.date.to_string(),
                shift.kind.as_str(),
                shift.area,
                roster,
                shift.created_at.to_rfc3339(),
            ],
        )?;

        Ok(inserted > 0)
    }

    fn find_shift(&self, key: &ShiftKey) -> Result<Option<Shift>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(&format!(
            "SELECT {SHIFT_COLUMNS} FROM shifts
             WHERE COALESCE(location_id, '') = COALESCE(?1, '')
               AND date = ?2 AND kind = ?3 AND area = ?4"
        ))?;

        let shift = stmt
            .query_row(
                params![
                    key.location_id,
                    key.date.to_string(),
                    key.kind.as_str(),
                    key.area
                ],
                row_to_shift,
            )
            .optional()?;

        Ok(shift)
    }

    fn shift(&self, shift_id: &str) -> Result<Option<Shift>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt =
            conn.prepare(&format!("SELECT {SHIFT_COLUMNS} FROM shifts WHERE id = ?1"))?;
        let shift = stmt.query_row(params![shift_id], row_to_shift).optional()?;

        Ok(shift)
    }

    fn shifts_for_date(&self, date: NaiveDate) -> Result<Vec<Shift>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(&format!(
            "SELECT {SHIFT_COLUMNS} FROM shifts WHERE date = ?1 ORDER BY kind"
        ))?;
        let shifts = stmt
            .query_map(params![date.to_string()], row_to_shift)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(shifts)
    }

    fn shifts_for_location(
        &self,
        location_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Shift>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(&format!(
            "SELECT {SHIFT_COLUMNS} FROM shifts
             WHERE location_id = ?1 AND date = ?2
             ORDER BY kind"
        ))?;
        let shifts = stmt
            .query_map(params![location_id, date.to_string()], row_to_shift)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(shifts)
    }

    fn shifts_for_date_assigned_to(
        &self,
        date: NaiveDate,
        user_id: &str,
    ) -> Result<Vec<Shift>, StoreError> {
        let conn = self.conn.lock().unwrap();

        // Roster containment over the JSON array column.
        let mut stmt = conn.prepare(&format!(
            "SELECT {SHIFT_COLUMNS} FROM shifts
             WHERE date = ?1
               AND EXISTS (
                   SELECT 1 FROM json_each(shifts.assigned_users)
                   WHERE json_each.value = ?2
               )
             ORDER BY kind"
        ))?;
        let shifts = stmt
            .query_map(params![date.to_string(), user_id], row_to_shift)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(shifts)
    }

    fn set_assigned_users(
        &self,
        shift_id: &str,
        users: &BTreeSet<String>,
    ) -> Result<Option<Shift>, StoreError> {
        let roster = serde_json::to_string(users)?;
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(&format!(
            "UPDATE shifts SET assigned_users = ?2 WHERE id = ?1 RETURNING {SHIFT_COLUMNS}"
        ))?;
        let shift = stmt
            .query_row(params![shift_id, roster], row_to_shift)
            .optional()?;

        Ok(shift)
    }

    fn insert_tasks_if_absent(&self, tasks: &[Task]) -> Result<usize, StoreError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO tasks
                     (id, shift_id, text, category, subcategory, status, completed_by, completed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;

            for task in tasks {
                let (completed_by, completed_at) = match &task.completion {
                    Some(c) => (Some(c.by.clone()), Some(c.at.to_rfc3339())),
                    None => (None, None),
                };
                inserted += stmt.execute(params![
                    task.id,
                    task.shift_id,
                    task.text,
                    task.category.as_str(),
                    task.subcategory,
                    task.status.as_str(),
                    completed_by,
                    completed_at,
                ])?;
            }
        }

        tx.commit()?;
        debug!(inserted, total = tasks.len(), "task batch committed");
        Ok(inserted)
    }

    fn task_count(&self, shift_id: &str) -> Result<usize, StoreError> {
        let conn = self.conn.lock().unwrap();

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM tasks WHERE shift_id = ?1",
            params![shift_id],
            |row| row.get(0),
        )?;

        Ok(count as usize)
    }

    fn task(&self, task_id: &str) -> Result<Option<Task>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"))?;
        let task = stmt.query_row(params![task_id], row_to_task).optional()?;

        Ok(task)
    }

    fn tasks_for_shift(&self, shift_id: &str) -> Result<Vec<Task>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE shift_id = ?1
             ORDER BY category, subcategory, text"
        ))?;
        let tasks = stmt
            .query_map(params![shift_id], row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tasks)
    }

    fn mark_task_completed(
        &self,
        task_id: &str,
        completion: &Completion,
    ) -> Result<Option<Task>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(&format!(
            "UPDATE tasks
             SET status = 'completed', completed_by = ?2, completed_at = ?3
             WHERE id = ?1
             RETURNING {TASK_COLUMNS}"
        ))?;
        let task = stmt
            .query_row(
                params![task_id, completion.by, completion.at.to_rfc3339()],
                row_to_task,
            )
            .optional()?;

        Ok(task)
    }

    fn incident_for_task(&self, task_id: &str) -> Result<Option<Incident>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(&format!(
            "SELECT {INCIDENT_COLUMNS} FROM incidents WHERE task_id = ?1"
        ))?;
        let incident = stmt
            .query_row(params![task_id], row_to_incident)
            .optional()?;

        Ok(incident)
    }

    fn upsert_incident_note(&self, candidate: &Incident) -> Result<Incident, StoreError> {
        let conn = self.conn.lock().unwrap();

        // On conflict only the note moves; the original reporter and
        // report time stay.
        let mut stmt = conn.prepare(&format!(
            "INSERT INTO incidents (id, task_id, shift_id, reported_by, note, reported_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (task_id) DO UPDATE SET note = excluded.note
             RETURNING {INCIDENT_COLUMNS}"
        ))?;
        let incident = stmt.query_row(
            params![
                candidate.id,
                candidate.task_id,
                candidate.shift_id,
                candidate.reported_by,
                candidate.note,
                candidate.reported_at.to_rfc3339(),
            ],
            row_to_incident,
        )?;

        Ok(incident)
    }

    fn delete_incident_for_task(&self, task_id: &str) -> Result<bool, StoreError> {
        let conn = self.conn.lock().unwrap();

        let deleted = conn.execute(
            "DELETE FROM incidents WHERE task_id = ?1",
            params![task_id],
        )?;

        Ok(deleted > 0)
    }

    fn incidents_for_shift(&self, shift_id: &str) -> Result<Vec<Incident>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(&format!(
            "SELECT {INCIDENT_COLUMNS} FROM incidents
             WHERE shift_id = ?1
             ORDER BY reported_at"
        ))?;
        let incidents = stmt
            .query_map(params![shift_id], row_to_incident)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(incidents)
    }

    fn profiles_by_ids(&self, ids: &[String]) -> Result<Vec<UserProfile>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(&format!(
            "SELECT id, full_name, email, role FROM user_profiles
             WHERE id IN ({})
             ORDER BY full_name",
            repeat_vars(ids.len())
        ))?;
        let profiles = stmt
            .query_map(params_from_iter(ids), row_to_profile)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(profiles)
    }

    fn workers(&self) -> Result<Vec<UserProfile>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT id, full_name, email, role FROM user_profiles
             WHERE role = 'garzon'
             ORDER BY full_name",
        )?;
        let profiles = stmt
            .query_map([], row_to_profile)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(profiles)
    }

    fn insert_profile(&self, profile: &UserProfile) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO user_profiles (id, full_name, email, role) VALUES (?1, ?2, ?3, ?4)",
            params![
                profile.id,
                profile.full_name,
                profile.email,
                profile.role.as_str()
            ],
        )?;

        Ok(())
    }

    fn insert_location(&self, location: &Location) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO locations (id, name, address, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                location.id,
                location.name,
                location.address,
                location.created_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    fn location(&self, location_id: &str) -> Result<Option<Location>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT id, name, address, created_at FROM locations WHERE id = ?1",
        )?;
        let location = stmt
            .query_row(params![location_id], row_to_location)
            .optional()?;

        Ok(location)
    }

    fn locations(&self) -> Result<Vec<Location>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt =
            conn.prepare("SELECT id, name, address, created_at FROM locations ORDER BY name")?;
        let locations = stmt
            .query_map([], row_to_location)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(locations)
    }

    fn delete_location(&self, location_id: &str) -> Result<bool, StoreError> {
        let conn = self.conn.lock().unwrap();

        let deleted = conn.execute(
            "DELETE FROM locations WHERE id = ?1",
            params![location_id],
        )?;

        Ok(deleted > 0)
    }
}
