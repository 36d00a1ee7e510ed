//! Derived progress and statistics.
//!
//! Everything here is a pure function over snapshots of shift, task,
//! and incident state — recomputed on every read, never stored. A
//! caller reading while another client mutates may see a transient
//! inconsistency between two aggregates; that is accepted, the next
//! recomputation over a fresh read converges.

// Percentages fit comfortably in the casts below.
#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::model::{Incident, Shift, Task};
use crate::store::{Store, StoreError};

#[cfg(test)]
mod tests;

/// Completion percentage of a checklist, rounded half-up.
///
/// An empty checklist is 0% by definition, not a division error.
#[must_use]
pub fn progress(tasks: &[Task]) -> u8 {
    if tasks.is_empty() {
        return 0;
    }
    let completed = tasks.iter().filter(|t| t.is_completed()).count();
    ((completed as f64 / tasks.len() as f64) * 100.0).round() as u8
}

/// Counters for one shift's checklist state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShiftSummary {
    /// Materialized task count.
    pub total: usize,
    /// Tasks marked completed.
    pub completed: usize,
    /// Tasks still pending.
    pub pending: usize,
    /// Incidents attached to the shift's tasks.
    pub incidents: usize,
    /// [`progress`] over the same snapshot.
    pub progress_pct: u8,
}

/// Summarizes one shift's checklist and incident snapshot.
#[must_use]
pub fn shift_summary(tasks: &[Task], incidents: &[Incident]) -> ShiftSummary {
    let completed = tasks.iter().filter(|t| t.is_completed()).count();
    ShiftSummary {
        total: tasks.len(),
        completed,
        pending: tasks.len() - completed,
        incidents: incidents.len(),
        progress_pct: progress(tasks),
    }
}

/// Day-level counters for one location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LocationStats {
    /// Shifts provisioned for the location on the day.
    pub total_shifts: usize,
    /// Shifts with a non-empty roster.
    pub active_shifts: usize,
    /// Size of the union of rosters across those shifts.
    pub assigned_workers: usize,
}

/// Aggregates a location's shifts for one day.
///
/// The caller passes the location's shifts for the date in question;
/// order does not matter.
#[must_use]
pub fn location_stats(shifts: &[Shift]) -> LocationStats {
    let assigned: HashSet<&String> = shifts.iter().flat_map(|s| &s.assigned_users).collect();
    LocationStats {
        total_shifts: shifts.len(),
        active_shifts: shifts.iter().filter(|s| s.is_active()).count(),
        assigned_workers: assigned.len(),
    }
}

/// [`location_stats`] over a fresh read of the location's shifts for a
/// date.
///
/// # Errors
///
/// Returns an error if the store query fails.
pub fn location_stats_for<S: Store + ?Sized>(
    store: &S,
    location_id: &str,
    date: NaiveDate,
) -> Result<LocationStats, StoreError> {
    Ok(location_stats(&store.shifts_for_location(location_id, date)?))
}

/// The incidents attached to a shift's tasks, in checklist order.
///
/// Incidents not belonging to any of the given tasks are ignored, so a
/// day-wide incident snapshot can be passed as-is.
#[must_use]
pub fn incidents_for_shift<'a>(tasks: &[Task], incidents: &'a [Incident]) -> Vec<&'a Incident> {
    let by_task: HashMap<&str, &Incident> = incidents
        .iter()
        .map(|i| (i.task_id.as_str(), i))
        .collect();
    tasks
        .iter()
        .filter_map(|t| by_task.get(t.id.as_str()).copied())
        .collect()
}

/// Completed-task counts per user over a checklist snapshot, feeding the
/// progress-by-user view. Users with no completions are absent.
#[must_use]
pub fn completions_by_user(tasks: &[Task]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for task in tasks {
        if let Some(completion) = &task.completion {
            *counts.entry(completion.by.clone()).or_insert(0) += 1;
        }
    }
    counts
}
