//! Tests for the derived statistics.

// Test code uses proptest which generates patterns that trigger these lints.
#![allow(clippy::items_after_statements, clippy::cast_possible_truncation)]

use std::collections::BTreeSet;

use chrono::Utc;
use proptest::prelude::*;

use super::{
    completions_by_user, incidents_for_shift, location_stats, progress, shift_summary,
    LocationStats,
};
use crate::model::{
    new_id, Completion, Incident, Shift, ShiftKind, Task, TaskStatus, DEFAULT_AREA,
};

fn pending_task(text: &str) -> Task {
    Task {
        id: new_id(),
        shift_id: "s-1".to_string(),
        text: text.to_string(),
        category: ShiftKind::Opening,
        subcategory: "salon".to_string(),
        status: TaskStatus::Pending,
        completion: None,
    }
}

fn completed_task(text: &str, by: &str) -> Task {
    Task {
        status: TaskStatus::Completed,
        completion: Some(Completion {
            by: by.to_string(),
            at: Utc::now(),
        }),
        ..pending_task(text)
    }
}

fn incident_on(task: &Task, note: &str) -> Incident {
    Incident {
        id: new_id(),
        task_id: task.id.clone(),
        shift_id: task.shift_id.clone(),
        reported_by: "u-1".to_string(),
        note: note.to_string(),
        reported_at: Utc::now(),
    }
}

fn shift_with_roster(users: &[&str]) -> Shift {
    Shift {
        id: new_id(),
        location_id: Some("loc-1".to_string()),
        date: "2025-03-10".parse().unwrap(),
        kind: ShiftKind::Opening,
        area: DEFAULT_AREA.to_string(),
        assigned_users: users.iter().map(ToString::to_string).collect::<BTreeSet<_>>(),
        created_at: Utc::now(),
    }
}

// =============================================================================
// Progress
// =============================================================================

#[test]
fn test_progress_of_empty_checklist_is_zero() {
    assert_eq!(progress(&[]), 0);
}

#[test]
fn test_progress_rounds_half_up() {
    let tasks = vec![
        completed_task("a", "u-1"),
        pending_task("b"),
        pending_task("c"),
    ];
    assert_eq!(progress(&tasks), 33);

    let tasks = vec![
        completed_task("a", "u-1"),
        completed_task("b", "u-1"),
        pending_task("c"),
    ];
    assert_eq!(progress(&tasks), 67);
}

#[test]
fn test_progress_extremes() {
    let all_pending = vec![pending_task("a"), pending_task("b")];
    assert_eq!(progress(&all_pending), 0);

    let all_done = vec![completed_task("a", "u-1"), completed_task("b", "u-2")];
    assert_eq!(progress(&all_done), 100);
}

// =============================================================================
// Summaries and location stats
// =============================================================================

#[test]
fn test_shift_summary_counters() {
    let tasks = vec![
        completed_task("a", "u-1"),
        pending_task("b"),
        pending_task("c"),
        pending_task("d"),
    ];
    let incidents = vec![incident_on(&tasks[1], "nota")];

    let summary = shift_summary(&tasks, &incidents);
    assert_eq!(summary.total, 4);
    assert_eq!(summary.completed, 1);
    assert_eq!(summary.pending, 3);
    assert_eq!(summary.incidents, 1);
    assert_eq!(summary.progress_pct, 25);
}

#[test]
fn test_location_stats_unions_rosters() {
    let shifts = vec![
        shift_with_roster(&["u1", "u2"]),
        shift_with_roster(&["u2", "u3"]),
        shift_with_roster(&[]),
    ];

    assert_eq!(
        location_stats(&shifts),
        LocationStats {
            total_shifts: 3,
            active_shifts: 2,
            assigned_workers: 3,
        }
    );
}

#[test]
fn test_location_stats_of_nothing() {
    assert_eq!(location_stats(&[]), LocationStats::default());
}

// =============================================================================
// Incidents and per-user counts
// =============================================================================

#[test]
fn test_incident_presence_does_not_alter_progress() {
    // Two tasks, one completed; an incident on the completed one.
    // Completion and incident state are independent axes.
    let tasks = vec![completed_task("a", "u1"), pending_task("b")];
    let incidents = vec![incident_on(&tasks[0], "nota")];

    let listed = incidents_for_shift(&tasks, &incidents);
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].task_id, tasks[0].id);

    assert_eq!(progress(&tasks), 50);
}

#[test]
fn test_incidents_for_shift_ignores_foreign_incidents() {
    let tasks = vec![pending_task("a")];
    let foreign = Incident {
        task_id: "someone-elses-task".to_string(),
        ..incident_on(&tasks[0], "nota")
    };

    assert!(incidents_for_shift(&tasks, &[foreign]).is_empty());
}

#[test]
fn test_incidents_follow_checklist_order() {
    let tasks = vec![pending_task("a"), pending_task("b"), pending_task("c")];
    let incidents = vec![incident_on(&tasks[2], "tercera"), incident_on(&tasks[0], "primera")];

    let listed = incidents_for_shift(&tasks, &incidents);
    let notes: Vec<&str> = listed.iter().map(|i| i.note.as_str()).collect();
    assert_eq!(notes, vec!["primera", "tercera"]);
}

#[test]
fn test_completions_by_user_counts() {
    let tasks = vec![
        completed_task("a", "u1"),
        completed_task("b", "u1"),
        completed_task("c", "u2"),
        pending_task("d"),
    ];

    let counts = completions_by_user(&tasks);
    assert_eq!(counts.len(), 2);
    assert_eq!(counts["u1"], 2);
    assert_eq!(counts["u2"], 1);
}

// =============================================================================
// Properties
// =============================================================================

fn arb_task() -> impl Strategy<Value = Task> {
    (any::<bool>(), prop::sample::select(&["u1", "u2", "u3"][..])).prop_map(|(done, user)| {
        if done {
            completed_task("tarea", user)
        } else {
            pending_task("tarea")
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: progress is always a percentage.
    #[test]
    fn prop_progress_is_bounded(tasks in prop::collection::vec(arb_task(), 0..40)) {
        let pct = progress(&tasks);
        prop_assert!(pct <= 100);
    }

    /// Property: 100% exactly when every task is completed (and the
    /// checklist is non-empty); 0% for an empty checklist.
    #[test]
    fn prop_progress_full_iff_all_completed(tasks in prop::collection::vec(arb_task(), 0..40)) {
        let pct = progress(&tasks);
        if tasks.is_empty() {
            prop_assert_eq!(pct, 0);
        } else {
            let all_done = tasks.iter().all(Task::is_completed);
            prop_assert_eq!(pct == 100, all_done);
        }
    }

    /// Property: per-user counts sum to the completed-task count.
    #[test]
    fn prop_completion_counts_sum(tasks in prop::collection::vec(arb_task(), 0..40)) {
        let counts = completions_by_user(&tasks);
        let completed = tasks.iter().filter(|t| t.is_completed()).count();
        prop_assert_eq!(counts.values().sum::<usize>(), completed);
    }

    /// Property: aggregation is order-independent.
    #[test]
    fn prop_progress_order_independent(mut tasks in prop::collection::vec(arb_task(), 0..40)) {
        let before = progress(&tasks);
        tasks.reverse();
        prop_assert_eq!(progress(&tasks), before);
    }
}
