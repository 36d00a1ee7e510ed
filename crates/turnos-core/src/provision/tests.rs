//! Tests for shift and checklist provisioning.

use chrono::NaiveDate;

use super::{ensure_shift_pair, ensure_tasks};
use crate::catalog;
use crate::model::{new_id, ShiftKind, Task, TaskStatus, DEFAULT_AREA};
use crate::store::{MemoryStore, SqliteStore, Store};

fn with_backends(f: impl Fn(&dyn Store)) {
    let memory = MemoryStore::new();
    f(&memory);
    let sqlite = SqliteStore::in_memory().unwrap();
    f(&sqlite);
}

fn day(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

// =============================================================================
// Shift pair provisioning
// =============================================================================

#[test]
fn test_first_provision_creates_empty_pair() {
    with_backends(|store| {
        let pair = ensure_shift_pair(store, Some("loc-1"), day("2025-03-10")).unwrap();

        assert_eq!(pair.opening.kind, ShiftKind::Opening);
        assert_eq!(pair.closing.kind, ShiftKind::Closing);
        for shift in [&pair.opening, &pair.closing] {
            assert!(shift.assigned_users.is_empty());
            assert_eq!(shift.area, DEFAULT_AREA);
            assert_eq!(shift.date, day("2025-03-10"));
            assert_eq!(shift.location_id.as_deref(), Some("loc-1"));
        }
    });
}

#[test]
fn test_repeated_provision_is_idempotent() {
    with_backends(|store| {
        let first = ensure_shift_pair(store, Some("loc-1"), day("2025-03-10")).unwrap();
        for _ in 0..5 {
            let again = ensure_shift_pair(store, Some("loc-1"), day("2025-03-10")).unwrap();
            assert_eq!(again.opening.id, first.opening.id);
            assert_eq!(again.closing.id, first.closing.id);
        }

        assert_eq!(store.shifts_for_date(day("2025-03-10")).unwrap().len(), 2);
    });
}

#[test]
fn test_provision_preserves_existing_roster() {
    with_backends(|store| {
        let pair = ensure_shift_pair(store, Some("loc-1"), day("2025-03-10")).unwrap();
        let roster = ["u-1".to_string()].into();
        store
            .set_assigned_users(&pair.opening.id, &roster)
            .unwrap()
            .unwrap();

        let again = ensure_shift_pair(store, Some("loc-1"), day("2025-03-10")).unwrap();
        assert_eq!(again.opening.assigned_users, roster);
    });
}

#[test]
fn test_legacy_no_location_pair() {
    with_backends(|store| {
        let pair = ensure_shift_pair(store, None, day("2025-03-10")).unwrap();
        assert!(pair.opening.location_id.is_none());

        let again = ensure_shift_pair(store, None, day("2025-03-10")).unwrap();
        assert_eq!(again.opening.id, pair.opening.id);

        // The no-location pair is independent of any location's pair.
        let located = ensure_shift_pair(store, Some("loc-1"), day("2025-03-10")).unwrap();
        assert_ne!(located.opening.id, pair.opening.id);
        assert_eq!(store.shifts_for_date(day("2025-03-10")).unwrap().len(), 4);
    });
}

#[test]
fn test_dates_and_locations_are_independent() {
    with_backends(|store| {
        ensure_shift_pair(store, Some("loc-1"), day("2025-03-10")).unwrap();
        ensure_shift_pair(store, Some("loc-1"), day("2025-03-11")).unwrap();
        ensure_shift_pair(store, Some("loc-2"), day("2025-03-10")).unwrap();

        assert_eq!(store.shifts_for_date(day("2025-03-10")).unwrap().len(), 4);
        assert_eq!(store.shifts_for_date(day("2025-03-11")).unwrap().len(), 2);
        assert_eq!(
            store
                .shifts_for_location("loc-1", day("2025-03-10"))
                .unwrap()
                .len(),
            2
        );
    });
}

// =============================================================================
// Checklist materialization
// =============================================================================

#[test]
fn test_materialization_matches_catalog_size() {
    with_backends(|store| {
        let pair = ensure_shift_pair(store, Some("loc-1"), day("2025-03-10")).unwrap();

        ensure_tasks(store, &pair.opening).unwrap();
        assert_eq!(
            store.task_count(&pair.opening.id).unwrap(),
            catalog::task_count(ShiftKind::Opening)
        );

        ensure_tasks(store, &pair.closing).unwrap();
        assert_eq!(
            store.task_count(&pair.closing.id).unwrap(),
            catalog::task_count(ShiftKind::Closing)
        );

        let tasks = store.tasks_for_shift(&pair.opening.id).unwrap();
        assert!(tasks.iter().all(|t| t.status == TaskStatus::Pending));
        assert!(tasks.iter().all(|t| t.category == ShiftKind::Opening));
        assert!(tasks.iter().all(|t| t.completion.is_none()));
    });
}

#[test]
fn test_double_materialization_never_doubles() {
    with_backends(|store| {
        let pair = ensure_shift_pair(store, Some("loc-1"), day("2025-03-10")).unwrap();

        ensure_tasks(store, &pair.opening).unwrap();
        ensure_tasks(store, &pair.opening).unwrap();

        assert_eq!(
            store.task_count(&pair.opening.id).unwrap(),
            catalog::task_count(ShiftKind::Opening)
        );
    });
}

#[test]
fn test_any_task_present_short_circuits() {
    // A shift with any task at all is treated as materialized; the
    // catalog is not reconciled retroactively.
    with_backends(|store| {
        let pair = ensure_shift_pair(store, Some("loc-1"), day("2025-03-10")).unwrap();

        let stray = Task {
            id: new_id(),
            shift_id: pair.opening.id.clone(),
            text: "Tarea antigua".to_string(),
            category: ShiftKind::Opening,
            subcategory: "terraza".to_string(),
            status: TaskStatus::Pending,
            completion: None,
        };
        store.insert_tasks_if_absent(std::slice::from_ref(&stray)).unwrap();

        ensure_tasks(store, &pair.opening).unwrap();
        assert_eq!(store.task_count(&pair.opening.id).unwrap(), 1);
    });
}

#[test]
fn test_checklists_are_per_shift() {
    with_backends(|store| {
        let monday = ensure_shift_pair(store, Some("loc-1"), day("2025-03-10")).unwrap();
        let tuesday = ensure_shift_pair(store, Some("loc-1"), day("2025-03-11")).unwrap();

        ensure_tasks(store, &monday.opening).unwrap();
        ensure_tasks(store, &tuesday.opening).unwrap();

        assert_eq!(
            store.task_count(&monday.opening.id).unwrap(),
            catalog::task_count(ShiftKind::Opening)
        );
        assert_eq!(
            store.task_count(&tuesday.opening.id).unwrap(),
            catalog::task_count(ShiftKind::Opening)
        );
    });
}
