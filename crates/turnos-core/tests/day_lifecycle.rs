//! End-to-end day lifecycle over the public API: provision a date,
//! assign a team, work the checklist, and read the derived stats the
//! way the surrounding views do.

use std::collections::BTreeSet;

use turnos_core::identity::Actor;
use turnos_core::model::{parse_day, Role, ShiftKind, TaskStatus, UserProfile};
use turnos_core::store::{MemoryStore, SqliteStore, Store};
use turnos_core::{catalog, locations, provision, roster, stats, tracker};

fn seed_profiles(store: &dyn Store) -> (Actor, Actor, Actor) {
    let profiles = [
        ("sup-1", "Sofía Vidal", Role::Supervisor),
        ("u-1", "Ana Rojas", Role::Worker),
        ("u-2", "Beto Díaz", Role::Worker),
    ];
    for (id, name, role) in profiles {
        store
            .insert_profile(&UserProfile {
                id: id.to_string(),
                full_name: name.to_string(),
                email: format!("{id}@example.cl"),
                role,
            })
            .unwrap();
    }
    (
        Actor::new("sup-1", Role::Supervisor),
        Actor::new("u-1", Role::Worker),
        Actor::new("u-2", Role::Worker),
    )
}

#[test]
fn full_day_at_one_location() {
    let store = MemoryStore::new();
    let (supervisor, ana, beto) = seed_profiles(&store);
    let day = parse_day("2025-03-10").unwrap();

    // Supervisor registers the location and opens its day view: the
    // shift pair and the opening checklist materialize on first sight.
    let location = locations::register_location(
        &store,
        "Avatar Sushi - Providencia",
        "Providencia, Santiago",
        &supervisor,
    )
    .unwrap();
    let pair = provision::ensure_shift_pair(&store, Some(&location.id), day).unwrap();
    provision::ensure_tasks(&store, &pair.opening).unwrap();

    // Assign both workers to the opening shift.
    let team: BTreeSet<String> = ["u-1".to_string(), "u-2".to_string()].into();
    roster::assign_team(&store, &pair.opening.id, &team, &supervisor).unwrap();

    // Workers only see the shift they are on; the supervisor sees both.
    let visible = roster::visible_shifts(&store, &ana, day).unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(roster::visible_shifts(&store, &supervisor, day).unwrap().len(), 2);

    // Ana works the terraza, Beto takes one task and flags a problem.
    let tasks = store.tasks_for_shift(&pair.opening.id).unwrap();
    let terraza: Vec<_> = tasks.iter().filter(|t| t.subcategory == "terraza").collect();
    for task in &terraza {
        tracker::complete_task(&store, &task.id, &ana).unwrap();
    }
    let salon_task = tasks.iter().find(|t| t.subcategory == "salon").unwrap();
    tracker::complete_task(&store, &salon_task.id, &beto).unwrap();
    tracker::report_or_update_incident(&store, &salon_task.id, &beto, "Falta cloro").unwrap();

    // Derived state over a fresh read.
    let tasks = store.tasks_for_shift(&pair.opening.id).unwrap();
    let incidents = store.incidents_for_shift(&pair.opening.id).unwrap();

    let done = terraza.len() + 1;
    let summary = stats::shift_summary(&tasks, &incidents);
    assert_eq!(summary.total, catalog::task_count(ShiftKind::Opening));
    assert_eq!(summary.completed, done);
    assert_eq!(summary.incidents, 1);
    assert_eq!(summary.progress_pct, stats::progress(&tasks));

    let per_user = stats::completions_by_user(&tasks);
    assert_eq!(per_user["u-1"], terraza.len());
    assert_eq!(per_user["u-2"], 1);

    let listed = stats::incidents_for_shift(&tasks, &incidents);
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].reported_by, "u-2");

    let location_stats = stats::location_stats_for(&store, &location.id, day).unwrap();
    assert_eq!(location_stats.total_shifts, 2);
    assert_eq!(location_stats.active_shifts, 1);
    assert_eq!(location_stats.assigned_workers, 2);

    // The closing shift is untouched by any of this.
    let closing_tasks = store.tasks_for_shift(&pair.closing.id).unwrap();
    assert!(closing_tasks.is_empty());
}

#[test]
fn concurrent_view_entries_provision_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open(dir.path().join("turnos.db")).unwrap();
    let day = parse_day("2025-03-10").unwrap();

    // Several clients open the same date at once. Each handle shares
    // the database, and every one must resolve the same pair.
    std::thread::scope(|scope| {
        for _ in 0..8 {
            let handle = store.clone();
            scope.spawn(move || {
                let pair = provision::ensure_shift_pair(&handle, Some("loc-1"), day).unwrap();
                provision::ensure_tasks(&handle, &pair.opening).unwrap();
            });
        }
    });

    let shifts = store.shifts_for_date(day).unwrap();
    assert_eq!(shifts.len(), 2);
    assert_eq!(shifts[0].kind, ShiftKind::Opening);

    // Exactly one checklist, no duplicated rows.
    assert_eq!(
        store.task_count(&shifts[0].id).unwrap(),
        catalog::task_count(ShiftKind::Opening)
    );
    let tasks = store.tasks_for_shift(&shifts[0].id).unwrap();
    assert!(tasks.iter().all(|t| t.status == TaskStatus::Pending));
}
