//! In-memory store implementation.
//!
//! Mirrors the observable semantics of the `SQLite` backend — the same
//! uniqueness keys, the same insert-if-absent behavior, the same result
//! ordering — with every operation performed under a single lock so the
//! conditional inserts are just as atomic.

// Mutex poisoning indicates a panic in another thread, which is unrecoverable.
#![allow(clippy::missing_panics_doc)]

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use chrono::NaiveDate;

use super::{Store, StoreError};
use crate::model::{Completion, Incident, Location, Shift, ShiftKey, Task, TaskStatus, UserProfile};

#[derive(Default)]
struct Inner {
    shifts: HashMap<String, Shift>,
    tasks: HashMap<String, Task>,
    incidents: HashMap<String, Incident>,
    profiles: HashMap<String, UserProfile>,
    locations: HashMap<String, Location>,
}

/// Process-local store for tests and in-process callers.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn sort_shifts(shifts: &mut [Shift]) {
    shifts.sort_by_key(|s| s.kind);
}

impl Store for MemoryStore {
    fn insert_shift_if_absent(&self, shift: &Shift) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();

        let key = shift.key();
        if inner.shifts.values().any(|s| s.key() == key) {
            return Ok(false);
        }
        inner.shifts.insert(shift.id.clone(), shift.clone());
        Ok(true)
    }

    fn find_shift(&self, key: &ShiftKey) -> Result<Option<Shift>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.shifts.values().find(|s| s.key() == *key).cloned())
    }

    fn shift(&self, shift_id: &str) -> Result<Option<Shift>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.shifts.get(shift_id).cloned())
    }

    fn shifts_for_date(&self, date: NaiveDate) -> Result<Vec<Shift>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut shifts: Vec<Shift> = inner
            .shifts
            .values()
            .filter(|s| s.date == date)
            .cloned()
            .collect();
        sort_shifts(&mut shifts);
        Ok(shifts)
    }

    fn shifts_for_location(
        &self,
        location_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Shift>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut shifts: Vec<Shift> = inner
            .shifts
            .values()
            .filter(|s| s.location_id.as_deref() == Some(location_id) && s.date == date)
            .cloned()
            .collect();
        sort_shifts(&mut shifts);
        Ok(shifts)
    }

    fn shifts_for_date_assigned_to(
        &self,
        date: NaiveDate,
        user_id: &str,
    ) -> Result<Vec<Shift>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut shifts: Vec<Shift> = inner
            .shifts
            .values()
            .filter(|s| s.date == date && s.assigned_users.contains(user_id))
            .cloned()
            .collect();
        sort_shifts(&mut shifts);
        Ok(shifts)
    }

    fn set_assigned_users(
        &self,
        shift_id: &str,
        users: &BTreeSet<String>,
    ) -> Result<Option<Shift>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(inner.shifts.get_mut(shift_id).map(|shift| {
            shift.assigned_users = users.clone();
            shift.clone()
        }))
    }

    fn insert_tasks_if_absent(&self, tasks: &[Task]) -> Result<usize, StoreError> {
        let mut inner = self.inner.lock().unwrap();

        let mut inserted = 0;
        for task in tasks {
            let taken = inner.tasks.values().any(|t| {
                t.shift_id == task.shift_id
                    && t.subcategory == task.subcategory
                    && t.text == task.text
            });
            if !taken {
                inner.tasks.insert(task.id.clone(), task.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    fn task_count(&self, shift_id: &str) -> Result<usize, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .tasks
            .values()
            .filter(|t| t.shift_id == shift_id)
            .count())
    }

    fn task(&self, task_id: &str) -> Result<Option<Task>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.tasks.get(task_id).cloned())
    }

    fn tasks_for_shift(&self, shift_id: &str) -> Result<Vec<Task>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut tasks: Vec<Task> = inner
            .tasks
            .values()
            .filter(|t| t.shift_id == shift_id)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| {
            (a.category, &a.subcategory, &a.text).cmp(&(b.category, &b.subcategory, &b.text))
        });
        Ok(tasks)
    }

    fn mark_task_completed(
        &self,
        task_id: &str,
        completion: &Completion,
    ) -> Result<Option<Task>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(inner.tasks.get_mut(task_id).map(|task| {
            task.status = TaskStatus::Completed;
            task.completion = Some(completion.clone());
            task.clone()
        }))
    }

    fn incident_for_task(&self, task_id: &str) -> Result<Option<Incident>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .incidents
            .values()
            .find(|i| i.task_id == task_id)
            .cloned())
    }

    fn upsert_incident_note(&self, candidate: &Incident) -> Result<Incident, StoreError> {
        let mut inner = self.inner.lock().unwrap();

        let existing = inner
            .incidents
            .values_mut()
            .find(|i| i.task_id == candidate.task_id);
        if let Some(incident) = existing {
            incident.note = candidate.note.clone();
            return Ok(incident.clone());
        }
        inner
            .incidents
            .insert(candidate.id.clone(), candidate.clone());
        Ok(candidate.clone())
    }

    fn delete_incident_for_task(&self, task_id: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();

        let id = inner
            .incidents
            .values()
            .find(|i| i.task_id == task_id)
            .map(|i| i.id.clone());
        match id {
            Some(id) => {
                inner.incidents.remove(&id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn incidents_for_shift(&self, shift_id: &str) -> Result<Vec<Incident>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut incidents: Vec<Incident> = inner
            .incidents
            .values()
            .filter(|i| i.shift_id == shift_id)
            .cloned()
            .collect();
        incidents.sort_by_key(|i| i.reported_at);
        Ok(incidents)
    }

    fn profiles_by_ids(&self, ids: &[String]) -> Result<Vec<UserProfile>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let unique: BTreeSet<&String> = ids.iter().collect();
        let mut profiles: Vec<UserProfile> = unique
            .into_iter()
            .filter_map(|id| inner.profiles.get(id))
            .cloned()
            .collect();
        profiles.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(profiles)
    }

    fn workers(&self) -> Result<Vec<UserProfile>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut profiles: Vec<UserProfile> = inner
            .profiles
            .values()
            .filter(|p| p.role == crate::model::Role::Worker)
            .cloned()
            .collect();
        profiles.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(profiles)
    }

    fn insert_profile(&self, profile: &UserProfile) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.profiles.insert(profile.id.clone(), profile.clone());
        Ok(())
    }

    fn insert_location(&self, location: &Location) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .locations
            .insert(location.id.clone(), location.clone());
        Ok(())
    }

    fn location(&self, location_id: &str) -> Result<Option<Location>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.locations.get(location_id).cloned())
    }

    fn locations(&self) -> Result<Vec<Location>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut locations: Vec<Location> = inner.locations.values().cloned().collect();
        locations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(locations)
    }

    fn delete_location(&self, location_id: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(inner.locations.remove(location_id).is_some())
    }
}
