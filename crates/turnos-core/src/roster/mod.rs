//! Team assignment and roster-dependent views.
//!
//! Assignment replaces a shift's roster wholesale — the caller computes
//! the full target set (typically seeded from the current membership by
//! a toggle flow) and this module writes it. Only supervisors may
//! assign. The ids themselves are taken on faith: an id that resolves
//! to no profile simply renders as an unknown user later, it does not
//! fail the assignment.
//!
//! The module also carries the roster-dependent read paths: the
//! role-gated day listing (workers only see shifts containing them) and
//! the directory resolution that turns ids into display names.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use tracing::info;

use crate::identity::Actor;
use crate::model::{Role, Shift, UserProfile, UNKNOWN_USER};
use crate::store::{Store, StoreError};
use crate::tracker::MutationError;


/// Replaces the shift's assigned team with exactly `user_ids` and
/// returns the updated shift.
///
/// Supervisor-gated. No validation is performed on the ids; an id
/// without a profile becomes an orphaned reference resolved to
/// [`UNKNOWN_USER`] at display time.
///
/// # Errors
///
/// Returns [`MutationError::SupervisorRequired`] for a non-supervisor
/// actor, [`MutationError::ShiftNotFound`] if the shift id resolves to
/// nothing, or a store error if the write fails.
pub fn assign_team<S: Store + ?Sized>(
    store: &S,
    shift_id: &str,
    user_ids: &BTreeSet<String>,
    acting_user: &Actor,
) -> Result<Shift, MutationError> {
    if !acting_user.is_supervisor() {
        return Err(MutationError::SupervisorRequired {
            role: acting_user.role,
        });
    }

    let shift = store
        .set_assigned_users(shift_id, user_ids)?
        .ok_or_else(|| MutationError::ShiftNotFound {
            shift_id: shift_id.to_string(),
        })?;

    info!(shift = %shift.id, team_size = user_ids.len(), "team assigned");
    Ok(shift)
}

/// The shifts of a calendar day visible to the actor: supervisors see
/// every shift, workers only the shifts whose roster contains them.
/// Ordered opening before closing.
///
/// # Errors
///
/// Returns an error if the store query fails.
pub fn visible_shifts<S: Store + ?Sized>(
    store: &S,
    acting_user: &Actor,
    date: NaiveDate,
) -> Result<Vec<Shift>, StoreError> {
    match acting_user.role {
        Role::Supervisor => store.shifts_for_date(date),
        Role::Worker => store.shifts_for_date_assigned_to(date, &acting_user.user_id),
    }
}

/// Resolves the profiles behind a shift's roster, ordered by name. Ids
/// without a profile are absent from the result; use [`display_name`]
/// to render those.
///
/// # Errors
///
/// Returns an error if the store query fails.
pub fn assigned_profiles<S: Store + ?Sized>(
    store: &S,
    shift: &Shift,
) -> Result<Vec<UserProfile>, StoreError> {
    let ids: Vec<String> = shift.assigned_users.iter().cloned().collect();
    store.profiles_by_ids(&ids)
}

/// A directory of resolved profiles for display-time name lookups.
///
/// Built once per view from the ids actually on screen (roster members,
/// completers, incident reporters); ids the directory cannot resolve
/// render as [`UNKNOWN_USER`] rather than failing the view.
#[derive(Debug, Default)]
pub struct Directory {
    by_id: HashMap<String, UserProfile>,
}

impl Directory {
    /// Loads the profiles for the given ids from the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub fn load<S: Store + ?Sized>(store: &S, ids: &[String]) -> Result<Self, StoreError> {
        let by_id = store
            .profiles_by_ids(ids)?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();
        Ok(Self { by_id })
    }

    /// The resolved profile for an id, if any.
    #[must_use]
    pub fn profile(&self, user_id: &str) -> Option<&UserProfile> {
        self.by_id.get(user_id)
    }

    /// The display name for an id, falling back to [`UNKNOWN_USER`] for
    /// an unresolved reference.
    #[must_use]
    pub fn display_name(&self, user_id: &str) -> &str {
        self.by_id
            .get(user_id)
            .map_or(UNKNOWN_USER, |p| p.full_name.as_str())
    }
}

/// Standalone display-name resolution over an already-loaded profile
/// slice, for callers that do not want to build a [`Directory`].
#[must_use]
pub fn display_name<'a>(profiles: &'a [UserProfile], user_id: &str) -> &'a str {
    profiles
        .iter()
        .find(|p| p.id == user_id)
        .map_or(UNKNOWN_USER, |p| p.full_name.as_str())
}
