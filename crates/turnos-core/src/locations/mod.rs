//! Supervisor-gated location registry.
//!
//! Locations are the anchors shifts are provisioned under. Their
//! lifetime is independent of shifts: removing a location leaves its
//! already-provisioned shifts in place (this engine never deletes
//! shifts), it only stops new provisioning from being reachable through
//! the registry listing.

use chrono::Utc;
use tracing::info;

use crate::identity::Actor;
use crate::model::{new_id, Location};
use crate::store::{Store, StoreError};
use crate::tracker::MutationError;


/// Registers a new location and returns it.
///
/// Supervisor-gated.
///
/// # Errors
///
/// Returns [`MutationError::SupervisorRequired`] for a non-supervisor
/// actor, or a store error if the write fails.
pub fn register_location<S: Store + ?Sized>(
    store: &S,
    name: &str,
    address: &str,
    acting_user: &Actor,
) -> Result<Location, MutationError> {
    if !acting_user.is_supervisor() {
        return Err(MutationError::SupervisorRequired {
            role: acting_user.role,
        });
    }

    let location = Location {
        id: new_id(),
        name: name.to_string(),
        address: address.to_string(),
        created_at: Utc::now(),
    };
    store.insert_location(&location)?;

    info!(location = %location.id, name = %location.name, "location registered");
    Ok(location)
}

/// Removes a location from the registry. Returns whether it existed.
///
/// Supervisor-gated. Shifts already provisioned for the location are
/// left untouched.
///
/// # Errors
///
/// Returns [`MutationError::SupervisorRequired`] for a non-supervisor
/// actor, or a store error if the write fails.
pub fn remove_location<S: Store + ?Sized>(
    store: &S,
    location_id: &str,
    acting_user: &Actor,
) -> Result<bool, MutationError> {
    if !acting_user.is_supervisor() {
        return Err(MutationError::SupervisorRequired {
            role: acting_user.role,
        });
    }

    let removed = store.delete_location(location_id)?;
    if removed {
        info!(location = %location_id, "location removed");
    }
    Ok(removed)
}

/// All registered locations, ordered by name.
///
/// # Errors
///
/// Returns an error if the store query fails.
pub fn list_locations<S: Store + ?Sized>(store: &S) -> Result<Vec<Location>, StoreError> {
    store.locations()
}
