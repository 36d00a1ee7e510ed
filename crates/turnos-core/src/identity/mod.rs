//! The acting user attributed to a mutation.
//!
//! Shared-device use means the authenticated session and the person
//! actually ticking a box can differ, so every mutating operation takes
//! an explicit [`Actor`] instead of reading ambient session state. The
//! identity provider that authenticated the session supplies the id and
//! role; this engine treats both as opaque inputs and never writes them
//! back.

use serde::{Deserialize, Serialize};

use crate::model::Role;

/// The identity a mutation is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// User id recorded on completions, incident reports, and roster
    /// changes made by this actor.
    pub user_id: String,
    /// Role gating which operations the actor may invoke.
    pub role: Role,
}

impl Actor {
    /// Builds an actor from an id and role.
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    /// Whether this actor may invoke supervisor-gated operations.
    #[must_use]
    pub fn is_supervisor(&self) -> bool {
        self.role == Role::Supervisor
    }
}
