//! Shift/task lifecycle engine for recurring per-location operational
//! checklists.
//!
//! Every location gets exactly one opening and one closing shift per
//! calendar day, each carrying a fixed checklist materialized from a
//! static catalog. Teams are assigned to shifts, members tick tasks off
//! and attach incident notes, and progress is derived from current
//! state on every read.
//!
//! # Architecture
//!
//! ```text
//! catalog ──> provision ──> store <── tracker
//!                             ▲  ▲
//!                  roster ────┘  └──── locations
//!                             │
//!                           stats (pure, derived)
//! ```
//!
//! - [`catalog`]: the static checklist definitions per shift kind.
//! - [`provision`]: idempotent, race-safe creation of the shift pair
//!   and its checklist on first view of a date.
//! - [`tracker`]: task completion and incident notes, last-writer-wins.
//! - [`roster`]: supervisor-gated team assignment and the role-gated
//!   day listing.
//! - [`locations`]: the supervisor-gated location registry.
//! - [`stats`]: pure aggregation over snapshots, never persisted.
//! - [`store`]: the persistence seam — a trait over atomic conditional
//!   writes, with `SQLite` and in-memory backends.
//!
//! # Concurrency
//!
//! Multiple clients operate on the same data with no coordination
//! beyond the store's atomicity: provisioning goes through conditional
//! insert-if-absent over composite uniqueness keys, and every other
//! mutation is last-writer-wins. No operation in this crate holds a
//! lock across calls or assumes ordering relative to other clients.
//!
//! # Example
//!
//! ```rust
//! use turnos_core::identity::Actor;
//! use turnos_core::model::{parse_day, Role};
//! use turnos_core::store::{MemoryStore, Store};
//! use turnos_core::{provision, stats, tracker};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryStore::new();
//! let day = parse_day("2025-03-10")?;
//!
//! let pair = provision::ensure_shift_pair(&store, Some("loc-1"), day)?;
//! provision::ensure_tasks(&store, &pair.opening)?;
//!
//! let tasks = store.tasks_for_shift(&pair.opening.id)?;
//! let ana = Actor::new("u-1", Role::Worker);
//! tracker::complete_task(&store, &tasks[0].id, &ana)?;
//!
//! let tasks = store.tasks_for_shift(&pair.opening.id)?;
//! assert!(stats::progress(&tasks) > 0);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod catalog;
pub mod config;
pub mod identity;
pub mod locations;
pub mod model;
pub mod provision;
pub mod roster;
pub mod stats;
pub mod tracker;

pub mod store;

pub use config::{ConfigError, EngineConfig};
pub use identity::Actor;
pub use model::{
    Completion, Incident, Location, Role, Shift, ShiftKind, ShiftPair, Task, TaskStatus,
    UserProfile,
};
pub use provision::ProvisionError;
pub use store::{MemoryStore, SqliteStore, Store, StoreError};
pub use tracker::MutationError;
