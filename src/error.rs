//! # Errors
//!
//! `Exhausted`, `GroupConflict`, and `InvalidGroupSpec` are fatal to the
//! call that raised them and leave all prior state unchanged;
//! `NotRegistered`, `DuplicateComponent`, and `MissingComponent` are
//! reported (also logged via `tracing`) but represent ordinary,
//! recoverable caller mistakes.

use thiserror::Error;

use crate::component::ComponentId;
use crate::entity::Entity;

/// Errors the public API can report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// `create` was called with every index in `[0, ENTITY_MAX)` already
    /// live or on the free-list.
    #[error("entity index space exhausted")]
    Exhausted,

    /// An operation targeted a component pool that has not been
    /// registered.
    #[error("component {0:?} is not registered")]
    NotRegistered(ComponentId),

    /// `add`/`emplace` was called for a component `e` already has.
    #[error("entity {0:?} already has component {1:?}")]
    DuplicateComponent(Entity, ComponentId),

    /// `replace`/`remove` was called for a component `e` does not have.
    #[error("entity {0:?} is missing component {1:?}")]
    MissingComponent(Entity, ComponentId),

    /// A group was asked to own a pool some other group already owns.
    #[error("component {0:?} is already owned by another group")]
    GroupConflict(ComponentId),

    /// A group spec had no owned component types, or its owned set
    /// overlaps a different group's owned set.
    #[error("invalid group spec: {0}")]
    InvalidGroupSpec(&'static str),

    /// An operation targeted an entity handle whose version doesn't match
    /// the slot's current version; the handle outlived a `free`/recycle
    /// of its index.
    #[error("entity {0:?} is stale")]
    StaleEntity(Entity),
}

/// Result alias used throughout the crate's public, fallible API.
pub type EcsResult<T> = Result<T, EcsError>;
