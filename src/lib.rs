//! # sparse_ecs
//!
//! A sparse-set Entity Component System:
//! - Generational entity handles, recycled through an intrusive free list
//! - One densely-packed pool per component type, `O(1)` insert/remove/lookup
//! - Groups that physically reorder owned pools into a common prefix, so
//!   iterating a group costs no sparse lookups at all
//! - Views for ad hoc multi-pool iteration with no reordering
//!
//! ## Example
//!
//! ```
//! use sparse_ecs::Registry;
//!
//! struct Position(f32, f32);
//! struct Velocity(f32, f32);
//!
//! let mut registry = Registry::new(1_024);
//! let e = registry.create().unwrap();
//! registry.add(e, Position(0.0, 0.0)).unwrap();
//! registry.add(e, Velocity(1.0, 0.5)).unwrap();
//!
//! for (entity, (pos, vel)) in registry.view::<(Position, Velocity)>() {
//!     let (pos, vel) = (pos.unwrap(), vel.unwrap());
//!     let _ = (entity, pos, vel);
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod component;
pub mod entity;
pub mod error;
pub mod group;
pub mod pool;
pub mod registry;
pub mod signature;
pub mod sparse;
pub mod view;

pub use component::{component_id, Component, ComponentId, MAX_COMPONENTS};
pub use entity::{Entity, ENTITY_MAX, VERSION_MAX};
pub use error::{EcsError, EcsResult};
pub use group::{Group, GroupId, GroupSpec, GroupTerm, Owned, Partial};
pub use pool::{AnyPool, Pool};
pub use registry::{ComponentTuple, Registry};
pub use signature::Signature;
pub use sparse::{PagedSparseArray, PAGE_SIZE};
pub use view::{SingleView, View, ViewSpec};
