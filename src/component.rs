//! # Component Type Registry
//!
//! Assigns each distinct [`Component`] type a small, stable integer ID the
//! first time it is touched, process-wide. The ID is stable for the life
//! of the process (every [`crate::registry::Registry`] sees the same ID
//! for the same type) but is not persisted and is not portable across
//! processes.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

/// Upper bound on distinct component types a process may register.
pub const MAX_COMPONENTS: usize = 64;

/// Marker trait for types storable as ECS components.
///
/// Any `'static` type qualifies; there is no `Copy`/`Pod` requirement:
/// component values are moved by ordinary Rust move semantics, not by
/// reinterpreting bytes.
pub trait Component: 'static {}

impl<T: 'static> Component for T {}

/// A small integer identifying a component type, in `[0, MAX_COMPONENTS)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct ComponentId(pub(crate) u8);

impl ComponentId {
    /// Returns this ID as a `usize`, for indexing into the registry's pool
    /// table.
    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

struct TypeRegistry {
    ids: HashMap<TypeId, ComponentId>,
    next: u8,
}

fn type_registry() -> &'static Mutex<TypeRegistry> {
    static REGISTRY: OnceLock<Mutex<TypeRegistry>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        Mutex::new(TypeRegistry {
            ids: HashMap::new(),
            next: 0,
        })
    })
}

/// Returns the process-wide [`ComponentId`] for `T`, assigning a fresh one
/// on first call for that type.
///
/// # Panics
///
/// Panics if more than [`MAX_COMPONENTS`] distinct component types have
/// been registered across the process's lifetime.
pub fn component_id<T: Component>() -> ComponentId {
    let mut registry = type_registry().lock().unwrap_or_else(|e| e.into_inner());
    let type_id = TypeId::of::<T>();
    if let Some(id) = registry.ids.get(&type_id) {
        return *id;
    }
    assert!(
        (registry.next as usize) < MAX_COMPONENTS,
        "exceeded MAX_COMPONENTS ({MAX_COMPONENTS}) distinct component types"
    );
    let id = ComponentId(registry.next);
    registry.next += 1;
    registry.ids.insert(type_id, id);
    id
}
