//! # Groups
//!
//! A group is an in-place reordering discipline over one or more pools:
//! entities that satisfy the group's signature are kept in a common
//! prefix of every *owned* pool, at the same relative position in each,
//! so iterating the group needs no sparse lookups for owned components at
//! all, only a direct index into each owned pool's packed buffer.
//!
//! Creating a group performs a single partition pass over its driver pool
//! (the classic "swap with the boundary" in-place partition): walk the
//! driver's packed list once, and whenever an entity satisfies the
//! group's full signature, swap it into the slot at `end_index` across
//! every owned pool, then advance `end_index`. The entity that was
//! displaced is, by the loop's own invariant, known not to match (it sat
//! at a position already classified), so it's safe to leave behind.

use std::marker::PhantomData;

use crate::component::{component_id, Component, ComponentId};
use crate::entity::Entity;
use crate::registry::Registry;

/// Marks a component type as *owned* by a group: its pool is physically
/// reordered so matching entities occupy the group's prefix.
pub struct Owned<T>(PhantomData<fn() -> T>);

/// Marks a component type as *required but not reordered* by a group.
pub struct Partial<T>(PhantomData<fn() -> T>);

/// A single term in a group specification: either [`Owned<T>`] or
/// [`Partial<T>`].
pub trait GroupTerm: 'static {
    /// The component type this term refers to.
    type Component: Component;
    /// `true` for [`Owned`], `false` for [`Partial`].
    const OWNED: bool;

    /// This term's component ID.
    fn component_id() -> ComponentId {
        component_id::<Self::Component>()
    }

    /// Fetches this term's value for `entity`, currently at driver slot
    /// `k`. Owned terms index their pool directly at `k`; partial terms
    /// look `entity` up through the pool's sparse array. Both are
    /// guaranteed present by the group's prefix invariant.
    fn fetch<'r>(registry: &'r Registry, k: usize, entity: Entity) -> &'r Self::Component {
        let pool = registry
            .pool::<Self::Component>()
            .expect("group term's pool must be registered for an active group");
        if Self::OWNED {
            pool.value_at(k)
        } else {
            pool.get(entity)
                .expect("partial component guaranteed present by group invariant")
        }
    }
}

impl<T: Component> GroupTerm for Owned<T> {
    type Component = T;
    const OWNED: bool = true;
}

impl<T: Component> GroupTerm for Partial<T> {
    type Component = T;
    const OWNED: bool = false;
}

/// A tuple of [`GroupTerm`]s describing a group's shape. Implemented for
/// tuples of arity 1 through 8 by macro, since Rust has no native
/// variadic generics.
pub trait GroupSpec: 'static {
    /// The tuple of references yielded per matching entity.
    type Item<'r>;

    /// IDs of this spec's [`Owned`] terms, in declaration order.
    fn owned_ids() -> Vec<ComponentId>;
    /// IDs of this spec's [`Partial`] terms, in declaration order.
    fn partial_ids() -> Vec<ComponentId>;
    /// Fetches every term's value for `entity` at driver slot `k`.
    fn fetch<'r>(registry: &'r Registry, k: usize, entity: Entity) -> Self::Item<'r>;
}

macro_rules! impl_group_spec {
    ($($t:ident),+) => {
        impl<$($t: GroupTerm),+> GroupSpec for ($($t,)+) {
            type Item<'r> = ($(&'r $t::Component,)+);

            fn owned_ids() -> Vec<ComponentId> {
                let mut ids = Vec::new();
                $(if $t::OWNED { ids.push($t::component_id()); })+
                ids
            }

            fn partial_ids() -> Vec<ComponentId> {
                let mut ids = Vec::new();
                $(if !$t::OWNED { ids.push($t::component_id()); })+
                ids
            }

            fn fetch<'r>(registry: &'r Registry, k: usize, entity: Entity) -> Self::Item<'r> {
                ($($t::fetch(registry, k, entity),)+)
            }
        }
    };
}

impl_group_spec!(A);
impl_group_spec!(A, B);
impl_group_spec!(A, B, C);
impl_group_spec!(A, B, C, D);
impl_group_spec!(A, B, C, D, E);
impl_group_spec!(A, B, C, D, E, F);
impl_group_spec!(A, B, C, D, E, F, G);
impl_group_spec!(A, B, C, D, E, F, G, H);

/// Opaque handle to a group created by
/// [`Registry::create_group`](crate::registry::Registry::create_group).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct GroupId(pub(crate) usize);

/// Registry-internal bookkeeping for one active group. Does not own pool
/// memory; it holds the owned/partial component IDs the registry looks
/// its pools up by, rather than a back-reference to the pools themselves.
pub(crate) struct GroupState {
    pub(crate) owned: Vec<ComponentId>,
    pub(crate) partial: Vec<ComponentId>,
    pub(crate) all_sig: crate::signature::Signature,
    pub(crate) driver: ComponentId,
    pub(crate) end_index: usize,
}

impl GroupState {
    pub(crate) fn is_pure_partial(&self) -> bool {
        self.owned.is_empty()
    }
}

/// A read-only handle to an active group, borrowed from the registry that
/// owns it.
pub struct Group<'r, Spec: GroupSpec> {
    pub(crate) registry: &'r Registry,
    pub(crate) id: GroupId,
    pub(crate) _marker: PhantomData<Spec>,
}

impl<'r, Spec: GroupSpec> Group<'r, Spec> {
    /// Number of entities currently in this group's prefix.
    #[must_use]
    pub fn size(&self) -> usize {
        self.registry.group_end_index(self.id)
    }

    /// `true` if no entity currently satisfies this group.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Iterates `(Entity, Spec::Item)` tuples over the group's current
    /// prefix, in the driver pool's packed order.
    pub fn iter(&self) -> GroupIter<'r, Spec> {
        let (driver, pure_partial, all_sig, end) = self.registry.group_iter_state(self.id);
        GroupIter {
            registry: self.registry,
            driver,
            pure_partial,
            all_sig,
            k: 0,
            end,
            _marker: PhantomData,
        }
    }
}

impl<'r, Spec: GroupSpec> IntoIterator for &Group<'r, Spec> {
    type Item = (Entity, Spec::Item<'r>);
    type IntoIter = GroupIter<'r, Spec>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a group's matching entities.
pub struct GroupIter<'r, Spec: GroupSpec> {
    registry: &'r Registry,
    driver: ComponentId,
    pure_partial: bool,
    all_sig: crate::signature::Signature,
    k: usize,
    end: usize,
    _marker: PhantomData<Spec>,
}

impl<'r, Spec: GroupSpec> Iterator for GroupIter<'r, Spec> {
    type Item = (Entity, Spec::Item<'r>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.k >= self.end {
                return None;
            }
            let entity = self.registry.driver_entity_at(self.driver, self.k);
            if self.pure_partial && !self.registry.signature_of(entity).contains(&self.all_sig) {
                self.k += 1;
                continue;
            }
            let item = Spec::fetch(self.registry, self.k, entity);
            self.k += 1;
            return Some((entity, item));
        }
    }
}
