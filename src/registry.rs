//! # Registry
//!
//! The entry point tying entity lifecycle, component pools, and groups
//! together. A `Registry` owns up to [`MAX_COMPONENTS`] pools behind one
//! type-erased array, a paged array of per-entity [`Signature`]s, and the
//! dense `in_use` array an entity's index is recycled through.
//!
//! Entity recycling uses an intrusive, stack-ordered free list: a freed
//! slot's `in_use` entry is repurposed to store the next free index (in
//! its index bits) and the version the slot will carry when reused (in
//! its version bits, already bumped at free time). `create` pops the
//! head of that chain before minting a never-used index.

use std::marker::PhantomData;

use crate::component::{component_id, Component, ComponentId, MAX_COMPONENTS};
use crate::entity::{Entity, ENTITY_MAX, NULL_INDEX};
use crate::error::{EcsError, EcsResult};
use crate::group::{Group, GroupId, GroupSpec, GroupState};
use crate::pool::{AnyPool, Pool};
use crate::signature::Signature;
use crate::sparse::PagedSparseArray;
use crate::view::{SingleView, View, ViewSpec};

/// A tuple of component types for batch presence checks and batch reads.
/// Implemented for tuples of arity 1 through 8 by macro.
pub trait ComponentTuple: 'static {
    /// The tuple of `Option<&T>` [`Registry::get_many`] returns.
    type Item<'r>;

    /// IDs of this tuple's component types, in declaration order.
    fn ids() -> Vec<ComponentId>;
    /// Fetches every term's value for `entity`, `None` where absent.
    fn get_many<'r>(registry: &'r Registry, entity: Entity) -> Self::Item<'r>;
}

macro_rules! impl_component_tuple {
    ($($t:ident),+) => {
        impl<$($t: Component),+> ComponentTuple for ($($t,)+) {
            type Item<'r> = ($(Option<&'r $t>,)+);

            fn ids() -> Vec<ComponentId> {
                vec![$(component_id::<$t>()),+]
            }

            fn get_many<'r>(registry: &'r Registry, entity: Entity) -> Self::Item<'r> {
                ($(registry.pool::<$t>().and_then(|p| p.get(entity)),)+)
            }
        }
    };
}

impl_component_tuple!(A);
impl_component_tuple!(A, B);
impl_component_tuple!(A, B, C);
impl_component_tuple!(A, B, C, D);
impl_component_tuple!(A, B, C, D, E);
impl_component_tuple!(A, B, C, D, E, F);
impl_component_tuple!(A, B, C, D, E, F, G);
impl_component_tuple!(A, B, C, D, E, F, G, H);

/// Owns every entity, component pool, and group in one world.
pub struct Registry {
    pools: Vec<Option<Box<dyn AnyPool>>>,
    pool_group: Vec<Option<GroupId>>,
    signatures: PagedSparseArray<Signature>,
    in_use: Vec<Entity>,
    free_head: u32,
    free_count: usize,
    next_fresh: u32,
    groups: Vec<Option<GroupState>>,
    default_capacity: usize,
}

impl Registry {
    /// Creates an empty registry. `default_capacity` is a hint newly
    /// registered pools pre-reserve; it is not a hard limit.
    #[must_use]
    pub fn new(default_capacity: usize) -> Self {
        let mut pools = Vec::with_capacity(MAX_COMPONENTS);
        pools.resize_with(MAX_COMPONENTS, || None);
        let mut pool_group = Vec::with_capacity(MAX_COMPONENTS);
        pool_group.resize_with(MAX_COMPONENTS, || None);
        Self {
            pools,
            pool_group,
            signatures: PagedSparseArray::new(Signature::EMPTY),
            in_use: Vec::with_capacity(default_capacity),
            free_head: NULL_INDEX,
            free_count: 0,
            next_fresh: 0,
            groups: Vec::new(),
            default_capacity,
        }
    }

    // ---- entity lifecycle ----------------------------------------------

    fn check_alive(&self, e: Entity) -> EcsResult<()> {
        if e.is_dead() {
            return Err(EcsError::StaleEntity(e));
        }
        match self.in_use.get(e.index_usize()) {
            Some(&slot) if slot == e => Ok(()),
            _ => Err(EcsError::StaleEntity(e)),
        }
    }

    /// `true` if `e` is currently live (not freed, not a stale handle).
    #[must_use]
    pub fn is_alive(&self, e: Entity) -> bool {
        self.check_alive(e).is_ok()
    }

    /// Creates a new entity, recycling a freed index (with a bumped
    /// version) before minting a fresh one.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::Exhausted`] if every index in
    /// `[0, ENTITY_MAX)` is already live or pending recycling.
    pub fn create(&mut self) -> EcsResult<Entity> {
        if self.free_count > 0 {
            let idx = self.free_head;
            let slot = self.in_use[idx as usize];
            let entity = Entity::new(idx, slot.version());
            self.in_use[idx as usize] = entity;
            self.free_head = slot.index();
            self.free_count -= 1;
            Ok(entity)
        } else if self.next_fresh < ENTITY_MAX {
            let idx = self.next_fresh;
            self.next_fresh += 1;
            let entity = Entity::new(idx, 0);
            self.in_use.push(entity);
            Ok(entity)
        } else {
            Err(EcsError::Exhausted)
        }
    }

    /// Frees `e`, removing every component it has (running group
    /// de-reconciliation for each) and returning its index to the free
    /// list with a bumped version.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::StaleEntity`] if `e` is not currently live.
    pub fn free(&mut self, e: Entity) -> EcsResult<()> {
        self.check_alive(e)?;
        let idx = e.index_usize();
        let sig = self.signature_of(e);
        for raw in 0..MAX_COMPONENTS {
            let id = ComponentId(raw as u8);
            if sig.test(id) {
                self.reconcile_remove(e, id);
                if let Some(pool) = self.pools[id.as_usize()].as_mut() {
                    pool.remove_any(e);
                }
            }
        }
        self.signatures.clear(idx);

        let bumped_version = e.with_bumped_version().version();
        self.in_use[idx] = Entity::new(self.free_head, bumped_version);
        self.free_head = idx as u32;
        self.free_count += 1;
        Ok(())
    }

    /// Number of currently live entities.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.in_use.len() - self.free_count
    }

    pub(crate) fn signature_of(&self, e: Entity) -> Signature {
        self.signatures.get(e.index_usize())
    }

    // ---- pool access ----------------------------------------------------

    fn ensure_registered<T: Component>(&mut self) -> ComponentId {
        let id = component_id::<T>();
        if self.pools[id.as_usize()].is_none() {
            tracing::warn!(component = id.as_usize(), "auto-registering component pool on first use");
            self.register::<T>();
        }
        id
    }

    /// Explicitly registers a pool for `T`, pre-reserving this registry's
    /// default capacity. A no-op if `T` is already registered.
    pub fn register<T: Component>(&mut self) -> ComponentId {
        let id = component_id::<T>();
        if self.pools[id.as_usize()].is_none() {
            let mut pool: Pool<T> = Pool::new();
            pool.resize(self.default_capacity);
            self.pools[id.as_usize()] = Some(Box::new(pool));
        }
        id
    }

    /// Typed access to `T`'s pool, if registered.
    #[must_use]
    pub fn pool<T: Component>(&self) -> Option<&Pool<T>> {
        let id = component_id::<T>();
        self.pools[id.as_usize()]
            .as_ref()
            .and_then(|p| p.as_any().downcast_ref::<Pool<T>>())
    }

    fn pool_mut<T: Component>(&mut self) -> Option<&mut Pool<T>> {
        let id = component_id::<T>();
        self.pools[id.as_usize()]
            .as_mut()
            .and_then(|p| p.as_any_mut().downcast_mut::<Pool<T>>())
    }

    pub(crate) fn pool_slot_of(&self, id: ComponentId, e: Entity) -> Option<usize> {
        self.pools[id.as_usize()].as_ref().and_then(|p| p.slot_of_any(e))
    }

    pub(crate) fn driver_entity_at(&self, id: ComponentId, k: usize) -> Entity {
        self.pools[id.as_usize()]
            .as_ref()
            .expect("driver pool must be registered for an active view or group")
            .entity_at_any(k)
    }

    pub(crate) fn smallest_pool_among(&self, ids: &[ComponentId]) -> (ComponentId, usize) {
        ids.iter()
            .map(|&id| (id, self.pools[id.as_usize()].as_ref().map_or(0, |p| p.len_any())))
            .min_by_key(|&(_, len)| len)
            .expect("a view needs at least one component type")
    }

    // ---- component operations --------------------------------------------

    fn mark_added(&mut self, e: Entity, id: ComponentId) {
        let mut sig = self.signature_of(e);
        sig.set(id, true);
        self.signatures.set(e.index_usize(), sig);
        self.reconcile_add(e);
    }

    /// Attaches `value` as entity `e`'s component of type `T`.
    ///
    /// # Errors
    ///
    /// [`EcsError::StaleEntity`] if `e` isn't live; [`EcsError::DuplicateComponent`]
    /// if `e` already has a `T`.
    pub fn add<T: Component>(&mut self, e: Entity, value: T) -> EcsResult<()> {
        self.check_alive(e)?;
        let id = self.ensure_registered::<T>();
        if self.pool::<T>().expect("just registered").contains(e) {
            tracing::warn!(entity = ?e, component = id.as_usize(), "duplicate component add");
            return Err(EcsError::DuplicateComponent(e, id));
        }
        self.pool_mut::<T>().expect("just registered").insert(e, value);
        self.mark_added(e, id);
        Ok(())
    }

    /// Attaches a `T` built lazily by `build`. Distinct from
    /// [`Registry::add`] only at the call site.
    ///
    /// # Errors
    ///
    /// Same as [`Registry::add`].
    pub fn emplace<T: Component>(&mut self, e: Entity, build: impl FnOnce() -> T) -> EcsResult<()> {
        self.check_alive(e)?;
        let id = self.ensure_registered::<T>();
        if self.pool::<T>().expect("just registered").contains(e) {
            tracing::warn!(entity = ?e, component = id.as_usize(), "duplicate component emplace");
            return Err(EcsError::DuplicateComponent(e, id));
        }
        self.pool_mut::<T>().expect("just registered").emplace(e, build);
        self.mark_added(e, id);
        Ok(())
    }

    /// Overwrites `e`'s existing `T`. Does **not** insert one if `e`
    /// doesn't already have it.
    ///
    /// # Errors
    ///
    /// [`EcsError::StaleEntity`], [`EcsError::NotRegistered`] if `T` has
    /// never been registered, or [`EcsError::MissingComponent`] if `e`
    /// lacks one.
    pub fn replace<T: Component>(&mut self, e: Entity, value: T) -> EcsResult<()> {
        self.check_alive(e)?;
        let id = component_id::<T>();
        if self.pools[id.as_usize()].is_none() {
            return Err(EcsError::NotRegistered(id));
        }
        if !self.pool::<T>().expect("registered above").contains(e) {
            tracing::warn!(entity = ?e, component = id.as_usize(), "replace called on a missing component");
            return Err(EcsError::MissingComponent(e, id));
        }
        self.pool_mut::<T>().expect("registered above").replace(e, value);
        Ok(())
    }

    /// Removes and returns `e`'s `T`, evicting it from any group that
    /// owns or references `T` first.
    ///
    /// # Errors
    ///
    /// [`EcsError::StaleEntity`], [`EcsError::NotRegistered`], or
    /// [`EcsError::MissingComponent`].
    pub fn remove<T: Component>(&mut self, e: Entity) -> EcsResult<T> {
        self.check_alive(e)?;
        let id = component_id::<T>();
        if self.pools[id.as_usize()].is_none() {
            return Err(EcsError::NotRegistered(id));
        }
        if !self.pool::<T>().expect("registered above").contains(e) {
            tracing::warn!(entity = ?e, component = id.as_usize(), "remove called on a missing component");
            return Err(EcsError::MissingComponent(e, id));
        }
        self.reconcile_remove(e, id);
        let value = self
            .pool_mut::<T>()
            .expect("registered above")
            .remove(e)
            .expect("presence checked above");
        let mut sig = self.signature_of(e);
        sig.set(id, false);
        self.signatures.set(e.index_usize(), sig);
        Ok(value)
    }

    /// Reads `e`'s `T`, or `None` if absent or `T` was never registered.
    #[must_use]
    pub fn get<T: Component>(&self, e: Entity) -> Option<&T> {
        self.pool::<T>().and_then(|p| p.get(e))
    }

    /// Mutably reads `e`'s `T`, or `None` if absent.
    pub fn get_mut<T: Component>(&mut self, e: Entity) -> Option<&mut T> {
        self.pool_mut::<T>().and_then(|p| p.get_mut(e))
    }

    /// `true` if `e` has a `T`.
    #[must_use]
    pub fn has<T: Component>(&self, e: Entity) -> bool {
        self.pool::<T>().is_some_and(|p| p.contains(e))
    }

    /// `true` if `e` has at least one component type named by `Ts`.
    #[must_use]
    pub fn any_of<Ts: ComponentTuple>(&self, e: Entity) -> bool {
        let sig = self.signature_of(e);
        Ts::ids().iter().any(|&id| sig.test(id))
    }

    /// `true` if `e` has every component type named by `Ts`.
    #[must_use]
    pub fn all_of<Ts: ComponentTuple>(&self, e: Entity) -> bool {
        let sig = self.signature_of(e);
        Ts::ids().iter().all(|&id| sig.test(id))
    }

    /// Batch-reads every component type named by `Ts` for `e`, `None`
    /// per-position where absent.
    #[must_use]
    pub fn get_many<Ts: ComponentTuple>(&self, e: Entity) -> Ts::Item<'_> {
        Ts::get_many(self, e)
    }

    /// Grows every registered pool's packed-buffer capacity to at least
    /// `new_capacity`, and raises this registry's default for pools
    /// registered afterward.
    pub fn resize(&mut self, new_capacity: usize) {
        self.default_capacity = self.default_capacity.max(new_capacity);
        for pool in self.pools.iter_mut().flatten() {
            pool.resize_any(new_capacity);
        }
    }

    /// Grows `T`'s pool capacity to at least `new_capacity`, registering
    /// it first if necessary.
    pub fn resize_pool<T: Component>(&mut self, new_capacity: usize) {
        self.ensure_registered::<T>();
        self.pool_mut::<T>().expect("just registered").resize(new_capacity);
    }

    // ---- views ------------------------------------------------------------

    /// A read-only multi-component view over `Spec`, driven by the
    /// smallest participating pool.
    #[must_use]
    pub fn view<Spec: ViewSpec>(&self) -> View<'_, Spec> {
        View::new(self)
    }

    /// A direct, `Option`-free iterator over a single component type's
    /// pool.
    #[must_use]
    pub fn single_view<T: Component>(&self) -> SingleView<'_, T> {
        match self.pool::<T>() {
            Some(p) => SingleView::new(p.entities(), p.values()),
            None => SingleView::new(&[], &[]),
        }
    }

    // ---- groups -------------------------------------------------------------

    /// Creates a group over `Spec`, performing a one-time partition pass
    /// to reorder every owned pool's prefix, then returns a handle to it.
    ///
    /// # Errors
    ///
    /// [`EcsError::NotRegistered`] if any named component type has no
    /// pool yet; [`EcsError::InvalidGroupSpec`] if `Spec` has neither an
    /// owned component nor at least two partial ones;
    /// [`EcsError::GroupConflict`] if an owned type is already owned by
    /// another group.
    pub fn create_group<Spec: GroupSpec>(&mut self) -> EcsResult<GroupId> {
        let owned = Spec::owned_ids();
        let partial = Spec::partial_ids();

        if owned.is_empty() && partial.len() < 2 {
            let msg = "a group needs at least one owned component, or two or more partial components";
            tracing::error!(reason = msg, "rejecting invalid group spec");
            return Err(EcsError::InvalidGroupSpec(msg));
        }
        for &id in owned.iter().chain(partial.iter()) {
            if self.pools[id.as_usize()].is_none() {
                return Err(EcsError::NotRegistered(id));
            }
        }
        for &id in &owned {
            if self.pool_group[id.as_usize()].is_some() {
                tracing::error!(component = id.as_usize(), "component already owned by another group");
                return Err(EcsError::GroupConflict(id));
            }
        }

        let mut all_sig = Signature::EMPTY;
        for &id in owned.iter().chain(partial.iter()) {
            all_sig = all_sig.with(id);
        }

        let candidates: &[ComponentId] = if owned.is_empty() { &partial } else { &owned };
        let driver = *candidates
            .iter()
            .min_by_key(|&&id| self.pools[id.as_usize()].as_ref().unwrap().len_any())
            .expect("candidates is non-empty by construction");

        let group_idx = self.groups.iter().position(Option::is_none).unwrap_or(self.groups.len());
        if group_idx == self.groups.len() {
            self.groups.push(None);
        }
        let group_id = GroupId(group_idx);

        self.groups[group_idx] = Some(GroupState {
            owned: owned.clone(),
            partial,
            all_sig,
            driver,
            end_index: 0,
        });
        for &id in &owned {
            self.pool_group[id.as_usize()] = Some(group_id);
        }

        if owned.is_empty() {
            let len = self.pools[driver.as_usize()].as_ref().unwrap().len_any();
            self.groups[group_idx].as_mut().unwrap().end_index = len;
        } else {
            let n = self.pools[driver.as_usize()].as_ref().unwrap().len_any();
            for k in 0..n {
                let entity = self.pools[driver.as_usize()].as_ref().unwrap().entity_at_any(k);
                if self.signature_of(entity).contains(&all_sig) {
                    let end_index = self.groups[group_idx].as_ref().unwrap().end_index;
                    for &cid in &owned {
                        let boundary = self.pools[cid.as_usize()].as_ref().unwrap().entity_at_any(end_index);
                        self.pools[cid.as_usize()].as_mut().unwrap().swap_any(entity, boundary);
                    }
                    self.groups[group_idx].as_mut().unwrap().end_index += 1;
                }
            }
        }

        Ok(group_id)
    }

    /// Dissolves a group. Its owned pools are left in whatever order the
    /// group last reordered them to; their components are untouched.
    ///
    /// # Errors
    ///
    /// [`EcsError::InvalidGroupSpec`] if `id` names no active group.
    pub fn destroy_group(&mut self, id: GroupId) -> EcsResult<()> {
        let state = self.groups.get_mut(id.0).and_then(Option::take).ok_or_else(|| {
            tracing::error!(group = id.0, "destroy_group called on an inactive group");
            EcsError::InvalidGroupSpec("group id does not refer to an active group")
        })?;
        for cid in state.owned {
            self.pool_group[cid.as_usize()] = None;
        }
        Ok(())
    }

    /// A read handle over an active group for iteration.
    #[must_use]
    pub fn group<Spec: GroupSpec>(&self, id: GroupId) -> Group<'_, Spec> {
        Group {
            registry: self,
            id,
            _marker: PhantomData,
        }
    }

    pub(crate) fn group_end_index(&self, id: GroupId) -> usize {
        self.groups[id.0].as_ref().map_or(0, |g| g.end_index)
    }

    pub(crate) fn group_iter_state(&self, id: GroupId) -> (ComponentId, bool, Signature, usize) {
        let g = self.groups[id.0].as_ref().expect("group handle outlived its group");
        (g.driver, g.is_pure_partial(), g.all_sig, g.end_index)
    }

    fn reconcile_add(&mut self, e: Entity) {
        for idx in 0..self.groups.len() {
            if self.groups[idx].is_none() {
                continue;
            }
            self.try_promote(idx, e);
        }
    }

    fn try_promote(&mut self, group_idx: usize, e: Entity) {
        let (owned, all_sig, end_index) = {
            let g = self.groups[group_idx].as_ref().unwrap();
            (g.owned.clone(), g.all_sig, g.end_index)
        };
        if owned.is_empty() {
            return;
        }
        if !self.signature_of(e).contains(&all_sig) {
            return;
        }
        let Some(pos) = self.pool_slot_of(owned[0], e) else {
            return;
        };
        if pos < end_index {
            return;
        }
        for &cid in &owned {
            let boundary = self.pools[cid.as_usize()].as_ref().unwrap().entity_at_any(end_index);
            self.pools[cid.as_usize()].as_mut().unwrap().swap_any(e, boundary);
        }
        self.groups[group_idx].as_mut().unwrap().end_index += 1;
    }

    fn reconcile_remove(&mut self, e: Entity, removed: ComponentId) {
        for idx in 0..self.groups.len() {
            let relevant = match self.groups[idx].as_ref() {
                Some(g) => g.owned.contains(&removed) || g.partial.contains(&removed),
                None => false,
            };
            if relevant {
                self.try_evict(idx, e);
            }
        }
    }

    fn try_evict(&mut self, group_idx: usize, e: Entity) {
        let (owned, end_index) = {
            let g = self.groups[group_idx].as_ref().unwrap();
            (g.owned.clone(), g.end_index)
        };
        if owned.is_empty() {
            return;
        }
        let Some(pos) = self.pool_slot_of(owned[0], e) else {
            return;
        };
        if pos >= end_index {
            return;
        }
        let last_prefix = end_index - 1;
        for &cid in &owned {
            let boundary = self.pools[cid.as_usize()].as_ref().unwrap().entity_at_any(last_prefix);
            self.pools[cid.as_usize()].as_mut().unwrap().swap_any(e, boundary);
        }
        self.groups[group_idx].as_mut().unwrap().end_index -= 1;
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::{Owned, Partial};

    #[derive(Debug, PartialEq)]
    struct Pos(f32, f32);
    #[derive(Debug, PartialEq)]
    struct Vel(f32, f32);
    #[derive(Debug, PartialEq)]
    struct Tag;

    #[test]
    fn create_free_recycle_bumps_version() {
        let mut reg = Registry::new(0);
        let e0 = reg.create().unwrap();
        assert_eq!(e0.index(), 0);
        assert_eq!(e0.version(), 0);

        reg.free(e0).unwrap();
        assert!(!reg.is_alive(e0));

        let e1 = reg.create().unwrap();
        assert_eq!(e1.index(), 0);
        assert_eq!(e1.version(), 1);
        assert_ne!(e0, e1);
    }

    #[test]
    fn stale_handle_is_rejected() {
        let mut reg = Registry::new(0);
        let e = reg.create().unwrap();
        reg.free(e).unwrap();
        let _ = reg.create().unwrap();
        assert!(matches!(reg.add(e, Pos(0.0, 0.0)), Err(EcsError::StaleEntity(_))));
    }

    #[test]
    fn add_then_remove_round_trips() {
        let mut reg = Registry::new(0);
        let e = reg.create().unwrap();
        reg.add(e, Pos(1.0, 2.0)).unwrap();
        assert!(reg.has::<Pos>(e));
        assert_eq!(reg.get::<Pos>(e), Some(&Pos(1.0, 2.0)));

        let removed = reg.remove::<Pos>(e).unwrap();
        assert_eq!(removed, Pos(1.0, 2.0));
        assert!(!reg.has::<Pos>(e));
    }

    #[test]
    fn duplicate_add_is_rejected() {
        let mut reg = Registry::new(0);
        let e = reg.create().unwrap();
        reg.add(e, Pos(0.0, 0.0)).unwrap();
        assert!(matches!(
            reg.add(e, Pos(1.0, 1.0)),
            Err(EcsError::DuplicateComponent(_, _))
        ));
    }

    #[test]
    fn replace_does_not_auto_insert() {
        let mut reg = Registry::new(0);
        reg.register::<Pos>();
        let e = reg.create().unwrap();
        assert!(matches!(
            reg.replace(e, Pos(1.0, 1.0)),
            Err(EcsError::MissingComponent(_, _))
        ));
    }

    #[test]
    fn view_is_driven_by_smallest_pool() {
        let mut reg = Registry::new(0);
        let mut withboth = Vec::new();
        for _ in 0..5 {
            let e = reg.create().unwrap();
            reg.add(e, Pos(0.0, 0.0)).unwrap();
        }
        for _ in 0..2 {
            let e = reg.create().unwrap();
            reg.add(e, Pos(0.0, 0.0)).unwrap();
            reg.add(e, Vel(1.0, 1.0)).unwrap();
            withboth.push(e);
        }

        let seen: Vec<_> = reg.view::<(Pos, Vel)>().into_iter().collect();
        assert_eq!(seen.len(), 2);
        for (e, (pos, vel)) in seen {
            assert!(withboth.contains(&e));
            assert!(pos.is_some());
            assert!(vel.is_some());
        }
    }

    #[test]
    fn owning_group_reorders_into_a_common_prefix() {
        let mut reg = Registry::new(0);
        reg.register::<Pos>();
        reg.register::<Vel>();

        let e0 = reg.create().unwrap();
        reg.add(e0, Pos(0.0, 0.0)).unwrap();

        let e1 = reg.create().unwrap();
        reg.add(e1, Pos(1.0, 1.0)).unwrap();
        reg.add(e1, Vel(1.0, 1.0)).unwrap();

        let group = reg.create_group::<(Owned<Pos>, Owned<Vel>)>().unwrap();
        let g = reg.group::<(Owned<Pos>, Owned<Vel>)>(group);
        assert_eq!(g.size(), 1);

        let members: Vec<_> = g.iter().map(|(e, _)| e).collect();
        assert_eq!(members, vec![e1]);
    }

    #[test]
    fn late_add_promotes_into_an_existing_group() {
        let mut reg = Registry::new(0);
        reg.register::<Pos>();
        reg.register::<Vel>();

        let e = reg.create().unwrap();
        reg.add(e, Pos(0.0, 0.0)).unwrap();

        let group = reg.create_group::<(Owned<Pos>, Owned<Vel>)>().unwrap();
        assert_eq!(reg.group::<(Owned<Pos>, Owned<Vel>)>(group).size(), 0);

        reg.add(e, Vel(2.0, 2.0)).unwrap();
        assert_eq!(reg.group::<(Owned<Pos>, Owned<Vel>)>(group).size(), 1);
    }

    #[test]
    fn remove_evicts_from_group_before_touching_the_pool() {
        let mut reg = Registry::new(0);
        reg.register::<Pos>();
        reg.register::<Vel>();

        let e = reg.create().unwrap();
        reg.add(e, Pos(0.0, 0.0)).unwrap();
        reg.add(e, Vel(0.0, 0.0)).unwrap();

        let group = reg.create_group::<(Owned<Pos>, Owned<Vel>)>().unwrap();
        assert_eq!(reg.group::<(Owned<Pos>, Owned<Vel>)>(group).size(), 1);

        reg.remove::<Vel>(e).unwrap();
        assert_eq!(reg.group::<(Owned<Pos>, Owned<Vel>)>(group).size(), 0);
        assert!(reg.has::<Pos>(e));
    }

    #[test]
    fn overlapping_owned_groups_are_rejected() {
        let mut reg = Registry::new(0);
        reg.register::<Pos>();
        reg.register::<Vel>();
        reg.register::<Tag>();

        reg.create_group::<(Owned<Pos>, Owned<Vel>)>().unwrap();
        assert!(matches!(
            reg.create_group::<(Owned<Pos>, Owned<Tag>)>(),
            Err(EcsError::GroupConflict(_))
        ));
    }

    #[test]
    fn partial_group_requires_no_pool_reordering() {
        let mut reg = Registry::new(0);
        reg.register::<Pos>();
        reg.register::<Vel>();

        let e0 = reg.create().unwrap();
        reg.add(e0, Pos(0.0, 0.0)).unwrap();

        let e1 = reg.create().unwrap();
        reg.add(e1, Pos(1.0, 1.0)).unwrap();
        reg.add(e1, Vel(1.0, 1.0)).unwrap();

        let group = reg.create_group::<(Owned<Pos>, Partial<Vel>)>().unwrap();
        let g = reg.group::<(Owned<Pos>, Partial<Vel>)>(group);
        let members: Vec<_> = g.iter().map(|(e, _)| e).collect();
        assert_eq!(members, vec![e1]);
    }

    #[test]
    fn get_many_returns_none_for_absent_components() {
        let mut reg = Registry::new(0);
        let e = reg.create().unwrap();
        reg.add(e, Pos(3.0, 4.0)).unwrap();
        let (pos, vel) = reg.get_many::<(Pos, Vel)>(e);
        assert_eq!(pos, Some(&Pos(3.0, 4.0)));
        assert_eq!(vel, None);
    }
}
