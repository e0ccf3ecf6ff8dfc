//! Reference registry implementation.
//!
//! [`SparseRegistry`] is a compact generational-index registry: a slot table
//! with a free list for identifier recycling, and one sparse-set pool per
//! component type. It backs the test suites and serves downstream users who
//! do not bring their own ECS.

use std::any::Any;
use std::collections::HashMap;

use tracing::trace;

use snapshot_component::{Component, ComponentTypeId, Entity, ErasedComponent};

use crate::registry::{Registry, RegistryError};

/// One entry in the slot table.
#[derive(Debug, Clone, Copy)]
struct Slot {
    version: u32,
    alive: bool,
}

/// A sparse-set component pool for a single type.
///
/// `dense` holds the components in insertion order for iteration; `sparse`
/// maps an entity's slot index to its dense position.
#[derive(Default)]
struct Pool {
    sparse: HashMap<u32, usize>,
    dense: Vec<(Entity, ErasedComponent)>,
}

impl std::fmt::Debug for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool").field("len", &self.dense.len()).finish()
    }
}

impl Pool {
    fn insert(&mut self, entity: Entity, value: ErasedComponent) {
        if let Some(&pos) = self.sparse.get(&entity.index) {
            self.dense[pos] = (entity, value);
        } else {
            self.sparse.insert(entity.index, self.dense.len());
            self.dense.push((entity, value));
        }
    }

    fn remove(&mut self, index: u32) {
        if let Some(pos) = self.sparse.remove(&index) {
            self.dense.swap_remove(pos);
            if let Some((moved, _)) = self.dense.get(pos) {
                self.sparse.insert(moved.index, pos);
            }
        }
    }

    fn get(&self, entity: Entity) -> Option<&ErasedComponent> {
        let &pos = self.sparse.get(&entity.index)?;
        let (stored, value) = &self.dense[pos];
        (*stored == entity).then_some(value)
    }
}

/// A generational-index ECS registry with per-type sparse-set pools.
#[derive(Debug, Default)]
pub struct SparseRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    pools: HashMap<ComponentTypeId, Pool>,
}

impl SparseRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.slots.iter().filter(|s| s.alive).count()
    }

    /// Typed convenience over [`Registry::insert_boxed`].
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotAlive`] if the entity is not alive.
    pub fn insert<T: Component>(&mut self, entity: Entity, value: T) -> Result<(), RegistryError> {
        self.insert_boxed(entity, T::type_id(), Box::new(value))
    }

    /// Typed convenience over [`Registry::component`].
    #[must_use]
    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.component(entity, T::type_id())
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// Number of components in the pool for `type_id`.
    #[must_use]
    pub fn pool_len(&self, type_id: ComponentTypeId) -> usize {
        self.pools.get(&type_id).map_or(0, |pool| pool.dense.len())
    }

    /// Marks `index` free without touching its stored version. Used when the
    /// slot table is extended past slots nobody asked for yet.
    fn park_slot(&mut self, index: u32) {
        self.slots.push(Slot {
            version: 0,
            alive: false,
        });
        self.free.push(index);
    }
}

impl Registry for SparseRegistry {
    fn create_entity(&mut self) -> Entity {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.version += 1;
            slot.alive = true;
            Entity::new(index, slot.version)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                version: 0,
                alive: true,
            });
            Entity::new(index, 0)
        }
    }

    fn create_entity_with_id(&mut self, entity: Entity) -> Result<Entity, RegistryError> {
        let index = entity.index as usize;

        if index >= self.slots.len() {
            // Extend the slot table; the gap slots become free for later use.
            trace!(index, "extending slot table for explicit identifier");
            while self.slots.len() < index {
                let parked = self.slots.len() as u32;
                self.park_slot(parked);
            }
            self.slots.push(Slot {
                version: entity.version,
                alive: true,
            });
            return Ok(entity);
        }

        if self.slots[index].alive {
            return Err(RegistryError::IdentifierConflict { entity });
        }

        // Recycle the dead slot at the exact requested version.
        self.free.retain(|&i| i != entity.index);
        self.slots[index] = Slot {
            version: entity.version,
            alive: true,
        };
        Ok(entity)
    }

    fn destroy_entity(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        self.slots[entity.index as usize].alive = false;
        self.free.push(entity.index);
        for pool in self.pools.values_mut() {
            pool.remove(entity.index);
        }
        true
    }

    fn is_alive(&self, entity: Entity) -> bool {
        self.slots
            .get(entity.index as usize)
            .is_some_and(|slot| slot.alive && slot.version == entity.version)
    }

    fn entities(&self) -> Box<dyn Iterator<Item = Entity> + '_> {
        Box::new(self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.alive
                .then(|| Entity::new(index as u32, slot.version))
        }))
    }

    fn component_entities(
        &self,
        type_id: ComponentTypeId,
    ) -> Box<dyn Iterator<Item = Entity> + '_> {
        match self.pools.get(&type_id) {
            Some(pool) => Box::new(pool.dense.iter().map(|(entity, _)| *entity)),
            None => Box::new(std::iter::empty()),
        }
    }

    fn component(
        &self,
        entity: Entity,
        type_id: ComponentTypeId,
    ) -> Option<&(dyn Any + Send + Sync)> {
        if !self.is_alive(entity) {
            return None;
        }
        self.pools
            .get(&type_id)
            .and_then(|pool| pool.get(entity))
            .map(|value| value.as_ref())
    }

    fn insert_boxed(
        &mut self,
        entity: Entity,
        type_id: ComponentTypeId,
        value: ErasedComponent,
    ) -> Result<(), RegistryError> {
        if !self.is_alive(entity) {
            return Err(RegistryError::NotAlive { entity });
        }
        self.pools.entry(type_id).or_default().insert(entity, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Tag(u32);

    impl Component for Tag {
        fn type_name() -> &'static str {
            "Tag"
        }
    }

    #[test]
    fn test_create_and_is_alive() {
        let mut reg = SparseRegistry::new();
        let e = reg.create_entity();
        assert!(reg.is_alive(e));
        assert_eq!(reg.entity_count(), 1);
    }

    #[test]
    fn test_destroy_invalidates_handle() {
        let mut reg = SparseRegistry::new();
        let e = reg.create_entity();
        assert!(reg.destroy_entity(e));
        assert!(!reg.is_alive(e));
        assert!(!reg.destroy_entity(e));
    }

    #[test]
    fn test_recycled_index_gets_new_version() {
        let mut reg = SparseRegistry::new();
        let e = reg.create_entity();
        reg.destroy_entity(e);
        let recycled = reg.create_entity();
        assert_eq!(recycled.index, e.index);
        assert_ne!(recycled.version, e.version);
        assert!(!reg.is_alive(e));
        assert!(reg.is_alive(recycled));
    }

    #[test]
    fn test_create_with_id_extends_slot_table() {
        let mut reg = SparseRegistry::new();
        let wanted = Entity::new(4, 7);
        let got = reg.create_entity_with_id(wanted).unwrap();
        assert_eq!(got, wanted);
        assert!(reg.is_alive(wanted));

        // The gap indices 0..4 are parked on the free list and reusable.
        let fresh = reg.create_entity();
        assert!(fresh.index < 4);
    }

    #[test]
    fn test_create_with_id_conflict_on_live_index() {
        let mut reg = SparseRegistry::new();
        let e = reg.create_entity();
        let err = reg.create_entity_with_id(Entity::new(e.index, 9)).unwrap_err();
        assert!(matches!(err, RegistryError::IdentifierConflict { .. }));
    }

    #[test]
    fn test_create_with_id_recycles_dead_slot() {
        let mut reg = SparseRegistry::new();
        let e = reg.create_entity();
        reg.destroy_entity(e);
        let wanted = Entity::new(e.index, 12);
        assert_eq!(reg.create_entity_with_id(wanted).unwrap(), wanted);
        assert!(reg.is_alive(wanted));
        // The index left the free list; a fresh create must not collide.
        let fresh = reg.create_entity();
        assert_ne!(fresh.index, wanted.index);
    }

    #[test]
    fn test_insert_and_get_component() {
        let mut reg = SparseRegistry::new();
        let e = reg.create_entity();
        reg.insert(e, Tag(3)).unwrap();
        assert_eq!(reg.get::<Tag>(e), Some(&Tag(3)));
        assert_eq!(reg.pool_len(<Tag as Component>::type_id()), 1);
    }

    #[test]
    fn test_insert_replaces_existing() {
        let mut reg = SparseRegistry::new();
        let e = reg.create_entity();
        reg.insert(e, Tag(1)).unwrap();
        reg.insert(e, Tag(2)).unwrap();
        assert_eq!(reg.get::<Tag>(e), Some(&Tag(2)));
        assert_eq!(reg.pool_len(<Tag as Component>::type_id()), 1);
    }

    #[test]
    fn test_insert_on_dead_entity_fails() {
        let mut reg = SparseRegistry::new();
        let e = reg.create_entity();
        reg.destroy_entity(e);
        assert!(matches!(
            reg.insert(e, Tag(0)),
            Err(RegistryError::NotAlive { .. })
        ));
    }

    #[test]
    fn test_destroy_removes_components_from_pools() {
        let mut reg = SparseRegistry::new();
        let a = reg.create_entity();
        let b = reg.create_entity();
        reg.insert(a, Tag(1)).unwrap();
        reg.insert(b, Tag(2)).unwrap();
        reg.destroy_entity(a);
        assert_eq!(reg.pool_len(<Tag as Component>::type_id()), 1);
        assert_eq!(reg.get::<Tag>(b), Some(&Tag(2)));
    }

    #[test]
    fn test_pool_iteration_is_insertion_order() {
        let mut reg = SparseRegistry::new();
        let a = reg.create_entity();
        let b = reg.create_entity();
        let c = reg.create_entity();
        reg.insert(b, Tag(0)).unwrap();
        reg.insert(a, Tag(1)).unwrap();
        reg.insert(c, Tag(2)).unwrap();
        let order: Vec<_> = reg.component_entities(<Tag as Component>::type_id()).collect();
        assert_eq!(order, vec![b, a, c]);
    }

    #[test]
    fn test_stale_handle_does_not_read_new_occupant() {
        let mut reg = SparseRegistry::new();
        let old = reg.create_entity();
        reg.insert(old, Tag(1)).unwrap();
        reg.destroy_entity(old);
        let new = reg.create_entity();
        reg.insert(new, Tag(2)).unwrap();
        assert_eq!(reg.get::<Tag>(old), None);
        assert_eq!(reg.get::<Tag>(new), Some(&Tag(2)));
    }
}
