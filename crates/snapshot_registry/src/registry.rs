//! The registry capability seam.
//!
//! The snapshot operations do not own an ECS; they borrow one through the
//! [`Registry`] trait for the duration of a single capture or restore call.
//! Any ECS that can enumerate its live entities in a stable order, create
//! entities (both fresh and with an explicit identifier), and store erased
//! component values can plug in here.

use std::any::Any;

use snapshot_component::{ComponentTypeId, Entity, ErasedComponent};

/// Errors reported by a registry collaborator.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// An explicit-identifier create found the identifier already live.
    #[error("identifier {entity} is already live in the target registry")]
    IdentifierConflict {
        /// The identifier that could not be replicated.
        entity: Entity,
    },

    /// A component operation addressed a dead or never-created entity.
    #[error("entity {entity} is not alive")]
    NotAlive {
        /// The identifier that was addressed.
        entity: Entity,
    },
}

/// Capability interface the snapshot core requires of an ECS registry.
///
/// Ordering guarantees: [`entities`](Self::entities) yields live entities in
/// a deterministic order (identifier order or creation order, the registry's
/// choice, stable across calls while the registry is unchanged), and
/// [`component_entities`](Self::component_entities) yields the pool's own
/// storage order.
pub trait Registry {
    /// Allocate a fresh entity.
    fn create_entity(&mut self) -> Entity;

    /// Create an entity with this exact identifier — index *and* version —
    /// extending or recycling internal bookkeeping as needed.
    ///
    /// # Errors
    ///
    /// [`RegistryError::IdentifierConflict`] if the identifier's index is
    /// already occupied by a live entity.
    fn create_entity_with_id(&mut self, entity: Entity) -> Result<Entity, RegistryError>;

    /// Destroy a live entity and drop all its components.
    ///
    /// Returns `true` if the entity was alive.
    fn destroy_entity(&mut self, entity: Entity) -> bool;

    /// Returns `true` if the identifier denotes a live entity (index and
    /// version both current).
    fn is_alive(&self, entity: Entity) -> bool;

    /// Iterate all live entities in the registry's stable order.
    fn entities(&self) -> Box<dyn Iterator<Item = Entity> + '_>;

    /// Iterate the entities holding a component of this type, in pool
    /// storage order. Unknown types yield an empty iterator.
    fn component_entities(&self, type_id: ComponentTypeId) -> Box<dyn Iterator<Item = Entity> + '_>;

    /// Borrow the erased component of this type on this entity, if any.
    fn component(&self, entity: Entity, type_id: ComponentTypeId)
    -> Option<&(dyn Any + Send + Sync)>;

    /// Store an erased component of this type on this entity, replacing any
    /// existing value.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotAlive`] if the entity is not alive.
    fn insert_boxed(
        &mut self,
        entity: Entity,
        type_id: ComponentTypeId,
        value: ErasedComponent,
    ) -> Result<(), RegistryError>;
}
