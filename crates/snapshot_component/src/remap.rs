//! Old→new identifier remapping for merge loads.
//!
//! A [`RemapTable`] records which freshly allocated identifier stands in for
//! each identifier found in a snapshot. It lives only for the duration of one
//! continuous load; it is never persisted or shared between loads.

use std::collections::HashMap;

use crate::entity::Entity;

/// Resolves an old (snapshot) entity identifier into a destination-registry
/// identifier, allocating a fresh one on first encounter.
///
/// Reference-patch callbacks receive a remapper so they can rewrite entity
/// fields embedded in component data. Calling [`remap`](Self::remap) with an
/// identifier the snapshot never listed is legal: it allocates a "ghost"
/// entity that is live but carries no component data.
pub trait EntityRemapper {
    /// Returns the destination identifier for `old`, allocating one the
    /// first time `old` is seen. Idempotent: repeated calls with the same
    /// `old` return the same identifier.
    fn remap(&mut self, old: Entity) -> Entity;
}

/// Transient mapping from snapshot identifiers to destination identifiers.
///
/// Populated incrementally during a continuous load — first from the entity
/// list, then on demand as component payloads reveal references to entities
/// never explicitly listed.
#[derive(Debug, Default, Clone)]
pub struct RemapTable {
    map: HashMap<Entity, Entity>,
}

impl RemapTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the destination identifier for `old`, if one was allocated.
    #[must_use]
    pub fn get(&self, old: Entity) -> Option<Entity> {
        self.map.get(&old).copied()
    }

    /// Returns the destination identifier for `old`, calling `alloc` to
    /// produce one if `old` has not been seen before.
    pub fn get_or_insert_with(&mut self, old: Entity, alloc: impl FnOnce() -> Entity) -> Entity {
        *self.map.entry(old).or_insert_with(alloc)
    }

    /// Returns `true` if `old` already has a destination identifier.
    #[must_use]
    pub fn contains(&self, old: Entity) -> bool {
        self.map.contains_key(&old)
    }

    /// Number of remapped identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if no identifiers have been remapped yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate over all `(old, new)` pairs, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, Entity)> + '_ {
        self.map.iter().map(|(&old, &new)| (old, new))
    }

    /// Iterate over the destination identifiers allocated by this load.
    pub fn new_entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.map.values().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_insert_is_idempotent() {
        let mut table = RemapTable::new();
        let old = Entity::new(5, 1);
        let first = table.get_or_insert_with(old, || Entity::new(0, 0));
        let second = table.get_or_insert_with(old, || Entity::new(99, 99));
        assert_eq!(first, second);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_get_unseen_is_none() {
        let table = RemapTable::new();
        assert_eq!(table.get(Entity::new(1, 0)), None);
        assert!(table.is_empty());
    }

    #[test]
    fn test_iteration_covers_all_pairs() {
        let mut table = RemapTable::new();
        table.get_or_insert_with(Entity::new(0, 0), || Entity::new(10, 0));
        table.get_or_insert_with(Entity::new(1, 0), || Entity::new(11, 0));
        let mut news: Vec<_> = table.new_entities().collect();
        news.sort();
        assert_eq!(news, vec![Entity::new(10, 0), Entity::new(11, 0)]);
        assert_eq!(table.iter().count(), 2);
    }
}
