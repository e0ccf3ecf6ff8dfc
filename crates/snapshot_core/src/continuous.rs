//! Continuous (merge) restore.
//!
//! [`ContinuousLoader`] merges a snapshot into a registry that may already
//! hold unrelated live entities. Every snapshot identifier is exchanged for
//! a freshly allocated one, and each component's registered reference-patch
//! callback rewrites embedded entity fields through the same [`RemapTable`],
//! so relationships captured in the snapshot — including cycles — survive
//! under the new identifiers.
//!
//! Identifier resolution is strictly get-or-allocate: the entity list
//! resolves its identifiers first, and any identifier discovered later
//! (inside a component record or a patched payload) is allocated on first
//! encounter. An identifier referenced only from payloads therefore becomes
//! a live, component-less "ghost" entity — a defined outcome, discoverable
//! through the remap table.

use std::collections::HashSet;

use tracing::{debug, warn};

use snapshot_archive::ArchiveRead;
use snapshot_component::{CodecRegistry, Entity, EntityRemapper, RemapTable};
use snapshot_registry::Registry;

use crate::error::SnapshotError;
use crate::format::{self, SectionHeader};

/// Get-or-allocate resolution against a live destination registry.
struct LiveRemapper<'a, R: Registry + ?Sized> {
    table: &'a mut RemapTable,
    registry: &'a mut R,
}

impl<R: Registry + ?Sized> EntityRemapper for LiveRemapper<'_, R> {
    fn remap(&mut self, old: Entity) -> Entity {
        let registry = &mut *self.registry;
        self.table
            .get_or_insert_with(old, || registry.create_entity())
    }
}

/// Merges snapshots into a live registry under fresh identifiers.
///
/// One loader owns one [`RemapTable`]; the table spans every section of the
/// loaded stream and is handed to the caller afterwards via
/// [`remap_table`](Self::remap_table) or
/// [`into_remap_table`](Self::into_remap_table).
#[derive(Debug)]
pub struct ContinuousLoader<'a> {
    codecs: &'a CodecRegistry,
    table: RemapTable,
}

impl<'a> ContinuousLoader<'a> {
    /// Create a loader over a codec registry, with an empty remap table.
    #[must_use]
    pub fn new(codecs: &'a CodecRegistry) -> Self {
        Self {
            codecs,
            table: RemapTable::new(),
        }
    }

    /// Merge a snapshot stream into `registry`.
    ///
    /// Merges are not transactional: on failure, entities and components
    /// already merged stay in the registry, and the remap table reflects
    /// every allocation made so far.
    ///
    /// # Errors
    ///
    /// [`SnapshotError::MalformedStream`] on structural violations,
    /// [`SnapshotError::Callback`] if a reference-patch callback rejects a
    /// component, and [`SnapshotError::Codec`] / [`SnapshotError::Archive`]
    /// on decode or I/O failures.
    pub fn load(
        &mut self,
        archive: &mut (impl ArchiveRead + ?Sized),
        registry: &mut (impl Registry + ?Sized),
    ) -> Result<(), SnapshotError> {
        format::read_header(archive)?;

        // Identifier resolution: allocate a destination entity for every
        // listed identifier. Duplicates in a malformed list collapse onto
        // the first allocation.
        let listed = format::read_entity_list_header(archive)?;
        for _ in 0..listed {
            let old = format::read_entity(archive)?;
            let mut remapper = LiveRemapper {
                table: &mut self.table,
                registry,
            };
            remapper.remap(old);
        }

        // Component materialisation: resolve, decode, patch, store.
        let mut merged = 0usize;
        loop {
            let SectionHeader::Component { type_id, count } = format::read_section_header(archive)?
            else {
                break;
            };

            let Some(codec) = self.codecs.get(type_id) else {
                warn!(%type_id, count, "skipping unknown component section");
                for _ in 0..count {
                    format::read_entity(archive)?;
                    let len = archive.read_u32()?;
                    archive.skip_bytes(len as usize)?;
                }
                continue;
            };

            for _ in 0..count {
                let old = format::read_entity(archive)?;
                let len = archive.read_u32()?;
                let payload = archive.read_bytes(len as usize)?;

                let mut remapper = LiveRemapper {
                    table: &mut self.table,
                    registry,
                };
                let new = remapper.remap(old);

                let mut value =
                    codec
                        .deserialize(&payload)
                        .map_err(|source| SnapshotError::Codec {
                            type_id,
                            entity: old,
                            source,
                        })?;
                codec
                    .patch(value.as_mut(), &mut remapper)
                    .map_err(|source| SnapshotError::Callback {
                        type_id,
                        entity: old,
                        source,
                    })?;

                registry
                    .insert_boxed(new, type_id, value)
                    .map_err(|_| SnapshotError::MalformedStream {
                        detail: format!("remapped entity {new} died during the merge"),
                    })?;
                merged += 1;
            }
        }

        debug!(
            entities = self.table.len(),
            components = merged,
            "snapshot merged"
        );
        Ok(())
    }

    /// The remap table accumulated so far.
    #[must_use]
    pub fn remap_table(&self) -> &RemapTable {
        &self.table
    }

    /// Consume the loader, handing the remap table to the caller.
    #[must_use]
    pub fn into_remap_table(self) -> RemapTable {
        self.table
    }

    /// Destroy every live entity in `registry` that this loader did not
    /// allocate. An explicit, opt-in sweep layered on top of the merge —
    /// never run implicitly. Returns the number of entities destroyed.
    pub fn prune(&self, registry: &mut (impl Registry + ?Sized)) -> usize {
        let keep: HashSet<Entity> = self.table.new_entities().collect();
        let doomed: Vec<Entity> = registry
            .entities()
            .filter(|entity| !keep.contains(entity))
            .collect();
        let mut destroyed = 0usize;
        for entity in doomed {
            if registry.destroy_entity(entity) {
                destroyed += 1;
            }
        }
        debug!(destroyed, kept = keep.len(), "pruned unmerged entities");
        destroyed
    }
}
