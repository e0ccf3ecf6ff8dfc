//! Snapshot capture.
//!
//! [`SnapshotWriter`] walks a registry and emits a self-contained snapshot
//! stream: the entity list first, then one section per requested component
//! type, in request order. The registry is never mutated.

use tracing::debug;

use snapshot_archive::ArchiveWrite;
use snapshot_component::{CodecRegistry, ComponentTypeId};
use snapshot_registry::Registry;

use crate::error::SnapshotError;
use crate::format;

/// Captures registry state into an archive.
#[derive(Debug)]
pub struct SnapshotWriter<'a> {
    codecs: &'a CodecRegistry,
}

impl<'a> SnapshotWriter<'a> {
    /// Create a writer over a codec registry.
    #[must_use]
    pub fn new(codecs: &'a CodecRegistry) -> Self {
        Self { codecs }
    }

    /// Capture the registry's live entities plus the pools of every
    /// `requested` component type, in request order. An empty request list
    /// captures entities only.
    ///
    /// On failure the archive holds a partially written stream and must be
    /// discarded by the caller.
    ///
    /// # Errors
    ///
    /// [`SnapshotError::TypeNotRegistered`] if a requested tag has no codec
    /// (raised before anything is written); [`SnapshotError::Archive`] or
    /// [`SnapshotError::Codec`] if the stream or an encode fails.
    pub fn capture(
        &self,
        registry: &(impl Registry + ?Sized),
        requested: &[ComponentTypeId],
        archive: &mut (impl ArchiveWrite + ?Sized),
    ) -> Result<(), SnapshotError> {
        // Reject unregistered tags before touching the archive.
        for &type_id in requested {
            if !self.codecs.contains(type_id) {
                return Err(SnapshotError::TypeNotRegistered { type_id });
            }
        }

        format::write_header(archive)?;

        let entities: Vec<_> = registry.entities().collect();
        format::write_section_header(archive, format::ENTITY_LIST_TAG, entities.len() as u32)?;
        for &entity in &entities {
            format::write_entity(archive, entity)?;
        }

        for &type_id in requested {
            self.capture_section(registry, type_id, archive)?;
        }

        format::write_end_marker(archive)?;
        debug!(
            entities = entities.len(),
            sections = requested.len(),
            "snapshot captured"
        );
        Ok(())
    }

    fn capture_section(
        &self,
        registry: &(impl Registry + ?Sized),
        type_id: ComponentTypeId,
        archive: &mut (impl ArchiveWrite + ?Sized),
    ) -> Result<(), SnapshotError> {
        // Registration was checked in capture().
        let codec = self
            .codecs
            .get(type_id)
            .ok_or(SnapshotError::TypeNotRegistered { type_id })?;

        let members: Vec<_> = registry
            .component_entities(type_id)
            .filter_map(|entity| registry.component(entity, type_id).map(|value| (entity, value)))
            .collect();
        format::write_section_header(archive, type_id.0, members.len() as u32)?;

        for (entity, value) in members {
            let payload = codec
                .serialize(value)
                .map_err(|source| SnapshotError::Codec {
                    type_id,
                    entity,
                    source,
                })?;
            format::write_entity(archive, entity)?;
            archive.write_u32(payload.len() as u32)?;
            archive.write_bytes(&payload)?;
        }
        Ok(())
    }
}
