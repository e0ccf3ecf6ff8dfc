//! Full-rebuild restore.
//!
//! [`SnapshotLoader`] reconstructs a captured registry exactly: every entity
//! is recreated with its original index *and* version, and component
//! payloads are stored untouched — identifiers were preserved, so embedded
//! references are still valid as-is.

use tracing::{debug, warn};

use snapshot_archive::ArchiveRead;
use snapshot_component::CodecRegistry;
use snapshot_registry::{Registry, RegistryError};

use crate::error::SnapshotError;
use crate::format::{self, SectionHeader};

/// Restores a snapshot into a registry, preserving original identifiers.
///
/// The target registry is expected to start empty; restoring into a
/// populated one fails with [`SnapshotError::IdentifierConflict`] as soon as
/// a stored identifier is already live.
#[derive(Debug)]
pub struct SnapshotLoader<'a> {
    codecs: &'a CodecRegistry,
}

impl<'a> SnapshotLoader<'a> {
    /// Create a loader over a codec registry.
    #[must_use]
    pub fn new(codecs: &'a CodecRegistry) -> Self {
        Self { codecs }
    }

    /// Read a snapshot stream and recreate its entities and components in
    /// `registry` under their original identifiers.
    ///
    /// Component sections with no registered codec are skipped.
    ///
    /// # Errors
    ///
    /// [`SnapshotError::MalformedStream`] on structural violations,
    /// [`SnapshotError::IdentifierConflict`] if a stored identifier is
    /// already live, [`SnapshotError::DanglingReference`] if a component
    /// record addresses an entity the stream never listed, and
    /// [`SnapshotError::Codec`] / [`SnapshotError::Archive`] on decode or
    /// I/O failures.
    pub fn load(
        &self,
        archive: &mut (impl ArchiveRead + ?Sized),
        registry: &mut (impl Registry + ?Sized),
    ) -> Result<(), SnapshotError> {
        format::read_header(archive)?;

        let listed = format::read_entity_list_header(archive)?;
        for _ in 0..listed {
            let entity = format::read_entity(archive)?;
            registry.create_entity_with_id(entity).map_err(|err| match err {
                RegistryError::IdentifierConflict { entity } => {
                    SnapshotError::IdentifierConflict { entity }
                }
                RegistryError::NotAlive { entity } => SnapshotError::MalformedStream {
                    detail: format!("registry rejected listed entity {entity}"),
                },
            })?;
        }

        let mut sections = 0usize;
        loop {
            let SectionHeader::Component { type_id, count } = format::read_section_header(archive)?
            else {
                break;
            };
            sections += 1;

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
                let entity = format::read_entity(archive)?;
                let len = archive.read_u32()?;
                let payload = archive.read_bytes(len as usize)?;

                if !registry.is_alive(entity) {
                    return Err(SnapshotError::DanglingReference { entity, type_id });
                }
                let value = codec
                    .deserialize(&payload)
                    .map_err(|source| SnapshotError::Codec {
                        type_id,
                        entity,
                        source,
                    })?;
                registry
                    .insert_boxed(entity, type_id, value)
                    .map_err(|_| SnapshotError::DanglingReference { entity, type_id })?;
            }
        }

        debug!(entities = listed, sections, "snapshot restored");
        Ok(())
    }
}
