//! Snapshot stream layout.
//!
//! ```text
//! Stream       = magic:u32 version:u16 EntityList ComponentSection* EndMarker
//! EntityList   = ENTITY_LIST_TAG:u64 count:u32 (index:u32 version:u32)[count]
//! ComponentSec = typeTag:u64 count:u32 (index:u32 version:u32 len:u32 payload)[count]
//! EndMarker    = END_MARKER:u64
//! ```
//!
//! All primitives are little-endian through the archive seam. The entity
//! list is always the first section; component sections follow in write
//! order; payloads are length-prefixed so readers can skip tags they do not
//! recognise.

use snapshot_archive::{ArchiveRead, ArchiveWrite};
use snapshot_component::{ComponentTypeId, Entity};

use crate::error::SnapshotError;

/// Stream magic, `"SNAP"` in little-endian byte order.
pub const MAGIC: u32 = u32::from_le_bytes(*b"SNAP");

/// Current stream layout version.
pub const FORMAT_VERSION: u16 = 1;

/// Section tag reserved for the entity-list section. Component tags are
/// FNV-1a hashes of non-empty names and never hash to zero.
pub const ENTITY_LIST_TAG: u64 = 0;

/// Section tag terminating the stream.
pub const END_MARKER: u64 = u64::MAX;

/// Write the stream header.
pub fn write_header(archive: &mut (impl ArchiveWrite + ?Sized)) -> Result<(), SnapshotError> {
    archive.write_u32(MAGIC)?;
    archive.write_u16(FORMAT_VERSION)?;
    Ok(())
}

/// Read and validate the stream header.
///
/// # Errors
///
/// [`SnapshotError::MalformedStream`] on a magic or version mismatch.
pub fn read_header(archive: &mut (impl ArchiveRead + ?Sized)) -> Result<(), SnapshotError> {
    let magic = archive.read_u32()?;
    if magic != MAGIC {
        return Err(SnapshotError::MalformedStream {
            detail: format!("bad magic {magic:#010x}, expected {MAGIC:#010x}"),
        });
    }
    let version = archive.read_u16()?;
    if version != FORMAT_VERSION {
        return Err(SnapshotError::MalformedStream {
            detail: format!("unsupported stream version {version}, expected {FORMAT_VERSION}"),
        });
    }
    Ok(())
}

/// Write one entity identifier.
pub fn write_entity(
    archive: &mut (impl ArchiveWrite + ?Sized),
    entity: Entity,
) -> Result<(), SnapshotError> {
    archive.write_u32(entity.index)?;
    archive.write_u32(entity.version)?;
    Ok(())
}

/// Read one entity identifier.
pub fn read_entity(archive: &mut (impl ArchiveRead + ?Sized)) -> Result<Entity, SnapshotError> {
    let index = archive.read_u32()?;
    let version = archive.read_u32()?;
    Ok(Entity::new(index, version))
}

/// Write a section header: its tag and record count.
pub fn write_section_header(
    archive: &mut (impl ArchiveWrite + ?Sized),
    tag: u64,
    count: u32,
) -> Result<(), SnapshotError> {
    archive.write_u64(tag)?;
    archive.write_u32(count)?;
    Ok(())
}

/// Read the entity-list section header, validating that the entity list is
/// where the layout demands it.
///
/// # Errors
///
/// [`SnapshotError::MalformedStream`] if some other section comes first.
pub fn read_entity_list_header(
    archive: &mut (impl ArchiveRead + ?Sized),
) -> Result<u32, SnapshotError> {
    let tag = archive.read_u64()?;
    if tag != ENTITY_LIST_TAG {
        return Err(SnapshotError::MalformedStream {
            detail: format!("expected the entity-list section first, found tag {tag:#x}"),
        });
    }
    Ok(archive.read_u32()?)
}

/// The header of a component section, or the end of the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionHeader {
    /// A component section with this tag and record count follows.
    Component {
        /// The component type tag.
        type_id: ComponentTypeId,
        /// Number of (entity, payload) records in the section.
        count: u32,
    },
    /// The end marker was reached; no further sections exist.
    End,
}

/// Read the next component-section header or the end marker.
///
/// # Errors
///
/// [`SnapshotError::MalformedStream`] if an entity-list tag shows up after
/// the first section.
pub fn read_section_header(
    archive: &mut (impl ArchiveRead + ?Sized),
) -> Result<SectionHeader, SnapshotError> {
    let tag = archive.read_u64()?;
    if tag == END_MARKER {
        return Ok(SectionHeader::End);
    }
    if tag == ENTITY_LIST_TAG {
        return Err(SnapshotError::MalformedStream {
            detail: "duplicate entity-list section".to_string(),
        });
    }
    let count = archive.read_u32()?;
    Ok(SectionHeader::Component {
        type_id: ComponentTypeId(tag),
        count,
    })
}

/// Write the end-of-stream marker.
pub fn write_end_marker(archive: &mut (impl ArchiveWrite + ?Sized)) -> Result<(), SnapshotError> {
    archive.write_u64(END_MARKER)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapshot_archive::{BinaryReader, BinaryWriter};

    #[test]
    fn test_header_roundtrip() {
        let mut writer = BinaryWriter::in_memory();
        write_header(&mut writer).unwrap();
        let buf = writer.into_inner();
        read_header(&mut BinaryReader::from_slice(&buf)).unwrap();
    }

    #[test]
    fn test_bad_magic_rejected() {
        let mut writer = BinaryWriter::in_memory();
        writer.write_u32(0x1234_5678).unwrap();
        writer.write_u16(FORMAT_VERSION).unwrap();
        let buf = writer.into_inner();
        assert!(matches!(
            read_header(&mut BinaryReader::from_slice(&buf)),
            Err(SnapshotError::MalformedStream { .. })
        ));
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let mut writer = BinaryWriter::in_memory();
        writer.write_u32(MAGIC).unwrap();
        writer.write_u16(FORMAT_VERSION + 1).unwrap();
        let buf = writer.into_inner();
        assert!(matches!(
            read_header(&mut BinaryReader::from_slice(&buf)),
            Err(SnapshotError::MalformedStream { .. })
        ));
    }

    #[test]
    fn test_entity_roundtrip() {
        let mut writer = BinaryWriter::in_memory();
        write_entity(&mut writer, Entity::new(11, 4)).unwrap();
        let buf = writer.into_inner();
        let entity = read_entity(&mut BinaryReader::from_slice(&buf)).unwrap();
        assert_eq!(entity, Entity::new(11, 4));
    }

    #[test]
    fn test_component_section_out_of_order_rejected() {
        let mut writer = BinaryWriter::in_memory();
        write_section_header(&mut writer, 0xABCD, 0).unwrap();
        let buf = writer.into_inner();
        assert!(matches!(
            read_entity_list_header(&mut BinaryReader::from_slice(&buf)),
            Err(SnapshotError::MalformedStream { .. })
        ));
    }

    #[test]
    fn test_end_marker_detected() {
        let mut writer = BinaryWriter::in_memory();
        write_end_marker(&mut writer).unwrap();
        let buf = writer.into_inner();
        assert_eq!(
            read_section_header(&mut BinaryReader::from_slice(&buf)).unwrap(),
            SectionHeader::End
        );
    }
}
