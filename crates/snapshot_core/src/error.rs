//! Snapshot-pipeline error types.
//!
//! Every failure carries enough context — the entity, the component tag, the
//! structural detail — for the caller to diagnose it. The core never retries
//! anything; the caller decides whether to start over from a fresh archive.

use snapshot_archive::ArchiveError;
use snapshot_component::{CodecError, ComponentTypeId, Entity, PatchError};

/// Errors raised by snapshot capture and restore operations.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The archive stream failed while writing or reading. The archive is
    /// left in an unspecified state and must be discarded.
    #[error("archive failure: {0}")]
    Archive(ArchiveError),

    /// A component payload failed to encode or decode.
    #[error("codec failure for {type_id} on {entity}: {source}")]
    Codec {
        /// The component type involved.
        type_id: ComponentTypeId,
        /// The entity whose payload failed.
        entity: Entity,
        /// The underlying codec error.
        source: CodecError,
    },

    /// A requested component type has no codec registered.
    #[error("no codec registered for component type {type_id}")]
    TypeNotRegistered {
        /// The unregistered tag.
        type_id: ComponentTypeId,
    },

    /// The stream violates the snapshot layout: bad magic, unsupported
    /// version, sections out of order, or truncated data.
    #[error("malformed snapshot stream: {detail}")]
    MalformedStream {
        /// What was found where, and what was expected.
        detail: String,
    },

    /// Full rebuild only: a component record addressed an entity the
    /// entity-list section never created.
    #[error("component {type_id} references entity {entity}, which the snapshot never listed")]
    DanglingReference {
        /// The unlisted entity.
        entity: Entity,
        /// The component type whose record referenced it.
        type_id: ComponentTypeId,
    },

    /// Full rebuild only: the target registry already holds the exact
    /// identifier being restored.
    #[error("identifier {entity} is already live in the target registry")]
    IdentifierConflict {
        /// The conflicting identifier.
        entity: Entity,
    },

    /// Continuous load only: a reference-patch callback rejected its input.
    /// Entities and components merged before the failure are retained.
    #[error("reference-patch callback failed for {type_id} on snapshot entity {entity}: {source}")]
    Callback {
        /// The component type whose callback failed.
        type_id: ComponentTypeId,
        /// The snapshot-side entity whose component was being patched.
        entity: Entity,
        /// The callback's error.
        source: PatchError,
    },
}

impl From<ArchiveError> for SnapshotError {
    fn from(err: ArchiveError) -> Self {
        match err {
            // A short read means the stream was cut off mid-section: that is
            // a structural defect of the snapshot, not an I/O fault.
            ArchiveError::UnexpectedEof { needed } => SnapshotError::MalformedStream {
                detail: format!("stream truncated ({needed} bytes short)"),
            },
            other => SnapshotError::Archive(other),
        }
    }
}
