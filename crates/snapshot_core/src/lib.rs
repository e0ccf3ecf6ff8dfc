//! # snapshot_core
//!
//! Capture and restore of ECS registry state.
//!
//! Three operations share one stream layout:
//!
//! - [`SnapshotWriter`] — walks a registry and emits the entity list plus
//!   one section per requested component type into an archive.
//! - [`SnapshotLoader`] — full rebuild: recreates entities under their
//!   *original* identifiers (index and version) in an empty registry.
//! - [`ContinuousLoader`] — merge: allocates *fresh* identifiers in a live
//!   registry and rewrites embedded entity references through a
//!   [`RemapTable`](snapshot_component::RemapTable) and per-type
//!   reference-patch callbacks.
//!
//! All operations are synchronous and single-threaded over one archive and
//! one registry; the caller provides exclusion.
//!
//! ## Usage
//!
//! ```rust
//! use serde::{Serialize, Deserialize};
//! use snapshot_archive::{BinaryReader, BinaryWriter};
//! use snapshot_component::{CodecRegistry, Component, Entity};
//! use snapshot_core::{ContinuousLoader, SnapshotWriter};
//! use snapshot_registry::{Registry, SparseRegistry};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Link { target: Entity }
//! impl Component for Link {
//!     fn type_name() -> &'static str { "Link" }
//! }
//!
//! let mut codecs = CodecRegistry::new();
//! codecs.register_with_patch::<Link, _>(|link, remapper| {
//!     link.target = remapper.remap(link.target);
//!     Ok(())
//! });
//!
//! let mut world = SparseRegistry::new();
//! let a = world.create_entity();
//! let b = world.create_entity();
//! world.insert(a, Link { target: b }).unwrap();
//!
//! let mut archive = BinaryWriter::in_memory();
//! SnapshotWriter::new(&codecs)
//!     .capture(&world, &[Link::type_id()], &mut archive)
//!     .unwrap();
//! let stream = archive.into_inner();
//!
//! let mut other = SparseRegistry::new();
//! let mut loader = ContinuousLoader::new(&codecs);
//! loader
//!     .load(&mut BinaryReader::from_slice(&stream), &mut other)
//!     .unwrap();
//! let table = loader.into_remap_table();
//! assert!(other.is_alive(table.get(b).unwrap()));
//! ```

pub mod continuous;
pub mod error;
pub mod format;
pub mod loader;
pub mod writer;

pub use continuous::ContinuousLoader;
pub use error::SnapshotError;
pub use loader::SnapshotLoader;
pub use writer::SnapshotWriter;
