//! # snapshot_archive
//!
//! The byte-stream seam of the snapshot engine.
//!
//! This crate provides:
//!
//! - [`ArchiveWrite`] / [`ArchiveRead`] — ordered, sequential primitive and
//!   byte-payload I/O over a self-delimiting binary stream.
//! - [`BinaryWriter`] / [`BinaryReader`] — little-endian implementations
//!   over any `std::io` stream (files, sockets, in-memory buffers).
//! - [`error`] — archive-layer error types.

pub mod archive;
pub mod error;

pub use archive::{ArchiveRead, ArchiveWrite, BinaryReader, BinaryWriter, MAX_PAYLOAD_LEN};
pub use error::ArchiveError;
