//! # snapshot_registry
//!
//! The ECS seam of the snapshot engine.
//!
//! This crate provides:
//!
//! - [`Registry`] — the capability trait the snapshot operations consume; a
//!   narrow view onto any ECS that can enumerate, create, and store.
//! - [`SparseRegistry`] — a reference generational-index registry with
//!   sparse-set component pools.

pub mod registry;
pub mod sparse;

pub use registry::{Registry, RegistryError};
pub use sparse::SparseRegistry;
