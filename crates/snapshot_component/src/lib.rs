//! # snapshot_component
//!
//! The data vocabulary of the snapshot engine — what an entity is, what a
//! component is, and how component types are identified, encoded, and
//! patched across registries.
//!
//! This crate provides:
//!
//! - [`Entity`] — index + version entity identifiers.
//! - [`Component`] trait and FNV-1a [`ComponentTypeId`] type tags.
//! - [`CodecRegistry`] — type-tag-indexed serialize/deserialize/patch table.
//! - [`RemapTable`] / [`EntityRemapper`] — old→new identifier mapping used
//!   during merge loads.

pub mod codec;
pub mod component;
pub mod entity;
pub mod remap;

pub use codec::{CodecError, CodecRegistry, ComponentCodec, ErasedComponent, PatchError};
pub use component::{Component, ComponentTypeId};
pub use entity::Entity;
pub use remap::{EntityRemapper, RemapTable};
