//! Type-erased component codecs.
//!
//! The snapshot core never sees concrete component types: it moves values
//! around as [`ErasedComponent`] boxes and consults a [`CodecRegistry`] — a
//! type-tag-indexed table of capability entries — for everything type
//! specific: encoding, decoding, and reference patching. Callers register
//! every component type they intend to capture or restore before running any
//! snapshot operation.

use std::any::Any;
use std::collections::HashMap;

use crate::component::{Component, ComponentTypeId};
use crate::remap::EntityRemapper;

/// A component value with its concrete type erased.
pub type ErasedComponent = Box<dyn Any + Send + Sync>;

/// Errors produced while encoding or decoding a component payload.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Failed to encode a component to MessagePack.
    #[error("failed to encode component: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// Failed to decode a component from MessagePack.
    #[error("failed to decode component: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    /// An erased value did not hold the concrete type its tag promises.
    #[error("component value has the wrong concrete type for tag {type_id}")]
    TypeMismatch {
        /// The tag the value was presented under.
        type_id: ComponentTypeId,
    },
}

/// Error reported by a reference-patch callback.
///
/// A callback rejecting its input aborts the remainder of the load; see the
/// continuous loader for the partial-merge semantics.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct PatchError {
    /// Human-readable reason the callback rejected the component.
    pub message: String,
}

impl PatchError {
    /// Create a patch error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

type SerializeFn = fn(&ComponentCodec, &(dyn Any + Send + Sync)) -> Result<Vec<u8>, CodecError>;
type DeserializeFn = fn(&[u8]) -> Result<ErasedComponent, CodecError>;
type PatchFn = Box<
    dyn Fn(&mut (dyn Any + Send + Sync), &mut dyn EntityRemapper) -> Result<(), PatchError>
        + Send
        + Sync,
>;

/// The per-type capability entry: how to encode, decode, and patch one
/// component type.
pub struct ComponentCodec {
    type_id: ComponentTypeId,
    name: &'static str,
    serialize_fn: SerializeFn,
    deserialize_fn: DeserializeFn,
    patch_fn: Option<PatchFn>,
}

impl ComponentCodec {
    /// The tag this codec is registered under.
    #[must_use]
    pub fn type_id(&self) -> ComponentTypeId {
        self.type_id
    }

    /// The component's human-readable name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Encode an erased component to MessagePack bytes.
    ///
    /// # Errors
    ///
    /// [`CodecError::TypeMismatch`] if the value is not the registered type,
    /// [`CodecError::Encode`] if serialisation fails.
    pub fn serialize(&self, value: &(dyn Any + Send + Sync)) -> Result<Vec<u8>, CodecError> {
        (self.serialize_fn)(self, value)
    }

    /// Decode MessagePack bytes into an erased component.
    ///
    /// # Errors
    ///
    /// [`CodecError::Decode`] if the payload is not a valid encoding of the
    /// registered type.
    pub fn deserialize(&self, bytes: &[u8]) -> Result<ErasedComponent, CodecError> {
        (self.deserialize_fn)(bytes)
    }

    /// Returns `true` if a reference-patch callback is registered.
    #[must_use]
    pub fn has_patch(&self) -> bool {
        self.patch_fn.is_some()
    }

    /// Run the reference-patch callback on an erased component, if one is
    /// registered. A codec without a callback patches nothing and succeeds.
    ///
    /// # Errors
    ///
    /// Propagates the [`PatchError`] reported by the callback.
    pub fn patch(
        &self,
        value: &mut (dyn Any + Send + Sync),
        remapper: &mut dyn EntityRemapper,
    ) -> Result<(), PatchError> {
        match &self.patch_fn {
            Some(patch) => patch(value, remapper),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for ComponentCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentCodec")
            .field("type_id", &self.type_id)
            .field("name", &self.name)
            .field("has_patch", &self.has_patch())
            .finish()
    }
}

/// Registry of [`ComponentCodec`]s, keyed by [`ComponentTypeId`].
///
/// This is the serialization mapping the snapshot operations consult; a tag
/// missing from the registry at capture time is a caller configuration error
/// (`TypeNotRegistered` in the core).
#[derive(Debug, Default)]
pub struct CodecRegistry {
    codecs: HashMap<ComponentTypeId, ComponentCodec>,
}

impl CodecRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component type without a reference-patch callback.
    ///
    /// Suitable for components that embed no [`Entity`](crate::Entity)
    /// fields. Re-registering a type replaces its entry.
    pub fn register<T: Component>(&mut self) -> ComponentTypeId {
        self.insert::<T>(None)
    }

    /// Register a component type together with its reference-patch callback.
    ///
    /// The callback receives the freshly decoded component and a remapper;
    /// it must rewrite every embedded entity field through the remapper and
    /// leave all other fields untouched.
    pub fn register_with_patch<T, F>(&mut self, patch: F) -> ComponentTypeId
    where
        T: Component,
        F: Fn(&mut T, &mut dyn EntityRemapper) -> Result<(), PatchError> + Send + Sync + 'static,
    {
        let erased: PatchFn = Box::new(move |value, remapper| {
            let component = value
                .downcast_mut::<T>()
                .ok_or_else(|| PatchError::new("patch callback received a foreign type"))?;
            patch(component, remapper)
        });
        self.insert::<T>(Some(erased))
    }

    fn insert<T: Component>(&mut self, patch_fn: Option<PatchFn>) -> ComponentTypeId {
        let type_id = T::type_id();
        let codec = ComponentCodec {
            type_id,
            name: T::type_name(),
            serialize_fn: |codec, value| {
                let component = value
                    .downcast_ref::<T>()
                    .ok_or(CodecError::TypeMismatch {
                        type_id: codec.type_id,
                    })?;
                Ok(rmp_serde::to_vec_named(component)?)
            },
            deserialize_fn: |bytes| {
                let component: T = rmp_serde::from_slice(bytes)?;
                Ok(Box::new(component))
            },
            patch_fn,
        };
        self.codecs.insert(type_id, codec);
        type_id
    }

    /// Look up the codec for a tag.
    #[must_use]
    pub fn get(&self, type_id: ComponentTypeId) -> Option<&ComponentCodec> {
        self.codecs.get(&type_id)
    }

    /// Returns `true` if a codec is registered for the tag.
    #[must_use]
    pub fn contains(&self, type_id: ComponentTypeId) -> bool {
        self.codecs.contains_key(&type_id)
    }

    /// Number of registered component types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    /// Returns `true` if no component types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::remap::RemapTable;

    #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Position {
        x: f32,
        y: f32,
    }

    impl Component for Position {
        fn type_name() -> &'static str {
            "Position"
        }
    }

    #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Link {
        target: Entity,
    }

    impl Component for Link {
        fn type_name() -> &'static str {
            "Link"
        }
    }

    struct TableRemapper {
        table: RemapTable,
        next: u32,
    }

    impl EntityRemapper for TableRemapper {
        fn remap(&mut self, old: Entity) -> Entity {
            let next = &mut self.next;
            self.table.get_or_insert_with(old, || {
                let new = Entity::new(*next, 0);
                *next += 1;
                new
            })
        }
    }

    #[test]
    fn test_codec_roundtrip() {
        let mut registry = CodecRegistry::new();
        let tag = registry.register::<Position>();
        let codec = registry.get(tag).unwrap();

        let value = Position { x: 1.0, y: -2.5 };
        let bytes = codec.serialize(&value).unwrap();
        let restored = codec.deserialize(&bytes).unwrap();
        assert_eq!(restored.downcast_ref::<Position>(), Some(&value));
    }

    #[test]
    fn test_serialize_rejects_foreign_type() {
        let mut registry = CodecRegistry::new();
        let tag = registry.register::<Position>();
        let codec = registry.get(tag).unwrap();

        let wrong = Link {
            target: Entity::new(0, 0),
        };
        assert!(matches!(
            codec.serialize(&wrong),
            Err(CodecError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_patch_rewrites_entity_field() {
        let mut registry = CodecRegistry::new();
        let tag = registry.register_with_patch::<Link, _>(|link, remapper| {
            link.target = remapper.remap(link.target);
            Ok(())
        });
        let codec = registry.get(tag).unwrap();

        let old = Entity::new(7, 3);
        let mut value: ErasedComponent = Box::new(Link { target: old });
        let mut remapper = TableRemapper {
            table: RemapTable::new(),
            next: 0,
        };
        codec.patch(value.as_mut(), &mut remapper).unwrap();

        let link = value.downcast_ref::<Link>().unwrap();
        assert_eq!(link.target, remapper.table.get(old).unwrap());
    }

    #[test]
    fn test_patch_without_callback_is_noop() {
        let mut registry = CodecRegistry::new();
        let tag = registry.register::<Position>();
        let codec = registry.get(tag).unwrap();
        assert!(!codec.has_patch());

        let mut value: ErasedComponent = Box::new(Position { x: 0.0, y: 0.0 });
        let mut remapper = TableRemapper {
            table: RemapTable::new(),
            next: 0,
        };
        codec.patch(value.as_mut(), &mut remapper).unwrap();
        assert!(remapper.table.is_empty());
    }
}
