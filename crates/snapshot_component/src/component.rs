//! Core [`Component`] trait and type identity.
//!
//! Every piece of data a snapshot can carry must implement [`Component`].
//! The trait requires `Serialize + DeserializeOwned` so component values can
//! be encoded into snapshot payloads, and `Send + Sync + 'static` so erased
//! values can be moved between registries.
//!
//! Type identity is *name-based*: [`ComponentTypeId`] is the FNV-1a 64-bit
//! hash of the component's string name. A name hash is stable across builds
//! and processes, which raw `TypeId`s are not — a snapshot written by one
//! binary must be loadable by another.

use serde::{Serialize, de::DeserializeOwned};

/// A unique identifier for a component type, derived from its string name
/// using the FNV-1a 64-bit hash algorithm.
///
/// The ID is deterministic: any process that applies FNV-1a to the same
/// UTF-8 name bytes produces the same tag, so it doubles as the on-wire
/// section tag for that component type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentTypeId(pub u64);

impl ComponentTypeId {
    const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0100_0000_01b3;

    /// Compute the tag for a component name with FNV-1a 64-bit.
    #[must_use]
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = Self::FNV_OFFSET_BASIS;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(Self::FNV_PRIME);
            i += 1;
        }
        Self(hash)
    }

    /// Compute the tag for a Rust component type `T`.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self::from_name(T::type_name())
    }
}

impl std::fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// The contract all snapshot-visible data must satisfy.
///
/// # Examples
///
/// ```rust
/// use serde::{Serialize, Deserialize};
/// use snapshot_component::Component;
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// struct Health {
///     current: f32,
///     max: f32,
/// }
///
/// impl Component for Health {
///     fn type_name() -> &'static str { "Health" }
/// }
/// ```
pub trait Component: Send + Sync + 'static + Serialize + DeserializeOwned {
    /// A stable, human-readable name for this component type.
    fn type_name() -> &'static str;

    /// Returns the [`ComponentTypeId`] for this component.
    fn type_id() -> ComponentTypeId {
        ComponentTypeId::from_name(Self::type_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
    struct Health {
        current: f32,
        max: f32,
    }

    impl Component for Health {
        fn type_name() -> &'static str {
            "Health"
        }
    }

    #[test]
    fn test_type_id_is_stable() {
        assert_eq!(Health::type_id(), Health::type_id());
    }

    #[test]
    fn test_type_id_matches_from_name() {
        assert_eq!(Health::type_id(), ComponentTypeId::from_name("Health"));
    }

    #[test]
    fn test_type_id_differs_between_names() {
        assert_ne!(
            ComponentTypeId::from_name("Health"),
            ComponentTypeId::from_name("Velocity")
        );
    }

    #[test]
    fn test_fnv1a_known_vector() {
        // FNV-1a 64-bit of the empty string is the offset basis itself.
        assert_eq!(
            ComponentTypeId::from_name(""),
            ComponentTypeId(0xcbf2_9ce4_8422_2325)
        );
    }
}
