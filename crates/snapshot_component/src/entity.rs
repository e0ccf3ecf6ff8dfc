//! Entity identifiers.
//!
//! An [`Entity`] is a lightweight identifier with no inherent data. It pairs
//! a slot *index* with a *version* counter that is incremented every time the
//! slot is recycled, so stale handles to a reused index never alias the new
//! occupant.

use serde::{Deserialize, Serialize};

/// A unique entity identifier: a slot index plus a reuse version.
///
/// Two entities are equal only if both the index and the version match.
/// Within a single registry, at most one live entity occupies a given index
/// at a given version.
///
/// Entities are pure identifiers — they carry no data of their own.
/// Components are attached to entities to give them meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity {
    /// The slot index inside the owning registry.
    pub index: u32,
    /// Incremented each time the slot index is recycled.
    pub version: u32,
}

impl Entity {
    /// Create an entity from its index and version parts.
    #[must_use]
    pub const fn new(index: u32, version: u32) -> Self {
        Self { index, version }
    }

    /// Pack the identifier into a single `u64` (index in the low half).
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        ((self.version as u64) << 32) | self.index as u64
    }

    /// Unpack an identifier previously produced by [`Entity::to_bits`].
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            version: (bits >> 32) as u32,
        }
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.version)
    }
}
