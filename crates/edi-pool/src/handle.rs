//! Bit layout of an [`ObjectId`] and the scope tag that routes it.
//!
//! Outside this crate an `ObjectId` is opaque. Inside, it packs the
//! location of a record so that resolution is O(1) without a lookup table:
//!
//! ```text
//!  63        48 47    40 39    32 31        16 15         0
//! +------------+--------+--------+------------+------------+
//! |   scope    |  type  |  gen   |    page    |    slot    |
//! +------------+--------+--------+------------+------------+
//! ```
//!
//! Scope tags start at 1, so a packed id is never the null handle.

use std::fmt;

use edi_core::{ObjectId, ObjectType};

/// Identifies one memory pool within a [`PoolRegistry`](crate::PoolRegistry).
///
/// Tags are minted by the registry, start at 1 and are never reused by
/// the same registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeTag(pub u16);

impl ScopeTag {
    /// Extract the scope tag embedded in an id. `None` for the null handle.
    pub fn of(id: ObjectId) -> Option<Self> {
        let tag = (id.raw() >> SCOPE_SHIFT) as u16;
        if tag == 0 {
            None
        } else {
            Some(Self(tag))
        }
    }
}

impl fmt::Display for ScopeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

const SCOPE_SHIFT: u32 = 48;
const TYPE_SHIFT: u32 = 40;
const GENERATION_SHIFT: u32 = 32;
const PAGE_SHIFT: u32 = 16;

/// Decoded location of a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SlotKey {
    pub(crate) scope: ScopeTag,
    pub(crate) object_type: ObjectType,
    pub(crate) generation: u8,
    pub(crate) page: u16,
    pub(crate) slot: u16,
}

impl SlotKey {
    pub(crate) fn pack(self) -> ObjectId {
        ObjectId::from_raw(
            (u64::from(self.scope.0) << SCOPE_SHIFT)
                | (u64::from(self.object_type.as_u8()) << TYPE_SHIFT)
                | (u64::from(self.generation) << GENERATION_SHIFT)
                | (u64::from(self.page) << PAGE_SHIFT)
                | u64::from(self.slot),
        )
    }

    /// Decode an id. `None` for the null handle or an unknown type byte.
    pub(crate) fn unpack(id: ObjectId) -> Option<Self> {
        let raw = id.raw();
        let scope = ScopeTag::of(id)?;
        let object_type = ObjectType::from_u8((raw >> TYPE_SHIFT) as u8)?;
        Some(Self {
            scope,
            object_type,
            generation: (raw >> GENERATION_SHIFT) as u8,
            page: (raw >> PAGE_SHIFT) as u16,
            slot: raw as u16,
        })
    }
}

/// The type tag embedded in an id, without resolving it.
pub fn object_type_of(id: ObjectId) -> Option<ObjectType> {
    SlotKey::unpack(id).map(|k| k.object_type)
}
