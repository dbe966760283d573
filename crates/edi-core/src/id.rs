//! Opaque object handles and compact hierarchy indices.

use std::fmt;

/// Global handle naming one stored record.
///
/// An `ObjectId` is opaque outside the pool layer: it supports equality,
/// ordering (so it can key a map) and a distinguished null value, but no
/// arithmetic. The bit layout that routes it to a pool, page and slot is
/// private to `edi-pool`.
///
/// Raw value 0 is the null sentinel and never names a live record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    /// The null handle.
    pub const NULL: Self = Self(0);

    /// Wrap a raw handle value, e.g. one read back from a persisted stream.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw handle value.
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Whether this is the null handle.
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// `None` for the null handle, `Some(self)` otherwise.
    pub fn non_null(self) -> Option<Self> {
        if self.is_null() {
            None
        } else {
            Some(self)
        }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Slot in the ownership hierarchy table.
///
/// Domain records store this small index instead of a full-width owner
/// handle. Index 0 is reserved as the invalid sentinel. Indices are handed
/// out append-only and are never recycled within one run, so a later scope
/// always receives a larger index than an earlier one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectIndex(pub u32);

impl ObjectIndex {
    /// The reserved sentinel slot.
    pub const INVALID: Self = Self(0);

    /// Whether this is the sentinel slot.
    pub const fn is_invalid(self) -> bool {
        self.0 == 0
    }

    /// Position in the hierarchy table.
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ObjectIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ObjectIndex {
    fn from(v: u32) -> Self {
        Self(v)
    }
}
