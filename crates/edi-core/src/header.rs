//! The record header embedded at the front of every stored entity.

use std::fmt;

use crate::id::{ObjectId, ObjectIndex};
use crate::object_type::ObjectType;
use crate::traits::Record;

/// Status bits carried by every record.
///
/// Flags are metadata: they never participate in record identity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ObjectFlags(u16);

impl ObjectFlags {
    /// The record is live. Cleared when the record is destroyed.
    pub const VALID: Self = Self(1 << 0);
    /// Selected in an interactive session.
    pub const SELECTED: Self = Self(1 << 1);
    /// Highlighted in an interactive session.
    pub const HIGHLIGHTED: Self = Self(1 << 2);
    /// Modified since load.
    pub const MODIFIED: Self = Self(1 << 3);
    /// Scratch mark for graph traversals.
    pub const MARKED: Self = Self(1 << 4);

    /// No flags set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Raw bit pattern.
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Whether every bit of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set the bits of `other`.
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clear the bits of `other`.
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Set or clear the bits of `other`.
    pub fn set(&mut self, other: Self, value: bool) {
        if value {
            self.insert(other);
        } else {
            self.remove(other);
        }
    }
}

/// Common record prefix: handle, compact owner index, type tag and flags.
///
/// A zeroed header (the [`Default`]) names nothing: null id, invalid
/// owner, no type, no flags. The pool stamps id and type at allocation;
/// the database layer stamps the owner.
#[derive(Clone, Copy, Debug, Default)]
pub struct ObjectHeader {
    id: ObjectId,
    owner: ObjectIndex,
    object_type: Option<ObjectType>,
    flags: ObjectFlags,
}

impl ObjectHeader {
    /// Stamp a freshly allocated record: set its id and type and mark it valid.
    pub fn stamp(&mut self, id: ObjectId, object_type: ObjectType) {
        self.id = id;
        self.object_type = Some(object_type);
        self.flags = ObjectFlags::VALID;
    }

    /// This record's handle.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Type tag. `None` only for a header that was never stamped.
    pub fn object_type(&self) -> Option<ObjectType> {
        self.object_type
    }

    /// Hierarchy index of the scope that owns this record.
    pub fn owner_index(&self) -> ObjectIndex {
        self.owner
    }

    /// Record the owning scope's hierarchy index.
    pub fn set_owner_index(&mut self, index: ObjectIndex) {
        self.owner = index;
    }

    /// All status flags.
    pub fn flags(&self) -> ObjectFlags {
        self.flags
    }

    /// Whether the record is live.
    pub fn is_valid(&self) -> bool {
        self.flags.contains(ObjectFlags::VALID)
    }

    /// Set or clear the valid flag.
    pub fn set_valid(&mut self, v: bool) {
        self.flags.set(ObjectFlags::VALID, v);
    }

    /// Whether the record is selected.
    pub fn is_selected(&self) -> bool {
        self.flags.contains(ObjectFlags::SELECTED)
    }

    /// Set or clear the selected flag.
    pub fn set_selected(&mut self, v: bool) {
        self.flags.set(ObjectFlags::SELECTED, v);
    }

    /// Whether the record is highlighted.
    pub fn is_highlighted(&self) -> bool {
        self.flags.contains(ObjectFlags::HIGHLIGHTED)
    }

    /// Set or clear the highlighted flag.
    pub fn set_highlighted(&mut self, v: bool) {
        self.flags.set(ObjectFlags::HIGHLIGHTED, v);
    }

    /// Whether the record is modified.
    pub fn is_modified(&self) -> bool {
        self.flags.contains(ObjectFlags::MODIFIED)
    }

    /// Set or clear the modified flag.
    pub fn set_modified(&mut self, v: bool) {
        self.flags.set(ObjectFlags::MODIFIED, v);
    }

    /// Whether the record is marked.
    pub fn is_marked(&self) -> bool {
        self.flags.contains(ObjectFlags::MARKED)
    }

    /// Set or clear the marked flag.
    pub fn set_marked(&mut self, v: bool) {
        self.flags.set(ObjectFlags::MARKED, v);
    }

    /// Externalized form: the compact owner index and the raw id.
    pub fn externalize(&self) -> PersistedHeader {
        PersistedHeader {
            owner: u64::from(self.owner.0),
            id: self.id.raw(),
        }
    }

    /// Apply a persisted header read back under a restoring context.
    ///
    /// `context` is the hierarchy index of the scope currently being
    /// restored, or `None` when restoring outside any scope.
    ///
    /// # Panics
    ///
    /// Panics if the persisted owner does not match `context` (or is not
    /// zero when there is no context). A mismatch means the stream was
    /// written under a different scope and the object graph would be
    /// corrupted by accepting it.
    pub fn restore(&mut self, persisted: PersistedHeader, context: Option<ObjectIndex>) {
        match context {
            Some(ctx) => assert!(
                persisted.owner == u64::from(ctx.0),
                "owner id {} mismatch {} in object {}",
                persisted.owner,
                ctx,
                persisted.id,
            ),
            None => assert!(
                persisted.owner == 0,
                "owner {} mismatch null context in object {}",
                persisted.owner,
                persisted.id,
            ),
        }
        self.owner = context.unwrap_or(ObjectIndex::INVALID);
        self.id = ObjectId::from_raw(persisted.id);
    }
}

impl PartialEq for ObjectHeader {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.owner == other.owner && self.object_type == other.object_type
    }
}

impl Eq for ObjectHeader {}

impl fmt::Display for ObjectHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.object_type {
            Some(t) => write!(f, "{t}#{}(owner={})", self.id, self.owner),
            None => write!(f, "<unstamped>#{}(owner={})", self.id, self.owner),
        }
    }
}

/// A bare header is itself a storable record.
impl Record for ObjectHeader {
    fn header(&self) -> &ObjectHeader {
        self
    }

    fn header_mut(&mut self) -> &mut ObjectHeader {
        self
    }
}

/// Context-relative header as written to a persisted stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PersistedHeader {
    /// Compact hierarchy index of the owning scope.
    pub owner: u64,
    /// Raw record handle.
    pub id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamped() -> ObjectHeader {
        let mut h = ObjectHeader::default();
        h.stamp(ObjectId::from_raw(42), ObjectType::Inst);
        h.set_owner_index(ObjectIndex(1));
        h
    }

    #[test]
    fn default_header_names_nothing() {
        let h = ObjectHeader::default();
        assert!(h.id().is_null());
        assert!(h.owner_index().is_invalid());
        assert_eq!(h.object_type(), None);
        assert!(!h.is_valid());
    }

    #[test]
    fn stamp_marks_valid() {
        let h = stamped();
        assert_eq!(h.id(), ObjectId::from_raw(42));
        assert_eq!(h.object_type(), Some(ObjectType::Inst));
        assert!(h.is_valid());
        assert_eq!(h.flags(), ObjectFlags::VALID);
    }

    #[test]
    fn flags_toggle_independently() {
        let mut h = stamped();
        h.set_selected(true);
        h.set_marked(true);
        assert!(h.is_selected());
        assert!(h.is_marked());
        assert!(!h.is_highlighted());
        h.set_selected(false);
        assert!(!h.is_selected());
        assert!(h.is_marked());
        h.set_highlighted(true);
        h.set_modified(true);
        assert!(h.is_highlighted() && h.is_modified());
        h.set_valid(false);
        assert!(!h.is_valid());
        assert!(h.is_marked());
    }

    #[test]
    fn flags_excluded_from_identity() {
        let a = stamped();
        let mut b = stamped();
        b.set_selected(true);
        b.set_valid(false);
        assert_eq!(a, b);
        b.set_owner_index(ObjectIndex(2));
        assert_ne!(a, b);
    }

    #[test]
    fn externalize_uses_compact_owner() {
        let p = stamped().externalize();
        assert_eq!(p, PersistedHeader { owner: 1, id: 42 });
    }

    #[test]
    fn restore_under_matching_context() {
        let mut h = ObjectHeader::default();
        h.restore(PersistedHeader { owner: 3, id: 77 }, Some(ObjectIndex(3)));
        assert_eq!(h.id(), ObjectId::from_raw(77));
        assert_eq!(h.owner_index(), ObjectIndex(3));
    }

    #[test]
    fn restore_without_context_requires_null_owner() {
        let mut h = ObjectHeader::default();
        h.restore(PersistedHeader { owner: 0, id: 9 }, None);
        assert_eq!(h.id(), ObjectId::from_raw(9));
        assert!(h.owner_index().is_invalid());
    }

    #[test]
    #[should_panic(expected = "mismatch")]
    fn restore_rejects_foreign_owner() {
        let mut h = ObjectHeader::default();
        h.restore(PersistedHeader { owner: 2, id: 77 }, Some(ObjectIndex(3)));
    }

    #[test]
    #[should_panic(expected = "mismatch null context")]
    fn restore_rejects_owner_without_context() {
        let mut h = ObjectHeader::default();
        h.restore(PersistedHeader { owner: 2, id: 77 }, None);
    }

    #[test]
    fn display_names_type_and_owner() {
        assert_eq!(stamped().to_string(), "INST#42(owner=1)");
        assert_eq!(ObjectHeader::default().to_string(), "<unstamped>#0(owner=0)");
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        const ALL_FLAGS: [ObjectFlags; 5] = [
            ObjectFlags::VALID,
            ObjectFlags::SELECTED,
            ObjectFlags::HIGHLIGHTED,
            ObjectFlags::MODIFIED,
            ObjectFlags::MARKED,
        ];

        proptest! {
            #[test]
            fn flag_writes_match_last_value(
                ops in proptest::collection::vec((0usize..5, any::<bool>()), 0..40),
            ) {
                let mut flags = ObjectFlags::empty();
                let mut expected = [false; 5];
                for &(i, v) in &ops {
                    flags.set(ALL_FLAGS[i], v);
                    expected[i] = v;
                }
                for (i, &f) in ALL_FLAGS.iter().enumerate() {
                    prop_assert_eq!(flags.contains(f), expected[i]);
                }
            }

            #[test]
            fn flag_writes_never_change_identity(
                ops in proptest::collection::vec((0usize..5, any::<bool>()), 0..40),
            ) {
                let base = stamped();
                let mut h = base;
                for &(i, v) in &ops {
                    let mut flags = h.flags();
                    flags.set(ALL_FLAGS[i], v);
                    h.set_valid(flags.contains(ObjectFlags::VALID));
                    h.set_selected(flags.contains(ObjectFlags::SELECTED));
                    h.set_marked(flags.contains(ObjectFlags::MARKED));
                }
                prop_assert_eq!(h, base);
            }
        }
    }
}
