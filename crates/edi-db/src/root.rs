//! The ownership hierarchy table.
//!
//! [`Root`] tracks the handful of scope owners of one design run (top cell,
//! hierarchical sub-cells, libraries) and translates between their full
//! ids and the compact [`ObjectIndex`] every record stores as its owner.
//!
//! Slot 0 is a permanent sentinel. Indices are handed out append-only and
//! never recycled within a run: deleting an owner tombstones its slot, so
//! a record still carrying the old index fails resolution instead of
//! aliasing a newer owner.

use std::collections::HashMap;

use edi_core::{ObjectId, ObjectIndex};
use tracing::debug;

/// Compact index ↔ id table for scope owners.
#[derive(Clone, Debug)]
pub struct Root {
    hier_owners: Vec<ObjectId>,
    reverse: HashMap<ObjectId, ObjectIndex>,
    top_cell: Option<ObjectId>,
    tech_lib: Option<ObjectId>,
    timing_lib: Option<ObjectId>,
}

impl Root {
    /// An empty table holding only the sentinel slot.
    pub fn new() -> Self {
        Self {
            hier_owners: vec![ObjectId::NULL],
            reverse: HashMap::new(),
            top_cell: None,
            tech_lib: None,
            timing_lib: None,
        }
    }

    /// Append `id` and return its new index.
    ///
    /// Indices strictly increase across calls. Inserting an id that is
    /// already indexed gives it a fresh slot; lookups by id then return
    /// the newest one.
    ///
    /// # Panics
    ///
    /// Panics on the null id, or if the table outgrows `u32`.
    pub fn insert(&mut self, id: ObjectId) -> ObjectIndex {
        assert!(!id.is_null(), "cannot index the null object id");
        let raw = u32::try_from(self.hier_owners.len()).expect("hierarchy table exceeds u32 slots");
        let index = ObjectIndex(raw);
        self.hier_owners.push(id);
        self.reverse.insert(id, index);
        index
    }

    /// Index of `id`, if it is indexed.
    pub fn index_of(&self, id: ObjectId) -> Option<ObjectIndex> {
        self.reverse.get(&id).copied()
    }

    /// Id stored at `index`. `None` for the sentinel, a tombstoned slot or
    /// an index past the end of the table.
    pub fn id_at(&self, index: ObjectIndex) -> Option<ObjectId> {
        self.hier_owners
            .get(index.as_usize())
            .copied()
            .and_then(ObjectId::non_null)
    }

    /// Tombstone `id`'s slot. Returns `false` if it was not indexed.
    pub fn delete(&mut self, id: ObjectId) -> bool {
        let Some(index) = self.reverse.remove(&id) else {
            return false;
        };
        self.hier_owners[index.as_usize()] = ObjectId::NULL;
        debug!(%id, %index, "hierarchy slot tombstoned");
        true
    }

    /// Place `id` at `index`, growing the table as needed.
    ///
    /// Used to repopulate a previously exported hierarchy. Whatever id
    /// occupied the slot before loses its reverse mapping.
    ///
    /// # Panics
    ///
    /// Panics if `index` is the sentinel or `id` is null.
    pub fn set_hier_owner_id(&mut self, index: ObjectIndex, id: ObjectId) {
        assert!(!index.is_invalid(), "hierarchy slot 0 is reserved");
        assert!(!id.is_null(), "cannot index the null object id");
        let slot = index.as_usize();
        if slot >= self.hier_owners.len() {
            self.hier_owners.resize(slot + 1, ObjectId::NULL);
        }
        let previous = self.hier_owners[slot];
        if !previous.is_null() && self.reverse.get(&previous) == Some(&index) {
            self.reverse.remove(&previous);
        }
        self.hier_owners[slot] = id;
        self.reverse.insert(id, index);
    }

    /// Live `(index, id)` pairs in index order.
    pub fn entries(&self) -> impl Iterator<Item = (ObjectIndex, ObjectId)> + '_ {
        self.hier_owners
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, id)| !id.is_null())
            .map(|(i, &id)| (ObjectIndex(i as u32), id))
    }

    /// Table length, sentinel and tombstones included.
    pub fn len(&self) -> usize {
        self.hier_owners.len()
    }

    /// Whether only the sentinel slot exists.
    pub fn is_empty(&self) -> bool {
        self.hier_owners.len() == 1
    }

    /// Number of live (non-tombstoned) entries.
    pub fn live_count(&self) -> usize {
        self.reverse.len()
    }

    /// The active top cell.
    pub fn top_cell(&self) -> Option<ObjectId> {
        self.top_cell
    }

    /// The active technology library.
    pub fn tech_lib(&self) -> Option<ObjectId> {
        self.tech_lib
    }

    /// The active timing library.
    pub fn timing_lib(&self) -> Option<ObjectId> {
        self.timing_lib
    }

    pub(crate) fn set_top_cell(&mut self, id: Option<ObjectId>) {
        self.top_cell = id;
    }

    pub(crate) fn set_tech_lib(&mut self, id: Option<ObjectId>) {
        self.tech_lib = id;
    }

    pub(crate) fn set_timing_lib(&mut self, id: Option<ObjectId>) {
        self.timing_lib = id;
    }

    /// Forget any active scope equal to `id`.
    pub(crate) fn clear_active(&mut self, id: ObjectId) {
        for slot in [&mut self.top_cell, &mut self.tech_lib, &mut self.timing_lib] {
            if *slot == Some(id) {
                *slot = None;
            }
        }
    }

    /// Drop every entry, back to the single sentinel slot.
    pub fn reset(&mut self) {
        self.hier_owners.clear();
        self.hier_owners.push(ObjectId::NULL);
        self.reverse.clear();
        self.top_cell = None;
        self.tech_lib = None;
        self.timing_lib = None;
    }
}

impl Default for Root {
    fn default() -> Self {
        Self::new()
    }
}
