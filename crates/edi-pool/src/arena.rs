//! Typed arenas: one per record type within a pool.
//!
//! A [`TypedArena`] owns every record of one [`ObjectType`] in a pool. It
//! grows page by page and keeps a free list so same-type slots are reused.
//!
//! Each slot carries an 8-bit generation that is embedded in the ids it
//! issues. Reusing a slot bumps the generation, so a stale id never
//! aliases the new occupant. A slot whose generation is exhausted is
//! retired instead of being returned to the free list, which keeps ids
//! unique for the lifetime of the pool.

use std::any::Any;

use edi_core::{ObjectHeader, ObjectId, ObjectType, Record};
use tracing::{debug, warn};

use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::handle::{ScopeTag, SlotKey};
use crate::page::Page;

/// Occupancy figures for one arena.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaStats {
    /// Record type stored in the arena.
    pub object_type: ObjectType,
    /// Rust type stored in the arena.
    pub record_type: &'static str,
    /// Live records.
    pub live: usize,
    /// Freed slots waiting for reuse.
    pub free: usize,
    /// Slots permanently retired after generation exhaustion.
    pub retired: usize,
    /// Pages allocated.
    pub pages: usize,
    /// Approximate bytes held by the arena, including record heap data.
    pub bytes: usize,
}

/// Type-erased view of a [`TypedArena`], used by the pool to handle ids
/// whose Rust record type is not known at the call site.
pub(crate) trait ErasedArena: Any {
    fn record_type_name(&self) -> &'static str;
    /// Header of the record in `key`'s slot if the generation matches,
    /// whether or not the record is still valid.
    fn header(&self, key: SlotKey) -> Option<&ObjectHeader>;
    fn header_mut(&mut self, key: SlotKey) -> Option<&mut ObjectHeader>;
    fn free(&mut self, key: SlotKey) -> bool;
    fn live(&self) -> usize;
    fn stats(&self) -> ArenaStats;
    fn live_ids(&self) -> Vec<ObjectId>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Page-based storage for every record of one type in one pool.
pub struct TypedArena<T: Record> {
    scope: ScopeTag,
    object_type: ObjectType,
    page_slots: u32,
    max_pages: u32,
    pages: Vec<Page<T>>,
    /// Freed `(page, slot)` pairs, reused LIFO.
    free_list: Vec<(u16, u16)>,
    live: usize,
    retired: usize,
}

impl<T: Record> TypedArena<T> {
    /// Create an empty arena. No page is allocated until the first record.
    pub fn new(scope: ScopeTag, object_type: ObjectType, config: &PoolConfig) -> Self {
        Self {
            scope,
            object_type,
            page_slots: config.page_slots,
            max_pages: config.max_pages,
            pages: Vec::new(),
            free_list: Vec::new(),
            live: 0,
            retired: 0,
        }
    }

    /// Place a zero-initialised record and stamp its header.
    ///
    /// Reuses the most recently freed slot if there is one, otherwise
    /// takes the next slot of the last page, appending a page when it is
    /// full.
    pub fn allocate(&mut self) -> Result<(ObjectId, &mut T), PoolError> {
        let (page, slot, generation) = match self.free_list.pop() {
            Some((page, slot)) => {
                let s = self.pages[page as usize]
                    .get_mut(slot)
                    .expect("free list only holds issued slots");
                // Retired slots never reach the free list, so this cannot wrap.
                s.generation += 1;
                s.record = T::default();
                (page, slot, s.generation)
            }
            None => {
                let (page, slot) = self.push_fresh()?;
                (page, slot, 0)
            }
        };

        let id = SlotKey {
            scope: self.scope,
            object_type: self.object_type,
            generation,
            page,
            slot,
        }
        .pack();
        self.live += 1;

        let record = &mut self.pages[page as usize]
            .get_mut(slot)
            .expect("slot was just issued")
            .record;
        record.header_mut().stamp(id, self.object_type);
        Ok((id, record))
    }

    fn push_fresh(&mut self) -> Result<(u16, u16), PoolError> {
        if let Some(last) = self.pages.last_mut() {
            if let Some(slot) = last.push(T::default()) {
                return Ok(((self.pages.len() - 1) as u16, slot));
            }
        }
        if self.pages.len() >= self.max_pages as usize {
            return Err(PoolError::CapacityExceeded {
                object_type: self.object_type,
                pages: self.pages.len() as u32,
            });
        }
        let mut page = Page::new(self.page_slots);
        let slot = page
            .push(T::default())
            .expect("page_slots >= 1, so a fresh page always fits");
        self.pages.push(page);
        debug!(
            scope = %self.scope,
            object_type = %self.object_type,
            pages = self.pages.len(),
            "arena grew by one page"
        );
        Ok(((self.pages.len() - 1) as u16, slot))
    }

    fn slot_for(&self, key: SlotKey) -> Option<&T> {
        if key.scope != self.scope || key.object_type != self.object_type {
            return None;
        }
        let slot = self.pages.get(key.page as usize)?.get(key.slot)?;
        (slot.generation == key.generation).then_some(&slot.record)
    }

    fn slot_for_mut(&mut self, key: SlotKey) -> Option<&mut T> {
        if key.scope != self.scope || key.object_type != self.object_type {
            return None;
        }
        let slot = self.pages.get_mut(key.page as usize)?.get_mut(key.slot)?;
        (slot.generation == key.generation).then_some(&mut slot.record)
    }

    /// Resolve a live record.
    pub(crate) fn get(&self, key: SlotKey) -> Option<&T> {
        self.slot_for(key).filter(|r| r.header().is_valid())
    }

    /// Resolve a live record mutably.
    pub(crate) fn get_mut(&mut self, key: SlotKey) -> Option<&mut T> {
        self.slot_for_mut(key).filter(|r| r.header().is_valid())
    }

    /// Number of live records.
    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Number of pages allocated.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Number of freed slots awaiting reuse.
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    /// Iterate over live records in page/slot order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.pages
            .iter()
            .flat_map(|p| p.iter())
            .map(|s| &s.record)
            .filter(|r| r.header().is_valid())
    }
}

impl<T: Record> ErasedArena for TypedArena<T> {
    fn record_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn header(&self, key: SlotKey) -> Option<&ObjectHeader> {
        self.slot_for(key).map(Record::header)
    }

    fn header_mut(&mut self, key: SlotKey) -> Option<&mut ObjectHeader> {
        self.slot_for_mut(key).map(Record::header_mut)
    }

    fn free(&mut self, key: SlotKey) -> bool {
        let Some(record) = self.slot_for_mut(key) else {
            warn!(id = %key.pack(), object_type = %key.object_type, "free of unknown or reused slot ignored");
            return false;
        };
        if !record.header().is_valid() {
            warn!(id = %key.pack(), object_type = %key.object_type, "free of already invalid record ignored");
            return false;
        }

        // Drop the record's heap data but keep the header readable, with
        // the valid bit cleared, until the slot is reused.
        let mut header = *record.header();
        header.set_valid(false);
        *record = T::default();
        *record.header_mut() = header;

        self.live -= 1;
        if key.generation == u8::MAX {
            self.retired += 1;
        } else {
            self.free_list.push((key.page, key.slot));
        }
        true
    }

    fn live(&self) -> usize {
        self.live
    }

    fn stats(&self) -> ArenaStats {
        let slot_bytes = std::mem::size_of::<crate::page::Slot<T>>();
        let reserved: usize = self.pages.iter().map(|p| p.capacity() * slot_bytes).sum();
        let heap: usize = self
            .iter()
            .map(|r| r.memory().saturating_sub(std::mem::size_of::<T>()))
            .sum();
        ArenaStats {
            object_type: self.object_type,
            record_type: self.record_type_name(),
            live: self.live,
            free: self.free_list.len(),
            retired: self.retired,
            pages: self.pages.len(),
            bytes: reserved + heap,
        }
    }

    fn live_ids(&self) -> Vec<ObjectId> {
        self.iter().map(|r| r.header().id()).collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
