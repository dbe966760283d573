//! Fixed-capacity record pages.
//!
//! A [`Page`] is a `Vec` reserved to its full capacity at creation and
//! never pushed past it, so its buffer is never reallocated. Growth adds
//! pages, it never resizes one: a record's address is stable from the
//! moment it is placed until its pool is dropped.

/// A record slot: the record plus the generation that was last issued for it.
pub(crate) struct Slot<T> {
    pub(crate) generation: u8,
    pub(crate) record: T,
}

/// A single fixed-capacity page of slots.
pub(crate) struct Page<T> {
    slots: Vec<Slot<T>>,
    limit: usize,
}

impl<T> Page<T> {
    /// Create an empty page with room for `capacity` slots.
    pub(crate) fn new(capacity: u32) -> Self {
        Self {
            slots: Vec::with_capacity(capacity as usize),
            limit: capacity as usize,
        }
    }

    /// Place a record in the next unused slot.
    ///
    /// Returns the slot index, or `None` if the page is full.
    pub(crate) fn push(&mut self, record: T) -> Option<u16> {
        if self.is_full() {
            return None;
        }
        let index = self.slots.len() as u16;
        self.slots.push(Slot {
            generation: 0,
            record,
        });
        Some(index)
    }

    pub(crate) fn get(&self, slot: u16) -> Option<&Slot<T>> {
        self.slots.get(slot as usize)
    }

    pub(crate) fn get_mut(&mut self, slot: u16) -> Option<&mut Slot<T>> {
        self.slots.get_mut(slot as usize)
    }

    pub(crate) fn is_full(&self) -> bool {
        self.slots.len() == self.limit
    }

    /// Number of slots handed out so far.
    #[cfg(test)]
    pub(crate) fn used(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.limit
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Slot<T>> {
        self.slots.iter()
    }
}
