//! Pool-resident growable arrays.
//!
//! A [`DynamicArray`] is itself a record: it lives in a pool slot, has its
//! own id and header, and is resolved like any other record. It models a
//! one-to-many edge (an instance's pins, a cell's children) and only ever
//! grows; elements are referenced by value, never by position, so there is
//! no removal.

use std::ops::Index;

use edi_core::{ObjectHeader, ObjectId, Record};

/// An append-only homogeneous sequence stored in a pool.
#[derive(Clone, Debug, Default)]
pub struct DynamicArray<V: Copy + 'static> {
    header: ObjectHeader,
    items: Vec<V>,
}

/// The common case: an array of object ids.
pub type IdArray = DynamicArray<ObjectId>;

impl<V: Copy + 'static> DynamicArray<V> {
    /// Smallest capacity allocated on the first push.
    pub const MIN_CAPACITY: usize = 4;

    /// Ensure room for at least `n` elements in total.
    pub fn reserve(&mut self, n: usize) {
        if n > self.items.capacity() {
            self.items.reserve_exact(n - self.items.len());
        }
    }

    /// Append one element. Amortised O(1): a full array doubles.
    pub fn push_back(&mut self, value: V) {
        if self.items.len() == self.items.capacity() {
            let target = (self.items.capacity() * 2).max(Self::MIN_CAPACITY);
            self.reserve(target);
        }
        self.items.push(value);
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Alias of [`DynamicArray::len`].
    pub fn size(&self) -> usize {
        self.len()
    }

    /// Whether the array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Elements the array can hold before growing.
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Element at `index`, if in bounds.
    pub fn get(&self, index: usize) -> Option<V> {
        self.items.get(index).copied()
    }

    /// Elements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = V> + '_ {
        self.items.iter().copied()
    }

    /// Elements as a slice.
    pub fn as_slice(&self) -> &[V] {
        &self.items
    }
}

impl<V: Copy + 'static> Index<usize> for DynamicArray<V> {
    type Output = V;

    fn index(&self, index: usize) -> &V {
        &self.items[index]
    }
}

impl<V: Copy + Default + 'static> Record for DynamicArray<V> {
    fn header(&self) -> &ObjectHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut ObjectHeader {
        &mut self.header
    }

    fn memory(&self) -> usize {
        std::mem::size_of::<Self>() + self.items.capacity() * std::mem::size_of::<V>()
    }
}
