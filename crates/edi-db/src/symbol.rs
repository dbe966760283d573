//! Per-scope symbol table.
//!
//! Interns names into compact [`SymbolIndex`] values and records which
//! objects refer to each symbol, so a name can be mapped back to its users.

use std::fmt;

use edi_core::ObjectId;
use indexmap::IndexSet;
use smallvec::SmallVec;

/// Compact handle to an interned name within one scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolIndex(pub u32);

impl fmt::Display for SymbolIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Interned names and their referencing objects.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    names: IndexSet<String>,
    references: Vec<SmallVec<[ObjectId; 2]>>,
}

impl SymbolTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `name`, interning it on first use.
    pub fn get_or_create_symbol(&mut self, name: &str) -> SymbolIndex {
        if let Some(index) = self.names.get_index_of(name) {
            return SymbolIndex(index as u32);
        }
        let (index, _) = self.names.insert_full(name.to_string());
        self.references.push(SmallVec::new());
        SymbolIndex(index as u32)
    }

    /// Index of `name`, if interned.
    pub fn symbol_index(&self, name: &str) -> Option<SymbolIndex> {
        self.names.get_index_of(name).map(|i| SymbolIndex(i as u32))
    }

    /// Name behind `index`.
    pub fn symbol(&self, index: SymbolIndex) -> Option<&str> {
        self.names.get_index(index.0 as usize).map(String::as_str)
    }

    /// Record that `id` uses `index`. Returns `false` for an unknown index.
    pub fn add_reference(&mut self, index: SymbolIndex, id: ObjectId) -> bool {
        match self.references.get_mut(index.0 as usize) {
            Some(refs) => {
                if !refs.contains(&id) {
                    refs.push(id);
                }
                true
            }
            None => false,
        }
    }

    /// Objects recorded as using `index`.
    pub fn references(&self, index: SymbolIndex) -> &[ObjectId] {
        self.references
            .get(index.0 as usize)
            .map(|r| r.as_slice())
            .unwrap_or(&[])
    }

    /// Number of interned names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether nothing is interned.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Approximate heap bytes held.
    pub fn memory(&self) -> usize {
        let names: usize = self.names.iter().map(|n| n.capacity()).sum();
        let refs: usize = self
            .references
            .iter()
            .map(|r| r.len() * std::mem::size_of::<ObjectId>())
            .sum();
        names + refs
    }
}
