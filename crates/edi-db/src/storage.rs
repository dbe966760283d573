//! The storage-scope bundle.
//!
//! A [`StorageScope`] groups everything private to one scope owner: the
//! tag of its pool plus its symbol table, polygon table and property
//! manager. The pool itself lives in the database's
//! [`PoolRegistry`](edi_pool::PoolRegistry) under the same tag.

use edi_core::{ObjectId, ObjectIndex};
use edi_pool::ScopeTag;
use smallvec::SmallVec;

use crate::geometry::PolygonTable;
use crate::property::PropertyManager;
use crate::symbol::SymbolTable;

/// Per-scope collaborators of one scope owner.
#[derive(Debug)]
pub struct StorageScope {
    owner: ObjectId,
    scope: ScopeTag,
    index: ObjectIndex,
    parent: Option<ObjectId>,
    children: SmallVec<[ObjectId; 4]>,
    /// Names used within the scope.
    pub symbols: SymbolTable,
    /// Shapes used within the scope.
    pub polygons: PolygonTable,
    /// Sparse per-object properties.
    pub properties: PropertyManager,
}

impl StorageScope {
    pub(crate) fn new(owner: ObjectId, scope: ScopeTag, parent: Option<ObjectId>) -> Self {
        Self {
            owner,
            scope,
            index: ObjectIndex::INVALID,
            parent,
            children: SmallVec::new(),
            symbols: SymbolTable::new(),
            polygons: PolygonTable::new(),
            properties: PropertyManager::new(),
        }
    }

    /// The record that owns this scope.
    pub fn owner(&self) -> ObjectId {
        self.owner
    }

    /// Tag of the pool holding this scope's records.
    pub fn scope(&self) -> ScopeTag {
        self.scope
    }

    /// Hierarchy index of the owner.
    pub fn index(&self) -> ObjectIndex {
        self.index
    }

    pub(crate) fn set_index(&mut self, index: ObjectIndex) {
        self.index = index;
    }

    /// Owner of the enclosing scope, for a hierarchical sub-scope.
    pub fn parent(&self) -> Option<ObjectId> {
        self.parent
    }

    /// Owners of sub-scopes created directly under this one.
    pub fn children(&self) -> &[ObjectId] {
        &self.children
    }

    pub(crate) fn add_child(&mut self, owner: ObjectId) {
        self.children.push(owner);
    }

    pub(crate) fn remove_child(&mut self, owner: ObjectId) {
        self.children.retain(|c| *c != owner);
    }

    /// Approximate heap bytes held by the collaborators.
    pub fn memory(&self) -> usize {
        self.symbols.memory() + self.polygons.memory() + self.properties.memory()
    }
}
