//! The database context: hierarchy table, pools and storage scopes.
//!
//! [`Database`] is the one object a design run threads through its code.
//! It owns the [`Root`] hierarchy table, the [`PoolRegistry`] and one
//! [`StorageScope`] per scope owner, and implements the create / resolve /
//! destroy contract on top of them.
//!
//! # Ownership
//!
//! Every record's header carries the hierarchy index of its owner. Owners
//! are either scope owners (top cell, hierarchical sub-cells, libraries),
//! which are always indexed, or ordinary records that were indexed with
//! [`Database::index_object`]. Resolving the scope of a record follows the
//! owner chain until it reaches a scope owner, bounded by
//! [`DbConfig::max_owner_depth`].

use edi_core::{ObjectHeader, ObjectId, ObjectIndex, ObjectType, PersistedHeader, Record};
use edi_pool::{object_type_of, ArenaStats, IdArray, PoolError, PoolRegistry, ScopeTag};
use indexmap::IndexMap;
use tracing::{debug, error, warn};

use crate::config::DbConfig;
use crate::error::DbError;
use crate::record::{Cell, CellType, ScopeOwner, Tech, Timing};
use crate::root::Root;
use crate::storage::StorageScope;
use crate::symbol::SymbolIndex;

/// Memory figures for one storage scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScopeMemory {
    /// Scope owner.
    pub owner: ObjectId,
    /// Pool tag.
    pub scope: ScopeTag,
    /// Hierarchy index of the owner.
    pub index: ObjectIndex,
    /// Live records in the pool.
    pub records: usize,
    /// Approximate bytes held by the pool.
    pub pool_bytes: usize,
    /// Approximate bytes held by the symbol, polygon and property tables.
    pub table_bytes: usize,
    /// Per-type breakdown of the pool.
    pub arenas: Vec<ArenaStats>,
}

/// A design database.
pub struct Database {
    config: DbConfig,
    root: Root,
    pools: PoolRegistry,
    scopes: IndexMap<ObjectId, StorageScope>,
}

impl Database {
    /// Initial capacity of an id array created lazily by [`Database::append_id`].
    pub const DEFAULT_ARRAY_CAPACITY: usize = 4;

    /// Create an empty database.
    pub fn new(config: DbConfig) -> Result<Self, DbError> {
        config.validate()?;
        let pools = PoolRegistry::new(config.pool.clone())?;
        Ok(Self {
            config,
            root: Root::new(),
            pools,
            scopes: IndexMap::new(),
        })
    }

    /// The configuration this database was created with.
    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    /// The hierarchy table.
    pub fn root(&self) -> &Root {
        &self.root
    }

    /// The pool registry.
    pub fn pools(&self) -> &PoolRegistry {
        &self.pools
    }

    // ── Scope initialisation ────────────────────────────────────

    /// Open a fresh top cell named `name`, destroying any previous one.
    pub fn init_top_cell(&mut self, name: &str) -> Result<ObjectId, DbError> {
        if let Some(old) = self.root.top_cell() {
            self.destroy_scope(old);
        }
        let id = self.open_scope::<Cell>(ObjectType::Cell)?;
        self.cell_mut(id)?.set_cell_type(CellType::Top);
        self.set_cell_name(id, name)?;
        self.root.set_top_cell(Some(id));
        Ok(id)
    }

    /// Open a fresh technology library, destroying any previous one.
    pub fn init_tech_lib(&mut self) -> Result<ObjectId, DbError> {
        if let Some(old) = self.root.tech_lib() {
            self.destroy_scope(old);
        }
        let id = self.open_scope::<Tech>(ObjectType::Tech)?;
        self.root.set_tech_lib(Some(id));
        Ok(id)
    }

    /// Open a fresh timing library, destroying any previous one.
    pub fn init_timing_lib(&mut self) -> Result<ObjectId, DbError> {
        if let Some(old) = self.root.timing_lib() {
            self.destroy_scope(old);
        }
        let id = self.open_scope::<Timing>(ObjectType::Timing)?;
        self.root.set_timing_lib(Some(id));
        Ok(id)
    }

    /// Open a top-level scope whose owner record lives in its own pool.
    ///
    /// Steps, in order: obtain a pool, build the bundle, index the owner
    /// in the hierarchy table, record the index on the owner.
    fn open_scope<T: ScopeOwner>(
        &mut self,
        object_type: ObjectType,
    ) -> Result<ObjectId, DbError> {
        let scope = self
            .pools
            .create_pool()
            .map_err(|source| allocation_failed(object_type, ObjectId::NULL, source))?;
        let allocated = self
            .pools
            .pool_mut(scope)
            .expect("pool was just created")
            .allocate::<T>(object_type)
            .map(|(id, _)| id);
        let id = match allocated {
            Ok(id) => id,
            Err(source) => {
                let _ = self.pools.remove_pool(scope);
                return Err(allocation_failed(object_type, ObjectId::NULL, source));
            }
        };

        let bundle = StorageScope::new(id, scope, None);
        let index = self.register_scope(id, scope, bundle);
        let owner = self
            .pools
            .pool_mut(scope)
            .and_then(|p| p.resolve_mut::<T>(id))
            .expect("scope owner was just allocated");
        owner.header_mut().set_owner_index(index);
        owner.set_hier_index(index);
        debug!(%id, %object_type, %scope, %index, "scope opened");
        Ok(id)
    }

    fn register_scope(
        &mut self,
        owner: ObjectId,
        scope: ScopeTag,
        mut bundle: StorageScope,
    ) -> ObjectIndex {
        let index = self.root.insert(owner);
        bundle.set_index(index);
        self.pools.register_pool(owner, scope);
        self.scopes.insert(owner, bundle);
        index
    }

    // ── Cells ───────────────────────────────────────────────────

    /// Create a hierarchical sub-cell of `parent` with a scope of its own.
    ///
    /// The cell record lives in the parent's pool; records created with
    /// the new cell as owner go to the new scope's pool.
    pub fn create_hier_cell(
        &mut self,
        parent: ObjectId,
        name: &str,
    ) -> Result<ObjectId, DbError> {
        let parent_scope = self.scope_root(parent).ok_or(DbError::NoPool {
            object_type: ObjectType::Cell,
            owner: parent,
        })?;
        let id = {
            let (id, cell) = self.create::<Cell>(ObjectType::Cell, parent)?;
            cell.set_cell_type(CellType::Hier);
            id
        };
        let scope = match self.pools.create_pool() {
            Ok(scope) => scope,
            Err(source) => {
                self.destroy(id);
                return Err(allocation_failed(ObjectType::Cell, parent, source));
            }
        };

        let bundle = StorageScope::new(id, scope, Some(parent_scope));
        let index = self.register_scope(id, scope, bundle);
        if let Some(p) = self.scopes.get_mut(&parent_scope) {
            p.add_child(id);
        }
        self.cell_mut(id)?.set_hier_index(index);
        self.set_cell_name(id, name)?;
        self.attach_cell(parent, id)?;
        debug!(%id, %parent, %scope, %index, "hierarchical cell opened");
        Ok(id)
    }

    /// Create a leaf cell in `parent`'s scope.
    pub fn create_cell(&mut self, parent: ObjectId, name: &str) -> Result<ObjectId, DbError> {
        let (id, _) = self.create::<Cell>(ObjectType::Cell, parent)?;
        self.set_cell_name(id, name)?;
        self.attach_cell(parent, id)?;
        Ok(id)
    }

    fn cell_mut(&mut self, id: ObjectId) -> Result<&mut Cell, DbError> {
        self.resolve_mut::<Cell>(id).ok_or(DbError::NotFound { id })
    }

    /// Add `child` to `parent`'s child cell array if `parent` is a cell.
    fn attach_cell(&mut self, parent: ObjectId, child: ObjectId) -> Result<(), DbError> {
        if object_type_of(parent) != Some(ObjectType::Cell) {
            return Ok(());
        }
        let existing = self
            .resolve::<Cell>(parent)
            .ok_or(DbError::NotFound { id: parent })?
            .cells();
        let array = self.append_id(existing, parent, child)?;
        self.cell_mut(parent)?.set_cells(array);
        Ok(())
    }

    /// Name `cell` through the symbol table of its scope.
    pub fn set_cell_name(
        &mut self,
        cell: ObjectId,
        name: &str,
    ) -> Result<SymbolIndex, DbError> {
        let scope = self
            .storage_scope_mut(cell)
            .ok_or(DbError::NotFound { id: cell })?;
        let symbol = scope.symbols.get_or_create_symbol(name);
        scope.symbols.add_reference(symbol, cell);
        self.cell_mut(cell)?.set_name(symbol);
        Ok(symbol)
    }

    /// Name of `cell`.
    pub fn cell_name(&self, cell: ObjectId) -> Option<&str> {
        let symbol = self.resolve::<Cell>(cell)?.name()?;
        self.storage_scope(cell)?.symbols.symbol(symbol)
    }

    /// Child cells of `cell` in creation order.
    pub fn child_cells(&self, cell: ObjectId) -> &[ObjectId] {
        self.resolve::<Cell>(cell)
            .and_then(Cell::cells)
            .and_then(|array| self.resolve::<IdArray>(array))
            .map(IdArray::as_slice)
            .unwrap_or(&[])
    }

    // ── Create / resolve / destroy ──────────────────────────────

    /// Create a zero-initialised record of type `T` owned by `owner`.
    ///
    /// The record is placed in the pool of `owner`'s scope and its header
    /// carries `owner`'s hierarchy index (or, when `owner` is not indexed,
    /// the index `owner` itself carries).
    pub fn create<T: Record>(
        &mut self,
        object_type: ObjectType,
        owner: ObjectId,
    ) -> Result<(ObjectId, &mut T), DbError> {
        if owner.is_null() {
            error!(%object_type, "create with null owner");
            return Err(DbError::InvalidOwner { owner });
        }
        let Some(owner_index) = self.owner_index_for(owner) else {
            error!(%object_type, %owner, "create with unresolvable owner");
            return Err(DbError::OwnerNotResolved { owner });
        };
        let Some(pool) = self
            .scope_root(owner)
            .and_then(|root| self.pools.scope_of_owner(root))
            .and_then(|scope| self.pools.pool_mut(scope))
        else {
            error!(%object_type, %owner, "create with no pool for owner");
            return Err(DbError::NoPool { object_type, owner });
        };
        match pool.allocate::<T>(object_type) {
            Ok((id, record)) => {
                record.header_mut().set_owner_index(owner_index);
                Ok((id, record))
            }
            Err(source) => Err(allocation_failed(object_type, owner, source)),
        }
    }

    /// Resolve a live record in O(1). `None` for the null id, an id whose
    /// pool is gone, or a destroyed record.
    ///
    /// # Panics
    ///
    /// Panics if the id's type tag is stored as a Rust type other than `T`.
    pub fn resolve<T: Record>(&self, id: ObjectId) -> Option<&T> {
        self.pools.lookup(id)?.resolve(id)
    }

    /// Resolve a live record mutably.
    pub fn resolve_mut<T: Record>(&mut self, id: ObjectId) -> Option<&mut T> {
        self.pools.lookup_mut(id)?.resolve_mut(id)
    }

    /// Header of a live record of any type.
    pub fn header(&self, id: ObjectId) -> Option<&ObjectHeader> {
        self.pools.lookup(id)?.header(id)
    }

    /// Mutable header of a live record of any type.
    pub fn header_mut(&mut self, id: ObjectId) -> Option<&mut ObjectHeader> {
        self.pools.lookup_mut(id)?.header_mut(id)
    }

    /// Header of `id` even if destroyed, as long as its pool and slot
    /// still hold it.
    pub fn inspect_header(&self, id: ObjectId) -> Option<&ObjectHeader> {
        self.pools.lookup(id)?.inspect_header(id)
    }

    /// Whether `id` names a live record.
    pub fn is_live(&self, id: ObjectId) -> bool {
        self.header(id).is_some()
    }

    /// Destroy a record: clear its valid flag and return its slot.
    ///
    /// Destroying a scope owner tears down its whole scope (see
    /// [`Database::destroy_scope`]). Returns `false` (and logs) if `id`
    /// is not live.
    pub fn destroy(&mut self, id: ObjectId) -> bool {
        if self.pools.is_scope_owner(id) {
            return self.destroy_scope(id);
        }
        if let Some(scope) = self.home_scope_mut(id) {
            scope.properties.remove_all(id);
        }
        self.root.delete(id);
        match self.pools.lookup_mut(id) {
            Some(pool) => pool.free(id),
            None => {
                warn!(%id, "destroy of id with no pool ignored");
                false
            }
        }
    }

    // ── Ownership ───────────────────────────────────────────────

    /// Index a live record in the hierarchy table so other records can
    /// name it as their owner. Returns the existing index if it already
    /// has one, and `None` for a dead id.
    pub fn index_object(&mut self, id: ObjectId) -> Option<ObjectIndex> {
        if !self.is_live(id) {
            warn!(%id, "index of dead object ignored");
            return None;
        }
        Some(self.root.index_of(id).unwrap_or_else(|| self.root.insert(id)))
    }

    /// Hierarchy index a record owned by `owner` should carry.
    fn owner_index_for(&self, owner: ObjectId) -> Option<ObjectIndex> {
        self.root.index_of(owner).or_else(|| {
            self.header(owner)
                .map(ObjectHeader::owner_index)
                .filter(|i| !i.is_invalid())
        })
    }

    /// The id of `id`'s owner. `None` if `id` is not live or its owner's
    /// hierarchy slot has been tombstoned.
    pub fn owner_id(&self, id: ObjectId) -> Option<ObjectId> {
        self.root.id_at(self.header(id)?.owner_index())
    }

    /// Re-parent `id` under `owner`.
    ///
    /// When `owner` is not itself indexed, `id` takes `owner`'s own owner
    /// index. Returns `false` if `id` is not live.
    ///
    /// # Panics
    ///
    /// Panics if `owner` is null or has no hierarchy index to give.
    pub fn set_owner(&mut self, id: ObjectId, owner: ObjectId) -> bool {
        assert!(!owner.is_null(), "cannot set null owner on object {id}");
        let index = self
            .owner_index_for(owner)
            .unwrap_or_else(|| panic!("owner {owner} of object {id} has no hierarchy index"));
        match self.header_mut(id) {
            Some(header) => {
                header.set_owner_index(index);
                true
            }
            None => {
                warn!(%id, %owner, "set_owner on dead object ignored");
                false
            }
        }
    }

    /// The scope owner `id` belongs to: `id` itself if it owns a scope,
    /// otherwise the first scope owner along its owner chain.
    ///
    /// # Panics
    ///
    /// Panics if the chain is longer than
    /// [`DbConfig::max_owner_depth`], which means it contains a cycle.
    pub fn scope_root(&self, id: ObjectId) -> Option<ObjectId> {
        let mut current = id;
        for _ in 0..=self.config.max_owner_depth {
            if self.pools.is_scope_owner(current) {
                return Some(current);
            }
            current = self.owner_id(current)?;
        }
        panic!(
            "owner chain of object {id} exceeds {} links",
            self.config.max_owner_depth
        );
    }

    /// Storage scope `id` belongs to.
    pub fn storage_scope(&self, id: ObjectId) -> Option<&StorageScope> {
        self.scopes.get(&self.scope_root(id)?)
    }

    /// Mutable storage scope `id` belongs to.
    pub fn storage_scope_mut(&mut self, id: ObjectId) -> Option<&mut StorageScope> {
        let root = self.scope_root(id)?;
        self.scopes.get_mut(&root)
    }

    /// The storage scope whose pool issued `id`.
    ///
    /// A record never leaves the pool it was allocated in, so its
    /// properties live here even after [`Database::set_owner`] points it
    /// at another scope.
    pub fn home_scope(&self, id: ObjectId) -> Option<&StorageScope> {
        let tag = ScopeTag::of(id)?;
        self.scopes.values().find(|s| s.scope() == tag)
    }

    /// Mutable storage scope whose pool issued `id`.
    pub fn home_scope_mut(&mut self, id: ObjectId) -> Option<&mut StorageScope> {
        let tag = ScopeTag::of(id)?;
        self.scopes.values_mut().find(|s| s.scope() == tag)
    }

    /// Every open storage scope in creation order.
    pub fn scopes(&self) -> impl Iterator<Item = &StorageScope> {
        self.scopes.values()
    }

    // ── Id arrays ───────────────────────────────────────────────

    /// Create an empty id array in `owner`'s scope with room for
    /// `capacity` ids.
    pub fn create_id_array(
        &mut self,
        owner: ObjectId,
        capacity: usize,
    ) -> Result<ObjectId, DbError> {
        let (id, array) = self.create::<IdArray>(ObjectType::Array, owner)?;
        array.reserve(capacity);
        Ok(id)
    }

    /// Destroy an id array. Returns `false` for anything that is not a
    /// live id array.
    pub fn destroy_id_array(&mut self, id: ObjectId) -> bool {
        if object_type_of(id) != Some(ObjectType::Array) {
            warn!(%id, "destroy_id_array on non-array id ignored");
            return false;
        }
        self.destroy(id)
    }

    /// Append `value` to the id array `array`, creating the array in
    /// `owner`'s scope first when `array` is `None`.
    ///
    /// Returns the array's id, which the caller stores back into the
    /// field it passed in.
    pub fn append_id(
        &mut self,
        array: Option<ObjectId>,
        owner: ObjectId,
        value: ObjectId,
    ) -> Result<ObjectId, DbError> {
        let id = match array {
            Some(id) => id,
            None => self.create_id_array(owner, Self::DEFAULT_ARRAY_CAPACITY)?,
        };
        self.resolve_mut::<IdArray>(id)
            .ok_or(DbError::NotFound { id })?
            .push_back(value);
        Ok(id)
    }

    /// The id array `id`.
    pub fn id_array(&self, id: ObjectId) -> Option<&IdArray> {
        self.resolve(id)
    }

    // ── Teardown ────────────────────────────────────────────────

    /// Destroy the scope owned by `owner`, every sub-scope nested in it,
    /// and every record their pools hold.
    ///
    /// The owner's hierarchy slot is tombstoned, as is the slot of every
    /// record indexed with [`Database::index_object`] out of a removed
    /// pool. For a hierarchical sub-cell the cell record itself, which
    /// lives in the parent's pool, is destroyed too. Its id stays in the
    /// parent's [`Database::child_cells`] array, which is append-only, so
    /// callers walking children filter them with [`Database::is_live`].
    ///
    /// Returns `false` if `owner` owns no scope.
    pub fn destroy_scope(&mut self, owner: ObjectId) -> bool {
        let Some(bundle) = self.scopes.get(&owner) else {
            warn!(%owner, "destroy_scope on non-scope object ignored");
            return false;
        };
        let parent = bundle.parent();

        let mut doomed = vec![owner];
        let mut next = 0;
        while next < doomed.len() {
            if let Some(b) = self.scopes.get(&doomed[next]) {
                doomed.extend_from_slice(b.children());
            }
            next += 1;
        }

        for scope_owner in doomed.into_iter().rev() {
            let Some(bundle) = self.scopes.shift_remove(&scope_owner) else {
                continue;
            };
            let tag = bundle.scope();
            let indexed: Vec<ObjectId> = self
                .root
                .entries()
                .map(|(_, id)| id)
                .filter(|&id| ScopeTag::of(id) == Some(tag))
                .collect();
            for id in indexed {
                self.root.delete(id);
            }
            let live = self.pools.remove_pool(tag).unwrap_or(0);
            self.root.delete(scope_owner);
            self.root.clear_active(scope_owner);
            debug!(owner = %scope_owner, scope = %tag, live, "scope destroyed");
        }

        if let Some(parent) = parent {
            if let Some(p) = self.scopes.get_mut(&parent) {
                p.remove_child(owner);
            }
            if let Some(home) = self.home_scope_mut(owner) {
                home.properties.remove_all(owner);
            }
            if let Some(pool) = self.pools.lookup_mut(owner) {
                pool.free(owner);
            }
        }
        true
    }

    /// Drop every scope and record, returning the hierarchy table to its
    /// sentinel slot.
    pub fn reset(&mut self) {
        let scopes = self.scopes.len();
        self.scopes.clear();
        self.pools.clear();
        self.root.reset();
        debug!(scopes, "database reset");
    }

    // ── Persistence support ─────────────────────────────────────

    /// Externalized header of a live record.
    pub fn externalize(&self, id: ObjectId) -> Option<PersistedHeader> {
        self.header(id).map(ObjectHeader::externalize)
    }

    /// Repopulate the hierarchy table from exported `(index, id)` pairs.
    pub fn restore_hierarchy<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (ObjectIndex, ObjectId)>,
    {
        for (index, id) in entries {
            self.root.set_hier_owner_id(index, id);
        }
    }

    // ── Accounting ──────────────────────────────────────────────

    /// Memory figures per open scope, in creation order.
    pub fn memory_report(&self) -> Vec<ScopeMemory> {
        self.scopes
            .values()
            .filter_map(|bundle| {
                let pool = self.pools.pool(bundle.scope())?;
                Some(ScopeMemory {
                    owner: bundle.owner(),
                    scope: bundle.scope(),
                    index: bundle.index(),
                    records: pool.live_count(),
                    pool_bytes: pool.memory_bytes(),
                    table_bytes: bundle.memory(),
                    arenas: pool.stats(),
                })
            })
            .collect()
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new(DbConfig::default()).expect("default config is valid")
    }
}

fn allocation_failed(object_type: ObjectType, owner: ObjectId, source: PoolError) -> DbError {
    error!(%object_type, %owner, error = %source, "allocation failed");
    DbError::Allocation {
        object_type,
        source,
    }
}
