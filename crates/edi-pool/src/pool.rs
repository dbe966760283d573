//! Per-scope memory pool.
//!
//! A [`MemoryPool`] is the sole owner of storage for one scope. It holds
//! one [`TypedArena`] per record type, created on first allocation of that
//! type, and routes ids to them by the type tag embedded in the id.

use std::any::type_name;

use edi_core::{ObjectHeader, ObjectId, ObjectType, Record};
use indexmap::IndexMap;

use crate::arena::{ArenaStats, ErasedArena, TypedArena};
use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::handle::{ScopeTag, SlotKey};

/// Storage for every record of one scope.
///
/// Each record type tag is bound to exactly one Rust record type per pool,
/// fixed by the first allocation under that tag.
pub struct MemoryPool {
    scope: ScopeTag,
    config: PoolConfig,
    arenas: IndexMap<ObjectType, Box<dyn ErasedArena>>,
}

impl MemoryPool {
    /// Create an empty pool for `scope`.
    pub fn new(scope: ScopeTag, config: PoolConfig) -> Self {
        Self {
            scope,
            config,
            arenas: IndexMap::new(),
        }
    }

    /// The scope tag embedded in every id this pool issues.
    pub fn scope(&self) -> ScopeTag {
        self.scope
    }

    /// The configuration this pool was created with.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Allocate a zero-initialised record of type `T` under `object_type`.
    ///
    /// Returns the freshly minted id together with the stamped record.
    /// The id never equals the id of another record live in this pool.
    pub fn allocate<T: Record>(
        &mut self,
        object_type: ObjectType,
    ) -> Result<(ObjectId, &mut T), PoolError> {
        let scope = self.scope;
        let config = &self.config;
        let arena = self
            .arenas
            .entry(object_type)
            .or_insert_with(|| Box::new(TypedArena::<T>::new(scope, object_type, config)));
        let stored = arena.record_type_name();
        match arena.as_any_mut().downcast_mut::<TypedArena<T>>() {
            Some(typed) => typed.allocate(),
            None => Err(PoolError::TypeMismatch {
                object_type,
                stored,
                requested: type_name::<T>(),
            }),
        }
    }

    /// Return a record's slot to its type's free list.
    ///
    /// Returns `false` (and logs) if `id` is not a live record of this pool;
    /// freeing an already-invalid record is tolerated.
    pub fn free(&mut self, id: ObjectId) -> bool {
        let Some(key) = self.key_of(id) else {
            return false;
        };
        match self.arenas.get_mut(&key.object_type) {
            Some(arena) => arena.free(key),
            None => false,
        }
    }

    /// Whether `id` was issued by this pool (live or not).
    pub fn owns(&self, id: ObjectId) -> bool {
        self.key_of(id).is_some()
    }

    fn key_of(&self, id: ObjectId) -> Option<SlotKey> {
        SlotKey::unpack(id).filter(|k| k.scope == self.scope)
    }

    fn typed<T: Record>(&self, key: SlotKey) -> Option<&TypedArena<T>> {
        let arena = self.arenas.get(&key.object_type)?;
        let typed = arena.as_any().downcast_ref::<TypedArena<T>>();
        assert!(
            typed.is_some(),
            "record type mismatch: {} is stored as {}, resolved as {}",
            key.object_type,
            arena.record_type_name(),
            type_name::<T>(),
        );
        typed
    }

    fn typed_mut<T: Record>(&mut self, key: SlotKey) -> Option<&mut TypedArena<T>> {
        let arena = self.arenas.get_mut(&key.object_type)?;
        let stored = arena.record_type_name();
        let typed = arena.as_any_mut().downcast_mut::<TypedArena<T>>();
        assert!(
            typed.is_some(),
            "record type mismatch: {} is stored as {}, resolved as {}",
            key.object_type,
            stored,
            type_name::<T>(),
        );
        typed
    }

    /// Resolve a live record in O(1).
    ///
    /// Returns `None` for the null id, an id issued by another pool, or a
    /// destroyed record.
    ///
    /// # Panics
    ///
    /// Panics if the id's type tag is stored in this pool as a Rust type
    /// other than `T`.
    pub fn resolve<T: Record>(&self, id: ObjectId) -> Option<&T> {
        let key = self.key_of(id)?;
        self.typed::<T>(key)?.get(key)
    }

    /// Resolve a live record mutably. Same rules as [`MemoryPool::resolve`].
    pub fn resolve_mut<T: Record>(&mut self, id: ObjectId) -> Option<&mut T> {
        let key = self.key_of(id)?;
        self.typed_mut::<T>(key)?.get_mut(key)
    }

    /// Header of a live record, whatever its Rust type.
    pub fn header(&self, id: ObjectId) -> Option<&ObjectHeader> {
        self.inspect_header(id).filter(|h| h.is_valid())
    }

    /// Mutable header of a live record, whatever its Rust type.
    pub fn header_mut(&mut self, id: ObjectId) -> Option<&mut ObjectHeader> {
        let key = self.key_of(id)?;
        self.arenas
            .get_mut(&key.object_type)?
            .header_mut(key)
            .filter(|h| h.is_valid())
    }

    /// Header of the record `id` names, including a destroyed record whose
    /// slot has not been reused yet (its valid flag reads false).
    pub fn inspect_header(&self, id: ObjectId) -> Option<&ObjectHeader> {
        let key = self.key_of(id)?;
        self.arenas.get(&key.object_type)?.header(key)
    }

    /// Whether `id` names a live record of this pool.
    pub fn is_live(&self, id: ObjectId) -> bool {
        self.header(id).is_some()
    }

    /// Iterate over live records stored under `object_type` as `T`.
    ///
    /// Empty if nothing of that type was ever allocated.
    ///
    /// # Panics
    ///
    /// Panics if `object_type` is stored as a Rust type other than `T`.
    pub fn iter<T: Record>(&self, object_type: ObjectType) -> impl Iterator<Item = &T> {
        let typed = self.arenas.get(&object_type).map(|arena| {
            let typed = arena.as_any().downcast_ref::<TypedArena<T>>();
            assert!(
                typed.is_some(),
                "record type mismatch: {} is stored as {}, iterated as {}",
                object_type,
                arena.record_type_name(),
                type_name::<T>(),
            );
            typed.expect("checked above")
        });
        typed.into_iter().flat_map(|a| a.iter())
    }

    /// Ids of every live record in this pool, grouped by type in first-use order.
    pub fn live_ids(&self) -> Vec<ObjectId> {
        self.arenas.values().flat_map(|a| a.live_ids()).collect()
    }

    /// Total live records across all types.
    pub fn live_count(&self) -> usize {
        self.arenas.values().map(|a| a.live()).sum()
    }

    /// Per-type occupancy, in first-use order.
    pub fn stats(&self) -> Vec<ArenaStats> {
        self.arenas.values().map(|a| a.stats()).collect()
    }

    /// Approximate bytes held by this pool.
    pub fn memory_bytes(&self) -> usize {
        self.arenas.values().map(|a| a.stats().bytes).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edi_core::impl_record;

    #[derive(Default)]
    struct Wide {
        header: ObjectHeader,
        payload: [u64; 4],
    }
    impl_record!(Wide);

    fn pool() -> MemoryPool {
        MemoryPool::new(ScopeTag(3), PoolConfig::new(8))
    }

    #[test]
    fn allocate_and_resolve_round_trip() {
        let mut p = pool();
        let (id, rec) = p.allocate::<Wide>(ObjectType::Inst).unwrap();
        rec.payload[2] = 99;
        let back = p.resolve::<Wide>(id).unwrap();
        assert_eq!(back.payload[2], 99);
        assert_eq!(back.header.id(), id);
        assert_eq!(ScopeTag::of(id), Some(ScopeTag(3)));
    }

    #[test]
    fn allocation_is_zero_initialised() {
        let mut p = pool();
        let (id, rec) = p.allocate::<Wide>(ObjectType::Inst).unwrap();
        rec.payload = [7; 4];
        p.free(id);
        let (_, reused) = p.allocate::<Wide>(ObjectType::Inst).unwrap();
        assert_eq!(reused.payload, [0; 4]);
    }

    #[test]
    fn types_are_stored_separately() {
        let mut p = pool();
        let (a, _) = p.allocate::<Wide>(ObjectType::Inst).unwrap();
        let (b, _) = p.allocate::<ObjectHeader>(ObjectType::Net).unwrap();
        assert_ne!(a, b);
        assert!(p.resolve::<Wide>(a).is_some());
        assert!(p.resolve::<ObjectHeader>(b).is_some());
        assert_eq!(p.live_count(), 2);
        assert_eq!(p.stats().len(), 2);
    }

    #[test]
    fn second_rust_type_under_same_tag_rejected() {
        let mut p = pool();
        p.allocate::<Wide>(ObjectType::Inst).unwrap();
        let err = p.allocate::<ObjectHeader>(ObjectType::Inst).err().unwrap();
        assert!(matches!(err, PoolError::TypeMismatch { object_type: ObjectType::Inst, .. }));
    }

    #[test]
    #[should_panic(expected = "record type mismatch")]
    fn resolve_as_wrong_type_panics() {
        let mut p = pool();
        let (id, _) = p.allocate::<Wide>(ObjectType::Inst).unwrap();
        let _ = p.resolve::<ObjectHeader>(id);
    }

    #[test]
    fn null_and_foreign_ids_resolve_to_none() {
        let mut p = pool();
        let mut other = MemoryPool::new(ScopeTag(4), PoolConfig::new(8));
        let (foreign, _) = other.allocate::<Wide>(ObjectType::Inst).unwrap();
        p.allocate::<Wide>(ObjectType::Inst).unwrap();
        assert!(p.resolve::<Wide>(ObjectId::NULL).is_none());
        assert!(p.resolve::<Wide>(foreign).is_none());
        assert!(!p.owns(foreign));
        assert!(!p.free(foreign));
    }

    #[test]
    fn freed_record_stays_inspectable() {
        let mut p = pool();
        let (id, _) = p.allocate::<Wide>(ObjectType::Inst).unwrap();
        assert!(p.free(id));
        assert!(p.resolve::<Wide>(id).is_none());
        assert!(p.header(id).is_none());
        assert!(!p.is_live(id));
        assert_eq!(p.inspect_header(id).map(|h| h.is_valid()), Some(false));
        assert!(p.owns(id));
    }

    #[test]
    fn header_access_without_rust_type() {
        let mut p = pool();
        let (id, _) = p.allocate::<Wide>(ObjectType::Pin).unwrap();
        p.header_mut(id).unwrap().set_marked(true);
        let h = p.header(id).unwrap();
        assert!(h.is_marked());
        assert_eq!(h.object_type(), Some(ObjectType::Pin));
    }

    #[test]
    fn addresses_survive_growth() {
        let mut p = pool();
        let (id, rec) = p.allocate::<Wide>(ObjectType::Inst).unwrap();
        let addr = rec as *const Wide;
        for _ in 0..1000 {
            p.allocate::<Wide>(ObjectType::Inst).unwrap();
        }
        assert!(std::ptr::eq(addr, p.resolve::<Wide>(id).unwrap()));
    }

    #[test]
    fn iter_visits_live_records_of_one_type() {
        let mut p = pool();
        let a = p.allocate::<Wide>(ObjectType::Inst).unwrap().0;
        let b = p.allocate::<Wide>(ObjectType::Inst).unwrap().0;
        p.allocate::<ObjectHeader>(ObjectType::Net).unwrap();
        p.free(a);
        let ids: Vec<_> = p.iter::<Wide>(ObjectType::Inst).map(|w| w.header.id()).collect();
        assert_eq!(ids, vec![b]);
        assert_eq!(p.iter::<Wide>(ObjectType::Pin).count(), 0);
        assert_eq!(p.live_ids().len(), 2);
    }

    #[test]
    fn memory_grows_with_pages() {
        let mut p = pool();
        p.allocate::<Wide>(ObjectType::Inst).unwrap();
        let one_page = p.memory_bytes();
        for _ in 0..8 {
            p.allocate::<Wide>(ObjectType::Inst).unwrap();
        }
        assert!(p.memory_bytes() > one_page);
    }
}
