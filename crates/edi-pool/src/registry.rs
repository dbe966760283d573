//! Registry of memory pools, keyed by scope tag and by scope owner.
//!
//! Every id embeds the tag of the pool that issued it, so any id can be
//! routed to its pool without knowing its owner. The owner map answers the
//! other question the store asks: "which pool belongs to this cell or
//! library?".

use std::collections::HashMap;

use edi_core::ObjectId;
use indexmap::IndexMap;
use tracing::debug;

use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::handle::ScopeTag;
use crate::pool::MemoryPool;

/// All live pools of one database.
pub struct PoolRegistry {
    config: PoolConfig,
    next_scope: u16,
    pools: IndexMap<ScopeTag, MemoryPool>,
    owners: HashMap<ObjectId, ScopeTag>,
}

impl PoolRegistry {
    /// Create an empty registry whose pools use `config`.
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;
        Ok(Self {
            config,
            next_scope: 1,
            pools: IndexMap::new(),
            owners: HashMap::new(),
        })
    }

    /// The configuration new pools are created with.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Create a fresh, empty pool under a never-before-used scope tag.
    pub fn create_pool(&mut self) -> Result<ScopeTag, PoolError> {
        if self.next_scope == 0 {
            return Err(PoolError::ScopeSpaceExhausted);
        }
        let scope = ScopeTag(self.next_scope);
        // Wraps to 0 after the last tag, which marks the space as used up.
        self.next_scope = self.next_scope.wrapping_add(1);
        self.pools
            .insert(scope, MemoryPool::new(scope, self.config.clone()));
        debug!(%scope, "pool created");
        Ok(scope)
    }

    /// Bind `owner` to the pool `scope`, replacing any previous binding of
    /// that owner. Returns `false` if `scope` is not registered.
    pub fn register_pool(&mut self, owner: ObjectId, scope: ScopeTag) -> bool {
        if !self.pools.contains_key(&scope) || owner.is_null() {
            return false;
        }
        self.owners.insert(owner, scope);
        true
    }

    /// The pool that issued `id`.
    pub fn lookup(&self, id: ObjectId) -> Option<&MemoryPool> {
        self.pools.get(&ScopeTag::of(id)?)
    }

    /// Mutable access to the pool that issued `id`.
    pub fn lookup_mut(&mut self, id: ObjectId) -> Option<&mut MemoryPool> {
        self.pools.get_mut(&ScopeTag::of(id)?)
    }

    /// The pool registered under `scope`.
    pub fn pool(&self, scope: ScopeTag) -> Option<&MemoryPool> {
        self.pools.get(&scope)
    }

    /// Mutable access to the pool registered under `scope`.
    pub fn pool_mut(&mut self, scope: ScopeTag) -> Option<&mut MemoryPool> {
        self.pools.get_mut(&scope)
    }

    /// Scope bound to `owner`, if `owner` is a scope root.
    pub fn scope_of_owner(&self, owner: ObjectId) -> Option<ScopeTag> {
        self.owners.get(&owner).copied()
    }

    /// The pool bound to `owner`.
    pub fn pool_for_owner(&self, owner: ObjectId) -> Option<&MemoryPool> {
        self.pool(self.scope_of_owner(owner)?)
    }

    /// Mutable access to the pool bound to `owner`.
    pub fn pool_for_owner_mut(&mut self, owner: ObjectId) -> Option<&mut MemoryPool> {
        let scope = self.scope_of_owner(owner)?;
        self.pool_mut(scope)
    }

    /// Whether `owner` has a pool bound to it.
    pub fn is_scope_owner(&self, owner: ObjectId) -> bool {
        self.owners.contains_key(&owner)
    }

    /// Drop a pool and every record in it, along with any owner bound to it.
    ///
    /// Ids issued by the pool stop resolving immediately. Returns the
    /// number of records that were still live.
    pub fn remove_pool(&mut self, scope: ScopeTag) -> Result<usize, PoolError> {
        let pool = self
            .pools
            .shift_remove(&scope)
            .ok_or(PoolError::UnknownScope { scope })?;
        self.owners.retain(|_, s| *s != scope);
        let live = pool.live_count();
        debug!(%scope, live, "pool removed");
        Ok(live)
    }

    /// Drop every pool. Scope tags already handed out stay retired.
    pub fn clear(&mut self) {
        self.pools.clear();
        self.owners.clear();
    }

    /// Number of registered pools.
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Iterate over pools in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &MemoryPool> {
        self.pools.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edi_core::{ObjectHeader, ObjectType};

    fn registry() -> PoolRegistry {
        PoolRegistry::new(PoolConfig::new(16)).unwrap()
    }

    #[test]
    fn invalid_config_rejected() {
        assert!(PoolRegistry::new(PoolConfig::new(3)).is_err());
    }

    #[test]
    fn scopes_start_at_one_and_increase() {
        let mut r = registry();
        assert_eq!(r.create_pool().unwrap(), ScopeTag(1));
        assert_eq!(r.create_pool().unwrap(), ScopeTag(2));
        assert_eq!(r.pool_count(), 2);
    }

    #[test]
    fn ids_route_to_issuing_pool() {
        let mut r = registry();
        let a = r.create_pool().unwrap();
        let b = r.create_pool().unwrap();
        let (id, _) = r
            .pool_mut(b)
            .unwrap()
            .allocate::<ObjectHeader>(ObjectType::Net)
            .unwrap();
        assert_eq!(r.lookup(id).map(MemoryPool::scope), Some(b));
        assert!(r.pool(a).unwrap().resolve::<ObjectHeader>(id).is_none());
        assert!(r.lookup(ObjectId::NULL).is_none());
    }

    #[test]
    fn owner_binding() {
        let mut r = registry();
        let scope = r.create_pool().unwrap();
        let (owner, _) = r
            .pool_mut(scope)
            .unwrap()
            .allocate::<ObjectHeader>(ObjectType::Cell)
            .unwrap();
        assert!(r.register_pool(owner, scope));
        assert!(r.is_scope_owner(owner));
        assert_eq!(r.scope_of_owner(owner), Some(scope));
        assert!(r.pool_for_owner(owner).is_some());
        assert!(!r.register_pool(owner, ScopeTag(99)));
        assert!(!r.register_pool(ObjectId::NULL, scope));
    }

    #[test]
    fn removed_pool_invalidates_its_ids() {
        let mut r = registry();
        let scope = r.create_pool().unwrap();
        let pool = r.pool_mut(scope).unwrap();
        let (owner, _) = pool.allocate::<ObjectHeader>(ObjectType::Cell).unwrap();
        let (inst, _) = pool.allocate::<ObjectHeader>(ObjectType::Inst).unwrap();
        r.register_pool(owner, scope);

        assert_eq!(r.remove_pool(scope), Ok(2));
        assert!(r.lookup(inst).is_none());
        assert!(!r.is_scope_owner(owner));
        assert_eq!(
            r.remove_pool(scope),
            Err(PoolError::UnknownScope { scope })
        );
    }

    #[test]
    fn scope_tags_not_reused_after_clear() {
        let mut r = registry();
        r.create_pool().unwrap();
        r.create_pool().unwrap();
        r.clear();
        assert_eq!(r.pool_count(), 0);
        assert_eq!(r.create_pool().unwrap(), ScopeTag(3));
    }

    #[test]
    fn scope_space_exhaustion() {
        let mut r = registry();
        r.next_scope = u16::MAX;
        assert_eq!(r.create_pool().unwrap(), ScopeTag(u16::MAX));
        assert_eq!(r.create_pool(), Err(PoolError::ScopeSpaceExhausted));
    }
}
