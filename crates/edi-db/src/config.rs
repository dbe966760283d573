//! Database configuration.

use edi_pool::PoolConfig;

use crate::error::DbError;

/// Configuration for a [`Database`](crate::Database).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DbConfig {
    /// Page layout shared by every pool the database creates.
    pub pool: PoolConfig,

    /// Longest owner chain followed when resolving an object's scope.
    ///
    /// Default: 64. Real hierarchies are a handful of links deep; hitting
    /// the bound means the ownership data contains a cycle.
    pub max_owner_depth: usize,
}

impl DbConfig {
    /// Default bound on owner chain length.
    pub const DEFAULT_MAX_OWNER_DEPTH: usize = 64;

    /// Create a config with the given pool layout and the default depth bound.
    pub fn new(pool: PoolConfig) -> Self {
        Self {
            pool,
            max_owner_depth: Self::DEFAULT_MAX_OWNER_DEPTH,
        }
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), DbError> {
        self.pool.validate()?;
        if self.max_owner_depth == 0 {
            return Err(DbError::InvalidConfig {
                reason: "max_owner_depth must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}
