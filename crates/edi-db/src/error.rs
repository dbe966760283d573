//! Database error types.

use std::error::Error;
use std::fmt;

use edi_core::{ObjectId, ObjectType};
use edi_pool::PoolError;

/// Errors reported by the create/scope-init side of the database.
///
/// Resolution failures are not errors: they surface as `None`.
/// Ownership invariant violations are bugs and panic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DbError {
    /// The owner passed to a create call was the null id.
    InvalidOwner {
        /// The rejected owner.
        owner: ObjectId,
    },
    /// The owner is neither indexed in the hierarchy nor a live record
    /// with a resolvable owner of its own.
    OwnerNotResolved {
        /// The unresolved owner.
        owner: ObjectId,
    },
    /// The owner's chain does not end at a scope with a pool.
    NoPool {
        /// The record type being created.
        object_type: ObjectType,
        /// The requested owner.
        owner: ObjectId,
    },
    /// The pool could not place the record.
    Allocation {
        /// The record type being created.
        object_type: ObjectType,
        /// Underlying pool failure.
        source: PoolError,
    },
    /// No live record has this id.
    NotFound {
        /// The missing id.
        id: ObjectId,
    },
    /// A [`DbConfig`](crate::DbConfig) failed validation.
    InvalidConfig {
        /// Description of the violated constraint.
        reason: String,
    },
    /// A registry-level pool failure.
    Pool(PoolError),
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidOwner { owner } => write!(f, "invalid owner id {owner}"),
            Self::OwnerNotResolved { owner } => {
                write!(f, "owner {owner} has no hierarchy index")
            }
            Self::NoPool { object_type, owner } => {
                write!(f, "no pool for {object_type} owned by {owner}")
            }
            Self::Allocation {
                object_type,
                source,
            } => write!(f, "failed to allocate {object_type}: {source}"),
            Self::NotFound { id } => write!(f, "object {id} not found"),
            Self::InvalidConfig { reason } => write!(f, "invalid database config: {reason}"),
            Self::Pool(e) => write!(f, "pool error: {e}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Allocation { source, .. } => Some(source),
            Self::Pool(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PoolError> for DbError {
    fn from(e: PoolError) -> Self {
        Self::Pool(e)
    }
}
