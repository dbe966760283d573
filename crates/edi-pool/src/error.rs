//! Pool-specific error types.

use std::error::Error;
use std::fmt;

use edi_core::ObjectType;

use crate::handle::ScopeTag;

/// Errors that can occur during pool operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PoolError {
    /// The arena for this record type has no free slot and may not grow.
    CapacityExceeded {
        /// The record type being allocated.
        object_type: ObjectType,
        /// Number of pages already allocated for that type.
        pages: u32,
    },
    /// The record type tag is already stored with a different Rust type.
    TypeMismatch {
        /// The record type tag.
        object_type: ObjectType,
        /// Rust type already stored under that tag.
        stored: &'static str,
        /// Rust type requested by the caller.
        requested: &'static str,
    },
    /// Every scope tag has been handed out.
    ScopeSpaceExhausted,
    /// A scope tag that is not registered.
    UnknownScope {
        /// The unrecognised scope.
        scope: ScopeTag,
    },
    /// A [`PoolConfig`](crate::PoolConfig) failed validation.
    InvalidConfig {
        /// Description of the violated constraint.
        reason: String,
    },
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded { object_type, pages } => {
                write!(
                    f,
                    "pool capacity exceeded for {object_type}: {pages} pages in use"
                )
            }
            Self::TypeMismatch {
                object_type,
                stored,
                requested,
            } => {
                write!(
                    f,
                    "record type mismatch for {object_type}: stored as {stored}, requested {requested}"
                )
            }
            Self::ScopeSpaceExhausted => write!(f, "no scope tags left"),
            Self::UnknownScope { scope } => write!(f, "unknown scope: {scope}"),
            Self::InvalidConfig { reason } => write!(f, "invalid pool config: {reason}"),
        }
    }
}

impl Error for PoolError {}
