//! Ownership hierarchy and storage scopes for the EDI design store.
//!
//! Builds the create / resolve / destroy contract on top of
//! [`edi_pool`]. A [`Database`] is the explicit context a design run
//! threads through its code; there is no global state.
//!
//! # Architecture
//!
//! ```text
//! Database
//! ├── Root (ObjectIndex ↔ ObjectId for scope owners, slot 0 sentinel)
//! ├── PoolRegistry (one MemoryPool per scope)
//! └── StorageScope × N (keyed by owner id)
//!     ├── SymbolTable
//!     ├── PolygonTable
//!     └── PropertyManager
//! ```
//!
//! Scopes are opened by [`Database::init_top_cell`],
//! [`Database::init_tech_lib`], [`Database::init_timing_lib`] and
//! [`Database::create_hier_cell`], and torn down, with every record in
//! them, by [`Database::destroy_scope`] or [`Database::reset`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod database;
pub mod error;
pub mod geometry;
pub mod property;
pub mod record;
pub mod root;
pub mod storage;
pub mod symbol;

// Public re-exports for the primary API surface.
pub use config::DbConfig;
pub use database::{Database, ScopeMemory};
pub use error::DbError;
pub use geometry::{Point, PolygonIndex, PolygonTable};
pub use property::{PropertyManager, PropertyValue};
pub use record::{Cell, CellType, ScopeOwner, Tech, Timing};
pub use root::Root;
pub use storage::StorageScope;
pub use symbol::{SymbolIndex, SymbolTable};
