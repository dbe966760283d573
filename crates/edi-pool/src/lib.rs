//! Paged per-scope memory pools for the EDI design store.
//!
//! Every record lives in exactly one [`MemoryPool`], and every pool
//! belongs to one scope (a top cell, a hierarchical sub-cell, or a
//! library). Records are addressed only by [`ObjectId`](edi_core::ObjectId):
//! the id packs the scope tag, type tag, slot generation and page/slot
//! position, so resolution is a registry lookup plus two vector indexes.
//!
//! # Architecture
//!
//! ```text
//! PoolRegistry (scope tag → pool, owner id → scope tag)
//! └── MemoryPool × N (one per scope)
//!     └── TypedArena × type (one per ObjectType tag, type-erased)
//!         ├── Page[] (fixed capacity, never reallocated)
//!         └── free list (LIFO, generation-bumped on reuse)
//! ```
//!
//! # Address stability
//!
//! Pages are reserved to full capacity when created and never pushed
//! past it. Growth appends a page; existing records never move, so a
//! reference obtained from [`MemoryPool::resolve`] stays valid across
//! later allocations for as long as the borrow checker allows it to be
//! held.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arena;
pub mod array;
pub mod config;
pub mod error;
pub mod handle;
mod page;
pub mod pool;
pub mod registry;

// Public re-exports for the primary API surface.
pub use arena::ArenaStats;
pub use array::{DynamicArray, IdArray};
pub use config::PoolConfig;
pub use error::PoolError;
pub use handle::{object_type_of, ScopeTag};
pub use pool::MemoryPool;
pub use registry::PoolRegistry;
