//! Core types and traits for the EDI design store.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every layer above it: opaque object
//! handles, compact hierarchy indices, the closed record type tag set,
//! the common record header and the [`Record`] trait that pools store.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod header;
pub mod id;
pub mod object_type;
pub mod traits;

pub use error::ParseObjectTypeError;
pub use header::{ObjectFlags, ObjectHeader, PersistedHeader};
pub use id::{ObjectId, ObjectIndex};
pub use object_type::ObjectType;
pub use traits::Record;
