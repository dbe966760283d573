//! Error types shared by every layer of the store.

use std::error::Error;
use std::fmt;

/// A record type name that does not match any [`ObjectType`](crate::ObjectType).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseObjectTypeError {
    /// The rejected input.
    pub input: String,
}

impl fmt::Display for ParseObjectTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown object type name: '{}'", self.input)
    }
}

impl Error for ParseObjectTypeError {}
