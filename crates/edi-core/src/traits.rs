//! The storage contract every pool-resident record implements.

use std::any::Any;

use crate::header::ObjectHeader;

/// A fixed-layout record that can live in a memory pool.
///
/// Pools zero-initialise slots through [`Default`] and then stamp the
/// embedded [`ObjectHeader`]. Records refer to each other by
/// [`ObjectId`](crate::ObjectId), never by reference, so they must be
/// `'static`.
pub trait Record: Any + Default {
    /// The embedded header.
    fn header(&self) -> &ObjectHeader;

    /// Mutable access to the embedded header.
    fn header_mut(&mut self) -> &mut ObjectHeader;

    /// Approximate bytes used by this record, including owned heap data.
    fn memory(&self) -> usize {
        std::mem::size_of_val(self)
    }
}

/// Implement [`Record`] for a struct whose header lives in a field named
/// `header`.
///
/// ```
/// use edi_core::{impl_record, ObjectHeader, Record};
///
/// #[derive(Default)]
/// struct Marker {
///     header: ObjectHeader,
///     weight: u32,
/// }
/// impl_record!(Marker);
///
/// let m = Marker::default();
/// assert!(m.header().id().is_null());
/// assert_eq!(m.weight, 0);
/// ```
#[macro_export]
macro_rules! impl_record {
    ($ty:ty) => {
        impl $crate::Record for $ty {
            fn header(&self) -> &$crate::ObjectHeader {
                &self.header
            }

            fn header_mut(&mut self) -> &mut $crate::ObjectHeader {
                &mut self.header
            }
        }
    };
}
