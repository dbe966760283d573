//! Benchmark profiles and utilities for the EDI design store.
//!
//! - [`BenchInst`]: a record the size of a typical placed instance
//! - [`populated_design`]: a top cell holding `n` instances
//! - [`scrambled_order`]: deterministic non-sequential visit order

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use edi_core::{impl_record, ObjectHeader, ObjectId, ObjectType};
use edi_db::Database;

/// Instance-sized record used by the benchmarks.
#[derive(Clone, Debug, Default)]
pub struct BenchInst {
    header: ObjectHeader,
    /// Placement origin.
    pub origin: (i32, i32),
    /// Orientation code.
    pub orient: u8,
    /// Pins, once added.
    pub pins: Option<ObjectId>,
}
impl_record!(BenchInst);

/// Build a database with a top cell owning `n` instances.
///
/// Returns the database, the top cell and the instance ids in creation
/// order.
pub fn populated_design(n: usize) -> (Database, ObjectId, Vec<ObjectId>) {
    let mut db = Database::default();
    let top = db.init_top_cell("bench").expect("top cell opens");
    let ids = (0..n)
        .map(|i| {
            let (id, inst) = db
                .create::<BenchInst>(ObjectType::Inst, top)
                .expect("instance allocates");
            inst.origin = (i as i32, -(i as i32));
            id
        })
        .collect();
    (db, top, ids)
}

/// A permutation of `0..len` that jumps across pages.
///
/// Uses a multiplicative step coprime to `len`, so every index appears
/// exactly once.
pub fn scrambled_order(len: usize, seed: u64) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }
    let mut step = (seed.wrapping_mul(6364136223846793005) % len as u64) as usize | 1;
    while gcd(step, len) != 1 {
        step += 2;
    }
    (0..len).map(|i| (i * step) % len).collect()
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}
