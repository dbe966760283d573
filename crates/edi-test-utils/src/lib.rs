//! Test utilities and mock records for EDI design store development.
//!
//! Provides small domain records ([`MockInst`], [`MockNet`], [`MockPin`],
//! [`MockLayer`], [`MockTimingCell`]) that stand in for the real design objects built above the store, and
//! fixtures for common database shapes.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use edi_core::{impl_record, ObjectHeader, ObjectId};
use edi_db::PolygonIndex;

/// Stand-in for a placed instance. Pins are kept in a lazily created
/// id array.
#[derive(Clone, Debug, Default)]
pub struct MockInst {
    header: ObjectHeader,
    pub x: i32,
    pub y: i32,
    pub pins: Option<ObjectId>,
}
impl_record!(MockInst);

/// Stand-in for a net. Connected pins are kept in a lazily created id array.
#[derive(Clone, Debug, Default)]
pub struct MockNet {
    header: ObjectHeader,
    pub pins: Option<ObjectId>,
}
impl_record!(MockNet);

/// Stand-in for an instance pin.
#[derive(Clone, Debug, Default)]
pub struct MockPin {
    header: ObjectHeader,
    pub inst: Option<ObjectId>,
    pub net: Option<ObjectId>,
}
impl_record!(MockPin);

/// Stand-in for a technology layer with one outline in the library's
/// polygon table.
#[derive(Clone, Debug, Default)]
pub struct MockLayer {
    header: ObjectHeader,
    pub shape: Option<PolygonIndex>,
}
impl_record!(MockLayer);

/// Stand-in for a timing-library cell.
#[derive(Clone, Debug, Default)]
pub struct MockTimingCell {
    header: ObjectHeader,
    pub arcs: u32,
}
impl_record!(MockTimingCell);

/// Install a test-writer tracing subscriber once per process.
///
/// Safe to call from every test; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .try_init();
}
