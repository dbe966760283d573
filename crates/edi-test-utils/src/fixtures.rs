//! Reusable database fixtures.
//!
//! - [`small_db`]: an empty database with tiny pages, so growth is
//!   exercised after a handful of allocations.
//! - [`TestDesign`]: a top cell plus a technology library.
//! - [`add_inst`] / [`add_pin`] / [`connect`]: build a small netlist
//!   through the public create contract.
//! - [`add_layer`] / [`add_timing_cell`]: fill library rosters.

use edi_core::{ObjectId, ObjectType};
use edi_db::{Database, DbConfig, DbError, Point, Tech, Timing};
use edi_pool::PoolConfig;

use crate::{MockInst, MockLayer, MockNet, MockPin, MockTimingCell};

/// Slots per page used by [`small_db`].
pub const SMALL_PAGE_SLOTS: u32 = 4;

/// An empty database whose pools hold four records per page.
pub fn small_db() -> Database {
    Database::new(DbConfig::new(PoolConfig::new(SMALL_PAGE_SLOTS)))
        .expect("small page config is valid")
}

/// A database with a top cell and a technology library open.
pub struct TestDesign {
    pub db: Database,
    pub top: ObjectId,
    pub tech: ObjectId,
}

impl TestDesign {
    pub fn new() -> Self {
        let mut db = small_db();
        let top = db.init_top_cell("top").expect("top cell opens");
        let tech = db.init_tech_lib().expect("tech lib opens");
        Self { db, top, tech }
    }
}

impl Default for TestDesign {
    fn default() -> Self {
        Self::new()
    }
}

/// Create an instance at `(x, y)` owned by `owner`.
pub fn add_inst(db: &mut Database, owner: ObjectId, x: i32, y: i32) -> Result<ObjectId, DbError> {
    let (id, inst) = db.create::<MockInst>(ObjectType::Inst, owner)?;
    inst.x = x;
    inst.y = y;
    Ok(id)
}

/// Create a pin on `inst` and record it in the instance's pin array.
pub fn add_pin(db: &mut Database, inst: ObjectId) -> Result<ObjectId, DbError> {
    let (pin, record) = db.create::<MockPin>(ObjectType::Pin, inst)?;
    record.inst = Some(inst);
    let field = db
        .resolve::<MockInst>(inst)
        .ok_or(DbError::NotFound { id: inst })?
        .pins;
    let array = db.append_id(field, inst, pin)?;
    if let Some(record) = db.resolve_mut::<MockInst>(inst) {
        record.pins = Some(array);
    }
    Ok(pin)
}

/// Create a net owned by `owner`.
pub fn add_net(db: &mut Database, owner: ObjectId) -> Result<ObjectId, DbError> {
    db.create::<MockNet>(ObjectType::Net, owner).map(|(id, _)| id)
}

/// Connect `pin` to `net` on both sides.
pub fn connect(db: &mut Database, net: ObjectId, pin: ObjectId) -> Result<(), DbError> {
    let field = db
        .resolve::<MockNet>(net)
        .ok_or(DbError::NotFound { id: net })?
        .pins;
    let array = db.append_id(field, net, pin)?;
    db.resolve_mut::<MockNet>(net)
        .ok_or(DbError::NotFound { id: net })?
        .pins = Some(array);
    db.resolve_mut::<MockPin>(pin)
        .ok_or(DbError::NotFound { id: pin })?
        .net = Some(net);
    Ok(())
}

/// Create a layer in the technology library `tech`, store `outline` in the
/// library's polygon table and list the layer in [`Tech::layers`].
pub fn add_layer(
    db: &mut Database,
    tech: ObjectId,
    outline: Vec<Point>,
) -> Result<ObjectId, DbError> {
    let shape = db
        .storage_scope_mut(tech)
        .ok_or(DbError::NotFound { id: tech })?
        .polygons
        .add_polygon(outline);
    let (layer, record) = db.create::<MockLayer>(ObjectType::Layer, tech)?;
    record.shape = Some(shape);
    let field = db
        .resolve::<Tech>(tech)
        .ok_or(DbError::NotFound { id: tech })?
        .layers;
    let array = db.append_id(field, tech, layer)?;
    db.resolve_mut::<Tech>(tech)
        .ok_or(DbError::NotFound { id: tech })?
        .layers = Some(array);
    Ok(layer)
}

/// Create a timing cell in the timing library `timing` and list it in
/// [`Timing::models`].
pub fn add_timing_cell(db: &mut Database, timing: ObjectId) -> Result<ObjectId, DbError> {
    let (cell, _) = db.create::<MockTimingCell>(ObjectType::TCell, timing)?;
    let field = db
        .resolve::<Timing>(timing)
        .ok_or(DbError::NotFound { id: timing })?
        .models;
    let array = db.append_id(field, timing, cell)?;
    db.resolve_mut::<Timing>(timing)
        .ok_or(DbError::NotFound { id: timing })?
        .models = Some(array);
    Ok(cell)
}
