//! Integration test: hierarchical cells, nested scopes and hierarchy
//! export/restore.

use edi_core::{ObjectIndex, ObjectType, PersistedHeader};
use edi_db::{CellType, Cell, Database, Point, PropertyValue, ScopeOwner, Tech, Timing};
use edi_test_utils::fixtures::{
    add_inst, add_layer, add_net, add_pin, add_timing_cell, connect, small_db, TestDesign,
};
use edi_test_utils::{init_tracing, MockLayer, MockNet, MockPin};

#[test]
fn hier_cell_owns_a_nested_scope() {
    init_tracing();
    let TestDesign { mut db, top, .. } = TestDesign::new();
    let sub = db.create_hier_cell(top, "alu").unwrap();

    let cell = db.resolve::<Cell>(sub).unwrap();
    assert_eq!(cell.cell_type(), CellType::Hier);
    assert_eq!(cell.hier_index(), ObjectIndex(3));
    assert_eq!(db.cell_name(sub), Some("alu"));

    // The cell record lives in the parent's pool, owned by the parent.
    assert_eq!(db.owner_id(sub), Some(top));
    assert_eq!(
        edi_pool::ScopeTag::of(sub),
        db.storage_scope(top).map(|s| s.scope())
    );

    // Records it owns go to its own scope.
    let inst = add_inst(&mut db, sub, 0, 0).unwrap();
    assert_eq!(db.owner_id(inst), Some(sub));
    assert_eq!(db.scope_root(inst), Some(sub));
    assert_eq!(
        db.storage_scope(sub).map(|s| s.parent()),
        Some(Some(top))
    );
    assert_eq!(db.storage_scope(top).unwrap().children(), &[sub]);
    assert_eq!(db.child_cells(top), &[sub]);
}

#[test]
fn leaf_cells_share_parent_scope() {
    let TestDesign { mut db, top, .. } = TestDesign::new();
    let a = db.create_cell(top, "nand2").unwrap();
    let b = db.create_cell(top, "nor2").unwrap();

    assert_eq!(db.resolve::<Cell>(a).unwrap().cell_type(), CellType::Leaf);
    assert_eq!(db.scope_root(a), Some(top));
    assert_eq!(db.child_cells(top), &[a, b]);
    assert_eq!(db.cell_name(b), Some("nor2"));

    let symbols = &db.storage_scope(top).unwrap().symbols;
    let nand = symbols.symbol_index("nand2").unwrap();
    assert_eq!(symbols.references(nand), &[a]);
}

#[test]
fn destroying_parent_cascades_to_nested_scopes() {
    init_tracing();
    let TestDesign { mut db, top, tech } = TestDesign::new();
    let mid = db.create_hier_cell(top, "mid").unwrap();
    let leaf = db.create_hier_cell(mid, "leaf").unwrap();
    let deep = add_inst(&mut db, leaf, 5, 5).unwrap();
    let tech_obj = add_inst(&mut db, tech, 0, 0).unwrap();

    assert_eq!(db.scope_root(deep), Some(leaf));
    assert_eq!(db.scopes().count(), 4);

    assert!(db.destroy_scope(top));

    for id in [top, mid, leaf, deep] {
        assert!(!db.is_live(id));
        assert_eq!(db.root().index_of(id), None);
    }
    assert_eq!(db.scopes().count(), 1);
    assert!(db.is_live(tech_obj));
}

#[test]
fn scope_teardown_drops_indexed_records_of_its_pool() {
    init_tracing();
    let TestDesign { mut db, top, tech } = TestDesign::new();
    let inst = add_inst(&mut db, top, 0, 0).unwrap();
    let index = db.index_object(inst).unwrap();
    let kept = add_inst(&mut db, tech, 0, 0).unwrap();
    let kept_index = db.index_object(kept).unwrap();

    assert!(db.destroy_scope(top));

    assert!(!db.is_live(inst));
    assert_eq!(db.root().index_of(inst), None);
    assert_eq!(db.root().id_at(index), None);
    assert_eq!(db.index_object(inst), None);
    let exported: Vec<_> = db.root().entries().collect();
    assert_eq!(exported, vec![(ObjectIndex(2), tech), (kept_index, kept)]);
}

#[test]
fn destroying_sub_cell_keeps_parent_scope() {
    let TestDesign { mut db, top, .. } = TestDesign::new();
    let sub = db.create_hier_cell(top, "sub").unwrap();
    let inner = add_inst(&mut db, sub, 0, 0).unwrap();
    let outer = add_inst(&mut db, top, 0, 0).unwrap();

    assert!(db.destroy(sub));

    assert!(!db.is_live(sub));
    assert!(!db.is_live(inner));
    assert!(db.is_live(outer));
    assert!(db.is_live(top));
    assert!(db.storage_scope(top).unwrap().children().is_empty());
    assert_eq!(db.inspect_header(sub).map(|h| h.is_valid()), Some(false));

    // The child-cell array is append-only: the dead id stays listed.
    assert_eq!(db.child_cells(top), &[sub]);
    let live: Vec<_> = db
        .child_cells(top)
        .iter()
        .copied()
        .filter(|&c| db.is_live(c))
        .collect();
    assert!(live.is_empty());
}

#[test]
fn netlist_through_id_arrays() {
    let TestDesign { mut db, top, .. } = TestDesign::new();
    let u1 = add_inst(&mut db, top, 0, 0).unwrap();
    let u2 = add_inst(&mut db, top, 10, 0).unwrap();
    let net = add_net(&mut db, top).unwrap();
    let pins: Vec<_> = [u1, u1, u2]
        .into_iter()
        .map(|inst| add_pin(&mut db, inst).unwrap())
        .collect();
    for &pin in &pins {
        connect(&mut db, net, pin).unwrap();
    }

    let net_pins = db.resolve::<MockNet>(net).unwrap().pins.unwrap();
    assert_eq!(db.id_array(net_pins).unwrap().as_slice(), pins.as_slice());
    for &pin in &pins {
        assert_eq!(db.resolve::<MockPin>(pin).unwrap().net, Some(net));
        assert_eq!(db.owner_id(pin), Some(top));
    }
}

#[test]
fn properties_live_in_owner_scope() {
    let TestDesign { mut db, top, .. } = TestDesign::new();
    let u1 = add_inst(&mut db, top, 0, 0).unwrap();
    let scope = db.storage_scope_mut(u1).unwrap();
    scope
        .properties
        .set(u1, "fixed", PropertyValue::Bool(true));
    assert_eq!(
        db.storage_scope(top).unwrap().properties.get(u1, "fixed"),
        Some(&PropertyValue::Bool(true))
    );
}

#[test]
fn properties_survive_reparenting_and_die_with_the_record() {
    let TestDesign { mut db, top, tech } = TestDesign::new();
    let u1 = add_inst(&mut db, top, 0, 0).unwrap();
    db.home_scope_mut(u1)
        .unwrap()
        .properties
        .set(u1, "w", PropertyValue::Real(1.5));

    assert!(db.set_owner(u1, tech));
    assert_eq!(db.scope_root(u1), Some(tech));
    assert_eq!(
        db.home_scope(u1).unwrap().properties.get(u1, "w"),
        Some(&PropertyValue::Real(1.5))
    );

    assert!(db.destroy(u1));
    assert!(!db.storage_scope(top).unwrap().properties.has_properties(u1));
    assert!(!db.storage_scope(tech).unwrap().properties.has_properties(u1));
}

#[test]
fn library_rosters_grow_through_id_arrays() {
    let TestDesign { mut db, tech, .. } = TestDesign::new();
    let timing = db.init_timing_lib().unwrap();
    let before = db
        .memory_report()
        .into_iter()
        .find(|m| m.owner == tech)
        .unwrap()
        .table_bytes;

    let metal1 = vec![
        Point::new(0, 0),
        Point::new(100, 0),
        Point::new(100, 20),
        Point::new(0, 20),
    ];
    let m1 = add_layer(&mut db, tech, metal1.clone()).unwrap();
    let m2 = add_layer(&mut db, tech, vec![Point::new(0, 0), Point::new(5, 5)]).unwrap();

    let layers = db.resolve::<Tech>(tech).unwrap().layers.unwrap();
    assert_eq!(db.id_array(layers).unwrap().as_slice(), &[m1, m2]);
    assert_eq!(db.owner_id(layers), Some(tech));

    let shape = db.resolve::<MockLayer>(m1).unwrap().shape.unwrap();
    let polygons = &db.storage_scope(m1).unwrap().polygons;
    assert_eq!(polygons.len(), 2);
    assert_eq!(polygons.polygon(shape), Some(metal1.as_slice()));

    let after = db
        .memory_report()
        .into_iter()
        .find(|m| m.owner == tech)
        .unwrap()
        .table_bytes;
    assert!(after > before);

    let cells: Vec<_> = (0..3)
        .map(|_| add_timing_cell(&mut db, timing).unwrap())
        .collect();
    let models = db.resolve::<Timing>(timing).unwrap().models.unwrap();
    assert_eq!(db.id_array(models).unwrap().as_slice(), cells.as_slice());
    assert_eq!(db.scope_root(models), Some(timing));

    assert!(db.destroy_scope(tech));
    assert!(db.id_array(layers).is_none());
    assert!(db.id_array(models).is_some());
}

#[test]
fn hierarchy_export_and_restore() {
    let TestDesign { db, top, tech } = TestDesign::new();
    let exported: Vec<_> = db.root().entries().collect();
    assert_eq!(
        exported,
        vec![(ObjectIndex(1), top), (ObjectIndex(2), tech)]
    );

    let mut restored = small_db();
    restored.restore_hierarchy(exported.iter().copied());
    assert_eq!(restored.root().index_of(top), Some(ObjectIndex(1)));
    assert_eq!(restored.root().id_at(ObjectIndex(2)), Some(tech));
}

#[test]
fn header_externalizes_context_relative() {
    let TestDesign { mut db, top, .. } = TestDesign::new();
    let (a, _) = db
        .create::<MockPin>(ObjectType::Pin, top)
        .unwrap();
    let persisted = db.externalize(a).unwrap();
    assert_eq!(
        persisted,
        PersistedHeader {
            owner: 1,
            id: a.raw()
        }
    );

    let mut copy = edi_core::ObjectHeader::default();
    copy.restore(persisted, db.root().index_of(top));
    assert_eq!(copy.id(), a);
    assert_eq!(copy.owner_index(), ObjectIndex(1));
}

#[test]
#[should_panic(expected = "mismatch")]
fn restore_under_wrong_context_panics() {
    let TestDesign { mut db, top, tech } = TestDesign::new();
    let (a, _) = db.create::<MockPin>(ObjectType::Pin, top).unwrap();
    let persisted = db.externalize(a).unwrap();
    let mut copy = edi_core::ObjectHeader::default();
    copy.restore(persisted, db.root().index_of(tech));
}

#[test]
fn tech_and_timing_record_their_index() {
    let mut db = Database::default();
    let timing = db.init_timing_lib().unwrap();
    let tech = db.init_tech_lib().unwrap();
    assert_eq!(
        db.resolve::<Timing>(timing).unwrap().hier_index(),
        ObjectIndex(1)
    );
    assert_eq!(
        db.resolve::<Tech>(tech).unwrap().hier_index(),
        ObjectIndex(2)
    );
}
