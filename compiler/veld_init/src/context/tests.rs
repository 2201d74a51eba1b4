use veld_ir::InstId;

use super::*;
use crate::state::ObjectState;

fn loc(n: u32) -> Location {
    Location::instruction(InstId::new(n))
}

fn locs(ls: &[Location]) -> FxHashSet<Location> {
    ls.iter().cloned().collect()
}

fn result(n: u32) -> Local {
    Local::result(InstId::new(n))
}

/// A table with a nested record: `outer = ((Int, Bool), Int)`.
fn nested_table() -> (TypeTable, TypeId, TypeId) {
    let mut table = TypeTable::new();
    let inner = table.record(vec![TypeId::INT, TypeId::BOOL]);
    let outer = table.record(vec![inner, TypeId::INT]);
    (table, outer, inner)
}

#[test]
fn allocate_rejects_reuse() {
    let mut ctx = Context::new();
    assert!(ctx.allocate(loc(0), TypeId::INT, ObjectValue::uninitialized()));
    assert!(!ctx.allocate(loc(0), TypeId::INT, ObjectValue::uninitialized()));
    assert!(ctx.contains(&loc(0)));
}

#[test]
fn deallocate_removes_the_cell() {
    let mut ctx = Context::new();
    ctx.allocate(loc(0), TypeId::INT, ObjectValue::initialized());
    ctx.deallocate(&loc(0));
    assert!(!ctx.contains(&loc(0)));
}

#[test]
#[should_panic(expected = "deallocating dead location")]
fn deallocate_dead_location_panics() {
    let mut ctx = Context::new();
    ctx.deallocate(&loc(0));
}

#[test]
fn extended_locations_live_with_their_root() {
    let (_, outer, _) = nested_table();
    let mut ctx = Context::new();
    ctx.allocate(loc(0), outer, ObjectValue::uninitialized());
    assert!(ctx.contains(&loc(0).sub(&[0, 1])));
}

#[test]
fn reads_short_circuit_through_uniform_regions() {
    let (_, outer, _) = nested_table();
    let mut ctx = Context::new();
    ctx.allocate(loc(0), outer, ObjectValue::initialized());
    assert_eq!(ctx.value_at(&loc(0).sub(&[0, 1])), ObjectValue::initialized());
}

#[test]
fn writes_materialize_partials_from_the_layout() {
    let (table, outer, _) = nested_table();
    let mut ctx = Context::new();
    ctx.allocate(loc(0), outer, ObjectValue::uninitialized());

    ctx.write_at(&loc(0).sub(&[0, 0]), ObjectValue::initialized(), &table);
    let root = ctx.value_at(&loc(0));
    assert_eq!(
        root,
        ObjectValue::Partial(vec![
            ObjectValue::Partial(vec![
                ObjectValue::initialized(),
                ObjectValue::uninitialized()
            ]),
            ObjectValue::uninitialized(),
        ])
    );
    assert!(root.is_canonical());
}

#[test]
fn writes_recanonicalize_ancestors() {
    let (table, outer, _) = nested_table();
    let mut ctx = Context::new();
    ctx.allocate(loc(0), outer, ObjectValue::uninitialized());

    ctx.write_at(&loc(0).sub(&[0]), ObjectValue::initialized(), &table);
    ctx.write_at(&loc(0).sub(&[1]), ObjectValue::initialized(), &table);
    // All slots initialized: the root collapses back to a full value.
    assert_eq!(ctx.value_at(&loc(0)), ObjectValue::initialized());
}

#[test]
fn common_value_requires_agreement() {
    let mut ctx = Context::new();
    ctx.allocate(loc(0), TypeId::INT, ObjectValue::initialized());
    ctx.allocate(loc(1), TypeId::INT, ObjectValue::initialized());
    let set = locs(&[loc(0), loc(1)]);
    assert_eq!(ctx.common_value(&set), ObjectValue::initialized());
}

#[test]
#[should_panic(expected = "aliasing locations disagree")]
fn common_value_panics_on_divergence() {
    let mut ctx = Context::new();
    ctx.allocate(loc(0), TypeId::INT, ObjectValue::initialized());
    ctx.allocate(loc(1), TypeId::INT, ObjectValue::uninitialized());
    ctx.common_value(&locs(&[loc(0), loc(1)]));
}

#[test]
fn merge_intersects_locals() {
    let mut a = Context::new();
    a.bind_object(result(0), ObjectValue::initialized());
    a.bind_object(result(1), ObjectValue::initialized());

    let mut b = Context::new();
    b.bind_object(result(0), ObjectValue::uninitialized());

    a.merge(&b);
    assert_eq!(a.locals.len(), 1);
    assert_eq!(*a.object(result(0)), ObjectValue::uninitialized());
}

#[test]
fn merge_unions_location_sets() {
    let mut a = Context::new();
    a.allocate(loc(0), TypeId::INT, ObjectValue::initialized());
    a.allocate(loc(1), TypeId::INT, ObjectValue::initialized());
    a.bind_locations(result(2), locs(&[loc(0)]));

    let mut b = Context::new();
    b.allocate(loc(0), TypeId::INT, ObjectValue::initialized());
    b.allocate(loc(1), TypeId::INT, ObjectValue::initialized());
    b.bind_locations(result(2), locs(&[loc(1)]));

    a.merge(&b);
    assert_eq!(*a.locations(result(2)), locs(&[loc(0), loc(1)]));
}

#[test]
fn merge_drops_memory_missing_on_either_path() {
    let mut a = Context::new();
    a.allocate(loc(0), TypeId::INT, ObjectValue::initialized());
    a.allocate(loc(1), TypeId::INT, ObjectValue::initialized());

    let mut b = Context::new();
    b.allocate(loc(0), TypeId::INT, ObjectValue::uninitialized());

    a.merge(&b);
    assert!(a.contains(&loc(0)));
    assert!(!a.contains(&loc(1)));
    // initialized ⊓ uninitialized = uninitialized, by design.
    assert_eq!(a.value_at(&loc(0)), ObjectValue::uninitialized());
}

#[test]
fn merge_unions_consumers() {
    let mut a = Context::new();
    a.allocate(loc(0), TypeId::INT, ObjectValue::consumed(InstId::new(5)));
    let mut b = Context::new();
    b.allocate(loc(0), TypeId::INT, ObjectValue::consumed(InstId::new(6)));

    a.merge(&b);
    assert_eq!(
        a.value_at(&loc(0)),
        ObjectValue::Full(ObjectState::Consumed {
            consumers: [InstId::new(5), InstId::new(6)].into_iter().collect(),
        })
    );
}

#[test]
#[should_panic(expected = "bound to an object on one path and storage on another")]
fn merge_rejects_mixed_bindings() {
    let mut a = Context::new();
    a.bind_object(result(0), ObjectValue::initialized());
    let mut b = Context::new();
    b.allocate(loc(1), TypeId::INT, ObjectValue::initialized());
    b.bind_locations(result(0), locs(&[loc(1)]));
    a.merge(&b);
}
