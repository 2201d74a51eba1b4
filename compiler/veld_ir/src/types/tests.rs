use super::*;

#[test]
fn builtins_are_pre_interned() {
    let table = TypeTable::new();
    assert_eq!(*table.data(TypeId::INT), TypeData::Builtin(BuiltinType::Int));
    assert_eq!(*table.data(TypeId::BOOL), TypeData::Builtin(BuiltinType::Bool));
    assert!(TypeId::INT.is_builtin());
    assert!(TypeId::UNIT.is_builtin());
}

#[test]
fn record_interning_is_idempotent() {
    let mut table = TypeTable::new();
    let a = table.record(vec![TypeId::INT, TypeId::BOOL]);
    let b = table.record(vec![TypeId::INT, TypeId::BOOL]);
    let c = table.record(vec![TypeId::BOOL, TypeId::INT]);
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert!(!a.is_builtin());
}

#[test]
fn layout_exposes_parts() {
    let mut table = TypeTable::new();
    let pair = table.record(vec![TypeId::INT, TypeId::BOOL]);
    let layout = table.layout(pair);
    assert_eq!(layout.part_count(), 2);
    assert_eq!(layout.part(0), TypeId::INT);
    assert_eq!(layout.part(1), TypeId::BOOL);
    assert_eq!(table.layout(TypeId::INT).part_count(), 0);
}

#[test]
fn part_at_path_navigates_nesting() {
    let mut table = TypeTable::new();
    let inner = table.record(vec![TypeId::INT, TypeId::BOOL]);
    let outer = table.record(vec![inner, TypeId::INT]);
    assert_eq!(table.part_at_path(outer, &[]), outer);
    assert_eq!(table.part_at_path(outer, &[0]), inner);
    assert_eq!(table.part_at_path(outer, &[0, 1]), TypeId::BOOL);
    assert_eq!(table.part_at_path(outer, &[1]), TypeId::INT);
}

#[test]
fn type_display() {
    let mut table = TypeTable::new();
    let pair = table.record(vec![TypeId::INT, TypeId::INT]);
    assert_eq!(TypeId::INT.to_string(), "Int");
    assert_eq!(pair.to_string(), format!("t{}", pair.raw()));
}
