use super::*;

fn init() -> ObjectValue {
    ObjectValue::initialized()
}

fn uninit() -> ObjectValue {
    ObjectValue::uninitialized()
}

fn consumed(n: u32) -> ObjectValue {
    ObjectValue::consumed(InstId::new(n))
}

fn partial(parts: Vec<ObjectValue>) -> ObjectValue {
    ObjectValue::Partial(parts)
}

#[test]
fn canonical_collapse() {
    // partial([full(s), full(s)]) == full(s)
    let v = partial(vec![init(), init()]).canonicalized();
    assert_eq!(v, init());
    let v = partial(vec![uninit(), uninit(), uninit()]).canonicalized();
    assert_eq!(v, uninit());
    let v = partial(vec![consumed(1), consumed(1)]).canonicalized();
    assert_eq!(v, consumed(1));
}

#[test]
fn canonicalization_collapses_nested_levels() {
    let v = partial(vec![partial(vec![init(), init()]), init()]).canonicalized();
    assert_eq!(v, init());
    // Distinct consumer sets do not collapse.
    let v = partial(vec![consumed(1), consumed(2)]).canonicalized();
    assert!(matches!(v, ObjectValue::Partial(_)));
    assert!(v.is_canonical());
}

#[test]
fn mixed_partials_are_canonical() {
    let v = partial(vec![init(), uninit()]);
    assert!(v.is_canonical());
    assert!(!partial(vec![init(), init()]).is_canonical());
}

#[test]
fn merge_full_full() {
    assert_eq!(init().merge(uninit()), uninit());
    assert_eq!(uninit().merge(init()), uninit());
    assert_eq!(init().merge(consumed(4)), consumed(4));
}

#[test]
fn merge_expands_full_against_partial() {
    // full(initialized) is the identity, so the partial side survives.
    let p = partial(vec![consumed(2), init()]);
    assert_eq!(init().merge(p.clone()), p);
    assert_eq!(p.clone().merge(init()), p);

    // full(uninitialized) absorbs the initialized slot.
    let p = partial(vec![consumed(2), init()]);
    let expected = partial(vec![consumed(2), uninit()]);
    assert_eq!(uninit().merge(p), expected);
}

#[test]
fn merge_recanonicalizes() {
    let a = partial(vec![init(), uninit()]);
    let b = partial(vec![uninit(), init()]);
    // Slot-wise: uninit/uninit, which collapses to full(uninitialized).
    assert_eq!(a.merge(b), uninit());
}

#[test]
fn merge_commutative_and_associative() {
    let samples = [
        init(),
        uninit(),
        consumed(1),
        partial(vec![init(), uninit()]),
        partial(vec![consumed(2), init()]),
        partial(vec![uninit(), consumed(3)]),
    ];
    for a in &samples {
        for b in &samples {
            assert_eq!(
                a.clone().merge(b.clone()),
                b.clone().merge(a.clone()),
                "merge not commutative for {a} and {b}"
            );
            for c in &samples {
                assert_eq!(
                    a.clone().merge(b.clone()).merge(c.clone()),
                    a.clone().merge(b.clone().merge(c.clone())),
                    "merge not associative for {a}, {b}, {c}"
                );
            }
        }
    }
}

#[test]
fn part_at_descends_and_short_circuits() {
    let v = partial(vec![partial(vec![init(), uninit()]), consumed(1)]);
    assert_eq!(v.part_at(&[0, 1]), uninit());
    assert_eq!(v.part_at(&[1]), consumed(1));
    // A uniform region answers for any of its sub-objects.
    assert_eq!(init().part_at(&[0, 0, 3]), init());
}

#[test]
fn initialized_paths_of_full_value_is_the_empty_path() {
    assert_eq!(init().initialized_paths(), vec![PartPath::new()]);
    assert!(uninit().initialized_paths().is_empty());
    assert!(consumed(1).initialized_paths().is_empty());
}

#[test]
fn initialized_paths_of_partial_value() {
    let v = partial(vec![init(), partial(vec![uninit(), init()])]);
    let paths = v.initialized_paths();
    assert_eq!(
        paths,
        vec![PartPath::from_slice(&[0]), PartPath::from_slice(&[1, 1])]
    );
}

#[test]
fn paths_is_none_for_full_values() {
    assert_eq!(init().paths(), None);
    assert_eq!(uninit().paths(), None);
}

#[test]
fn paths_decomposes_partial_values() {
    let v = partial(vec![init(), uninit(), consumed(9)]);
    let paths = v.paths().unwrap();
    assert_eq!(paths.initialized, vec![PartPath::from_slice(&[0])]);
    assert_eq!(paths.uninitialized, vec![PartPath::from_slice(&[1])]);
    assert_eq!(paths.consumed, vec![PartPath::from_slice(&[2])]);
}

#[test]
fn difference_against_fully_initialized_is_empty() {
    let a = partial(vec![init(), uninit()]);
    assert!(a.difference(&init()).is_empty());
}

#[test]
fn difference_reports_only_left_initialized_paths() {
    // a has slot 0 initialized; b has nothing.
    let a = partial(vec![init(), uninit()]);
    assert_eq!(a.difference(&uninit()), vec![PartPath::from_slice(&[0])]);

    // Initialized in both: not in the difference.
    let b = partial(vec![init(), uninit()]);
    assert!(a.difference(&b).is_empty());

    // Fully initialized left against a partial right descends.
    let b = partial(vec![init(), uninit()]);
    assert_eq!(init().difference(&b), vec![PartPath::from_slice(&[1])]);
}

#[test]
fn has_part_queries() {
    assert!(init().has_initialized_part());
    assert!(!uninit().has_initialized_part());
    assert!(partial(vec![uninit(), init()]).has_initialized_part());
    assert!(partial(vec![uninit(), consumed(1)]).has_consumed_part());
    assert!(!partial(vec![uninit(), init()]).has_consumed_part());
}
