use super::*;

fn i(n: u32) -> InstId {
    InstId::new(n)
}

#[test]
fn result_counts() {
    assert_eq!(Inst::AllocStack { ty: TypeId::INT }.result_count(), 1);
    assert_eq!(
        Inst::Load {
            source: Operand::result(i(0))
        }
        .result_count(),
        1
    );
    assert_eq!(
        Inst::Destructure {
            whole: Operand::result(i(0)),
            parts: vec![TypeId::INT, TypeId::BOOL, TypeId::INT],
        }
        .result_count(),
        3
    );
    assert_eq!(Inst::Unreachable.result_count(), 0);
    assert_eq!(
        Inst::Return {
            value: Operand::param(0)
        }
        .result_count(),
        0
    );
}

#[test]
fn terminators() {
    assert!(Inst::Branch {
        target: BlockId::new(1)
    }
    .is_terminator());
    assert!(Inst::Unreachable.is_terminator());
    assert!(!Inst::AllocStack { ty: TypeId::INT }.is_terminator());
    assert!(!Inst::Store {
        value: Operand::param(0),
        target: Operand::result(i(1)),
    }
    .is_terminator());
}

#[test]
fn successors() {
    let b = Inst::Branch {
        target: BlockId::new(3),
    };
    assert_eq!(b.successors().as_slice(), &[BlockId::new(3)]);

    let cb = Inst::CondBranch {
        condition: Operand::param(0),
        on_true: BlockId::new(1),
        on_false: BlockId::new(2),
    };
    assert_eq!(
        cb.successors().as_slice(),
        &[BlockId::new(1), BlockId::new(2)]
    );

    let sb = Inst::StaticBranch {
        predicate: StaticPredicate::Initialized,
        subject: Operand::result(i(0)),
        on_true: BlockId::new(1),
        on_false: BlockId::new(2),
    };
    assert_eq!(sb.successors().len(), 2);

    assert!(Inst::Return {
        value: Operand::param(0)
    }
    .successors()
    .is_empty());
}

#[test]
fn operand_helpers() {
    assert!(Operand::Constant(Constant::Int(1)).is_constant());
    assert!(!Operand::param(0).is_constant());
    assert_eq!(Operand::param(2).local(), Some(Local::Param(2)));
    assert_eq!(Operand::Constant(Constant::Unit).local(), None);
    assert_eq!(
        Operand::result(i(4)).local(),
        Some(Local::Result {
            inst: i(4),
            index: 0
        })
    );
}

#[test]
fn display_forms() {
    assert_eq!(
        Inst::AllocStack { ty: TypeId::INT }.to_string(),
        "alloc_stack Int"
    );
    assert_eq!(
        Inst::Borrow {
            access: Convention::Set,
            source: Operand::result(i(2)),
        }
        .to_string(),
        "borrow [set] %2"
    );
    assert_eq!(
        Inst::ElementAddr {
            base: Operand::result(i(1)),
            path: vec![0, 2],
        }
        .to_string(),
        "element_addr %1.0.2"
    );
    assert_eq!(
        Inst::Store {
            value: Operand::Constant(Constant::Int(7)),
            target: Operand::result(i(1)),
        }
        .to_string(),
        "store 7 to %1"
    );
    assert_eq!(
        Inst::StaticBranch {
            predicate: StaticPredicate::Initialized,
            subject: Operand::result(i(0)),
            on_true: BlockId::new(1),
            on_false: BlockId::new(2),
        }
        .to_string(),
        "static_branch initialized(%0), b1, b2"
    );
    assert_eq!(Local::Param(1).to_string(), "%arg1");
    assert_eq!(
        Local::Result {
            inst: i(5),
            index: 2
        }
        .to_string(),
        "%5#2"
    );
}
