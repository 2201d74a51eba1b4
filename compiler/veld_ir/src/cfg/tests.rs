use super::*;
use crate::inst::{Constant, Inst, Operand};
use crate::span::Span;

#[test]
fn diamond_edges() {
    // b0 -> {b1, b2} -> b3
    let mut func = Function::new("f", vec![]);
    let b0 = func.entry;
    let b1 = func.add_block();
    let b2 = func.add_block();
    let b3 = func.add_block();
    func.append(
        b0,
        Inst::CondBranch {
            condition: Operand::Constant(Constant::Bool(true)),
            on_true: b1,
            on_false: b2,
        },
        Span::DUMMY,
    );
    func.append(b1, Inst::Branch { target: b3 }, Span::DUMMY);
    func.append(b2, Inst::Branch { target: b3 }, Span::DUMMY);
    func.append(
        b3,
        Inst::Return {
            value: Operand::Constant(Constant::Unit),
        },
        Span::DUMMY,
    );

    let cfg = Cfg::new(&func);
    assert_eq!(cfg.successors(b0), &[b1, b2]);
    assert_eq!(cfg.predecessors(b3), &[b1, b2]);
    assert_eq!(cfg.predecessors(b0), &[] as &[BlockId]);
    assert_eq!(cfg.successors(b3), &[] as &[BlockId]);
}

#[test]
fn two_armed_branch_to_same_target_is_one_edge() {
    let mut func = Function::new("f", vec![]);
    let b1 = func.add_block();
    func.append(
        func.entry,
        Inst::CondBranch {
            condition: Operand::Constant(Constant::Bool(true)),
            on_true: b1,
            on_false: b1,
        },
        Span::DUMMY,
    );
    func.append(b1, Inst::Unreachable, Span::DUMMY);

    let cfg = Cfg::new(&func);
    assert_eq!(cfg.successors(func.entry), &[b1]);
    assert_eq!(cfg.predecessors(b1), &[func.entry]);
}

#[test]
fn removed_blocks_have_no_edges() {
    let mut func = Function::new("f", vec![]);
    let b1 = func.add_block();
    let b2 = func.add_block();
    let term = func.append(
        func.entry,
        Inst::CondBranch {
            condition: Operand::Constant(Constant::Bool(true)),
            on_true: b1,
            on_false: b2,
        },
        Span::DUMMY,
    );
    func.append(b1, Inst::Unreachable, Span::DUMMY);
    func.append(b2, Inst::Unreachable, Span::DUMMY);

    // Fold the branch and drop b2, as the rewriter would.
    func.replace(term, Inst::Branch { target: b1 });
    func.remove_block(b2);

    let cfg = Cfg::new(&func);
    assert_eq!(cfg.successors(func.entry), &[b1]);
    assert_eq!(cfg.predecessors(b2), &[] as &[BlockId]);
    assert_eq!(cfg.successors(b2), &[] as &[BlockId]);
}

#[test]
fn self_loop() {
    let mut func = Function::new("f", vec![]);
    let b1 = func.add_block();
    func.append(func.entry, Inst::Branch { target: b1 }, Span::DUMMY);
    func.append(b1, Inst::Branch { target: b1 }, Span::DUMMY);

    let cfg = Cfg::new(&func);
    assert_eq!(cfg.predecessors(b1), &[func.entry, b1]);
    assert_eq!(cfg.successors(b1), &[b1]);
}
