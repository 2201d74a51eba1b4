//! In-place IR surgery driven by the abstract interpreter.
//!
//! Two rewrites exist. Deinitialization sequences give storage that is
//! about to be overwritten or freed an explicit destructor call, and
//! static-branch folding replaces a compile-time-decidable branch with
//! an unconditional one, deleting the arm that cannot be taken.
//!
//! Inserted instructions land *before* the instruction that triggered
//! them and are interpreted on the block's next visit; the triggering
//! transfer already accounts for their effect, so the fixed point is
//! unchanged by the insertion itself.

use veld_ir::{BlockId, Function, Inst, InstId, Operand};

use crate::value::PartPath;

/// Insert `element_addr; load; deinit` for each path in `paths`,
/// immediately before `before` and in path order. All inserted
/// instructions are anchored at the span of `before`.
pub(crate) fn insert_deinit_sequence(
    func: &mut Function,
    root: Operand,
    paths: &[PartPath],
    before: InstId,
) {
    let anchor = func.span(before);
    for path in paths {
        let addr = func.insert_before(
            Inst::ElementAddr {
                base: root,
                path: path.to_vec(),
            },
            anchor,
            before,
        );
        let value = func.insert_before(
            Inst::Load {
                source: Operand::result(addr),
            },
            anchor,
            before,
        );
        func.insert_before(
            Inst::Deinit {
                object: Operand::result(value),
            },
            anchor,
            before,
        );
    }
}

/// Replace the decided branch at `inst` with `branch target` and remove
/// the arm that cannot be taken.
pub(crate) fn fold_static_branch(
    func: &mut Function,
    inst: InstId,
    target: BlockId,
    doomed: BlockId,
) {
    debug_assert!(
        doomed != func.block_of(inst),
        "folding a static branch would remove its own block"
    );
    func.replace(inst, Inst::Branch { target });
    func.remove_block(doomed);
}
