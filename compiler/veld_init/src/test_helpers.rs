//! Shared test utilities for the normalization pass.
//!
//! Factory functions for building small IR bodies and running the pass
//! on them. Only compiled in test builds.

use veld_diagnostic::DiagnosticSet;
use veld_ir::{
    Convention, Function, FunctionId, Inst, InstId, Module, Parameter, Span, TypeId,
};

use crate::normalize_object_states;

/// Shorthand for a one-byte span starting at `n`.
pub(crate) fn sp(n: u32) -> Span {
    Span::new(n, n + 1)
}

/// A `let` parameter of the given type.
pub(crate) fn let_param(ty: TypeId) -> Parameter {
    Parameter {
        ty,
        convention: Convention::Let,
    }
}

/// A `set` parameter of the given type.
pub(crate) fn set_param(ty: TypeId) -> Parameter {
    Parameter {
        ty,
        convention: Convention::Set,
    }
}

/// A `sink` parameter of the given type.
pub(crate) fn sink_param(ty: TypeId) -> Parameter {
    Parameter {
        ty,
        convention: Convention::Sink,
    }
}

/// Install `func` in a fresh module and run the pass on it.
pub(crate) fn run_pass(func: Function) -> (Module, FunctionId, DiagnosticSet) {
    run_pass_with(Module::new(), func)
}

/// Install `func` in `module` and run the pass on it.
pub(crate) fn run_pass_with(
    mut module: Module,
    func: Function,
) -> (Module, FunctionId, DiagnosticSet) {
    let f = module.add_function(func);
    let mut diagnostics = DiagnosticSet::new();
    normalize_object_states(f, &mut module, &mut diagnostics);
    (module, f, diagnostics)
}

/// The opcodes of a block, in order, rendered without operands.
pub(crate) fn opcode_names(func: &Function, b: veld_ir::BlockId) -> Vec<&'static str> {
    func.block(b).insts.iter().map(|&i| opcode(func.inst(i))).collect()
}

/// A stable name for an instruction's opcode.
pub(crate) fn opcode(inst: &Inst) -> &'static str {
    match inst {
        Inst::AllocStack { .. } => "alloc_stack",
        Inst::Borrow { .. } => "borrow",
        Inst::Branch { .. } => "branch",
        Inst::CondBranch { .. } => "cond_branch",
        Inst::Call { .. } => "call",
        Inst::DeallocStack { .. } => "dealloc_stack",
        Inst::Deinit { .. } => "deinit",
        Inst::Destructure { .. } => "destructure",
        Inst::ElementAddr { .. } => "element_addr",
        Inst::EndBorrow { .. } => "end_borrow",
        Inst::Llvm { .. } => "llvm",
        Inst::Load { .. } => "load",
        Inst::Record { .. } => "record",
        Inst::Return { .. } => "return",
        Inst::StaticBranch { .. } => "static_branch",
        Inst::Store { .. } => "store",
        Inst::Unreachable => "unreachable",
    }
}

/// Count instructions matching `name` across all live blocks.
pub(crate) fn count_opcode(func: &Function, name: &str) -> usize {
    func.block_ids()
        .flat_map(|b| func.block(b).insts.iter())
        .filter(|&&i| opcode(func.inst(i)) == name)
        .count()
}

/// The instruction ids of a block whose opcode matches `name`.
pub(crate) fn find_opcode(func: &Function, b: veld_ir::BlockId, name: &str) -> Vec<InstId> {
    func.block(b)
        .insts
        .iter()
        .copied()
        .filter(|&i| opcode(func.inst(i)) == name)
        .collect()
}
