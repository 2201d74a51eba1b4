//! Incremental construction of function bodies.
//!
//! [`FunctionBuilder`] appends instructions to a current block, one
//! convenience method per opcode. Lowering and the analysis tests both
//! build bodies through it so that well-formedness (terminator placement,
//! span bookkeeping) lives in one place.

use crate::function::{Function, Parameter};
use crate::ids::{BlockId, InstId};
use crate::inst::{Convention, Inst, LlvmOp, Operand, StaticPredicate};
use crate::span::Span;
use crate::types::TypeId;

/// Builds a [`Function`] block by block.
pub struct FunctionBuilder {
    func: Function,
    current: BlockId,
}

impl FunctionBuilder {
    /// Start a function; the entry block is current.
    pub fn new(name: impl Into<String>, params: Vec<Parameter>) -> Self {
        let func = Function::new(name, params);
        let current = func.entry;
        FunctionBuilder { func, current }
    }

    /// Add a new empty block (does not switch to it).
    pub fn add_block(&mut self) -> BlockId {
        self.func.add_block()
    }

    /// Make `b` the block receiving subsequent instructions.
    pub fn switch_to(&mut self, b: BlockId) {
        debug_assert!(!self.func.is_removed(b));
        self.current = b;
    }

    /// The block currently receiving instructions.
    #[inline]
    pub fn current_block(&self) -> BlockId {
        self.current
    }

    /// Finish and return the function.
    pub fn finish(self) -> Function {
        self.func
    }

    fn emit(&mut self, inst: Inst, span: Span) -> InstId {
        debug_assert!(
            self.func
                .terminator(self.current)
                .is_none_or(|t| !self.func.inst(t).is_terminator()),
            "emitting into terminated {}",
            self.current
        );
        self.func.append(self.current, inst, span)
    }

    pub fn alloc_stack(&mut self, ty: TypeId, span: Span) -> InstId {
        self.emit(Inst::AllocStack { ty }, span)
    }

    pub fn borrow(&mut self, access: Convention, source: Operand, span: Span) -> InstId {
        self.emit(Inst::Borrow { access, source }, span)
    }

    pub fn branch(&mut self, target: BlockId, span: Span) -> InstId {
        self.emit(Inst::Branch { target }, span)
    }

    pub fn cond_branch(
        &mut self,
        condition: Operand,
        on_true: BlockId,
        on_false: BlockId,
        span: Span,
    ) -> InstId {
        self.emit(
            Inst::CondBranch {
                condition,
                on_true,
                on_false,
            },
            span,
        )
    }

    #[expect(clippy::too_many_arguments, reason = "mirrors the instruction's fields")]
    pub fn call(
        &mut self,
        callee: Operand,
        callee_convention: Convention,
        arguments: Vec<Operand>,
        conventions: Vec<Convention>,
        result: TypeId,
        span: Span,
    ) -> InstId {
        debug_assert_eq!(arguments.len(), conventions.len());
        self.emit(
            Inst::Call {
                callee,
                callee_convention,
                arguments,
                conventions,
                result,
            },
            span,
        )
    }

    pub fn dealloc_stack(&mut self, target: Operand, span: Span) -> InstId {
        self.emit(Inst::DeallocStack { target }, span)
    }

    pub fn deinit(&mut self, object: Operand, span: Span) -> InstId {
        self.emit(Inst::Deinit { object }, span)
    }

    pub fn destructure(&mut self, whole: Operand, parts: Vec<TypeId>, span: Span) -> InstId {
        self.emit(Inst::Destructure { whole, parts }, span)
    }

    pub fn element_addr(&mut self, base: Operand, path: Vec<u32>, span: Span) -> InstId {
        self.emit(Inst::ElementAddr { base, path }, span)
    }

    pub fn end_borrow(&mut self, borrow: Operand, span: Span) -> InstId {
        self.emit(Inst::EndBorrow { borrow }, span)
    }

    pub fn llvm(
        &mut self,
        op: LlvmOp,
        operands: Vec<Operand>,
        result: TypeId,
        span: Span,
    ) -> InstId {
        self.emit(
            Inst::Llvm {
                op,
                operands,
                result,
            },
            span,
        )
    }

    pub fn load(&mut self, source: Operand, span: Span) -> InstId {
        self.emit(Inst::Load { source }, span)
    }

    pub fn record(&mut self, ty: TypeId, elements: Vec<Operand>, span: Span) -> InstId {
        self.emit(Inst::Record { ty, elements }, span)
    }

    pub fn ret(&mut self, value: Operand, span: Span) -> InstId {
        self.emit(Inst::Return { value }, span)
    }

    pub fn static_branch(
        &mut self,
        predicate: StaticPredicate,
        subject: Operand,
        on_true: BlockId,
        on_false: BlockId,
        span: Span,
    ) -> InstId {
        self.emit(
            Inst::StaticBranch {
                predicate,
                subject,
                on_true,
                on_false,
            },
            span,
        )
    }

    pub fn store(&mut self, value: Operand, target: Operand, span: Span) -> InstId {
        self.emit(Inst::Store { value, target }, span)
    }

    pub fn unreachable(&mut self, span: Span) -> InstId {
        self.emit(Inst::Unreachable, span)
    }
}
