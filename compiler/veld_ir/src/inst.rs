//! IR instructions, operands, and passing conventions.
//!
//! `Inst` is a tagged sum with one variant per opcode. Instructions read
//! [`Operand`]s (SSA locals or constants) and define zero or more results;
//! results are named by the instruction's [`InstId`](crate::InstId) plus a
//! result index (see [`Local`]).
//!
//! Terminators are ordinary instructions in the last position of a block:
//! the object-state pass interprets, replaces, and inserts around them
//! uniformly, so there is no separate terminator type.

use std::fmt;

use smallvec::{smallvec, SmallVec};

use crate::ids::{BlockId, FunctionId, InstId};
use crate::types::TypeId;

/// Parameter passing convention.
///
/// Conventions govern what the callee may assume about its argument's
/// initialization state and who owns the value afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Convention {
    /// Immutable access to an initialized object.
    Let,
    /// Mutable access to an initialized object; must remain initialized.
    Inout,
    /// Access to uninitialized storage; the callee must initialize it.
    Set,
    /// Ownership transfer into the callee; the argument is consumed.
    Sink,
    /// Access to a value produced by a subscript projection. Only valid
    /// inside projection bodies, never at a function boundary.
    Yielded,
}

impl fmt::Display for Convention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Convention::Let => "let",
            Convention::Inout => "inout",
            Convention::Set => "set",
            Convention::Sink => "sink",
            Convention::Yielded => "yielded",
        };
        f.write_str(s)
    }
}

/// An SSA name within a function: a parameter or an instruction result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Local {
    /// The `i`-th function parameter.
    Param(u32),
    /// The `index`-th result of an instruction.
    Result { inst: InstId, index: u32 },
}

impl Local {
    /// The first result of `inst`.
    #[inline]
    pub fn result(inst: InstId) -> Self {
        Local::Result { inst, index: 0 }
    }
}

impl fmt::Display for Local {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Local::Param(i) => write!(f, "%arg{i}"),
            Local::Result { inst, index: 0 } => write!(f, "%{}", inst.raw()),
            Local::Result { inst, index } => write!(f, "%{}#{index}", inst.raw()),
        }
    }
}

/// A compile-time constant operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Constant {
    Int(i64),
    Bool(bool),
    Unit,
    /// A reference to a function in the enclosing module.
    Function(FunctionId),
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(v) => write!(f, "{v}"),
            Constant::Bool(v) => write!(f, "{v}"),
            Constant::Unit => f.write_str("unit"),
            Constant::Function(id) => write!(f, "{id}"),
        }
    }
}

/// An instruction operand: an SSA local or a constant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Operand {
    Local(Local),
    Constant(Constant),
}

impl Operand {
    /// The first result of `inst`.
    #[inline]
    pub fn result(inst: InstId) -> Self {
        Operand::Local(Local::result(inst))
    }

    /// The `index`-th result of `inst`.
    #[inline]
    pub fn result_at(inst: InstId, index: u32) -> Self {
        Operand::Local(Local::Result { inst, index })
    }

    /// The `i`-th function parameter.
    #[inline]
    pub fn param(i: u32) -> Self {
        Operand::Local(Local::Param(i))
    }

    /// Returns the local this operand names, if it is not a constant.
    #[inline]
    pub fn local(self) -> Option<Local> {
        match self {
            Operand::Local(l) => Some(l),
            Operand::Constant(_) => None,
        }
    }

    /// Is this operand a constant?
    #[inline]
    pub fn is_constant(self) -> bool {
        matches!(self, Operand::Constant(_))
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Local(l) => l.fmt(f),
            Operand::Constant(c) => c.fmt(f),
        }
    }
}

/// Predicate of a `static_branch` instruction.
///
/// Static branches are resolved at compile time by the object-state pass
/// and never survive to code generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum StaticPredicate {
    /// Holds iff the subject's storage is fully initialized.
    Initialized,
    /// Holds iff the subject's type is movable. Reserved for generic move
    /// specialization; not yet interpreted by any pass.
    Movable,
}

impl fmt::Display for StaticPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaticPredicate::Initialized => f.write_str("initialized"),
            StaticPredicate::Movable => f.write_str("movable"),
        }
    }
}

/// A raw LLVM-level operation lowered opaquely.
///
/// The mid-end treats these as black boxes over builtin-typed operands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum LlvmOp {
    Add,
    Sub,
    Mul,
    ICmpEq,
}

impl fmt::Display for LlvmOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LlvmOp::Add => "add",
            LlvmOp::Sub => "sub",
            LlvmOp::Mul => "mul",
            LlvmOp::ICmpEq => "icmp.eq",
        };
        f.write_str(s)
    }
}

/// A single IR instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Inst {
    /// Allocate uninitialized stack storage for a value of `ty`.
    /// Result 0: the address of the allocated storage.
    AllocStack { ty: TypeId },

    /// Borrow access to the storage denoted by `source`.
    /// `access` is `Let`, `Inout`, or `Set`.
    /// Result 0: the borrowed address.
    Borrow { access: Convention, source: Operand },

    /// Unconditional branch.
    Branch { target: BlockId },

    /// Conditional branch on a boolean object.
    CondBranch {
        condition: Operand,
        on_true: BlockId,
        on_false: BlockId,
    },

    /// Apply `callee` to `arguments`. `conventions[k]` is the passing
    /// convention of `arguments[k]`; `callee_convention` is the convention
    /// applied to the callee value itself (`Sink` for consuming closures).
    /// Result 0: the returned object.
    Call {
        callee: Operand,
        callee_convention: Convention,
        arguments: Vec<Operand>,
        conventions: Vec<Convention>,
        result: TypeId,
    },

    /// Free the stack storage at `target`.
    DeallocStack { target: Operand },

    /// Invoke the deinitializer of `object`, consuming it.
    Deinit { object: Operand },

    /// Decompose a record object into its parts, consuming it.
    /// Result `k`: the `k`-th part, of type `parts[k]`.
    Destructure { whole: Operand, parts: Vec<TypeId> },

    /// Project the address of the sub-object at `path` within `base`.
    /// Result 0: the projected address.
    ElementAddr { base: Operand, path: Vec<u32> },

    /// End the access introduced by `borrow`.
    EndBorrow { borrow: Operand },

    /// An opaque machine-level operation over builtin-typed operands.
    /// Result 0: the operation's value.
    Llvm {
        op: LlvmOp,
        operands: Vec<Operand>,
        result: TypeId,
    },

    /// Move the object out of the storage at `source`.
    /// Result 0: the loaded object.
    Load { source: Operand },

    /// Build a record object from `elements`, consuming them.
    /// Result 0: the record, of type `ty`.
    Record { ty: TypeId, elements: Vec<Operand> },

    /// Return `value` to the caller, consuming it.
    Return { value: Operand },

    /// A branch decided at compile time by the object-state pass.
    StaticBranch {
        predicate: StaticPredicate,
        subject: Operand,
        on_true: BlockId,
        on_false: BlockId,
    },

    /// Write `value` into the storage at `target`, consuming `value`.
    Store { value: Operand, target: Operand },

    /// Marks an unreachable program point.
    Unreachable,
}

impl Inst {
    /// Number of SSA results this instruction defines.
    pub fn result_count(&self) -> usize {
        match self {
            Inst::AllocStack { .. }
            | Inst::Borrow { .. }
            | Inst::Call { .. }
            | Inst::ElementAddr { .. }
            | Inst::Llvm { .. }
            | Inst::Load { .. }
            | Inst::Record { .. } => 1,

            Inst::Destructure { parts, .. } => parts.len(),

            Inst::Branch { .. }
            | Inst::CondBranch { .. }
            | Inst::DeallocStack { .. }
            | Inst::Deinit { .. }
            | Inst::EndBorrow { .. }
            | Inst::Return { .. }
            | Inst::StaticBranch { .. }
            | Inst::Store { .. }
            | Inst::Unreachable => 0,
        }
    }

    /// Does this instruction end a basic block?
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Inst::Branch { .. }
                | Inst::CondBranch { .. }
                | Inst::Return { .. }
                | Inst::StaticBranch { .. }
                | Inst::Unreachable
        )
    }

    /// Successor blocks of this instruction.
    ///
    /// Empty for non-terminators and for `Return`/`Unreachable`.
    pub fn successors(&self) -> SmallVec<[BlockId; 2]> {
        match self {
            Inst::Branch { target } => smallvec![*target],
            Inst::CondBranch {
                on_true, on_false, ..
            }
            | Inst::StaticBranch {
                on_true, on_false, ..
            } => smallvec![*on_true, *on_false],
            _ => SmallVec::new(),
        }
    }
}

impl fmt::Display for Inst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list(f: &mut fmt::Formatter<'_>, xs: &[Operand]) -> fmt::Result {
            for (k, x) in xs.iter().enumerate() {
                if k > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{x}")?;
            }
            Ok(())
        }

        match self {
            Inst::AllocStack { ty } => write!(f, "alloc_stack {ty}"),
            Inst::Borrow { access, source } => write!(f, "borrow [{access}] {source}"),
            Inst::Branch { target } => write!(f, "branch {target}"),
            Inst::CondBranch {
                condition,
                on_true,
                on_false,
            } => write!(f, "cond_branch {condition}, {on_true}, {on_false}"),
            Inst::Call {
                callee,
                callee_convention,
                arguments,
                conventions,
                ..
            } => {
                write!(f, "call [{callee_convention}] {callee}(")?;
                for (k, (a, c)) in arguments.iter().zip(conventions).enumerate() {
                    if k > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{c} {a}")?;
                }
                f.write_str(")")
            }
            Inst::DeallocStack { target } => write!(f, "dealloc_stack {target}"),
            Inst::Deinit { object } => write!(f, "deinit {object}"),
            Inst::Destructure { whole, .. } => write!(f, "destructure {whole}"),
            Inst::ElementAddr { base, path } => {
                write!(f, "element_addr {base}")?;
                for k in path {
                    write!(f, ".{k}")?;
                }
                Ok(())
            }
            Inst::EndBorrow { borrow } => write!(f, "end_borrow {borrow}"),
            Inst::Llvm { op, operands, .. } => {
                write!(f, "llvm.{op}(")?;
                list(f, operands)?;
                f.write_str(")")
            }
            Inst::Load { source } => write!(f, "load {source}"),
            Inst::Record { ty, elements } => {
                write!(f, "record {ty}(")?;
                list(f, elements)?;
                f.write_str(")")
            }
            Inst::Return { value } => write!(f, "return {value}"),
            Inst::StaticBranch {
                predicate,
                subject,
                on_true,
                on_false,
            } => write!(f, "static_branch {predicate}({subject}), {on_true}, {on_false}"),
            Inst::Store { value, target } => write!(f, "store {value} to {target}"),
            Inst::Unreachable => f.write_str("unreachable"),
        }
    }
}

#[cfg(test)]
mod tests;
