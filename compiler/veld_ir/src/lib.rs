//! SSA intermediate representation for the Veld compiler mid-end.
//!
//! This crate provides:
//!
//! - **The IR itself** ([`Function`], [`Block`], [`Inst`], [`Operand`]) —
//!   a basic-block representation in static single-assignment form. Every
//!   instruction lives in a per-function arena and is named by a stable
//!   [`InstId`]; blocks hold ordered lists of arena ids, so inserting an
//!   instruction never invalidates an existing id.
//!
//! - **Types and layout** ([`TypeTable`], [`TypeLayout`]) — interned type
//!   handles with O(1) equality plus the abstract layout query the mid-end
//!   passes use to reason about sub-objects.
//!
//! - **Graph views** ([`Cfg`]) — predecessor/successor lists over the
//!   non-removed blocks of a function, recomputed on demand after rewrites.
//!
//! - **Construction and editing** ([`FunctionBuilder`], the
//!   [`Function::insert_before`]/[`Function::replace`]/
//!   [`Function::remove_block`] primitives) — the surface lowering and the
//!   normalization passes use to build and mutate bodies in place.
//!
//! Values are named via [`Local`]: either a function parameter or a
//! `(instruction, result index)` pair. Control flow references blocks by
//! [`BlockId`].

pub mod builder;
mod cfg;
mod function;
mod ids;
mod inst;
mod module;
mod span;
mod types;

pub use builder::FunctionBuilder;
pub use cfg::Cfg;
pub use function::{Block, Function, Parameter};
pub use ids::{BlockId, FunctionId, InstId};
pub use inst::{Constant, Convention, Inst, LlvmOp, Local, Operand, StaticPredicate};
pub use module::Module;
pub use span::Span;
pub use types::{BuiltinType, TypeData, TypeId, TypeLayout, TypeTable};
