//! Function bodies: blocks, the instruction arena, and in-place editing.
//!
//! Instructions live in a per-function arena and blocks hold ordered id
//! lists, so the editing primitives used by the normalization passes —
//! insert-before, replace, block removal — never invalidate an [`InstId`].

use std::fmt;

use crate::ids::{BlockId, InstId};
use crate::inst::{Convention, Inst};
use crate::span::Span;
use crate::types::TypeId;

/// A function parameter: its type and passing convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Parameter {
    pub ty: TypeId,
    pub convention: Convention,
}

/// A basic block: an ordered list of arena instruction ids.
///
/// The last instruction of a complete block is a terminator.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Block {
    /// Instruction ids in execution order.
    pub insts: Vec<InstId>,
}

/// An arena slot: the instruction, its source anchor, and its home block.
#[derive(Clone, Debug)]
struct InstData {
    inst: Inst,
    span: Span,
    block: BlockId,
}

/// A complete function body.
pub struct Function {
    /// The function's name, for logs and dumps.
    pub name: String,
    /// Input parameters with passing conventions.
    pub params: Vec<Parameter>,
    /// The entry block. Always `b0`; the entry has no predecessors.
    pub entry: BlockId,
    blocks: Vec<Block>,
    removed: Vec<bool>,
    insts: Vec<InstData>,
}

impl Function {
    /// Create a function with an empty entry block.
    pub fn new(name: impl Into<String>, params: Vec<Parameter>) -> Self {
        Function {
            name: name.into(),
            params,
            entry: BlockId::new(0),
            blocks: vec![Block::default()],
            removed: vec![false],
            insts: Vec::new(),
        }
    }

    /// Append a new empty block and return its id.
    pub fn add_block(&mut self) -> BlockId {
        let id = BlockId::new(
            u32::try_from(self.blocks.len())
                .unwrap_or_else(|_| panic!("block count exceeds u32::MAX")),
        );
        self.blocks.push(Block::default());
        self.removed.push(false);
        id
    }

    /// Number of block slots, including removed ones.
    ///
    /// Removed blocks keep their slot so that `BlockId`-indexed tables
    /// stay valid; use [`block_ids`](Self::block_ids) to skip them.
    #[inline]
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Ids of all live (non-removed) blocks, in allocation order.
    pub fn block_ids(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.removed.iter().enumerate().filter_map(|(i, &gone)| {
            #[expect(clippy::cast_possible_truncation, reason = "block ids are u32")]
            let id = BlockId::new(i as u32);
            (!gone).then_some(id)
        })
    }

    /// Access a block.
    #[inline]
    pub fn block(&self, b: BlockId) -> &Block {
        &self.blocks[b.index()]
    }

    /// Has `b` been removed by a rewrite?
    #[inline]
    pub fn is_removed(&self, b: BlockId) -> bool {
        self.removed[b.index()]
    }

    /// Access an instruction by id.
    #[inline]
    pub fn inst(&self, i: InstId) -> &Inst {
        &self.insts[i.index()].inst
    }

    /// The source anchor of an instruction.
    #[inline]
    pub fn span(&self, i: InstId) -> Span {
        self.insts[i.index()].span
    }

    /// The block containing an instruction.
    #[inline]
    pub fn block_of(&self, i: InstId) -> BlockId {
        self.insts[i.index()].block
    }

    /// The terminator of `b`, if the block is non-empty.
    pub fn terminator(&self, b: BlockId) -> Option<InstId> {
        self.block(b).insts.last().copied()
    }

    /// Append `inst` to the end of `block`.
    pub fn append(&mut self, block: BlockId, inst: Inst, span: Span) -> InstId {
        debug_assert!(!self.removed[block.index()], "appending to removed {block}");
        let id = self.alloc(inst, span, block);
        self.blocks[block.index()].insts.push(id);
        id
    }

    /// Insert `inst` immediately before the instruction `before`, in the
    /// same block, and return the new id.
    ///
    /// # Panics
    ///
    /// Panics if `before` is not in its block's instruction list.
    pub fn insert_before(&mut self, inst: Inst, span: Span, before: InstId) -> InstId {
        let block = self.block_of(before);
        let pos = self.blocks[block.index()]
            .insts
            .iter()
            .position(|&x| x == before)
            .unwrap_or_else(|| panic!("{before} is not in {block}"));
        let id = self.alloc(inst, span, block);
        self.blocks[block.index()].insts.insert(pos, id);
        id
    }

    /// Replace the instruction at `i` in place, keeping its id and span.
    pub fn replace(&mut self, i: InstId, by: Inst) {
        self.insts[i.index()].inst = by;
    }

    /// Remove a block from the function.
    ///
    /// The block keeps its slot (ids stay valid) but no longer appears in
    /// [`block_ids`](Self::block_ids) or in a freshly computed CFG.
    pub fn remove_block(&mut self, b: BlockId) {
        debug_assert!(b != self.entry, "cannot remove the entry block");
        self.removed[b.index()] = true;
    }

    /// A displayable dump of the whole body.
    pub fn display(&self) -> impl fmt::Display + '_ {
        FunctionDisplay(self)
    }

    fn alloc(&mut self, inst: Inst, span: Span, block: BlockId) -> InstId {
        let id = InstId::new(
            u32::try_from(self.insts.len())
                .unwrap_or_else(|_| panic!("instruction count exceeds u32::MAX")),
        );
        self.insts.push(InstData { inst, span, block });
        id
    }
}

struct FunctionDisplay<'a>(&'a Function);

impl fmt::Display for FunctionDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let func = self.0;
        write!(f, "fn {}(", func.name)?;
        for (i, p) in func.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} %arg{}: {}", p.convention, i, p.ty)?;
        }
        writeln!(f, ")")?;
        for b in func.block_ids() {
            writeln!(f, "{b}:")?;
            for &i in &func.block(b).insts {
                let inst = func.inst(i);
                if inst.result_count() > 0 {
                    writeln!(f, "  %{} = {inst}", i.raw())?;
                } else {
                    writeln!(f, "  {inst}")?;
                }
            }
        }
        Ok(())
    }
}
