//! Control-flow graph view of a function.
//!
//! The CFG is a derived structure: it is computed from block terminators
//! and recomputed from scratch after a rewrite changes control flow.
//! Removed blocks appear with empty edge lists and are never successors.

use rustc_hash::FxHashSet;

use crate::function::Function;
use crate::ids::BlockId;

/// Predecessor and successor lists for every block of a function.
#[derive(Clone, Debug)]
pub struct Cfg {
    preds: Vec<Vec<BlockId>>,
    succs: Vec<Vec<BlockId>>,
}

impl Cfg {
    /// Compute the CFG of `func` from its block terminators.
    ///
    /// Predecessor lists are deduplicated: a two-armed branch to the same
    /// target contributes one edge.
    pub fn new(func: &Function) -> Self {
        let n = func.num_blocks();
        let mut preds: Vec<Vec<BlockId>> = vec![Vec::new(); n];
        let mut succs: Vec<Vec<BlockId>> = vec![Vec::new(); n];

        for b in func.block_ids() {
            let Some(term) = func.terminator(b) else {
                continue;
            };
            let mut seen = FxHashSet::default();
            for succ in func.inst(term).successors() {
                debug_assert!(
                    !func.is_removed(succ),
                    "{b} branches to removed block {succ}"
                );
                if seen.insert(succ) {
                    succs[b.index()].push(succ);
                    preds[succ.index()].push(b);
                }
            }
        }

        Cfg { preds, succs }
    }

    /// Distinct predecessors of `b`.
    #[inline]
    pub fn predecessors(&self, b: BlockId) -> &[BlockId] {
        &self.preds[b.index()]
    }

    /// Distinct successors of `b`.
    #[inline]
    pub fn successors(&self, b: BlockId) -> &[BlockId] {
        &self.succs[b.index()]
    }
}

#[cfg(test)]
mod tests;
