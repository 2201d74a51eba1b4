//! Dominance analysis over the function's CFG.
//!
//! The driver schedules blocks in breadth-first order of the dominator
//! tree and gates visitation on dominance, so the tree is rebuilt
//! whenever a rewrite changes control flow.
//!
//! Dominators come from the iterative data-flow formulation of Cooper,
//! Harvey and Kennedy ("A Simple, Fast Dominance Algorithm", 2001):
//! sweep the blocks in reverse postorder, folding each block's processed
//! predecessors into their nearest common ancestor, and repeat until no
//! immediate dominator moves. On the shapes lowering emits this settles
//! within a few sweeps.

use std::collections::VecDeque;

use veld_ir::{BlockId, Cfg, Function};

/// Dominator tree of a function's reachable blocks.
pub struct DominatorTree {
    /// `idom[b]` is `b`'s immediate dominator. The entry points at
    /// itself; unreachable blocks point at nothing.
    idom: Vec<Option<BlockId>>,
    entry: BlockId,
    /// Reachable blocks, breadth-first over the tree.
    order: Vec<BlockId>,
}

impl DominatorTree {
    /// Build the dominator tree for `func`.
    pub fn build(func: &Function, cfg: &Cfg) -> Self {
        let n = func.num_blocks();
        let entry = func.entry;
        if n == 0 {
            return DominatorTree {
                idom: Vec::new(),
                entry,
                order: Vec::new(),
            };
        }

        // Reverse postorder, plus each block's position in it. The
        // position doubles as the depth measure for the ancestor walk.
        let mut rpo = post_order(entry, cfg, n);
        rpo.reverse();
        let mut position = vec![usize::MAX; n];
        for (k, &b) in rpo.iter().enumerate() {
            position[b.index()] = k;
        }

        let mut idom: Vec<Option<BlockId>> = vec![None; n];
        idom[entry.index()] = Some(entry);

        loop {
            let mut moved = false;
            for &b in rpo.iter().skip(1) {
                // Fold all predecessors with a known dominator into one
                // nearest common ancestor; that is b's new idom.
                let mut merged: Option<BlockId> = None;
                for &p in cfg.predecessors(b) {
                    if idom[p.index()].is_none() {
                        continue;
                    }
                    merged = Some(match merged {
                        None => p,
                        Some(q) => nearest_common_ancestor(p, q, &idom, &position),
                    });
                }
                if let Some(m) = merged {
                    if idom[b.index()] != Some(m) {
                        idom[b.index()] = Some(m);
                        moved = true;
                    }
                }
            }
            if !moved {
                break;
            }
        }

        let order = tree_order(entry, &rpo, &idom);
        DominatorTree { idom, entry, order }
    }

    /// The immediate dominator of `b`; `None` for the entry block and
    /// for unreachable blocks.
    pub fn immediate_dominator(&self, b: BlockId) -> Option<BlockId> {
        if b == self.entry {
            None
        } else {
            self.idom[b.index()]
        }
    }

    /// Does `a` dominate `b`? Every block dominates itself.
    pub fn dominates(&self, a: BlockId, b: BlockId) -> bool {
        // Climb b's dominator chain; it either meets `a` or stalls at
        // the entry (or at an unreachable block, which only dominates
        // itself).
        let mut at = b;
        loop {
            if at == a {
                return true;
            }
            match self.idom[at.index()] {
                Some(up) if up != at => at = up,
                _ => return false,
            }
        }
    }

    /// Reachable blocks in breadth-first order of the dominator tree:
    /// the entry first, every other block somewhere after its immediate
    /// dominator. This order seeds the driver's work list.
    pub fn bfs_order(&self) -> &[BlockId] {
        &self.order
    }
}

/// Postorder over the blocks reachable from `entry`.
///
/// Depth-first with an explicit frame stack. Each frame carries a cursor
/// into its block's successor list; a block is emitted once the cursor
/// runs off the end.
fn post_order(entry: BlockId, cfg: &Cfg, n: usize) -> Vec<BlockId> {
    let mut seen = vec![false; n];
    let mut out = Vec::with_capacity(n);
    let mut frames: Vec<(BlockId, usize)> = vec![(entry, 0)];
    seen[entry.index()] = true;

    while let Some(top) = frames.last_mut() {
        let (b, cursor) = (top.0, top.1);
        top.1 += 1;
        match cfg.successors(b).get(cursor).copied() {
            Some(next) => {
                if !seen[next.index()] {
                    seen[next.index()] = true;
                    frames.push((next, 0));
                }
            }
            None => {
                out.push(b);
                frames.pop();
            }
        }
    }
    out
}

/// The nearest common ancestor of `a` and `b` in the tree built so far.
///
/// Whichever side sits later in reverse postorder is the deeper one;
/// climb it one dominator link at a time until the two sides meet. Both
/// sides are reachable, so every chain ends at the entry and the walk
/// terminates.
fn nearest_common_ancestor(
    a: BlockId,
    b: BlockId,
    idom: &[Option<BlockId>],
    position: &[usize],
) -> BlockId {
    let mut x = a;
    let mut y = b;
    while x != y {
        if position[x.index()] > position[y.index()] {
            x = chain_parent(x, idom);
        } else {
            y = chain_parent(y, idom);
        }
    }
    x
}

fn chain_parent(b: BlockId, idom: &[Option<BlockId>]) -> BlockId {
    idom[b.index()]
        .unwrap_or_else(|| panic!("dominator chain of {b} leaves the reachable region"))
}

/// Breadth-first walk of the finished tree.
///
/// Children are attached in reverse postorder, so siblings come out in
/// the order the CFG reaches them.
fn tree_order(entry: BlockId, rpo: &[BlockId], idom: &[Option<BlockId>]) -> Vec<BlockId> {
    let mut children: Vec<Vec<BlockId>> = vec![Vec::new(); idom.len()];
    for &b in rpo {
        if b == entry {
            continue;
        }
        if let Some(dom) = idom[b.index()] {
            children[dom.index()].push(b);
        }
    }

    let mut order = Vec::with_capacity(rpo.len());
    let mut pending = VecDeque::from([entry]);
    while let Some(b) = pending.pop_front() {
        order.push(b);
        pending.extend(&children[b.index()]);
    }
    order
}
