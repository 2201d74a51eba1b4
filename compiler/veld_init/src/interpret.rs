//! The fixed-point driver and the per-instruction transfer functions.
//!
//! # Algorithm
//!
//! Forward dataflow over the CFG, one [`Context`] pair (before/after) per
//! block:
//!
//! 1. Seed a FIFO work list with the breadth-first order of the dominator
//!    tree, so every block is first reached after its immediate dominator.
//! 2. A popped block is *visitable* iff its immediate dominator has been
//!    visited and every predecessor has been visited or is dominated by
//!    the block (a back edge). Unvisitable blocks go back to the tail.
//! 3. The entry block's before-context comes from the function signature;
//!    any other block's is the merge of its visited predecessors' afters.
//! 4. The after-context is recomputed only when the before-context
//!    changed. A block is finished when it is stable with every
//!    predecessor visited, when every predecessor is finished, or when
//!    its only unfinished predecessor is itself (a self loop) and its
//!    after-context stopped changing.
//!
//! Transfer functions mutate the context in place and, for two opcodes,
//! mutate the IR as well: `borrow [set]` and `dealloc_stack` insert
//! deinitialization sequences for live storage, and `static_branch` folds
//! to an unconditional branch once its subject's state is decided,
//! removing the dead arm and invalidating the CFG and dominator tree,
//! which the driver then recomputes.
//!
//! Ownership violations flow to the [`DiagnosticSet`] and analysis
//! continues best-effort; inconsistencies that valid input cannot produce
//! panic with a precondition message.

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};

use veld_diagnostic::{self as diag, DiagnosticSet};
use veld_ir::{
    BlockId, Cfg, Convention, FunctionId, Inst, InstId, Local, Module, Operand, Span,
    StaticPredicate,
};

use crate::context::{Binding, Context};
use crate::graph::DominatorTree;
use crate::location::{Location, LocationRoot};
use crate::rewrite;
use crate::state::ObjectState;
use crate::value::ObjectValue;

/// Analyze and rewrite one function.
///
/// Verifies definite initialization and exclusive consumption of every
/// object, inserts deinitialization where storage is overwritten or
/// freed, and folds decidable `static_branch` instructions. If
/// `diagnostics` gains no errors, the function afterwards deinitializes
/// every object before its storage is reused or freed and contains no
/// decidable static branch.
pub fn normalize_object_states(
    function: FunctionId,
    module: &mut Module,
    diagnostics: &mut DiagnosticSet,
) {
    Interpreter::new(function, module, diagnostics).run();
}

/// Before/after contexts of one block.
#[derive(Clone)]
struct Flow {
    before: Context,
    after: Context,
}

struct Interpreter<'a> {
    function: FunctionId,
    module: &'a mut Module,
    diagnostics: &'a mut DiagnosticSet,
    cfg: Cfg,
    dom: DominatorTree,
    work: VecDeque<BlockId>,
    queued: FxHashSet<BlockId>,
    done: FxHashSet<BlockId>,
    contexts: FxHashMap<BlockId, Flow>,
    /// Set when a fold changed control flow mid-transfer.
    graphs_dirty: bool,
}

impl<'a> Interpreter<'a> {
    fn new(
        function: FunctionId,
        module: &'a mut Module,
        diagnostics: &'a mut DiagnosticSet,
    ) -> Self {
        let cfg = Cfg::new(&module[function]);
        let dom = DominatorTree::build(&module[function], &cfg);
        Interpreter {
            function,
            module,
            diagnostics,
            cfg,
            dom,
            work: VecDeque::new(),
            queued: FxHashSet::default(),
            done: FxHashSet::default(),
            contexts: FxHashMap::default(),
            graphs_dirty: false,
        }
    }

    fn run(mut self) {
        {
            let func = &self.module[self.function];
            tracing::debug!(
                function = %func.name,
                blocks = func.num_blocks(),
                "normalizing object states"
            );
        }

        let seed: Vec<BlockId> = self.dom.bfs_order().to_vec();
        for b in seed {
            self.enqueue(b);
        }

        while let Some(b) = self.pop() {
            if !self.is_visitable(b) {
                self.enqueue(b);
                continue;
            }
            tracing::trace!(block = %b, "interpreting block");
            self.process(b);
            if self.graphs_dirty {
                self.recompute_graphs();
            }
        }

        let func = &self.module[self.function];
        tracing::debug!(
            function = %func.name,
            diagnostics = self.diagnostics.len(),
            "object states normalized"
        );
    }

    // ── Scheduling ──────────────────────────────────────────────────

    /// Push a block on the work list. The list is a set: enqueueing a
    /// block twice indicates a scheduling bug.
    fn enqueue(&mut self, b: BlockId) {
        debug_assert!(!self.queued.contains(&b), "work list already holds {b}");
        if self.queued.insert(b) {
            self.work.push_back(b);
        }
    }

    fn pop(&mut self) -> Option<BlockId> {
        let b = self.work.pop_front()?;
        self.queued.remove(&b);
        Some(b)
    }

    /// Drop `b` from the work list after its removal from the function.
    fn purge(&mut self, b: BlockId) {
        if self.queued.remove(&b) {
            self.work.retain(|&x| x != b);
        }
    }

    fn visited(&self, b: BlockId) -> bool {
        self.contexts.contains_key(&b)
    }

    /// A block can be interpreted once its immediate dominator has been
    /// and every predecessor is either visited or reached by a back edge
    /// from one of the block's own descendants.
    fn is_visitable(&self, b: BlockId) -> bool {
        if b == self.module[self.function].entry {
            return true;
        }
        let Some(idom) = self.dom.immediate_dominator(b) else {
            // Unreachable since a rewrite; dropped on the next recompute.
            return false;
        };
        self.visited(idom)
            && self
                .cfg
                .predecessors(b)
                .iter()
                .all(|&p| self.visited(p) || self.dom.dominates(b, p))
    }

    fn recompute_graphs(&mut self) {
        let func = &self.module[self.function];
        self.cfg = Cfg::new(func);
        self.dom = DominatorTree::build(func, &self.cfg);
        self.graphs_dirty = false;

        // Blocks the rewrite made unreachable have nothing left to say.
        let reachable: FxHashSet<BlockId> = self.dom.bfs_order().iter().copied().collect();
        self.work.retain(|b| reachable.contains(b));
        self.queued.retain(|b| reachable.contains(b));
    }

    // ── Per-block analysis ──────────────────────────────────────────

    fn process(&mut self, b: BlockId) {
        if b == self.module[self.function].entry {
            let before = self.entry_context();
            let after = self.after_context(b, &before);
            self.contexts.insert(b, Flow { before, after });
            self.done.insert(b);
            return;
        }

        let preds: Vec<BlockId> = self.cfg.predecessors(b).to_vec();
        let sources: Vec<BlockId> = preds
            .iter()
            .copied()
            .filter(|p| self.visited(*p))
            .collect();
        debug_assert!(!sources.is_empty(), "visitable {b} has no visited predecessor");

        let mut new_before = self.contexts[&sources[0]].after.clone();
        for p in &sources[1..] {
            new_before.merge(&self.contexts[p].after);
        }

        let old = self.contexts.get(&b).cloned();
        let new_after = match &old {
            Some(flow) if flow.before == new_before => {
                if sources.len() == preds.len() {
                    // Stable with full information: finished.
                    self.done.insert(b);
                    return;
                }
                // Unchanged, but some predecessors are still unseen.
                flow.after.clone()
            }
            _ => self.after_context(b, &new_before),
        };

        // Folding this block's terminator can change its successors but
        // never its own predecessor list, so `preds` is still current.
        let finished = preds.iter().all(|p| self.done.contains(p)) || {
            preds.contains(&b)
                && preds.iter().all(|p| *p == b || self.done.contains(p))
                && old.as_ref().is_some_and(|f| f.after == new_after)
        };

        self.contexts.insert(
            b,
            Flow {
                before: new_before,
                after: new_after,
            },
        );
        if finished {
            self.done.insert(b);
        } else {
            self.enqueue(b);
        }
    }

    /// The context at the function's entry, derived from its signature.
    fn entry_context(&self) -> Context {
        let func = &self.module[self.function];
        let mut ctx = Context::new();
        for (i, param) in func.params.iter().enumerate() {
            #[expect(clippy::cast_possible_truncation, reason = "parameter counts fit in u32")]
            let i = i as u32;
            match param.convention {
                Convention::Let | Convention::Inout => {
                    let loc = Location::argument(i);
                    ctx.allocate(loc.clone(), param.ty, ObjectValue::initialized());
                    ctx.bind_locations(Local::Param(i), [loc].into_iter().collect());
                }
                Convention::Set => {
                    let loc = Location::argument(i);
                    ctx.allocate(loc.clone(), param.ty, ObjectValue::uninitialized());
                    ctx.bind_locations(Local::Param(i), [loc].into_iter().collect());
                }
                Convention::Sink => {
                    ctx.bind_object(Local::Param(i), ObjectValue::initialized());
                }
                Convention::Yielded => {
                    panic!("yielded convention at a function boundary")
                }
            }
        }
        ctx
    }

    /// Interpret `b` against `before`, mutating the IR where transfer
    /// functions call for it.
    ///
    /// Walks a snapshot of the instruction list: instructions inserted
    /// during this visit are interpreted on the block's next visit, and
    /// their effect is already reflected in the returned context.
    fn after_context(&mut self, b: BlockId, before: &Context) -> Context {
        let mut ctx = before.clone();
        let snapshot = self.module[self.function].block(b).insts.clone();
        for i in snapshot {
            self.step(i, &mut ctx);
        }
        ctx
    }

    // ── Transfer functions ──────────────────────────────────────────

    fn step(&mut self, i: InstId, ctx: &mut Context) {
        let inst = self.module[self.function].inst(i).clone();
        match inst {
            Inst::AllocStack { ty } => {
                let loc = Location::instruction(i);
                assert!(
                    ctx.allocate(loc.clone(), ty, ObjectValue::uninitialized()),
                    "stack leak: {loc} is already allocated"
                );
                ctx.bind_locations(Local::result(i), [loc].into_iter().collect());
            }

            Inst::Borrow { access, source } => self.borrow(i, access, source, ctx),

            Inst::Branch { .. } | Inst::EndBorrow { .. } | Inst::Unreachable => {}

            Inst::CondBranch { condition, .. } => self.consume(condition, i, ctx),

            Inst::Call {
                callee,
                callee_convention,
                arguments,
                conventions,
                ..
            } => self.call(i, callee, callee_convention, &arguments, &conventions, ctx),

            Inst::DeallocStack { target } => self.dealloc(i, target, ctx),

            Inst::Deinit { object } => self.consume(object, i, ctx),

            Inst::Destructure { whole, parts } => {
                self.consume(whole, i, ctx);
                for k in 0..parts.len() {
                    #[expect(clippy::cast_possible_truncation, reason = "result counts fit in u32")]
                    let index = k as u32;
                    ctx.bind_object(Local::Result { inst: i, index }, ObjectValue::initialized());
                }
            }

            Inst::ElementAddr { base, path } => {
                let locations = self.operand_locations(base, ctx);
                let projected = locations.iter().map(|l| l.sub(&path)).collect();
                ctx.bind_locations(Local::result(i), projected);
            }

            Inst::Llvm { .. } => {
                // TODO: check that operands are initialized builtin objects.
                ctx.bind_object(Local::result(i), ObjectValue::initialized());
            }

            Inst::Load { source } => self.load(i, source, ctx),

            Inst::Record { elements, .. } => {
                for e in &elements {
                    self.consume(*e, i, ctx);
                }
                ctx.bind_object(Local::result(i), ObjectValue::initialized());
            }

            Inst::Return { value } => self.consume(value, i, ctx),

            Inst::StaticBranch {
                predicate,
                subject,
                on_true,
                on_false,
            } => self.static_branch(i, predicate, subject, on_true, on_false, ctx),

            Inst::Store { value, target } => self.store(i, value, target, ctx),
        }
    }

    fn borrow(&mut self, i: InstId, access: Convention, source: Operand, ctx: &mut Context) {
        let locations = self.operand_locations(source, ctx);
        let value = ctx.common_value(&locations);
        match access {
            Convention::Let | Convention::Inout => {
                if !value.is_full_initialized() {
                    let site = self.site(i);
                    self.report_use(&value, site);
                }
            }
            Convention::Set => {
                // The borrow hands out uninitialized storage. Paths still
                // initialized relative to that target get a destructor
                // call first.
                let target = ObjectValue::uninitialized();
                let stale = value.difference(&target);
                if !stale.is_empty() {
                    let (func, _) = self.module.function_and_types(self.function);
                    rewrite::insert_deinit_sequence(func, source, &stale, i);
                }
                let types = &self.module.types;
                for loc in &locations {
                    ctx.write_at(loc, target.clone(), types);
                }
            }
            Convention::Sink | Convention::Yielded => {
                panic!("{access} is not a borrow capability")
            }
        }
        ctx.bind_locations(Local::result(i), locations);
    }

    fn call(
        &mut self,
        i: InstId,
        callee: Operand,
        callee_convention: Convention,
        arguments: &[Operand],
        conventions: &[Convention],
        ctx: &mut Context,
    ) {
        if callee_convention == Convention::Sink {
            self.consume(callee, i, ctx);
        } else {
            assert_access(ctx, callee, "callee");
        }

        for (a, c) in arguments.iter().zip(conventions) {
            match c {
                Convention::Let | Convention::Inout => assert_access(ctx, *a, "argument"),
                Convention::Set => {
                    let locations = self.operand_locations(*a, ctx);
                    for loc in &locations {
                        let value = ctx.value_at(loc);
                        let ty = ctx.located_type(loc, &self.module.types);
                        assert!(
                            !value.has_initialized_part() || ty.is_builtin(),
                            "set argument received initialized storage at {loc}"
                        );
                        ctx.write_at(loc, ObjectValue::initialized(), &self.module.types);
                    }
                }
                Convention::Sink => self.consume(*a, i, ctx),
                Convention::Yielded => panic!("yielded argument at a call site"),
            }
        }

        ctx.bind_object(Local::result(i), ObjectValue::initialized());
    }

    fn dealloc(&mut self, i: InstId, target: Operand, ctx: &mut Context) {
        let locations = self.operand_locations(target, ctx);
        assert!(
            locations.len() == 1,
            "dealloc_stack target must name a unique location"
        );
        let Some(loc) = locations.into_iter().next() else {
            unreachable!()
        };
        assert!(
            loc.is_root() && matches!(loc.root, LocationRoot::Instruction(_)),
            "dealloc_stack of non-stack location {loc}"
        );

        // Whatever is still alive in the doomed storage gets an explicit
        // destructor call first.
        let paths = ctx.value_at(&loc).initialized_paths();
        if !paths.is_empty() {
            let (func, _) = self.module.function_and_types(self.function);
            rewrite::insert_deinit_sequence(func, target, &paths, i);
        }
        ctx.deallocate(&loc);
    }

    fn load(&mut self, i: InstId, source: Operand, ctx: &mut Context) {
        let locations = self.operand_locations(source, ctx);
        for loc in &locations {
            let value = ctx.value_at(loc);
            if value.is_full_initialized() {
                ctx.write_at(loc, ObjectValue::consumed(i), &self.module.types);
            } else {
                let site = self.site(i);
                self.report_use(&value, site);
            }
        }
        ctx.bind_object(Local::result(i), ObjectValue::initialized());
    }

    fn store(&mut self, i: InstId, value: Operand, target: Operand, ctx: &mut Context) {
        self.consume(value, i, ctx);
        let locations = self.operand_locations(target, ctx);
        for loc in &locations {
            let current = ctx.value_at(loc);
            let ty = ctx.located_type(loc, &self.module.types);
            assert!(
                !current.has_initialized_part() || ty.is_builtin(),
                "store into initialized storage at {loc}"
            );
            ctx.write_at(loc, ObjectValue::initialized(), &self.module.types);
        }
    }

    fn static_branch(
        &mut self,
        i: InstId,
        predicate: StaticPredicate,
        subject: Operand,
        on_true: BlockId,
        on_false: BlockId,
        ctx: &mut Context,
    ) {
        assert!(
            predicate == StaticPredicate::Initialized,
            "static_branch predicate `{predicate}` is not implemented"
        );
        let locations = self.operand_locations(subject, ctx);
        let value = ctx.common_value(&locations);

        let (target, doomed) = if value.is_full_initialized() {
            (on_true, on_false)
        } else if value.is_full_uninitialized() {
            (on_false, on_true)
        } else {
            panic!("static_branch on a partially initialized subject is not implemented")
        };

        tracing::debug!(inst = %i, %target, removed = %doomed, "folding static branch");
        debug_assert!(
            self.cfg.predecessors(doomed).len() == 1,
            "doomed arm {doomed} has predecessors besides the folded branch"
        );

        let (func, _) = self.module.function_and_types(self.function);
        rewrite::fold_static_branch(func, i, target, doomed);
        self.purge(doomed);
        self.contexts.remove(&doomed);
        self.done.remove(&doomed);
        self.graphs_dirty = true;
    }

    // ── Helpers ─────────────────────────────────────────────────────

    /// Consume the object denoted by `o` at instruction `i`.
    ///
    /// Constants are never consumed. Anything but a fully initialized
    /// object cannot be moved and is reported as an illegal move.
    fn consume(&mut self, o: Operand, i: InstId, ctx: &mut Context) {
        let Some(local) = o.local() else { return };
        let value = ctx.object_mut(local);
        if value.is_full_initialized() {
            *value = ObjectValue::consumed(i);
        } else {
            let site = self.site(i);
            self.diagnostics.insert(diag::illegal_move(site));
        }
    }

    /// The location set denoted by an address operand.
    fn operand_locations(&self, o: Operand, ctx: &Context) -> FxHashSet<Location> {
        match o {
            Operand::Constant(_) => unimplemented!("constants as address operands"),
            Operand::Local(l) => ctx.locations(l).clone(),
        }
    }

    /// Report a read of an object that is not fully initialized.
    fn report_use(&mut self, value: &ObjectValue, site: Span) {
        let diagnostic = match value {
            ObjectValue::Full(ObjectState::Initialized) => {
                unreachable!("reported a use of an initialized object")
            }
            ObjectValue::Full(ObjectState::Uninitialized) => diag::use_of_uninitialized_object(site),
            ObjectValue::Full(ObjectState::Consumed { .. }) => diag::use_of_consumed_object(site),
            ObjectValue::Partial(_) if value.has_consumed_part() => {
                diag::use_of_partially_consumed_object(site)
            }
            ObjectValue::Partial(_) => diag::use_of_partially_initialized_object(site),
        };
        self.diagnostics.insert(diagnostic);
    }

    fn site(&self, i: InstId) -> Span {
        self.module[self.function].span(i)
    }
}

/// Operands passed by `let`/`inout` must denote storage (a borrow) or be
/// constants; an owned object in that position is malformed IR.
fn assert_access(ctx: &Context, o: Operand, what: &str) {
    match o {
        Operand::Constant(_) => {}
        Operand::Local(l) => assert!(
            matches!(ctx.locals.get(&l), Some(Binding::Locations(_))),
            "{what} {l} is neither a borrow nor a constant"
        ),
    }
}
