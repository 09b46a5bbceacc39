//! The speculative look-ahead scheduler.
//!
//! Before FastDiag blocks on its own consistency check, the scheduler walks
//! a bounded tree of the queries the recursion is *likely* to need next —
//! along both the "assumed consistent" and "assumed inconsistent" branches —
//! and submits up to `max_gen` new oracle jobs for them. The predicted
//! queries are a superset of what is actually needed; a speculative miss is
//! wasted work, never an incorrect one, because the Core always performs its
//! own lookup before trusting a result.

use std::sync::Arc;

use crate::cache::CheckCache;
use crate::clause::{split, union, ConstraintSet};
use crate::fingerprint::fingerprint;
use crate::oracle::Oracle;
use crate::pool::WorkerPool;

pub struct Scheduler<'a> {
    oracle: Arc<dyn Oracle>,
    cache: &'a CheckCache,
    pool: &'a WorkerPool,
    max_gen: usize,
}

impl<'a> Scheduler<'a> {
    pub fn new(
        oracle: Arc<dyn Oracle>,
        cache: &'a CheckCache,
        pool: &'a WorkerPool,
        max_gen: usize,
    ) -> Self {
        Scheduler {
            oracle,
            cache,
            pool,
            max_gen,
        }
    }

    /// Entry point: `C`, `B`, and the stack of constraint sets future
    /// recursive calls will adopt as `C` along the assumed-consistent path.
    pub fn run(&self, c: &ConstraintSet, b: &ConstraintSet, delta_stack: &[ConstraintSet]) {
        let mut submitted = 0usize;
        self.step(c, b, delta_stack, 0, &mut submitted);
    }

    fn submit_if_new(&self, target: &ConstraintSet, submitted: &mut usize) {
        let fp = fingerprint(target);
        let oracle = Arc::clone(&self.oracle);
        let job_target = target.clone();
        let (_future, inserted) = self
            .cache
            .get_or_insert(fp, || self.pool.submit(move || oracle.check(&job_target)));
        if inserted {
            *submitted += 1;
        }
    }

    fn step(
        &self,
        c: &ConstraintSet,
        b: &ConstraintSet,
        delta_stack: &[ConstraintSet],
        level: usize,
        submitted: &mut usize,
    ) {
        if *submitted >= self.max_gen {
            return;
        }
        log::trace!(
            "lookahead [level={}, |C|={}, |B|={}, stack_depth={}]",
            level,
            c.len(),
            b.len(),
            delta_stack.len()
        );

        let b_with_c = union(b, c);
        self.submit_if_new(&b_with_c, submitted);

        // Assumed-consistent branch: B ∪ C is SAT, FastDiag will descend
        // into the recursive calls that adopt Δ_stack entries as new C.
        if delta_stack.len() > 1 && delta_stack[0].len() == 1 {
            // Case 2.1
            let (left, right) = split(&delta_stack[1]);
            let mut stack = Vec::with_capacity(delta_stack.len() - 1);
            stack.push(right);
            stack.extend_from_slice(&delta_stack[2..]);
            self.step(&left, &b_with_c, &stack, level + 1, submitted);
        } else if !delta_stack.is_empty() && delta_stack[0].len() == 1 {
            // Case 2.2
            let next_c = delta_stack[0].clone();
            self.step(&next_c, &b_with_c, &delta_stack[1..], level + 1, submitted);
        } else if !delta_stack.is_empty() && delta_stack[0].len() > 1 {
            // Case 2.3
            let (left, right) = split(&delta_stack[0]);
            let mut stack = Vec::with_capacity(delta_stack.len());
            stack.push(right);
            stack.extend_from_slice(&delta_stack[1..]);
            self.step(&left, &b_with_c, &stack, level + 1, submitted);
        }

        // Assumed-inconsistent branch: B ∪ C is UNSAT, FastDiag will split C.
        if c.len() > 1 {
            // Case 1.1
            let (left, right) = split(c);
            let mut stack = Vec::with_capacity(delta_stack.len() + 1);
            stack.push(right);
            stack.extend_from_slice(delta_stack);
            self.step(&left, b, &stack, level + 1, submitted);
        } else if c.len() == 1 && !delta_stack.is_empty() && delta_stack[0].len() == 1 {
            // Case 1.2
            let next_c = delta_stack[0].clone();
            self.step(&next_c, b, &delta_stack[1..], level + 1, submitted);
        } else if c.len() == 1 && !delta_stack.is_empty() && delta_stack[0].len() > 1 {
            // Case 1.3
            let (left, right) = split(&delta_stack[0]);
            let mut stack = Vec::with_capacity(delta_stack.len());
            stack.push(right);
            stack.extend_from_slice(&delta_stack[1..]);
            self.step(&left, b, &stack, level + 1, submitted);
        }
    }
}
