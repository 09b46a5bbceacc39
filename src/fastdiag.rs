//! The MSS-based FastDiag core: a recursive divide-and-conquer search for a
//! maximal satisfiable subset, in both a sequential form (direct oracle
//! calls) and a parallel form (every check routed through the Check Cache,
//! primed by the [`Scheduler`]).
//!
//! Both forms share the same recursive shape described in the module-level
//! algorithm sketch:
//!
//! ```text
//! FastDiag(C, B):
//!   if C is empty or consistent(B ∪ C): return ∅
//!   else: return C \ FD(∅, C, B)
//!
//! FD(Δ, C, B):
//!   if Δ ≠ ∅ and consistent(B ∪ C): return C
//!   if |C| = 1: return ∅
//!   C1, C2 = split(C)
//!   Δ1 = FD(C2, C1, B)
//!   Δ2 = FD(C1 \ Δ1, C2, B ∪ Δ1)
//!   return Δ1 ∪ Δ2
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::cache::CheckCache;
use crate::clause::{diff, split, union, ConstraintSet};
use crate::error::OracleError;
use crate::fingerprint::fingerprint;
use crate::lookahead::Scheduler;
use crate::oracle::Oracle;
use crate::pool::{CheckFuture, WorkerPool};

/// Instrumentation collected over one `find_diagnosis_parallel` call.
#[derive(Debug, Default, Clone, Copy)]
pub struct Stats {
    /// Oracle invocations made during this call (delta of the oracle's own
    /// counter across the call).
    pub cc_count: u64,
    /// How many of the Core's own cache lookups were already resolved at
    /// the moment they were awaited.
    pub ready_cc_count: u64,
    /// Final Check Cache size.
    pub cache_size: usize,
}

/// Parameters controlling the parallel variant.
#[derive(Debug, Clone, Copy)]
pub struct ParallelOptions {
    /// Worker pool size (N).
    pub jobs: usize,
    /// Per-scheduler-entry generation budget (defaults to `jobs`).
    pub max_gen: usize,
}

impl ParallelOptions {
    pub fn new(jobs: usize) -> Self {
        let jobs = jobs.max(1);
        ParallelOptions { jobs, max_gen: jobs }
    }
}

/// Sequential FastDiag: issues every consistency check directly against
/// `oracle`, with no cache or worker pool.
pub fn find_diagnosis_sequential(
    c: &ConstraintSet,
    b: &ConstraintSet,
    oracle: &dyn Oracle,
) -> Result<ConstraintSet, OracleError> {
    if c.is_empty() {
        return Ok(ConstraintSet::new());
    }
    if oracle.check(&union(b, c))?.consistent {
        return Ok(ConstraintSet::new());
    }
    let mss = fd_sequential(&ConstraintSet::new(), c, b, oracle)?;
    Ok(diff(c, &mss))
}

fn fd_sequential(
    delta_hint: &ConstraintSet,
    c: &ConstraintSet,
    b: &ConstraintSet,
    oracle: &dyn Oracle,
) -> Result<ConstraintSet, OracleError> {
    if !delta_hint.is_empty() && oracle.check(&union(b, c))?.consistent {
        return Ok(c.clone());
    }
    if c.len() == 1 {
        return Ok(ConstraintSet::new());
    }

    let (c1, c2) = split(c);
    let delta1 = fd_sequential(&c2, &c1, b, oracle)?;
    let c1_without_delta1 = diff(&c1, &delta1);
    let delta2 = fd_sequential(&c1_without_delta1, &c2, &union(b, &delta1), oracle)?;
    Ok(union(&delta1, &delta2))
}

/// Parallel, look-ahead FastDiag: creates a fresh Check Cache and Worker
/// Pool for the duration of the call, routes every `fd` check through them,
/// and tears both down before returning.
pub fn find_diagnosis_parallel(
    c: &ConstraintSet,
    b: &ConstraintSet,
    oracle: Arc<dyn Oracle>,
    options: ParallelOptions,
) -> Result<(ConstraintSet, Stats), OracleError> {
    if c.is_empty() {
        return Ok((ConstraintSet::new(), Stats::default()));
    }

    let cc_before = oracle.invocation_count();

    // The entry-level check is always a direct oracle call: the Cache and
    // Pool do not exist yet at this point.
    if oracle.check(&union(b, c))?.consistent {
        let stats = Stats {
            cc_count: oracle.invocation_count() - cc_before,
            ready_cc_count: 0,
            cache_size: 0,
        };
        return Ok((ConstraintSet::new(), stats));
    }

    let cache = CheckCache::new();
    let pool = WorkerPool::new(options.jobs);
    let ready_count = AtomicUsize::new(0);

    let mss = fd_parallel(
        &ConstraintSet::new(),
        c,
        b,
        &oracle,
        &cache,
        &pool,
        options.max_gen,
        &ready_count,
    );

    let cache_size = cache.size();
    pool.shutdown();

    let mss = mss?;
    let stats = Stats {
        cc_count: oracle.invocation_count() - cc_before,
        ready_cc_count: ready_count.load(Ordering::Relaxed) as u64,
        cache_size,
    };
    Ok((diff(c, &mss), stats))
}

#[allow(clippy::too_many_arguments)]
fn fd_parallel(
    delta_hint: &ConstraintSet,
    c: &ConstraintSet,
    b: &ConstraintSet,
    oracle: &Arc<dyn Oracle>,
    cache: &CheckCache,
    pool: &WorkerPool,
    max_gen: usize,
    ready_count: &AtomicUsize,
) -> Result<ConstraintSet, OracleError> {
    // Invoked unconditionally, even when `delta_hint` is empty, so the
    // outermost frame also primes its children's checks. See DESIGN.md for
    // why this departs from the reference implementation.
    let scheduler = Scheduler::new(Arc::clone(oracle), cache, pool, max_gen);
    scheduler.run(c, b, std::slice::from_ref(delta_hint));

    if !delta_hint.is_empty() {
        let outcome = checked_via_cache(b, c, oracle, cache, pool, ready_count)?;
        if outcome.consistent {
            return Ok(c.clone());
        }
    }

    if c.len() == 1 {
        return Ok(ConstraintSet::new());
    }

    let (c1, c2) = split(c);
    let delta1 = fd_parallel(&c2, &c1, b, oracle, cache, pool, max_gen, ready_count)?;
    let c1_without_delta1 = diff(&c1, &delta1);
    let delta2 = fd_parallel(
        &c1_without_delta1,
        &c2,
        &union(b, &delta1),
        oracle,
        cache,
        pool,
        max_gen,
        ready_count,
    )?;
    Ok(union(&delta1, &delta2))
}

/// Performs the Core's own lookup for `B ∪ C`: reuse the scheduler's future
/// if present, otherwise submit and await a fresh one. Records whether the
/// future was already resolved at the moment of the lookup.
fn checked_via_cache(
    b: &ConstraintSet,
    c: &ConstraintSet,
    oracle: &Arc<dyn Oracle>,
    cache: &CheckCache,
    pool: &WorkerPool,
    ready_count: &AtomicUsize,
) -> Result<crate::oracle::CheckOutcome, OracleError> {
    let b_with_c = union(b, c);
    let fp = fingerprint(&b_with_c);

    let oracle_for_job = Arc::clone(oracle);
    let job_target = b_with_c.clone();
    let (future, _inserted): (CheckFuture, bool) = cache
        .get_or_insert(fp, || pool.submit(move || oracle_for_job.check(&job_target)));

    if future.poll_ready() {
        ready_count.fetch_add(1, Ordering::Relaxed);
    }
    future.await_result()
}
