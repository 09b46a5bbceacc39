//! End-to-end tests of the FastDiag core against the scenarios and
//! invariants from the diagnosis algorithm's design: consistency
//! restoration, minimality, subset-ness, sequential/parallel equivalence,
//! cache uniqueness, and the empty/already-consistent shortcuts.
//!
//! These tests use an in-memory brute-force SAT oracle rather than an
//! external solver process, since the scenarios only ever involve a
//! handful of boolean variables.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use fastdiagp::{
    fastdiag::{find_diagnosis_parallel, find_diagnosis_sequential, ParallelOptions},
    Clause, CheckOutcome, ConstraintSet, Oracle, OracleError,
};

/// A brute-force oracle that evaluates satisfiability directly over the
/// literals it is given, for use in tests where running an external solver
/// process would be pointless.
struct BruteForceOracle {
    invocations: AtomicU64,
}

impl BruteForceOracle {
    fn new() -> Self {
        BruteForceOracle {
            invocations: AtomicU64::new(0),
        }
    }
}

impl Oracle for BruteForceOracle {
    fn check(&self, clauses: &ConstraintSet) -> Result<CheckOutcome, OracleError> {
        self.invocations.fetch_add(1, Ordering::Relaxed);
        Ok(CheckOutcome {
            consistent: is_satisfiable(clauses),
            elapsed: Duration::from_micros(1),
        })
    }

    fn invocation_count(&self) -> u64 {
        self.invocations.load(Ordering::Relaxed)
    }
}

/// Wraps another oracle with a submission counter kept entirely independent
/// of the inner oracle's own instrumentation, so that cache/pool accounting
/// can be checked against a ground truth the core itself never touches.
struct CountingOracle {
    inner: BruteForceOracle,
    calls: AtomicU64,
}

impl CountingOracle {
    fn new() -> Self {
        CountingOracle {
            inner: BruteForceOracle::new(),
            calls: AtomicU64::new(0),
        }
    }

    fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Oracle for CountingOracle {
    fn check(&self, clauses: &ConstraintSet) -> Result<CheckOutcome, OracleError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.inner.check(clauses)
    }

    fn invocation_count(&self) -> u64 {
        self.inner.invocation_count()
    }
}

fn is_satisfiable(clauses: &ConstraintSet) -> bool {
    if clauses.is_empty() {
        return true;
    }
    let vars: Vec<i32> = {
        let mut set = HashSet::new();
        for clause in clauses {
            for &lit in clause.literals() {
                set.insert(lit.unsigned_abs() as i32);
            }
        }
        set.into_iter().collect()
    };

    let n = vars.len();
    for assignment in 0..(1u32 << n) {
        let mut truth = std::collections::HashMap::new();
        for (i, &var) in vars.iter().enumerate() {
            truth.insert(var, (assignment >> i) & 1 == 1);
        }
        let all_satisfied = clauses.iter().all(|clause| {
            clause.literals().iter().any(|&lit| {
                let var = lit.unsigned_abs() as i32;
                let is_true = truth[&var];
                if lit > 0 {
                    is_true
                } else {
                    !is_true
                }
            })
        });
        if all_satisfied {
            return true;
        }
    }
    false
}

fn clause(index: u32, literals: Vec<i32>) -> Clause {
    Clause::new(index, literals)
}

fn indices(set: &ConstraintSet) -> Vec<u32> {
    set.iter().map(Clause::index).collect()
}

fn assert_is_minimal_diagnosis(oracle: &dyn Oracle, b: &ConstraintSet, c: &ConstraintSet, delta: &ConstraintSet) {
    // Invariant 3: subset
    let delta_indices: HashSet<u32> = indices(delta).into_iter().collect();
    let c_indices: HashSet<u32> = indices(c).into_iter().collect();
    assert!(delta_indices.is_subset(&c_indices), "Δ must be a subset of C");

    // Invariant 1: consistency restoration
    let remaining: ConstraintSet = c
        .iter()
        .filter(|cl| !delta_indices.contains(&cl.index()))
        .cloned()
        .collect();
    let mut with_remaining = b.clone();
    with_remaining.extend(remaining.iter().cloned());
    assert!(
        oracle.check(&with_remaining).unwrap().consistent,
        "B ∪ (C \\ Δ) must be consistent"
    );

    // Invariant 2: minimality
    for c_item in delta {
        let mut delta_minus_one: ConstraintSet = delta.clone();
        delta_minus_one.retain(|cl| cl.index() != c_item.index());
        let delta_minus_one_indices: HashSet<u32> =
            delta_minus_one.iter().map(Clause::index).collect();
        let plus_one: ConstraintSet = c
            .iter()
            .filter(|cl| !delta_minus_one_indices.contains(&cl.index()))
            .cloned()
            .collect();
        let mut with_plus_one = b.clone();
        with_plus_one.extend(plus_one.iter().cloned());
        assert!(
            !oracle.check(&with_plus_one).unwrap().consistent,
            "adding back any single element of Δ must restore inconsistency"
        );
    }
}

struct Scenario {
    b: ConstraintSet,
    c: ConstraintSet,
}

fn s1() -> Scenario {
    Scenario {
        b: vec![clause(0, vec![1])],
        c: vec![clause(1, vec![-1])],
    }
}

fn s2() -> Scenario {
    Scenario {
        b: vec![clause(0, vec![1])],
        c: vec![
            clause(1, vec![2]),
            clause(2, vec![-2]),
            clause(3, vec![3]),
        ],
    }
}

fn s3() -> Scenario {
    Scenario {
        b: vec![],
        c: vec![clause(0, vec![1]), clause(1, vec![-1])],
    }
}

/// a <-> b, encoded as (¬a ∨ b) ∧ (a ∨ ¬b), plus a requirement a ∧ ¬b.
fn s4() -> Scenario {
    Scenario {
        b: vec![clause(0, vec![-1, 2])],
        c: vec![
            clause(1, vec![1, -2]),
            clause(2, vec![1]),
            clause(3, vec![-2]),
        ],
    }
}

#[test]
fn s1_toy_unsat_singleton() {
    let oracle = BruteForceOracle::new();
    let s = s1();
    let delta = find_diagnosis_sequential(&s.c, &s.b, &oracle).unwrap();
    assert_eq!(indices(&delta), vec![1]);
    // Entry-level check only: fd_sequential's own check is skipped because
    // delta_hint is empty, and |C| == 1 returns before ever calling it.
    assert_eq!(oracle.invocation_count(), 1);
    assert_is_minimal_diagnosis(&oracle, &s.b, &s.c, &delta);
}

#[test]
fn s2_disjoint_culprit() {
    let oracle = BruteForceOracle::new();
    let s = s2();
    let delta = find_diagnosis_sequential(&s.c, &s.b, &oracle).unwrap();
    assert_eq!(delta.len(), 1);
    assert!(indices(&delta) == vec![1] || indices(&delta) == vec![2]);
    assert_is_minimal_diagnosis(&oracle, &s.b, &s.c, &delta);
}

#[test]
fn s3_entire_candidate_culprit() {
    let oracle = BruteForceOracle::new();
    let s = s3();
    let delta = find_diagnosis_sequential(&s.c, &s.b, &oracle).unwrap();
    assert_eq!(delta.len(), 1);
    assert_is_minimal_diagnosis(&oracle, &s.b, &s.c, &delta);
}

#[test]
fn s4_requirement_only_conflict() {
    let oracle = BruteForceOracle::new();
    let s = s4();
    let delta = find_diagnosis_sequential(&s.c, &s.b, &oracle).unwrap();
    let delta_indices: HashSet<u32> = indices(&delta).into_iter().collect();
    assert!(delta_indices.is_subset(&HashSet::from([1u32, 2, 3])));
    assert!(!delta.is_empty());
    assert_is_minimal_diagnosis(&oracle, &s.b, &s.c, &delta);
}

#[test]
fn s5_parallel_equivalence_across_core_counts() {
    for scenario in [s1(), s2(), s3(), s4()] {
        let sequential_oracle = BruteForceOracle::new();
        let expected =
            find_diagnosis_sequential(&scenario.c, &scenario.b, &sequential_oracle).unwrap();
        let mut expected_indices: Vec<u32> = indices(&expected);
        expected_indices.sort_unstable();

        for &n in &[1usize, 4, 16] {
            let oracle: Arc<dyn Oracle> = Arc::new(BruteForceOracle::new());
            let (delta, _stats) = find_diagnosis_parallel(
                &scenario.c,
                &scenario.b,
                oracle,
                ParallelOptions::new(n),
            )
            .unwrap();
            let mut got_indices: Vec<u32> = indices(&delta);
            got_indices.sort_unstable();
            assert_eq!(
                got_indices, expected_indices,
                "parallel variant with N={n} must match the sequential variant"
            );
        }
    }
}

#[test]
fn s6_cache_reuse_on_requirement_conflict() {
    let s = s4();
    let oracle: Arc<dyn Oracle> = Arc::new(BruteForceOracle::new());
    let (_delta, stats) =
        find_diagnosis_parallel(&s.c, &s.b, oracle, ParallelOptions::new(4)).unwrap();
    assert!(stats.ready_cc_count > 0);
}

#[test]
fn empty_candidate_returns_empty_without_calling_the_oracle() {
    let oracle: Arc<dyn Oracle> = Arc::new(BruteForceOracle::new());
    let (delta, stats) =
        find_diagnosis_parallel(&vec![], &s1().b, oracle, ParallelOptions::new(4)).unwrap();
    assert!(delta.is_empty());
    assert_eq!(stats.cc_count, 0);
}

#[test]
fn already_consistent_performs_exactly_one_oracle_call() {
    let oracle: Arc<dyn Oracle> = Arc::new(BruteForceOracle::new());
    let b = vec![clause(0, vec![1])];
    let c = vec![clause(1, vec![1])]; // redundant, not conflicting
    let (delta, stats) = find_diagnosis_parallel(&c, &b, oracle, ParallelOptions::new(4)).unwrap();
    assert!(delta.is_empty());
    assert_eq!(stats.cc_count, 1);
}

#[test]
fn cache_size_matches_distinct_fingerprints_submitted() {
    for scenario in [s2(), s4()] {
        let counting = Arc::new(CountingOracle::new());
        let oracle: Arc<dyn Oracle> = counting.clone() as Arc<dyn Oracle>;
        let (_delta, stats) =
            find_diagnosis_parallel(&scenario.c, &scenario.b, oracle, ParallelOptions::new(4))
                .unwrap();

        // Every pool job is exactly one oracle call, and the cache's
        // get_or_insert only ever calls the pool once per distinct
        // fingerprint, so the independent counter must exceed the cache
        // size by exactly one: the single uncached entry-level check made
        // before the cache and pool exist. If a fingerprint were ever
        // submitted twice, or the cache under-counted distinct entries,
        // this equality would fail.
        assert_eq!(counting.calls(), stats.cache_size as u64 + 1);
        assert_eq!(stats.cc_count, stats.cache_size as u64 + 1);
    }
}

#[test]
fn determinism_across_repeated_runs() {
    let s = s2();
    let mut results = Vec::new();
    for _ in 0..5 {
        let oracle: Arc<dyn Oracle> = Arc::new(BruteForceOracle::new());
        let (delta, _stats) =
            find_diagnosis_parallel(&s.c, &s.b, oracle, ParallelOptions::new(4)).unwrap();
        let mut idx = indices(&delta);
        idx.sort_unstable();
        results.push(idx);
    }
    assert!(results.windows(2).all(|w| w[0] == w[1]));
}
