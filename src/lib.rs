//! A parallel, speculative-lookahead implementation of MSS-based FastDiag.
//!
//! Given a trusted background `B` and a set of possibly-faulty constraints
//! `C` such that `B ∪ C` is inconsistent, [`fastdiag::find_diagnosis_sequential`]
//! and [`fastdiag::find_diagnosis_parallel`] each compute a minimal `Δ ⊆ C`
//! whose removal restores consistency. The two variants agree on every input
//! (see the crate's test suite); the parallel variant additionally exploits
//! a fixed-size worker pool by speculatively pre-issuing consistency checks
//! the recursion is likely to need next, memoized by [`fingerprint`] in a
//! [`cache::CheckCache`].
//!
//! ## Layout
//!
//! - [`clause`] — the `Clause` / `ConstraintSet` data model.
//! - [`fingerprint`] — order-independent identity of a constraint set.
//! - [`oracle`] — the pluggable SAT oracle trait and its DIMACS/external-solver adapter.
//! - [`pool`] — the fixed-size worker pool and its shareable futures.
//! - [`cache`] — the fingerprint-to-future memoization table.
//! - [`lookahead`] — the speculative scheduler.
//! - [`fastdiag`] — the recursive FastDiag core, sequential and parallel.
//! - [`loader`] — the DIMACS CNF file loader.
//! - [`config`] — environment-derived worker pool sizing.
//! - [`error`] — the crate's error taxonomy.

pub mod cache;
pub mod clause;
pub mod config;
pub mod error;
pub mod fastdiag;
pub mod fingerprint;
pub mod loader;
pub mod lookahead;
pub mod oracle;
pub mod pool;

pub use clause::{Clause, ConstraintSet};
pub use error::{DiagnosisError, LoadError, OracleError};
pub use fastdiag::{find_diagnosis_parallel, find_diagnosis_sequential, ParallelOptions, Stats};
pub use fingerprint::{fingerprint, Fingerprint};
pub use oracle::{CheckOutcome, DimacsOracle, Oracle};
