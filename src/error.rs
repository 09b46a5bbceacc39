//! The crate's error taxonomy. Each kind below corresponds to one of the
//! failure modes enumerated in the diagnosis design: an oracle that could not
//! decide the query, a malformed CNF input, or a background knowledge base
//! that is inconsistent on its own.

use std::path::PathBuf;

use thiserror::Error;

/// The oracle could not produce a SAT/UNSAT verdict.
#[derive(Debug, Clone, Error)]
pub enum OracleError {
    #[error("solver process at {solver_path} exited with status {status}: {stderr}")]
    SolverFailed {
        solver_path: PathBuf,
        status: String,
        stderr: String,
    },

    #[error("failed to spawn solver process at {solver_path}: {message}")]
    Spawn { solver_path: PathBuf, message: String },

    #[error("failed to write scratch CNF file: {message}")]
    ScratchFile { message: String },

    #[error("solver call on {solver_path} exceeded its timeout")]
    Timeout { solver_path: PathBuf },
}

/// A CNF input file could not be parsed into clauses.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("{path} is missing a 'p cnf <vars> <clauses>' header")]
    MissingHeader { path: PathBuf },

    #[error("{path}:{line}: malformed clause: {message}")]
    MalformedClause {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

/// Top-level failure of a `find_diagnosis` call.
#[derive(Debug, Clone, Error)]
pub enum DiagnosisError {
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// `B` alone is unsatisfiable; the core's precondition does not hold.
    /// The core itself never raises this — it is the CLI driver's
    /// precondition check (see `DESIGN.md`).
    #[error("background knowledge is inconsistent on its own")]
    InconsistentBackground,
}
