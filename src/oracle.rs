//! The SAT oracle: a black-box consistency check over a constraint set.
//!
//! The diagnosis algorithm never inspects the oracle's internals; it only
//! calls [`Oracle::check`] and reacts to SAT/UNSAT. [`DimacsOracle`] is the
//! reference adapter that shells out to an external solver jar, mirroring
//! the Python reference's `checker.is_consistent`: write a temp DIMACS file,
//! run the solver, and treat the substring `"UNSATISFIABLE"` in its stdout
//! as the verdict.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::clause::ConstraintSet;
use crate::error::OracleError;

/// The result of one consistency check.
#[derive(Debug, Clone, Copy)]
pub struct CheckOutcome {
    pub consistent: bool,
    pub elapsed: Duration,
}

/// A pluggable consistency checker. Implementations must be safe to invoke
/// from a worker thread; the core treats every call as synchronous and
/// blocking from the caller's point of view.
pub trait Oracle: Send + Sync {
    /// Decides whether `clauses` is satisfiable.
    fn check(&self, clauses: &ConstraintSet) -> Result<CheckOutcome, OracleError>;

    /// The number of `check` calls made through this oracle instance so far.
    fn invocation_count(&self) -> u64;
}

/// Serializes a constraint set to DIMACS CNF.
pub fn write_dimacs<W: Write>(mut out: W, clauses: &ConstraintSet) -> std::io::Result<()> {
    let max_var = clauses
        .iter()
        .flat_map(|c| c.literals().iter())
        .map(|&lit| lit.unsigned_abs())
        .max()
        .unwrap_or(0);
    writeln!(out, "p cnf {} {}", max_var, clauses.len())?;
    for clause in clauses {
        for lit in clause.literals() {
            write!(out, "{} ", lit)?;
        }
        writeln!(out, "0")?;
    }
    Ok(())
}

/// Reference oracle adapter: spawns `java -jar <solver_jar> <scratch-file>`
/// for each call and parses its stdout.
pub struct DimacsOracle {
    solver_path: PathBuf,
    timeout: Option<Duration>,
    invocations: Arc<AtomicU64>,
}

impl DimacsOracle {
    pub fn new(solver_path: impl Into<PathBuf>) -> Self {
        DimacsOracle {
            solver_path: solver_path.into(),
            timeout: None,
            invocations: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn run_solver(&self, scratch_path: &Path) -> Result<String, OracleError> {
        let output = Command::new("java")
            .arg("-jar")
            .arg(&self.solver_path)
            .arg(scratch_path)
            .output()
            .map_err(|e| OracleError::Spawn {
                solver_path: self.solver_path.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            log::warn!(
                "solver {} exited with {}",
                self.solver_path.display(),
                output.status
            );
            return Err(OracleError::SolverFailed {
                solver_path: self.solver_path.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Oracle for DimacsOracle {
    fn check(&self, clauses: &ConstraintSet) -> Result<CheckOutcome, OracleError> {
        let scratch = tempfile::NamedTempFile::new().map_err(|e| OracleError::ScratchFile {
            message: e.to_string(),
        })?;
        write_dimacs(scratch.as_file(), clauses).map_err(|e| OracleError::ScratchFile {
            message: e.to_string(),
        })?;

        let start = Instant::now();
        self.invocations.fetch_add(1, Ordering::Relaxed);
        let stdout = self.run_solver(scratch.path())?;
        let elapsed = start.elapsed();

        if let Some(timeout) = self.timeout {
            if elapsed > timeout {
                return Err(OracleError::Timeout {
                    solver_path: self.solver_path.clone(),
                });
            }
        }

        let consistent = !stdout.contains("UNSATISFIABLE");
        log::debug!(
            "is_consistent [consistent={}, clauses={}]",
            consistent,
            clauses.len()
        );
        Ok(CheckOutcome { consistent, elapsed })
    }

    fn invocation_count(&self) -> u64 {
        self.invocations.load(Ordering::Relaxed)
    }
}
