//! The CNF loader: reads a model file and a requirement file into the
//! `(B, C)` pair the core expects.
//!
//! This is the "out of scope" file-format reader the core treats as an
//! opaque collaborator — it never influences the algorithm, only the shape
//! of its input. The format is DIMACS CNF: `c` comment lines, one `p cnf
//! <vars> <clauses>` header, then whitespace-separated literal runs each
//! terminated by a `0`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::clause::{Clause, ClauseIndex, ConstraintSet};
use crate::error::LoadError;

/// Parses a DIMACS CNF file into its raw clauses (as literal vectors),
/// ignoring the header's declared variable/clause counts beyond using them
/// for diagnostics.
pub fn parse_dimacs(path: &Path) -> Result<Vec<Vec<i32>>, LoadError> {
    let text = fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut clauses = Vec::new();
    let mut current: Vec<i32> = Vec::new();
    let mut seen_header = false;

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('c') {
            continue;
        }
        if line.starts_with("p cnf") || line.starts_with("p ") {
            seen_header = true;
            continue;
        }

        for token in line.split_whitespace() {
            let lit: i32 = token.parse().map_err(|_| LoadError::MalformedClause {
                path: path.to_path_buf(),
                line: line_no + 1,
                message: format!("expected an integer literal, found {:?}", token),
            })?;
            if lit == 0 {
                clauses.push(std::mem::take(&mut current));
            } else {
                current.push(lit);
            }
        }
    }

    if !current.is_empty() {
        clauses.push(current);
    }

    if !seen_header {
        return Err(LoadError::MissingHeader {
            path: path.to_path_buf(),
        });
    }

    Ok(clauses)
}

/// Loads the model and requirement CNF files into `(B, C)`.
///
/// `B` is the model's first clause; the rest of the model's clauses and all
/// of the requirement's clauses form `C`, in that order. Each clause
/// receives a stable index: `B` uses `[0, |B|)`, `C` continues from `|B|`.
pub fn load_constraint_sets(
    model_path: impl AsRef<Path>,
    req_path: impl AsRef<Path>,
) -> Result<(ConstraintSet, ConstraintSet), LoadError> {
    let model_path: PathBuf = model_path.as_ref().to_path_buf();
    let req_path: PathBuf = req_path.as_ref().to_path_buf();

    let model_clauses = parse_dimacs(&model_path)?;
    let req_clauses = parse_dimacs(&req_path)?;

    let mut b = ConstraintSet::new();
    let mut next_index: ClauseIndex = 0;

    let mut model_iter = model_clauses.into_iter();
    if let Some(first) = model_iter.next() {
        b.push(Clause::new(next_index, first));
        next_index += 1;
    }

    let mut c = ConstraintSet::new();
    for literals in model_iter {
        c.push(Clause::new(next_index, literals));
        next_index += 1;
    }
    for literals in req_clauses {
        c.push(Clause::new(next_index, literals));
        next_index += 1;
    }

    Ok((b, c))
}
