//! The clause / constraint-set data model.
//!
//! A `Clause` is compared and hashed by its assigned `index` only; the literal
//! payload is carried along for the oracle adapter but never inspected by the
//! diagnosis algorithm itself. This lets set difference and membership tests
//! run in time proportional to the number of indices involved, with no need
//! to normalize or compare literal sequences.

use std::collections::HashSet;
use std::sync::Arc;

/// Stable identity assigned to a clause at load time.
pub type ClauseIndex = u32;

/// A CNF clause: a disjunction of non-zero integer literals, plus the index
/// that identifies it for the lifetime of one diagnosis run.
#[derive(Debug, Clone)]
pub struct Clause {
    index: ClauseIndex,
    literals: Arc<[i32]>,
}

impl Clause {
    pub fn new(index: ClauseIndex, literals: Vec<i32>) -> Self {
        Clause {
            index,
            literals: Arc::from(literals),
        }
    }

    pub fn index(&self) -> ClauseIndex {
        self.index
    }

    pub fn literals(&self) -> &[i32] {
        &self.literals
    }
}

impl PartialEq for Clause {
    fn eq(&self, other: &Clause) -> bool {
        self.index == other.index
    }
}

impl Eq for Clause {}

impl std::hash::Hash for Clause {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

/// An ordered sequence of clauses. Order is significant: the recursive split
/// policy is deterministic on input order, so two permutations of the same
/// set may yield different, still-valid, diagnoses.
pub type ConstraintSet = Vec<Clause>;

/// `a ∪ b`, preserving `a`'s clauses before `b`'s.
pub fn union(a: &ConstraintSet, b: &ConstraintSet) -> ConstraintSet {
    let mut out = Vec::with_capacity(a.len() + b.len());
    out.extend_from_slice(a);
    out.extend_from_slice(b);
    out
}

/// Splits `c` into two contiguous halves, `C1 = c[..k]` and `C2 = c[k..]`
/// with `k = |c| / 2`, matching the reference FastDiag split policy.
pub fn split(c: &ConstraintSet) -> (ConstraintSet, ConstraintSet) {
    let half = c.len() / 2;
    (c[..half].to_vec(), c[half..].to_vec())
}

/// `x \ y`: the clauses of `x` whose index does not appear in `y`, in `x`'s
/// original order.
pub fn diff(x: &ConstraintSet, y: &ConstraintSet) -> ConstraintSet {
    let removed: HashSet<ClauseIndex> = y.iter().map(Clause::index).collect();
    x.iter()
        .filter(|c| !removed.contains(&c.index))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clause(i: ClauseIndex) -> Clause {
        Clause::new(i, vec![i as i32])
    }

    #[test]
    fn diff_preserves_order_and_drops_by_index() {
        let x = vec![clause(0), clause(1), clause(2)];
        let y = vec![clause(1)];
        assert_eq!(diff(&x, &y), vec![clause(0), clause(2)]);
    }

    #[test]
    fn split_is_left_heavy_lower_half() {
        let c = vec![clause(0), clause(1), clause(2)];
        let (c1, c2) = split(&c);
        assert_eq!(c1, vec![clause(0)]);
        assert_eq!(c2, vec![clause(1), clause(2)]);
    }

    #[test]
    fn equality_ignores_literal_payload() {
        let a = Clause::new(5, vec![1, -2]);
        let b = Clause::new(5, vec![99]);
        assert_eq!(a, b);
    }
}
