//! Canonical, order-independent identity of a constraint set, used as the
//! Check Cache's key.
//!
//! Consistency of `B ∪ C` depends only on the multiset of clause indices
//! involved, not their order; the recursion repeatedly reconstructs the same
//! multiset from different splits, so an order-independent fingerprint
//! maximizes cache hit rate.

use std::hash::{Hash, Hasher};

use fnv::FnvHasher;

use crate::clause::ConstraintSet;

/// A 64-bit digest of a constraint set's sorted index multiset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

/// Computes the fingerprint of `set`: sort its clause indices ascending and
/// hash the resulting sequence. Any canonical encoding of the sorted index
/// multiset would do; FNV over the sorted `Vec<u32>` is cheap and stable
/// across runs within one process, which is all the Cache requires.
pub fn fingerprint(set: &ConstraintSet) -> Fingerprint {
    let mut indices: Vec<u32> = set.iter().map(|c| c.index()).collect();
    indices.sort_unstable();

    let mut hasher = FnvHasher::default();
    indices.hash(&mut hasher);
    Fingerprint(hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause::Clause;

    fn set(indices: &[u32]) -> ConstraintSet {
        indices.iter().map(|&i| Clause::new(i, vec![1])).collect()
    }

    #[test]
    fn order_independent() {
        assert_eq!(fingerprint(&set(&[1, 2, 3])), fingerprint(&set(&[3, 1, 2])));
    }

    #[test]
    fn distinct_for_distinct_index_sets() {
        assert_ne!(fingerprint(&set(&[1, 2, 3])), fingerprint(&set(&[1, 2, 4])));
    }

    #[test]
    fn distinct_for_different_multiplicity() {
        assert_ne!(fingerprint(&set(&[1, 2])), fingerprint(&set(&[1, 2, 2])));
    }
}
