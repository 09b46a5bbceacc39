//! The Check Cache: a thread-safe map from constraint-set fingerprint to the
//! (possibly still pending) future holding its consistency verdict.
//!
//! The only invariant that matters is that at most one future ever exists
//! per fingerprint for the life of one top-level diagnosis: concurrent
//! observers of the same fingerprint must see and await the same future
//! rather than each submitting their own oracle call. `get_or_insert` is the
//! single atomic primitive that enforces this; the lock it takes is held
//! only long enough to check and possibly insert a map entry, never across
//! an oracle call.

use std::sync::Mutex;

use fnv::FnvHashMap;

use crate::fingerprint::Fingerprint;
use crate::pool::CheckFuture;

#[derive(Default)]
pub struct CheckCache {
    entries: Mutex<FnvHashMap<Fingerprint, CheckFuture>>,
}

impl CheckCache {
    pub fn new() -> Self {
        CheckCache::default()
    }

    /// Returns the future for `fp`, along with whether this call created it.
    /// If a future is already present, `make_future` is never called.
    pub fn get_or_insert<F>(&self, fp: Fingerprint, make_future: F) -> (CheckFuture, bool)
    where
        F: FnOnce() -> CheckFuture,
    {
        let mut entries = self.entries.lock().unwrap();
        if let Some(existing) = entries.get(&fp) {
            return (existing.clone(), false);
        }
        let future = make_future();
        entries.insert(fp, future.clone());
        (future, true)
    }

    pub fn get(&self, fp: Fingerprint) -> Option<CheckFuture> {
        self.entries.lock().unwrap().get(&fp).cloned()
    }

    pub fn size(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::CheckOutcome;
    use std::time::Duration;

    fn fp(n: u64) -> Fingerprint {
        // Fingerprint has no public constructor by design (it is always
        // derived from a constraint set); tests reach it indirectly.
        use crate::clause::Clause;
        use crate::fingerprint::fingerprint;
        fingerprint(&vec![Clause::new(n as u32, vec![1])])
    }

    #[test]
    fn second_insert_for_same_fingerprint_reuses_the_future() {
        let cache = CheckCache::new();
        let (_f1, inserted1) = cache.get_or_insert(fp(1), || {
            CheckFuture::ready(Ok(CheckOutcome {
                consistent: true,
                elapsed: Duration::from_millis(0),
            }))
        });
        assert!(inserted1);

        let (_f2, inserted2) = cache.get_or_insert(fp(1), || {
            panic!("make_future should not run for an existing entry")
        });
        assert!(!inserted2);
        assert_eq!(cache.size(), 1);
    }

    #[test]
    fn distinct_fingerprints_get_distinct_entries() {
        let cache = CheckCache::new();
        let outcome = || {
            CheckFuture::ready(Ok(CheckOutcome {
                consistent: true,
                elapsed: Duration::from_millis(0),
            }))
        };
        cache.get_or_insert(fp(1), outcome);
        cache.get_or_insert(fp(2), outcome);
        assert_eq!(cache.size(), 2);
    }
}
