//! Environment-derived defaults for the worker pool size.
//!
//! Mirrors the reference implementation's `environment_setup` module: a
//! fixed number of logical cores is reserved for interactive use, and
//! whatever remains (at least one) is handed to the worker pool.

/// Logical cores withheld from batch processing so the host stays
/// responsive for interactive work alongside a diagnosis run.
pub const RESERVED_FOR_INTERACTIVE: usize = 2;

/// The number of logical cores available on this host.
pub fn available_logical_cores() -> usize {
    num_cpus::get()
}

/// The number of logical cores to dedicate to batch (worker pool)
/// processing: `max(1, available - RESERVED_FOR_INTERACTIVE)`.
pub fn logical_cores_for_batch_processing() -> usize {
    available_logical_cores()
        .saturating_sub(RESERVED_FOR_INTERACTIVE)
        .max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_core_count_is_never_zero() {
        assert!(logical_cores_for_batch_processing() >= 1);
    }
}
