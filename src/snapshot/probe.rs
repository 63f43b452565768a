//! Bounded-capacity probe loop
//!
//! Several system queries only reveal how much buffer they need by failing
//! with a size hint. This helper runs such a query with growing capacities
//! until it completes or fails for a non-size reason. The callee owns its
//! buffer and must release it before the next attempt; the loop itself
//! holds no allocation.

use super::error::{SnapshotError, SnapshotResult};

/// Outcome of one probe attempt.
pub enum ProbeStatus {
    /// The query completed at the offered capacity
    Complete,
    /// The query needs at least this many bytes; retry larger
    NeedsCapacity(usize),
    /// The query failed for a reason more capacity will not fix
    Failed(SnapshotError),
}

/// Runs `probe` with increasing capacities until it completes.
///
/// Each retry offers the capacity the previous attempt reported it needed,
/// plus `margin` to absorb growth between the report and the retry. Returns
/// the capacity at which the probe completed.
pub fn probe_with_resize<F>(
    initial_capacity: usize,
    margin: usize,
    mut probe: F,
) -> SnapshotResult<usize>
where
    F: FnMut(usize) -> ProbeStatus,
{
    let mut capacity = initial_capacity;
    loop {
        match probe(capacity) {
            ProbeStatus::Complete => return Ok(capacity),
            ProbeStatus::NeedsCapacity(needed) => capacity = needed + margin,
            ProbeStatus::Failed(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_on_first_attempt() {
        let mut attempts = 0;
        let capacity = probe_with_resize(64, 16, |_| {
            attempts += 1;
            ProbeStatus::Complete
        })
        .unwrap();
        assert_eq!(capacity, 64);
        assert_eq!(attempts, 1);
    }

    #[test]
    fn grows_to_reported_size_plus_margin() {
        let mut offered = Vec::new();
        let capacity = probe_with_resize(64, 16, |capacity| {
            offered.push(capacity);
            if capacity < 1000 {
                ProbeStatus::NeedsCapacity(1000)
            } else {
                ProbeStatus::Complete
            }
        })
        .unwrap();
        assert_eq!(capacity, 1016);
        assert_eq!(offered, vec![64, 1016]);
    }

    #[test]
    fn non_size_failure_is_terminal() {
        let mut attempts = 0;
        let result = probe_with_resize(64, 16, |_| {
            attempts += 1;
            ProbeStatus::Failed(SnapshotError::QueryFailed {
                api: "NtQuerySystemInformation",
                status: -1,
            })
        });
        assert_eq!(attempts, 1);
        assert!(matches!(result, Err(SnapshotError::QueryFailed { .. })));
    }
}
