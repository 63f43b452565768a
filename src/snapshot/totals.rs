//! Machine-wide memory totals
//!
//! Populates the summary header from several sources, each of which may be
//! unavailable. Collection is best-effort by design: a missing source only
//! zeroes its own fields and never fails the snapshot.

use tracing::{debug, warn};

use super::source::SystemSource;

/// Machine-wide byte totals carried in the summary header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryTotals {
    pub total_phys_bytes: u64,
    pub avail_phys_bytes: u64,
    pub kernel_non_paged_bytes: u64,
    pub kernel_paged_bytes: u64,
    pub system_cache_bytes: u64,
}

/// Collects the totals from the given source.
///
/// Total physical memory is the sum of the physical range list, stopping at
/// the zero base-and-length sentinel; when that yields nothing, the basic
/// page count times the page size stands in. The pool and cache counters
/// come from the performance source, converted from pages to bytes.
pub fn collect<S: SystemSource>(source: &S) -> MemoryTotals {
    let mut totals = MemoryTotals::default();
    let page_size = source.page_size();

    if let Some(ranges) = source.physical_memory_ranges() {
        totals.total_phys_bytes = ranges
            .iter()
            .take_while(|range| !range.is_sentinel())
            .map(|range| range.bytes)
            .sum();
    }

    match source.performance_counters() {
        Some(perf) => {
            // The performance source reports these counters in pages.
            totals.avail_phys_bytes = perf.available_pages * page_size;
            totals.kernel_non_paged_bytes = perf.non_paged_pool_pages * page_size;
            totals.kernel_paged_bytes = perf.paged_pool_pages * page_size;
            totals.system_cache_bytes = perf.resident_system_cache_pages * page_size;
        }
        None => warn!("performance counters unavailable; pool and cache totals left at zero"),
    }

    if totals.total_phys_bytes == 0 {
        debug!("physical range list empty or unavailable; falling back to basic page count");
        if let Some(basic) = source.basic_info() {
            totals.total_phys_bytes = basic.physical_pages * page_size;
        }
    }

    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::error::SnapshotResult;
    use crate::snapshot::source::{
        BasicSystemInfo, PerformanceCounters, PhysicalRange, ProcessRecord,
    };

    struct FakeSource {
        ranges: Option<Vec<PhysicalRange>>,
        perf: Option<PerformanceCounters>,
        basic: Option<BasicSystemInfo>,
    }

    impl SystemSource for FakeSource {
        fn page_size(&self) -> u64 {
            4096
        }

        fn physical_memory_ranges(&self) -> Option<Vec<PhysicalRange>> {
            self.ranges.clone()
        }

        fn performance_counters(&self) -> Option<PerformanceCounters> {
            self.perf
        }

        fn basic_info(&self) -> Option<BasicSystemInfo> {
            self.basic
        }

        fn process_records(&self) -> SnapshotResult<Vec<ProcessRecord>> {
            Ok(Vec::new())
        }

        fn has_lock_pages_privilege(&self, _pid: u32) -> bool {
            false
        }
    }

    #[test]
    fn sums_ranges_up_to_the_sentinel() {
        let source = FakeSource {
            ranges: Some(vec![
                PhysicalRange { base: 0x1000, bytes: 1 << 20 },
                PhysicalRange { base: 0x100000, bytes: 3 << 20 },
                PhysicalRange { base: 0, bytes: 0 },
                PhysicalRange { base: 0x9999, bytes: 1 << 30 },
            ]),
            perf: None,
            basic: Some(BasicSystemInfo { physical_pages: 99 }),
        };
        let totals = collect(&source);
        assert_eq!(totals.total_phys_bytes, 4 << 20);
    }

    #[test]
    fn converts_performance_pages_to_bytes() {
        let source = FakeSource {
            ranges: Some(vec![PhysicalRange { base: 0, bytes: 1 << 30 }]),
            perf: Some(PerformanceCounters {
                available_pages: 10,
                non_paged_pool_pages: 20,
                paged_pool_pages: 30,
                resident_system_cache_pages: 40,
            }),
            basic: None,
        };
        let totals = collect(&source);
        assert_eq!(totals.avail_phys_bytes, 10 * 4096);
        assert_eq!(totals.kernel_non_paged_bytes, 20 * 4096);
        assert_eq!(totals.kernel_paged_bytes, 30 * 4096);
        assert_eq!(totals.system_cache_bytes, 40 * 4096);
    }

    #[test]
    fn missing_performance_source_zeroes_only_its_fields() {
        let source = FakeSource {
            ranges: Some(vec![PhysicalRange { base: 0, bytes: 2 << 30 }]),
            perf: None,
            basic: None,
        };
        let totals = collect(&source);
        assert_eq!(totals.total_phys_bytes, 2 << 30);
        assert_eq!(totals.avail_phys_bytes, 0);
        assert_eq!(totals.kernel_non_paged_bytes, 0);
        assert_eq!(totals.kernel_paged_bytes, 0);
        assert_eq!(totals.system_cache_bytes, 0);
    }

    #[test]
    fn falls_back_to_basic_page_count_when_ranges_are_empty() {
        let source = FakeSource {
            ranges: Some(Vec::new()),
            perf: None,
            basic: Some(BasicSystemInfo { physical_pages: 1024 }),
        };
        assert_eq!(collect(&source).total_phys_bytes, 1024 * 4096);
    }

    #[test]
    fn falls_back_when_range_source_is_unavailable() {
        let source = FakeSource {
            ranges: None,
            perf: None,
            basic: Some(BasicSystemInfo { physical_pages: 512 }),
        };
        assert_eq!(collect(&source).total_phys_bytes, 512 * 4096);
    }

    #[test]
    fn all_sources_missing_yields_zeroes() {
        let source = FakeSource { ranges: None, perf: None, basic: None };
        assert_eq!(collect(&source), MemoryTotals::default());
    }
}
