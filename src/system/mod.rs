//! System information module - Windows backend of the snapshot engine
//!
//! This module provides safe abstractions over the Win32/NT system APIs
//! the snapshot engine pulls its data from.

mod ntapi;
mod privilege;
mod processes;
mod resmap;
mod totals;

use crate::snapshot::error::SnapshotResult;
use crate::snapshot::source::{
    BasicSystemInfo, PerformanceCounters, PhysicalRange, ProcessRecord, SystemSource,
};

/// The live system as a snapshot data source.
///
/// Stateless; every capture re-queries the platform, so concurrent captures
/// on different threads never contend over shared state.
pub struct WindowsSystemSource;

impl SystemSource for WindowsSystemSource {
    fn page_size(&self) -> u64 {
        totals::page_size()
    }

    fn physical_memory_ranges(&self) -> Option<Vec<PhysicalRange>> {
        resmap::physical_memory_ranges()
    }

    fn performance_counters(&self) -> Option<PerformanceCounters> {
        totals::performance_counters()
    }

    fn basic_info(&self) -> Option<BasicSystemInfo> {
        totals::basic_info()
    }

    fn process_records(&self) -> SnapshotResult<Vec<ProcessRecord>> {
        processes::query_process_records()
    }

    fn has_lock_pages_privilege(&self, pid: u32) -> bool {
        privilege::has_lock_pages_privilege(pid)
    }
}
