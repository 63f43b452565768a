//! Data-source abstraction for the snapshot engine
//!
//! The engine never talks to the platform directly; it pulls memory totals,
//! process records, and privilege state through this trait. The Windows
//! backend implements it over NT system-information queries; tests implement
//! it over fixed in-memory data.

use super::error::SnapshotResult;

/// One contiguous physical memory range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicalRange {
    /// Physical base address of the range
    pub base: u64,
    /// Length of the range in bytes
    pub bytes: u64,
}

impl PhysicalRange {
    /// A zero base and zero length terminates a range list.
    pub fn is_sentinel(&self) -> bool {
        self.base == 0 && self.bytes == 0
    }
}

/// System-wide counters reported in pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerformanceCounters {
    /// Pages immediately available for allocation
    pub available_pages: u64,
    /// Pages held by the non-paged kernel pool
    pub non_paged_pool_pages: u64,
    /// Pages held by the paged kernel pool
    pub paged_pool_pages: u64,
    /// Resident pages of the system file cache
    pub resident_system_cache_pages: u64,
}

/// Basic machine description used as the physical-memory fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicSystemInfo {
    /// Number of physical pages installed
    pub physical_pages: u64,
}

/// One process as reported by the system process list.
#[derive(Debug, Clone)]
pub struct ProcessRecord {
    /// Process identifier
    pub pid: u32,
    /// Executable image name; `None` for processes that have none
    pub image_name: Option<String>,
    /// Resident set size in bytes
    pub working_set_bytes: u64,
    /// Private committed bytes
    pub private_bytes: u64,
}

/// Provider of the raw system data a snapshot is built from.
///
/// Every method other than `process_records` is best-effort: an unavailable
/// source answers `None` (or `false`) and the snapshot degrades the affected
/// fields to zero instead of failing.
pub trait SystemSource {
    /// Size of a physical page in bytes.
    fn page_size(&self) -> u64;

    /// The physical memory range list, or `None` when unavailable.
    fn physical_memory_ranges(&self) -> Option<Vec<PhysicalRange>>;

    /// System performance counters, or `None` when unavailable.
    fn performance_counters(&self) -> Option<PerformanceCounters>;

    /// Basic system information, or `None` when unavailable.
    fn basic_info(&self) -> Option<BasicSystemInfo>;

    /// The full process list, in system enumeration order.
    ///
    /// This is the one source whose failure is fatal to the request.
    fn process_records(&self) -> SnapshotResult<Vec<ProcessRecord>>;

    /// Whether the process's primary token currently holds the
    /// lock-pages-in-memory privilege (enabled or enabled-by-default).
    /// Lookup failure reads as `false`, never as an error.
    fn has_lock_pages_privilege(&self, pid: u32) -> bool;
}
