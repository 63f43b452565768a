//! System-wide memory counters via NtQuerySystemInformation
//!
//! Both queries here are best-effort: any failure answers `None` and the
//! snapshot degrades the affected header fields to zero.

use std::mem;
use std::ptr;

use windows::Win32::Foundation::STATUS_INFO_LENGTH_MISMATCH;

use crate::constants::FALLBACK_PAGE_SIZE;
use crate::snapshot::source::{BasicSystemInfo, PerformanceCounters};

use super::ntapi::{
    nt_query_system_information, SystemBasicInformation, SystemPerformanceInformation,
    SYSTEM_BASIC_INFORMATION, SYSTEM_PERFORMANCE_INFORMATION,
};

// Oversized so the prefix read stays valid as the kernel structure grows.
const PERF_BUFFER_LEN: usize = 512;

/// Queries basic system information (page size, physical page count).
pub fn query_basic_info() -> Option<SYSTEM_BASIC_INFORMATION> {
    let query = nt_query_system_information()?;
    let mut info = SYSTEM_BASIC_INFORMATION::default();
    let mut needed: u32 = 0;
    // SAFETY: The output buffer is exactly the structure we pass the size of.
    let status = unsafe {
        query(
            SystemBasicInformation,
            (&mut info as *mut SYSTEM_BASIC_INFORMATION).cast(),
            mem::size_of::<SYSTEM_BASIC_INFORMATION>() as u32,
            &mut needed,
        )
    };
    status.is_ok().then_some(info)
}

/// The machine page size, or the conventional 4 KiB when unavailable.
pub fn page_size() -> u64 {
    match query_basic_info() {
        Some(info) if info.PageSize != 0 => u64::from(info.PageSize),
        _ => FALLBACK_PAGE_SIZE,
    }
}

/// Physical page count from basic information.
pub fn basic_info() -> Option<BasicSystemInfo> {
    query_basic_info().map(|info| BasicSystemInfo {
        physical_pages: u64::from(info.NumberOfPhysicalPages),
    })
}

/// Page-denominated pool, cache, and availability counters.
///
/// The performance structure's size varies across Windows releases, so the
/// query runs against an oversized buffer and retries once at the exact
/// size the kernel reports if it insists on a match.
pub fn performance_counters() -> Option<PerformanceCounters> {
    let query = nt_query_system_information()?;

    let mut buffer = vec![0u8; PERF_BUFFER_LEN];
    let mut needed: u32 = 0;
    // SAFETY: The buffer is writable for the length passed.
    let mut status = unsafe {
        query(
            SystemPerformanceInformation,
            buffer.as_mut_ptr().cast(),
            buffer.len() as u32,
            &mut needed,
        )
    };

    if status == STATUS_INFO_LENGTH_MISMATCH && needed as usize >= prefix_len() {
        buffer = vec![0u8; needed as usize];
        // SAFETY: Same contract, at the size the kernel asked for.
        status = unsafe {
            query(
                SystemPerformanceInformation,
                buffer.as_mut_ptr().cast(),
                buffer.len() as u32,
                &mut needed,
            )
        };
    }

    if !status.is_ok() || buffer.len() < prefix_len() {
        return None;
    }

    // SAFETY: The buffer holds at least the declared prefix of the
    // kernel-filled structure; an unaligned read copies it out.
    let info: SYSTEM_PERFORMANCE_INFORMATION =
        unsafe { ptr::read_unaligned(buffer.as_ptr().cast()) };

    Some(PerformanceCounters {
        available_pages: u64::from(info.AvailablePages),
        non_paged_pool_pages: u64::from(info.NonPagedPoolPages),
        paged_pool_pages: u64::from(info.PagedPoolPages),
        resident_system_cache_pages: u64::from(info.ResidentSystemCachePage),
    })
}

fn prefix_len() -> usize {
    mem::size_of::<SYSTEM_PERFORMANCE_INFORMATION>()
}
