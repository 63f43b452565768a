//! Hand-rolled bindings for the NT system-information API
//!
//! `NtQuerySystemInformation` and the information structures below are not
//! part of the documented Win32 surface, so the function is resolved from
//! ntdll.dll at runtime and the structures are declared locally. Field
//! order and widths must match the x86-64 kernel layout exactly; only the
//! fields this crate reads are named meaningfully.
#![allow(non_snake_case)]
#![allow(non_camel_case_types)]
#![allow(non_upper_case_globals)]
#![allow(dead_code)]

use windows::core::PCSTR;
use windows::Win32::Foundation::{HANDLE, NTSTATUS, UNICODE_STRING};
use windows::Win32::System::LibraryLoader::{GetModuleHandleA, GetProcAddress};

pub const SystemBasicInformation: u32 = 0;
pub const SystemPerformanceInformation: u32 = 2;
pub const SystemProcessInformation: u32 = 5;

/// Signature of ntdll!NtQuerySystemInformation
pub type NtQuerySystemInformationFn = unsafe extern "system" fn(
    system_information_class: u32,
    system_information: *mut core::ffi::c_void,
    system_information_length: u32,
    return_length: *mut u32,
) -> NTSTATUS;

/// Resolves NtQuerySystemInformation from ntdll.dll.
pub fn nt_query_system_information() -> Option<NtQuerySystemInformationFn> {
    unsafe {
        let module = GetModuleHandleA(PCSTR(b"ntdll.dll\0".as_ptr())).ok()?;
        let proc = GetProcAddress(module, PCSTR(b"NtQuerySystemInformation\0".as_ptr()))?;
        Some(std::mem::transmute(proc))
    }
}

/// SYSTEM_BASIC_INFORMATION (information class 0)
#[repr(C)]
#[derive(Default, Clone, Copy)]
pub struct SYSTEM_BASIC_INFORMATION {
    pub Reserved: u32,
    pub TimerResolution: u32,
    pub PageSize: u32,
    pub NumberOfPhysicalPages: u32,
    pub LowestPhysicalPageNumber: u32,
    pub HighestPhysicalPageNumber: u32,
    pub AllocationGranularity: u32,
    pub MinimumUserModeAddress: usize,
    pub MaximumUserModeAddress: usize,
    pub ActiveProcessorsAffinityMask: usize,
    pub NumberOfProcessors: i8,
}

/// Leading fields of SYSTEM_PERFORMANCE_INFORMATION (information class 2).
///
/// The kernel structure keeps growing across releases; callers query into an
/// oversized byte buffer and read this prefix from it, so only the fields up
/// to the resident-page counters need to be declared.
#[repr(C)]
#[derive(Default, Clone, Copy)]
pub struct SYSTEM_PERFORMANCE_INFORMATION {
    pub IdleProcessTime: i64,
    pub IoReadTransferCount: i64,
    pub IoWriteTransferCount: i64,
    pub IoOtherTransferCount: i64,
    pub IoReadOperationCount: u32,
    pub IoWriteOperationCount: u32,
    pub IoOtherOperationCount: u32,
    pub AvailablePages: u32,
    pub CommittedPages: u32,
    pub CommitLimit: u32,
    pub PeakCommitment: u32,
    pub PageFaultCount: u32,
    pub CopyOnWriteCount: u32,
    pub TransitionCount: u32,
    pub CacheTransitionCount: u32,
    pub DemandZeroCount: u32,
    pub PageReadCount: u32,
    pub PageReadIoCount: u32,
    pub CacheReadCount: u32,
    pub CacheIoCount: u32,
    pub DirtyPagesWriteCount: u32,
    pub DirtyWriteIoCount: u32,
    pub MappedPagesWriteCount: u32,
    pub MappedWriteIoCount: u32,
    pub PagedPoolPages: u32,
    pub NonPagedPoolPages: u32,
    pub PagedPoolAllocs: u32,
    pub PagedPoolFrees: u32,
    pub NonPagedPoolAllocs: u32,
    pub NonPagedPoolFrees: u32,
    pub FreeSystemPtes: u32,
    pub ResidentSystemCodePage: u32,
    pub TotalSystemDriverPages: u32,
    pub TotalSystemCodePages: u32,
    pub NonPagedPoolLookasideHits: u32,
    pub PagedPoolLookasideHits: u32,
    pub AvailablePagedPoolPages: u32,
    pub ResidentSystemCachePage: u32,
    pub ResidentPagedPoolPage: u32,
    pub ResidentSystemDriverPage: u32,
}

/// SYSTEM_PROCESS_INFORMATION (information class 5), one variable-length
/// record per process; `NextEntryOffset` chains records, zero terminates.
#[repr(C)]
pub struct SYSTEM_PROCESS_INFORMATION {
    pub NextEntryOffset: u32,
    pub NumberOfThreads: u32,
    pub WorkingSetPrivateSize: i64,
    pub HardFaultCount: u32,
    pub NumberOfThreadsHighWatermark: u32,
    pub CycleTime: u64,
    pub CreateTime: i64,
    pub UserTime: i64,
    pub KernelTime: i64,
    pub ImageName: UNICODE_STRING,
    pub BasePriority: i32,
    pub UniqueProcessId: HANDLE,
    pub InheritedFromUniqueProcessId: HANDLE,
    pub HandleCount: u32,
    pub SessionId: u32,
    pub UniqueProcessKey: usize,
    pub PeakVirtualSize: usize,
    pub VirtualSize: usize,
    pub PageFaultCount: u32,
    pub PeakWorkingSetSize: usize,
    pub WorkingSetSize: usize,
    pub QuotaPeakPagedPoolUsage: usize,
    pub QuotaPagedPoolUsage: usize,
    pub QuotaPeakNonPagedPoolUsage: usize,
    pub QuotaNonPagedPoolUsage: usize,
    pub PagefileUsage: usize,
    pub PeakPagefileUsage: usize,
    pub PrivatePageCount: usize,
    pub ReadOperationCount: i64,
    pub WriteOperationCount: i64,
    pub OtherOperationCount: i64,
    pub ReadTransferCount: i64,
    pub WriteTransferCount: i64,
    pub OtherTransferCount: i64,
}
