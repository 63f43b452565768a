//! Process list enumeration via NtQuerySystemInformation
//!
//! The process-information query does not accept a size probe up front: it
//! fails with STATUS_INFO_LENGTH_MISMATCH and a size hint when the buffer is
//! too small, so the query runs inside the resizing probe loop. The scratch
//! buffer is u64-backed to satisfy the record alignment the kernel assumes.

use tracing::debug;

use windows::Win32::Foundation::{STATUS_INFO_LENGTH_MISMATCH, UNICODE_STRING};

use crate::constants::{INITIAL_PROCESS_LIST_BYTES, PROCESS_LIST_RESIZE_MARGIN};
use crate::snapshot::error::{SnapshotError, SnapshotResult};
use crate::snapshot::probe::{probe_with_resize, ProbeStatus};
use crate::snapshot::source::ProcessRecord;

use super::ntapi::{
    nt_query_system_information, SystemProcessInformation, SYSTEM_PROCESS_INFORMATION,
};

/// Queries the system process list and flattens it into records.
///
/// Failure to obtain the list (after resize retries) is fatal for the whole
/// snapshot; the caller maps it onto the request status unchanged.
pub fn query_process_records() -> SnapshotResult<Vec<ProcessRecord>> {
    let query = nt_query_system_information().ok_or(SnapshotError::NtdllLoadFailed {
        function: "NtQuerySystemInformation",
    })?;

    let mut scratch: Vec<u64> = Vec::new();
    probe_with_resize(
        INITIAL_PROCESS_LIST_BYTES,
        PROCESS_LIST_RESIZE_MARGIN,
        |capacity| {
            scratch.clear();
            let words = capacity.div_ceil(8);
            if scratch.try_reserve_exact(words).is_err() {
                return ProbeStatus::Failed(SnapshotError::InsufficientResources);
            }
            scratch.resize(words, 0);

            let mut needed: u32 = 0;
            // SAFETY: The buffer is writable for `capacity` bytes and
            // 8-byte aligned; the kernel writes at most `capacity` bytes.
            let status = unsafe {
                query(
                    SystemProcessInformation,
                    scratch.as_mut_ptr().cast(),
                    capacity as u32,
                    &mut needed,
                )
            };

            if status == STATUS_INFO_LENGTH_MISMATCH {
                debug!(capacity, needed, "process list buffer too small; resizing");
                ProbeStatus::NeedsCapacity(needed as usize)
            } else if status.is_ok() {
                ProbeStatus::Complete
            } else {
                ProbeStatus::Failed(SnapshotError::QueryFailed {
                    api: "NtQuerySystemInformation",
                    status: status.0,
                })
            }
        },
    )?;

    Ok(walk_record_list(&scratch))
}

/// Walks the chained variable-length records in the filled scratch buffer.
fn walk_record_list(scratch: &[u64]) -> Vec<ProcessRecord> {
    let base = scratch.as_ptr() as *const u8;
    let mut records = Vec::new();
    let mut offset = 0usize;

    loop {
        // SAFETY: Offsets come from the kernel-filled record chain, which
        // stays inside the buffer the query succeeded into; the base pointer
        // is 8-byte aligned and NextEntryOffset preserves record alignment.
        let info = unsafe { &*(base.add(offset) as *const SYSTEM_PROCESS_INFORMATION) };

        records.push(ProcessRecord {
            pid: info.UniqueProcessId.0 as usize as u32,
            image_name: read_image_name(&info.ImageName),
            working_set_bytes: info.WorkingSetSize as u64,
            private_bytes: info.PrivatePageCount as u64,
        });

        if info.NextEntryOffset == 0 {
            break;
        }
        offset += info.NextEntryOffset as usize;
    }

    records
}

/// Copies a counted UTF-16 image name out of the record buffer.
fn read_image_name(name: &UNICODE_STRING) -> Option<String> {
    if name.Buffer.0.is_null() || name.Length == 0 {
        return None;
    }
    // SAFETY: The buffer pointer targets `Length` bytes of UTF-16 inside the
    // same kernel-filled allocation the record came from.
    let units =
        unsafe { std::slice::from_raw_parts(name.Buffer.0, (name.Length / 2) as usize) };
    Some(String::from_utf16_lossy(units))
}
