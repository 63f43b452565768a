//! Incremental, bounded serialization of the summary buffer
//!
//! The writer owns the output layout: it writes the fixed header once, then
//! appends entries one at a time, checking remaining capacity exactly once
//! per append. An entry is either written whole or not at all; the bytes of
//! a rejected entry's slot are never touched.

use super::entry::ProcessEntry;
use super::error::{SnapshotError, SnapshotResult};
use super::layout::{
    ENTRY_FLAGS, ENTRY_IMAGE_NAME, ENTRY_LARGE_PAGE, ENTRY_LOCKED, ENTRY_PID, ENTRY_PRIVATE,
    ENTRY_WORKING_SET, HEADER_AVAIL_PHYS, HEADER_KERNEL_NON_PAGED, HEADER_KERNEL_PAGED,
    HEADER_PROCESS_COUNT, HEADER_RESERVED, HEADER_SYSTEM_CACHE, HEADER_TOTAL_PHYS,
    HEADER_USES_FORENSIC_PFNS, HEADER_VERSION, IMAGE_NAME_UNITS, PROCESS_ENTRY_SIZE,
    SUMMARY_HEADER_SIZE, SUMMARY_VERSION,
};
use super::totals::MemoryTotals;

/// Serializes one summary into a caller-supplied buffer.
pub struct SummaryWriter<'a> {
    buffer: &'a mut [u8],
    entries_written: u32,
}

impl<'a> SummaryWriter<'a> {
    /// Wraps a caller buffer, rejecting one that cannot hold the header.
    pub fn new(buffer: &'a mut [u8]) -> SnapshotResult<Self> {
        if buffer.len() < SUMMARY_HEADER_SIZE {
            return Err(SnapshotError::BufferTooSmall);
        }
        Ok(Self { buffer, entries_written: 0 })
    }

    /// Writes the fixed header with the given totals and a zero entry count.
    pub fn write_header(&mut self, totals: &MemoryTotals) {
        use super::layout::{put_u32, put_u64};

        self.buffer[..SUMMARY_HEADER_SIZE].fill(0);
        put_u32(self.buffer, HEADER_VERSION, SUMMARY_VERSION);
        put_u32(self.buffer, HEADER_PROCESS_COUNT, 0);
        put_u64(self.buffer, HEADER_TOTAL_PHYS, totals.total_phys_bytes);
        put_u64(self.buffer, HEADER_AVAIL_PHYS, totals.avail_phys_bytes);
        put_u64(self.buffer, HEADER_KERNEL_NON_PAGED, totals.kernel_non_paged_bytes);
        put_u64(self.buffer, HEADER_KERNEL_PAGED, totals.kernel_paged_bytes);
        put_u64(self.buffer, HEADER_SYSTEM_CACHE, totals.system_cache_bytes);
        self.buffer[HEADER_USES_FORENSIC_PFNS] = 0;
        put_u32(self.buffer, HEADER_RESERVED, 0);
    }

    /// Appends one entry, or reports that the buffer is out of room.
    ///
    /// On `BufferTooSmall` nothing past the already-written entries has been
    /// modified, so the caller can stop enumerating immediately.
    pub fn append(&mut self, entry: &ProcessEntry) -> SnapshotResult<()> {
        let required =
            SUMMARY_HEADER_SIZE + (self.entries_written as usize + 1) * PROCESS_ENTRY_SIZE;
        if required > self.buffer.len() {
            return Err(SnapshotError::BufferTooSmall);
        }

        let offset = SUMMARY_HEADER_SIZE + self.entries_written as usize * PROCESS_ENTRY_SIZE;
        encode_entry(&mut self.buffer[offset..offset + PROCESS_ENTRY_SIZE], entry);
        self.entries_written += 1;
        Ok(())
    }

    /// Patches the final entry count and returns the bytes used.
    pub fn finish(self) -> usize {
        super::layout::put_u32(self.buffer, HEADER_PROCESS_COUNT, self.entries_written);
        SUMMARY_HEADER_SIZE + self.entries_written as usize * PROCESS_ENTRY_SIZE
    }
}

fn encode_entry(slot: &mut [u8], entry: &ProcessEntry) {
    use super::layout::{put_u32, put_u64};

    slot.fill(0);
    put_u32(slot, ENTRY_PID, entry.pid);
    encode_image_name(slot, &entry.image_name);
    put_u64(slot, ENTRY_WORKING_SET, entry.working_set_bytes);
    put_u64(slot, ENTRY_PRIVATE, entry.private_bytes);
    put_u64(slot, ENTRY_LOCKED, entry.locked_bytes);
    put_u64(slot, ENTRY_LARGE_PAGE, entry.large_page_bytes);
    slot[ENTRY_FLAGS] = entry.has_lock_pages_privilege as u8;
    slot[ENTRY_FLAGS + 1] = entry.is_sql_server as u8;
    slot[ENTRY_FLAGS + 2] = entry.is_vmmem_or_vm as u8;
    slot[ENTRY_FLAGS + 3] = entry.locked_bytes_are_exact as u8;
    slot[ENTRY_FLAGS + 4] = entry.large_page_bytes_are_exact as u8;
}

/// Stores at most `IMAGE_NAME_UNITS - 1` UTF-16 units; the slot is already
/// zeroed, so the terminator and tail padding come for free.
fn encode_image_name(slot: &mut [u8], name: &str) {
    for (index, unit) in name.encode_utf16().take(IMAGE_NAME_UNITS - 1).enumerate() {
        let at = ENTRY_IMAGE_NAME + index * 2;
        slot[at..at + 2].copy_from_slice(&unit.to_le_bytes());
    }
}
