//! Binary layout of the summary buffer
//!
//! The summary is a fixed header followed immediately by a packed array of
//! process entries. All multi-byte fields are little-endian with natural
//! alignment; the offsets below mirror the on-the-wire C layout consumed by
//! existing tooling, so they must never change for version 1.

/// Format version written into every summary header
pub const SUMMARY_VERSION: u32 = 1;

/// Serialized size of the fixed summary header in bytes
pub const SUMMARY_HEADER_SIZE: usize = 56;

/// Serialized size of one process entry in bytes
pub const PROCESS_ENTRY_SIZE: usize = 176;

/// Capacity of the image-name field in UTF-16 units, terminator included
pub const IMAGE_NAME_UNITS: usize = 64;

// Header field offsets.
pub const HEADER_VERSION: usize = 0;
pub const HEADER_PROCESS_COUNT: usize = 4;
pub const HEADER_TOTAL_PHYS: usize = 8;
pub const HEADER_AVAIL_PHYS: usize = 16;
pub const HEADER_KERNEL_NON_PAGED: usize = 24;
pub const HEADER_KERNEL_PAGED: usize = 32;
pub const HEADER_SYSTEM_CACHE: usize = 40;
pub const HEADER_USES_FORENSIC_PFNS: usize = 48;
pub const HEADER_RESERVED: usize = 52;

// Entry field offsets, relative to the entry start.
pub const ENTRY_PID: usize = 0;
pub const ENTRY_IMAGE_NAME: usize = 4;
pub const ENTRY_WORKING_SET: usize = 136;
pub const ENTRY_PRIVATE: usize = 144;
pub const ENTRY_LOCKED: usize = 152;
pub const ENTRY_LARGE_PAGE: usize = 160;
pub const ENTRY_FLAGS: usize = 168;

/// Writes a little-endian u32 at the given offset.
pub fn put_u32(buffer: &mut [u8], offset: usize, value: u32) {
    buffer[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

/// Writes a little-endian u64 at the given offset.
pub fn put_u64(buffer: &mut [u8], offset: usize, value: u64) {
    buffer[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
}

/// Reads a little-endian u32 from the given offset.
pub fn get_u32(buffer: &[u8], offset: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&buffer[offset..offset + 4]);
    u32::from_le_bytes(raw)
}

/// Reads a little-endian u64 from the given offset.
pub fn get_u64(buffer: &[u8], offset: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&buffer[offset..offset + 8]);
    u64::from_le_bytes(raw)
}
