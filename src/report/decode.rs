//! Summary buffer decoding
//!
//! Parses the binary summary a capture produced back into owned records.
//! The version tag is checked before anything else is interpreted, and no
//! input, however malformed, may cause a panic.

use std::fmt;

use serde::Serialize;

use crate::constants::{BYTES_PER_GIB, UNNAMED_IMAGE};
use crate::snapshot::layout::{
    get_u32, get_u64, ENTRY_FLAGS, ENTRY_IMAGE_NAME, ENTRY_LARGE_PAGE, ENTRY_LOCKED, ENTRY_PID,
    ENTRY_PRIVATE, ENTRY_WORKING_SET, HEADER_AVAIL_PHYS, HEADER_KERNEL_NON_PAGED,
    HEADER_KERNEL_PAGED, HEADER_PROCESS_COUNT, HEADER_SYSTEM_CACHE, HEADER_TOTAL_PHYS,
    HEADER_USES_FORENSIC_PFNS, HEADER_VERSION, IMAGE_NAME_UNITS, PROCESS_ENTRY_SIZE,
    SUMMARY_HEADER_SIZE, SUMMARY_VERSION,
};

// ============================================================================
// Decode Error
// ============================================================================

/// Errors raised while decoding a summary buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer cannot even hold the fixed header
    BufferTooSmall,

    /// The version tag does not match this decoder
    UnsupportedVersion {
        /// Version found in the header
        found: u32,
    },

    /// The declared entry count extends past the end of the buffer
    TruncatedEntries {
        /// Bytes the declared count requires
        expected: usize,
        /// Bytes actually present
        available: usize,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::BufferTooSmall => {
                write!(f, "Summary buffer is smaller than the fixed header")
            }
            DecodeError::UnsupportedVersion { found } => {
                write!(f, "Incompatible summary version {}", found)
            }
            DecodeError::TruncatedEntries { expected, available } => {
                write!(
                    f,
                    "Summary truncated before all entries could be read ({} of {} bytes)",
                    available, expected
                )
            }
        }
    }
}

impl std::error::Error for DecodeError {}

// ============================================================================
// Decoded records
// ============================================================================

/// One decoded process entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedEntry {
    pub pid: u32,
    pub image_name: String,
    pub working_set_bytes: u64,
    pub private_bytes: u64,
    pub locked_bytes: u64,
    pub large_page_bytes: u64,
    pub has_lock_pages_privilege: bool,
    pub is_sql_server: bool,
    pub is_vmmem_or_vm: bool,
    pub locked_bytes_are_exact: bool,
    pub large_page_bytes_are_exact: bool,
}

impl DecodedEntry {
    pub fn working_set_gib(&self) -> f64 {
        bytes_to_gib(self.working_set_bytes)
    }

    pub fn private_gib(&self) -> f64 {
        bytes_to_gib(self.private_bytes)
    }

    pub fn locked_gib(&self) -> f64 {
        bytes_to_gib(self.locked_bytes)
    }

    pub fn large_page_gib(&self) -> f64 {
        bytes_to_gib(self.large_page_bytes)
    }

    /// Private commit beyond the working set, clamped at zero; memory the
    /// process holds that resident accounting cannot see.
    pub fn hidden_gib(&self) -> f64 {
        bytes_to_gib(self.private_bytes.saturating_sub(self.working_set_bytes))
    }
}

/// One decoded snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSummary {
    pub version: u32,
    pub total_phys_bytes: u64,
    pub avail_phys_bytes: u64,
    pub kernel_non_paged_bytes: u64,
    pub kernel_paged_bytes: u64,
    pub system_cache_bytes: u64,
    pub uses_forensic_pfns: bool,
    pub entries: Vec<DecodedEntry>,
}

impl DecodedSummary {
    pub fn total_physical_gib(&self) -> f64 {
        bytes_to_gib(self.total_phys_bytes)
    }

    pub fn available_physical_gib(&self) -> f64 {
        bytes_to_gib(self.avail_phys_bytes)
    }

    pub fn kernel_non_paged_gib(&self) -> f64 {
        bytes_to_gib(self.kernel_non_paged_bytes)
    }

    pub fn kernel_paged_gib(&self) -> f64 {
        bytes_to_gib(self.kernel_paged_bytes)
    }

    pub fn system_cache_gib(&self) -> f64 {
        bytes_to_gib(self.system_cache_bytes)
    }
}

fn bytes_to_gib(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_GIB
}

// ============================================================================
// Decoding
// ============================================================================

/// Decodes a summary buffer, version tag first.
pub fn decode_summary(data: &[u8]) -> Result<DecodedSummary, DecodeError> {
    if data.len() < SUMMARY_HEADER_SIZE {
        return Err(DecodeError::BufferTooSmall);
    }

    let version = get_u32(data, HEADER_VERSION);
    if version != SUMMARY_VERSION {
        return Err(DecodeError::UnsupportedVersion { found: version });
    }

    let count = get_u32(data, HEADER_PROCESS_COUNT) as usize;
    let expected = count
        .checked_mul(PROCESS_ENTRY_SIZE)
        .and_then(|entries| entries.checked_add(SUMMARY_HEADER_SIZE))
        .ok_or(DecodeError::TruncatedEntries { expected: usize::MAX, available: data.len() })?;
    if data.len() < expected {
        return Err(DecodeError::TruncatedEntries { expected, available: data.len() });
    }

    let entries = (0..count)
        .map(|index| {
            let offset = SUMMARY_HEADER_SIZE + index * PROCESS_ENTRY_SIZE;
            decode_entry(&data[offset..offset + PROCESS_ENTRY_SIZE])
        })
        .collect();

    Ok(DecodedSummary {
        version,
        total_phys_bytes: get_u64(data, HEADER_TOTAL_PHYS),
        avail_phys_bytes: get_u64(data, HEADER_AVAIL_PHYS),
        kernel_non_paged_bytes: get_u64(data, HEADER_KERNEL_NON_PAGED),
        kernel_paged_bytes: get_u64(data, HEADER_KERNEL_PAGED),
        system_cache_bytes: get_u64(data, HEADER_SYSTEM_CACHE),
        uses_forensic_pfns: data[HEADER_USES_FORENSIC_PFNS] != 0,
        entries,
    })
}

fn decode_entry(slot: &[u8]) -> DecodedEntry {
    DecodedEntry {
        pid: get_u32(slot, ENTRY_PID),
        image_name: decode_image_name(slot),
        working_set_bytes: get_u64(slot, ENTRY_WORKING_SET),
        private_bytes: get_u64(slot, ENTRY_PRIVATE),
        locked_bytes: get_u64(slot, ENTRY_LOCKED),
        large_page_bytes: get_u64(slot, ENTRY_LARGE_PAGE),
        has_lock_pages_privilege: slot[ENTRY_FLAGS] != 0,
        is_sql_server: slot[ENTRY_FLAGS + 1] != 0,
        is_vmmem_or_vm: slot[ENTRY_FLAGS + 2] != 0,
        locked_bytes_are_exact: slot[ENTRY_FLAGS + 3] != 0,
        large_page_bytes_are_exact: slot[ENTRY_FLAGS + 4] != 0,
    }
}

fn decode_image_name(slot: &[u8]) -> String {
    let units: Vec<u16> = (0..IMAGE_NAME_UNITS)
        .map(|index| {
            let at = ENTRY_IMAGE_NAME + index * 2;
            u16::from_le_bytes([slot[at], slot[at + 1]])
        })
        .take_while(|&unit| unit != 0)
        .collect();

    let name = String::from_utf16_lossy(&units);
    if name.trim().is_empty() {
        UNNAMED_IMAGE.to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::entry::ProcessEntry;
    use crate::snapshot::layout::put_u32;
    use crate::snapshot::source::ProcessRecord;
    use crate::snapshot::totals::MemoryTotals;
    use crate::snapshot::writer::SummaryWriter;

    fn written_summary(names: &[&str]) -> Vec<u8> {
        let mut buffer = vec![0u8; SUMMARY_HEADER_SIZE + names.len() * PROCESS_ENTRY_SIZE];
        let mut writer = SummaryWriter::new(&mut buffer).unwrap();
        writer.write_header(&MemoryTotals {
            total_phys_bytes: 16 << 30,
            avail_phys_bytes: 4 << 30,
            kernel_non_paged_bytes: 1 << 30,
            kernel_paged_bytes: 2 << 30,
            system_cache_bytes: 3 << 30,
        });
        for (index, name) in names.iter().enumerate() {
            let record = ProcessRecord {
                pid: index as u32 + 1,
                image_name: (!name.is_empty()).then(|| name.to_string()),
                working_set_bytes: 1 << 20,
                private_bytes: 2 << 20,
            };
            writer.append(&ProcessEntry::from_record(&record, false)).unwrap();
        }
        let used = writer.finish();
        buffer.truncate(used);
        buffer
    }

    #[test]
    fn decodes_a_written_summary() {
        let data = written_summary(&["sqlservr.exe", "vmmem"]);
        let summary = decode_summary(&data).unwrap();
        assert_eq!(summary.version, SUMMARY_VERSION);
        assert_eq!(summary.total_phys_bytes, 16 << 30);
        assert_eq!(summary.entries.len(), 2);
        assert_eq!(summary.entries[0].image_name, "sqlservr.exe");
        assert!(summary.entries[0].is_sql_server);
        assert!(summary.entries[1].is_vmmem_or_vm);
        assert!(!summary.uses_forensic_pfns);
    }

    #[test]
    fn short_buffers_are_rejected() {
        let data = written_summary(&[]);
        assert_eq!(
            decode_summary(&data[..SUMMARY_HEADER_SIZE - 1]),
            Err(DecodeError::BufferTooSmall)
        );
    }

    #[test]
    fn version_is_checked_before_entries() {
        let mut data = written_summary(&["a.exe"]);
        put_u32(&mut data, HEADER_VERSION, 9);
        assert_eq!(
            decode_summary(&data),
            Err(DecodeError::UnsupportedVersion { found: 9 })
        );
    }

    #[test]
    fn declared_count_past_the_end_is_truncation() {
        let mut data = written_summary(&["a.exe"]);
        put_u32(&mut data, HEADER_PROCESS_COUNT, 3);
        assert!(matches!(
            decode_summary(&data),
            Err(DecodeError::TruncatedEntries { .. })
        ));
    }

    #[test]
    fn blank_names_present_as_unnamed() {
        // A record without a name is stored as the "<System>" sentinel, so a
        // truly blank name can only come from a foreign writer; fabricate one.
        let mut data = written_summary(&["placeholder.exe"]);
        for byte in
            &mut data[SUMMARY_HEADER_SIZE + ENTRY_IMAGE_NAME..SUMMARY_HEADER_SIZE + ENTRY_WORKING_SET]
        {
            *byte = 0;
        }
        let summary = decode_summary(&data).unwrap();
        assert_eq!(summary.entries[0].image_name, "<unnamed>");
    }

    #[test]
    fn hidden_gib_clamps_at_zero() {
        let entry = DecodedEntry {
            pid: 1,
            image_name: "x.exe".into(),
            working_set_bytes: 8 << 30,
            private_bytes: 1 << 30,
            locked_bytes: 0,
            large_page_bytes: 0,
            has_lock_pages_privilege: false,
            is_sql_server: false,
            is_vmmem_or_vm: false,
            locked_bytes_are_exact: false,
            large_page_bytes_are_exact: false,
        };
        assert_eq!(entry.hidden_gib(), 0.0);
    }
}
