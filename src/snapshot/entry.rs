//! Per-process snapshot entry

use crate::constants::SYSTEM_IMAGE_SENTINEL;

use super::classify;
use super::source::ProcessRecord;

/// One process's record within a snapshot.
///
/// `locked_bytes` and `large_page_bytes` are reserved accounting slots; the
/// collector writes them as zero with their exactness flags cleared, marking
/// them as low-confidence placeholders rather than measurements.
#[derive(Debug, Clone)]
pub struct ProcessEntry {
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

impl ProcessEntry {
    /// Builds an entry from a raw process record.
    ///
    /// A record without an image name receives the `"<System>"` sentinel and
    /// matches neither workload classification. Classification always runs
    /// against the record's full name, before any storage truncation.
    pub fn from_record(record: &ProcessRecord, has_lock_pages_privilege: bool) -> Self {
        let (image_name, is_sql_server, is_vmmem_or_vm) = match record.image_name.as_deref() {
            Some(name) if !name.is_empty() => (
                name.to_string(),
                classify::is_sql_server(name),
                classify::is_vmmem_or_vm(name),
            ),
            _ => (SYSTEM_IMAGE_SENTINEL.to_string(), false, false),
        };

        Self {
            pid: record.pid,
            image_name,
            working_set_bytes: record.working_set_bytes,
            private_bytes: record.private_bytes,
            locked_bytes: 0,
            large_page_bytes: 0,
            has_lock_pages_privilege,
            is_sql_server,
            is_vmmem_or_vm,
            locked_bytes_are_exact: false,
            large_page_bytes_are_exact: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pid: u32, name: Option<&str>) -> ProcessRecord {
        ProcessRecord {
            pid,
            image_name: name.map(str::to_string),
            working_set_bytes: 1,
            private_bytes: 2,
        }
    }

    #[test]
    fn nameless_record_gets_the_system_sentinel() {
        let entry = ProcessEntry::from_record(&record(0, None), false);
        assert_eq!(entry.image_name, "<System>");
        assert!(!entry.is_sql_server);
        assert!(!entry.is_vmmem_or_vm);
    }

    #[test]
    fn empty_name_is_treated_as_absent() {
        let entry = ProcessEntry::from_record(&record(8, Some("")), false);
        assert_eq!(entry.image_name, "<System>");
    }

    #[test]
    fn classifies_from_the_path_qualified_name() {
        let entry = ProcessEntry::from_record(
            &record(1234, Some("C:\\Program Files\\MSSQL\\sqlservr.exe")),
            true,
        );
        assert!(entry.is_sql_server);
        assert!(!entry.is_vmmem_or_vm);
        assert!(entry.has_lock_pages_privilege);
    }

    #[test]
    fn reserved_accounting_is_zero_and_inexact() {
        let entry = ProcessEntry::from_record(&record(1, Some("vmmem")), false);
        assert!(entry.is_vmmem_or_vm);
        assert_eq!(entry.locked_bytes, 0);
        assert_eq!(entry.large_page_bytes, 0);
        assert!(!entry.locked_bytes_are_exact);
        assert!(!entry.large_page_bytes_are_exact);
    }
}
