//! Image-name classification
//!
//! Identifies the workloads the diagnostic cares about by comparing the base
//! image name (path and drive components stripped) against well-known
//! executable names, case-insensitively.

use crate::constants::{SQL_SERVER_IMAGE, VMMEM_IMAGE, VMWP_IMAGE};

/// Returns the filename portion of an image name.
///
/// Text after the last `\`, `/`, or `:` separator; the full input when no
/// separator is present. A trailing separator yields an empty base name.
pub fn base_image_name(image_name: &str) -> &str {
    image_name
        .rsplit(['\\', '/', ':'])
        .next()
        .unwrap_or(image_name)
}

fn base_name_equals(image_name: &str, target: &str) -> bool {
    let base = base_image_name(image_name);
    !base.is_empty() && base.eq_ignore_ascii_case(target)
}

/// Whether the image is the SQL Server database engine.
pub fn is_sql_server(image_name: &str) -> bool {
    base_name_equals(image_name, SQL_SERVER_IMAGE)
}

/// Whether the image is one of the virtualization host helpers
/// (WSL2/Hyper-V vmmem, or the Hyper-V worker process).
pub fn is_vmmem_or_vm(image_name: &str) -> bool {
    base_name_equals(image_name, VMMEM_IMAGE) || base_name_equals(image_name, VMWP_IMAGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_path_components() {
        assert_eq!(
            base_image_name("C:\\Program Files\\MSSQL\\sqlservr.exe"),
            "sqlservr.exe"
        );
        assert_eq!(base_image_name("bin/vmwp.exe"), "vmwp.exe");
        assert_eq!(base_image_name("C:sqlservr.exe"), "sqlservr.exe");
        assert_eq!(base_image_name("vmmem"), "vmmem");
    }

    #[test]
    fn sql_server_match_is_case_insensitive_and_path_stripped() {
        assert!(is_sql_server("sqlservr.exe"));
        assert!(is_sql_server("SQLSERVR.EXE"));
        assert!(is_sql_server("C:\\Program Files\\MSSQL\\sqlservr.exe"));
        assert!(!is_sql_server("notsqlservr.exe"));
        assert!(!is_sql_server("sqlservr.exe.bak"));
    }

    #[test]
    fn vm_match_covers_both_helpers() {
        assert!(is_vmmem_or_vm("vmmem"));
        assert!(is_vmmem_or_vm("VmMem"));
        assert!(is_vmmem_or_vm("D:\\Hyper-V\\vmwp.exe"));
        assert!(!is_vmmem_or_vm("vmmem.exe"));
        assert!(!is_vmmem_or_vm("sqlservr.exe"));
    }

    #[test]
    fn empty_and_separator_only_names_match_nothing() {
        assert!(!is_sql_server(""));
        assert!(!is_vmmem_or_vm(""));
        assert!(!is_sql_server("C:\\path\\"));
    }
}
