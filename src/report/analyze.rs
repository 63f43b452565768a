//! Heuristic analysis of a decoded summary
//!
//! Turns the raw snapshot into ranked findings about where physical memory
//! went. The rules target the workloads this tool exists for: SQL Server
//! holding locked or large-page memory, and WSL2/Hyper-V backing processes
//! dominating the machine.

use serde::Serialize;

use crate::constants::{
    HIDDEN_GAP_GIB_THRESHOLD, SQL_COMMIT_GAP_GIB_THRESHOLD, SQL_LOCKED_FRACTION_THRESHOLD,
    VMMEM_DOMINANCE_FRACTION,
};

use super::decode::DecodedSummary;

/// One diagnostic conclusion about the snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub id: &'static str,
    pub title: &'static str,
    pub description: String,
    pub severity: f64,
}

/// Derives findings from a decoded summary.
///
/// The hidden-gap rule only fires when nothing else did: a large gap is the
/// expected side effect of the more specific findings.
pub fn analyze(summary: &DecodedSummary) -> Vec<Finding> {
    let mut findings = Vec::new();

    let total_gib = summary.total_physical_gib();
    let in_use_gib = total_gib - summary.available_physical_gib();
    let working_set_gib: f64 = summary.entries.iter().map(|e| e.working_set_gib()).sum();
    let hidden_gap_gib = (in_use_gib - working_set_gib).max(0.0);

    let sql = summary.entries.iter().find(|e| e.is_sql_server);
    let vm = summary.entries.iter().find(|e| e.is_vmmem_or_vm);

    if let Some(sql) = sql {
        let locked_estimate_gib = sql.locked_gib() + sql.large_page_gib();
        if total_gib > 0.0 && locked_estimate_gib >= total_gib * SQL_LOCKED_FRACTION_THRESHOLD {
            findings.push(Finding {
                id: "SQL-LPIM",
                title: "SQL Server locked or large-page memory",
                description: format!(
                    "{} PID {} is estimated to hold {:.1} GiB in locked or large pages.",
                    sql.image_name, sql.pid, locked_estimate_gib
                ),
                severity: 1.0,
            });
        }

        if sql.hidden_gib() >= SQL_COMMIT_GAP_GIB_THRESHOLD {
            findings.push(Finding {
                id: "SQL-COMMIT",
                title: "SQL Server private commit greatly exceeds working set",
                description: format!(
                    "{} PID {} has {:.1} GiB of private commit beyond its working set, \
                     indicating hidden locked memory or large pages.",
                    sql.image_name, sql.pid, sql.hidden_gib()
                ),
                severity: 0.7,
            });
        }
    }

    if let Some(vm) = vm {
        if total_gib > 0.0 && vm.private_gib() >= total_gib * VMMEM_DOMINANCE_FRACTION {
            findings.push(Finding {
                id: "WSL2",
                title: "WSL2/Hyper-V memory pressure",
                description: format!(
                    "{} PID {} is consuming {:.1} GiB, a dominant share of physical memory.",
                    vm.image_name, vm.pid, vm.private_gib()
                ),
                severity: 0.9,
            });
        }
    }

    if hidden_gap_gib >= HIDDEN_GAP_GIB_THRESHOLD && findings.is_empty() {
        findings.push(Finding {
            id: "GAP",
            title: "Large gap between physical usage and working sets",
            description: format!(
                "Approximately {:.1} GiB of physical memory is unaccounted for by working \
                 sets. Inspect kernel pools or driver allocations.",
                hidden_gap_gib
            ),
            severity: 0.5,
        });
    }

    findings
}

/// Orders findings most severe first.
pub fn rank(findings: &[Finding]) -> Vec<&Finding> {
    let mut ranked: Vec<&Finding> = findings.iter().collect();
    ranked.sort_by(|a, b| b.severity.total_cmp(&a.severity));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::decode::DecodedEntry;

    const GIB: u64 = 1 << 30;

    fn entry(
        pid: u32,
        name: &str,
        working_set: u64,
        private: u64,
        locked: u64,
        large_page: u64,
    ) -> DecodedEntry {
        DecodedEntry {
            pid,
            image_name: name.to_string(),
            working_set_bytes: working_set,
            private_bytes: private,
            locked_bytes: locked,
            large_page_bytes: large_page,
            has_lock_pages_privilege: false,
            is_sql_server: name == "sqlservr.exe",
            is_vmmem_or_vm: name == "vmmem" || name == "vmwp.exe",
            locked_bytes_are_exact: false,
            large_page_bytes_are_exact: false,
        }
    }

    fn summary(total: u64, avail: u64, entries: Vec<DecodedEntry>) -> DecodedSummary {
        DecodedSummary {
            version: 1,
            total_phys_bytes: total,
            avail_phys_bytes: avail,
            kernel_non_paged_bytes: 2 * GIB,
            kernel_paged_bytes: GIB,
            system_cache_bytes: 4 * GIB,
            uses_forensic_pfns: false,
            entries,
        }
    }

    #[test]
    fn detects_sql_locked_memory() {
        let s = summary(
            128 * GIB,
            10 * GIB,
            vec![entry(100, "sqlservr.exe", 20 * GIB, 80 * GIB, 50 * GIB, 10 * GIB)],
        );
        let findings = analyze(&s);
        assert!(findings.iter().any(|f| f.id == "SQL-LPIM"));
    }

    #[test]
    fn detects_sql_commit_overhang() {
        let s = summary(
            64 * GIB,
            30 * GIB,
            vec![entry(100, "sqlservr.exe", 4 * GIB, 20 * GIB, 0, 0)],
        );
        let findings = analyze(&s);
        assert!(findings.iter().any(|f| f.id == "SQL-COMMIT"));
    }

    #[test]
    fn detects_vmmem_dominance() {
        let s = summary(
            64 * GIB,
            12 * GIB,
            vec![entry(300, "vmmem", 18 * GIB, 30 * GIB, 0, 0)],
        );
        let findings = analyze(&s);
        assert!(findings.iter().any(|f| f.id == "WSL2"));
    }

    #[test]
    fn detects_hidden_gap_when_no_culprit() {
        let s = summary(
            64 * GIB,
            8 * GIB,
            vec![entry(200, "other.exe", 10 * GIB, 12 * GIB, 0, 0)],
        );
        let findings = analyze(&s);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].id, "GAP");
    }

    #[test]
    fn gap_stays_silent_when_a_culprit_was_found() {
        let s = summary(
            64 * GIB,
            8 * GIB,
            vec![entry(300, "vmmem", 18 * GIB, 30 * GIB, 0, 0)],
        );
        let findings = analyze(&s);
        assert!(findings.iter().any(|f| f.id == "WSL2"));
        assert!(!findings.iter().any(|f| f.id == "GAP"));
    }

    #[test]
    fn healthy_summary_produces_no_findings() {
        let s = summary(
            16 * GIB,
            8 * GIB,
            vec![entry(400, "notepad.exe", 7 * GIB, 7 * GIB, 0, 0)],
        );
        assert!(analyze(&s).is_empty());
    }

    #[test]
    fn rank_orders_by_severity() {
        let s = summary(
            64 * GIB,
            4 * GIB,
            vec![
                entry(100, "sqlservr.exe", 4 * GIB, 20 * GIB, 0, 0),
                entry(300, "vmmem", 18 * GIB, 30 * GIB, 0, 0),
            ],
        );
        let findings = analyze(&s);
        let ranked = rank(&findings);
        assert_eq!(ranked[0].id, "WSL2");
        assert_eq!(ranked[1].id, "SQL-COMMIT");
    }
}
