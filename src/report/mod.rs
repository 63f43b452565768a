//! Report module - decoding, analysis, and rendering of a captured summary

pub mod analyze;
pub mod decode;
pub mod print;

use serde::Serialize;

use self::analyze::{rank, Finding};
use self::decode::{DecodedEntry, DecodedSummary};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonSummary {
    version: u32,
    process_count: usize,
    total_phys_bytes: u64,
    avail_phys_bytes: u64,
    kernel_non_paged_bytes: u64,
    kernel_paged_bytes: u64,
    system_cache_bytes: u64,
    uses_forensic_pfns: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    summary: JsonSummary,
    processes: &'a [DecodedEntry],
    findings: Vec<&'a Finding>,
}

/// Renders the whole report as pretty-printed JSON, findings ranked most
/// severe first.
pub fn to_json(summary: &DecodedSummary, findings: &[Finding]) -> serde_json::Result<String> {
    let report = JsonReport {
        summary: JsonSummary {
            version: summary.version,
            process_count: summary.entries.len(),
            total_phys_bytes: summary.total_phys_bytes,
            avail_phys_bytes: summary.avail_phys_bytes,
            kernel_non_paged_bytes: summary.kernel_non_paged_bytes,
            kernel_paged_bytes: summary.kernel_paged_bytes,
            system_cache_bytes: summary.system_cache_bytes,
            uses_forensic_pfns: summary.uses_forensic_pfns,
        },
        processes: &summary.entries,
        findings: rank(findings),
    };
    serde_json::to_string_pretty(&report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_report_uses_camel_case_keys() {
        let summary = DecodedSummary {
            version: 1,
            total_phys_bytes: 1 << 30,
            avail_phys_bytes: 1 << 29,
            kernel_non_paged_bytes: 0,
            kernel_paged_bytes: 0,
            system_cache_bytes: 0,
            uses_forensic_pfns: false,
            entries: vec![],
        };
        let json = to_json(&summary, &[]).unwrap();
        assert!(json.contains("\"totalPhysBytes\""));
        assert!(json.contains("\"processCount\""));
        assert!(json.contains("\"usesForensicPfns\""));
        assert!(!json.contains("total_phys_bytes"));
    }
}
