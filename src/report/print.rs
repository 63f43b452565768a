//! Terminal rendering of the diagnostic report

use std::io;

use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};

use super::analyze::{rank, Finding};
use super::decode::{DecodedEntry, DecodedSummary};

/// Picks a color for a finding by its severity.
fn severity_color(severity: f64) -> Color {
    if severity >= 0.9 {
        Color::Red
    } else if severity >= 0.7 {
        Color::Yellow
    } else {
        Color::White
    }
}

/// Prints the totals block, the heaviest processes, and the findings.
pub fn print_report(
    summary: &DecodedSummary,
    findings: &[Finding],
    top: usize,
) -> io::Result<()> {
    let mut stdout = io::stdout();

    execute!(
        stdout,
        SetForegroundColor(Color::Cyan),
        Print("System memory\n"),
        ResetColor,
        Print(format!("  Total physical : {:7.1} GiB\n", summary.total_physical_gib())),
        Print(format!("  Available      : {:7.1} GiB\n", summary.available_physical_gib())),
        Print(format!(
            "  Kernel NP/P    : {:.1} / {:.1} GiB\n",
            summary.kernel_non_paged_gib(),
            summary.kernel_paged_gib()
        )),
        Print(format!("  System cache   : {:7.1} GiB\n", summary.system_cache_gib())),
        Print(format!("  Processes      : {:7}\n\n", summary.entries.len())),
    )?;

    execute!(
        stdout,
        SetForegroundColor(Color::Cyan),
        Print(format!("Top {} processes by private bytes\n", top)),
        ResetColor
    )?;
    for entry in heaviest(summary, top) {
        let privilege_marker = if entry.has_lock_pages_privilege {
            " [lock pages]"
        } else {
            ""
        };
        execute!(
            stdout,
            Print(format!(
                " - {} (PID {}) WS={:.1} GiB Private={:.1} GiB Hidden={:.1} GiB{}\n",
                entry.image_name,
                entry.pid,
                entry.working_set_gib(),
                entry.private_gib(),
                entry.hidden_gib(),
                privilege_marker
            ))
        )?;
    }

    execute!(
        stdout,
        SetForegroundColor(Color::Cyan),
        Print("\nFindings\n"),
        ResetColor
    )?;
    if findings.is_empty() {
        execute!(
            stdout,
            Print(" - No dominant culprit detected. Inspect driver/pool consumers.\n")
        )?;
    } else {
        for finding in rank(findings) {
            execute!(
                stdout,
                SetForegroundColor(severity_color(finding.severity)),
                Print(format!(" - [{}] {}: ", finding.id, finding.title)),
                ResetColor,
                Print(format!("{}\n", finding.description))
            )?;
        }
    }

    Ok(())
}

/// The `top` entries with the largest private byte counts, ties broken by
/// enumeration order.
fn heaviest(summary: &DecodedSummary, top: usize) -> Vec<&DecodedEntry> {
    let mut entries: Vec<&DecodedEntry> = summary.entries.iter().collect();
    entries.sort_by(|a, b| b.private_bytes.cmp(&a.private_bytes));
    entries.truncate(top);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(pid: u32, private: u64) -> DecodedEntry {
        DecodedEntry {
            pid,
            image_name: format!("p{}.exe", pid),
            working_set_bytes: 0,
            private_bytes: private,
            locked_bytes: 0,
            large_page_bytes: 0,
            has_lock_pages_privilege: false,
            is_sql_server: false,
            is_vmmem_or_vm: false,
            locked_bytes_are_exact: false,
            large_page_bytes_are_exact: false,
        }
    }

    #[test]
    fn heaviest_sorts_descending_and_truncates() {
        let summary = DecodedSummary {
            version: 1,
            total_phys_bytes: 0,
            avail_phys_bytes: 0,
            kernel_non_paged_bytes: 0,
            kernel_paged_bytes: 0,
            system_cache_bytes: 0,
            uses_forensic_pfns: false,
            entries: vec![entry(1, 10), entry(2, 30), entry(3, 20)],
        };
        let picked = heaviest(&summary, 2);
        assert_eq!(picked.len(), 2);
        assert_eq!(picked[0].pid, 2);
        assert_eq!(picked[1].pid, 3);
    }

    #[test]
    fn severity_colors_step_down() {
        assert_eq!(severity_color(1.0), Color::Red);
        assert_eq!(severity_color(0.7), Color::Yellow);
        assert_eq!(severity_color(0.5), Color::White);
    }
}
