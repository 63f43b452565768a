//! Snapshot construction
//!
//! Builds one complete summary into a caller-supplied buffer: header totals
//! first, then one entry per live process until the list ends or the buffer
//! runs out of room. All scratch state is request-local; concurrent captures
//! never share anything but the platform they query.

use super::entry::ProcessEntry;
use super::error::SnapshotResult;
use super::source::SystemSource;
use super::totals;
use super::writer::SummaryWriter;

/// Captures a summary of all running processes and machine memory totals.
///
/// On success returns the number of bytes written. Truncation surfaces as
/// `BufferTooSmall`; the caller must treat the buffer contents as invalid in
/// that case and retry with a larger buffer.
pub fn capture_summary<S: SystemSource>(source: &S, output: &mut [u8]) -> SnapshotResult<usize> {
    let mut writer = SummaryWriter::new(output)?;
    writer.write_header(&totals::collect(source));

    for record in source.process_records()? {
        let privileged = source.has_lock_pages_privilege(record.pid);
        writer.append(&ProcessEntry::from_record(&record, privileged))?;
    }

    Ok(writer.finish())
}
