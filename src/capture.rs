//! Snapshot capture client
//!
//! Drives the get-summary request against the live system. The request has
//! no size-query step, so the client sizes the buffer from an entry-capacity
//! guess and doubles it on every buffer-too-small outcome until the whole
//! process population fits.

use std::fmt;

use tracing::debug;

use crate::report::decode::{decode_summary, DecodeError, DecodedSummary};
use crate::snapshot::dispatch::{handle_request, RequestStatus, REQUEST_GET_SUMMARY};
use crate::snapshot::layout::{PROCESS_ENTRY_SIZE, SUMMARY_HEADER_SIZE};
use crate::system::WindowsSystemSource;

/// Errors that end a capture attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// The request itself failed with a terminal status
    Request(RequestStatus),

    /// The response buffer did not decode
    Decode(DecodeError),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::Request(status) => write!(f, "Snapshot request failed: {}", status),
            CaptureError::Decode(err) => write!(f, "Snapshot response invalid: {}", err),
        }
    }
}

impl std::error::Error for CaptureError {}

/// Captures and decodes one summary of the local machine.
pub fn capture(initial_entry_capacity: usize) -> Result<DecodedSummary, CaptureError> {
    let source = WindowsSystemSource;
    let mut capacity = initial_entry_capacity.max(1);

    loop {
        let mut buffer = vec![0u8; SUMMARY_HEADER_SIZE + capacity * PROCESS_ENTRY_SIZE];
        let outcome = handle_request(&source, REQUEST_GET_SUMMARY, Some(&mut buffer));

        match outcome.status {
            RequestStatus::Success => {
                return decode_summary(&buffer[..outcome.bytes_written])
                    .map_err(CaptureError::Decode);
            }
            RequestStatus::BufferTooSmall => {
                debug!(capacity, "snapshot buffer too small; doubling entry capacity");
                capacity *= 2;
            }
            status => return Err(CaptureError::Request(status)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_the_local_machine() {
        let summary = capture(4).expect("capture should succeed");
        assert!(!summary.entries.is_empty());
        assert!(summary.total_phys_bytes > 0);
        let own_pid = std::process::id();
        assert!(summary.entries.iter().any(|e| e.pid == own_pid));
    }

    #[test]
    fn tiny_initial_capacity_still_converges() {
        // Starts well below the real process count and has to double its way up.
        let summary = capture(1).expect("capture should converge");
        assert!(summary.entries.len() > 1);
    }
}
