//! Request dispatch
//!
//! Maps control codes onto snapshot operations and snapshot errors onto the
//! fixed status vocabulary callers see. The control-code numbering mirrors
//! the device-control convention the summary format originated with, so the
//! same consumer tooling can address either transport.

use std::fmt;

use super::engine;
use super::error::SnapshotError;
use super::source::SystemSource;

const METHOD_BUFFERED: u32 = 0;
const FILE_ANY_ACCESS: u32 = 0;
const FILE_DEVICE_UNKNOWN: u32 = 0x22;

const fn control_code(device_type: u32, function: u32, method: u32, access: u32) -> u32 {
    (device_type << 16) | (access << 14) | (function << 2) | method
}

/// The one supported operation: capture a summary into the output buffer.
pub const REQUEST_GET_SUMMARY: u32 =
    control_code(FILE_DEVICE_UNKNOWN, 0x801, METHOD_BUFFERED, FILE_ANY_ACCESS);

/// Terminal status of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestStatus {
    Success,
    InvalidParameter,
    BufferTooSmall,
    InsufficientResources,
    UnsupportedRequest,
    NtdllUnavailable {
        function: &'static str,
    },
    QueryFailed {
        api: &'static str,
        status: i32,
    },
}

impl From<SnapshotError> for RequestStatus {
    fn from(err: SnapshotError) -> Self {
        match err {
            SnapshotError::InvalidParameter => RequestStatus::InvalidParameter,
            SnapshotError::BufferTooSmall => RequestStatus::BufferTooSmall,
            SnapshotError::InsufficientResources => RequestStatus::InsufficientResources,
            SnapshotError::NtdllLoadFailed { function } => {
                RequestStatus::NtdllUnavailable { function }
            }
            SnapshotError::QueryFailed { api, status } => {
                RequestStatus::QueryFailed { api, status }
            }
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestStatus::Success => write!(f, "Success"),
            RequestStatus::InvalidParameter => write!(f, "Invalid request parameters"),
            RequestStatus::BufferTooSmall => write!(f, "Output buffer too small"),
            RequestStatus::InsufficientResources => {
                write!(f, "Insufficient resources for the snapshot")
            }
            RequestStatus::UnsupportedRequest => write!(f, "Unsupported request code"),
            RequestStatus::NtdllUnavailable { function } => {
                write!(f, "Failed to load {} from ntdll.dll", function)
            }
            RequestStatus::QueryFailed { api, status } => {
                write!(f, "{} failed (status: 0x{:08X})", api, status)
            }
        }
    }
}

/// Result of dispatching one request.
///
/// `bytes_written` is nonzero only on success; every failure, truncation
/// included, reports zero so callers never read a half-built buffer.
#[derive(Debug, PartialEq, Eq)]
pub struct RequestOutcome {
    pub status: RequestStatus,
    pub bytes_written: usize,
}

/// Dispatches one request against the given system source.
pub fn handle_request<S: SystemSource>(
    source: &S,
    code: u32,
    output: Option<&mut [u8]>,
) -> RequestOutcome {
    if code != REQUEST_GET_SUMMARY {
        return RequestOutcome { status: RequestStatus::UnsupportedRequest, bytes_written: 0 };
    }

    let Some(buffer) = output else {
        return RequestOutcome { status: RequestStatus::InvalidParameter, bytes_written: 0 };
    };

    match engine::capture_summary(source, buffer) {
        Ok(bytes_written) => RequestOutcome { status: RequestStatus::Success, bytes_written },
        Err(err) => RequestOutcome { status: err.into(), bytes_written: 0 },
    }
}
