//! Custom error types for type-safe error handling
//!
//! This module provides structured error types instead of raw strings,
//! enabling better error handling, matching, and user messages.

use std::fmt;

/// Errors that can abort a snapshot request.
///
/// Degraded data sources (missing performance counters, a process that
/// exited mid-enumeration) are never reported here; only conditions that
/// make the request as a whole unanswerable are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// Output buffer missing or arguments inconsistent
    InvalidParameter,

    /// Output buffer cannot hold the header, or enumeration was truncated
    BufferTooSmall,

    /// Scratch allocation for the process list failed
    InsufficientResources,

    /// Failed to load a required function from ntdll.dll
    NtdllLoadFailed {
        /// Name of the function that failed to load
        function: &'static str,
    },

    /// A system query failed with a non-size-related status
    QueryFailed {
        /// Name of the failing API function
        api: &'static str,
        /// NTSTATUS value returned by the call
        status: i32,
    },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::InvalidParameter => {
                write!(f, "Invalid request parameters")
            }
            SnapshotError::BufferTooSmall => {
                write!(f, "Output buffer too small for the snapshot")
            }
            SnapshotError::InsufficientResources => {
                write!(f, "Failed to allocate the process list scratch buffer")
            }
            SnapshotError::NtdllLoadFailed { function } => {
                write!(f, "Failed to load {} from ntdll.dll", function)
            }
            SnapshotError::QueryFailed { api, status } => {
                write!(f, "{} failed (status: 0x{:08X})", api, status)
            }
        }
    }
}

impl std::error::Error for SnapshotError {}

/// Result type for snapshot operations
pub type SnapshotResult<T> = Result<T, SnapshotError>;
