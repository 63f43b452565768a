//! Centralized constants for the snapshot engine and diagnostic report
//!
//! This module contains all magic numbers and well-known literals used
//! throughout the application, making them easy to find and modify.

// ============================================================================
// Application Info
// ============================================================================

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// Application version from Cargo.toml
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Well-known image names
// ============================================================================

/// Database engine executable matched by the SQL Server classification
pub const SQL_SERVER_IMAGE: &str = "sqlservr.exe";

/// WSL2/Hyper-V backing process matched by the VM classification
pub const VMMEM_IMAGE: &str = "vmmem";

/// Hyper-V worker process matched by the VM classification
pub const VMWP_IMAGE: &str = "vmwp.exe";

/// Stored in place of an image name for processes that have none
/// (the idle/system process)
pub const SYSTEM_IMAGE_SENTINEL: &str = "<System>";

/// Shown for entries whose decoded image name is blank
pub const UNNAMED_IMAGE: &str = "<unnamed>";

// ============================================================================
// Process list query
// ============================================================================

/// Initial scratch buffer size for the process list query (256 KiB)
pub const INITIAL_PROCESS_LIST_BYTES: usize = 1 << 18;

/// Safety margin added on top of the reported size when the process list
/// query asks for a larger buffer (4 KiB)
pub const PROCESS_LIST_RESIZE_MARGIN: usize = 1 << 12;

/// Page size assumed when the basic-information query is unavailable
pub const FALLBACK_PAGE_SIZE: u64 = 4096;

// ============================================================================
// Capture client
// ============================================================================

/// Initial number of entry slots offered to the snapshot request;
/// doubled on every buffer-too-small outcome
pub const INITIAL_ENTRY_CAPACITY: usize = 512;

/// Number of processes shown in the printed report by default
pub const DEFAULT_TOP_PROCESSES: usize = 10;

// ============================================================================
// Analyzer thresholds
// ============================================================================

/// Minimum unaccounted physical memory (GiB) for the hidden-gap finding
pub const HIDDEN_GAP_GIB_THRESHOLD: f64 = 2.0;

/// Fraction of physical memory held in locked/large pages by SQL Server
/// that triggers the locked-memory finding
pub const SQL_LOCKED_FRACTION_THRESHOLD: f64 = 0.2;

/// Minimum private-commit excess over working set (GiB) for the SQL
/// commit finding
pub const SQL_COMMIT_GAP_GIB_THRESHOLD: f64 = 8.0;

/// Fraction of physical memory consumed by vmmem that triggers the
/// virtualization-pressure finding
pub const VMMEM_DOMINANCE_FRACTION: f64 = 0.3;

// ============================================================================
// Byte Size Conversions
// ============================================================================

/// Bytes in a gibibyte
pub const BYTES_PER_GIB: f64 = 1_073_741_824.0;
