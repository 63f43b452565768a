//! Snapshot engine - summary capture into a caller-bounded buffer
//!
//! One capture inventories every running process (memory counters,
//! lock-pages privilege, workload classification) together with machine-wide
//! memory totals, and serializes everything into a fixed-layout binary
//! buffer in a single synchronous request.

pub mod classify;
pub mod dispatch;
pub mod engine;
pub mod entry;
pub mod error;
pub mod layout;
pub mod probe;
pub mod source;
pub mod totals;
pub mod writer;
