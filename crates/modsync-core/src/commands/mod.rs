//! High-level commands for modsync operations.
//!
//! These are the operations frontends dispatch to; each one loads what it
//! needs from configuration and reports what it did.

pub mod update;

pub use update::{UpdateAllReport, UpdateCommand, UpdateModsReport};
