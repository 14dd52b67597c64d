//! Profiling Agent Core Library
//!
//! This library backs the `pa-core` binary:
//! - Exit codes for CLI operations
//! - The configuration check report
//! - Output formats for reports and documents
//! - Logging setup
//!
//! The binary entry point is in `main.rs`.

pub mod check;
pub mod exit_codes;
pub mod logging;
pub mod output;
