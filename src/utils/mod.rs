//! Utility modules for common functionality.
//!
//! - logging: Logging setup and the error context shared by every error type
//! - tests: Builders used by unit and integration tests

pub mod logging;
pub mod tests;
