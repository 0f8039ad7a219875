//! Shared utilities
//!
//! Logging and progress reporting used across the library and CLI.

pub mod logger;
pub mod progress;
