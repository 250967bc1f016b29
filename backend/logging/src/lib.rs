//! Structured logging setup for ChatGate.
//!
//! Console output for operators plus a daily-rotated NDJSON file.

pub mod logger;

pub use logger::{init_console_logger, init_logger};
