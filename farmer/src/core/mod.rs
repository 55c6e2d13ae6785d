//! Pure logic shared by the setup binary.
//!
//! Core modules must be free of I/O side effects. They describe commands,
//! classify failures and format text, and are testable in isolation.

pub mod error;
pub mod invocation;
pub mod style;
