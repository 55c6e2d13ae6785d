//! I/O adapters for the setup orchestrator.

pub mod config;
pub mod console;
pub mod probe;
pub mod process;
