//! Automated bootstrap of a Chia farming node on a Debian-based host.
//!
//! The crate runs a fixed sequence of setup steps (OS packages, clone,
//! installer, config init, key generation, service start), streaming every
//! external command's output live and stopping at the first failure. The
//! architecture keeps a strict separation:
//!
//! - **[`core`]**: Pure logic (command descriptions, failure taxonomy, styling).
//!   No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting adapters (process spawning, console, filesystem
//!   probe, config file). Isolated behind traits to enable fakes in tests.
//!
//! Orchestration ([`steps`], [`setup`]) coordinates the two: the step list is
//! data, and the orchestrator loop is generic over the runner and probe.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod setup;
pub mod steps;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
