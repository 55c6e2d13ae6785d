//! Failure taxonomy for running a single external command.

use std::io;

use thiserror::Error;

use crate::exit_codes;

/// Why a command invocation failed. Every variant is fatal to the setup run.
#[derive(Debug, Error)]
pub enum RunError {
    /// The executable does not exist on `PATH`.
    #[error("command not found: {program}")]
    CommandNotFound { program: String },

    /// A checked command exited with a non-zero code.
    #[error("command `{command}` failed with exit code {code}")]
    NonZeroExit { command: String, code: i32 },

    /// Launch, I/O or wait failure other than a missing executable.
    #[error("unexpected failure running `{command}`")]
    UnexpectedFailure {
        command: String,
        #[source]
        source: io::Error,
    },
}

impl RunError {
    /// Process exit code to terminate with: the child's own code when it has
    /// one, otherwise the generic failure code.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::NonZeroExit { code, .. } if *code != exit_codes::OK => *code,
            _ => exit_codes::FAILURE,
        }
    }

    pub fn unexpected(command: impl Into<String>, source: io::Error) -> Self {
        RunError::UnexpectedFailure {
            command: command.into(),
            source,
        }
    }
}
