//! Stable exit codes for the setup binary.

use crate::core::error::RunError;
use crate::setup::SetupError;

/// Every step completed.
pub const OK: i32 = 0;
/// A step failed without a child exit code to propagate (missing command,
/// launch failure, config error).
pub const FAILURE: i32 = 1;

/// Exit code for an error reaching the top-level handler.
///
/// A failing checked command propagates its own exit code; anything else maps
/// to [`FAILURE`].
pub fn for_error(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(setup) = cause.downcast_ref::<SetupError>() {
            return setup.exit_code();
        }
        if let Some(run) = cause.downcast_ref::<RunError>() {
            return run.exit_code();
        }
    }
    FAILURE
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, anyhow};

    #[test]
    fn setup_error_propagates_child_code() {
        let err = SetupError::Step {
            index: 1,
            title: "Installing system dependencies",
            source: RunError::NonZeroExit {
                command: "sudo apt-get update -y".to_string(),
                code: 100,
            },
        };
        let err = anyhow::Error::new(err).context("run setup");
        assert_eq!(for_error(&err), 100);
    }

    #[test]
    fn plain_errors_use_generic_code() {
        let err = Err::<(), _>(anyhow!("bad toml"))
            .context("load farmer.toml")
            .unwrap_err();
        assert_eq!(for_error(&err), FAILURE);
    }
}
