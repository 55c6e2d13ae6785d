//! Orchestration for a full setup run.
//!
//! Walks the step list in order, plans each step when it starts (so the clone
//! guard sees the filesystem as earlier steps left it), and hands every
//! command to a [`ProcessRunner`]. The first fatal failure stops the run and
//! is returned to the caller; nothing here exits the process.

use std::io::{self, Write};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::error::RunError;
use crate::core::style::Style;
use crate::io::console::Console;
use crate::io::probe::PathProbe;
use crate::io::process::ProcessRunner;
use crate::steps::{Action, SetupContext, Step};

/// Why a setup run stopped early.
#[derive(Debug, Error)]
pub enum SetupError {
    /// A command in a fatal step failed.
    #[error("step {index} ({title}) failed")]
    Step {
        /// 1-based step number.
        index: usize,
        title: &'static str,
        #[source]
        source: RunError,
    },

    #[error("write console output")]
    Console(#[from] io::Error),
}

impl SetupError {
    pub fn exit_code(&self) -> i32 {
        match self {
            SetupError::Step { source, .. } => source.exit_code(),
            SetupError::Console(_) => crate::exit_codes::FAILURE,
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupReport {
    /// Steps whose actions all finished.
    pub steps_completed: usize,
    /// Steps abandoned after a non-fatal failure.
    pub steps_failed: usize,
    pub commands_run: usize,
    /// Titles of steps that found their work already done.
    pub skipped: Vec<&'static str>,
}

/// Execute `steps` in order against `ctx`.
pub fn run_setup<R, P, W>(
    ctx: &SetupContext,
    steps: &[Step],
    runner: &mut R,
    probe: &P,
    console: &mut Console<W>,
) -> Result<SetupReport, SetupError>
where
    R: ProcessRunner,
    P: PathProbe,
    W: Write,
{
    info!(work_dir = %ctx.work_dir.display(), steps = steps.len(), "starting setup");
    console.line(Style::Header, "=== Starting Automated Chia Farming Setup ===")?;

    let mut report = SetupReport::default();
    for (pos, step) in steps.iter().enumerate() {
        let index = pos + 1;
        console.blank()?;
        console.line(Style::Plain, &format!(">>> STEP {index}: {}...", step.title))?;

        let actions = (step.plan)(ctx, probe);
        debug!(index, title = step.title, actions = actions.len(), "step planned");
        if actions.iter().any(|action| matches!(action, Action::Skip(_))) {
            info!(index, title = step.title, "step skipped");
            report.skipped.push(step.title);
        }

        match run_actions(&actions, runner, console, &mut report) {
            Ok(()) => {
                debug!(index, "step completed");
                report.steps_completed += 1;
            }
            Err(ActionError::Console(err)) => return Err(SetupError::Console(err)),
            Err(ActionError::Run(err)) if step.abort_on_failure => {
                warn!(index, title = step.title, err = %err, "step failed, aborting setup");
                if let Some(hint) = step.failure_hint {
                    console.line(Style::Failure, hint)?;
                }
                return Err(SetupError::Step {
                    index,
                    title: step.title,
                    source: err,
                });
            }
            Err(ActionError::Run(err)) => {
                warn!(index, title = step.title, err = %err, "step failed, continuing");
                console.line(
                    Style::Warning,
                    &format!("Step {index} failed ({err}); continuing."),
                )?;
                report.steps_failed += 1;
            }
        }
    }

    info!(
        steps_completed = report.steps_completed,
        commands_run = report.commands_run,
        "setup finished"
    );
    Ok(report)
}

/// Failure inside a step: a command failed, or the console itself did.
/// Console failures are fatal whatever the step's policy.
enum ActionError {
    Run(RunError),
    Console(io::Error),
}

fn run_actions<R, W>(
    actions: &[Action],
    runner: &mut R,
    console: &mut Console<W>,
    report: &mut SetupReport,
) -> Result<(), ActionError>
where
    R: ProcessRunner,
    W: Write,
{
    for action in actions {
        match action {
            Action::Run(invocation) => {
                report.commands_run += 1;
                runner.run(invocation, console).map_err(ActionError::Run)?;
            }
            Action::Say(style, text) => {
                console.line(*style, text).map_err(ActionError::Console)?;
            }
            Action::Skip(reason) => {
                console
                    .line(Style::Notice, reason)
                    .map_err(ActionError::Console)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::invocation::Invocation;
    use crate::io::config::SetupConfig;
    use crate::test_support::{ScriptedRunner, StubFs, buffer_console, console_text};

    fn ctx() -> SetupContext {
        SetupContext::new("/srv/farm", SetupConfig::default())
    }

    fn step(title: &'static str, plan: crate::steps::PlanFn, abort_on_failure: bool) -> Step {
        Step {
            title,
            plan,
            abort_on_failure,
            failure_hint: Some("fix it and re-run"),
        }
    }

    fn fail_plan(_: &SetupContext, _: &dyn PathProbe) -> Vec<Action> {
        vec![
            Action::Run(Invocation::new("false", Vec::<String>::new())),
            Action::Run(Invocation::new("never-reached", Vec::<String>::new())),
        ]
    }

    fn ok_plan(_: &SetupContext, _: &dyn PathProbe) -> Vec<Action> {
        vec![
            Action::Say(Style::Notice, "hello".to_string()),
            Action::Run(Invocation::new("true", Vec::<String>::new())),
        ]
    }

    #[test]
    fn fatal_step_stops_run_with_hint() {
        let steps = [step("Breaks", fail_plan, true), step("After", ok_plan, true)];
        let mut runner = ScriptedRunner::new().fail_on("false", 5);
        let mut console = buffer_console();

        let err = run_setup(&ctx(), &steps, &mut runner, &StubFs::empty(), &mut console)
            .expect_err("fatal step");

        assert_eq!(err.exit_code(), 5);
        assert!(matches!(err, SetupError::Step { index: 1, title: "Breaks", .. }));
        assert_eq!(runner.commands(), vec!["false"]);
        let text = console_text(&console);
        assert!(text.contains("fix it and re-run"));
        assert!(!text.contains(">>> STEP 2"));
    }

    #[test]
    fn non_fatal_step_abandons_rest_of_step_and_continues() {
        let steps = [step("Optional", fail_plan, false), step("After", ok_plan, true)];
        let mut runner = ScriptedRunner::new().fail_on("false", 2);
        let mut console = buffer_console();

        let report = run_setup(&ctx(), &steps, &mut runner, &StubFs::empty(), &mut console)
            .expect("run continues");

        assert_eq!(runner.commands(), vec!["false", "true"]);
        assert_eq!(report.steps_completed, 1);
        assert_eq!(report.steps_failed, 1);
        assert_eq!(report.commands_run, 2);
        assert!(report.skipped.is_empty());
        assert!(console_text(&console).contains("Step 1 failed"));
    }

    fn unchecked_plan(_: &SetupContext, _: &dyn PathProbe) -> Vec<Action> {
        vec![
            Action::Run(Invocation::new("sh", ["-c", "exit 9"]).unchecked()),
            Action::Say(Style::Plain, "after".to_string()),
            Action::Run(Invocation::new("true", Vec::<String>::new())),
        ]
    }

    fn say_plan(_: &SetupContext, _: &dyn PathProbe) -> Vec<Action> {
        vec![
            Action::Say(Style::Plain, "unwritable line".to_string()),
            Action::Run(Invocation::new("true", Vec::<String>::new())),
        ]
    }

    /// Rejects any write containing `unwritable`.
    struct RejectingWriter;

    impl Write for RejectingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if buf.windows(10).any(|w| w == b"unwritable") {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"));
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn unchecked_non_zero_exit_does_not_stop_setup() {
        let steps = [
            step("Tolerant", unchecked_plan, true),
            step("After", ok_plan, true),
        ];
        let mut runner = ScriptedRunner::new().fail_on("sh -c exit 9", 9);
        let mut console = buffer_console();

        let report = run_setup(&ctx(), &steps, &mut runner, &StubFs::empty(), &mut console)
            .expect("unchecked failure is tolerated");

        assert_eq!(runner.commands(), vec!["sh -c exit 9", "true", "true"]);
        assert_eq!(report.steps_completed, 2);
        assert_eq!(report.steps_failed, 0);
        assert_eq!(report.commands_run, 3);
        let text = console_text(&console);
        assert!(text.contains("after"));
        assert!(text.contains(">>> STEP 2: After..."));
        assert!(!text.contains("fix it and re-run"));
    }

    #[test]
    fn console_failure_is_reported_as_console_error() {
        let steps = [step("Chatty", say_plan, false), step("After", ok_plan, true)];
        let mut runner = ScriptedRunner::new();
        let mut console = Console::new(RejectingWriter, false);

        let err = run_setup(&ctx(), &steps, &mut runner, &StubFs::empty(), &mut console)
            .expect_err("console failure is fatal");

        assert!(matches!(err, SetupError::Console(_)), "got {err:?}");
        assert_eq!(err.to_string(), "write console output");
        assert_eq!(err.exit_code(), crate::exit_codes::FAILURE);
        assert!(runner.calls().is_empty(), "no command after the console broke");
    }

    #[test]
    fn banners_number_steps_in_order() {
        let steps = [step("First", ok_plan, true), step("Second", ok_plan, true)];
        let mut runner = ScriptedRunner::new();
        let mut console = buffer_console();

        run_setup(&ctx(), &steps, &mut runner, &StubFs::empty(), &mut console).expect("run");

        let text = console_text(&console);
        let first = text.find(">>> STEP 1: First...").expect("step 1 banner");
        let second = text.find(">>> STEP 2: Second...").expect("step 2 banner");
        assert!(first < second);
        assert!(text.starts_with("=== Starting Automated Chia Farming Setup ==="));
    }
}
