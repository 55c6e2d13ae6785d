//! Running external commands with live, merged output.
//!
//! Child stdout and stderr share one OS pipe, so the operator sees both in the
//! order the child wrote them. Output is echoed chunk by chunk while the child
//! runs; nothing is buffered for later inspection.

use std::io::{self, BufRead, BufReader, PipeReader, Write};
use std::process::{Child, Command, ExitStatus, Stdio};

use tracing::{debug, error, info, instrument, warn};

use crate::core::error::RunError;
use crate::core::invocation::Invocation;
use crate::core::style::Style;
use crate::io::console::Console;

/// Runs one invocation to completion and classifies the result.
///
/// Implementations return the exit code on success and never terminate the
/// process themselves.
pub trait ProcessRunner {
    fn run<W: Write>(
        &mut self,
        invocation: &Invocation,
        console: &mut Console<W>,
    ) -> Result<i32, RunError>;
}

/// Live output of a spawned child.
///
/// Yields newline-terminated chunks (the last one may lack the newline) as
/// the child produces them. The stream is single-pass; the exit status is
/// only available through [`OutputStream::finish`].
pub struct OutputStream {
    child: Child,
    reader: BufReader<PipeReader>,
    exhausted: bool,
}

impl Iterator for OutputStream {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let mut buf = Vec::new();
        match self.reader.read_until(b'\n', &mut buf) {
            Ok(0) => {
                self.exhausted = true;
                None
            }
            Ok(_) => Some(Ok(String::from_utf8_lossy(&buf).into_owned())),
            Err(err) => {
                self.exhausted = true;
                Some(Err(err))
            }
        }
    }
}

impl OutputStream {
    /// Drain unread output, then wait for the child to exit.
    pub fn finish(mut self) -> io::Result<ExitStatus> {
        if !self.exhausted {
            io::copy(&mut self.reader, &mut io::sink())?;
        }
        self.child.wait()
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }
}

/// Spawn `invocation` with stderr merged into stdout. Stdin is inherited so
/// the child can still prompt (e.g. `sudo` asking for a password).
pub fn spawn_merged(invocation: &Invocation) -> io::Result<OutputStream> {
    let (reader, writer) = io::pipe()?;
    let mut cmd = Command::new(&invocation.program);
    cmd.args(&invocation.args)
        .stdin(Stdio::inherit())
        .stdout(writer.try_clone()?)
        .stderr(writer);
    if let Some(dir) = invocation.cwd() {
        cmd.current_dir(dir);
    }
    let child = cmd.spawn()?;
    // The parent's copies of the write end live in `cmd`; EOF only arrives
    // once they are closed.
    drop(cmd);
    Ok(OutputStream {
        child,
        reader: BufReader::new(reader),
        exhausted: false,
    })
}

/// Exit code for `status`; a signal-terminated child reports `128 + signal`.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    crate::exit_codes::FAILURE
}

/// Production runner: spawns the command and streams its output to the console.
#[derive(Debug, Default, Clone, Copy)]
pub struct StreamingRunner;

impl ProcessRunner for StreamingRunner {
    #[instrument(skip_all, fields(command = %invocation, check = invocation.check))]
    fn run<W: Write>(
        &mut self,
        invocation: &Invocation,
        console: &mut Console<W>,
    ) -> Result<i32, RunError> {
        let command = invocation.to_string();
        let io_failure = |err: io::Error| RunError::unexpected(command.clone(), err);

        let banner = match invocation.cwd() {
            Some(dir) => format!("--- Running command: {command} in {} ---", dir.display()),
            None => format!("--- Running command: {command} ---"),
        };
        console.line(Style::Info, &banner).map_err(io_failure)?;

        if invocation.program.trim().is_empty() {
            return Err(RunError::unexpected(
                command.clone(),
                io::Error::new(io::ErrorKind::InvalidInput, "empty program name"),
            ));
        }
        if let Some(dir) = invocation.cwd()
            && !dir.is_dir()
        {
            error!(dir = %dir.display(), "working directory missing");
            return Err(RunError::unexpected(
                command.clone(),
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("working directory {} does not exist", dir.display()),
                ),
            ));
        }

        let mut stream = match spawn_merged(invocation) {
            Ok(stream) => stream,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                error!(program = %invocation.program, "command not found");
                console
                    .line(
                        Style::Failure,
                        &format!("Error: Command not found: {}", invocation.program),
                    )
                    .map_err(io_failure)?;
                return Err(RunError::CommandNotFound {
                    program: invocation.program.clone(),
                });
            }
            Err(err) => {
                error!(err = %err, "failed to spawn command");
                return Err(RunError::unexpected(command.clone(), err));
            }
        };
        debug!(pid = stream.id(), "child spawned");

        for chunk in &mut stream {
            let chunk = chunk.map_err(io_failure)?;
            console.echo(&chunk).map_err(io_failure)?;
        }
        let status = stream.finish().map_err(io_failure)?;
        let code = exit_code(status);
        debug!(exit_code = code, "command finished");

        if code == 0 {
            console.blank().map_err(io_failure)?;
            console
                .line(Style::Success, "--- Command successful ---")
                .map_err(io_failure)?;
            info!("command succeeded");
            return Ok(code);
        }
        if invocation.check {
            warn!(exit_code = code, "command failed");
            console.blank().map_err(io_failure)?;
            console
                .line(
                    Style::Failure,
                    &format!("--- Command failed with exit code {code} ---"),
                )
                .map_err(io_failure)?;
            return Err(RunError::NonZeroExit { command, code });
        }
        debug!(exit_code = code, "unchecked command exited non-zero");
        console.blank().map_err(io_failure)?;
        console
            .line(
                Style::Notice,
                &format!("--- Command exited with code {code} ---"),
            )
            .map_err(io_failure)?;
        Ok(code)
    }
}
