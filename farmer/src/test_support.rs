//! Test doubles for the process runner, filesystem probe and console.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::core::error::RunError;
use crate::core::invocation::Invocation;
use crate::io::console::Console;
use crate::io::probe::PathProbe;
use crate::io::process::ProcessRunner;

#[derive(Debug, Clone)]
enum Outcome {
    Exit(i32),
    NotFound,
}

/// Runner that records invocations and answers from a rule list instead of
/// spawning processes.
///
/// Commands exit 0 unless a rule registered with [`ScriptedRunner::fail_on`]
/// or [`ScriptedRunner::missing`] matches the start of the rendered command.
/// `check` is honored the same way the streaming runner honors it.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    rules: Vec<(String, Outcome)>,
    calls: Vec<Invocation>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands starting with `prefix` exit with `code`.
    pub fn fail_on(mut self, prefix: &str, code: i32) -> Self {
        self.rules.push((prefix.to_string(), Outcome::Exit(code)));
        self
    }

    /// Commands whose program is `program` are reported as not found.
    pub fn missing(mut self, program: &str) -> Self {
        self.rules.push((program.to_string(), Outcome::NotFound));
        self
    }

    pub fn calls(&self) -> &[Invocation] {
        &self.calls
    }

    /// Rendered commands in the order they were issued.
    pub fn commands(&self) -> Vec<String> {
        self.calls.iter().map(ToString::to_string).collect()
    }

    /// True if any issued command starts with `prefix`.
    pub fn issued(&self, prefix: &str) -> bool {
        self.calls
            .iter()
            .any(|call| call.to_string().starts_with(prefix))
    }

    fn outcome_for(&self, invocation: &Invocation) -> Outcome {
        let command = invocation.to_string();
        self.rules
            .iter()
            .find(|(prefix, outcome)| match outcome {
                Outcome::NotFound => invocation.program == *prefix,
                Outcome::Exit(_) => command.starts_with(prefix.as_str()),
            })
            .map(|(_, outcome)| outcome.clone())
            .unwrap_or(Outcome::Exit(0))
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run<W: Write>(
        &mut self,
        invocation: &Invocation,
        console: &mut Console<W>,
    ) -> Result<i32, RunError> {
        self.calls.push(invocation.clone());
        let command = invocation.to_string();
        console
            .echo(&format!("[scripted] {command}\n"))
            .map_err(|err| RunError::unexpected(command.clone(), err))?;
        match self.outcome_for(invocation) {
            Outcome::NotFound => Err(RunError::CommandNotFound {
                program: invocation.program.clone(),
            }),
            Outcome::Exit(code) if code != 0 && invocation.check => {
                Err(RunError::NonZeroExit { command, code })
            }
            Outcome::Exit(code) => Ok(code),
        }
    }
}

/// Probe over a fixed set of existing paths.
#[derive(Debug, Default)]
pub struct StubFs {
    dirs: HashSet<PathBuf>,
}

impl StubFs {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_dirs<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }
}

impl PathProbe for StubFs {
    fn exists(&self, path: &Path) -> bool {
        self.dirs.contains(path)
    }
}

/// Console writing into memory with color disabled.
pub fn buffer_console() -> Console<Vec<u8>> {
    Console::new(Vec::new(), false)
}

pub fn console_text(console: &Console<Vec<u8>>) -> String {
    String::from_utf8_lossy(console.get_ref()).into_owned()
}

/// Scratch working directory for setup runs against the real filesystem.
pub struct TempWorkspace {
    dir: TempDir,
}

impl TempWorkspace {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create temp workspace")?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Create an (empty) existing checkout named `name`.
    pub fn with_checkout(self, name: &str) -> Result<Self> {
        let checkout = self.dir.path().join(name);
        std::fs::create_dir_all(&checkout)
            .with_context(|| format!("create {}", checkout.display()))?;
        Ok(self)
    }
}
