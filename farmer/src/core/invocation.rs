//! A single external command to run.

use std::fmt;
use std::path::{Path, PathBuf};

/// One external command: argument vector, optional working directory and
/// whether a non-zero exit aborts the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// Treat a non-zero exit as a failure (defaults to `true`).
    pub check: bool,
}

impl Invocation {
    pub fn new<P, I, S>(program: P, args: I) -> Self
    where
        P: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
            check: true,
        }
    }

    /// Run inside `dir` instead of the inherited working directory.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Return the exit code to the caller instead of failing on non-zero exits.
    pub fn unchecked(mut self) -> Self {
        self.check = false;
        self
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Full argument vector, program first.
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.argv().join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_defaults_to_checked_without_cwd() {
        let inv = Invocation::new("git", ["clone", "url"]);
        assert!(inv.check);
        assert_eq!(inv.cwd(), None);
        assert_eq!(inv.argv(), vec!["git", "clone", "url"]);
    }

    #[test]
    fn builders_set_dir_and_check() {
        let inv = Invocation::new("sh", ["install.sh"])
            .in_dir("/opt/repo")
            .unchecked();
        assert!(!inv.check);
        assert_eq!(inv.cwd(), Some(Path::new("/opt/repo")));
    }

    #[test]
    fn display_joins_argv() {
        let inv = Invocation::new("sudo", ["apt-get", "update", "-y"]);
        assert_eq!(inv.to_string(), "sudo apt-get update -y");
        assert_eq!(Invocation::new("true", Vec::<String>::new()).to_string(), "true");
    }
}
