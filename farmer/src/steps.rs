//! The fixed, ordered setup step list.
//!
//! Each [`Step`] is data: a title, a function that plans its actions against
//! the resolved [`SetupContext`], and a failure policy. Later steps assume
//! earlier ones completed, so [`default_steps`] order is load-bearing.

use std::path::{Path, PathBuf};

use crate::core::invocation::Invocation;
use crate::core::style::{Style, rule};
use crate::io::config::SetupConfig;
use crate::io::probe::PathProbe;

const INSTALLER: &str = "install.sh";
const ACTIVATED: &str = "activated.py";

/// Paths and settings resolved once before the first step runs.
#[derive(Debug, Clone)]
pub struct SetupContext {
    /// Directory the setup was launched from; the clone lands here.
    pub work_dir: PathBuf,
    /// Checkout of the external project (`work_dir/<repository.dir>`).
    pub repo_dir: PathBuf,
    pub config: SetupConfig,
}

impl SetupContext {
    pub fn new(work_dir: impl Into<PathBuf>, config: SetupConfig) -> Self {
        let work_dir = work_dir.into();
        let repo_dir = work_dir.join(&config.repository.dir);
        Self {
            work_dir,
            repo_dir,
            config,
        }
    }

    pub fn installer(&self) -> PathBuf {
        self.repo_dir.join(INSTALLER)
    }

    /// Wrapper script that runs its arguments inside the project's virtualenv.
    pub fn activated(&self) -> PathBuf {
        self.repo_dir.join(ACTIVATED)
    }

    fn chia(&self, args: &[&str]) -> Invocation {
        let argv = std::iter::once("chia").chain(args.iter().copied());
        Invocation::new(path_arg(&self.activated()), argv).in_dir(&self.repo_dir)
    }

    fn package_manager(&self, args: &[&str]) -> Invocation {
        if self.config.system.sudo {
            Invocation::new("sudo", std::iter::once("apt-get").chain(args.iter().copied()))
        } else {
            Invocation::new("apt-get", args.iter().copied())
        }
    }
}

/// One unit of work inside a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Run an external command through the process runner.
    Run(Invocation),
    /// Print a styled message.
    Say(Style, String),
    /// The step's work is already done; print why.
    Skip(String),
}

impl Action {
    fn say(style: Style, text: impl Into<String>) -> Self {
        Action::Say(style, text.into())
    }
}

/// Plans a step's actions at the moment the step starts.
pub type PlanFn = fn(&SetupContext, &dyn PathProbe) -> Vec<Action>;

/// A named setup phase.
#[derive(Clone)]
pub struct Step {
    pub title: &'static str,
    pub plan: PlanFn,
    /// Stop the whole run when one of this step's commands fails.
    pub abort_on_failure: bool,
    /// Extra guidance printed when the step fails.
    pub failure_hint: Option<&'static str>,
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step")
            .field("title", &self.title)
            .field("abort_on_failure", &self.abort_on_failure)
            .finish_non_exhaustive()
    }
}

/// The seven setup steps, in execution order.
pub fn default_steps() -> Vec<Step> {
    vec![
        Step {
            title: "Installing system dependencies",
            plan: install_system_packages,
            abort_on_failure: true,
            failure_hint: Some(
                "Could not install system dependencies. Please install them manually and re-run.",
            ),
        },
        Step {
            title: "Cloning the project repository",
            plan: clone_repository,
            abort_on_failure: true,
            failure_hint: None,
        },
        Step {
            title: "Running the project installer (install.sh)",
            plan: run_installer,
            abort_on_failure: true,
            failure_hint: None,
        },
        Step {
            title: "Initializing Chia configuration",
            plan: init_config,
            abort_on_failure: true,
            failure_hint: None,
        },
        Step {
            title: "Generating a new wallet key",
            plan: generate_key,
            abort_on_failure: true,
            failure_hint: None,
        },
        Step {
            title: "Starting the farmer",
            plan: start_farmer,
            abort_on_failure: true,
            failure_hint: None,
        },
        Step {
            title: "Final instructions",
            plan: final_instructions,
            abort_on_failure: true,
            failure_hint: None,
        },
    ]
}

fn install_system_packages(ctx: &SetupContext, _probe: &dyn PathProbe) -> Vec<Action> {
    let mut install = vec!["install", "-y"];
    install.extend(ctx.config.system.packages.iter().map(String::as_str));
    vec![
        Action::Run(ctx.package_manager(&["update", "-y"])),
        Action::Run(ctx.package_manager(&install)),
    ]
}

fn clone_repository(ctx: &SetupContext, probe: &dyn PathProbe) -> Vec<Action> {
    let repo = &ctx.config.repository;
    if probe.exists(&ctx.repo_dir) {
        return vec![Action::Skip(format!(
            "Directory '{}' already exists. Skipping clone.",
            repo.dir
        ))];
    }
    vec![Action::Run(
        Invocation::new("git", ["clone", repo.url.as_str(), repo.dir.as_str()])
            .in_dir(&ctx.work_dir),
    )]
}

fn run_installer(ctx: &SetupContext, _probe: &dyn PathProbe) -> Vec<Action> {
    let installer = path_arg(&ctx.installer());
    vec![
        Action::Run(Invocation::new("chmod", ["+x", installer.as_str()])),
        Action::Run(Invocation::new("sh", [installer.as_str()]).in_dir(&ctx.repo_dir)),
    ]
}

fn init_config(ctx: &SetupContext, _probe: &dyn PathProbe) -> Vec<Action> {
    let activated = path_arg(&ctx.activated());
    vec![
        Action::Run(Invocation::new("chmod", ["+x", activated.as_str()])),
        Action::Run(ctx.chia(&["init"])),
    ]
}

fn generate_key(ctx: &SetupContext, _probe: &dyn PathProbe) -> Vec<Action> {
    let width = 70;
    vec![
        Action::say(
            Style::Warning,
            format!(
                "{}\n!!! IMPORTANT: The following 24-word mnemonic is your private key. !!!\n\
                 !!! Back it up securely. It is the ONLY way to recover your wallet. !!!\n{}",
                rule(width),
                rule(width)
            ),
        ),
        Action::Run(ctx.chia(&["keys", "generate"])),
        Action::say(
            Style::Warning,
            format!(
                "{}\n!!! Mnemonic phrase displayed above. Please write it down and save it securely. !!!\n{}",
                rule(width),
                rule(width)
            ),
        ),
    ]
}

fn start_farmer(ctx: &SetupContext, _probe: &dyn PathProbe) -> Vec<Action> {
    vec![Action::Run(ctx.chia(&["start", "farmer"]))]
}

fn final_instructions(ctx: &SetupContext, _probe: &dyn PathProbe) -> Vec<Action> {
    let dir = &ctx.config.repository.dir;
    vec![
        Action::say(
            Style::Header,
            format!("{}\n>>> SETUP COMPLETE! <<<\n{}", rule(60), rule(60)),
        ),
        Action::say(
            Style::Success,
            "Chia services have been started in the background.",
        ),
        Action::say(
            Style::Plain,
            "The full node will now start syncing to the blockchain, which may take some time.\n\
             You can add plots via the CLI to start farming.",
        ),
        Action::say(
            Style::Plain,
            format!(
                "To check the status of your farm and node, run the following commands from the '{dir}' directory:"
            ),
        ),
        Action::say(Style::Notice, "  . ./activate\n  chia farm summary\n  chia show -s"),
        Action::say(Style::Plain, "To stop all services, run:"),
        Action::say(Style::Notice, "  . ./activate\n  chia stop all -d"),
        Action::say(
            Style::Warning,
            "REMINDER: Ensure you have backed up your 24-word mnemonic phrase!",
        ),
    ]
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
