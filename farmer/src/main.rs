//! Chia farming node bootstrap.
//!
//! Installs OS packages, clones the Chia repository into `./chia-blockchain`,
//! runs its installer, initializes configuration, generates a wallet key and
//! starts the farmer services. Takes no arguments; constants can be overridden
//! with an optional `farmer.toml` in the working directory.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error};

use farmer::core::style::Style;
use farmer::exit_codes;
use farmer::io::config::{CONFIG_FILE, load_config};
use farmer::io::console::Console;
use farmer::io::probe::LocalFs;
use farmer::io::process::StreamingRunner;
use farmer::logging;
use farmer::setup::run_setup;
use farmer::steps::{SetupContext, default_steps};

#[derive(Parser)]
#[command(
    name = "farmer",
    version,
    about = "Bootstrap a Chia farming node on a Debian-based host"
)]
struct Cli {}

fn main() {
    let _cli = Cli::parse();
    logging::init();

    if let Err(err) = run() {
        let code = exit_codes::for_error(&err);
        error!(exit_code = code, "setup failed: {err:#}");
        let mut console = Console::stderr();
        // Nothing left to report to if stderr itself is gone.
        let _ = console.blank();
        let _ = console.line(Style::Failure, &format!("Setup failed: {err:#}"));
        std::process::exit(code);
    }
}

fn run() -> Result<()> {
    let work_dir = std::env::current_dir().context("resolve working directory")?;
    let config = load_config(&work_dir.join(CONFIG_FILE))?;
    let ctx = SetupContext::new(work_dir, config);
    debug!(repo_dir = %ctx.repo_dir.display(), "resolved setup context");

    let mut console = Console::stdout();
    let report = run_setup(
        &ctx,
        &default_steps(),
        &mut StreamingRunner,
        &LocalFs,
        &mut console,
    )?;
    debug!(?report, "setup complete");
    Ok(())
}
