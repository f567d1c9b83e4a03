//! Implementation of `emacs-build`.
//!
//! Pulls, configures and builds GNU Emacs from the git work tree in the
//! current directory, retrying make on failure.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use devwrap_lib::Error;
use devwrap_lib::platform::available_cpus;
use devwrap_lib::process::SystemRunner;
use devwrap_lib::repo::{RepoBuildAutomator, RepoBuildOptions};

use crate::output::{format_duration, print_error, print_info, print_success};
use crate::prompts::StdinReader;

/// Fetch, configure and build Emacs from its git repository.
#[derive(Debug, Parser)]
#[command(name = "emacs-build", version, about)]
pub struct RepoBuildArgs {
  /// Fetch and reset to upstream before building
  #[arg(short, long)]
  pub pull: bool,

  /// Run autogen, configure and make
  #[arg(short, long)]
  pub build: bool,

  /// Parallel make jobs (1 to the number of CPUs; default: number of CPUs)
  #[arg(short, long = "job", value_parser = parse_jobs)]
  pub jobs: Option<usize>,

  /// Installation prefix passed to configure
  #[arg(short = 'D', long = "install-directory")]
  pub install_directory: Option<String>,

  /// Run `make install`
  #[arg(short = 'I', long)]
  pub install: bool,

  /// Remove untracked files with `git clean -dfx`
  #[arg(short = 'l', long)]
  pub clean: bool,

  /// Ask before pulling and building unless requested by flags
  #[arg(short, long)]
  pub interactive: bool,

  /// Enable verbose output
  #[arg(short, long)]
  pub verbose: bool,
}

fn parse_jobs(value: &str) -> std::result::Result<usize, String> {
  let jobs: usize = value.parse().map_err(|_| format!("`{value}` is not a number"))?;
  let max = available_cpus();
  if (1..=max).contains(&jobs) {
    Ok(jobs)
  } else {
    Err(format!("job count must be between 1 and {max}"))
  }
}

impl RepoBuildArgs {
  pub fn options(&self) -> RepoBuildOptions {
    RepoBuildOptions {
      pull: self.pull,
      build: self.build,
      jobs: self.jobs.unwrap_or_else(available_cpus),
      install_dir: self.install_directory.clone(),
      install: self.install,
      clean: self.clean,
      interactive: self.interactive,
    }
  }
}

/// Execute the Emacs build pipeline.
///
/// Returns 1 when the current directory is not an Emacs checkout, otherwise
/// the exit code of the last make attempt (0 when nothing was built).
///
/// # Errors
///
/// Returns an error when a git, autogen or configure step fails.
pub fn run(args: RepoBuildArgs) -> Result<i32> {
  let start = Instant::now();
  let cwd = std::env::current_dir().context("Failed to determine current directory")?;
  let options = args.options();
  debug!(cwd = %cwd.display(), ?options, "emacs-build options");

  let mut runner = SystemRunner;
  let mut reader = StdinReader;
  let mut stdout = std::io::stdout();
  let report = match RepoBuildAutomator::new(cwd, &mut runner, &mut reader, &mut stdout).run(&options) {
    Ok(report) => report,
    Err(Error::NotARepository { .. }) => {
      print_error("Not in emacs repository.");
      return Ok(1);
    }
    Err(err) => return Err(err).context("Failed to build emacs"),
  };

  let code = report.exit_code();
  match report.attempts.last() {
    None => print_info("Nothing to build."),
    Some(last) if code == 0 => print_success(&format!(
      "Build succeeded after {} attempt(s) in {}",
      last.number,
      format_duration(start.elapsed())
    )),
    Some(last) => print_error(&format!(
      "Build failed after {} attempt(s) with exit code {} (see {})",
      last.number,
      code,
      last.log_file.display()
    )),
  }

  Ok(code)
}
