//! Fetch, configure and build a project from its git working tree.
//!
//! The pipeline runs in fixed phases:
//!
//! 1. detection: the working directory must be inside a git work tree that
//!    contains the profile's marker file;
//! 2. syncing (optional): `git fetch --all`, optional `git clean -dfx`,
//!    `git reset --hard`, `git pull`;
//! 3. configuring (optional): autogen script, then configure with an
//!    augmented environment;
//! 4. building: `make`, retried up to [`MAX_BUILD_ATTEMPTS`] times.
//!
//! Any failure before the build phase is fatal. Build failures are retried and
//! only the last exit code is reported.

use std::fmt;
use std::io::Write;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::env::Environment;
use crate::error::{Error, Result};
use crate::platform::{Os, absolutize, expand_tilde};
use crate::process::{CommandSpec, OutputMode, ProcessRunner, run_logged};
use crate::prompt::{LineReader, confirm};

/// Upper bound on make runs per invocation.
pub const MAX_BUILD_ATTEMPTS: u32 = 5;

pub const PULL_PROMPT: &str = "Continue to pull? (y/n): ";
pub const BUILD_PROMPT: &str = "Continue to build? (y/n): ";

/// The source tree a [`RepoBuildAutomator`] knows how to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoProfile {
  /// Human-readable project name, used in messages.
  pub name: String,
  /// File that must exist (relative to the work tree) to accept the tree.
  pub marker: PathBuf,
  /// Prefix of the log files written to the work tree.
  pub log_prefix: String,
  pub autogen: String,
  pub configure: String,
  /// Extra configure arguments on macOS.
  pub darwin_configure_args: Vec<String>,
  pub make: String,
}

impl RepoProfile {
  /// GNU Emacs built from a git checkout.
  pub fn emacs() -> Self {
    Self {
      name: "emacs".to_string(),
      marker: PathBuf::from("src").join("emacs-icon.h"),
      log_prefix: "emacs".to_string(),
      autogen: "./autogen.sh".to_string(),
      configure: "./configure".to_string(),
      darwin_configure_args: vec!["--with-ns".to_string(), "--without-x".to_string()],
      make: "make".to_string(),
    }
  }

  /// Configure arguments for `os`, before any `--prefix`.
  pub fn configure_args(&self, os: Os) -> Result<Vec<String>> {
    match os {
      Os::Linux => Ok(Vec::new()),
      Os::MacOs => Ok(self.darwin_configure_args.clone()),
      Os::Other(name) => Err(Error::UnsupportedPlatform(name.to_string())),
    }
  }

  pub fn autogen_log(&self) -> String {
    format!("{}_autogen.log", self.log_prefix)
  }

  pub fn configure_log(&self) -> String {
    format!("{}_configure.log", self.log_prefix)
  }

  pub fn make_log(&self, attempt: u32) -> String {
    format!("{}_make.log.{}", self.log_prefix, attempt)
  }
}

/// What to do in one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoBuildOptions {
  pub pull: bool,
  pub build: bool,
  /// Forwarded to make as `-j<jobs>`.
  pub jobs: usize,
  /// Passed to configure as `--prefix`.
  pub install_dir: Option<String>,
  /// Run `make install` instead of `make`.
  pub install: bool,
  /// Run `git clean -dfx` once, during sync or before configuring.
  pub clean: bool,
  /// Ask before syncing or building when the matching flag is not set.
  pub interactive: bool,
}

impl Default for RepoBuildOptions {
  fn default() -> Self {
    Self {
      pull: false,
      build: false,
      jobs: crate::platform::available_cpus(),
      install_dir: None,
      install: false,
      clean: false,
      interactive: false,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  Syncing,
  Cleaning,
  Configuring,
  Building,
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Phase::Syncing => "syncing",
      Phase::Cleaning => "cleaning",
      Phase::Configuring => "configuring",
      Phase::Building => "building",
    };
    f.write_str(name)
  }
}

/// One make run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildAttempt {
  /// 1-based attempt number.
  pub number: u32,
  pub command: String,
  pub log_file: PathBuf,
  pub exit_code: i32,
}

/// Summary of a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoBuildReport {
  pub synced: bool,
  pub cleaned: bool,
  pub configured: bool,
  pub attempts: Vec<BuildAttempt>,
}

impl RepoBuildReport {
  /// Exit code of the last build attempt, or 0 when nothing was built.
  pub fn exit_code(&self) -> i32 {
    self.attempts.last().map_or(0, |a| a.exit_code)
  }
}

/// Drives the sync/configure/build pipeline for one work tree.
///
/// External effects go through the injected runner, line reader and echo
/// writer, so the whole pipeline can run against test doubles.
pub struct RepoBuildAutomator<'a> {
  work_dir: PathBuf,
  profile: RepoProfile,
  os: Os,
  base_env: Environment,
  git: String,
  runner: &'a mut dyn ProcessRunner,
  reader: &'a mut dyn LineReader,
  echo: &'a mut dyn Write,
}

impl<'a> RepoBuildAutomator<'a> {
  pub fn new(
    work_dir: impl Into<PathBuf>,
    runner: &'a mut dyn ProcessRunner,
    reader: &'a mut dyn LineReader,
    echo: &'a mut dyn Write,
  ) -> Self {
    Self {
      work_dir: work_dir.into(),
      profile: RepoProfile::emacs(),
      os: Os::current(),
      base_env: Environment::inherit(),
      git: "git".to_string(),
      runner,
      reader,
      echo,
    }
  }

  pub fn profile(mut self, profile: RepoProfile) -> Self {
    self.profile = profile;
    self
  }

  pub fn os(mut self, os: Os) -> Self {
    self.os = os;
    self
  }

  /// Environment that configure and make augmentation starts from.
  pub fn environment(mut self, env: Environment) -> Self {
    self.base_env = env;
    self
  }

  /// Check that the work dir is a git work tree containing the marker file.
  ///
  /// A git that cannot be started counts as "not a repository".
  pub fn detect(&mut self) -> Result<()> {
    let probe = CommandSpec::new(&self.git, &self.work_dir)
      .args(["rev-parse", "--is-inside-work-tree"])
      .output(OutputMode::Null);

    let inside = match self.runner.run(&probe) {
      Ok(code) => code == 0,
      Err(err) => {
        debug!(error = %err, "git probe failed");
        false
      }
    };

    if !inside || !self.work_dir.join(&self.profile.marker).exists() {
      return Err(Error::NotARepository {
        project: self.profile.name.clone(),
        dir: self.work_dir.clone(),
      });
    }
    Ok(())
  }

  /// Run detection and every requested phase.
  pub fn run(&mut self, options: &RepoBuildOptions) -> Result<RepoBuildReport> {
    self.detect()?;

    let mut report = RepoBuildReport::default();

    if self.should_run(options.pull, options.interactive, PULL_PROMPT)? {
      self.sync(options.clean)?;
      report.synced = true;
      report.cleaned = options.clean;
    }

    if self.should_run(options.build, options.interactive, BUILD_PROMPT)? {
      if options.clean && !report.cleaned {
        self.clean()?;
        report.cleaned = true;
      }
      let env = self.configure(options)?;
      report.configured = true;
      report.attempts = self.build(options, &env)?;
    }

    Ok(report)
  }

  fn should_run(&mut self, requested: bool, interactive: bool, prompt: &str) -> Result<bool> {
    if requested {
      return Ok(true);
    }
    if !interactive {
      return Ok(false);
    }
    confirm(&mut *self.reader, prompt)
  }

  fn checked(&mut self, spec: &CommandSpec) -> Result<()> {
    let code = self.runner.run(spec)?;
    if code != 0 {
      return Err(Error::ExternalCommandFailed {
        command: spec.display(),
        code,
      });
    }
    Ok(())
  }

  fn git(&mut self, args: &[&str]) -> Result<()> {
    let spec = CommandSpec::new(&self.git, &self.work_dir).args(args.iter().copied());
    self.checked(&spec)
  }

  /// Fetch and hard-reset to upstream, optionally cleaning in between.
  pub fn sync(&mut self, clean: bool) -> Result<()> {
    info!(phase = %Phase::Syncing, "updating work tree");
    self.git(&["fetch", "--all"])?;
    if clean {
      self.clean()?;
    }
    self.git(&["reset", "--hard"])?;
    self.git(&["pull"])
  }

  /// Remove every untracked and ignored file from the work tree.
  pub fn clean(&mut self) -> Result<()> {
    info!(phase = %Phase::Cleaning, "removing untracked files");
    self.git(&["clean", "-dfx"])
  }

  fn run_step(&mut self, spec: CommandSpec, log_name: &str) -> Result<()> {
    let display = spec.display();
    let log = self.work_dir.join(log_name);
    let code = run_logged(&mut *self.runner, spec, &log, &mut *self.echo)?;
    if code != 0 {
      return Err(Error::ExternalCommandFailed { command: display, code });
    }
    Ok(())
  }

  /// Run autogen and configure, returning the environment make should use.
  pub fn configure(&mut self, options: &RepoBuildOptions) -> Result<Environment> {
    info!(phase = %Phase::Configuring, os = %self.os, "configuring");
    let mut args = self.profile.configure_args(self.os)?;

    let autogen = CommandSpec::new(&self.profile.autogen, &self.work_dir);
    let autogen_log = self.profile.autogen_log();
    self.run_step(autogen, &autogen_log)?;

    if let Some(dir) = &options.install_dir {
      let prefix = absolutize(&self.work_dir, &expand_tilde(dir));
      args.push(format!("--prefix={}", prefix.display()));
    }

    let env = self.base_env.clone().for_build(self.os);
    let configure = CommandSpec::new(&self.profile.configure, &self.work_dir)
      .args(args)
      .env(env.clone());
    let configure_log = self.profile.configure_log();
    self.run_step(configure, &configure_log)?;

    Ok(env)
  }

  /// Run make until it succeeds or [`MAX_BUILD_ATTEMPTS`] runs have failed.
  ///
  /// Failures are not errors here: callers read the last attempt's exit code.
  pub fn build(&mut self, options: &RepoBuildOptions, env: &Environment) -> Result<Vec<BuildAttempt>> {
    let mut command = CommandSpec::new(&self.profile.make, &self.work_dir).env(env.clone());
    if options.install {
      command = command.arg("install");
    }
    command = command.arg(format!("-j{}", options.jobs));

    let mut attempts = Vec::new();
    for number in 1..=MAX_BUILD_ATTEMPTS {
      let log_file = self.work_dir.join(self.profile.make_log(number));
      info!(phase = %Phase::Building, attempt = number, log = %log_file.display(), "running {}", command.display());

      let exit_code = run_logged(&mut *self.runner, command.clone(), &log_file, &mut *self.echo)?;
      attempts.push(BuildAttempt {
        number,
        command: command.display(),
        log_file,
        exit_code,
      });

      if exit_code == 0 {
        info!(attempt = number, "build succeeded");
        break;
      }
      warn!(attempt = number, code = exit_code, "build failed");
    }

    Ok(attempts)
  }
}
