//! External process execution.
//!
//! Every external tool (qmake, make, ebrowse, git, autogen/configure scripts) is
//! launched through [`ProcessRunner`], so pipelines can be driven by a scripted
//! runner in tests. Execution is synchronous: `run` blocks until the child exits.

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use tracing::debug;

use crate::env::Environment;
use crate::error::{Error, Result};

/// Where a child's stdout and stderr go.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputMode {
  /// Share the parent's stdout/stderr.
  #[default]
  Inherit,
  /// Append both streams to a log file.
  Log(PathBuf),
  /// Discard both streams.
  Null,
}

/// A fully described external command invocation.
#[derive(Debug, Clone)]
pub struct CommandSpec {
  pub program: String,
  pub args: Vec<String>,
  pub cwd: PathBuf,
  /// Explicit environment for the child. `None` inherits the parent's.
  pub env: Option<Environment>,
  pub output: OutputMode,
}

impl CommandSpec {
  pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      cwd: cwd.into(),
      env: None,
      output: OutputMode::Inherit,
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn env(mut self, env: Environment) -> Self {
    self.env = Some(env);
    self
  }

  pub fn output(mut self, output: OutputMode) -> Self {
    self.output = output;
    self
  }

  /// The command line as a single shell-like string, for messages.
  pub fn display(&self) -> String {
    std::iter::once(self.program.as_str())
      .chain(self.args.iter().map(String::as_str))
      .collect::<Vec<_>>()
      .join(" ")
  }
}

/// Runs external commands and reports their exit codes.
pub trait ProcessRunner {
  /// Run `spec` to completion and return its exit code.
  ///
  /// A non-zero exit is not an error here; only a failure to start the
  /// program is.
  fn run(&mut self, spec: &CommandSpec) -> Result<i32>;
}

/// Runs commands as real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
  fn run(&mut self, spec: &CommandSpec) -> Result<i32> {
    let mut command = Command::new(&spec.program);
    command.args(&spec.args).current_dir(&spec.cwd);

    if let Some(env) = &spec.env {
      command.env_clear().envs(env.iter());
    }

    match &spec.output {
      OutputMode::Inherit => {}
      OutputMode::Log(path) => {
        let log = OpenOptions::new().create(true).append(true).open(path)?;
        command.stdout(log.try_clone()?).stderr(log);
      }
      OutputMode::Null => {
        command.stdout(Stdio::null()).stderr(Stdio::null());
      }
    }

    debug!(cmd = %spec.display(), cwd = ?spec.cwd, "spawning process");

    let status = command.status().map_err(|source| Error::Spawn {
      program: spec.program.clone(),
      source,
    })?;

    let code = exit_code(status);
    debug!(cmd = %spec.program, code, "process exited");
    Ok(code)
  }
}

/// Normalize an exit status to an integer code.
///
/// Children killed by a signal report the negated signal number.
pub fn exit_code(status: ExitStatus) -> i32 {
  if let Some(code) = status.code() {
    return code;
  }

  #[cfg(unix)]
  {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = status.signal() {
      return -signal;
    }
  }

  -1
}

/// Run `spec` with its output captured to `log`, then copy the log to `echo`.
///
/// The log file is truncated first so every phase or attempt gets a fresh file.
pub fn run_logged<R, W>(runner: &mut R, spec: CommandSpec, log: &Path, echo: &mut W) -> Result<i32>
where
  R: ProcessRunner + ?Sized,
  W: Write + ?Sized,
{
  File::create(log)?;

  let spec = spec.output(OutputMode::Log(log.to_path_buf()));
  let code = runner.run(&spec)?;

  echo_file(log, echo)?;
  Ok(code)
}

fn echo_file<W: Write + ?Sized>(path: &Path, echo: &mut W) -> Result<()> {
  let mut contents = Vec::new();
  File::open(path)?.read_to_end(&mut contents)?;
  echo.write_all(&contents)?;
  echo.flush()?;
  Ok(())
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
  use super::*;
  use crate::util::testutil::shell_cmd;
  use tempfile::TempDir;

  fn shell(script: &str, cwd: &Path) -> CommandSpec {
    let (program, args) = shell_cmd(script);
    CommandSpec::new(program, cwd).args(args)
  }

  #[test]
  fn reports_exit_code() {
    let temp = TempDir::new().unwrap();
    let mut runner = SystemRunner;

    assert_eq!(runner.run(&shell("exit 0", temp.path())).unwrap(), 0);
    assert_eq!(runner.run(&shell("exit 3", temp.path())).unwrap(), 3);
  }

  #[test]
  fn missing_program_is_spawn_error() {
    let temp = TempDir::new().unwrap();
    let spec = CommandSpec::new("definitely-not-a-real-program-xyz", temp.path());

    let err = SystemRunner.run(&spec).unwrap_err();
    assert!(matches!(err, Error::Spawn { .. }), "unexpected error: {err}");
  }

  #[test]
  fn runs_in_requested_directory() {
    let temp = TempDir::new().unwrap();
    let spec = shell("touch marker", temp.path());

    SystemRunner.run(&spec).unwrap();
    assert!(temp.path().join("marker").exists());
  }

  #[test]
  fn explicit_environment_replaces_inherited() {
    let temp = TempDir::new().unwrap();
    let log = temp.path().join("env.log");
    let env = Environment::from_pairs([("PATH", "/usr/bin:/bin"), ("ONLY_THIS", "yes")]);
    let spec = shell("echo \"$ONLY_THIS-${HOME:-unset}\"", temp.path()).env(env);

    let mut echoed = Vec::new();
    let code = run_logged(&mut SystemRunner, spec, &log, &mut echoed).unwrap();

    assert_eq!(code, 0);
    assert_eq!(String::from_utf8(echoed).unwrap().trim(), "yes-unset");
  }

  #[test]
  fn run_logged_captures_both_streams_and_truncates() {
    let temp = TempDir::new().unwrap();
    let log = temp.path().join("step.log");
    std::fs::write(&log, "stale contents\n").unwrap();

    let spec = shell("echo out; echo err >&2; exit 2", temp.path());
    let mut echoed = Vec::new();
    let code = run_logged(&mut SystemRunner, spec, &log, &mut echoed).unwrap();

    assert_eq!(code, 2);
    let text = String::from_utf8(echoed).unwrap();
    assert!(text.contains("out"));
    assert!(text.contains("err"));
    assert!(!text.contains("stale"));
    assert_eq!(std::fs::read_to_string(&log).unwrap(), text);
  }

  #[test]
  fn display_joins_program_and_args() {
    let spec = CommandSpec::new("make", "/tmp").args(["install", "-j4"]);
    assert_eq!(spec.display(), "make install -j4");
  }
}
