//! Error taxonomy shared by all three tools.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by project resolution, scanning and the build pipelines.
#[derive(Debug, Error)]
pub enum Error {
  /// More than one project file candidate in the working directory.
  #[error("found two or more files which may be project file in {dir}: {}", format_candidates(.candidates))]
  AmbiguousProject { dir: PathBuf, candidates: Vec<PathBuf> },

  /// No project file candidate in the working directory.
  #[error("no project file found in {0}")]
  NoProjectFound(PathBuf),

  /// Build directory is absent and creation was not requested.
  #[error("build directory not found: {0}")]
  MissingBuildDirectory(PathBuf),

  /// Parent directory of the requested output file does not exist.
  #[error("output directory not found: {0}")]
  OutputDirectoryNotFound(PathBuf),

  /// Current directory is not inside the expected source tree.
  #[error("not in {project} repository: {dir}")]
  NotARepository { project: String, dir: PathBuf },

  /// A command in a non-retried phase exited unsuccessfully.
  #[error("command failed with exit code {code}: {command}")]
  ExternalCommandFailed { command: String, code: i32 },

  /// The host OS has no configure recipe.
  #[error("unsupported platform: {0}")]
  UnsupportedPlatform(String),

  /// A user-provided or derived pattern did not compile.
  #[error("invalid pattern: {0}")]
  InvalidPattern(String),

  /// The external program could not be started at all.
  #[error("failed to run {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

impl Error {
  /// Process exit code the command-line entry points report for this error.
  pub fn exit_code(&self) -> i32 {
    match self {
      Error::OutputDirectoryNotFound(_) => -1,
      _ => 1,
    }
  }
}

impl From<regex::Error> for Error {
  fn from(err: regex::Error) -> Self {
    Error::InvalidPattern(err.to_string())
  }
}

fn format_candidates(candidates: &[PathBuf]) -> String {
  candidates
    .iter()
    .map(|p| p.display().to_string())
    .collect::<Vec<_>>()
    .join(", ")
}

pub type Result<T> = std::result::Result<T, Error>;
