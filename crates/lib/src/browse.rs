//! Launching a source browser over a scanned file set.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::platform::{absolutize, expand_tilde};
use crate::process::{CommandSpec, ProcessRunner};
use crate::scan::{DirectoryScanner, ScanRequest, exclude_pattern, suffix_pattern};

pub const DEFAULT_SUFFIX: &str = ".h";

#[derive(Debug, Clone)]
pub struct BrowseRequest {
  /// Output file for the browser database, passed as `-o`.
  pub output: Option<String>,
  /// Files browsed as given, ahead of any scanned files.
  pub files: Vec<PathBuf>,
  /// Directories to scan. No scan happens when empty.
  pub dirs: Vec<String>,
  pub recursive: bool,
  pub suffixes: Vec<String>,
  pub exclude: Option<String>,
  pub verbose: bool,
  /// Arguments forwarded verbatim to the browser, before the file list.
  pub extra_args: Vec<String>,
  pub program: String,
  pub cwd: PathBuf,
}

impl BrowseRequest {
  pub fn new(cwd: impl Into<PathBuf>) -> Self {
    Self {
      output: None,
      files: Vec::new(),
      dirs: Vec::new(),
      recursive: false,
      suffixes: vec![DEFAULT_SUFFIX.to_string()],
      exclude: None,
      verbose: false,
      extra_args: Vec::new(),
      program: "ebrowse".to_string(),
      cwd: cwd.into(),
    }
  }
}

/// Result of [`launch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseOutcome {
  /// Nothing matched, so the browser was not started.
  NoFiles,
  /// The browser ran and exited with this code.
  Ran(i32),
}

impl BrowseOutcome {
  pub fn exit_code(self) -> i32 {
    match self {
      BrowseOutcome::NoFiles => 0,
      BrowseOutcome::Ran(code) => code,
    }
  }
}

/// Resolve the `-o` target, requiring its parent directory to exist.
fn resolve_output(cwd: &Path, output: &str) -> Result<PathBuf> {
  let path = absolutize(cwd, &expand_tilde(output));
  let parent = path.parent().unwrap_or(path.as_path());
  if !parent.is_dir() {
    return Err(Error::OutputDirectoryNotFound(parent.to_path_buf()));
  }
  Ok(path)
}

/// Collect the explicit files followed by everything the scan finds.
pub fn collect_files(request: &BrowseRequest) -> Result<Vec<PathBuf>> {
  let mut files = request.files.clone();

  if !request.dirs.is_empty() {
    let include = suffix_pattern(&request.suffixes)?;
    let exclude = request.exclude.as_deref().map(exclude_pattern).transpose()?;
    let scan = ScanRequest::from_dirs(&request.dirs, &request.cwd, include)
      .exclude(exclude)
      .recursive(request.recursive);
    files.extend(DirectoryScanner::new(scan).verbose(request.verbose).scan());
  }

  Ok(files)
}

/// Run the browser over the requested files.
///
/// An empty file set is not an error: nothing runs and the outcome is
/// [`BrowseOutcome::NoFiles`].
///
/// # Errors
///
/// `OutputDirectoryNotFound` when the output file's directory is missing,
/// `InvalidPattern` for a bad suffix or exclusion pattern, and `Spawn` when
/// the browser cannot be started.
pub fn launch<R: ProcessRunner + ?Sized>(request: &BrowseRequest, runner: &mut R) -> Result<BrowseOutcome> {
  let mut command = CommandSpec::new(&request.program, &request.cwd);

  if let Some(output) = &request.output {
    let output = resolve_output(&request.cwd, output)?;
    command = command.arg("-o").arg(output.to_string_lossy());
  }

  let files = collect_files(request)?;
  if files.is_empty() {
    debug!("no files matched");
    return Ok(BrowseOutcome::NoFiles);
  }

  info!("Browsing...");
  if request.verbose {
    for file in &files {
      info!("{}", file.display());
    }
  }

  let command = command
    .args(request.extra_args.iter().cloned())
    .args(files.iter().map(|f| f.to_string_lossy().into_owned()));
  Ok(BrowseOutcome::Ran(runner.run(&command)?))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::testutil::FakeRunner;
  use tempfile::TempDir;

  fn tree(files: &[&str]) -> TempDir {
    let temp = TempDir::new().unwrap();
    for file in files {
      let path = temp.path().join(file);
      std::fs::create_dir_all(path.parent().unwrap()).unwrap();
      std::fs::write(path, "").unwrap();
    }
    temp
  }

  #[test]
  fn missing_output_directory_is_rejected_before_running() {
    let temp = tree(&["a.h"]);
    let mut runner = FakeRunner::new();
    let request = BrowseRequest {
      output: Some("nope/BROWSE".to_string()),
      files: vec![temp.path().join("a.h")],
      ..BrowseRequest::new(temp.path())
    };

    let err = launch(&request, &mut runner).unwrap_err();

    assert!(matches!(err, Error::OutputDirectoryNotFound(ref d) if d == &temp.path().join("nope")));
    assert_eq!(err.exit_code(), -1);
    assert!(runner.calls.is_empty());
  }

  #[test]
  fn no_files_is_a_successful_no_op() {
    let temp = tree(&["readme.txt"]);
    let mut runner = FakeRunner::new();
    let request = BrowseRequest {
      dirs: vec![".".to_string()],
      ..BrowseRequest::new(temp.path())
    };

    let outcome = launch(&request, &mut runner).unwrap();
    assert_eq!(outcome, BrowseOutcome::NoFiles);
    assert_eq!(outcome.exit_code(), 0);
    assert!(runner.calls.is_empty());
  }

  #[test]
  fn command_line_has_output_extras_then_files() {
    let temp = tree(&["inc/a.h", "inc/b.cpp", "inc/c.py"]);
    let mut runner = FakeRunner::new().respond("ebrowse", [4]);
    let request = BrowseRequest {
      output: Some("BROWSE".to_string()),
      files: vec![PathBuf::from("/explicit/main.cc")],
      dirs: vec!["inc".to_string()],
      suffixes: vec![".h".to_string(), ".cpp".to_string()],
      extra_args: vec!["--verbose".to_string()],
      ..BrowseRequest::new(temp.path())
    };

    let outcome = launch(&request, &mut runner).unwrap();

    assert_eq!(outcome, BrowseOutcome::Ran(4));
    assert_eq!(outcome.exit_code(), 4);
    let call = &runner.calls[0];
    assert_eq!(call.program, "ebrowse");
    let expected: Vec<String> = vec![
      "-o".to_string(),
      temp.path().join("BROWSE").to_string_lossy().into_owned(),
      "--verbose".to_string(),
      "/explicit/main.cc".to_string(),
      temp.path().join("inc/a.h").to_string_lossy().into_owned(),
      temp.path().join("inc/b.cpp").to_string_lossy().into_owned(),
    ];
    assert_eq!(call.args, expected);
  }

  #[test]
  fn scan_only_runs_with_dirs() {
    let temp = tree(&["a.h"]);
    let request = BrowseRequest {
      files: vec![PathBuf::from("given.h")],
      ..BrowseRequest::new(temp.path())
    };

    assert_eq!(collect_files(&request).unwrap(), vec![PathBuf::from("given.h")]);
  }

  #[test]
  fn exclusion_applies_to_scanned_files() {
    let temp = tree(&["src/a.h", "src/a_test.h"]);
    let request = BrowseRequest {
      dirs: vec!["src".to_string()],
      exclude: Some("_test".to_string()),
      ..BrowseRequest::new(temp.path())
    };

    assert_eq!(collect_files(&request).unwrap(), vec![temp.path().join("src/a.h")]);
  }
}
