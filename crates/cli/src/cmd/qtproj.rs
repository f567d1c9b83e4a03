//! Implementation of `build-qtproj`.
//!
//! Resolves a qmake project in the current directory and builds it in an
//! out-of-source directory.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use devwrap_lib::process::SystemRunner;
use devwrap_lib::project::{BuildRequest, DEFAULT_BUILD_DIR, build_project};

use crate::output::{print_stat, print_success, print_warning};

/// Run qmake and make for the project in the current directory.
#[derive(Debug, Parser)]
#[command(name = "build-qtproj", version, about)]
pub struct QtprojArgs {
  /// Project file (default: the single *.pro or *.qproj in the current directory)
  #[arg(short = 'p', long = "qproj")]
  pub qproj: Option<PathBuf>,

  /// Build directory
  #[arg(short = 'd', long = "build-dir", default_value = DEFAULT_BUILD_DIR)]
  pub build_dir: PathBuf,

  /// Create the build directory if it does not exist
  #[arg(short, long)]
  pub force: bool,

  /// Enable verbose output
  #[arg(short, long)]
  pub verbose: bool,

  /// qmake executable
  #[arg(long, env = "QMAKE", default_value = "qmake")]
  pub qmake: String,

  /// make executable
  #[arg(long, env = "MAKE", default_value = "make")]
  pub make: String,
}

/// Execute the project build.
///
/// Returns 0 once both tools have run, whatever their exit codes; a failing
/// tool is reported as a warning only.
///
/// # Errors
///
/// Returns an error if the project file cannot be resolved, the build
/// directory is missing without `--force`, or a tool cannot be started.
pub fn run(args: QtprojArgs) -> Result<i32> {
  let cwd = std::env::current_dir().context("Failed to determine current directory")?;
  debug!(cwd = %cwd.display(), ?args, "build-qtproj arguments");

  let request = BuildRequest {
    project_file: args.qproj,
    build_dir: args.build_dir,
    create_if_missing: args.force,
    qmake: args.qmake,
    make: args.make,
    ..BuildRequest::new(cwd)
  };

  let mut runner = SystemRunner;
  let outcome = build_project(&request, &mut runner)?;

  if outcome.succeeded() {
    print_success("Build finished");
  } else {
    print_warning(&format!(
      "Build tools reported failures (qmake: {}, make: {})",
      outcome.qmake_code, outcome.make_code
    ));
  }
  print_stat("Project", &outcome.project_file.display().to_string());
  print_stat("Build dir", &outcome.build_dir.display().to_string());

  Ok(0)
}
