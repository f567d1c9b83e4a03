//! qmake project builds.
//!
//! Resolves a project descriptor (`*.pro` / `*.qproj`), prepares an
//! out-of-source build directory and runs qmake followed by make inside it.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::platform::absolutize;
use crate::process::{CommandSpec, ProcessRunner};

/// File name suffixes recognized as project descriptors.
pub const PROJECT_SUFFIXES: &[&str] = &[".pro", ".qproj"];

/// Default build directory, relative to the working directory.
pub const DEFAULT_BUILD_DIR: &str = "out/Default";

/// Find the single project descriptor directly inside `dir`.
///
/// # Errors
///
/// `NoProjectFound` when there is no candidate and `AmbiguousProject` when
/// there are several.
pub fn find_project_file(dir: &Path) -> Result<PathBuf> {
  let mut candidates = Vec::new();

  for entry in std::fs::read_dir(dir)? {
    let entry = entry?;
    if entry.file_type()?.is_dir() {
      continue;
    }
    let name = entry.file_name();
    let Some(name) = name.to_str() else { continue };
    if PROJECT_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
      candidates.push(dir.join(name));
    }
  }

  candidates.sort();

  match candidates.len() {
    0 => Err(Error::NoProjectFound(dir.to_path_buf())),
    1 => Ok(candidates.remove(0)),
    _ => Err(Error::AmbiguousProject {
      dir: dir.to_path_buf(),
      candidates,
    }),
  }
}

/// Everything needed to configure and build one project.
#[derive(Debug, Clone)]
pub struct BuildRequest {
  /// Explicit project file. Resolved from `working_dir` when `None`.
  pub project_file: Option<PathBuf>,
  pub working_dir: PathBuf,
  pub build_dir: PathBuf,
  /// Create `build_dir` (with parents) when it does not exist.
  pub create_if_missing: bool,
  pub qmake: String,
  pub make: String,
}

impl BuildRequest {
  pub fn new(working_dir: impl Into<PathBuf>) -> Self {
    Self {
      project_file: None,
      working_dir: working_dir.into(),
      build_dir: PathBuf::from(DEFAULT_BUILD_DIR),
      create_if_missing: false,
      qmake: "qmake".to_string(),
      make: "make".to_string(),
    }
  }
}

/// What `build_project` resolved and how the tools exited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
  pub project_file: PathBuf,
  pub build_dir: PathBuf,
  pub qmake_code: i32,
  pub make_code: i32,
}

impl BuildOutcome {
  pub fn succeeded(&self) -> bool {
    self.qmake_code == 0 && self.make_code == 0
  }
}

/// Run qmake then make for the project described by `request`.
///
/// Tool exit codes are reported in the outcome and logged when non-zero, but
/// they do not abort the build: make always runs after qmake.
///
/// # Errors
///
/// Project resolution errors, `MissingBuildDirectory` when the directory is
/// absent and `create_if_missing` is false, and `Spawn` when a tool cannot be
/// started. No command runs before validation succeeds.
pub fn build_project<R: ProcessRunner + ?Sized>(request: &BuildRequest, runner: &mut R) -> Result<BuildOutcome> {
  let project_file = match &request.project_file {
    Some(path) => absolutize(&request.working_dir, path),
    None => find_project_file(&request.working_dir)?,
  };
  let build_dir = absolutize(&request.working_dir, &request.build_dir);

  info!("project file:  {}", project_file.display());
  info!("working dir:   {}", request.working_dir.display());
  info!("build dir:     {}", build_dir.display());

  if !build_dir.exists() {
    if !request.create_if_missing {
      return Err(Error::MissingBuildDirectory(build_dir));
    }
    std::fs::create_dir_all(&build_dir)?;
    info!(dir = %build_dir.display(), "created build directory");
  }

  info!("continue to {}...", request.qmake);
  let qmake = CommandSpec::new(&request.qmake, &build_dir).arg(project_file.to_string_lossy());
  let qmake_code = runner.run(&qmake)?;
  if qmake_code != 0 {
    warn!(code = qmake_code, "{} exited unsuccessfully", request.qmake);
  }

  info!("continue to {}...", request.make);
  let make = CommandSpec::new(&request.make, &build_dir);
  let make_code = runner.run(&make)?;
  if make_code != 0 {
    warn!(code = make_code, "{} exited unsuccessfully", request.make);
  }

  Ok(BuildOutcome {
    project_file,
    build_dir,
    qmake_code,
    make_code,
  })
}
