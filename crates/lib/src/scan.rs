//! Directory scanning with inclusion and exclusion patterns.

use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::platform::{absolutize, expand_tilde};

/// Build the inclusion pattern matching paths that end in any of `suffixes`.
///
/// Each suffix is matched literally at the end of the path, so `.h` matches
/// `foo.h` but neither `foo.hpp` nor `fooh`.
pub fn suffix_pattern<S: AsRef<str>>(suffixes: &[S]) -> Result<Regex> {
  if suffixes.is_empty() {
    return Err(Error::InvalidPattern("at least one suffix is required".to_string()));
  }

  let alternatives = suffixes
    .iter()
    .map(|s| regex::escape(s.as_ref()))
    .collect::<Vec<_>>()
    .join("|");
  Ok(Regex::new(&format!("(?:{alternatives})$"))?)
}

/// Compile a user exclusion pattern.
///
/// The pattern is searched anywhere in the full path.
pub fn exclude_pattern(pattern: &str) -> Result<Regex> {
  Ok(Regex::new(pattern)?)
}

/// Roots and filters for one scan.
#[derive(Debug, Clone)]
pub struct ScanRequest {
  pub roots: Vec<PathBuf>,
  pub include: Regex,
  pub exclude: Option<Regex>,
  pub recursive: bool,
}

impl ScanRequest {
  /// Build a request from user-supplied directory strings.
  ///
  /// Each entry is tilde-expanded and made absolute against `cwd`.
  pub fn from_dirs<S: AsRef<str>>(dirs: &[S], cwd: &Path, include: Regex) -> Self {
    let roots = dirs
      .iter()
      .map(|d| absolutize(cwd, &expand_tilde(d.as_ref())))
      .collect();
    Self {
      roots,
      include,
      exclude: None,
      recursive: false,
    }
  }

  pub fn exclude(mut self, exclude: Option<Regex>) -> Self {
    self.exclude = exclude;
    self
  }

  pub fn recursive(mut self, recursive: bool) -> Self {
    self.recursive = recursive;
    self
  }
}

/// Depth-first file collector.
#[derive(Debug)]
pub struct DirectoryScanner {
  request: ScanRequest,
  verbose: bool,
}

impl DirectoryScanner {
  pub fn new(request: ScanRequest) -> Self {
    Self {
      request,
      verbose: false,
    }
  }

  /// Log every directory as it is visited.
  pub fn verbose(mut self, verbose: bool) -> Self {
    self.verbose = verbose;
    self
  }

  /// Roots that do not exist on disk.
  pub fn missing_roots(&self) -> Vec<&Path> {
    self
      .request
      .roots
      .iter()
      .filter(|r| !r.exists())
      .map(PathBuf::as_path)
      .collect()
  }

  fn is_excluded(&self, path: &Path) -> bool {
    self
      .request
      .exclude
      .as_ref()
      .is_some_and(|re| re.is_match(&path.to_string_lossy()))
  }

  fn is_included(&self, path: &Path) -> bool {
    self.request.include.is_match(&path.to_string_lossy())
  }

  /// Collect matching files under every existing root, in traversal order.
  ///
  /// Within a directory, entries are visited in file name order. Missing
  /// roots and unreadable entries are logged and skipped.
  pub fn scan(&self) -> Vec<PathBuf> {
    let missing = self.missing_roots();
    if !missing.is_empty() {
      warn!(dirs = ?missing, "some directories not found");
    }

    info!("scanning directories...");
    let max_depth = if self.request.recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();

    for root in self.request.roots.iter().filter(|r| r.exists()) {
      if self.verbose {
        info!("{}", root.display());
      }

      let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !self.is_excluded(entry.path()));

      for entry in walker {
        let entry = match entry {
          Ok(entry) => entry,
          Err(err) => {
            warn!(error = %err, "skipping unreadable entry");
            continue;
          }
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
          if self.verbose {
            info!("{}", entry.path().display());
          }
        } else if file_type.is_file() && self.is_included(entry.path()) {
          files.push(entry.into_path());
        }
      }
    }

    files
  }
}
