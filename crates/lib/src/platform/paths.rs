use std::path::{Path, PathBuf};

/// Returns the user's home directory, if one can be determined.
pub fn home_dir() -> Option<PathBuf> {
  dirs::home_dir()
}

/// Expand a leading `~` or `~/` to the home directory.
///
/// Other inputs, including `~user` forms, are returned unchanged.
pub fn expand_tilde(path: &str) -> PathBuf {
  let rest = if path == "~" {
    Some("")
  } else {
    path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\"))
  };

  match (rest, home_dir()) {
    (Some(rest), Some(home)) if rest.is_empty() => home,
    (Some(rest), Some(home)) => home.join(rest),
    _ => PathBuf::from(path),
  }
}

/// Make `path` absolute by joining it onto `base` when it is relative.
///
/// `.` components are dropped. The result is not canonicalized, so the path
/// does not need to exist.
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
  let joined = if path.is_absolute() { path.to_path_buf() } else { base.join(path) };
  joined.components().collect()
}
