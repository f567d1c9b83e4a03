//! Child-process environments.
//!
//! An [`Environment`] is a snapshot value: augmenting it returns a new value and
//! never touches the parent process environment. Pipelines pass it explicitly
//! to each [`CommandSpec`](crate::process::CommandSpec).

use std::collections::BTreeMap;

use crate::platform::Os;

/// Compiler flags added to `CFLAGS` on every platform.
pub const BUILD_CFLAGS: &str = "-pipe -march=native";

/// Linker flags added to `LDFLAGS` on Linux.
pub const LINUX_LDFLAGS: &str = "-Wl,-flto -Wl,-O2";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
  vars: BTreeMap<String, String>,
}

impl Environment {
  /// Snapshot the current process environment.
  ///
  /// Variables whose name or value is not valid Unicode are skipped.
  pub fn inherit() -> Self {
    let vars = std::env::vars_os()
      .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
      .collect();
    Self { vars }
  }

  pub fn from_pairs<I, K, V>(pairs: I) -> Self
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
  {
    Self {
      vars: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
    }
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    self.vars.get(key).map(String::as_str)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.vars.insert(key.into(), value.into());
    self
  }

  /// Append `flag` to the space-separated variable `key`.
  ///
  /// Unset or empty variables are set to `flag`. A variable that already
  /// contains `flag` is left unchanged, so repeated calls are idempotent.
  pub fn with_flag(self, key: &str, flag: &str) -> Self {
    let value = match self.get(key) {
      None | Some("") => flag.to_string(),
      Some(current) if current.contains(flag) => current.to_string(),
      Some(current) => format!("{current} {flag}"),
    };
    self.with_var(key, value)
  }

  /// The environment used for configure and make on `os`.
  pub fn for_build(self, os: Os) -> Self {
    let env = self.with_flag("CFLAGS", BUILD_CFLAGS);
    match os {
      Os::Linux => env.with_flag("LDFLAGS", LINUX_LDFLAGS),
      _ => env,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unset_flag_is_set() {
    let env = Environment::default().with_flag("CFLAGS", BUILD_CFLAGS);
    assert_eq!(env.get("CFLAGS"), Some(BUILD_CFLAGS));
  }

  #[test]
  fn empty_flag_is_replaced() {
    let env = Environment::from_pairs([("CFLAGS", "")]).with_flag("CFLAGS", "-O2");
    assert_eq!(env.get("CFLAGS"), Some("-O2"));
  }

  #[test]
  fn existing_flags_are_extended() {
    let env = Environment::from_pairs([("CFLAGS", "-g")]).with_flag("CFLAGS", BUILD_CFLAGS);
    assert_eq!(env.get("CFLAGS"), Some("-g -pipe -march=native"));
  }

  #[test]
  fn augmentation_is_idempotent() {
    let base = Environment::from_pairs([("CFLAGS", "-g"), ("LDFLAGS", "-L/opt/lib")]);

    let once = base.clone().for_build(Os::Linux);
    let twice = base.for_build(Os::Linux).for_build(Os::Linux);

    assert_eq!(once, twice);
    assert_eq!(once.get("CFLAGS"), Some("-g -pipe -march=native"));
    assert_eq!(once.get("LDFLAGS"), Some("-L/opt/lib -Wl,-flto -Wl,-O2"));
  }

  #[test]
  fn macos_leaves_ldflags_alone() {
    let env = Environment::default().for_build(Os::MacOs);
    assert_eq!(env.get("CFLAGS"), Some(BUILD_CFLAGS));
    assert_eq!(env.get("LDFLAGS"), None);
  }

  #[test]
  fn augmenting_a_copy_keeps_the_original() {
    let base = Environment::from_pairs([("PATH", "/bin")]);
    let built = base.clone().for_build(Os::Linux);

    assert_eq!(base.get("CFLAGS"), None);
    assert!(built.get("CFLAGS").is_some());
    assert_eq!(built.get("PATH"), Some("/bin"));
  }
}
