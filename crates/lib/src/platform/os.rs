use std::fmt;

/// Operating systems with a known configure recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
  Linux,
  MacOs,
  /// Anything else, carrying `std::env::consts::OS`.
  Other(&'static str),
}

impl Os {
  /// Detect the host operating system at runtime
  pub fn current() -> Self {
    Self::from_name(std::env::consts::OS)
  }

  pub fn from_name(name: &'static str) -> Self {
    match name {
      "linux" => Self::Linux,
      "macos" => Self::MacOs,
      other => Self::Other(other),
    }
  }

  /// The `uname -s` style name (`Linux`, `Darwin`).
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Linux => "Linux",
      Self::MacOs => "Darwin",
      Self::Other(name) => *name,
    }
  }

  pub fn is_supported(&self) -> bool {
    !matches!(self, Self::Other(_))
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
