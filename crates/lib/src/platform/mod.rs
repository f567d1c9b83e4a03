//! Host facts the tools depend on: operating system, home directory, CPU count.

pub mod os;
pub mod paths;

pub use os::Os;
pub use paths::{absolutize, expand_tilde, home_dir};

/// Number of processing units available to this process.
///
/// Falls back to 1 when the count cannot be determined.
pub fn available_cpus() -> usize {
  std::thread::available_parallelism()
    .map(|n| n.get())
    .unwrap_or(1)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn at_least_one_cpu() {
    assert!(available_cpus() >= 1);
  }
}
