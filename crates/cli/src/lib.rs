//! Shared plumbing for the devwrap binaries.
//!
//! Each binary in `src/bin` parses its arguments with the matching
//! `cmd` module, installs logging and exits with the code the command returns.

pub mod cmd;
pub mod logging;
pub mod output;
pub mod prompts;

/// Turn a command result into a process exit code, reporting errors.
///
/// Library errors carry their own exit code; anything else exits 1.
pub fn exit_code(result: anyhow::Result<i32>) -> i32 {
  match result {
    Ok(code) => code,
    Err(err) => {
      output::print_error(&format!("{err:#}"));
      err
        .downcast_ref::<devwrap_lib::Error>()
        .map_or(1, devwrap_lib::Error::exit_code)
    }
  }
}
