//! Implementation of `ebrowse-ex`.
//!
//! Collects source files from explicit paths and scanned directories and runs
//! ebrowse over them.

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, FromArgMatches, Parser};
use tracing::debug;

use devwrap_lib::browse::{BrowseOutcome, BrowseRequest, DEFAULT_SUFFIX, launch};
use devwrap_lib::process::SystemRunner;

use crate::output::print_info;

/// Build an ebrowse database from files and scanned directories.
///
/// Arguments that are not recognized here are passed to ebrowse unchanged.
#[derive(Debug, Parser)]
#[command(name = "ebrowse-ex", version, about)]
pub struct BrowseArgs {
  /// Output file for the browse database
  #[arg(short, long)]
  pub output: Option<String>,

  /// Files to browse
  #[arg(short, long, num_args = 0..)]
  pub files: Vec<PathBuf>,

  /// Directories to scan
  #[arg(short, long, num_args = 0..)]
  pub dirs: Vec<String>,

  /// Scan directories recursively
  #[arg(short, long)]
  pub recursive: bool,

  /// Suffix patterns, e.g. .h .cpp .cc
  #[arg(short, long, num_args = 1.., default_values_t = [DEFAULT_SUFFIX.to_string()])]
  pub suffix: Vec<String>,

  /// Exclude pattern, matched anywhere in the path
  #[arg(short = 'x', long)]
  pub exclude: Option<String>,

  /// Enable verbose output
  #[arg(short, long)]
  pub verbose: bool,

  /// ebrowse executable
  #[arg(long, env = "EBROWSE", default_value = "ebrowse")]
  pub ebrowse: String,

  /// Arguments not recognized above, forwarded to ebrowse
  #[arg(skip)]
  pub extra: Vec<String>,
}

/// How a known option consumes the tokens after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arity {
  Flag,
  Single,
  Many,
}

impl BrowseArgs {
  /// Parse the process arguments, forwarding unknown ones.
  pub fn parse_known() -> Self {
    let argv = std::env::args_os().map(|a: OsString| a.to_string_lossy().into_owned());
    Self::try_parse_known_from(argv).unwrap_or_else(|err| err.exit())
  }

  /// Parse `argv`, collecting every token that is not one of our options
  /// (or a value of one) into `extra` instead of failing.
  ///
  /// Everything after a bare `--` is forwarded as well. Multi-value options
  /// stop taking values at the first token starting with `-`.
  pub fn try_parse_known_from<I, S>(argv: I) -> std::result::Result<Self, clap::Error>
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let (known, extra) = split_known(argv.into_iter().map(Into::into).collect());
    let matches = Self::command().try_get_matches_from(known)?;
    let mut args = Self::from_arg_matches(&matches)?;
    args.extra = extra;
    Ok(args)
  }
}

/// Look up a known option by its short or long name.
fn known_arity(command: &clap::Command, short: Option<char>, long: Option<&str>) -> Option<Arity> {
  let arg = command.get_arguments().find(|arg| match (short, long) {
    (Some(c), _) => arg.get_short() == Some(c),
    (_, Some(name)) => arg.get_long() == Some(name),
    _ => false,
  })?;

  if !arg.get_action().takes_values() {
    return Some(Arity::Flag);
  }
  let many = arg.get_num_args().is_some_and(|range| range.max_values() > 1);
  Some(if many { Arity::Many } else { Arity::Single })
}

/// Partition `argv` into tokens for our parser and tokens for ebrowse.
fn split_known(argv: Vec<String>) -> (Vec<String>, Vec<String>) {
  let mut command = BrowseArgs::command();
  command.build();

  let mut tokens = argv.into_iter();
  let mut known: Vec<String> = tokens.next().into_iter().collect();
  let mut extra = Vec::new();

  while let Some(token) = tokens.next() {
    if token == "--" {
      extra.extend(tokens.by_ref());
      break;
    }

    let arity = if let Some(long) = token.strip_prefix("--") {
      let (name, inline) = match long.split_once('=') {
        Some((name, _)) => (name, true),
        None => (long, false),
      };
      known_arity(&command, None, Some(name)).map(|arity| if inline { Arity::Flag } else { arity })
    } else if let Some(short) = token.strip_prefix('-').filter(|s| !s.is_empty()) {
      let mut chars = short.chars();
      let first = chars.next();
      let attached = chars.as_str();
      match known_arity(&command, first, None) {
        // `-dsrc` style: the value is attached.
        Some(Arity::Single | Arity::Many) if !attached.is_empty() => Some(Arity::Flag),
        // `-rv` style: every letter must be a known flag.
        Some(Arity::Flag)
          if attached
            .chars()
            .all(|c| known_arity(&command, Some(c), None) == Some(Arity::Flag)) =>
        {
          Some(Arity::Flag)
        }
        Some(Arity::Flag) => None,
        other => other,
      }
    } else {
      None
    };

    let Some(arity) = arity else {
      extra.push(token);
      continue;
    };

    known.push(token);
    let limit = match arity {
      Arity::Flag => 0,
      Arity::Single => 1,
      Arity::Many => usize::MAX,
    };
    let mut taken = 0;
    while taken < limit {
      let is_value = tokens.as_slice().first().is_some_and(|next| !next.starts_with('-'));
      if !is_value {
        break;
      }
      known.extend(tokens.next());
      taken += 1;
    }
  }

  (known, extra)
}

/// Execute the browse command.
///
/// Returns ebrowse's exit code, or 0 when there was nothing to browse.
///
/// # Errors
///
/// Returns an error (exit code -1) when the output directory does not exist,
/// and an error for invalid patterns or when ebrowse cannot be started.
pub fn run(args: BrowseArgs) -> Result<i32> {
  let cwd = std::env::current_dir().context("Failed to determine current directory")?;
  debug!(cwd = %cwd.display(), extra = ?args.extra, "browse arguments");

  let request = BrowseRequest {
    output: args.output,
    files: args.files,
    dirs: args.dirs,
    recursive: args.recursive,
    suffixes: args.suffix,
    exclude: args.exclude,
    verbose: args.verbose,
    extra_args: args.extra,
    program: args.ebrowse,
    ..BrowseRequest::new(cwd)
  };

  let mut runner = SystemRunner;
  match launch(&request, &mut runner)? {
    BrowseOutcome::NoFiles => {
      print_info("No files to browse.");
      Ok(0)
    }
    BrowseOutcome::Ran(code) => Ok(code),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn suffix_defaults_to_headers() {
    let args = BrowseArgs::try_parse_known_from(["ebrowse-ex"]).unwrap();
    assert_eq!(args.suffix, vec![".h"]);
    assert!(args.extra.is_empty());
  }

  #[test]
  fn multi_value_flags_and_separator() {
    let args = BrowseArgs::try_parse_known_from([
      "ebrowse-ex", "-d", "src", "include", "-s", ".h", ".cpp", "-r", "-x", "test", "--", "--min-regexp-length=3",
    ])
    .unwrap();

    assert_eq!(args.dirs, vec!["src", "include"]);
    assert_eq!(args.suffix, vec![".h", ".cpp"]);
    assert!(args.recursive);
    assert_eq!(args.exclude.as_deref(), Some("test"));
    assert_eq!(args.extra, vec!["--min-regexp-length=3"]);
  }

  #[test]
  fn unknown_flag_before_known_options_is_forwarded() {
    let args = BrowseArgs::try_parse_known_from(["ebrowse-ex", "--min-regexp-length=3", "-d", "src", "-r"]).unwrap();

    assert_eq!(args.dirs, vec!["src"]);
    assert!(args.recursive);
    assert_eq!(args.extra, vec!["--min-regexp-length=3"]);
  }

  #[test]
  fn unknown_flag_ends_multi_value_option() {
    let args =
      BrowseArgs::try_parse_known_from(["ebrowse-ex", "-d", "src", "--min-regexp-length=3", "-r", "-s", ".cpp"]).unwrap();

    assert_eq!(args.dirs, vec!["src"]);
    assert!(args.recursive);
    assert_eq!(args.suffix, vec![".cpp"]);
    assert_eq!(args.extra, vec!["--min-regexp-length=3"]);
  }

  #[test]
  fn unknown_short_flags_and_stray_values_are_forwarded() {
    let args = BrowseArgs::try_parse_known_from(["ebrowse-ex", "-q", "-o", "BROWSE", "stray", "-rv", "-dinc"]).unwrap();

    assert_eq!(args.output.as_deref(), Some("BROWSE"));
    assert!(args.recursive && args.verbose);
    assert_eq!(args.dirs, vec!["inc"]);
    assert_eq!(args.extra, vec!["-q", "stray"]);
  }

  #[test]
  fn inline_long_values_are_recognized() {
    let args = BrowseArgs::try_parse_known_from(["ebrowse-ex", "--exclude=third_party", "--output=db"]).unwrap();

    assert_eq!(args.exclude.as_deref(), Some("third_party"));
    assert_eq!(args.output.as_deref(), Some("db"));
    assert!(args.extra.is_empty());
  }
}
