//! Test utilities for devwrap-lib.
//!
//! Stand-ins for external processes and interactive input, plus small
//! cross-platform shell helpers.

use std::collections::{HashMap, VecDeque};
use std::fs::OpenOptions;
use std::io::{self, Write};

use crate::error::Result;
use crate::process::{CommandSpec, OutputMode, ProcessRunner};
use crate::prompt::LineReader;

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}

/// A [`ProcessRunner`] that records every command and replays scripted exit codes.
///
/// Exit codes are queued per program name; a program with no queued code
/// exits 0. Commands logging to a file get one `ran: <cmdline>` line appended.
#[derive(Debug, Default)]
pub struct FakeRunner {
  pub calls: Vec<CommandSpec>,
  codes: HashMap<String, VecDeque<i32>>,
}

impl FakeRunner {
  pub fn new() -> Self {
    Self::default()
  }

  /// Queue exit codes for successive runs of `program`.
  pub fn respond(mut self, program: &str, codes: impl IntoIterator<Item = i32>) -> Self {
    self.codes.entry(program.to_string()).or_default().extend(codes);
    self
  }

  /// Command lines of all recorded runs, in order.
  pub fn command_lines(&self) -> Vec<String> {
    self.calls.iter().map(CommandSpec::display).collect()
  }

  pub fn runs_of(&self, program: &str) -> usize {
    self.calls.iter().filter(|c| c.program == program).count()
  }
}

impl ProcessRunner for FakeRunner {
  fn run(&mut self, spec: &CommandSpec) -> Result<i32> {
    self.calls.push(spec.clone());

    if let OutputMode::Log(path) = &spec.output {
      let mut log = OpenOptions::new().create(true).append(true).open(path)?;
      writeln!(log, "ran: {}", spec.display())?;
    }

    let code = self
      .codes
      .get_mut(&spec.program)
      .and_then(VecDeque::pop_front)
      .unwrap_or(0);
    Ok(code)
  }
}

/// A [`LineReader`] that replays canned answers, then reports end of input.
#[derive(Debug, Default)]
pub struct ScriptedReader {
  answers: VecDeque<String>,
  pub prompts: Vec<String>,
}

impl ScriptedReader {
  pub fn new<I, S>(answers: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      answers: answers.into_iter().map(Into::into).collect(),
      prompts: Vec::new(),
    }
  }
}

impl LineReader for ScriptedReader {
  fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
    self.prompts.push(prompt.to_string());
    Ok(self.answers.pop_front())
  }
}
