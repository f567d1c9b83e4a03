//! Yes/no prompting over an injectable line source.

use std::io;

use tracing::debug;

use crate::error::Result;

/// A source of operator input, one line per call.
pub trait LineReader {
  /// Show `prompt` and read one line.
  ///
  /// Returns `Ok(None)` at end of input.
  fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// Parsed answer to a yes/no question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
  Yes,
  No,
}

impl Answer {
  /// Accepts `y`, `yes`, `n`, `no` in any case, ignoring surrounding whitespace.
  pub fn parse(input: &str) -> Option<Self> {
    match input.trim().to_ascii_lowercase().as_str() {
      "y" | "yes" => Some(Self::Yes),
      "n" | "no" => Some(Self::No),
      _ => None,
    }
  }
}

/// Ask `prompt` until the operator gives a recognizable yes or no.
///
/// Unrecognized input re-prompts without limit. End of input is an error,
/// since no answer can ever arrive.
pub fn confirm<R: LineReader + ?Sized>(reader: &mut R, prompt: &str) -> Result<bool> {
  loop {
    let Some(line) = reader.read_line(prompt)? else {
      return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "no answer to prompt").into());
    };

    match Answer::parse(&line) {
      Some(answer) => return Ok(answer == Answer::Yes),
      None => debug!(input = %line.trim(), "unrecognized answer, asking again"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::Error;
  use crate::util::testutil::ScriptedReader;

  #[test]
  fn parses_answers_case_insensitively() {
    assert_eq!(Answer::parse("Y"), Some(Answer::Yes));
    assert_eq!(Answer::parse(" YES\n"), Some(Answer::Yes));
    assert_eq!(Answer::parse("No"), Some(Answer::No));
    assert_eq!(Answer::parse("yep"), None);
    assert_eq!(Answer::parse(""), None);
  }

  #[test]
  fn reprompts_until_recognized() {
    let mut reader = ScriptedReader::new(["maybe", "", "later", "n"]);

    assert!(!confirm(&mut reader, "Continue? ").unwrap());
    assert_eq!(reader.prompts.len(), 4);
    assert!(reader.prompts.iter().all(|p| p == "Continue? "));
  }

  #[test]
  fn yes_confirms() {
    let mut reader = ScriptedReader::new(["y"]);
    assert!(confirm(&mut reader, "Continue? ").unwrap());
  }

  #[test]
  fn end_of_input_is_an_error() {
    let mut reader = ScriptedReader::new(["what"]);

    let err = confirm(&mut reader, "Continue? ").unwrap_err();
    assert!(matches!(err, Error::Io(ref e) if e.kind() == io::ErrorKind::UnexpectedEof));
  }
}
