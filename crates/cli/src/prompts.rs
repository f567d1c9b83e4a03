use std::io::{self, BufRead, Write};

use devwrap_lib::prompt::LineReader;

/// Reads answers from stdin, showing prompts on stderr.
#[derive(Debug, Default)]
pub struct StdinReader;

impl LineReader for StdinReader {
  fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
    let mut stderr = io::stderr();
    write!(stderr, "{}", prompt)?;
    stderr.flush()?;

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input)? == 0 {
      return Ok(None);
    }
    Ok(Some(input))
  }
}
