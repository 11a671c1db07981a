//! Line-oriented prompting over any reader/writer pair.

use std::fmt::Display;
use std::io::{BufRead, Write};

use crate::error::{GymError, Result};
use crate::validate::ValidationError;

pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Writes one line of output.
    pub fn say(&mut self, line: impl Display) -> Result<()> {
        writeln!(self.output, "{line}")?;
        Ok(())
    }

    /// Shows `label` and reads one line, without its line terminator.
    pub fn prompt(&mut self, label: &str) -> Result<String> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(GymError::InputClosed(label.trim().to_string()));
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(line)
    }

    /// Prompts until `validate` accepts the answer.
    pub fn prompt_valid<T>(
        &mut self,
        label: &str,
        validate: impl Fn(&str) -> std::result::Result<T, ValidationError>,
    ) -> Result<T> {
        loop {
            let answer = self.prompt(label)?;
            match validate(&answer) {
                Ok(value) => return Ok(value),
                Err(error) => self.say(format_args!("Invalid input: {error}."))?,
            }
        }
    }

    /// Asks a Y/N question until it gets one of the two.
    pub fn confirm(&mut self, label: &str) -> Result<bool> {
        loop {
            match self.prompt(label)?.trim().to_lowercase().as_str() {
                "y" => return Ok(true),
                "n" => return Ok(false),
                _ => self.say("Invalid input! Please enter 'Y' for Yes or 'N' for No.")?,
            }
        }
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
