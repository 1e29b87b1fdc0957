//! # Confirmation Gate
//!
//! Before an import overwrites data that is already in the store, the
//! operator is asked to confirm. The gate is a trait so the reconciliation
//! logic can be driven by a terminal, a pipe, or a test script.
//!
//! ## Answer Protocol
//!
//! The question is printed with a `[yes/no]` suffix and one line is read.
//! Only `yes` and `no` are accepted (in any letter case); anything else
//! prints `Incorrect input: <answer>` and asks again. There is no retry
//! limit and no default answer. Running out of input is an error.

use crate::error::{Error, Result};
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;
use std::io::{self, BufRead, IsTerminal, Write};

/// Asks the operator a yes/no question.
pub trait ConfirmationGate {
    /// Ask `message`, returning `true` for yes and `false` for no.
    fn confirm(&mut self, message: &str) -> Result<bool>;
}

impl<G: ConfirmationGate + ?Sized> ConfirmationGate for Box<G> {
    fn confirm(&mut self, message: &str) -> Result<bool> {
        (**self).confirm(message)
    }
}

/// Interpret an answer, or `None` when it is neither yes nor no.
fn parse_answer(answer: &str) -> Option<bool> {
    if answer.eq_ignore_ascii_case("yes") {
        Some(true)
    } else if answer.eq_ignore_ascii_case("no") {
        Some(false)
    } else {
        None
    }
}

/// Line-oriented prompt over any reader/writer pair.
///
/// Used when stdin is not a terminal (piped answers) and in tests.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Give back the writer, e.g. to inspect what was printed.
    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> ConfirmationGate for LinePrompt<R, W> {
    fn confirm(&mut self, message: &str) -> Result<bool> {
        loop {
            write!(self.output, "{} [yes/no]? ", message)?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(Error::Prompt {
                    message: "input closed before an answer was given".to_string(),
                });
            }
            let answer = line.trim_end_matches(['\r', '\n']);

            match parse_answer(answer) {
                Some(decision) => return Ok(decision),
                None => writeln!(self.output, "Incorrect input: {}", answer)?,
            }
        }
    }
}

/// Interactive prompt for an attached terminal, rendered with `dialoguer`.
pub struct TerminalPrompt {
    theme: ColorfulTheme,
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl ConfirmationGate for TerminalPrompt {
    fn confirm(&mut self, message: &str) -> Result<bool> {
        let answer: String = Input::with_theme(&self.theme)
            .with_prompt(format!("{} [yes/no]", message))
            .validate_with(|input: &String| -> std::result::Result<(), String> {
                match parse_answer(input) {
                    Some(_) => Ok(()),
                    None => Err(format!("Incorrect input: {}", input)),
                }
            })
            .interact_text()
            .map_err(|e| Error::Prompt {
                message: e.to_string(),
            })?;
        parse_answer(&answer).ok_or_else(|| Error::Prompt {
            message: format!("Incorrect input: {}", answer),
        })
    }
}

/// The gate for the current process: a `dialoguer` prompt when both stdin
/// and stderr are terminals, otherwise a plain line prompt on stdin/stdout.
pub fn stdio() -> Box<dyn ConfirmationGate> {
    if io::stdin().is_terminal() && console::Term::stderr().is_term() {
        Box::new(TerminalPrompt::default())
    } else {
        Box::new(LinePrompt::new(io::stdin().lock(), io::stdout()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompt(input: &str) -> LinePrompt<Cursor<Vec<u8>>, Vec<u8>> {
        LinePrompt::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_yes_and_no() {
        assert!(prompt("yes\n").confirm("Continue").unwrap());
        assert!(!prompt("no\n").confirm("Continue").unwrap());
    }

    #[test]
    fn test_answers_are_case_insensitive() {
        assert!(prompt("YES\n").confirm("Continue").unwrap());
        assert!(!prompt("No\r\n").confirm("Continue").unwrap());
    }

    #[test]
    fn test_prompt_text() {
        let mut gate = prompt("yes\n");
        gate.confirm("Do you want to overwrite data in directory: /app")
            .unwrap();
        let output = String::from_utf8(gate.into_output()).unwrap();
        assert_eq!(
            output,
            "Do you want to overwrite data in directory: /app [yes/no]? "
        );
    }

    #[test]
    fn test_invalid_input_reprompts_until_valid() {
        let mut gate = prompt("y\nn\nmaybe\n\nyes\n");
        assert!(gate.confirm("Continue").unwrap());

        let output = String::from_utf8(gate.into_output()).unwrap();
        assert_eq!(output.matches("Continue [yes/no]? ").count(), 5);
        assert!(output.contains("Incorrect input: y\n"));
        assert!(output.contains("Incorrect input: maybe\n"));
    }

    #[test]
    fn test_surrounding_spaces_are_not_accepted() {
        let mut gate = prompt(" yes\nno\n");
        assert!(!gate.confirm("Continue").unwrap());
    }

    #[test]
    fn test_end_of_input_is_an_error() {
        let err = prompt("").confirm("Continue").unwrap_err();
        assert!(matches!(err, Error::Prompt { .. }));

        let err = prompt("perhaps\n").confirm("Continue").unwrap_err();
        assert!(matches!(err, Error::Prompt { .. }));
    }

    #[test]
    fn test_boxed_gate() {
        let mut gate: Box<dyn ConfirmationGate> = Box::new(prompt("yes\n"));
        assert!(gate.confirm("Continue").unwrap());
    }
}
