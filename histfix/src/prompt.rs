use std::io::{self, BufRead, Write};

use anyhow::Result;
use colored::Colorize;

use crate::error::RepairError;

pub const INVALID_ANSWER: &str = "Invalid input. Please enter 'y' or 'n'.";

/// Yes/no gate in front of every destructive step.
pub trait Prompter {
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

pub fn parse_answer(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "y" => Some(true),
        "n" => Some(false),
        _ => None,
    }
}

/// Reads answers line by line; used for piped stdin and in tests.
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        loop {
            write!(self.output, "{} ", format!("{prompt} (y/n):").cyan())?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                return Err(RepairError::PromptClosed(prompt.to_string()).into());
            }
            match parse_answer(&line) {
                Some(answer) => return Ok(answer),
                None => writeln!(self.output, "{}", INVALID_ANSWER.yellow())?,
            }
        }
    }
}

/// Interactive prompt for a real terminal.
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let answer = dialoguer::Input::<String>::new()
            .with_prompt(format!("{prompt} (y/n)"))
            .validate_with(|input: &String| -> Result<(), &str> {
                parse_answer(input).map(|_| ()).ok_or(INVALID_ANSWER)
            })
            .interact_text()?;
        parse_answer(&answer).ok_or_else(|| anyhow::anyhow!(INVALID_ANSWER))
    }
}

/// Terminal prompts when stdin is a tty, plain line reads otherwise.
pub fn stdio_prompter() -> Box<dyn Prompter> {
    if atty::is(atty::Stream::Stdin) {
        Box::new(TerminalPrompter)
    } else {
        Box::new(LinePrompter::new(io::stdin().lock(), io::stdout()))
    }
}

impl<P: Prompter + ?Sized> Prompter for Box<P> {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        (**self).confirm(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_answer_is_case_insensitive() {
        assert_eq!(parse_answer("Y\n"), Some(true));
        assert_eq!(parse_answer("  n "), Some(false));
        assert_eq!(parse_answer("yes"), None);
        assert_eq!(parse_answer(""), None);
    }

    #[test]
    fn reprompts_until_valid_answer() {
        let mut out = Vec::new();
        let mut prompter = LinePrompter::new(&b"maybe\n\nN\n"[..], &mut out);
        assert!(!prompter.confirm("Proceed?").unwrap());

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("Proceed? (y/n):").count(), 3);
        assert_eq!(text.matches(INVALID_ANSWER).count(), 2);
    }

    #[test]
    fn closed_input_is_an_error() {
        let mut prompter = LinePrompter::new(&b""[..], Vec::new());
        let err = prompter.confirm("Proceed?").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RepairError>(),
            Some(RepairError::PromptClosed(_))
        ));
    }
}
