//! Line-oriented prompts with bounded retries.
//!
//! Every question is asked at most `max_attempts` times. Validation is done by
//! a caller-supplied parser that returns `None` for unusable input.

use std::io::{self, BufRead, Write};

use thiserror::Error;

pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

const YES_INPUTS: &[&str] = &["y", "yes", "yeah", "correct", "right", "yep"];
const NO_INPUTS: &[&str] = &["n", "no", "false", "incorrect", "wrong", "nope"];

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("input closed")]
    Closed,

    #[error("no valid answer after {0} attempts")]
    TooManyAttempts(usize),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// `Some(true)` / `Some(false)` for recognised answers, `None` otherwise.
pub fn parse_yes_no(answer: &str) -> Option<bool> {
    let answer = answer.trim().to_lowercase();
    if YES_INPUTS.contains(&answer.as_str()) {
        Some(true)
    } else if NO_INPUTS.contains(&answer.as_str()) {
        Some(false)
    } else {
        None
    }
}

pub fn parse_count(answer: &str) -> Option<usize> {
    answer.trim().parse().ok()
}

pub struct Prompter<R, W> {
    input: R,
    output: W,
    max_attempts: usize,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub fn say(&mut self, text: impl AsRef<str>) -> io::Result<()> {
        writeln!(self.output, "{}", text.as_ref())
    }

    /// Ask once and return the raw line, without its trailing newline.
    pub fn ask(&mut self, question: &str) -> Result<String, PromptError> {
        write!(self.output, "{question} ")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(PromptError::Closed);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Ask until `parse` accepts the answer, printing `retry` between tries.
    pub fn ask_until<T>(
        &mut self,
        question: &str,
        retry: &str,
        mut parse: impl FnMut(&str) -> Option<T>,
    ) -> Result<T, PromptError> {
        let mut prompt = question;
        for _ in 0..self.max_attempts {
            let answer = self.ask(prompt)?;
            if let Some(value) = parse(&answer) {
                return Ok(value);
            }
            self.say(retry)?;
            prompt = "Try again:";
        }
        tracing::debug!(question, attempts = self.max_attempts, "Prompt gave up");
        Err(PromptError::TooManyAttempts(self.max_attempts))
    }

    pub fn confirm(&mut self, question: &str) -> Result<bool, PromptError> {
        let retry = format!(
            "That answer is not understood; please use one of: {}",
            YES_INPUTS
                .iter()
                .chain(NO_INPUTS)
                .copied()
                .collect::<Vec<_>>()
                .join(", ")
        );
        self.ask_until(question, &retry, parse_yes_no)
    }

    pub fn ask_count(&mut self, question: &str) -> Result<usize, PromptError> {
        self.ask_until(question, "Please enter a whole number (e.g. 1, 3, 10).", parse_count)
    }
}
