//! Yes/no prompts on the controlling terminal.
use std::io::{self, BufRead as _, Write as _};

/// Asks the operator yes/no questions.
pub trait Prompter: Send + Sync {
    /// Ask `question`; an empty answer selects `default`.
    ///
    /// # Errors
    ///
    /// Returns an error if the answer cannot be read.
    fn confirm(&self, question: &str, default: bool) -> io::Result<bool>;
}

/// Interpret a typed answer.
///
/// Empty input selects `default`. Otherwise only `y`/`yes` (any case) is
/// affirmative.
///
/// # Examples
///
/// ```
/// use hostprep_cli::prompt::parse_answer;
///
/// assert!(parse_answer("", true));
/// assert!(parse_answer(" YES \n", false));
/// assert!(!parse_answer("sure", true));
/// ```
#[must_use]
pub fn parse_answer(input: &str, default: bool) -> bool {
    let answer = input.trim();
    if answer.is_empty() {
        return default;
    }
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

/// [`Prompter`] that reads answers from stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn confirm(&self, question: &str, default: bool) -> io::Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        let mut stdout = io::stdout().lock();
        write!(stdout, "{question} {hint} ")?;
        stdout.flush()?;
        drop(stdout);

        let mut input = String::new();
        let read = io::stdin().lock().read_line(&mut input)?;
        if read == 0 {
            // stdin closed: behave like an empty answer
            return Ok(default);
        }
        Ok(parse_answer(&input, default))
    }
}
