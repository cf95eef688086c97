use clean_files::confirm::{Decision, DecisionProvider};
use clean_files::finding::Finding;
use colored::*;
use console::Term;
use std::io;

/// Interactive y/n/a prompt. Output goes through the terminal, answers are
/// read line by line from stdin; end of input is an error.
pub struct TerminalPrompt {
    term: Term,
}

impl TerminalPrompt {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }
}

impl DecisionProvider for TerminalPrompt {
    fn decide(&mut self, finding: &Finding) -> io::Result<Decision> {
        self.term.write_line("")?;
        self.term.write_line(&finding.to_string())?;

        let verb = finding.action.verb();
        loop {
            self.term.write_str(&format!(
                "{}? ({} - yes, {} - no, {} - always {}): ",
                verb,
                "y".green(),
                "n".red(),
                "a".yellow(),
                verb.to_lowercase()
            ))?;
            self.term.flush()?;

            let mut input = String::new();
            if io::stdin().read_line(&mut input)? == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "no more input on stdin",
                ));
            }
            match parse_answer(&input) {
                Some(decision) => return Ok(decision),
                None => continue,
            }
        }
    }
}

/// Empty input declines; anything unrecognised asks again.
fn parse_answer(input: &str) -> Option<Decision> {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(Decision::Confirm),
        "n" | "no" | "" => Some(Decision::Decline),
        "a" | "always" => Some(Decision::Always),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_answer() {
        assert_eq!(parse_answer("y\n"), Some(Decision::Confirm));
        assert_eq!(parse_answer(" A "), Some(Decision::Always));
        assert_eq!(parse_answer(""), Some(Decision::Decline));
        assert_eq!(parse_answer("no"), Some(Decision::Decline));
        assert_eq!(parse_answer("maybe"), None);
    }
}
