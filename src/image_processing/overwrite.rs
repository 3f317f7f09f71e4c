use std::io::{self, BufRead, Stderr, StdinLock, Write};
use std::path::Path;

/// Decides whether an existing output file may be replaced
pub trait OverwriteDecider {
    fn confirm_overwrite(&mut self, path: &Path) -> bool;
}

/// Only answers starting with `y` or `Y` count as yes
pub fn is_affirmative(answer: &str) -> bool {
    answer
        .chars()
        .next()
        .map(|c| c.eq_ignore_ascii_case(&'y'))
        .unwrap_or(false)
}

/// Asks on `output` and reads the answer from `input`
pub struct PromptDecider<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptDecider<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl PromptDecider<StdinLock<'static>, Stderr> {
    /// Interactive prompt on the terminal
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> OverwriteDecider for PromptDecider<R, W> {
    fn confirm_overwrite(&mut self, path: &Path) -> bool {
        let _ = writeln!(
            self.output,
            "\n{} already exists, overwrite? (y/N)",
            path.display()
        );
        let _ = self.output.flush();

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(_) => is_affirmative(&answer),
            // Unreadable stdin is a "no"
            Err(_) => false,
        }
    }
}
