//! Input providers for interactive questions
//!
//! The interpreter asks for missing arguments through an [`InputProvider`]
//! so batch callers can plug in [`NoInput`] and never block.

use std::io::{self, BufRead, Stderr, StdinLock, Write};
use tracing::warn;

pub trait InputProvider {
    /// Show `question` and wait for one answer. `None` means no answer at all
    /// (end of input, or a provider that never answers).
    fn ask(&mut self, question: &str) -> Option<String>;
}

impl<P: InputProvider + ?Sized> InputProvider for &mut P {
    fn ask(&mut self, question: &str) -> Option<String> {
        (**self).ask(question)
    }
}

/// Never answers
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInput;

impl InputProvider for NoInput {
    fn ask(&mut self, _question: &str) -> Option<String> {
        None
    }
}

/// Reads answers line by line; questions go to the writer (stderr by
/// default, keeping stdout for the JSON result)
pub struct StdinPrompt<R, W> {
    reader: R,
    writer: W,
}

impl StdinPrompt<StdinLock<'static>, Stderr> {
    pub fn new() -> Self {
        Self::with_streams(io::stdin().lock(), io::stderr())
    }
}

impl Default for StdinPrompt<StdinLock<'static>, Stderr> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: BufRead, W: Write> StdinPrompt<R, W> {
    pub fn with_streams(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl<R: BufRead, W: Write> InputProvider for StdinPrompt<R, W> {
    fn ask(&mut self, question: &str) -> Option<String> {
        if let Err(e) = writeln!(self.writer, "{}", question).and_then(|_| self.writer.flush()) {
            warn!("Failed to write prompt: {}", e);
        }

        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim().to_string()),
            Err(e) => {
                warn!("Failed to read answer: {}", e);
                None
            }
        }
    }
}
