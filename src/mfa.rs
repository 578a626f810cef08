use anyhow::{Context, Result};
use std::io::{self, BufRead, StdinLock, Stdout, Write};

/// Source of one-time MFA codes
pub trait ReadMfaToken {
    fn read_token(&mut self, profile: &str) -> Result<String>;
}

/// Prompts on `output` and reads a single line from `input`
#[derive(Debug)]
pub struct ConsolePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl ConsolePrompt<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ReadMfaToken for ConsolePrompt<R, W> {
    /// End of input yields an empty token; STS rejects it later
    fn read_token(&mut self, profile: &str) -> Result<String> {
        write!(self.output, "MFA Token for {profile} -> ").context("Failed to write MFA prompt")?;
        self.output.flush().context("Failed to write MFA prompt")?;

        let mut line = String::new();
        self.input
            .read_line(&mut line)
            .with_context(|| format!("Failed to read MFA token for {profile}"))?;

        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}
