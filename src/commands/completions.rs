use clap::{Args, CommandFactory};
use clap_complete::Shell;
use std::io::{self, Write};

use crate::cli::Cli;

#[derive(Debug, Clone, Args)]
pub struct CompletionsCommand {
    #[arg(value_enum, help = "Target shell for completion script")]
    pub shell: Shell,
}

impl CompletionsCommand {
    pub fn execute(self) {
        self.generate(&mut io::stdout());
    }

    fn generate(&self, out: &mut dyn Write) {
        let mut cmd = Cli::command();
        let app_name = cmd.get_name().to_string();
        clap_complete::generate(self.shell, &mut cmd, app_name, out);
    }

    #[cfg(test)]
    pub fn generate_to_string(&self) -> String {
        let mut buffer = Vec::new();
        self.generate(&mut buffer);
        String::from_utf8(buffer).unwrap_or_default()
    }
}
