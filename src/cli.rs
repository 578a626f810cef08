use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use crate::commands::{BreakGlassCommand, CompletionsCommand, RefreshCommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "breakglass", version, about = "Refresh temporary AWS credentials by assuming IAM roles", long_about = None, arg_required_else_help = false)]
pub struct Cli {
    #[arg(short = 'v', long, global = true, action = ArgAction::Count, help = "Increase verbosity (-v info, -vv debug, -vvv trace)")]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    #[command(about = "Assume break-glass roles from ~/.aws/break-glass (prompts for MFA codes)")]
    BreakGlass(BreakGlassCommand),
    #[command(about = "Refresh credentials for every profile of a roles file")]
    Refresh(RefreshCommand),
    #[command(about = "Generate shell completion scripts for breakglass")]
    Completions(CompletionsCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let command = self
            .command
            .unwrap_or_else(|| Commands::BreakGlass(BreakGlassCommand::default()));

        match command {
            Commands::BreakGlass(cmd) => cmd.execute().await,
            Commands::Refresh(cmd) => cmd.execute().await,
            Commands::Completions(cmd) => {
                cmd.execute();
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, error::ErrorKind};
    use std::path::PathBuf;

    #[test]
    fn test_no_command_defaults_to_break_glass() {
        let cli = Cli::try_parse_from(["breakglass"]).unwrap();
        assert!(cli.command.is_none());

        match cli
            .command
            .unwrap_or_else(|| Commands::BreakGlass(BreakGlassCommand::default()))
        {
            Commands::BreakGlass(cmd) => assert_eq!(cmd.profiles, "all"),
            _ => panic!("Expected BreakGlass command as default"),
        }
    }

    #[test]
    fn test_break_glass_profiles_default() {
        let cli = Cli::try_parse_from(["breakglass", "break-glass"]).unwrap();
        match cli.command {
            Some(Commands::BreakGlass(cmd)) => assert_eq!(cmd.profiles, "all"),
            _ => panic!("Expected BreakGlass command"),
        }
    }

    #[test]
    fn test_break_glass_profiles_list() {
        let cli =
            Cli::try_parse_from(["breakglass", "break-glass", "--profiles", "prod,dev"]).unwrap();
        match cli.command {
            Some(Commands::BreakGlass(cmd)) => assert_eq!(cmd.profiles, "prod,dev"),
            _ => panic!("Expected BreakGlass command"),
        }
    }

    #[test]
    fn test_break_glass_profiles_short_flag() {
        let cli = Cli::try_parse_from(["breakglass", "break-glass", "-p", "prod"]).unwrap();
        match cli.command {
            Some(Commands::BreakGlass(cmd)) => assert_eq!(cmd.profiles, "prod"),
            _ => panic!("Expected BreakGlass command"),
        }
    }

    #[test]
    fn test_refresh_without_source() {
        let cli = Cli::try_parse_from(["breakglass", "refresh"]).unwrap();
        match cli.command {
            Some(Commands::Refresh(cmd)) => assert_eq!(cmd.source, None),
            _ => panic!("Expected Refresh command"),
        }
    }

    #[test]
    fn test_refresh_with_source() {
        let cli =
            Cli::try_parse_from(["breakglass", "refresh", "--source", "/tmp/roles"]).unwrap();
        match cli.command {
            Some(Commands::Refresh(cmd)) => {
                assert_eq!(cmd.source, Some(PathBuf::from("/tmp/roles")));
            }
            _ => panic!("Expected Refresh command"),
        }
    }

    #[test]
    fn test_completions_command_parsing() {
        let cli = Cli::try_parse_from(["breakglass", "completions", "bash"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Completions(_))));
    }

    #[test]
    fn test_command_structure_validation() {
        let cmd = Cli::command();
        cmd.debug_assert();
    }

    #[test]
    fn test_invalid_command_fails() {
        let result = Cli::try_parse_from(["breakglass", "invalid"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_help_flag_works() {
        let result = Cli::try_parse_from(["breakglass", "--help"]);
        assert!(matches!(result, Err(e) if e.kind() == ErrorKind::DisplayHelp));
    }

    #[test]
    fn test_version_flag_works() {
        let result = Cli::try_parse_from(["breakglass", "--version"]);
        assert!(matches!(result, Err(e) if e.kind() == ErrorKind::DisplayVersion));
    }

    #[test]
    fn test_verbose_flag_multiple() {
        let cli = Cli::try_parse_from(["breakglass", "-vv", "refresh"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_verbose_after_subcommand() {
        let cli = Cli::try_parse_from(["breakglass", "break-glass", "--verbose"]).unwrap();
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn test_verbose_default_zero() {
        let cli = Cli::try_parse_from(["breakglass", "break-glass"]).unwrap();
        assert_eq!(cli.verbose, 0);
    }
}
