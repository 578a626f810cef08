use anyhow::{Context, Result};
use clap::Args;

use super::{RefreshPaths, run_refresh_interactive};
use crate::{
    config::ProfileSelection,
    constants::{self, ALL_PROFILES, BREAK_GLASS_SESSION_NAME},
};

#[derive(Debug, Clone, Args)]
pub struct BreakGlassCommand {
    #[arg(
        short = 'p',
        long,
        default_value = ALL_PROFILES,
        help = "Comma separated profiles to get credentials for, or 'all'"
    )]
    pub profiles: String,
}

impl Default for BreakGlassCommand {
    fn default() -> Self {
        Self {
            profiles: ALL_PROFILES.to_string(),
        }
    }
}

impl BreakGlassCommand {
    pub async fn execute(self) -> Result<()> {
        let selection: ProfileSelection = self.profiles.parse()?;
        let source = constants::get_break_glass_path()
            .context("Failed to determine break-glass profile path")?;

        let paths = RefreshPaths::with_default_credentials(source)?;

        let refreshed =
            run_refresh_interactive(&paths, &selection, BREAK_GLASS_SESSION_NAME).await?;

        println!("\nBreak-glass credentials saved for {refreshed} profile(s).");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selects_all_profiles() {
        let cmd = BreakGlassCommand::default();
        assert_eq!(
            cmd.profiles.parse::<ProfileSelection>().unwrap(),
            ProfileSelection::All
        );
    }
}
