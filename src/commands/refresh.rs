use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use super::{RefreshPaths, run_refresh_interactive};
use crate::{
    config::ProfileSelection,
    constants::{self, REFRESH_SESSION_NAME},
};

#[derive(Debug, Clone, Args)]
pub struct RefreshCommand {
    #[arg(
        short = 's',
        long,
        help = "Profile file to refresh (defaults to ~/.aws/roles)"
    )]
    pub source: Option<PathBuf>,
}

impl RefreshCommand {
    pub async fn execute(self) -> Result<()> {
        let source = match self.source {
            Some(path) => path,
            None => constants::get_roles_path().context("Failed to determine roles file path")?,
        };

        let paths = RefreshPaths::with_default_credentials(source)?;

        let refreshed =
            run_refresh_interactive(&paths, &ProfileSelection::All, REFRESH_SESSION_NAME).await?;

        println!("\nCredentials refreshed for {refreshed} profile(s).");
        Ok(())
    }
}
