pub mod break_glass;
pub mod completions;
pub mod refresh;

pub use break_glass::BreakGlassCommand;
pub use completions::CompletionsCommand;
pub use refresh::RefreshCommand;

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use crate::{
    aws::{AssumeRole, CredentialsStore, StsRoleAssumer},
    config::{ProfileFile, ProfileSelection},
    constants,
    mfa::{ConsolePrompt, ReadMfaToken},
    refresh::Refresher,
};

/// Files a refresh reads from and writes to
#[derive(Debug, Clone)]
pub struct RefreshPaths {
    pub source: PathBuf,
    pub credentials: PathBuf,
}

impl RefreshPaths {
    pub fn with_default_credentials(source: PathBuf) -> Result<Self> {
        let credentials = constants::get_aws_credentials_path()
            .context("Failed to determine AWS credentials path")?;
        Ok(Self {
            source,
            credentials,
        })
    }
}

/// Refresh against STS, reading MFA codes from the terminal
async fn run_refresh_interactive(
    paths: &RefreshPaths,
    selection: &ProfileSelection,
    session_name: &str,
) -> Result<usize> {
    let client = StsRoleAssumer::from_env().await;
    // MFA codes block the runtime thread on stdin; profiles are handled one at a time anyway
    let mut prompt = ConsolePrompt::stdio();

    run_refresh(&client, &mut prompt, paths, selection, session_name).await
}

/// Load profiles, refresh them and write the credentials file only once all succeed
pub async fn run_refresh<C: AssumeRole>(
    client: &C,
    prompt: &mut impl ReadMfaToken,
    paths: &RefreshPaths,
    selection: &ProfileSelection,
    session_name: &str,
) -> Result<usize> {
    let profiles = ProfileFile::load(&paths.source)
        .await?
        .profiles(selection)
        .with_context(|| format!("Failed to select profiles from {}", paths.source.display()))?;

    let mut store = CredentialsStore::load(&paths.credentials).await?;

    info!(
        "Refreshing {} profile(s) from {} with session name {}",
        profiles.len(),
        paths.source.display(),
        session_name
    );

    let refreshed = Refresher::new(client, session_name)
        .refresh(&profiles, &mut store, prompt)
        .await?;

    store
        .save(&paths.credentials)
        .await
        .context("Failed to save AWS credentials")?;

    Ok(refreshed)
}
