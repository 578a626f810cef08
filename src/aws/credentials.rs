use anyhow::{Context, Result};
use ini::{EscapePolicy, Ini, Properties, WriteOption};
use std::{io::Write, path::Path};
use tempfile::NamedTempFile;
use tokio::fs;
use tracing::{debug, info};

use super::Credentials;
use crate::{
    config::verbatim_parse_option,
    constants::{ACCESS_KEY_ID_KEY, SECRET_ACCESS_KEY_KEY, SECURITY_TOKEN_KEY},
};

/// In-memory AWS shared credentials file, one section per profile
#[derive(Debug, Clone, Default)]
pub struct CredentialsStore {
    ini: Ini,
}

impl CredentialsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a credentials file body. Values of untouched profiles are kept byte for byte;
    /// comments are not preserved.
    pub fn parse(content: &str) -> Result<Self> {
        let ini = Ini::load_from_str_opt(content, verbatim_parse_option())
            .context("Failed to parse AWS credentials file")?;
        Ok(Self { ini })
    }

    /// Load the credentials file, creating an empty owner-only file first if it is missing
    pub async fn load(path: &Path) -> Result<Self> {
        if !fs::try_exists(path).await.unwrap_or(false) {
            bootstrap(path).await?;
        }

        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read AWS credentials file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Invalid AWS credentials file: {}", path.display()))
    }

    /// Replace the profile section with exactly the three credential keys
    pub fn set_credentials(&mut self, profile: &str, creds: &Credentials) {
        while self.ini.delete(Some(profile)).is_some() {}

        self.ini
            .with_section(Some(profile))
            .set(ACCESS_KEY_ID_KEY, &creds.access_key_id)
            .set(SECRET_ACCESS_KEY_KEY, &creds.secret_access_key)
            .set(SECURITY_TOKEN_KEY, &creds.session_token);

        debug!("Updated credentials section [{}]", profile);
    }

    pub fn section(&self, profile: &str) -> Option<&Properties> {
        self.ini.section(Some(profile))
    }

    pub fn contains(&self, profile: &str) -> bool {
        self.section(profile).is_some()
    }

    /// Number of sections named `profile`; more than one only in hand-edited files
    pub fn section_count(&self, profile: &str) -> usize {
        self.ini
            .iter()
            .filter(|(name, _)| *name == Some(profile))
            .count()
    }

    /// Names of all profile sections in file order
    pub fn profiles(&self) -> Vec<&str> {
        self.ini.sections().flatten().collect()
    }

    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        let option = WriteOption {
            escape_policy: EscapePolicy::Nothing,
            ..Default::default()
        };
        self.ini
            .write_to_opt(&mut buffer, option)
            .context("Failed to render AWS credentials")?;
        String::from_utf8(buffer).context("Rendered AWS credentials are not valid UTF-8")
    }

    /// Persist the store, replacing the target file in a single rename.
    /// The temporary file is created owner-only with a unique name next to the target.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = self.render()?;
        let dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

        let mut file = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
        file.write_all(content.as_bytes())
            .and_then(|()| file.as_file().sync_all())
            .with_context(|| format!("Failed to write {}", file.path().display()))?;

        file.persist(path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        info!("Credentials saved to {}", path.display());
        Ok(())
    }
}

async fn bootstrap(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, "")
        .await
        .with_context(|| format!("Failed to create {}", path.display()))?;
    restrict_permissions(path).await?;

    info!("Created empty AWS credentials file: {}", path.display());
    Ok(())
}

async fn restrict_permissions(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let metadata = fs::metadata(path).await?;
        let mut permissions = metadata.permissions();
        permissions.set_mode(0o600);
        fs::set_permissions(path, permissions)
            .await
            .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
    }

    #[cfg(not(unix))]
    let _ = path;

    Ok(())
}
