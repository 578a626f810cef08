use crate::constants::{
    ALL_PROFILES, DEFAULT_DURATION_SECONDS, DEFAULT_SECTION, DURATION_KEY, MFA_DEVICE_KEY,
    ROLE_ARN_KEY,
};
use anyhow::{Context, Result, bail};
use ini::{Ini, ParseOption, Properties};
use std::{path::Path, str::FromStr};
use tokio::fs;
use tracing::debug;

/// A role to assume, read from one section of a profile file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub role_arn: String,
    pub duration_seconds: i32,
    pub mfa_device: Option<String>,
}

impl Profile {
    fn from_ini_section(name: &str, section: &Properties) -> Result<Self> {
        let role_arn = section
            .get(ROLE_ARN_KEY)
            .filter(|arn| !arn.is_empty())
            .with_context(|| format!("Profile '{name}' is missing {ROLE_ARN_KEY}"))?;

        Ok(Self {
            name: name.to_string(),
            role_arn: role_arn.to_string(),
            duration_seconds: parse_duration(section.get(DURATION_KEY)),
            mfa_device: section.get(MFA_DEVICE_KEY).map(str::to_string),
        })
    }
}

/// Non-numeric or absent durations fall back to the default
fn parse_duration(value: Option<&str>) -> i32 {
    value
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(DEFAULT_DURATION_SECONDS)
}

/// Which profiles of a profile file should be refreshed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileSelection {
    All,
    Named(Vec<String>),
}

impl FromStr for ProfileSelection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim() == ALL_PROFILES {
            return Ok(Self::All);
        }

        let names: Vec<String> = s
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();

        if names.is_empty() {
            bail!("No profile names given. Use '{ALL_PROFILES}' or a comma separated list");
        }

        Ok(Self::Named(names))
    }
}

/// Sections of a profile file, in file order, with repeated headers merged
#[derive(Debug, Clone, Default)]
pub struct ProfileFile {
    sections: Vec<(String, Properties)>,
}

impl ProfileFile {
    pub fn parse(content: &str) -> Result<Self> {
        let ini = Ini::load_from_str_opt(content, verbatim_parse_option())
            .context("Failed to parse profile file")?;

        let mut sections: Vec<(String, Properties)> = Vec::new();
        for (name, properties) in ini.iter() {
            let Some(name) = name else { continue };
            if name == DEFAULT_SECTION {
                debug!("Skipping reserved section [{}]", DEFAULT_SECTION);
                continue;
            }

            match sections.iter_mut().find(|(existing, _)| existing == name) {
                Some((_, merged)) => {
                    for (key, value) in properties.iter() {
                        merged.insert(key, value);
                    }
                }
                None => sections.push((name.to_string(), properties.clone())),
            }
        }

        Ok(Self { sections })
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read profile file: {}", path.display()))?;

        let file = Self::parse(&content)
            .with_context(|| format!("Invalid profile file: {}", path.display()))?;

        debug!("Loaded {} section(s) from {}", file.sections.len(), path.display());
        Ok(file)
    }

    pub fn names(&self) -> Vec<&str> {
        self.sections.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Build the selected profiles. Sections outside the selection are not validated.
    pub fn profiles(&self, selection: &ProfileSelection) -> Result<Vec<Profile>> {
        match selection {
            ProfileSelection::All => self
                .sections
                .iter()
                .map(|(name, section)| Profile::from_ini_section(name, section))
                .collect(),
            ProfileSelection::Named(names) => names
                .iter()
                .map(|name| {
                    let Some((_, section)) = self.sections.iter().find(|(n, _)| n == name) else {
                        let available = self.names().join(", ");
                        bail!("Profile '{name}' not found. Available profiles: {available}");
                    };
                    Profile::from_ini_section(name, section)
                })
                .collect(),
        }
    }
}

/// Keep quotes and backslashes as written; values such as Windows paths pass through untouched
pub(crate) fn verbatim_parse_option() -> ParseOption {
    ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..Default::default()
    }
}

/// Parse every profile from INI text, keeping the order sections appear in
pub fn parse_profiles(content: &str) -> Result<Vec<Profile>> {
    ProfileFile::parse(content)?.profiles(&ProfileSelection::All)
}
