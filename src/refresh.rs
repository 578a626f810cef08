use anyhow::Result;
use aws_smithy_types::date_time::Format;
use tracing::{debug, info};

use crate::{
    aws::{AssumeRole, AssumeRoleRequest, CredentialsStore, MfaToken},
    config::Profile,
    constants::DEFAULT_SECTION,
    mfa::ReadMfaToken,
};

/// Assumes the role of each profile in turn and records the resulting credentials
#[derive(Debug, Clone)]
pub struct Refresher<'a, C> {
    client: &'a C,
    session_name: &'a str,
}

impl<'a, C: AssumeRole> Refresher<'a, C> {
    pub fn new(client: &'a C, session_name: &'a str) -> Self {
        Self {
            client,
            session_name,
        }
    }

    /// Refresh profiles in order, stopping at the first failed AssumeRole.
    ///
    /// Profiles before the failing one stay in `store`; the error is returned untouched.
    /// MFA codes are read from `prompt` only for profiles that declare a device.
    /// Returns the number of profiles refreshed.
    pub async fn refresh(
        &self,
        profiles: &[Profile],
        store: &mut CredentialsStore,
        prompt: &mut impl ReadMfaToken,
    ) -> Result<usize> {
        let mut refreshed = 0;

        for profile in profiles {
            if profile.name == DEFAULT_SECTION {
                debug!("Skipping reserved profile {}", DEFAULT_SECTION);
                continue;
            }

            let request = self.build_request(profile, prompt)?;
            info!("Assuming role for profile: {}", profile.name);

            let credentials = self.client.assume_role(&request).await?;

            if let Some(expiration) = &credentials.expiration {
                info!(
                    "Credentials for {} expire at {}",
                    profile.name,
                    expiration
                        .fmt(Format::DateTime)
                        .unwrap_or_else(|_| "unknown".to_string())
                );
            }

            store.set_credentials(&profile.name, &credentials);
            refreshed += 1;
        }

        info!("Refreshed {} profile(s)", refreshed);
        Ok(refreshed)
    }

    fn build_request(
        &self,
        profile: &Profile,
        prompt: &mut impl ReadMfaToken,
    ) -> Result<AssumeRoleRequest> {
        let mfa = match &profile.mfa_device {
            Some(device) => Some(MfaToken {
                serial_number: device.clone(),
                token_code: prompt.read_token(&profile.name)?,
            }),
            None => None,
        };

        Ok(AssumeRoleRequest {
            role_arn: profile.role_arn.clone(),
            session_name: self.session_name.to_string(),
            duration_seconds: profile.duration_seconds,
            mfa,
        })
    }
}
