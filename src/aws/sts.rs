use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region};
use aws_sdk_sts::Client as StsClient;
use tracing::{debug, info};

use super::Credentials;
use crate::constants::DEFAULT_AWS_REGION;

/// Second factor attached to an AssumeRole call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MfaToken {
    pub serial_number: String,
    pub token_code: String,
}

/// Parameters of a single AssumeRole call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssumeRoleRequest {
    pub role_arn: String,
    pub session_name: String,
    pub duration_seconds: i32,
    /// Serial and token travel together; STS rejects a token without a serial
    pub mfa: Option<MfaToken>,
}

/// Exchanges a role definition for temporary credentials
pub trait AssumeRole {
    fn assume_role(
        &self,
        request: &AssumeRoleRequest,
    ) -> impl Future<Output = Result<Credentials>>;
}

/// AssumeRole backed by AWS STS and the default credential chain
#[derive(Debug, Clone)]
pub struct StsRoleAssumer {
    client: StsClient,
}

impl StsRoleAssumer {
    pub fn new(client: StsClient) -> Self {
        Self { client }
    }

    /// Build a client from the environment
    /// Priority: ENV vars -> Config file -> EC2 metadata -> DEFAULT_AWS_REGION
    pub async fn from_env() -> Self {
        let loaded = aws_config::defaults(BehaviorVersion::latest()).load().await;

        let config = match loaded.region() {
            Some(region) => {
                info!("Using region: {}", region);
                loaded
            }
            None => {
                info!(
                    "No region configured, using default {} for STS",
                    DEFAULT_AWS_REGION
                );
                aws_config::defaults(BehaviorVersion::latest())
                    .region(Region::new(DEFAULT_AWS_REGION))
                    .load()
                    .await
            }
        };

        Self::new(StsClient::new(&config))
    }
}

impl AssumeRole for StsRoleAssumer {
    async fn assume_role(&self, request: &AssumeRoleRequest) -> Result<Credentials> {
        info!("Calling AWS STS AssumeRole");
        debug!("Role ARN: {}", request.role_arn);
        debug!("Session name: {}", request.session_name);
        debug!("Duration: {} seconds", request.duration_seconds);

        let mut call = self
            .client
            .assume_role()
            .role_arn(&request.role_arn)
            .role_session_name(&request.session_name)
            .duration_seconds(request.duration_seconds);

        if let Some(mfa) = &request.mfa {
            debug!("MFA device: {}", mfa.serial_number);
            call = call
                .serial_number(&mfa.serial_number)
                .token_code(&mfa.token_code);
        }

        let response = call
            .send()
            .await
            .with_context(|| format!("Failed to assume role {}", request.role_arn))?;

        let sts_creds = response
            .credentials()
            .context("AWS STS returned no credentials")?;

        let credentials = Credentials {
            access_key_id: sts_creds.access_key_id().to_string(),
            secret_access_key: sts_creds.secret_access_key().to_string(),
            session_token: sts_creds.session_token().to_string(),
            expiration: Some(*sts_creds.expiration()),
        };

        info!("Successfully obtained AWS credentials");
        Ok(credentials)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use anyhow::anyhow;
    use std::sync::Mutex;

    /// Records every request and fails for roles listed in `failing`
    #[derive(Default)]
    pub(crate) struct StubStsClient {
        requests: Mutex<Vec<AssumeRoleRequest>>,
        failing: Vec<String>,
    }

    impl StubStsClient {
        pub(crate) fn failing_on(role_arn: &str) -> Self {
            Self {
                failing: vec![role_arn.to_string()],
                ..Default::default()
            }
        }

        pub(crate) fn requests(&self) -> Vec<AssumeRoleRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl AssumeRole for StubStsClient {
        async fn assume_role(&self, request: &AssumeRoleRequest) -> Result<Credentials> {
            self.requests.lock().unwrap().push(request.clone());

            if self.failing.contains(&request.role_arn) {
                return Err(anyhow!(
                    "AccessDenied: not authorized to assume {}",
                    request.role_arn
                ));
            }

            Ok(Credentials {
                access_key_id: "ACCESS_KEY_ID".to_string(),
                secret_access_key: "SECRET_KEY".to_string(),
                session_token: "SESSION_TOKEN".to_string(),
                expiration: None,
            })
        }
    }
}
